use serde::Serialize;

use super::effectivity::resolve;
use super::exp_table::points_for;
use super::types::{Actor, Catalog, Inventory, ReactionTier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPoints {
    pub total: u64,
    pub unknown_items: Vec<String>,
}

pub fn total_points(catalog: &Catalog, inventory: &Inventory, actor: Option<&Actor>) -> InventoryPoints {
    let mut total = 0_u64;
    let mut unknown_items = Vec::new();

    for (item_id, &count) in inventory {
        let count = clamp_count(count);
        if count == 0 {
            continue;
        }
        let item = match catalog.item(item_id) {
            Ok(item) => item,
            Err(err) => {
                tracing::warn!(%err, count, "skipping inventory entry");
                unknown_items.push(item_id.clone());
                continue;
            }
        };
        let tier = resolve(catalog, actor, item).unwrap_or(ReactionTier::Baseline);
        let points = u64::from(points_for(item.category, tier)).saturating_mul(count);
        total = total.saturating_add(points);
    }

    unknown_items.sort_unstable();
    InventoryPoints {
        total,
        unknown_items,
    }
}

pub(crate) fn clamp_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
