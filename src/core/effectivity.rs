use super::types::{Actor, Catalog, Item, ItemCategory, ReactionTier};

/// Reaction of `actor` to `item`; `None` when no actor is selected.
///
/// The select box has no reaction of its own: it takes the best tier the
/// actor shows for any plain low item, since it can be exchanged for one.
pub fn resolve(catalog: &Catalog, actor: Option<&Actor>, item: &Item) -> Option<ReactionTier> {
    let actor = actor?;
    if catalog.is_select_item(item) {
        return Some(best_tier_for_category(catalog, actor, ItemCategory::Low));
    }
    let tier = actor
        .tiered_sets()
        .into_iter()
        .find(|(_, ids)| ids.contains(&item.id))
        .map(|(tier, _)| tier)
        .unwrap_or(ReactionTier::Baseline);
    Some(tier)
}

pub fn best_tier_for_category(
    catalog: &Catalog,
    actor: &Actor,
    category: ItemCategory,
) -> ReactionTier {
    actor
        .tiered_sets()
        .into_iter()
        .find(|(_, ids)| {
            ids.iter().any(|id| {
                catalog
                    .item(id)
                    .is_ok_and(|item| item.category == category && !catalog.is_select_item(item))
            })
        })
        .map(|(tier, _)| tier)
        .unwrap_or(ReactionTier::Baseline)
}

pub fn best_low_tier(catalog: &Catalog, actor: Option<&Actor>) -> ReactionTier {
    actor
        .map(|a| best_tier_for_category(catalog, a, ItemCategory::Low))
        .unwrap_or(ReactionTier::Baseline)
}
