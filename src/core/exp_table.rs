use serde::Serialize;

use super::error::BondError;
use super::types::{ItemCategory, ReactionTier};

pub const ACTION_POINTS: u32 = 15;
pub const SCHEDULE_POINTS: u32 = 25;
pub const SCHEDULE_BONUS_POINTS: u32 = 50;

pub const fn points_for(category: ItemCategory, tier: ReactionTier) -> u32 {
    match category {
        ItemCategory::Low => match tier {
            ReactionTier::Baseline => 20,
            ReactionTier::Favored => 40,
            ReactionTier::Super => 60,
            ReactionTier::Ultra => 80,
        },
        // High items have no separate "favored" step.
        ItemCategory::High => match tier {
            ReactionTier::Baseline | ReactionTier::Favored => 120,
            ReactionTier::Super => 180,
            ReactionTier::Ultra => 240,
        },
        ItemCategory::LowWide => 60,
        ItemCategory::HighWide => 240,
    }
}

pub fn points_for_name(category: &str, tier: ReactionTier) -> Result<u32, BondError> {
    let category = category.parse::<ItemCategory>()?;
    Ok(points_for(category, tier))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointEquivalent {
    pub label: &'static str,
    pub unit_points: u32,
    pub count: u64,
}

const EQUIVALENT_UNITS: [(&str, u32); 10] = [
    ("cafe touch", ACTION_POINTS),
    ("schedule", SCHEDULE_POINTS),
    ("schedule bonus", SCHEDULE_BONUS_POINTS),
    ("low item (baseline)", points_for(ItemCategory::Low, ReactionTier::Baseline)),
    ("low item (favored)", points_for(ItemCategory::Low, ReactionTier::Favored)),
    ("low item (super)", points_for(ItemCategory::Low, ReactionTier::Super)),
    ("low item (ultra)", points_for(ItemCategory::Low, ReactionTier::Ultra)),
    ("high item (favored)", points_for(ItemCategory::High, ReactionTier::Favored)),
    ("high item (super)", points_for(ItemCategory::High, ReactionTier::Super)),
    ("high item (ultra)", points_for(ItemCategory::High, ReactionTier::Ultra)),
];

pub fn equivalents(points: u64) -> Vec<PointEquivalent> {
    EQUIVALENT_UNITS
        .iter()
        .map(|&(label, unit_points)| PointEquivalent {
            label,
            unit_points,
            count: points.div_ceil(u64::from(unit_points)),
        })
        .collect()
}
