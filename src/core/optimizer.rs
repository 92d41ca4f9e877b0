use serde::Serialize;

use super::accumulator::clamp_count;
use super::effectivity::{best_low_tier, resolve};
use super::exp_table::points_for;
use super::types::{Actor, Catalog, Inventory, ItemCategory, ReactionTier};

/// Low items consumed per crafted select box (plus one scarce resource).
pub const LOW_ITEMS_PER_CONVERSION: u64 = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionBenefit {
    NoActor,
    NoBenefit,
    Gain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectBoxGain {
    pub eligible_low_count: u64,
    pub conversions: u64,
    pub consumed_low_items: u64,
    pub derived_tier: ReactionTier,
    pub net_point_gain: u64,
    pub benefit: ConversionBenefit,
}

pub fn select_box_gain(
    catalog: &Catalog,
    inventory: &Inventory,
    actor: Option<&Actor>,
    scarce_count: u32,
) -> SelectBoxGain {
    let derived_tier = best_low_tier(catalog, actor);
    let eligible_low_count = eligible_low_count(catalog, inventory, actor);
    let conversions = u64::from(scarce_count).min(eligible_low_count / LOW_ITEMS_PER_CONVERSION);

    let derived_points = u64::from(points_for(ItemCategory::Low, derived_tier));
    let cost_points = LOW_ITEMS_PER_CONVERSION
        * u64::from(points_for(ItemCategory::Low, ReactionTier::Baseline));
    let net_point_gain = (conversions * derived_points).saturating_sub(conversions * cost_points);

    let benefit = match (actor, derived_tier) {
        (None, _) => ConversionBenefit::NoActor,
        (Some(_), ReactionTier::Baseline | ReactionTier::Favored) => ConversionBenefit::NoBenefit,
        (Some(_), ReactionTier::Super | ReactionTier::Ultra) => ConversionBenefit::Gain,
    };

    SelectBoxGain {
        eligible_low_count,
        conversions,
        consumed_low_items: conversions * LOW_ITEMS_PER_CONVERSION,
        derived_tier,
        net_point_gain,
        benefit,
    }
}

fn eligible_low_count(catalog: &Catalog, inventory: &Inventory, actor: Option<&Actor>) -> u64 {
    catalog
        .items()
        .filter(|item| item.category == ItemCategory::Low && !catalog.is_select_item(item))
        .filter(|item| resolve(catalog, actor, item) == Some(ReactionTier::Baseline))
        .map(|item| inventory.get(&item.id).copied().map(clamp_count).unwrap_or(0))
        .fold(0, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Item, SELECT_BOX_ITEM_ID};
    use proptest::prelude::{any, prop_assert, proptest};

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                Item::new("g1", ItemCategory::Low),
                Item::new("g2", ItemCategory::Low),
                Item::new("g3", ItemCategory::Low),
                Item::new("g4", ItemCategory::Low),
                Item::new("h1", ItemCategory::High),
                Item::new(SELECT_BOX_ITEM_ID, ItemCategory::Low),
            ],
            Vec::new(),
        )
    }

    fn inventory(entries: &[(&str, i64)]) -> Inventory {
        entries.iter().map(|&(id, n)| (id.to_string(), n)).collect()
    }

    #[test]
    fn super_actor_gains_from_conversion() {
        let actor = Actor::new("a").with_super_favored(["g4"]);
        // 10 baseline low items; g4 and the select box itself are excluded.
        let inv = inventory(&[("g1", 6), ("g2", 4), ("g4", 9), (SELECT_BOX_ITEM_ID, 7), ("h1", 3)]);
        let gain = select_box_gain(&catalog(), &inv, Some(&actor), 3);
        assert_eq!(gain.eligible_low_count, 10);
        assert_eq!(gain.conversions, 3);
        assert_eq!(gain.consumed_low_items, 6);
        assert_eq!(gain.derived_tier, ReactionTier::Super);
        assert_eq!(gain.net_point_gain, 60);
        assert_eq!(gain.benefit, ConversionBenefit::Gain);
    }

    #[test]
    fn conversions_limited_by_pairs() {
        let actor = Actor::new("a").with_ultra_favored(["g4"]);
        let inv = inventory(&[("g1", 5)]);
        let gain = select_box_gain(&catalog(), &inv, Some(&actor), 99);
        assert_eq!(gain.conversions, 2);
        assert_eq!(gain.net_point_gain, 2 * 80 - 2 * 2 * 20);
    }

    #[test]
    fn baseline_actor_has_no_benefit() {
        let actor = Actor::new("a");
        let inv = inventory(&[("g1", 40)]);
        let gain = select_box_gain(&catalog(), &inv, Some(&actor), 10);
        assert_eq!(gain.net_point_gain, 0);
        assert_eq!(gain.benefit, ConversionBenefit::NoBenefit);
    }

    #[test]
    fn favored_actor_breaks_even() {
        let actor = Actor::new("a").with_favored(["g4"]);
        let inv = inventory(&[("g1", 40)]);
        let gain = select_box_gain(&catalog(), &inv, Some(&actor), 10);
        assert_eq!(gain.conversions, 10);
        assert_eq!(gain.net_point_gain, 0);
        assert_eq!(gain.benefit, ConversionBenefit::NoBenefit);
    }

    #[test]
    fn no_actor_counts_nothing() {
        let inv = inventory(&[("g1", 40)]);
        let gain = select_box_gain(&catalog(), &inv, None, 10);
        assert_eq!(gain.eligible_low_count, 0);
        assert_eq!(gain.net_point_gain, 0);
        assert_eq!(gain.benefit, ConversionBenefit::NoActor);
    }

    #[test]
    fn huge_counts_do_not_overflow_eligible_sum() {
        let actor = Actor::new("a").with_ultra_favored(["g4"]);
        let inv = inventory(&[("g1", i64::MAX), ("g2", i64::MAX), ("g3", i64::MAX)]);
        let gain = select_box_gain(&catalog(), &inv, Some(&actor), u32::MAX);
        assert_eq!(gain.eligible_low_count, u64::MAX);
        assert_eq!(gain.conversions, u64::from(u32::MAX));
        assert_eq!(gain.net_point_gain, u64::from(u32::MAX) * 40);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_gain_is_never_negative_and_bounded(
            counts in proptest::collection::vec(-10i64..200, 4),
            scarce in any::<u16>(),
            tier_pick in 0usize..4,
        ) {
            let actor = match tier_pick {
                0 => Actor::new("a"),
                1 => Actor::new("a").with_favored(["g4"]),
                2 => Actor::new("a").with_super_favored(["g4"]),
                _ => Actor::new("a").with_ultra_favored(["g4"]),
            };
            let inv: Inventory = ["g1", "g2", "g3", "g4"]
                .iter()
                .zip(&counts)
                .map(|(id, &n)| (id.to_string(), n))
                .collect();
            let gain = select_box_gain(&catalog(), &inv, Some(&actor), u32::from(scarce));
            prop_assert!(gain.conversions <= u64::from(scarce));
            prop_assert!(gain.consumed_low_items <= gain.eligible_low_count);
            prop_assert!(gain.net_point_gain <= gain.conversions * 40);
            if gain.benefit == ConversionBenefit::NoBenefit {
                prop_assert!(gain.net_point_gain == 0);
            }
        }
    }
}
