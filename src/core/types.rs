use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use super::error::BondError;

pub type ItemId = String;
pub type ActorId = String;

/// Inventory counts keyed by item id. Negative counts are treated as zero.
pub type Inventory = HashMap<ItemId, i64>;

pub const SELECT_BOX_ITEM_ID: &str = "gift-select-box";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemCategory {
    Low,
    High,
    LowWide,
    HighWide,
}

impl ItemCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            ItemCategory::Low => "low",
            ItemCategory::High => "high",
            ItemCategory::LowWide => "low-wide",
            ItemCategory::HighWide => "high-wide",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = BondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" | "normal" => Ok(ItemCategory::Low),
            "high" => Ok(ItemCategory::High),
            "low-wide" | "normal-all" => Ok(ItemCategory::LowWide),
            "high-wide" | "high-all" => Ok(ItemCategory::HighWide),
            other => Err(BondError::UnknownCategory {
                item_id: None,
                category: other.to_string(),
            }),
        }
    }
}

/// Ordered from weakest to strongest so `max` picks the best reaction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionTier {
    Baseline,
    Favored,
    Super,
    Ultra,
}

impl ReactionTier {
    pub const ALL: [ReactionTier; 4] = [
        ReactionTier::Baseline,
        ReactionTier::Favored,
        ReactionTier::Super,
        ReactionTier::Ultra,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub category: ItemCategory,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, category: ItemCategory) -> Self {
        Self {
            id: id.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub favored: HashSet<ItemId>,
    pub super_favored: HashSet<ItemId>,
    pub ultra_favored: HashSet<ItemId>,
}

impl Actor {
    pub fn new(id: impl Into<ActorId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_favored<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        self.favored.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_super_favored<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        self.super_favored.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_ultra_favored<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        self.ultra_favored.extend(ids.into_iter().map(Into::into));
        self
    }

    pub(crate) fn tiered_sets(&self) -> [(ReactionTier, &HashSet<ItemId>); 3] {
        [
            (ReactionTier::Ultra, &self.ultra_favored),
            (ReactionTier::Super, &self.super_favored),
            (ReactionTier::Favored, &self.favored),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    items: HashMap<ItemId, Item>,
    actors: HashMap<ActorId, Actor>,
    select_item_id: ItemId,
}

impl Catalog {
    pub fn new(items: Vec<Item>, actors: Vec<Actor>) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
            actors: actors.into_iter().map(|a| (a.id.clone(), a)).collect(),
            select_item_id: SELECT_BOX_ITEM_ID.to_string(),
        }
    }

    pub fn with_select_item_id(mut self, id: impl Into<ItemId>) -> Self {
        self.select_item_id = id.into();
        self
    }

    pub fn item(&self, id: &str) -> Result<&Item, BondError> {
        self.items.get(id).ok_or_else(|| BondError::UnknownItem {
            item_id: id.to_string(),
        })
    }

    pub fn actor(&self, id: &str) -> Result<&Actor, BondError> {
        self.actors.get(id).ok_or_else(|| BondError::UnknownActor {
            actor_id: id.to_string(),
        })
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn actor_ids(&self) -> Vec<&str> {
        let mut ids = self.actors.keys().map(String::as_str).collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    pub fn select_item_id(&self) -> &str {
        &self.select_item_id
    }

    pub fn is_select_item(&self, item: &Item) -> bool {
        item.id == self.select_item_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParameters {
    pub actions_per_day: f64,
    pub schedules_per_day: f64,
    pub schedule_bonus_percent: f64,
    pub crafts_per_day: f64,
    pub fancy_percent: f64,
    pub normal_items_per_event: u32,
    pub fancy_items_per_event: u32,
    pub event1_day: u8,
    pub event2_day: u8,
    pub milestone_reach: u32,
    pub milestone_day: u8,
    pub gift_bundles: u32,
    pub gift_bundle_day: u8,
    pub craft_bundles: u32,
    pub craft_bundle_day: u8,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            actions_per_day: 5.0,
            schedules_per_day: 0.5,
            schedule_bonus_percent: 25.0,
            crafts_per_day: 3.0,
            fancy_percent: 10.0,
            normal_items_per_event: 40,
            fancy_items_per_event: 2,
            event1_day: 5,
            event2_day: 15,
            milestone_reach: 75,
            milestone_day: 15,
            gift_bundles: 0,
            gift_bundle_day: 1,
            craft_bundles: 0,
            craft_bundle_day: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub description: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedDayRecord {
    pub day_offset: u32,
    pub calendar_date: NaiveDate,
    pub contributions: Vec<Contribution>,
    pub points_gained: f64,
    pub cumulative_points: f64,
    pub projected_rank: u32,
}
