mod accumulator;
mod effectivity;
mod engine;
mod error;
mod exp_table;
mod optimizer;
mod planner;
mod rank;
mod types;

pub use accumulator::{InventoryPoints, total_points};
pub use effectivity::{best_low_tier, best_tier_for_category, resolve};
pub use engine::{
    Forecast, ForecastRequest, HORIZON_DAYS, RewardValues, StopReason, simulate,
    simulate_cancellable, validate_params,
};
pub use error::{BondError, RankTableError};
pub use exp_table::{PointEquivalent, equivalents, points_for, points_for_name};
pub use optimizer::{ConversionBenefit, SelectBoxGain, select_box_gain};
pub use planner::{BondSummary, RankGap, SummaryRequest, summarize};
pub use rank::{MAX_RANK, RANK_TABLE_LEN, RankTable};
pub use types::{
    Actor, ActorId, Catalog, Contribution, Inventory, Item, ItemCategory, ItemId, ReactionTier,
    SELECT_BOX_ITEM_ID, SimulatedDayRecord, SimulationParameters,
};
