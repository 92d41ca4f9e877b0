use serde::Serialize;

use super::accumulator::{InventoryPoints, total_points};
use super::error::BondError;
use super::optimizer::{SelectBoxGain, select_box_gain};
use super::rank::{MAX_RANK, RankTable};
use super::types::{Actor, Catalog, Inventory};

#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub inventory: &'a Inventory,
    pub actor: Option<&'a Actor>,
    pub current_rank: u32,
    pub goal_rank: u32,
    pub scarce_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankGap {
    pub rank: u32,
    pub points_needed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BondSummary {
    pub current_rank: u32,
    pub goal_rank: u32,
    pub current_rank_points: u64,
    pub inventory: InventoryPoints,
    pub optimization: SelectBoxGain,
    pub total_points: u64,
    pub reachable_rank: u32,
    pub next_rank: Option<RankGap>,
    pub points_to_goal: Option<u64>,
}

impl BondSummary {
    pub fn needs_forecast(&self) -> bool {
        self.points_to_goal.is_some()
    }
}

pub fn validate_rank(name: &'static str, rank: u32) -> Result<u32, BondError> {
    if !(1..=MAX_RANK).contains(&rank) {
        return Err(BondError::invalid(name, f64::from(rank), "must be between 1 and 100"));
    }
    Ok(rank)
}

pub fn summarize(
    catalog: &Catalog,
    rank_table: &RankTable,
    request: SummaryRequest<'_>,
) -> Result<BondSummary, BondError> {
    let current_rank = validate_rank("currentRank", request.current_rank)?;
    let goal_rank = validate_rank("goalRank", request.goal_rank)?;
    let current_rank_points = rank_table
        .points_for_rank(current_rank)
        .ok_or_else(|| BondError::invalid("currentRank", f64::from(current_rank), "not in rank table"))?;

    let inventory = total_points(catalog, request.inventory, request.actor);
    let optimization = select_box_gain(
        catalog,
        request.inventory,
        request.actor,
        request.scarce_count,
    );
    let total_points = current_rank_points
        .saturating_add(inventory.total)
        .saturating_add(optimization.net_point_gain);
    let reachable_rank = rank_table.rank_for_points(total_points);

    let next_rank = if reachable_rank >= goal_rank {
        None
    } else {
        rank_table
            .points_to_next_rank(total_points)
            .map(|(rank, points_needed)| RankGap {
                rank,
                points_needed,
            })
    };

    Ok(BondSummary {
        current_rank,
        goal_rank,
        current_rank_points,
        inventory,
        optimization,
        total_points,
        reachable_rank,
        next_rank,
        points_to_goal: rank_table.points_to_rank(total_points, goal_rank),
    })
}
