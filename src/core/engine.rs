use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::effectivity::best_tier_for_category;
use super::error::BondError;
use super::exp_table::{ACTION_POINTS, SCHEDULE_BONUS_POINTS, SCHEDULE_POINTS, points_for};
use super::planner::validate_rank;
use super::rank::RankTable;
use super::types::{
    Actor, Catalog, Contribution, ItemCategory, ReactionTier, SimulatedDayRecord,
    SimulationParameters,
};

pub const HORIZON_DAYS: u32 = 730;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum MilestoneReward {
    SelectBoxPair,
    HighLottery,
}

const MILESTONES: [(u32, MilestoneReward); 14] = [
    (19, MilestoneReward::SelectBoxPair),
    (39, MilestoneReward::SelectBoxPair),
    (49, MilestoneReward::HighLottery),
    (79, MilestoneReward::SelectBoxPair),
    (90, MilestoneReward::HighLottery),
    (99, MilestoneReward::HighLottery),
    (105, MilestoneReward::SelectBoxPair),
    (106, MilestoneReward::HighLottery),
    (111, MilestoneReward::SelectBoxPair),
    (112, MilestoneReward::HighLottery),
    (117, MilestoneReward::SelectBoxPair),
    (118, MilestoneReward::HighLottery),
    (123, MilestoneReward::SelectBoxPair),
    (124, MilestoneReward::HighLottery),
];

const GIFT_BUNDLE_LOW_BOXES: u32 = 10;
const GIFT_BUNDLE_SELECT_BOXES: u32 = 5;
const GIFT_BUNDLE_HIGH_BOXES: u32 = 1;
const CRAFT_BUNDLE_SELECT_BOXES: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardValues {
    pub select_box: u32,
    pub event_low: u32,
    pub event_high: u32,
    pub crafted_low: u32,
    pub crafted_high: u32,
    pub high_lottery: u32,
}

impl RewardValues {
    pub fn for_actor(catalog: &Catalog, actor: Option<&Actor>) -> Self {
        let best = |category| {
            actor
                .map(|a| best_tier_for_category(catalog, a, category))
                .unwrap_or(ReactionTier::Baseline)
        };
        let low_best = best(ItemCategory::Low);
        let high_best = best(ItemCategory::High);
        Self {
            select_box: points_for(ItemCategory::Low, low_best),
            event_low: points_for(ItemCategory::Low, low_best),
            event_high: points_for(ItemCategory::High, high_best),
            ..Self::baseline()
        }
    }

    pub const fn baseline() -> Self {
        let low = points_for(ItemCategory::Low, ReactionTier::Baseline);
        let high = points_for(ItemCategory::High, ReactionTier::Baseline);
        Self {
            select_box: low,
            event_low: low,
            event_high: high,
            crafted_low: low,
            crafted_high: high,
            high_lottery: high,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    GoalReached,
    HorizonExhausted,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub days: Vec<SimulatedDayRecord>,
    pub stop: StopReason,
}

impl Forecast {
    pub fn days_to_goal(&self) -> Option<u32> {
        match self.stop {
            StopReason::GoalReached => self.days.last().map(|d| d.day_offset),
            StopReason::HorizonExhausted | StopReason::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ForecastRequest<'a> {
    pub starting_points: f64,
    pub goal_rank: u32,
    pub rank_table: &'a RankTable,
    pub params: &'a SimulationParameters,
    pub rewards: RewardValues,
    pub today: NaiveDate,
}

pub fn simulate(request: ForecastRequest<'_>) -> Result<Vec<SimulatedDayRecord>, BondError> {
    let never = AtomicBool::new(false);
    simulate_cancellable(request, &never).map(|f| f.days)
}

/// Projects expected daily gains until the goal rank, the horizon, or `cancel`.
///
/// `cancel` is checked once before each simulated day.
pub fn simulate_cancellable(
    request: ForecastRequest<'_>,
    cancel: &AtomicBool,
) -> Result<Forecast, BondError> {
    validate_params(request.params)?;
    validate_rank("goalRank", request.goal_rank)?;
    if !request.starting_points.is_finite() || request.starting_points < 0.0 {
        return Err(BondError::invalid(
            "startingPoints",
            request.starting_points,
            "must be a finite value >= 0",
        ));
    }

    let mut days = Vec::new();
    let mut cumulative_points = request.starting_points;
    let mut date = request.today;

    for day_offset in 1..=HORIZON_DAYS {
        if cancel.load(Ordering::Relaxed) {
            tracing::debug!(day_offset, "forecast cancelled");
            return Ok(Forecast {
                days,
                stop: StopReason::Cancelled,
            });
        }
        let Some(next) = date.succ_opt() else {
            break;
        };
        date = next;

        let contributions = day_contributions(date, request.params, &request.rewards);
        let points_gained = contributions.iter().map(|c| c.points).sum::<f64>();
        cumulative_points += points_gained;
        let projected_rank = request.rank_table.rank_for_expected_points(cumulative_points);

        days.push(SimulatedDayRecord {
            day_offset,
            calendar_date: date,
            contributions,
            points_gained,
            cumulative_points,
            projected_rank,
        });

        if projected_rank >= request.goal_rank {
            tracing::debug!(day_offset, projected_rank, "forecast reached goal rank");
            return Ok(Forecast {
                days,
                stop: StopReason::GoalReached,
            });
        }
    }

    tracing::debug!(days = days.len(), cumulative_points, "forecast horizon exhausted");
    Ok(Forecast {
        days,
        stop: StopReason::HorizonExhausted,
    })
}

pub fn validate_params(params: &SimulationParameters) -> Result<(), BondError> {
    for (name, rate) in [
        ("actionsPerDay", params.actions_per_day),
        ("schedulesPerDay", params.schedules_per_day),
        ("craftsPerDay", params.crafts_per_day),
    ] {
        if !rate.is_finite() || rate < 0.0 {
            return Err(BondError::invalid(name, rate, "must be a finite value >= 0"));
        }
    }

    for (name, percent) in [
        ("scheduleBonusPercent", params.schedule_bonus_percent),
        ("fancyPercent", params.fancy_percent),
    ] {
        if !(0.0..=100.0).contains(&percent) {
            return Err(BondError::invalid(name, percent, "must be between 0 and 100"));
        }
    }

    for (name, day) in [
        ("event1Day", params.event1_day),
        ("event2Day", params.event2_day),
        ("milestoneDay", params.milestone_day),
        ("giftBundleDay", params.gift_bundle_day),
        ("craftBundleDay", params.craft_bundle_day),
    ] {
        if day > 31 {
            return Err(BondError::invalid(
                name,
                f64::from(day),
                "must be a day of month between 1 and 31, or 0 to disable",
            ));
        }
    }

    Ok(())
}

fn day_contributions(
    date: NaiveDate,
    params: &SimulationParameters,
    rewards: &RewardValues,
) -> Vec<Contribution> {
    let mut out = Vec::new();
    let day_of_month = date.day();
    let fires = |trigger: u8| trigger != 0 && u32::from(trigger) == day_of_month;

    if params.actions_per_day > 0.0 {
        out.push(contribution(
            "cafe touch",
            params.actions_per_day * f64::from(ACTION_POINTS),
        ));
    }

    if params.schedules_per_day > 0.0 {
        out.push(contribution(
            "schedule (expected)",
            expected_mix(
                params.schedules_per_day,
                params.schedule_bonus_percent,
                SCHEDULE_BONUS_POINTS,
                SCHEDULE_POINTS,
            ),
        ));
    }

    if params.crafts_per_day > 0.0 {
        out.push(contribution(
            "crafting (expected)",
            expected_mix(
                params.crafts_per_day,
                params.fancy_percent,
                rewards.crafted_high,
                rewards.crafted_low,
            ),
        ));
    }

    for (label, trigger) in [("event 1", params.event1_day), ("event 2", params.event2_day)] {
        if fires(trigger) {
            out.push(contribution(
                &format!("{label} reward: {} low items", params.normal_items_per_event),
                f64::from(params.normal_items_per_event) * f64::from(rewards.event_low),
            ));
            out.push(contribution(
                &format!("{label} reward: {} high items", params.fancy_items_per_event),
                f64::from(params.fancy_items_per_event) * f64::from(rewards.event_high),
            ));
        }
    }

    if params.milestone_reach > 0 && fires(params.milestone_day) {
        for (floor, reward) in MILESTONES
            .iter()
            .filter(|(floor, _)| *floor <= params.milestone_reach)
        {
            let (what, points) = match reward {
                MilestoneReward::SelectBoxPair => ("select box x2", 2 * rewards.select_box),
                MilestoneReward::HighLottery => ("high item lottery box", rewards.high_lottery),
            };
            out.push(contribution(
                &format!("milestone {floor} reward: {what}"),
                f64::from(points),
            ));
        }
    }

    if params.gift_bundles > 0 && fires(params.gift_bundle_day) {
        let n = u64::from(params.gift_bundles);
        for (count, unit, what) in [
            (GIFT_BUNDLE_LOW_BOXES, rewards.crafted_low, "low item box"),
            (GIFT_BUNDLE_SELECT_BOXES, rewards.select_box, "select box"),
            (GIFT_BUNDLE_HIGH_BOXES, rewards.high_lottery, "high item box"),
        ] {
            let units = u64::from(count) * n;
            out.push(contribution(
                &format!("gift bundle: {what} x{units}"),
                units as f64 * f64::from(unit),
            ));
        }
    }

    if params.craft_bundles > 0 && fires(params.craft_bundle_day) {
        let units = u64::from(CRAFT_BUNDLE_SELECT_BOXES) * u64::from(params.craft_bundles);
        out.push(contribution(
            &format!("crafting bundle: select box x{units}"),
            units as f64 * f64::from(rewards.select_box),
        ));
    }

    out
}

fn expected_mix(rate: f64, percent: f64, bonus: u32, normal: u32) -> f64 {
    let p = percent / 100.0;
    rate * p * f64::from(bonus) + rate * (1.0 - p) * f64::from(normal)
}

fn contribution(description: &str, points: f64) -> Contribution {
    Contribution {
        description: description.to_string(),
        points,
    }
}
