use super::error::{BondError, RankTableError};

pub const RANK_TABLE_LEN: usize = 100;
pub const MAX_RANK: u32 = RANK_TABLE_LEN as u32;

/// Cumulative points needed to first reach each rank; index `i` holds rank `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    thresholds: Vec<u64>,
}

impl RankTable {
    pub fn new(thresholds: Vec<u64>) -> Result<Self, BondError> {
        if thresholds.len() != RANK_TABLE_LEN {
            return Err(RankTableError::WrongLength {
                expected: RANK_TABLE_LEN,
                actual: thresholds.len(),
            }
            .into());
        }
        if let Some(index) = thresholds.windows(2).position(|w| w[1] < w[0]) {
            return Err(RankTableError::Decreasing {
                index: index + 1,
                previous: thresholds[index],
                value: thresholds[index + 1],
            }
            .into());
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &[u64] {
        &self.thresholds
    }

    /// Highest rank whose threshold is met; `0` below the first threshold.
    pub fn rank_for_points(&self, points: u64) -> u32 {
        self.thresholds.partition_point(|&t| t <= points) as u32
    }

    pub fn rank_for_expected_points(&self, points: f64) -> u32 {
        self.thresholds.partition_point(|&t| t as f64 <= points) as u32
    }

    pub fn points_for_rank(&self, rank: u32) -> Option<u64> {
        let index = usize::try_from(rank).ok()?.checked_sub(1)?;
        self.thresholds.get(index).copied()
    }

    pub fn points_to_next_rank(&self, current_points: u64) -> Option<(u32, u64)> {
        let rank = self.rank_for_points(current_points);
        let next_threshold = *self.thresholds.get(rank as usize)?;
        if next_threshold <= current_points {
            return None;
        }
        Some((rank + 1, next_threshold - current_points))
    }

    pub fn points_to_rank(&self, current_points: u64, target_rank: u32) -> Option<u64> {
        let target = self.points_for_rank(target_rank)?;
        target.checked_sub(current_points).filter(|&missing| missing > 0)
    }
}
