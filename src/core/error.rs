#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BondError {
    #[error("unknown item id '{item_id}'")]
    UnknownItem { item_id: String },

    #[error("unknown item category '{category}'{}", item_suffix(.item_id))]
    UnknownCategory {
        item_id: Option<String>,
        category: String,
    },

    #[error("unknown actor id '{actor_id}'")]
    UnknownActor { actor_id: String },

    #[error("invalid rank table: {0}")]
    InvalidRankTable(#[from] RankTableError),

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl BondError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        BondError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RankTableError {
    #[error("expected {expected} thresholds, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("threshold at index {index} ({value}) is below the previous threshold ({previous})")]
    Decreasing {
        index: usize,
        previous: u64,
        value: u64,
    },
}

fn item_suffix(item_id: &Option<String>) -> String {
    item_id
        .as_deref()
        .map(|id| format!(" for item '{id}'"))
        .unwrap_or_default()
}
