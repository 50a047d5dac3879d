// 8.0.2: result types and errors for distribution operations.

use crate::curve::VolumeDirection;
use crate::order::BookOrderData;
use crate::types::Side;
use rust_decimal::Decimal;

/// Configuration and argument errors. Fatal to the calling strategy cycle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistributionError {
    #[error("Invalid {side} orders count {count}: must be between 1 and {max}")]
    InvalidOrderCount { side: Side, count: u32, max: u32 },

    #[error("Invalid spreads: min {min_spread} must be positive and below max {max_spread}")]
    InvalidSpread {
        min_spread: Decimal,
        max_spread: Decimal,
    },

    #[error("Min spread {min_spread} must be below {limit} to reach the depth band")]
    MinSpreadTooWide { min_spread: Decimal, limit: Decimal },

    #[error("Daily trading volume percent {0} must be in (0, 100]")]
    InvalidVolumePercent(Decimal),

    #[error("Volume multiplier {multiplier} is not valid for {direction:?} direction")]
    InvalidMultiplier {
        multiplier: Decimal,
        direction: VolumeDirection,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Outcome of a spread compliance check on the live book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadCheck {
    Compliant,
    NonCompliant,
    /// No live buy order: bids must be created.
    MissingBids,
    /// No live sell order: asks must be created.
    MissingAsks,
    /// Empty live book.
    MissingAll,
}

impl SpreadCheck {
    pub fn is_compliant(&self) -> bool {
        matches!(self, SpreadCheck::Compliant)
    }

    pub fn requires_orders(&self) -> bool {
        matches!(
            self,
            SpreadCheck::MissingBids | SpreadCheck::MissingAsks | SpreadCheck::MissingAll
        )
    }
}

/// Committed capital already exceeds what the side should hold: the ladder
/// has to be rebuilt from scratch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Full book rebalance required: {side} side commits {committed_amount}, intended total is {intended_total}")]
pub struct RebalanceRequired {
    pub side: Side,
    pub committed_amount: Decimal,
    pub intended_total: Decimal,
}

/// Outcome of swap reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// Patched ladder, one order per ideal slot, closest to the price first.
    Ladder {
        bids: Vec<BookOrderData>,
        asks: Vec<BookOrderData>,
    },
    RebalanceRequired(RebalanceRequired),
}

impl ReconcileOutcome {
    pub fn is_rebalance_required(&self) -> bool {
        matches!(self, ReconcileOutcome::RebalanceRequired(_))
    }
}

/// Failure of a single side reconciliation step.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SwapError {
    #[error(transparent)]
    RebalanceRequired(#[from] RebalanceRequired),

    #[error(transparent)]
    Distribution(#[from] DistributionError),
}
