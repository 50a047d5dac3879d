// 1.0: all the primitives live here. sides, ids and the distance helper every module leans on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

// Buy = bid, funded in quote. Sell = ask, funded in base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    // +1 moves a price away from the reference on the ask side, -1 on the bid side
    pub fn outward_sign(&self) -> Decimal {
        match self {
            Side::Buy => Decimal::NEGATIVE_ONE,
            Side::Sell => Decimal::ONE,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

// 1.1: relative distance of a price from the reference. 0.03 = 3% away.
// callers guarantee reference > 0.
pub fn distance_ratio(price: Decimal, reference: Decimal) -> Decimal {
    (price - reference).abs() / reference
}
