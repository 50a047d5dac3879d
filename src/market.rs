//! Market precision and tradability rules.
//!
//! The exchange-side description of a symbol: rounding granularity for price
//! and quantity plus the min/max bounds an order must respect to be accepted.
//! Only used to turn computed ladders into tradable values.

use crate::types::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Symbol precision and limits. `None` means unbounded / no rounding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketPrecision {
    /// Tick size (minimum price increment)
    pub price_tick: Option<Decimal>,
    /// Lot size (minimum quantity increment)
    pub amount_step: Option<Decimal>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    /// Minimum notional (price * quantity)
    pub min_cost: Option<Decimal>,
    pub max_cost: Option<Decimal>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl MarketPrecision {
    /// A typical BTC/USDT spot symbol.
    pub fn btc_usdt() -> Self {
        Self {
            price_tick: Some(Decimal::new(1, 2)),   // $0.01
            amount_step: Some(Decimal::new(1, 5)),  // 0.00001 BTC
            min_amount: Some(Decimal::new(1, 5)),
            max_amount: Some(Decimal::new(9000, 0)),
            min_cost: Some(Decimal::new(5, 0)),     // $5
            max_cost: None,
            min_price: Some(Decimal::new(1, 2)),
            max_price: Some(Decimal::new(1_000_000, 0)),
        }
    }

    /// Round a price to tick size, always away from the reference so the
    /// configured spread is never tightened.
    pub fn round_price(&self, price: Decimal, side: Side) -> Decimal {
        match self.price_tick {
            Some(tick) if tick > Decimal::ZERO => {
                let ticks = price / tick;
                let ticks = match side {
                    Side::Buy => ticks.floor(),
                    Side::Sell => ticks.ceil(),
                };
                ticks * tick
            }
            _ => price,
        }
    }

    /// Floor a quantity to the lot size. Never rounds up, so budgets hold.
    pub fn floor_amount(&self, amount: Decimal) -> Decimal {
        match self.amount_step {
            Some(step) if step > Decimal::ZERO => (amount / step).floor() * step,
            _ => amount,
        }
    }

    /// Check an order against every exchange limit.
    pub fn check_order(&self, price: Decimal, amount: Decimal) -> Result<(), MarketError> {
        if price <= Decimal::ZERO {
            return Err(MarketError::InvalidPrice(price));
        }
        if amount <= Decimal::ZERO {
            return Err(MarketError::InvalidAmount(amount));
        }
        if let Some(minimum) = self.min_amount {
            if amount < minimum {
                return Err(MarketError::AmountTooSmall { amount, minimum });
            }
        }
        if let Some(maximum) = self.max_amount {
            if amount > maximum {
                return Err(MarketError::AmountTooLarge { amount, maximum });
            }
        }
        let cost = price * amount;
        if let Some(minimum) = self.min_cost {
            if cost < minimum {
                return Err(MarketError::CostTooSmall { cost, minimum });
            }
        }
        if let Some(maximum) = self.max_cost {
            if cost > maximum {
                return Err(MarketError::CostTooLarge { cost, maximum });
            }
        }
        if let Some(minimum) = self.min_price {
            if price < minimum {
                return Err(MarketError::PriceOutOfRange { price });
            }
        }
        if let Some(maximum) = self.max_price {
            if price > maximum {
                return Err(MarketError::PriceOutOfRange { price });
            }
        }
        Ok(())
    }

    pub fn is_tradable(&self, price: Decimal, amount: Decimal) -> bool {
        self.check_order(price, amount).is_ok()
    }
}

/// Market errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("Invalid price: {0}")]
    InvalidPrice(Decimal),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Amount {amount} below minimum {minimum}")]
    AmountTooSmall { amount: Decimal, minimum: Decimal },

    #[error("Amount {amount} above maximum {maximum}")]
    AmountTooLarge { amount: Decimal, maximum: Decimal },

    #[error("Cost {cost} below minimum {minimum}")]
    CostTooSmall { cost: Decimal, minimum: Decimal },

    #[error("Cost {cost} above maximum {maximum}")]
    CostTooLarge { cost: Decimal, maximum: Decimal },

    #[error("Price {price} outside allowed range")]
    PriceOutOfRange { price: Decimal },
}
