//! Ladder order types.
//!
//! `BookOrderData` is a price/amount/side triple describing either a planned
//! ladder order or a real one already on the book. `LiveOrder` is the richer
//! exchange-side view handed in for reconciliation, carrying fill progress.

use crate::types::{OrderId, Side};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A single ladder order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookOrderData {
    pub price: Decimal,
    /// Order quantity, in base units.
    pub amount: Decimal,
    pub side: Side,
}

impl BookOrderData {
    pub fn new(price: Decimal, amount: Decimal, side: Side) -> Self {
        Self {
            price,
            amount,
            side,
        }
    }

    /// Amount expressed in the asset funding this side: quote for buys, base for sells.
    pub fn funds_amount(&self) -> Decimal {
        funds_amount(self.side, self.price, self.amount)
    }

    pub fn is_bid(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_ask(&self) -> bool {
        self.side == Side::Sell
    }
}

/// An open (or about to be cancelled) exchange order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveOrder {
    pub id: OrderId,
    pub side: Side,
    pub price: Decimal,
    pub origin_quantity: Decimal,
    pub filled_quantity: Decimal,
    /// Paper orders never lock exchange funds for their filled part.
    pub is_simulated: bool,
}

impl LiveOrder {
    pub fn new(id: OrderId, side: Side, price: Decimal, origin_quantity: Decimal) -> Self {
        Self {
            id,
            side,
            price,
            origin_quantity,
            filled_quantity: Decimal::ZERO,
            is_simulated: false,
        }
    }

    pub fn with_filled(mut self, filled_quantity: Decimal) -> Self {
        debug_assert!(filled_quantity <= self.origin_quantity, "cannot fill more than origin");
        self.filled_quantity = filled_quantity;
        self
    }

    pub fn simulated(mut self) -> Self {
        self.is_simulated = true;
        self
    }

    pub fn remaining_quantity(&self) -> Decimal {
        self.origin_quantity - self.filled_quantity
    }

    /// Funds released when this order is cancelled.
    pub fn freed_funds(&self) -> Decimal {
        let quantity = if self.is_simulated {
            self.origin_quantity
        } else {
            self.remaining_quantity()
        };
        funds_amount(self.side, self.price, quantity)
    }

    pub fn as_book_order(&self) -> BookOrderData {
        BookOrderData::new(self.price, self.origin_quantity, self.side)
    }
}

pub fn funds_amount(side: Side, price: Decimal, quantity: Decimal) -> Decimal {
    match side {
        Side::Buy => quantity * price,
        Side::Sell => quantity,
    }
}

// scale of computed buy quantities, finer than any exchange lot
const QUANTITY_DECIMALS: u32 = 12;

/// Quantity bought with `funds` quote at `price`, never costing more than `funds`.
pub fn buy_quantity(funds: Decimal, price: Decimal) -> Decimal {
    if price <= Decimal::ZERO || funds <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let quantity = (funds / price).round_dp_with_strategy(QUANTITY_DECIMALS, RoundingStrategy::ToZero);
    // the division itself may have rounded up before truncation
    let step = Decimal::new(1, QUANTITY_DECIMALS);
    if quantity * price > funds && quantity >= step {
        quantity - step
    } else {
        quantity
    }
}

/// Orders of one side, closest to `reference_price` first.
pub fn sorted_by_distance<'a>(
    orders: impl IntoIterator<Item = &'a BookOrderData>,
    side: Side,
    reference_price: Decimal,
) -> Vec<&'a BookOrderData> {
    let mut sided: Vec<&BookOrderData> = orders.into_iter().filter(|o| o.side == side).collect();
    sided.sort_by(|a, b| {
        (a.price - reference_price)
            .abs()
            .cmp(&(b.price - reference_price).abs())
    });
    sided
}
