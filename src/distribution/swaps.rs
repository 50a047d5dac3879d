//! Swap reconciliation.
//!
//! After fills or cancellations the book holds a partial ladder. Instead of
//! rebuilding everything, each ideal price slot is matched to the open order
//! sitting in its window, and slots left empty receive the capital freed by
//! cancelled or stray orders, split by their share of the ideal curve.
//!
//! ```text
//! ideal slots ─┐
//!              ├─► two-pointer match ──► committed / missing slots ──► amounts
//! open orders ─┘          │
//!                         └─► stray orders (freed capital)
//! ```
//!
//! When more capital is committed than the side should now hold, the repair
//! is impossible and a full rebuild is signalled instead.

use super::core::OrderBookDistribution;
use super::results::{DistributionError, RebalanceRequired, ReconcileOutcome, SwapError};
use crate::order::{buy_quantity, funds_amount, BookOrderData, LiveOrder};
use crate::types::Side;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};

/// Reconciliation state of one ideal slot.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredOrderData {
    pub ideal_price: Decimal,
    /// Share of the side held by this slot, in percent.
    pub ideal_amount_percent: Decimal,
    pub current_price: Option<Decimal>,
    pub current_origin_amount: Option<Decimal>,
    pub final_price: Decimal,
    /// `None` until the slot's amount is resolved.
    pub final_amount: Option<Decimal>,
}

impl InferredOrderData {
    fn new(ideal_price: Decimal, ideal_amount_percent: Decimal, matched: Option<&LiveOrder>) -> Self {
        match matched {
            Some(order) => Self {
                ideal_price,
                ideal_amount_percent,
                current_price: Some(order.price),
                current_origin_amount: Some(order.origin_quantity),
                final_price: order.price,
                final_amount: Some(order.origin_quantity),
            },
            None => Self {
                ideal_price,
                ideal_amount_percent,
                current_price: None,
                current_origin_amount: None,
                final_price: ideal_price,
                final_amount: None,
            },
        }
    }

    pub fn is_matched(&self) -> bool {
        self.current_price.is_some()
    }

    // funds held by the matched order
    fn committed_funds(&self, side: Side) -> Option<Decimal> {
        match (self.current_price, self.current_origin_amount) {
            (Some(price), Some(amount)) => Some(funds_amount(side, price, amount)),
            _ => None,
        }
    }

    fn to_book_order(&self, side: Side) -> BookOrderData {
        BookOrderData::new(self.final_price, self.final_amount.unwrap_or(Decimal::ZERO), side)
    }
}

impl OrderBookDistribution {
    /// Patch the ladder after swaps, or signal that it must be rebuilt.
    ///
    /// `existing_orders` are the orders staying open; `outdated_orders` are the
    /// ones cancelled this cycle, whose funds become reusable.
    pub fn infer_full_order_data_after_swaps(
        &self,
        existing_orders: &[LiveOrder],
        outdated_orders: &[LiveOrder],
        available_base: Option<Decimal>,
        available_quote: Option<Decimal>,
        reference_price: Decimal,
        daily_base_volume: Decimal,
        daily_quote_volume: Decimal,
    ) -> Result<ReconcileOutcome, DistributionError> {
        let result = self.infer_both_sides(
            existing_orders,
            outdated_orders,
            available_base,
            available_quote,
            reference_price,
            daily_base_volume,
            daily_quote_volume,
        );

        match result {
            Ok((bids, asks)) => {
                info!(bids = bids.len(), asks = asks.len(), "ladder inferred after swaps");
                Ok(ReconcileOutcome::Ladder { bids, asks })
            }
            Err(SwapError::RebalanceRequired(signal)) => {
                warn!(
                    side = %signal.side,
                    committed = %signal.committed_amount,
                    intended = %signal.intended_total,
                    "full book rebalance required"
                );
                Ok(ReconcileOutcome::RebalanceRequired(signal))
            }
            Err(SwapError::Distribution(err)) => Err(err),
        }
    }

    // returns (bids, asks)
    fn infer_both_sides(
        &self,
        existing_orders: &[LiveOrder],
        outdated_orders: &[LiveOrder],
        available_base: Option<Decimal>,
        available_quote: Option<Decimal>,
        reference_price: Decimal,
        daily_base_volume: Decimal,
        daily_quote_volume: Decimal,
    ) -> Result<(Vec<BookOrderData>, Vec<BookOrderData>), SwapError> {
        let existing_bids = existing_orders.iter().filter(|o| o.side == Side::Buy).count();
        let existing_asks = existing_orders.iter().filter(|o| o.side == Side::Sell).count();
        // the thinner side goes first, spaced against what is really on the book
        let first_side = if existing_asks < existing_bids {
            Side::Sell
        } else {
            Side::Buy
        };
        let second_side = first_side.opposite();
        let funds = |side: Side| match side {
            Side::Buy => available_quote,
            Side::Sell => available_base,
        };
        let daily_volume = |side: Side| match side {
            Side::Buy => daily_quote_volume,
            Side::Sell => daily_base_volume,
        };

        // crossed orders are about to be freed and must not push the first side away
        let book_context: Vec<BookOrderData> = existing_orders
            .iter()
            .filter(|o| o.side == second_side)
            .filter(|o| outward_distance(o.side, o.price, reference_price) > Decimal::ZERO)
            .map(LiveOrder::as_book_order)
            .collect();
        let first = self.infer_sided_order_data_after_swaps(
            first_side,
            existing_orders,
            outdated_orders,
            funds(first_side),
            reference_price,
            daily_volume(first_side),
            &book_context,
        )?;
        let second = self.infer_sided_order_data_after_swaps(
            second_side,
            existing_orders,
            outdated_orders,
            funds(second_side),
            reference_price,
            daily_volume(second_side),
            &first,
        )?;
        Ok(match first_side {
            Side::Buy => (first, second),
            Side::Sell => (second, first),
        })
    }

    /// Rebuild one side: match ideal slots to open orders then resolve missing amounts.
    pub fn infer_sided_order_data_after_swaps(
        &self,
        side: Side,
        existing_orders: &[LiveOrder],
        outdated_orders: &[LiveOrder],
        available_funds: Option<Decimal>,
        reference_price: Decimal,
        daily_volume: Decimal,
        other_side_orders: &[BookOrderData],
    ) -> Result<Vec<BookOrderData>, SwapError> {
        let prices = self.ideal_prices(side, reference_price, other_side_orders)?;
        let percents = self.ideal_volume_percents(side, &prices)?;
        let mut open: Vec<&LiveOrder> = existing_orders.iter().filter(|o| o.side == side).collect();
        open.sort_by_key(|o| outward_distance(side, o.price, reference_price));

        let (mut inferred, stray) = match_ideal_slots(side, &prices, &percents, &open, reference_price);
        debug!(
            %side,
            matched = inferred.iter().filter(|s| s.is_matched()).count(),
            missing = inferred.iter().filter(|s| !s.is_matched()).count(),
            stray = stray.len(),
            "ideal slots matched"
        );
        self.adapt_inferred_order_amounts(
            side,
            &mut inferred,
            outdated_orders,
            &stray,
            available_funds,
            reference_price,
            daily_volume,
            &prices,
        )?;
        Ok(inferred.iter().map(|slot| slot.to_book_order(side)).collect())
    }

    /// Give every unmatched slot its share of the capital left to place.
    pub fn adapt_inferred_order_amounts(
        &self,
        side: Side,
        inferred: &mut [InferredOrderData],
        outdated_orders: &[LiveOrder],
        stray_orders: &[&LiveOrder],
        available_funds: Option<Decimal>,
        reference_price: Decimal,
        daily_volume: Decimal,
        order_prices: &[Decimal],
    ) -> Result<(), SwapError> {
        let freed_by_outdated: Decimal = outdated_orders
            .iter()
            .filter(|o| o.side == side)
            .map(LiveOrder::freed_funds)
            .sum();
        let freed_by_stray: Decimal = stray_orders.iter().map(|o| o.freed_funds()).sum();
        let freed = freed_by_outdated + freed_by_stray;
        let committed: Decimal = inferred.iter().filter_map(|s| s.committed_funds(side)).sum();

        let side_capital = available_funds.map(|funds| funds + freed + committed);
        let ideal_total =
            self.get_total_volume_to_use(side, reference_price, daily_volume, side_capital, order_prices)?;
        let matched_totals: Vec<Decimal> = inferred
            .iter()
            .filter(|s| s.ideal_amount_percent > Decimal::ZERO)
            .filter_map(|s| {
                s.committed_funds(side)
                    .map(|funds| funds / s.ideal_amount_percent * dec!(100))
            })
            .collect();
        let intended_total = if matched_totals.is_empty() {
            ideal_total
        } else {
            let sum: Decimal = matched_totals.iter().sum();
            (sum / Decimal::from(matched_totals.len())).min(ideal_total)
        };

        let missing = intended_total - committed;
        if missing < Decimal::ZERO {
            return Err(RebalanceRequired {
                side,
                committed_amount: committed,
                intended_total,
            }
            .into());
        }
        let distributable = match available_funds {
            Some(funds) => missing.min(funds + freed),
            None => missing,
        };
        let missing_percent: Decimal = inferred
            .iter()
            .filter(|s| !s.is_matched())
            .map(|s| s.ideal_amount_percent)
            .sum();
        debug!(
            %side,
            %freed,
            %committed,
            %intended_total,
            %distributable,
            "missing amount to distribute"
        );

        for slot in inferred.iter_mut().filter(|s| !s.is_matched()) {
            let funds = if missing_percent > Decimal::ZERO {
                distributable * slot.ideal_amount_percent / missing_percent
            } else {
                Decimal::ZERO
            };
            let quantity = match side {
                Side::Buy => buy_quantity(funds, slot.final_price),
                Side::Sell => funds,
            };
            slot.final_amount = Some(quantity);
        }
        Ok(())
    }
}

// distance from the reference toward the side's own half of the book;
// zero or negative means the order sits at or across the reference price
fn outward_distance(side: Side, price: Decimal, reference_price: Decimal) -> Decimal {
    side.outward_sign() * (price - reference_price)
}

/// Two-pointer merge of ideal slots and open orders, both closest to the price first.
/// Returns one entry per slot plus the open orders no slot claimed. Orders at
/// or across the reference price are never claimed.
fn match_ideal_slots<'a>(
    side: Side,
    prices: &[Decimal],
    percents: &[Decimal],
    open_orders: &[&'a LiveOrder],
    reference_price: Decimal,
) -> (Vec<InferredOrderData>, Vec<&'a LiveOrder>) {
    let distances: Vec<Decimal> = prices
        .iter()
        .map(|p| outward_distance(side, *p, reference_price))
        .collect();
    let distance_of = |order: &&LiveOrder| outward_distance(side, order.price, reference_price);
    let mut orders = open_orders.iter().copied().peekable();
    let mut slots = Vec::with_capacity(prices.len());
    let mut stray = Vec::new();

    for (i, (price, percent)) in prices.iter().zip(percents).enumerate() {
        let (inner, outer) = matching_window(&distances, i);
        while let Some(order) =
            orders.next_if(|o| distance_of(o) <= Decimal::ZERO || distance_of(o) < inner)
        {
            stray.push(order);
        }
        let claimed = orders.next_if(|o| distance_of(o) <= outer);
        slots.push(InferredOrderData::new(*price, *percent, claimed));
    }
    stray.extend(orders);
    (slots, stray)
}

// window bounds, as distances from the reference price
fn matching_window(distances: &[Decimal], i: usize) -> (Decimal, Decimal) {
    let distance = distances[i];
    let previous_half_gap = i
        .checked_sub(1)
        .map(|prev| (distance - distances[prev]).abs() / Decimal::TWO);
    let inner_gap = previous_half_gap.unwrap_or(distance);
    let outer_gap = distances
        .get(i + 1)
        .map(|next| (*next - distance).abs() / Decimal::TWO)
        .or(previous_half_gap)
        .unwrap_or(distance);
    (distance - inner_gap, distance + outer_gap)
}
