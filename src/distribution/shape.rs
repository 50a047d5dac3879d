//! Book shape validation.
//!
//! Decides whether an open ladder is still acceptable: total volumes against
//! the config budget, curve shape against the ideal curve, and observed
//! spreads against configured ones. Non-compliance is reported as values,
//! with the reason logged.

use super::core::OrderBookDistribution;
use super::results::{DistributionError, SpreadCheck};
use crate::order::{sorted_by_distance, BookOrderData};
use crate::types::Side;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

/// Accepted window of real volume over target volume.
pub const MIN_VOLUME_RATIO: Decimal = dec!(0.80);
pub const MAX_VOLUME_RATIO: Decimal = dec!(1.50);

/// Accepted relative deviation of observed spreads.
pub const SPREAD_TOLERANCE: Decimal = dec!(0.10);

// curves whose range is under 1% of their max are compared as flat
const FLAT_CURVE_TOLERANCE: Decimal = dec!(0.01);

impl OrderBookDistribution {
    /// Whether the side's open volume matches what the config would place.
    ///
    /// `available_funds` excludes the funds already locked in `orders`.
    pub fn are_total_order_volumes_compatible_with_config(
        &self,
        orders: &[BookOrderData],
        available_funds: Option<Decimal>,
        reference_price: Decimal,
        daily_volume: Decimal,
        side: Side,
        trigger_source: &str,
    ) -> Result<bool, DistributionError> {
        let prices = self.ideal_prices(side, reference_price, &[])?;
        let side_orders: Vec<BookOrderData> = orders.iter().filter(|o| o.side == side).cloned().collect();
        let locked: Decimal = side_orders.iter().map(BookOrderData::funds_amount).sum();
        let total_funds = available_funds.map(|funds| funds + locked);
        let percent = self.config.daily_trading_volume_percent;
        let ideal_total = self.get_ideal_total_volume_to_use(
            side,
            reference_price,
            daily_volume,
            &prices,
            false,
            percent,
        )?;

        let (target, current, scope) = match total_funds {
            // scarce funds: the whole side should use them all
            Some(funds) if funds < ideal_total => (funds, locked, "total"),
            _ => {
                let target = self.get_ideal_total_volume_to_use(
                    side,
                    reference_price,
                    daily_volume,
                    &prices,
                    true,
                    percent,
                )?;
                let current: Decimal =
                    Self::get_market_depth_order_amounts(&side_orders, reference_price).iter().sum();
                (target, current, "depth")
            }
        };

        if target.is_zero() {
            return Ok(current.is_zero());
        }
        let ratio = current / target;
        if ratio < MIN_VOLUME_RATIO || ratio > MAX_VOLUME_RATIO {
            warn!(
                trigger_source,
                %side,
                scope,
                %current,
                %target,
                %ratio,
                "order volumes incompatible with config"
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// Distance in `[0, 1]` between the side's open orders and its ideal curve.
    pub fn get_sided_orders_distance_from_ideal(
        &self,
        orders: &[BookOrderData],
        available_funds: Option<Decimal>,
        reference_price: Decimal,
        daily_volume: Decimal,
        side: Side,
        trigger_source: &str,
    ) -> Result<Decimal, DistributionError> {
        let side_orders = sorted_by_distance(orders, side, reference_price);
        if side_orders.is_empty() {
            if self.config.orders_count(side) > 0 {
                warn!(trigger_source, %side, "no open order on side");
                return Ok(Decimal::ONE);
            }
            return Ok(Decimal::ZERO);
        }
        if !self.are_total_order_volumes_compatible_with_config(
            orders,
            available_funds,
            reference_price,
            daily_volume,
            side,
            trigger_source,
        )? {
            return Ok(Decimal::ONE);
        }

        let prices = self.ideal_prices(side, reference_price, &[])?;
        let ideal = self.ideal_volume_percents(side, &prices)?;
        let real: Vec<Decimal> = side_orders.iter().map(|o| o.funds_amount()).collect();
        let distance = curve_distance(&real, &ideal);
        debug!(trigger_source, %side, %distance, "shape distance from ideal");
        Ok(distance)
    }

    /// Mean of the bid side (quote funded) and ask side (base funded) distances.
    pub fn get_shape_distance_from(
        &self,
        orders: &[BookOrderData],
        available_base: Option<Decimal>,
        available_quote: Option<Decimal>,
        reference_price: Decimal,
        daily_base_volume: Decimal,
        daily_quote_volume: Decimal,
        trigger_source: &str,
    ) -> Result<Decimal, DistributionError> {
        let bids_distance = self.get_sided_orders_distance_from_ideal(
            orders,
            available_quote,
            reference_price,
            daily_quote_volume,
            Side::Buy,
            trigger_source,
        )?;
        let asks_distance = self.get_sided_orders_distance_from_ideal(
            orders,
            available_base,
            reference_price,
            daily_base_volume,
            Side::Sell,
            trigger_source,
        )?;
        Ok((bids_distance + asks_distance) / Decimal::TWO)
    }

    /// Check the observed spreads of `orders` against the config.
    ///
    /// `open_orders` is the live exchange book: an empty side is reported as
    /// missing, and a side count differing from the config skips the check
    /// while orders are being replaced.
    pub fn is_spread_according_to_config(
        &self,
        orders: &[BookOrderData],
        open_orders: &[BookOrderData],
    ) -> SpreadCheck {
        let live_bids = open_orders.iter().filter(|o| o.is_bid()).count();
        let live_asks = open_orders.iter().filter(|o| o.is_ask()).count();
        match (live_bids, live_asks) {
            (0, 0) => return SpreadCheck::MissingAll,
            (0, _) => return SpreadCheck::MissingBids,
            (_, 0) => return SpreadCheck::MissingAsks,
            _ => {}
        }
        if live_bids != self.config.bids_count as usize || live_asks != self.config.asks_count as usize {
            debug!(live_bids, live_asks, "orders count differs from config, spread not checked");
            return SpreadCheck::Compliant;
        }

        let bid_prices = orders.iter().filter(|o| o.is_bid()).map(|o| o.price);
        let ask_prices = orders.iter().filter(|o| o.is_ask()).map(|o| o.price);
        let (Some(best_bid), Some(worst_bid)) = (bid_prices.clone().max(), bid_prices.min()) else {
            warn!("no bid to measure spread on");
            return SpreadCheck::NonCompliant;
        };
        let (Some(best_ask), Some(worst_ask)) = (ask_prices.clone().min(), ask_prices.max()) else {
            warn!("no ask to measure spread on");
            return SpreadCheck::NonCompliant;
        };

        let min_spread = relative_spread(best_bid, best_ask);
        let max_spread = relative_spread(worst_bid, worst_ask);
        if !within_tolerance(min_spread, self.config.min_spread) {
            warn!(
                observed = %min_spread,
                configured = %self.config.min_spread,
                %best_bid,
                %best_ask,
                "min spread out of tolerance"
            );
            return SpreadCheck::NonCompliant;
        }
        if !within_tolerance(max_spread, self.config.max_spread) {
            warn!(
                observed = %max_spread,
                configured = %self.config.max_spread,
                %worst_bid,
                %worst_ask,
                "max spread out of tolerance"
            );
            return SpreadCheck::NonCompliant;
        }
        SpreadCheck::Compliant
    }
}

// gap normalized by the midpoint
fn relative_spread(bid: Decimal, ask: Decimal) -> Decimal {
    let mid = (bid + ask) / Decimal::TWO;
    if mid <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (ask - bid) / mid
}

fn within_tolerance(observed: Decimal, configured: Decimal) -> bool {
    if configured.is_zero() {
        return observed.is_zero();
    }
    (observed / configured - Decimal::ONE).abs() <= SPREAD_TOLERANCE
}

fn rescale(values: &[Decimal]) -> Vec<Decimal> {
    let (Some(min), Some(max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    let range = *max - *min;
    if range <= max.abs() * FLAT_CURVE_TOLERANCE {
        return vec![dec!(100); values.len()];
    }
    values.iter().map(|v| (*v - *min) / range * dec!(100)).collect()
}

/// Position by position distance of two curves, both closest to the price first.
/// Extra real orders count as full mismatch, missing ones as none.
pub(super) fn curve_distance(real: &[Decimal], ideal: &[Decimal]) -> Decimal {
    let real = rescale(real);
    let ideal = rescale(ideal);
    let positions = real.len().max(ideal.len());
    if positions == 0 {
        return Decimal::ZERO;
    }
    let total: Decimal = (0..positions)
        .map(|i| match (real.get(i), ideal.get(i)) {
            (Some(r), Some(x)) => (*r - *x).abs() / dec!(100),
            (Some(_), None) => Decimal::ONE,
            (None, _) => Decimal::ZERO,
        })
        .sum();
    total / Decimal::from(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistributionConfig;
    use crate::curve::VolumeDirection;

    fn distribution(bids_count: u32, asks_count: u32) -> OrderBookDistribution {
        OrderBookDistribution::new(DistributionConfig {
            bids_count,
            asks_count,
            min_spread: dec!(0.01),
            max_spread: dec!(0.02),
            daily_trading_volume_percent: dec!(2),
            volume_multiplier: dec!(2),
            direction: VolumeDirection::Decreasing,
        })
        .unwrap()
    }

    fn bid(price: Decimal) -> BookOrderData {
        BookOrderData::new(price, dec!(1), Side::Buy)
    }

    fn ask(price: Decimal) -> BookOrderData {
        BookOrderData::new(price, dec!(1), Side::Sell)
    }

    #[test]
    fn identical_curves_have_no_distance() {
        let curve = vec![dec!(10), dec!(20), dec!(30)];
        assert_eq!(curve_distance(&curve, &curve), Decimal::ZERO);
        // scale does not matter
        let scaled = vec![dec!(1), dec!(2), dec!(3)];
        assert_eq!(curve_distance(&scaled, &curve), Decimal::ZERO);
    }

    #[test]
    fn extra_real_order_is_full_mismatch() {
        let ideal = vec![dec!(10), dec!(20), dec!(30)];
        let real = vec![dec!(10), dec!(20), dec!(30), dec!(30)];
        // rescaled real: 0, 50, 100, 100; last has no ideal counterpart
        assert_eq!(curve_distance(&real, &ideal), dec!(0.25));
    }

    #[test]
    fn missing_real_order_counts_nothing() {
        let ideal = vec![dec!(10), dec!(20), dec!(30)];
        let real = vec![dec!(10), dec!(20)];
        // rescaled real: 0, 100 vs ideal 0, 50, 100
        let expected = dec!(0.5) / dec!(3);
        assert_eq!(curve_distance(&real, &ideal), expected);
    }

    #[test]
    fn flat_curves_compare_as_equal() {
        let ideal = vec![dec!(25), dec!(25), dec!(25)];
        let real = vec![dec!(2.5), dec!(2.501), dec!(2.5)];
        assert_eq!(curve_distance(&real, &ideal), Decimal::ZERO);
        assert_eq!(curve_distance(&[], &[]), Decimal::ZERO);
    }

    #[test]
    fn missing_asks_reported() {
        let d = distribution(2, 2);
        let open = vec![bid(dec!(99.5)), bid(dec!(99))];
        assert_eq!(d.is_spread_according_to_config(&open, &open), SpreadCheck::MissingAsks);
        assert!(d.is_spread_according_to_config(&open, &open).requires_orders());
    }

    #[test]
    fn missing_bids_and_all_reported() {
        let d = distribution(2, 2);
        let open = vec![ask(dec!(100.5))];
        assert_eq!(d.is_spread_according_to_config(&open, &open), SpreadCheck::MissingBids);
        assert_eq!(d.is_spread_according_to_config(&[], &[]), SpreadCheck::MissingAll);
    }

    #[test]
    fn spread_outside_tolerance_is_non_compliant() {
        let d = distribution(2, 2);
        // inner spread 1%, outer 4% for a configured 2%
        let book = vec![bid(dec!(99.5)), bid(dec!(98)), ask(dec!(100.5)), ask(dec!(102))];
        assert_eq!(d.is_spread_according_to_config(&book, &book), SpreadCheck::NonCompliant);
    }

    #[test]
    fn spread_within_tolerance_is_compliant() {
        let d = distribution(2, 2);
        let book = vec![bid(dec!(99.5)), bid(dec!(99)), ask(dec!(100.5)), ask(dec!(101.05))];
        assert!(d.is_spread_according_to_config(&book, &book).is_compliant());
    }

    #[test]
    fn too_tight_inner_spread_is_non_compliant() {
        let d = distribution(2, 2);
        let book = vec![bid(dec!(99.8)), bid(dec!(99)), ask(dec!(100.2)), ask(dec!(101))];
        assert_eq!(d.is_spread_according_to_config(&book, &book), SpreadCheck::NonCompliant);
    }

    #[test]
    fn count_mismatch_skips_spread_check() {
        let d = distribution(3, 3);
        let book = vec![bid(dec!(99.5)), bid(dec!(90)), ask(dec!(100.5)), ask(dec!(110))];
        assert_eq!(d.is_spread_according_to_config(&book, &book), SpreadCheck::Compliant);
    }
}
