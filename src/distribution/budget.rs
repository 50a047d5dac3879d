//! Volume budget resolution.
//!
//! Turns "this share of the daily volume should sit near the price" into a
//! whole-side budget: the configured curve tells which fraction of the side
//! falls inside the depth band, and the side total is solved so that the band
//! holds exactly the target. Available funds cap the result.

use super::core::OrderBookDistribution;
use super::results::DistributionError;
use crate::config::{IDEAL_VOLUME_DECIMALS, TARGET_CUMULATED_VOLUME_PERCENT};
use crate::curve::{get_reference_order_volumes, ladder_prices};
use crate::order::BookOrderData;
use crate::types::{distance_ratio, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

/// Everything needed to lay out one side of the ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct SidedOrdersDetails {
    pub side: Side,
    pub orders_count: usize,
    /// Inner boundary, closest to the reference price.
    pub start_price: Decimal,
    /// Outer boundary.
    pub end_price: Decimal,
    /// Daily volume in the side's funding asset: quote for buys, base for sells.
    pub reference_volume: Decimal,
    pub available_funds: Option<Decimal>,
}

impl SidedOrdersDetails {
    pub fn order_prices(&self) -> Result<Vec<Decimal>, DistributionError> {
        ladder_prices(self.start_price, self.end_price, self.orders_count)
    }
}

impl OrderBookDistribution {
    pub fn get_sided_orders_details(
        &self,
        side: Side,
        reference_price: Decimal,
        daily_base_volume: Decimal,
        daily_quote_volume: Decimal,
        available_base: Option<Decimal>,
        available_quote: Option<Decimal>,
        other_side_orders: &[BookOrderData],
    ) -> Result<SidedOrdersDetails, DistributionError> {
        self.validate_config()?;
        let (start_price, end_price) = self.price_band(side, reference_price, other_side_orders)?;
        let (reference_volume, available_funds) = match side {
            Side::Buy => (daily_quote_volume, available_quote),
            Side::Sell => (daily_base_volume, available_base),
        };
        Ok(SidedOrdersDetails {
            side,
            orders_count: self.config.orders_count(side) as usize,
            start_price,
            end_price,
            reference_volume,
            available_funds,
        })
    }

    // inner boundary never gets closer than min_spread to the nearest opposite order
    fn price_band(
        &self,
        side: Side,
        reference_price: Decimal,
        other_side_orders: &[BookOrderData],
    ) -> Result<(Decimal, Decimal), DistributionError> {
        check_reference_price(reference_price)?;
        let min_spread = self.config.min_spread;
        let outward = side.outward_sign();
        let default_start = reference_price * (Decimal::ONE + outward * min_spread / Decimal::TWO);
        let min_gap = min_spread * reference_price;
        let start_price = match side {
            Side::Buy => other_side_orders
                .iter()
                .filter(|o| o.is_ask())
                .map(|o| o.price)
                .min()
                .map_or(default_start, |closest_ask| default_start.min(closest_ask - min_gap)),
            Side::Sell => other_side_orders
                .iter()
                .filter(|o| o.is_bid())
                .map(|o| o.price)
                .max()
                .map_or(default_start, |closest_bid| default_start.max(closest_bid + min_gap)),
        };
        let band_width = (self.config.max_spread - min_spread) / Decimal::TWO * reference_price;
        let end_price = start_price + outward * band_width;
        if start_price <= Decimal::ZERO || end_price <= Decimal::ZERO {
            return Err(DistributionError::InvalidArgument(format!(
                "{side} price band [{start_price}, {end_price}] is not positive"
            )));
        }
        Ok((start_price, end_price))
    }

    /// Ideal prices of a side, closest to the price first.
    pub(super) fn ideal_prices(
        &self,
        side: Side,
        reference_price: Decimal,
        other_side_orders: &[BookOrderData],
    ) -> Result<Vec<Decimal>, DistributionError> {
        let (start_price, end_price) = self.price_band(side, reference_price, other_side_orders)?;
        ladder_prices(start_price, end_price, self.config.orders_count(side) as usize)
    }

    /// Share of the side held by each slot, in percent.
    pub(super) fn ideal_volume_percents(
        &self,
        side: Side,
        order_prices: &[Decimal],
    ) -> Result<Vec<Decimal>, DistributionError> {
        get_reference_order_volumes(
            side,
            dec!(100),
            order_prices,
            self.config.volume_multiplier,
            self.config.direction,
        )
    }

    /// Side total whose depth band holds `daily_trading_volume_percent` of `reference_volume`.
    ///
    /// With `until_depth_threshold_only`, returns the depth band target itself.
    pub fn get_ideal_total_volume_to_use(
        &self,
        side: Side,
        reference_price: Decimal,
        reference_volume: Decimal,
        order_prices: &[Decimal],
        until_depth_threshold_only: bool,
        daily_trading_volume_percent: Decimal,
    ) -> Result<Decimal, DistributionError> {
        if order_prices.is_empty() {
            return Err(DistributionError::InvalidArgument(format!(
                "no {side} order price to compute a volume on"
            )));
        }
        check_reference_price(reference_price)?;
        let target_before_threshold = reference_volume * daily_trading_volume_percent / dec!(100);
        if until_depth_threshold_only {
            return Ok(target_before_threshold.round_dp(IDEAL_VOLUME_DECIMALS));
        }

        let percents = self.ideal_volume_percents(side, order_prices)?;
        let threshold = TARGET_CUMULATED_VOLUME_PERCENT / dec!(100);
        let orders_in_band = order_prices
            .iter()
            .filter(|price| distance_ratio(**price, reference_price) <= threshold)
            .count();
        let percent_volume_before_threshold: Decimal = if orders_in_band == 0 {
            percents[0]
        } else {
            percents.iter().take(orders_in_band).sum()
        };
        if percent_volume_before_threshold <= Decimal::ZERO {
            return Err(DistributionError::InvalidArgument(format!(
                "{side} volume curve holds nothing inside the depth band"
            )));
        }
        let ideal_total = (target_before_threshold / percent_volume_before_threshold * dec!(100))
            .round_dp(IDEAL_VOLUME_DECIMALS);
        debug!(
            %side,
            %target_before_threshold,
            %percent_volume_before_threshold,
            orders_in_band,
            %ideal_total,
            "ideal total volume"
        );
        Ok(ideal_total)
    }

    /// Ideal side total, capped by `available_funds` when given.
    pub fn get_total_volume_to_use(
        &self,
        side: Side,
        reference_price: Decimal,
        reference_volume: Decimal,
        available_funds: Option<Decimal>,
        order_prices: &[Decimal],
    ) -> Result<Decimal, DistributionError> {
        let ideal_total = self.get_ideal_total_volume_to_use(
            side,
            reference_price,
            reference_volume,
            order_prices,
            false,
            self.config.daily_trading_volume_percent,
        )?;
        Ok(match available_funds {
            Some(funds) if funds < ideal_total => {
                debug!(%side, %ideal_total, %funds, "volume capped by available funds");
                funds
            }
            _ => ideal_total,
        })
    }

    /// Funding amounts of the orders inside the depth band.
    pub fn get_market_depth_order_amounts(
        orders: &[BookOrderData],
        reference_price: Decimal,
    ) -> Vec<Decimal> {
        if reference_price <= Decimal::ZERO {
            return Vec::new();
        }
        let threshold = TARGET_CUMULATED_VOLUME_PERCENT / dec!(100);
        orders
            .iter()
            .filter(|order| distance_ratio(order.price, reference_price) <= threshold)
            .map(BookOrderData::funds_amount)
            .collect()
    }
}

pub(super) fn check_reference_price(reference_price: Decimal) -> Result<(), DistributionError> {
    if reference_price <= Decimal::ZERO {
        return Err(DistributionError::InvalidArgument(format!(
            "reference price must be positive, got {reference_price}"
        )));
    }
    Ok(())
}
