// 8.0 distribution/core.rs: the ladder engine. holds the config and the last computed ladder.

use super::results::DistributionError;
use crate::config::DistributionConfig;
use crate::curve::ladder_volumes;
use crate::market::MarketPrecision;
use crate::order::{buy_quantity, BookOrderData};
use crate::types::Side;
use rust_decimal::Decimal;
use tracing::debug;

/** 8.1: one instance per traded symbol. only compute_distribution writes bids/asks */
#[derive(Debug, Clone)]
pub struct OrderBookDistribution {
    pub(super) config: DistributionConfig,
    pub(super) bids: Vec<BookOrderData>,
    pub(super) asks: Vec<BookOrderData>,
}

impl OrderBookDistribution {
    pub fn new(config: DistributionConfig) -> Result<Self, DistributionError> {
        config.validate()?;
        Ok(Self {
            config,
            bids: Vec::new(),
            asks: Vec::new(),
        })
    }

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    pub fn validate_config(&self) -> Result<(), DistributionError> {
        self.config.validate()
    }

    /// Last computed bids, closest to the price first.
    pub fn bids(&self) -> &[BookOrderData] {
        &self.bids
    }

    /// Last computed asks, closest to the price first.
    pub fn asks(&self) -> &[BookOrderData] {
        &self.asks
    }

    pub fn orders(&self, side: Side) -> &[BookOrderData] {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Build the full ladder around `reference_price`.
    ///
    /// `None` funds mean unconstrained. Prices and quantities are rounded to
    /// `symbol_market` precision, away from the price and down respectively.
    pub fn compute_distribution(
        &mut self,
        reference_price: Decimal,
        daily_base_volume: Decimal,
        daily_quote_volume: Decimal,
        symbol_market: &MarketPrecision,
        available_base: Option<Decimal>,
        available_quote: Option<Decimal>,
    ) -> Result<(), DistributionError> {
        let volumes = DailyVolumes {
            base: daily_base_volume,
            quote: daily_quote_volume,
        };
        let funds = Funds {
            base: available_base,
            quote: available_quote,
        };
        let bids = self.compute_sided_orders(
            Side::Buy,
            reference_price,
            volumes,
            funds,
            symbol_market,
            &[],
        )?;
        let asks = self.compute_sided_orders(
            Side::Sell,
            reference_price,
            volumes,
            funds,
            symbol_market,
            &bids,
        )?;
        debug!(
            %reference_price,
            bids = bids.len(),
            asks = asks.len(),
            "computed order book distribution"
        );
        self.bids = bids;
        self.asks = asks;
        Ok(())
    }

    fn compute_sided_orders(
        &self,
        side: Side,
        reference_price: Decimal,
        volumes: DailyVolumes,
        funds: Funds,
        symbol_market: &MarketPrecision,
        other_side_orders: &[BookOrderData],
    ) -> Result<Vec<BookOrderData>, DistributionError> {
        let details = self.get_sided_orders_details(
            side,
            reference_price,
            volumes.base,
            volumes.quote,
            funds.base,
            funds.quote,
            other_side_orders,
        )?;
        let prices = details.order_prices()?;
        let total_volume = self.get_total_volume_to_use(
            side,
            reference_price,
            details.reference_volume,
            details.available_funds,
            &prices,
        )?;
        let order_volumes = ladder_volumes(
            side,
            total_volume,
            &prices,
            self.config.volume_multiplier,
            self.config.direction,
        )?;
        debug!(%side, %total_volume, ?prices, "sided ladder budget");

        let mut orders = Vec::with_capacity(prices.len());
        for (price, volume) in prices.into_iter().zip(order_volumes) {
            let price = symbol_market.round_price(price, side);
            if price <= Decimal::ZERO {
                return Err(DistributionError::InvalidArgument(format!(
                    "{side} price rounded to {price}"
                )));
            }
            let quantity = match side {
                Side::Buy => buy_quantity(volume, price),
                Side::Sell => volume,
            };
            orders.push(BookOrderData::new(
                price,
                symbol_market.floor_amount(quantity),
                side,
            ));
        }
        Ok(orders)
    }

    /// True when every requested side holds at least one order the exchange would accept.
    pub fn can_create_at_least_one_order(&self, sides: &[Side], symbol_market: &MarketPrecision) -> bool {
        sides.iter().all(|side| {
            let tradable = self
                .orders(*side)
                .iter()
                .any(|order| symbol_market.is_tradable(order.price, order.amount));
            if !tradable {
                debug!(%side, "no tradable order in computed ladder");
            }
            tradable
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct DailyVolumes {
    base: Decimal,
    quote: Decimal,
}

#[derive(Debug, Clone, Copy)]
struct Funds {
    base: Option<Decimal>,
    quote: Option<Decimal>,
}
