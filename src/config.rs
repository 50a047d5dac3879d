// 7.0 config.rs: ladder shape settings in one typed record. validated once, up front.
// 7.1 every bound here protects a division or a band computation downstream.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::curve::VolumeDirection;
use crate::distribution::DistributionError;
use crate::types::Side;

/// Hard cap on orders per side.
pub const MAX_ORDERS_PER_SIDE: u32 = 50;

/// Width of the "near top of book" band, in percent of the reference price.
pub const TARGET_CUMULATED_VOLUME_PERCENT: Decimal = dec!(3);

/// Precision of ideal volume figures.
pub const IDEAL_VOLUME_DECIMALS: u32 = 10;

// Configuration of one symbol's ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub bids_count: u32,
    pub asks_count: u32,
    // Innermost bid to innermost ask distance, as a fraction of price
    pub min_spread: Decimal,
    // Outermost bid to outermost ask distance, as a fraction of price
    pub max_spread: Decimal,
    // Share of the daily traded volume to keep inside the depth band (percent)
    #[serde(default = "default_daily_trading_volume_percent")]
    pub daily_trading_volume_percent: Decimal,
    // Last/first order size ratio, or random amplitude for the random direction
    #[serde(default = "default_volume_multiplier")]
    pub volume_multiplier: Decimal,
    #[serde(default)]
    pub direction: VolumeDirection,
}

fn default_daily_trading_volume_percent() -> Decimal {
    dec!(2)
}

fn default_volume_multiplier() -> Decimal {
    dec!(2)
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            bids_count: 10,
            asks_count: 10,
            min_spread: dec!(0.01),  // 1%
            max_spread: dec!(0.05),  // 5%
            daily_trading_volume_percent: default_daily_trading_volume_percent(),
            volume_multiplier: default_volume_multiplier(),
            direction: VolumeDirection::Decreasing,
        }
    }
}

impl DistributionConfig {
    /// Tight book for liquid pairs.
    pub fn tight() -> Self {
        Self {
            bids_count: 20,
            asks_count: 20,
            min_spread: dec!(0.002),
            max_spread: dec!(0.02),
            ..Self::default()
        }
    }

    pub fn orders_count(&self, side: Side) -> u32 {
        match side {
            Side::Buy => self.bids_count,
            Side::Sell => self.asks_count,
        }
    }

    /// Largest allowed `min_spread`: beyond it the innermost order already
    /// sits outside the depth band.
    pub fn max_min_spread() -> Decimal {
        Decimal::TWO * TARGET_CUMULATED_VOLUME_PERCENT / dec!(100)
    }

    pub fn validate(&self) -> Result<(), DistributionError> {
        for side in [Side::Buy, Side::Sell] {
            let count = self.orders_count(side);
            if count == 0 || count > MAX_ORDERS_PER_SIDE {
                return Err(DistributionError::InvalidOrderCount {
                    side,
                    count,
                    max: MAX_ORDERS_PER_SIDE,
                });
            }
        }
        if self.min_spread <= Decimal::ZERO || self.min_spread >= self.max_spread {
            return Err(DistributionError::InvalidSpread {
                min_spread: self.min_spread,
                max_spread: self.max_spread,
            });
        }
        let limit = Self::max_min_spread();
        if self.min_spread >= limit {
            return Err(DistributionError::MinSpreadTooWide {
                min_spread: self.min_spread,
                limit,
            });
        }
        if self.daily_trading_volume_percent <= Decimal::ZERO
            || self.daily_trading_volume_percent > dec!(100)
        {
            return Err(DistributionError::InvalidVolumePercent(
                self.daily_trading_volume_percent,
            ));
        }
        if !self.direction.accepts_multiplier(self.volume_multiplier) {
            return Err(DistributionError::InvalidMultiplier {
                multiplier: self.volume_multiplier,
                direction: self.direction,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(DistributionConfig::default().validate().is_ok());
        assert!(DistributionConfig::tight().validate().is_ok());
    }

    #[test]
    fn rejects_zero_and_excessive_counts() {
        let config = DistributionConfig {
            bids_count: 0,
            ..DistributionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DistributionError::InvalidOrderCount { side: Side::Buy, .. })
        ));

        let config = DistributionConfig {
            asks_count: MAX_ORDERS_PER_SIDE + 1,
            ..DistributionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DistributionError::InvalidOrderCount { side: Side::Sell, .. })
        ));
    }

    #[test]
    fn rejects_inverted_spreads() {
        let config = DistributionConfig {
            min_spread: dec!(0.05),
            max_spread: dec!(0.01),
            ..DistributionConfig::default()
        };
        assert!(matches!(config.validate(), Err(DistributionError::InvalidSpread { .. })));
    }

    #[test]
    fn rejects_min_spread_outside_depth_band() {
        let config = DistributionConfig {
            min_spread: dec!(0.06),
            max_spread: dec!(0.1),
            ..DistributionConfig::default()
        };
        assert!(matches!(config.validate(), Err(DistributionError::MinSpreadTooWide { .. })));
    }

    #[test]
    fn rejects_bad_volume_percent_and_multiplier() {
        let config = DistributionConfig {
            daily_trading_volume_percent: dec!(0),
            ..DistributionConfig::default()
        };
        assert!(matches!(config.validate(), Err(DistributionError::InvalidVolumePercent(_))));

        let config = DistributionConfig {
            direction: VolumeDirection::Random,
            volume_multiplier: dec!(1.5),
            ..DistributionConfig::default()
        };
        assert!(matches!(config.validate(), Err(DistributionError::InvalidMultiplier { .. })));

        // would shrink the decreasing curve away from the price
        let config = DistributionConfig {
            direction: VolumeDirection::Decreasing,
            volume_multiplier: dec!(0.5),
            ..DistributionConfig::default()
        };
        assert!(matches!(config.validate(), Err(DistributionError::InvalidMultiplier { .. })));
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "bids_count": 3,
            "asks_count": 4,
            "min_spread": "0.02",
            "max_spread": "0.08"
        }"#;
        let config: DistributionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.orders_count(Side::Sell), 4);
        assert_eq!(config.daily_trading_volume_percent, dec!(2));
        assert_eq!(config.volume_multiplier, dec!(2));
        assert_eq!(config.direction, VolumeDirection::Decreasing);

        let json = r#"{
            "bids_count": 3,
            "asks_count": 3,
            "min_spread": "0.02",
            "max_spread": "0.08",
            "volume_multiplier": "0.5",
            "direction": "random"
        }"#;
        let config: DistributionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.direction, VolumeDirection::Random);
        assert!(config.validate().is_ok());
    }
}
