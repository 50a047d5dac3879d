//! Price and volume curve generation.
//!
//! Prices are evenly spaced from the side's inner boundary outward. Volumes
//! follow an arithmetic profile whose last/first ratio equals the configured
//! multiplier, or a bounded random profile. Every profile sums exactly to the
//! requested total: the outermost slot absorbs decimal rounding.

use crate::distribution::DistributionError;
use crate::types::Side;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

// random weights are drawn on this integer grid then mapped to [1-m, 1+m]
const WEIGHT_RESOLUTION: u32 = 1_000_000;

/// Shape of the volume curve, read from the reference price outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeDirection {
    /// Orders nearest the price are the largest. Multiplier must be at least 1.
    Increasing,
    /// Orders nearest the price are the smallest. Liquidity thickens with distance.
    /// Multiplier must be at least 1.
    Decreasing,
    /// Per-order weights drawn uniformly in `[1 - multiplier, 1 + multiplier]`.
    Random,
}

impl Default for VolumeDirection {
    fn default() -> Self {
        Self::Decreasing
    }
}

impl VolumeDirection {
    pub fn accepts_multiplier(&self, multiplier: Decimal) -> bool {
        match self {
            // below 1 the arithmetic profile would run the other way
            VolumeDirection::Increasing | VolumeDirection::Decreasing => multiplier >= Decimal::ONE,
            VolumeDirection::Random => multiplier >= Decimal::ZERO && multiplier < Decimal::ONE,
        }
    }
}

/// `count` prices in arithmetic progression from `start_price` to `end_price`, both included.
pub fn get_order_prices(
    start_price: Decimal,
    end_price: Decimal,
    count: usize,
) -> Result<Vec<Decimal>, DistributionError> {
    if count < 2 {
        return Err(DistributionError::InvalidArgument(format!(
            "at least 2 prices are required, got {count}"
        )));
    }
    let increment = (end_price - start_price) / Decimal::from(count - 1);
    let mut prices: Vec<Decimal> = (0..count - 1)
        .map(|i| start_price + increment * Decimal::from(i))
        .collect();
    prices.push(end_price);
    Ok(prices)
}

/// One volume per price, summing to `total_volume`.
pub fn get_order_volumes(
    side: Side,
    total_volume: Decimal,
    order_prices: &[Decimal],
    multiplier: Decimal,
    direction: VolumeDirection,
) -> Result<Vec<Decimal>, DistributionError> {
    get_order_volumes_with_rng(
        side,
        total_volume,
        order_prices,
        multiplier,
        direction,
        &mut rand::thread_rng(),
    )
}

/// Same as [`get_order_volumes`], drawing random weights from `rng`.
pub fn get_order_volumes_with_rng<R: Rng + ?Sized>(
    side: Side,
    total_volume: Decimal,
    order_prices: &[Decimal],
    multiplier: Decimal,
    direction: VolumeDirection,
    rng: &mut R,
) -> Result<Vec<Decimal>, DistributionError> {
    let count = order_prices.len();
    if count < 2 {
        return Err(DistributionError::InvalidArgument(format!(
            "at least 2 {side} orders are required to build a volume curve, got {count}"
        )));
    }
    if !direction.accepts_multiplier(multiplier) {
        return Err(DistributionError::InvalidMultiplier {
            multiplier,
            direction,
        });
    }
    let volumes = match direction {
        VolumeDirection::Decreasing => arithmetic_volumes(total_volume, count, multiplier),
        VolumeDirection::Increasing => {
            let mut volumes = arithmetic_volumes(total_volume, count, multiplier);
            volumes.reverse();
            volumes
        }
        VolumeDirection::Random => random_volumes(total_volume, count, multiplier, rng),
    };
    trace!(%side, %total_volume, ?direction, ?volumes, "order volumes");
    Ok(volumes)
}

/// Deterministic curve used as the reference shape. `Random` is replaced by
/// its expected value, a flat curve.
pub fn get_reference_order_volumes(
    side: Side,
    total_volume: Decimal,
    order_prices: &[Decimal],
    multiplier: Decimal,
    direction: VolumeDirection,
) -> Result<Vec<Decimal>, DistributionError> {
    match order_prices.len() {
        0 => Err(DistributionError::InvalidArgument(format!(
            "no {side} price to build a volume curve on"
        ))),
        1 => Ok(vec![total_volume]),
        _ => match direction {
            VolumeDirection::Random => get_order_volumes(
                side,
                total_volume,
                order_prices,
                Decimal::ONE,
                VolumeDirection::Decreasing,
            ),
            _ => get_order_volumes(side, total_volume, order_prices, multiplier, direction),
        },
    }
}

// single order sides sit on their inner boundary
pub(crate) fn ladder_prices(
    start_price: Decimal,
    end_price: Decimal,
    count: usize,
) -> Result<Vec<Decimal>, DistributionError> {
    match count {
        0 => Ok(Vec::new()),
        1 => Ok(vec![start_price]),
        _ => get_order_prices(start_price, end_price, count),
    }
}

pub(crate) fn ladder_volumes(
    side: Side,
    total_volume: Decimal,
    order_prices: &[Decimal],
    multiplier: Decimal,
    direction: VolumeDirection,
) -> Result<Vec<Decimal>, DistributionError> {
    match order_prices.len() {
        0 => Ok(Vec::new()),
        1 => Ok(vec![total_volume]),
        _ => get_order_volumes(side, total_volume, order_prices, multiplier, direction),
    }
}

fn arithmetic_volumes(total_volume: Decimal, count: usize, multiplier: Decimal) -> Vec<Decimal> {
    let n = Decimal::from(count);
    let average = total_volume / n;
    // first + last == 2 * average and last == first * multiplier
    let first = Decimal::TWO * average / (multiplier + Decimal::ONE);
    let step = first * (multiplier - Decimal::ONE) / (n - Decimal::ONE);
    close_on_total(
        total_volume,
        (0..count - 1).map(|i| first + step * Decimal::from(i)).collect(),
    )
}

fn random_volumes<R: Rng + ?Sized>(
    total_volume: Decimal,
    count: usize,
    multiplier: Decimal,
    rng: &mut R,
) -> Vec<Decimal> {
    let resolution = Decimal::from(WEIGHT_RESOLUTION);
    let weights: Vec<Decimal> = (0..count)
        .map(|_| {
            let draw = Decimal::from(rng.gen_range(0..=WEIGHT_RESOLUTION));
            Decimal::ONE - multiplier + Decimal::TWO * multiplier * draw / resolution
        })
        .collect();
    let weight_sum: Decimal = weights.iter().sum();
    close_on_total(
        total_volume,
        weights[..count - 1]
            .iter()
            .map(|w| total_volume * w / weight_sum)
            .collect(),
    )
}

fn close_on_total(total_volume: Decimal, mut volumes: Vec<Decimal>) -> Vec<Decimal> {
    let allocated: Decimal = volumes.iter().sum();
    volumes.push(total_volume - allocated);
    volumes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn prices(count: usize) -> Vec<Decimal> {
        get_order_prices(dec!(100), dec!(90), count).unwrap()
    }

    #[test]
    fn prices_evenly_spaced() {
        assert_eq!(prices(3), vec![dec!(100), dec!(95), dec!(90)]);
        assert_eq!(
            get_order_prices(dec!(101), dec!(104), 4).unwrap(),
            vec![dec!(101), dec!(102), dec!(103), dec!(104)]
        );
    }

    #[test]
    fn prices_require_two_points() {
        assert!(matches!(
            get_order_prices(dec!(100), dec!(90), 1),
            Err(DistributionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn flat_curve_with_unit_multiplier() {
        let volumes =
            get_order_volumes(Side::Sell, dec!(100), &prices(4), dec!(1), VolumeDirection::Decreasing)
                .unwrap();
        assert_eq!(volumes, vec![dec!(25), dec!(25), dec!(25), dec!(25)]);
    }

    #[test]
    fn decreasing_grows_away_from_price() {
        let volumes =
            get_order_volumes(Side::Buy, dec!(100), &prices(3), dec!(2), VolumeDirection::Decreasing)
                .unwrap();
        assert!(volumes[0] < volumes[1] && volumes[1] < volumes[2]);
        assert_eq!(volumes.iter().sum::<Decimal>(), dec!(100));
        // 200/9, 300/9, 400/9
        assert!((volumes[0] - dec!(22.2222222222)).abs() < dec!(0.000001));
        assert!((volumes[2] / volumes[0] - dec!(2)).abs() < dec!(0.000001));
    }

    #[test]
    fn increasing_shrinks_away_from_price() {
        let volumes =
            get_order_volumes(Side::Buy, dec!(100), &prices(3), dec!(2), VolumeDirection::Increasing)
                .unwrap();
        assert!(volumes[0] > volumes[1] && volumes[1] > volumes[2]);
        assert_eq!(volumes.iter().sum::<Decimal>(), dec!(100));
        assert!((volumes[0] - dec!(44.4444444444)).abs() < dec!(0.000001));
    }

    #[test]
    fn random_stays_within_bounds_and_total() {
        let mut rng = StdRng::seed_from_u64(7);
        let volumes = get_order_volumes_with_rng(
            Side::Sell,
            dec!(100),
            &prices(10),
            dec!(0.5),
            VolumeDirection::Random,
            &mut rng,
        )
        .unwrap();
        assert_eq!(volumes.len(), 10);
        assert_eq!(volumes.iter().sum::<Decimal>(), dec!(100));
        // weights within [0.5, 1.5] keep every volume in [10/3, 30]
        for volume in volumes {
            assert!(volume > dec!(3.3) && volume < dec!(30.1), "volume {volume}");
        }
    }

    #[test]
    fn random_rejects_multiplier_of_one() {
        let result =
            get_order_volumes(Side::Sell, dec!(100), &prices(3), dec!(1), VolumeDirection::Random);
        assert!(matches!(result, Err(DistributionError::InvalidMultiplier { .. })));
    }

    #[test]
    fn arithmetic_rejects_multiplier_below_one() {
        for direction in [VolumeDirection::Increasing, VolumeDirection::Decreasing] {
            let result = get_order_volumes(Side::Buy, dec!(100), &prices(3), dec!(0.5), direction);
            assert!(matches!(result, Err(DistributionError::InvalidMultiplier { .. })));
        }
        assert!(VolumeDirection::Decreasing.accepts_multiplier(dec!(1)));
        assert!(!VolumeDirection::Decreasing.accepts_multiplier(dec!(0.99)));
    }

    #[test]
    fn volumes_require_two_prices() {
        let result = get_order_volumes(
            Side::Sell,
            dec!(100),
            &[dec!(100)],
            dec!(1),
            VolumeDirection::Decreasing,
        );
        assert!(matches!(result, Err(DistributionError::InvalidArgument(_))));
    }

    #[test]
    fn reference_curve_of_random_is_flat() {
        let volumes = get_reference_order_volumes(
            Side::Buy,
            dec!(100),
            &prices(4),
            dec!(0.5),
            VolumeDirection::Random,
        )
        .unwrap();
        assert_eq!(volumes, vec![dec!(25), dec!(25), dec!(25), dec!(25)]);
    }

    #[test]
    fn single_order_ladder() {
        assert_eq!(ladder_prices(dec!(99), dec!(95), 1).unwrap(), vec![dec!(99)]);
        assert_eq!(
            ladder_volumes(Side::Buy, dec!(7), &[dec!(99)], dec!(2), VolumeDirection::Increasing)
                .unwrap(),
            vec![dec!(7)]
        );
    }
}
