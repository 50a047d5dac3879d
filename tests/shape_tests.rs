//! Live book validation against a freshly computed ladder.

use ladder_core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const REFERENCE: Decimal = dec!(100);
const DAILY_BASE: Decimal = dec!(1000);
const DAILY_QUOTE: Decimal = dec!(100_000);
const EPSILON: Decimal = dec!(0.0001);

fn config() -> DistributionConfig {
    DistributionConfig {
        bids_count: 5,
        asks_count: 5,
        min_spread: dec!(0.01),
        max_spread: dec!(0.05),
        daily_trading_volume_percent: dec!(2),
        volume_multiplier: dec!(2),
        direction: VolumeDirection::Decreasing,
    }
}

fn computed(available_base: Option<Decimal>, available_quote: Option<Decimal>) -> OrderBookDistribution {
    let mut distribution = OrderBookDistribution::new(config()).unwrap();
    distribution
        .compute_distribution(
            REFERENCE,
            DAILY_BASE,
            DAILY_QUOTE,
            &MarketPrecision::default(),
            available_base,
            available_quote,
        )
        .unwrap();
    distribution
}

fn book(distribution: &OrderBookDistribution) -> Vec<BookOrderData> {
    distribution.bids().iter().chain(distribution.asks()).cloned().collect()
}

fn shape_distance(distribution: &OrderBookDistribution, orders: &[BookOrderData]) -> Decimal {
    distribution
        .get_shape_distance_from(orders, None, None, REFERENCE, DAILY_BASE, DAILY_QUOTE, "test")
        .unwrap()
}

#[test]
fn fresh_ladder_matches_its_config() {
    let distribution = computed(None, None);
    let orders = book(&distribution);

    assert!(distribution.is_spread_according_to_config(&orders, &orders).is_compliant());
    assert!(shape_distance(&distribution, &orders) < EPSILON);
    for (side, volume) in [(Side::Buy, DAILY_QUOTE), (Side::Sell, DAILY_BASE)] {
        assert!(distribution
            .are_total_order_volumes_compatible_with_config(&orders, None, REFERENCE, volume, side, "test")
            .unwrap());
    }
}

#[test]
fn empty_book_is_maximally_distant() {
    let distribution = computed(None, None);
    assert_eq!(shape_distance(&distribution, &[]), Decimal::ONE);
}

#[test]
fn one_missing_side_counts_half() {
    let distribution = computed(None, None);
    let bids_only = distribution.bids().to_vec();
    let distance = shape_distance(&distribution, &bids_only);
    assert!((distance - dec!(0.5)).abs() < EPSILON, "distance {distance}");
}

#[test]
fn undersized_ladder_is_incompatible() {
    let distribution = computed(None, None);
    let halved: Vec<BookOrderData> = book(&distribution)
        .iter()
        .map(|o| BookOrderData::new(o.price, o.amount / dec!(2), o.side))
        .collect();

    assert!(!distribution
        .are_total_order_volumes_compatible_with_config(&halved, None, REFERENCE, DAILY_BASE, Side::Sell, "test")
        .unwrap());
    assert_eq!(shape_distance(&distribution, &halved), Decimal::ONE);
}

#[test]
fn reversed_curve_is_distant() {
    let distribution = computed(None, None);
    let asks = distribution.asks();
    let amounts: Vec<Decimal> = asks.iter().rev().map(|o| o.amount).collect();
    let reversed: Vec<BookOrderData> = asks
        .iter()
        .zip(amounts)
        .map(|(o, amount)| BookOrderData::new(o.price, amount, Side::Sell))
        .collect();

    // same total, mirrored curve: rescaled positions differ by 100, 50, 0, 50, 100
    let distance = distribution
        .get_sided_orders_distance_from_ideal(&reversed, None, REFERENCE, DAILY_BASE, Side::Sell, "test")
        .unwrap();
    assert!((distance - dec!(0.6)).abs() < EPSILON, "distance {distance}");
}

#[test]
fn scarce_funds_compare_whole_side() {
    // ideal ask total is 20 base, only 0.5 available
    let distribution = computed(Some(dec!(0.5)), None);
    let asks = distribution.asks().to_vec();
    let placed: Decimal = asks.iter().map(|o| o.amount).sum();
    assert_eq!(placed, dec!(0.5));

    // everything is on the book
    assert!(distribution
        .are_total_order_volumes_compatible_with_config(
            &asks,
            Some(Decimal::ZERO),
            REFERENCE,
            DAILY_BASE,
            Side::Sell,
            "test",
        )
        .unwrap());
    // 10 more base sit unused
    assert!(!distribution
        .are_total_order_volumes_compatible_with_config(
            &asks,
            Some(dec!(10)),
            REFERENCE,
            DAILY_BASE,
            Side::Sell,
            "test",
        )
        .unwrap());
}

#[test]
fn untradable_ladder_is_reported() {
    let distribution = computed(None, None);
    let market = MarketPrecision {
        min_amount: Some(dec!(1000)),
        ..MarketPrecision::default()
    };
    assert!(distribution.can_create_at_least_one_order(&[Side::Buy, Side::Sell], &MarketPrecision::default()));
    assert!(!distribution.can_create_at_least_one_order(&[Side::Sell], &market));
}
