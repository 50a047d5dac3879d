//! Order Ladder Engine Simulation.
//!
//! Walks through the ladder lifecycle: computing a book around a price,
//! checking a live book against the config, and repairing it after fills.
//! Set `RUST_LOG=debug` to see budget details.

use ladder_core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Order Ladder Engine Simulation");
    println!("BTC/USDT, reference price $50,000\n");

    let scenarios: [(&str, fn() -> Result<(), DistributionError>); 4] = [
        ("Scenario 1: Ladder Computation", scenario_1_compute_ladder),
        ("Scenario 2: Funds-Constrained Ladder", scenario_2_scarce_funds),
        ("Scenario 3: Live Book Validation", scenario_3_validate_book),
        ("Scenario 4: Repair After Fills", scenario_4_swap_reconciliation),
    ];
    for (name, scenario) in scenarios {
        println!("{name}\n");
        if let Err(err) = scenario() {
            eprintln!("  {name} failed: {err}");
            std::process::exit(1);
        }
    }

    println!("\nAll simulations completed successfully.");
}

const REFERENCE_PRICE: Decimal = dec!(50000);
const DAILY_BASE_VOLUME: Decimal = dec!(120);
const DAILY_QUOTE_VOLUME: Decimal = dec!(6_000_000);

fn print_ladder(distribution: &OrderBookDistribution) {
    for order in distribution.asks().iter().rev() {
        println!("    ASK {:>12} x {}", order.price, order.amount);
    }
    println!("    --- {} ---", REFERENCE_PRICE);
    for order in distribution.bids() {
        println!("    BID {:>12} x {}", order.price, order.amount);
    }
}

/// Unconstrained ladder sized from daily volume only.
fn scenario_1_compute_ladder() -> Result<(), DistributionError> {
    let config = DistributionConfig {
        bids_count: 5,
        asks_count: 5,
        min_spread: dec!(0.004),
        max_spread: dec!(0.04),
        ..DistributionConfig::default()
    };
    let mut distribution = OrderBookDistribution::new(config)?;
    let market = MarketPrecision::btc_usdt();
    distribution.compute_distribution(
        REFERENCE_PRICE,
        DAILY_BASE_VOLUME,
        DAILY_QUOTE_VOLUME,
        &market,
        None,
        None,
    )?;

    print_ladder(&distribution);
    let bid_total: Decimal = distribution.bids().iter().map(BookOrderData::funds_amount).sum();
    let ask_total: Decimal = distribution.asks().iter().map(BookOrderData::funds_amount).sum();
    println!("\n  Bids use ${:.2}, asks use {} BTC", bid_total, ask_total);
    println!(
        "  Tradable on both sides: {}\n",
        distribution.can_create_at_least_one_order(&[Side::Buy, Side::Sell], &market)
    );
    Ok(())
}

/// Funds smaller than the ideal budget cap each side.
fn scenario_2_scarce_funds() -> Result<(), DistributionError> {
    let mut distribution = OrderBookDistribution::new(DistributionConfig::default())?;
    let market = MarketPrecision::btc_usdt();
    distribution.compute_distribution(
        REFERENCE_PRICE,
        DAILY_BASE_VOLUME,
        DAILY_QUOTE_VOLUME,
        &market,
        Some(dec!(0.05)),
        Some(dec!(40)),
    )?;

    let bid_total: Decimal = distribution.bids().iter().map(BookOrderData::funds_amount).sum();
    println!("  0.05 BTC and $40 available");
    println!("  Bids use ${:.2} over {} orders", bid_total, distribution.bids().len());
    println!(
        "  Bids tradable: {}, asks tradable: {}\n",
        distribution.can_create_at_least_one_order(&[Side::Buy], &market),
        distribution.can_create_at_least_one_order(&[Side::Sell], &market)
    );
    Ok(())
}

/// A fresh ladder passes every check, a skewed one does not.
fn scenario_3_validate_book() -> Result<(), DistributionError> {
    let mut distribution = OrderBookDistribution::new(DistributionConfig::default())?;
    distribution.compute_distribution(
        REFERENCE_PRICE,
        DAILY_BASE_VOLUME,
        DAILY_QUOTE_VOLUME,
        &MarketPrecision::default(),
        None,
        None,
    )?;
    let book: Vec<BookOrderData> = distribution
        .bids()
        .iter()
        .chain(distribution.asks())
        .cloned()
        .collect();

    let spread = distribution.is_spread_according_to_config(&book, &book);
    let distance = distribution.get_shape_distance_from(
        &book,
        None,
        None,
        REFERENCE_PRICE,
        DAILY_BASE_VOLUME,
        DAILY_QUOTE_VOLUME,
        "simulation",
    )?;
    println!("  Fresh ladder: spread {:?}, shape distance {:.4}", spread, distance);

    let bids_only: Vec<BookOrderData> = distribution.bids().to_vec();
    println!(
        "  After every ask filled: {:?}",
        distribution.is_spread_according_to_config(&bids_only, &bids_only)
    );

    let halved: Vec<BookOrderData> = book
        .iter()
        .map(|o| BookOrderData::new(o.price, o.amount / dec!(2), o.side))
        .collect();
    let distance = distribution.get_shape_distance_from(
        &halved,
        None,
        None,
        REFERENCE_PRICE,
        DAILY_BASE_VOLUME,
        DAILY_QUOTE_VOLUME,
        "simulation",
    )?;
    println!("  Half-sized ladder: shape distance {:.4}\n", distance);
    Ok(())
}

/// Inner ask filled and replaced, then daily volume collapses.
fn scenario_4_swap_reconciliation() -> Result<(), DistributionError> {
    let config = DistributionConfig {
        bids_count: 4,
        asks_count: 4,
        min_spread: dec!(0.02),
        max_spread: dec!(0.08),
        volume_multiplier: dec!(1),
        ..DistributionConfig::default()
    };
    let distribution = OrderBookDistribution::new(config)?;
    let mut next_id = 0;
    let mut order = |side: Side, price: Decimal, quantity: Decimal| {
        next_id += 1;
        LiveOrder::new(OrderId(next_id), side, price, quantity)
    };
    let existing = vec![
        order(Side::Buy, dec!(49500), dec!(0.01)),
        order(Side::Buy, dec!(49000), dec!(0.01)),
        order(Side::Buy, dec!(48500), dec!(0.01)),
        order(Side::Buy, dec!(48000), dec!(0.01)),
        order(Side::Sell, dec!(50500), dec!(0.01)),
        order(Side::Sell, dec!(51000), dec!(0.01)),
        order(Side::Sell, dec!(52000), dec!(0.01)),
    ];
    let outdated = vec![order(Side::Sell, dec!(53000), dec!(0.01)).with_filled(dec!(0.002))];

    let outcome = distribution.infer_full_order_data_after_swaps(
        &existing,
        &outdated,
        Some(Decimal::ZERO),
        Some(Decimal::ZERO),
        REFERENCE_PRICE,
        DAILY_BASE_VOLUME,
        DAILY_QUOTE_VOLUME,
    )?;
    match outcome {
        ReconcileOutcome::Ladder { bids, asks } => {
            println!("  Patched ladder: {} bids, {} asks", bids.len(), asks.len());
            for ask in &asks {
                println!("    ASK {:>12} x {}", ask.price, ask.amount);
            }
        }
        ReconcileOutcome::RebalanceRequired(signal) => println!("  Unexpected: {signal}"),
    }

    let outcome = distribution.infer_full_order_data_after_swaps(
        &existing,
        &outdated,
        Some(Decimal::ZERO),
        Some(Decimal::ZERO),
        REFERENCE_PRICE,
        dec!(0.01),
        DAILY_QUOTE_VOLUME,
    )?;
    println!("  After daily volume collapse, rebuild needed: {}", outcome.is_rebalance_required());
    Ok(())
}
