// ladder-core: market-making order ladder engine.
// turns a reference price, daily volumes and funds into a bid/ask ladder,
// checks live books against it and repairs it after partial fills.
// all computation is synchronous with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Side, OrderId, distance_ratio
//   2.x  order.rs: BookOrderData (ladder order), LiveOrder (exchange order)
//   3.x  curve.rs: evenly spaced prices, increasing/decreasing/random volumes
//   4.x  market.rs: symbol precision, rounding and tradability checks
//   7.x  config.rs: DistributionConfig, limits and band constants
//   8.x  distribution/: engine: budgets, shape checks, swap reconciliation

pub mod config;
pub mod curve;
pub mod distribution;
pub mod market;
pub mod order;
pub mod types;

// re exports for convenience
pub use config::*;
pub use curve::*;
pub use distribution::*;
pub use market::*;
pub use order::*;
pub use types::*;
