// 8.0: order book distribution engine. builds ladders, validates live books against them,
// and patches them after partial fills. pure computation, no I/O, caller serializes access.

mod budget;
mod core;
mod results;
mod shape;
mod swaps;

pub use self::core::OrderBookDistribution;
pub use budget::SidedOrdersDetails;
pub use results::{
    DistributionError, RebalanceRequired, ReconcileOutcome, SpreadCheck, SwapError,
};
pub use shape::{MAX_VOLUME_RATIO, MIN_VOLUME_RATIO, SPREAD_TOLERANCE};
pub use swaps::InferredOrderData;
