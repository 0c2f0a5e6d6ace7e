/// Aggregation for the inflow tools.
///
/// Everything here is synchronous and deterministic: it runs after the fetch
/// stage has joined and only sees already-parsed series.
///
/// Submodules:
/// - `groupings`: lines bound pairs up by date/hour key across stations.
/// - `summary`: per-station bound averages and forecast-vs-actual bias.

pub mod groupings;
pub mod summary;

pub use summary::{round_one_decimal, round_whole};
