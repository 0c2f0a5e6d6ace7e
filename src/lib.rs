//! Data-retrieval tools for Dadu River hydropower inflow.
//!
//! Two independent pieces:
//! - `pictures` maps a date/time window to rainfall picture URLs.
//! - `tools` fetches per-station inflow series (live workflow or local
//!   files), aggregates bounds and forecast bias, and renders Markdown
//!   tables plus chart options.

pub mod analysis;
pub mod config;
pub mod dev_mode;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pictures;
pub mod render;
pub mod stations;
pub mod timefmt;
pub mod tools;
