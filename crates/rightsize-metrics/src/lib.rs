//! rightsize-metrics — turns raw interval results into decision inputs.
//!
//! # Architecture
//!
//! ```text
//! WindowEvaluator
//!   ├── monitoring_start_time() ← end time − term duration
//!   ├── has_minimum_data()      ← gates a term on coverage
//!   └── capped_observed_duration() → hours reported with the recommendation
//!
//! aggregate
//!   ├── plot_data()  → N percentile points across the monitoring window
//!   └── aggregate()  → whole-window summaries + plot data for layers
//! ```
//!
//! Everything here is synchronous and reads only its inputs, so callers
//! may evaluate many containers concurrently.

pub mod aggregate;
pub mod percentile;
pub mod window;

pub use aggregate::{aggregate, plot_data, representative_value};
pub use percentile::{Summary, percentile, summarize};
pub use window::{
    WindowEvaluator, capped_observed_duration, max_duration_hours, monitoring_start_time,
};
