//! rightsize-engine — the per-container recommendation pipeline.
//!
//! # Pipeline
//!
//! ```text
//! ContainerInput
//!   │
//!   ├── tunable_order()         ← DependencyGraph over the container's layers
//!   │
//!   └── for each term:
//!         monitoring_start_time() ─┐
//!         has_minimum_data() ──────┴─ false → skipped (NotEnoughData)
//!         aggregate()                 → AggregatedMetrics
//!         capped_observed_duration()  → hours
//!         for each tunable in order:
//!             registry.recommend() → TunableValue
//!             registry.format()    → EnvFragment
//!         merge_fragments()           → EnvVar
//! ```
//!
//! The engine holds only read-only state; one instance can evaluate many
//! containers from many threads at once.

pub mod engine;
pub mod error;
pub mod recommendation;

pub use engine::{RecommendationEngine, latest_interval_end};
pub use error::{EngineError, EngineResult};
pub use recommendation::{
    ContainerInput, ContainerRecommendation, Notification, NotificationKind, TermRecommendation,
    TunableRecommendation,
};
