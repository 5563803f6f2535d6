//! rightsize-tunables — orders tunables declared by independent layers.
//!
//! Every participating layer declares its tunables and, per tunable, the
//! tunables (possibly in other layers) it requires. [`DependencyGraph`]
//! collects those declarations for one evaluation and resolves a single
//! total order with Kahn's algorithm, failing outright on a cycle.

pub mod error;
pub mod graph;
pub mod spec;

pub use error::{TunableError, TunableResult};
pub use graph::DependencyGraph;
pub use rightsize_core::ResolveOrder;
pub use spec::TunableSpec;
