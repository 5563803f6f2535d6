//! rightsize-layers — per-layer decision handlers.
//!
//! # Architecture
//!
//! ```text
//! LayerRegistry (built once, shared read-only)
//!   ├── container → cpu/memory requests and limits from usage summaries
//!   ├── hotspot   → MaxRAMPercentage, GC choice for the Hotspot JVM
//!   ├── semeru    → MaxRAMPercentage, GC policy for OpenJ9
//!   └── quarkus   → worker thread pool size
//!
//! recommend(spec, resolved, metrics) → Option<TunableValue>
//! format(spec, value, resolved)      → Vec<EnvFragment> → merge_fragments()
//! ```
//!
//! Handlers read earlier decisions through [`ResolvedValues`], falling back
//! to the container's current settings when a dependency has not been
//! decided yet.

pub mod container;
pub mod env;
pub mod error;
pub mod hotspot;
pub mod jvm;
pub mod layer;
pub mod quarkus;
pub mod registry;
pub mod semeru;
pub mod value;

#[cfg(test)]
mod testing;

pub use container::ContainerLayer;
pub use env::{EnvFragment, EnvVar, JAVA_OPTIONS, JDK_JAVA_OPTIONS, merge_fragments};
pub use error::{LayerError, LayerResult};
pub use hotspot::HotspotLayer;
pub use layer::Layer;
pub use quarkus::QuarkusLayer;
pub use registry::LayerRegistry;
pub use semeru::SemeruLayer;
pub use value::{ContainerContext, ResolvedValues, TunableValue};
