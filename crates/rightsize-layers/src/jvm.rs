//! JVM decision logic shared by the Hotspot and Semeru layers.

use std::fmt;

use rightsize_core::{DependencyConfig, LayerConfig, TunableConfig, TunableRef};
use tracing::debug;

use crate::container::{self, CONTAINER, CPU_LIMIT, MEMORY_LIMIT};
use crate::value::{ResolvedValues, TunableValue};

pub const MAX_RAM_PERCENTAGE: &str = "MaxRAMPercentage";
pub const GC_POLICY: &str = "GCPolicy";

/// MaxRAMPercentage recommended for both JVMs.
pub const DEFAULT_MAX_RAM_PERCENTAGE: f64 = 80.0;

/// Heap size at which the decision tables switch to large-heap collectors.
const LARGE_HEAP_MB: f64 = 4096.0;

const DEFAULT_JDK_MAJOR: u32 = 8;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Major version of a JDK version string.
///
/// `"1.x"` maps to `x`, `"N"` and `"N.y.z"` map to `N`. Missing, empty or
/// unparsable input maps to 8.
pub fn parse_major_version(version: Option<&str>) -> u32 {
    let Some(version) = version.map(str::trim).filter(|v| !v.is_empty()) else {
        return DEFAULT_JDK_MAJOR;
    };

    let mut parts = version.split('.');
    let first = parts.next().and_then(leading_number);
    let major = match first {
        Some(1) => parts.next().and_then(leading_number),
        other => other,
    };

    major.unwrap_or_else(|| {
        debug!(version, "unparsable JDK version, assuming 8");
        DEFAULT_JDK_MAJOR
    })
}

fn leading_number(part: &str) -> Option<u32> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotGc {
    Serial,
    Parallel,
    G1,
    Z,
    Shenandoah,
}

impl HotspotGc {
    pub fn as_str(&self) -> &'static str {
        match self {
            HotspotGc::Serial => "Serial",
            HotspotGc::Parallel => "Parallel",
            HotspotGc::G1 => "G1GC",
            HotspotGc::Z => "ZGC",
            HotspotGc::Shenandoah => "Shenandoah",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Serial" => Some(HotspotGc::Serial),
            "Parallel" => Some(HotspotGc::Parallel),
            "G1GC" => Some(HotspotGc::G1),
            "ZGC" => Some(HotspotGc::Z),
            "Shenandoah" => Some(HotspotGc::Shenandoah),
            _ => None,
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            HotspotGc::Serial => "-XX:+UseSerialGC",
            HotspotGc::Parallel => "-XX:+UseParallelGC",
            HotspotGc::G1 => "-XX:+UseG1GC",
            HotspotGc::Z => "-XX:+UseZGC",
            HotspotGc::Shenandoah => "-XX:+UseShenandoahGC",
        }
    }
}

impl fmt::Display for HotspotGc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemeruGc {
    Gencon,
    Balanced,
}

impl SemeruGc {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemeruGc::Gencon => "gencon",
            SemeruGc::Balanced => "balanced",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "gencon" => Some(SemeruGc::Gencon),
            "balanced" => Some(SemeruGc::Balanced),
            _ => None,
        }
    }

    pub fn flag(&self) -> String {
        format!("-Xgcpolicy:{}", self.as_str())
    }
}

impl fmt::Display for SemeruGc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hotspot collector for a heap size, core count and JDK major version.
///
/// | heap     | cores | JDK   | result     |
/// |----------|-------|-------|------------|
/// | < 4096   | ≤ 1   | any   | Serial     |
/// | < 4096   | > 1   | any   | Parallel   |
/// | ≥ 4096   | > 1   | ≥ 17  | ZGC        |
/// | ≥ 4096   | any   | 11–16 | Shenandoah |
/// | ≥ 4096   | other |       | G1GC       |
pub fn hotspot_gc_policy(heap_mb: f64, cores: f64, jdk_major: u32) -> HotspotGc {
    if heap_mb < LARGE_HEAP_MB {
        return if cores <= 1.0 {
            HotspotGc::Serial
        } else {
            HotspotGc::Parallel
        };
    }
    match jdk_major {
        17.. if cores > 1.0 => HotspotGc::Z,
        11..=16 => HotspotGc::Shenandoah,
        _ => HotspotGc::G1,
    }
}

/// Semeru (OpenJ9) policy: `balanced` for large heaps on more than one
/// core, `gencon` otherwise.
pub fn semeru_gc_policy(heap_mb: f64, cores: f64) -> SemeruGc {
    if heap_mb >= LARGE_HEAP_MB && cores > 1.0 {
        SemeruGc::Balanced
    } else {
        SemeruGc::Gencon
    }
}

/// Heap in MB: the configured heap when known, otherwise
/// `ceil(max_ram_percent / 100 × memory limit)`.
pub fn heap_size_mb(resolved: &ResolvedValues, max_ram_percent: f64) -> Option<f64> {
    if let Some(heap) = resolved.context().max_heap_mb {
        return Some(heap);
    }
    let memory_limit_mb = container::memory_limit_bytes(resolved)? / BYTES_PER_MB;
    Some((max_ram_percent / 100.0 * memory_limit_mb).ceil())
}

/// The layer's own MaxRAMPercentage if already decided, else the default.
pub fn max_ram_percentage(resolved: &ResolvedValues, layer: &str) -> f64 {
    resolved
        .get_f64(layer, MAX_RAM_PERCENTAGE)
        .unwrap_or(DEFAULT_MAX_RAM_PERCENTAGE)
}

/// Inputs for a GC decision: heap MB and CPU cores, when both are known.
pub fn gc_inputs(resolved: &ResolvedValues, layer: &str) -> Option<(f64, f64)> {
    let heap = heap_size_mb(resolved, max_ram_percentage(resolved, layer))?;
    let cores = container::cpu_limit_cores(resolved)?;
    debug!(layer, heap_mb = heap, cores, "GC decision inputs");
    Some((heap, cores))
}

/// Tunables and dependencies shared by the JVM layers; only the GC
/// choices differ.
pub fn jvm_metadata(layer: &str, gc_choices: &[String]) -> LayerConfig {
    LayerConfig {
        name: layer.to_string(),
        tunables: vec![
            TunableConfig {
                name: MAX_RAM_PERCENTAGE.to_string(),
                value_type: "double".to_string(),
                lower_bound: Some(1.0),
                upper_bound: Some(100.0),
                step: Some(1.0),
                choices: Vec::new(),
            },
            TunableConfig {
                name: GC_POLICY.to_string(),
                value_type: "categorical".to_string(),
                lower_bound: None,
                upper_bound: None,
                step: None,
                choices: gc_choices.to_vec(),
            },
        ],
        dependencies: vec![
            DependencyConfig {
                tunable: MAX_RAM_PERCENTAGE.to_string(),
                depends_on: vec![TunableRef::new(CONTAINER, MEMORY_LIMIT)],
            },
            DependencyConfig {
                tunable: GC_POLICY.to_string(),
                depends_on: vec![
                    TunableRef::new(CONTAINER, MEMORY_LIMIT),
                    TunableRef::new(CONTAINER, CPU_LIMIT),
                    TunableRef::new(layer, MAX_RAM_PERCENTAGE),
                ],
            },
        ],
    }
}

/// `-XX:MaxRAMPercentage=N`, understood by both Hotspot and OpenJ9.
pub fn max_ram_flag(value: &TunableValue) -> Option<String> {
    value
        .as_f64()
        .map(|pct| format!("-XX:MaxRAMPercentage={}", TunableValue::Number(pct)))
}
