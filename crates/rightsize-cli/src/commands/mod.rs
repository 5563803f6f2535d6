pub mod order;
pub mod recommend;
pub mod terms;

use std::path::Path;

use anyhow::Context;
use rightsize_core::RightsizeConfig;
use tracing::info;

/// Load and validate the config file, or fall back to the built-in defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RightsizeConfig> {
    match path {
        Some(path) => RightsizeConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => {
            info!("no config given, using built-in defaults");
            Ok(RightsizeConfig::default())
        }
    }
}
