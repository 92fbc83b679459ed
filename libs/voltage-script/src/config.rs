//! Script configuration loading
//!
//! A configuration file lists the input channel wiring and the scripts:
//!
//! ```yaml
//! channels:
//!   - voltage_channel: 0          # channel 0: the voltage reference
//!   - voltage_channel: 0
//!     doubled: true
//! scripts:
//!   - name: Main
//!     units: Watts
//!     script: "@1+@2"
//! ```

use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::channels::{ChannelMap, InputChannel, MAX_CHANNELS};
use crate::error::{Result, ScriptError};
use crate::registry::ScriptSet;
use crate::script::ScriptConfig;

/// Environment variable prefix merged over file values
pub const ENV_PREFIX: &str = "VOLTAGE_SCRIPT_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptsConfig {
    #[serde(default)]
    pub channels: Vec<InputChannel>,
    #[serde(default)]
    pub scripts: Vec<ScriptConfig>,
}

impl ScriptsConfig {
    /// Check the parts a script program cannot address
    pub fn validate(&self) -> Result<()> {
        if self.channels.len() > MAX_CHANNELS {
            return Err(ScriptError::config(format!(
                "{} input channels configured, at most {} are addressable",
                self.channels.len(),
                MAX_CHANNELS
            )));
        }
        if let Some((index, input)) = self
            .channels
            .iter()
            .enumerate()
            .find(|(_, input)| input.voltage_channel >= MAX_CHANNELS)
        {
            return Err(ScriptError::config(format!(
                "channel {} references voltage channel {}",
                index, input.voltage_channel
            )));
        }
        Ok(())
    }

    pub fn channel_map(&self) -> ChannelMap {
        ChannelMap::new(self.channels.clone())
    }

    /// Compile every script in configuration order
    pub fn script_set(&self) -> ScriptSet {
        ScriptSet::from_configs(&self.scripts)
    }
}

/// Load a configuration file, picking the format from its extension.
///
/// `VOLTAGE_SCRIPT_`-prefixed environment variables override file values.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<ScriptsConfig> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ScriptError::config("Config file must have an extension"))?;

    let figment = match extension {
        "toml" => Figment::new().merge(Toml::file(path)),
        "yaml" | "yml" => Figment::new().merge(Yaml::file(path)),
        "json" => Figment::new().merge(Json::file(path)),
        _ => {
            return Err(ScriptError::config(format!(
                "Unsupported config file format: {}",
                extension
            )))
        },
    };

    let config: ScriptsConfig = figment
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .map_err(|e| ScriptError::config(format!("Failed to load {}: {}", path.display(), e)))?;
    config.validate()?;

    info!(
        path = %path.display(),
        channels = config.channels.len(),
        scripts = config.scripts.len(),
        "Loaded script configuration"
    );
    Ok(config)
}
