//! Script - a named, compiled formula with target units

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::channels::{Accumulators, ChannelTable};
use crate::compiler::{compile, CompiledScript};
use crate::dispatch::dispatch;
use crate::error::{Result, ScriptError};
use crate::extract::Readings;
use crate::render::render;
use crate::units::Units;

/// Configuration entry for one script. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Unit name, matched case-insensitively. Unknown or missing means Watts.
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
}

impl ScriptConfig {
    pub fn new(name: impl Into<String>, units: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            units: Some(units.into()),
            script: Some(script.into()),
        }
    }

    /// Read a JSON object fragment. Fields that are not strings are ignored.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ScriptError::config(format!("script entry is not an object: {}", value)))?;
        let field = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            name: field("name"),
            units: field("units"),
            script: field("script"),
        })
    }

    /// Parse a JSON object fragment from text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }
}

/// Compiled formula with its name and units.
///
/// Immutable after construction; the units override of
/// [`Script::evaluate_as`] is a call parameter, so a shared `&Script` can be
/// evaluated from anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    name: String,
    units: Units,
    compiled: CompiledScript,
}

impl Script {
    /// Build from an explicit `(name, units, script)` triple
    pub fn new(name: impl Into<String>, units: &str, script: &str) -> Self {
        Self::build(name.into(), Some(units), script)
    }

    pub fn from_config(config: &ScriptConfig) -> Self {
        Self::build(
            config.name.clone().unwrap_or_default(),
            config.units.as_deref(),
            config.script.as_deref().unwrap_or_default(),
        )
    }

    fn build(name: String, units: Option<&str>, script: &str) -> Self {
        let units = match units {
            Some(units_name) => Units::from_name(units_name).unwrap_or_else(|| {
                warn!(script = %name, units = units_name, "Unknown units, defaulting to Watts");
                Units::Watts
            }),
            None => Units::Watts,
        };

        let compiled = compile(script);
        debug!(
            script = %name,
            units = %units,
            tokens = compiled.token_count(),
            constants = compiled.constants().len(),
            "compiled"
        );

        Self {
            name,
            units,
            compiled,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn units_name(&self) -> &'static str {
        self.units.name()
    }

    pub fn precision(&self) -> usize {
        self.units.precision()
    }

    pub fn compiled(&self) -> &CompiledScript {
        &self.compiled
    }

    /// Decompiled program text
    pub fn render(&self) -> String {
        render(self.compiled.program(), self.compiled.constants())
    }

    /// Format a value with this script's unit precision
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.precision(), value)
    }

    /// Evaluate in the configured units.
    ///
    /// `old` may be `None` for the first interval; it then counts as zero.
    pub fn evaluate<A, C>(&self, channels: &C, old: Option<&A>, new: &A, elapsed_hours: f64) -> f64
    where
        A: Accumulators + ?Sized,
        C: ChannelTable + ?Sized,
    {
        self.evaluate_as(self.units, channels, old, new, elapsed_hours)
    }

    /// Evaluate as if the script were configured with `units`
    pub fn evaluate_as<A, C>(
        &self,
        units: Units,
        channels: &C,
        old: Option<&A>,
        new: &A,
        elapsed_hours: f64,
    ) -> f64
    where
        A: Accumulators + ?Sized,
        C: ChannelTable + ?Sized,
    {
        dispatch(
            self.compiled.program(),
            self.compiled.constants(),
            units,
            Readings::new(old, new),
            elapsed_hours,
            channels,
        )
    }

    /// Evaluate with units given by name. Unknown names yield 0.
    pub fn evaluate_as_named<A, C>(
        &self,
        units: &str,
        channels: &C,
        old: Option<&A>,
        new: &A,
        elapsed_hours: f64,
    ) -> f64
    where
        A: Accumulators + ?Sized,
        C: ChannelTable + ?Sized,
    {
        match Units::from_name(units) {
            Some(units) => self.evaluate_as(units, channels, old, new, elapsed_hours),
            None => {
                warn!(script = %self.name, units, "Unknown units override");
                0.0
            },
        }
    }
}

impl From<&ScriptConfig> for Script {
    fn from(config: &ScriptConfig) -> Self {
        Script::from_config(config)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script:{},units:{} {}", self.name, self.units, self.render())
    }
}
