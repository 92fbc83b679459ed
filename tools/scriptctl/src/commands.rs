//! Subcommand handlers

use anyhow::{bail, Context, Result};
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use voltage_script::{load_config_from_file, AccumulatorSnapshot, ChannelMap, ScriptSet, Units};

/// Configuration compiled and ready to evaluate
pub struct Loaded {
    pub channels: ChannelMap,
    pub scripts: ScriptSet,
}

impl Loaded {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = load_config_from_file(path)
            .with_context(|| format!("Failed to load scripts from {}", path.display()))?;
        Ok(Self {
            channels: config.channel_map(),
            scripts: config.script_set(),
        })
    }
}

pub struct EvalArgs {
    pub old: Option<PathBuf>,
    pub new: PathBuf,
    pub hours: f64,
    pub units: Option<String>,
    pub name: Option<String>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct EvalRow {
    pub name: String,
    pub units: Units,
    pub value: f64,
    #[serde(skip)]
    pub formatted: String,
}

fn load_snapshot(path: &Path) -> Result<AccumulatorSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))
}

pub fn list(mut loaded: Loaded, sort: bool) -> Result<()> {
    if sort {
        loaded.scripts.sort(|a, b| a.name().cmp(b.name()));
    }

    println!(
        "{} scripts, {} input channels",
        loaded.scripts.count().to_string().bright_yellow(),
        loaded.channels.inputs().len().to_string().bright_yellow()
    );
    for script in &loaded.scripts {
        println!(
            "  {:<24} {:<6} {} decimals",
            script.name().bright_cyan(),
            script.units_name(),
            script.precision()
        );
    }
    Ok(())
}

pub fn render(loaded: &Loaded) -> Result<()> {
    for script in &loaded.scripts {
        println!("{}", script);
    }
    Ok(())
}

pub fn evaluate_rows(loaded: &Loaded, args: &EvalArgs) -> Result<Vec<EvalRow>> {
    let old = args.old.as_deref().map(load_snapshot).transpose()?;
    let new = load_snapshot(&args.new)?;
    if args.hours <= 0.0 {
        bail!("Interval must be positive, got {} hours", args.hours);
    }

    let override_units = match args.units.as_deref() {
        Some(name) => match Units::from_name(name) {
            Some(units) => Some(units),
            None => bail!("Unknown units: {}", name),
        },
        None => None,
    };

    let rows: Vec<EvalRow> = loaded
        .scripts
        .iter()
        .filter(|script| match args.name.as_deref() {
            Some(name) => script.name() == name,
            None => true,
        })
        .map(|script| {
            let units = override_units.unwrap_or(script.units());
            let value =
                script.evaluate_as(units, &loaded.channels, old.as_ref(), &new, args.hours);
            EvalRow {
                name: script.name().to_string(),
                units,
                value,
                formatted: format!("{:.*}", units.precision(), value),
            }
        })
        .collect();

    if rows.is_empty() {
        if let Some(name) = &args.name {
            bail!("No script named '{}'", name);
        }
    }
    debug!(rows = rows.len(), hours = args.hours, "evaluated scripts");
    Ok(rows)
}

pub fn eval(loaded: &Loaded, args: &EvalArgs) -> Result<()> {
    let rows = evaluate_rows(loaded, args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        println!(
            "  {:<24} {:>16} {}",
            row.name.bright_cyan(),
            row.formatted.green(),
            row.units
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn loaded() -> (tempfile::NamedTempFile, Loaded) {
        let config = write_file(
            ".yaml",
            r#"
channels:
  - voltage_channel: 0
  - voltage_channel: 0
scripts:
  - name: Load
    units: Watts
    script: "@1"
  - name: Voltage
    units: Volts
    script: "@0"
"#,
        );
        let loaded = Loaded::from_file(config.path()).unwrap();
        (config, loaded)
    }

    fn args(new: &Path) -> EvalArgs {
        EvalArgs {
            old: None,
            new: new.to_path_buf(),
            hours: 0.5,
            units: None,
            name: None,
            json: false,
        }
    }

    #[test]
    fn test_evaluate_rows() {
        let (_config, loaded) = loaded();
        let new = write_file(".json", r#"{"accum1": [120.0, 600.0], "accum2": [30.0, 700.0]}"#);

        let rows = evaluate_rows(&loaded, &args(new.path())).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Load");
        assert_eq!(rows[0].value, 1200.0);
        assert_eq!(rows[0].formatted, "1200.00");
        assert_eq!(rows[1].value, 240.0);
    }

    #[test]
    fn test_evaluate_rows_with_override_and_name() {
        let (_config, loaded) = loaded();
        let new = write_file(".json", r#"{"accum1": [120.0, 600.0]}"#);

        let mut eval_args = args(new.path());
        eval_args.units = Some("kwh".to_string());
        eval_args.name = Some("Load".to_string());
        let rows = evaluate_rows(&loaded, &eval_args).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].units, Units::KWh);
        assert_eq!(rows[0].formatted, "0.6000000");
    }

    #[test]
    fn test_evaluate_rows_errors() {
        let (_config, loaded) = loaded();
        let new = write_file(".json", "{}");

        let mut eval_args = args(new.path());
        eval_args.name = Some("Missing".to_string());
        assert!(evaluate_rows(&loaded, &eval_args).is_err());

        let mut eval_args = args(new.path());
        eval_args.units = Some("furlongs".to_string());
        assert!(evaluate_rows(&loaded, &eval_args).is_err());

        let mut eval_args = args(new.path());
        eval_args.hours = 0.0;
        assert!(evaluate_rows(&loaded, &eval_args).is_err());
    }
}
