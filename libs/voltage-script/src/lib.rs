//! voltage-script - Computed channel scripts for VoltageEMS meters
//!
//! Compiles small formulas over input channels into byte programs and
//! evaluates them against two accumulator snapshots.
//!
//! # Features
//!
//! - **Compiler**: `@n` channel references, `#x` constants, left-to-right operators
//! - **Units**: Watts, Volts, Amps, VA, Hz, Wh, kWh, PF, VAR, VARh
//! - **Registry**: ordered [`ScriptSet`] with in-place sorting
//! - **Zero on failure**: evaluation never errors; bad input yields 0
//!
//! # Example
//!
//! ```rust
//! use voltage_script::{AccumulatorSnapshot, ChannelMap, Script, Units};
//!
//! // Net load: mains minus solar
//! let script = Script::new("Net", "Watts", "@1+@2-@3");
//! let channels = ChannelMap::single_voltage(4);
//!
//! let old = AccumulatorSnapshot::new()
//!     .with_channel(1, 100.0, 0.0)
//!     .with_channel(2, 100.0, 0.0)
//!     .with_channel(3, 50.0, 0.0);
//! let new = AccumulatorSnapshot::new()
//!     .with_channel(1, 150.0, 0.0)
//!     .with_channel(2, 130.0, 0.0)
//!     .with_channel(3, 60.0, 0.0);
//!
//! // 70 Wh over half an hour
//! assert_eq!(script.evaluate(&channels, Some(&old), &new, 0.5), 140.0);
//! assert_eq!(script.evaluate_as(Units::Wh, &channels, Some(&old), &new, 0.5), 70.0);
//! ```
//!
//! # Script syntax
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `@n` | input channel `n` (0-31) |
//! | `#x` | constant `x` |
//! | `+ - * /` | add, subtract, multiply, divide (÷0 gives 0) |
//! | `<` `>` | min, max |
//! | `( )` | grouping |
//! | `\|` | absolute value of the current operand |
//!
//! There is no precedence: `@1+@2*#2` is `(@1+@2)*2`.

pub mod channels;
pub mod compiler;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod opcode;
pub mod registry;
pub mod render;
pub mod script;
pub mod units;

// Re-exports for convenience
pub use channels::{AccumulatorSnapshot, Accumulators, ChannelMap, ChannelTable, InputChannel};
pub use compiler::{compile, CompiledScript};
pub use config::{load_config_from_file, ScriptsConfig};
pub use error::{Result, ScriptError};
pub use extract::{ExtractionMode, Readings};
pub use registry::{ScriptId, ScriptSet};
pub use render::render;
pub use script::{Script, ScriptConfig};
pub use units::Units;
