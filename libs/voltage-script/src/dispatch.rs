//! Unit dispatch: which extraction passes a unit needs and how they combine
//!
//! | Units | Passes | Hours |
//! |-------|--------|-------|
//! | Watts, Volts | real | given |
//! | Wh / kWh | real | 1 / 1000 |
//! | Amps | current | given |
//! | Hz | frequency | given |
//! | VA | reactive, real → √(W² + VAR²) | given |
//! | PF | real, reactive → W / √(W² + VAR²) | given |
//! | VAR / VARh | reactive | given / 1 |
//!
//! Energy units divide the accumulator delta by a fixed divisor instead of the
//! elapsed time, which turns Wh deltas into Wh (÷1) or kWh (÷1000).

use tracing::trace;

use crate::channels::{Accumulators, ChannelTable};
use crate::evaluator;
use crate::extract::{zero_nan, ExtractionMode, Readings};
use crate::units::Units;

/// Evaluate a compiled program for `units`. NaN results become 0.
pub fn dispatch<A, C>(
    program: &[u8],
    constants: &[f64],
    units: Units,
    readings: Readings<'_, A>,
    elapsed_hours: f64,
    channels: &C,
) -> f64
where
    A: Accumulators + ?Sized,
    C: ChannelTable + ?Sized,
{
    // Passes share the cursor; only a stray top-level `)` moves it
    let mut cursor = 0;
    let mut pass = |mode: ExtractionMode, hours: f64| {
        let value = evaluator::run(program, constants, &mut cursor, |channel| {
            mode.extract(channel, readings, hours, channels)
        });
        trace!(mode = %mode.tag(), hours, value, "pass");
        value
    };

    let result = match units {
        Units::Watts | Units::Volts => pass(ExtractionMode::Real, elapsed_hours),
        Units::Wh => pass(ExtractionMode::Real, 1.0),
        Units::KWh => pass(ExtractionMode::Real, 1000.0),
        Units::Amps => pass(ExtractionMode::Current, elapsed_hours),
        Units::Hz => pass(ExtractionMode::Frequency, elapsed_hours),
        Units::VA => {
            let var = pass(ExtractionMode::Reactive, elapsed_hours);
            let watts = pass(ExtractionMode::Real, elapsed_hours);
            (watts * watts + var * var).sqrt()
        },
        Units::PF => {
            let watts = pass(ExtractionMode::Real, elapsed_hours);
            let var = pass(ExtractionMode::Reactive, elapsed_hours);
            // 0/0 when there is no load; the NaN guard below reports 0
            watts / (watts * watts + var * var).sqrt()
        },
        Units::VAR => pass(ExtractionMode::Reactive, elapsed_hours),
        Units::VARh => pass(ExtractionMode::Reactive, 1.0),
    };

    zero_nan(result)
}
