//! Extraction modes: per-channel rates from two accumulator snapshots

use crate::channels::{Accumulators, ChannelTable};

/// Pair of snapshots bracketing an interval.
///
/// A missing `old` snapshot is a zero baseline (first evaluation).
pub struct Readings<'a, A: ?Sized> {
    pub old: Option<&'a A>,
    pub new: &'a A,
}

impl<A: ?Sized> Clone for Readings<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ?Sized> Copy for Readings<'_, A> {}

impl<'a, A: Accumulators + ?Sized> Readings<'a, A> {
    pub fn new(old: Option<&'a A>, new: &'a A) -> Self {
        Self { old, new }
    }

    /// accum1 delta per hour
    pub fn real(&self, channel: usize, elapsed_hours: f64) -> f64 {
        let old = self.old.map_or(0.0, |old| old.accum1(channel));
        (self.new.accum1(channel) - old) / elapsed_hours
    }

    /// accum2 delta per hour
    pub fn secondary(&self, channel: usize, elapsed_hours: f64) -> f64 {
        let old = self.old.map_or(0.0, |old| old.accum2(channel));
        (self.new.accum2(channel) - old) / elapsed_hours
    }
}

/// How a channel reference turns snapshot deltas into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// accum1 rate (watts, volts)
    Real,
    /// accum2 rate (VA, Hz)
    Secondary,
    /// sqrt(VA² - W²)
    Reactive,
    /// VA over the associated voltage
    Current,
    /// Frequency of the associated voltage channel
    Frequency,
}

impl ExtractionMode {
    /// Single-character tag used in diagnostics
    pub fn tag(self) -> char {
        match self {
            ExtractionMode::Real => '1',
            ExtractionMode::Secondary => '2',
            ExtractionMode::Reactive => 'R',
            ExtractionMode::Current => 'A',
            ExtractionMode::Frequency => 'H',
        }
    }

    /// Compute the value of `channel` in this mode.
    ///
    /// Returns `None` when the whole evaluation must collapse to 0: a channel
    /// outside the channel table in current or frequency mode. NaN becomes 0.
    pub fn extract<A, C>(
        self,
        channel: usize,
        readings: Readings<'_, A>,
        elapsed_hours: f64,
        channels: &C,
    ) -> Option<f64>
    where
        A: Accumulators + ?Sized,
        C: ChannelTable + ?Sized,
    {
        let value = match self {
            ExtractionMode::Real => readings.real(channel, elapsed_hours),
            ExtractionMode::Secondary => readings.secondary(channel, elapsed_hours),
            ExtractionMode::Reactive => {
                let apparent = readings.secondary(channel, elapsed_hours);
                let real = readings.real(channel, elapsed_hours);
                (apparent * apparent - real * real).sqrt()
            },
            ExtractionMode::Current => {
                if channel >= channels.channel_count() {
                    return None;
                }
                let apparent = readings.secondary(channel, elapsed_hours);
                let volts = readings.real(channels.voltage_channel(channel), elapsed_hours);
                let amps = if volts != 0.0 { apparent / volts } else { 0.0 };
                if channels.is_doubled(channel) {
                    amps / 2.0
                } else {
                    amps
                }
            },
            ExtractionMode::Frequency => {
                if channel >= channels.channel_count() {
                    return None;
                }
                readings.secondary(channels.voltage_channel(channel), elapsed_hours)
            },
        };
        Some(zero_nan(value))
    }
}

/// Replace NaN with 0
pub(crate) fn zero_nan(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}
