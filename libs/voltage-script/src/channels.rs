//! Accumulator snapshots and input channel metadata
//!
//! Both are owned outside this crate. Scripts only see them through the
//! [`Accumulators`] and [`ChannelTable`] traits.

use serde::{Deserialize, Serialize};

/// Maximum number of channels a program can reference
pub const MAX_CHANNELS: usize = 32;

/// Per-channel running totals at one point in time.
///
/// `accum1` holds real energy (Wh) or volt-hours, `accum2` apparent energy
/// (VAh) or hertz-hours depending on the channel type.
pub trait Accumulators {
    fn accum1(&self, channel: usize) -> f64;

    fn accum2(&self, channel: usize) -> f64;
}

/// Read-only lookup of input channel wiring
pub trait ChannelTable {
    /// Number of configured input channels
    fn channel_count(&self) -> usize;

    /// Voltage channel associated with `channel`
    fn voltage_channel(&self, channel: usize) -> usize;

    /// Whether `channel` measures a doubled (split-phase) circuit
    fn is_doubled(&self, channel: usize) -> bool;
}

/// In-memory accumulator snapshot. Missing channels read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorSnapshot {
    #[serde(default)]
    pub accum1: Vec<f64>,
    #[serde(default)]
    pub accum2: Vec<f64>,
}

impl AccumulatorSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both accumulators of one channel, growing the snapshot as needed
    pub fn with_channel(mut self, channel: usize, accum1: f64, accum2: f64) -> Self {
        if self.accum1.len() <= channel {
            self.accum1.resize(channel + 1, 0.0);
        }
        if self.accum2.len() <= channel {
            self.accum2.resize(channel + 1, 0.0);
        }
        self.accum1[channel] = accum1;
        self.accum2[channel] = accum2;
        self
    }
}

impl Accumulators for AccumulatorSnapshot {
    fn accum1(&self, channel: usize) -> f64 {
        self.accum1.get(channel).copied().unwrap_or(0.0)
    }

    fn accum2(&self, channel: usize) -> f64 {
        self.accum2.get(channel).copied().unwrap_or(0.0)
    }
}

/// Wiring of one input channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputChannel {
    #[serde(default)]
    pub voltage_channel: usize,
    #[serde(default)]
    pub doubled: bool,
}

/// Channel table backed by a list of [`InputChannel`]s, indexed by position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelMap {
    inputs: Vec<InputChannel>,
}

impl ChannelMap {
    pub fn new(inputs: Vec<InputChannel>) -> Self {
        Self { inputs }
    }

    /// `count` channels all referencing voltage channel 0, none doubled
    pub fn single_voltage(count: usize) -> Self {
        Self::new(vec![InputChannel::default(); count])
    }

    pub fn inputs(&self) -> &[InputChannel] {
        &self.inputs
    }
}

impl ChannelTable for ChannelMap {
    fn channel_count(&self) -> usize {
        self.inputs.len()
    }

    fn voltage_channel(&self, channel: usize) -> usize {
        self.inputs.get(channel).map_or(0, |input| input.voltage_channel)
    }

    fn is_doubled(&self, channel: usize) -> bool {
        self.inputs.get(channel).is_some_and(|input| input.doubled)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_missing_channels_read_zero() {
        let snapshot = AccumulatorSnapshot::new().with_channel(2, 10.0, 12.0);
        assert_eq!(snapshot.accum1(2), 10.0);
        assert_eq!(snapshot.accum2(2), 12.0);
        assert_eq!(snapshot.accum1(0), 0.0);
        assert_eq!(snapshot.accum2(31), 0.0);
    }

    #[test]
    fn test_snapshot_deserialize() {
        let snapshot: AccumulatorSnapshot =
            serde_json::from_str(r#"{"accum1": [1.0, 2.0]}"#).unwrap();
        assert_eq!(snapshot.accum1(1), 2.0);
        assert_eq!(snapshot.accum2(1), 0.0);
    }

    #[test]
    fn test_channel_map_lookup() {
        let map = ChannelMap::new(vec![
            InputChannel::default(),
            InputChannel {
                voltage_channel: 0,
                doubled: true,
            },
            InputChannel {
                voltage_channel: 3,
                doubled: false,
            },
        ]);
        assert_eq!(map.channel_count(), 3);
        assert!(map.is_doubled(1));
        assert!(!map.is_doubled(2));
        assert!(!map.is_doubled(9));
        assert_eq!(map.voltage_channel(2), 3);
        assert_eq!(map.voltage_channel(9), 0);
    }
}
