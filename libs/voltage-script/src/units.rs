//! Target units of a script

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit display names, indexed by [`Units`] discriminant. The trailing empty
/// entry is the "no units" sentinel and never matches a lookup.
pub const UNIT_NAMES: [&str; 11] = [
    "Watts", "Volts", "Amps", "VA", "Hz", "Wh", "kWh", "PF", "VAR", "VARh", "",
];

/// Decimal precision per unit, same indexing as [`UNIT_NAMES`]
pub const UNIT_PRECISION: [u8; 11] = [2, 2, 3, 2, 2, 4, 7, 3, 2, 4, 0];

/// Physical quantity a script produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Units {
    #[default]
    Watts = 0,
    Volts,
    Amps,
    VA,
    Hz,
    Wh,
    KWh,
    PF,
    VAR,
    VARh,
}

impl Units {
    pub const ALL: [Units; 10] = [
        Units::Watts,
        Units::Volts,
        Units::Amps,
        Units::VA,
        Units::Hz,
        Units::Wh,
        Units::KWh,
        Units::PF,
        Units::VAR,
        Units::VARh,
    ];

    /// Case-insensitive lookup against the unit name table
    pub fn from_name(name: &str) -> Option<Units> {
        Units::ALL
            .into_iter()
            .find(|units| units.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        UNIT_NAMES[self as usize]
    }

    /// Decimal places used when reporting values in this unit
    pub fn precision(self) -> usize {
        UNIT_PRECISION[self as usize] as usize
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Units {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Units::from_name(&value).ok_or_else(|| format!("unknown units '{}'", value))
    }
}

impl From<Units> for String {
    fn from(units: Units) -> Self {
        units.name().to_string()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_precision_table() {
        let expected = [
            ("Watts", 2),
            ("Volts", 2),
            ("Amps", 3),
            ("VA", 2),
            ("Hz", 2),
            ("Wh", 4),
            ("kWh", 7),
            ("PF", 3),
            ("VAR", 2),
            ("VARh", 4),
        ];
        for (units, (name, precision)) in Units::ALL.into_iter().zip(expected) {
            assert_eq!(units.name(), name);
            assert_eq!(units.precision(), precision);
        }
        assert_eq!(UNIT_NAMES[10], "");
        assert_eq!(UNIT_PRECISION[10], 0);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(Units::from_name("kwh"), Some(Units::KWh));
        assert_eq!(Units::from_name("VARH"), Some(Units::VARh));
        assert_eq!(Units::from_name("pf"), Some(Units::PF));
        assert_eq!(Units::from_name("Joules"), None);
        // The sentinel never matches
        assert_eq!(Units::from_name(""), None);
    }

    #[test]
    fn test_serde_uses_names() {
        let units: Units = serde_json::from_str("\"va\"").unwrap();
        assert_eq!(units, Units::VA);
        assert_eq!(serde_json::to_string(&Units::KWh).unwrap(), "\"kWh\"");
        assert!(serde_json::from_str::<Units>("\"ohms\"").is_err());
    }
}
