//! Unit system chosen by the analysis directive.
//!
//! Only parsing and SI factors live here; conversion of result datasets and
//! measurement reporting are handled by later stages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Dimension {
    Length,
    Mass,
    Time,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    pub dimension: Dimension,
    /// Multiply a value in this unit by `si_factor` to get metres, kilograms or seconds.
    pub si_factor: f64,
}

const KNOWN_UNITS: &[(&str, Dimension, f64)] = &[
    ("m", Dimension::Length, 1.0),
    ("cm", Dimension::Length, 1e-2),
    ("mm", Dimension::Length, 1e-3),
    ("um", Dimension::Length, 1e-6),
    ("km", Dimension::Length, 1e3),
    ("in", Dimension::Length, 0.0254),
    ("ft", Dimension::Length, 0.3048),
    ("kg", Dimension::Mass, 1.0),
    ("g", Dimension::Mass, 1e-3),
    ("mg", Dimension::Mass, 1e-6),
    ("t", Dimension::Mass, 1e3),
    ("lb", Dimension::Mass, 0.453_592_37),
    ("s", Dimension::Time, 1.0),
    ("ms", Dimension::Time, 1e-3),
    ("us", Dimension::Time, 1e-6),
    ("min", Dimension::Time, 60.0),
    ("h", Dimension::Time, 3600.0),
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitParseError {
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
    #[error("'{unit}' is a unit of {found}, but a unit of {expected} is required here")]
    WrongDimension {
        unit: String,
        expected: Dimension,
        found: Dimension,
    },
}

pub type UnitResult<T> = Result<T, UnitParseError>;

impl Unit {
    pub fn parse(name: &str) -> UnitResult<Self> {
        KNOWN_UNITS
            .iter()
            .find(|(known, _, _)| *known == name)
            .map(|(known, dimension, si_factor)| Unit {
                name: known.to_string(),
                dimension: *dimension,
                si_factor: *si_factor,
            })
            .ok_or_else(|| UnitParseError::UnknownUnit(name.to_string()))
    }

    fn parse_as(name: &str, expected: Dimension) -> UnitResult<Self> {
        let unit = Self::parse(name)?;
        if unit.dimension != expected {
            return Err(UnitParseError::WrongDimension {
                unit: unit.name,
                expected,
                found: unit.dimension,
            });
        }
        Ok(unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSystem {
    pub length: Unit,
    pub mass: Unit,
    pub time: Unit,
}

impl UnitSystem {
    pub fn new(length: &str, mass: &str, time: &str) -> UnitResult<Self> {
        Ok(Self {
            length: Unit::parse_as(length, Dimension::Length)?,
            mass: Unit::parse_as(mass, Dimension::Mass)?,
            time: Unit::parse_as(time, Dimension::Time)?,
        })
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.length.name, self.mass.name, self.time.name)
    }
}
