//! Robot units.
//!
//! The arm controller speaks fixed-point hundredths: 1 degree = 100 units and
//! 1 cm = 100 units. Poses keep unrounded values in these units so chained
//! conversions do not accumulate rounding; the integer [`AngleUnit`] only
//! appears once a value is normalized for the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Robot units per degree (and per centimetre).
pub const UNITS_PER_DEGREE: f64 = 100.0;
/// One full revolution in robot units.
pub const FULL_TURN: i64 = 36_000;
/// Half a revolution, the inclusive upper bound of the canonical range.
pub const HALF_TURN: i64 = 18_000;

/// Fixed-point angle, 1/100 of a degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AngleUnit(pub i32);

impl AngleUnit {
    pub fn value(self) -> i32 {
        self.0
    }

    pub fn to_radians(self) -> f64 {
        units_to_radians(f64::from(self.0))
    }

    /// Rounds to the nearest unit, ties away from zero.
    pub fn from_radians(radians: f64) -> Self {
        AngleUnit(radians_to_units(radians).round() as i32)
    }

    /// True when the angle already lies in (-18000, 18000].
    pub fn is_canonical(self) -> bool {
        let value = i64::from(self.0);
        value > -HALF_TURN && value <= HALF_TURN
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AngleUnit> for f64 {
    fn from(angle: AngleUnit) -> Self {
        f64::from(angle.0)
    }
}

pub fn units_to_radians(units: f64) -> f64 {
    (units / UNITS_PER_DEGREE).to_radians()
}

pub fn radians_to_units(radians: f64) -> f64 {
    radians.to_degrees() * UNITS_PER_DEGREE
}

/// Maps any angle in robot units to its closest integer equivalent in
/// (-18000, 18000].
///
/// The order matters and must not change: round first, then reduce with a
/// truncating remainder, then correct each boundary once.
pub fn normalize(units: f64) -> AngleUnit {
    let mut angle = units.round() as i64;
    angle %= FULL_TURN;
    if angle <= -HALF_TURN {
        angle += FULL_TURN;
    }
    if angle > HALF_TURN {
        angle -= FULL_TURN;
    }
    AngleUnit(angle as i32)
}
