//! Fixed-point length and angle arithmetic.
//!
//! All board geometry is exact modulo arc flattening: lengths are stored as
//! signed nanometre integers rather than floating point millimetres, so that
//! clearance comparisons never suffer from floating-point drift.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coordinates are kept within `[-2^52, 2^52]` nm (roughly ±4.5 km) to leave
/// headroom for intermediate multiplications during offsetting.
pub const MAX_COORDINATE: i64 = 1 << 52;

/// A signed length in nanometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Length(i64);

impl Length {
    pub const ZERO: Length = Length(0);

    /// Construct a length from a raw nanometre count.
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Construct a length from a micrometre value (fractional µm truncate to nm).
    pub fn from_micros(micros: f64) -> Self {
        Self((micros * 1_000.0).round() as i64)
    }

    /// Construct a length from a millimetre value.
    pub fn from_millimeters(mm: f64) -> Self {
        Self((mm * 1_000_000.0).round() as i64)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub fn as_micros(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    pub fn as_millimeters(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    pub fn abs(self) -> Length {
        Length(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}mm", self.as_millimeters())
    }
}

impl Add for Length {
    type Output = Length;
    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Length) {
        self.0 += rhs.0;
    }
}

impl Sub for Length {
    type Output = Length;
    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl SubAssign for Length {
    fn sub_assign(&mut self, rhs: Length) {
        self.0 -= rhs.0;
    }
}

impl Neg for Length {
    type Output = Length;
    fn neg(self) -> Length {
        Length(-self.0)
    }
}

impl Mul<i64> for Length {
    type Output = Length;
    fn mul(self, rhs: i64) -> Length {
        Length(self.0 * rhs)
    }
}

impl Div<i64> for Length {
    type Output = Length;
    fn div(self, rhs: i64) -> Length {
        Length(self.0 / rhs)
    }
}

/// An angle in degrees, stored as millidegrees to stay integer-exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Angle(i64);

impl Angle {
    pub const ZERO: Angle = Angle(0);

    pub const fn from_millidegrees(md: i64) -> Self {
        Self(md)
    }

    pub fn from_degrees(deg: f64) -> Self {
        Self((deg * 1_000.0).round() as i64)
    }

    pub fn as_millidegrees(self) -> i64 {
        self.0
    }

    pub fn as_degrees(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    pub fn as_radians(self) -> f64 {
        self.as_degrees().to_radians()
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0 + rhs.0)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

/// Raised when a `PositiveLength`/`UnsignedLength` constructor is given a
/// value outside its allowed range. This is a settings-construction-time
/// error only — it never occurs inside a running DRC pass.
#[derive(Debug, Clone, Error)]
#[error("length {0} out of range")]
pub struct InvalidRange(pub Length);

/// A `Length` statically known to be strictly positive (`> 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositiveLength(Length);

impl PositiveLength {
    pub fn new(value: Length) -> Result<Self, InvalidRange> {
        if value.is_positive() {
            Ok(Self(value))
        } else {
            Err(InvalidRange(value))
        }
    }

    pub fn get(self) -> Length {
        self.0
    }
}

/// A `Length` statically known to be non-negative (`>= 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnsignedLength(Length);

impl UnsignedLength {
    pub fn new(value: Length) -> Result<Self, InvalidRange> {
        if value.as_nanos() >= 0 {
            Ok(Self(value))
        } else {
            Err(InvalidRange(value))
        }
    }

    pub fn get(self) -> Length {
        self.0
    }
}
