//! Deterministic fixed-point arithmetic kernel.
//!
//! This module provides the numeric substrate of the lockstep simulation: a 32-bit
//! signed fixed-point format with [`FRAC_BITS`] fractional bits and a handful of
//! primitives (multiply, divide, modulo, table-driven reciprocal). Every operation
//! is a pure integer function, so all platforms produce bit-identical results.
//!
//! Two layers are offered:
//!
//! - **Default (saturating)**: `*`, `/`, `%`, [`Fixed::recip`], [`Fixed::approx_div`].
//!   These never fail. Division saturates on overflow and on a zero divisor.
//! - **Checked**: `checked_*` methods returning [`crate::Result`], for callers that
//!   would rather see a [`crate::FixedError`] than a saturated value.
//!
//! The raw `i32` kernel lives in [`ops`] and [`recip`]; [`Fixed`] is a thin typed
//! wrapper around it.

use std::fmt;

use fixed::traits::{FromFixed, ToFixed};
use fixed::types::I16F16;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use recip::{approx_div, approx_div_tolerance, reciprocal, ReciprocalTable, RECIPROCAL_TABLE, TABLE_LEN};

pub mod ops;
pub mod recip;


/// Number of fractional bits in the representation.
///
/// Taken from the `I16F16` alias so the `fixed` interop cannot drift from the
/// kernel. Changing the format means changing that alias and the literal passed
/// to `reciprocal_table!` in [`recip`]; the table's array type rejects a
/// mismatched literal at compile time.
pub const FRAC_BITS: u32 = I16F16::FRAC_NBITS;

/// Raw value of 1.0 (`2^FRAC_BITS`).
pub const SCALE: i32 = 1 << FRAC_BITS;

/// Fixed-point number: the real value `bits / SCALE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(SCALE);
    pub const HALF: Self = Self(SCALE >> 1);
    /// Smallest positive value (one raw unit).
    pub const EPSILON: Self = Self(1);
    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);

    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn to_bits(self) -> i32 {
        self.0
    }

    /// Integer to fixed, saturating outside the ~±32768 integer range.
    pub const fn from_int(n: i32) -> Self {
        Self(n.saturating_mul(SCALE))
    }

    /// Convert from any number the `fixed` crate understands (floats, integers,
    /// other fixed types), saturating on overflow.
    ///
    /// Meant for tooling, config and tests. Simulation code should stay in
    /// fixed-point end to end.
    pub fn from_num<Src: ToFixed>(src: Src) -> Self {
        Self(I16F16::saturating_from_num(src).to_bits())
    }

    pub fn to_num<Dst: FromFixed>(self) -> Dst {
        I16F16::from_bits(self.0).to_num()
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Approximate `1 / self` through the built-in reciprocal table.
    ///
    /// `self` must not be zero. Debug builds assert; release builds return
    /// [`Fixed::MAX`].
    pub fn recip(self) -> Self {
        Self(reciprocal(self.0))
    }

    /// Same as [`Fixed::recip`] against a caller-supplied table.
    pub fn recip_with(self, table: &ReciprocalTable<'_>) -> Self {
        Self(table.reciprocal(self.0))
    }

    /// `self * (1 / rhs)` via the reciprocal table. Cheaper than `/` but only
    /// accurate to within [`approx_div_tolerance`]; never substitute it for `/`
    /// where two code paths must bit-match.
    pub fn approx_div(self, rhs: Self) -> Self {
        Self(approx_div(self.0, rhs.0))
    }

    pub fn approx_div_with(self, rhs: Self, table: &ReciprocalTable<'_>) -> Self {
        Self(table.approx_div(self.0, rhs.0))
    }

    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        ops::checked_mul(self.0, rhs.0).map(Self)
    }

    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        ops::checked_div(self.0, rhs.0).map(Self)
    }

    pub fn checked_rem(self, rhs: Self) -> Result<Self> {
        ops::checked_mod(self.0, rhs.0).map(Self)
    }

    pub fn checked_recip(self) -> Result<Self> {
        ReciprocalTable::standard().checked_reciprocal(self.0).map(Self)
    }

    pub fn checked_approx_div(self, rhs: Self) -> Result<Self> {
        ReciprocalTable::standard().checked_approx_div(self.0, rhs.0).map(Self)
    }
}

impl From<Fixed> for I16F16 {
    fn from(value: Fixed) -> Self {
        I16F16::from_bits(value.0)
    }
}

impl From<I16F16> for Fixed {
    fn from(value: I16F16) -> Self {
        Fixed(value.to_bits())
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&I16F16::from_bits(self.0), f)
    }
}

/// Exact multiply; truncating on overflow (see [`ops::fixed_mul`]).
impl std::ops::Mul for Fixed {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self(ops::fixed_mul(self.0, rhs.0))
    }
}

/// Exact divide; saturating on overflow and on a zero divisor (see [`ops::fixed_div`]).
impl std::ops::Div for Fixed {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        Self(ops::fixed_div(self.0, rhs.0))
    }
}

/// Non-negative modulo (see [`ops::fixed_mod`]).
impl std::ops::Rem for Fixed {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self::Output {
        Self(ops::fixed_mod(self.0, rhs.0))
    }
}

impl std::ops::Add for Fixed {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl std::ops::Sub for Fixed {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl std::ops::Neg for Fixed {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(self.0.wrapping_neg())
    }
}
