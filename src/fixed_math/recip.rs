//! Table-driven reciprocal and approximate division.
//!
//! # Table contract
//!
//! A reciprocal table has `SCALE + 1` entries. Entry `v` (for `1 <= v <= SCALE`)
//! is the fixed-point reciprocal of the raw magnitude `v`, i.e. `SCALE² / v`,
//! stored as `u32` because entries 1 and 2 do not fit `i32`. Entry 0 is
//! `u32::MAX`, the saturated reciprocal of zero. The sequence is non-increasing
//! and entry `SCALE` is exactly `SCALE` (the reciprocal of 1.0).
//!
//! The kernel does not care how a table was produced. [`RECIPROCAL_TABLE`] is
//! generated at compile time by `reciprocal_table!`; tests and tools can inject
//! any other table through [`ReciprocalTable::new`], which checks the contract.
//!
//! # Range reduction
//!
//! Magnitudes above `SCALE` are halved `s` times until they fit the table. Since
//! `1 / (m / 2^s) = 2^s / m`, the looked-up value is then shifted **right** by
//! `s` to land back on `1 / m`. Every halving drops a low bit, so the result is
//! an approximation whose error is bounded by [`approx_div_tolerance`].

use lockstep_fixed_macros::reciprocal_table;

use super::{ops, FRAC_BITS, SCALE};
use crate::error::{FixedError, Result};

/// Number of entries in a reciprocal table (`0..=SCALE`).
pub const TABLE_LEN: usize = SCALE as usize + 1;

/// Built-in table: entry `v` is `min(2^32 / v, u32::MAX)`, entry 0 is `u32::MAX`.
///
/// The macro argument must equal [`FRAC_BITS`]; any other value produces an
/// array whose length is not [`TABLE_LEN`] and fails to compile.
pub static RECIPROCAL_TABLE: [u32; TABLE_LEN] = reciprocal_table!(16);

/// A validated, borrowed reciprocal table.
///
/// Cheap to copy. The built-in table is available as [`ReciprocalTable::standard`].
#[derive(Clone, Copy, Debug)]
pub struct ReciprocalTable<'a> {
    entries: &'a [u32],
}

impl ReciprocalTable<'static> {
    pub fn standard() -> Self {
        Self { entries: &RECIPROCAL_TABLE }
    }
}

impl<'a> ReciprocalTable<'a> {
    /// Wrap `entries` after checking the table contract (length, saturated zero
    /// entry, anchor, monotonicity).
    pub fn new(entries: &'a [u32]) -> Result<Self> {
        if entries.len() != TABLE_LEN {
            return Err(FixedError::InvalidTable {
                reason: format!("expected {} entries, got {}", TABLE_LEN, entries.len()),
            });
        }

        if entries[0] != u32::MAX {
            return Err(FixedError::InvalidTable {
                reason: format!("entry 0 must be {}, got {}", u32::MAX, entries[0]),
            });
        }

        let anchor = entries[SCALE as usize];
        if anchor != SCALE as u32 {
            return Err(FixedError::InvalidTable {
                reason: format!("entry {} must be {}, got {}", SCALE, SCALE, anchor),
            });
        }

        if let Some(v) = (2..TABLE_LEN).find(|&v| entries[v] > entries[v - 1]) {
            return Err(FixedError::InvalidTable {
                reason: format!(
                    "entries must be non-increasing, but entry {} ({}) exceeds entry {} ({})",
                    v,
                    entries[v],
                    v - 1,
                    entries[v - 1]
                ),
            });
        }

        tracing::debug!(entries = entries.len(), "reciprocal table validated");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &'a [u32] {
        self.entries
    }

    /// Approximate fixed-point `1 / v`.
    ///
    /// The result is clamped to `i32::MAX` in magnitude before the sign is
    /// restored, so `v = ±1` and `v = ±2` saturate instead of wrapping.
    ///
    /// `v == 0` is a caller bug. Debug builds assert; release builds log an error
    /// and return `i32::MAX` without reading the table.
    pub fn reciprocal(&self, v: i32) -> i32 {
        debug_assert!(v != 0, "reciprocal of zero requested");
        if v == 0 {
            tracing::error!("reciprocal of zero requested; returning saturated value");
            return i32::MAX;
        }

        let (magnitude, shift) = reduce_range(v.unsigned_abs());
        let result = (self.entries[magnitude as usize] >> shift).min(i32::MAX as u32) as i32;

        if v < 0 {
            -result
        } else {
            result
        }
    }

    pub fn checked_reciprocal(&self, v: i32) -> Result<i32> {
        if v == 0 {
            return Err(FixedError::DomainError { operation: "reciprocal" });
        }
        Ok(self.reciprocal(v))
    }

    /// `a * reciprocal(b)`. Inherits the zero-divisor precondition of
    /// [`ReciprocalTable::reciprocal`] and the truncating overflow of
    /// [`ops::fixed_mul`].
    pub fn approx_div(&self, a: i32, b: i32) -> i32 {
        ops::fixed_mul(a, self.reciprocal(b))
    }

    pub fn checked_approx_div(&self, a: i32, b: i32) -> Result<i32> {
        if b == 0 {
            return Err(FixedError::DomainError { operation: "approx_div" });
        }
        Ok(self.approx_div(a, b))
    }
}

/// Fold a magnitude into the table domain `0..=SCALE`.
///
/// Returns `(reduced, shift)` where `reduced = magnitude >> shift` and `shift` is
/// the number of halvings needed to bring `magnitude` down to at most `SCALE`.
/// Computed from the bit length instead of looping; the result is identical to
/// halving one bit at a time.
#[inline]
pub(crate) const fn reduce_range(magnitude: u32) -> (u32, u32) {
    if magnitude <= SCALE as u32 {
        return (magnitude, 0);
    }

    // magnitude > SCALE, so bit_len >= FRAC_BITS + 1
    let bit_len = u32::BITS - magnitude.leading_zeros();
    let mut shift = bit_len - (FRAC_BITS + 1);
    // magnitude >> shift is now in [SCALE, 2 * SCALE); one more halving unless it is exactly SCALE
    if (magnitude >> shift) > SCALE as u32 {
        shift += 1;
    }
    (magnitude >> shift, shift)
}

/// Approximate reciprocal through the built-in table.
#[inline]
pub fn reciprocal(v: i32) -> i32 {
    ReciprocalTable::standard().reciprocal(v)
}

/// Approximate division through the built-in table.
#[inline]
pub fn approx_div(a: i32, b: i32) -> i32 {
    ReciprocalTable::standard().approx_div(a, b)
}

/// Upper bound on `|approx_div(a, b) - fixed_div(a, b)|` for a table meeting the
/// contract exactly (entries `floor(SCALE² / v)`), in raw units.
///
/// Valid for `|b| >= 2` and where `fixed_div(a, b)` does not saturate. The bound is
/// `2|a| / SCALE + 3`, plus `|a / b| / 2^(FRAC_BITS - 1)` when `|b|` needed range
/// reduction: each reduction drops low bits of `b`, which can overstate the
/// reciprocal by up to `1 / (SCALE / 2)` relative.
///
/// The first term grows linearly with `|a|` because a table entry can be off by
/// up to two raw units and `fixed_mul` scales that error by `a`. For large
/// numerators the bound is therefore loose: at `|a| = 1000.0` it already allows
/// about 2000 raw units, far more than typical observed error.
///
/// In terms of the reduction shift count `s` returned by range reduction, the
/// bound is `2|a| / SCALE + 3` when `s == 0` (divisor inside the table) and gains
/// the `|a / b|` term only when `s > 0`. It does not grow with `s` itself, since
/// the relative overstatement is capped at `2 / SCALE` whatever the shift.
pub fn approx_div_tolerance(a: i32, b: i32) -> u32 {
    let (_, shift) = reduce_range(b.unsigned_abs());
    let truncation = ((a.unsigned_abs() as u64 * 2) >> FRAC_BITS) + 3;

    let reduction = if shift > 0 {
        let quotient = ops::fixed_div(a, b).unsigned_abs() as u64 + 1;
        quotient >> (FRAC_BITS - 1)
    } else {
        0
    };

    (truncation + reduction).min(u32::MAX as u64) as u32
}
