//! Raw `i32` kernel for the exact operations.
//!
//! All functions take and return raw fixed-point bits (`value * SCALE`). They are
//! total: overflow either truncates (multiply) or saturates (divide), and nothing
//! here allocates, blocks, or performs I/O.

use super::FRAC_BITS;
use crate::error::{FixedError, Result};

/// Right shift applied to `|a|` by the division overflow guard.
///
/// With `|a| >> DIV_GUARD_SHIFT < |b|`, the quotient `|a| * 2^F / |b|` stays
/// below `2^31`. For the 16.16 format this is 14.
const DIV_GUARD_SHIFT: u32 = 30 - FRAC_BITS;

/// Fixed-point product `(a * b) >> FRAC_BITS` with a 64-bit intermediate.
///
/// The shift is arithmetic, so negative products round toward negative infinity.
/// No saturation: if the down-shifted product does not fit 32 bits, the low bits
/// are kept, as in the classic engines this format comes from.
#[inline]
pub const fn fixed_mul(a: i32, b: i32) -> i32 {
    ((a as i64 * b as i64) >> FRAC_BITS) as i32
}

/// True when `a / b` could overflow the representable range. Always true for `b == 0`.
#[inline]
pub(crate) const fn div_would_overflow(a: i32, b: i32) -> bool {
    (a.unsigned_abs() >> DIV_GUARD_SHIFT) >= b.unsigned_abs()
}

/// `i32::MAX` when `a` and `b` share a sign, `i32::MIN` otherwise.
#[inline]
const fn saturate_toward(a: i32, b: i32) -> i32 {
    ((a ^ b) >> 31) ^ i32::MAX
}

/// Fixed-point quotient `(a << FRAC_BITS) / b`, truncated toward zero.
///
/// Saturates to `i32::MAX`/`i32::MIN` (sign of `a` XOR sign of `b`) whenever the
/// overflow guard trips. A zero divisor always trips it, so `fixed_div(x, 0)` is
/// `i32::MAX` for `x >= 0` and `i32::MIN` for `x < 0`; in particular
/// `fixed_div(0, 0) == i32::MAX`.
#[inline]
pub fn fixed_div(a: i32, b: i32) -> i32 {
    if div_would_overflow(a, b) {
        let saturated = saturate_toward(a, b);
        crate::op_trace!(a, b, saturated, "fixed_div saturated");
        return saturated;
    }
    (((a as i64) << FRAC_BITS) / b as i64) as i32
}

/// Non-negative modulo: `0 <= fixed_mod(a, b) < |b|` for any nonzero `b`.
///
/// Power-of-two moduli take a mask fast path. A zero modulus is a caller bug:
/// debug builds assert, release builds log and return `a` unchanged (the result
/// the mask path produces for a mask of `-1`).
#[inline]
pub fn fixed_mod(a: i32, b: i32) -> i32 {
    if a == 0 {
        return 0;
    }

    debug_assert!(b != 0, "fixed_mod called with a zero modulus (a = {a})");
    if b == 0 {
        tracing::error!(a, "fixed_mod called with a zero modulus; returning the dividend");
        return a;
    }

    if is_power_of_two_modulus(b) {
        mod_power_of_two(a, b)
    } else {
        mod_general(a, b)
    }
}

/// `b & (b - 1) == 0`: positive powers of two and `i32::MIN`.
#[inline]
pub(crate) const fn is_power_of_two_modulus(b: i32) -> bool {
    b != 0 && b & b.wrapping_sub(1) == 0
}

/// Masking the low bits yields the non-negative residue for any sign of `a`.
#[inline]
pub(crate) const fn mod_power_of_two(a: i32, b: i32) -> i32 {
    a & b.wrapping_sub(1)
}

/// Native remainder, then lifted into `[0, |b|)` when negative.
#[inline]
pub(crate) const fn mod_general(a: i32, b: i32) -> i32 {
    // wrapping_rem: i32::MIN % -1 is 0 rather than a trap
    let r = a.wrapping_rem(b);
    if r < 0 {
        (r as i64 + b.unsigned_abs() as i64) as i32
    } else {
        r
    }
}

/// [`fixed_mul`], but an error instead of truncating an oversized product.
pub fn checked_mul(a: i32, b: i32) -> Result<i32> {
    let wide = (a as i64 * b as i64) >> FRAC_BITS;
    i32::try_from(wide).map_err(|_| FixedError::Overflow { operation: "mul" })
}

/// [`fixed_div`], but an error wherever it would saturate.
pub fn checked_div(a: i32, b: i32) -> Result<i32> {
    if b == 0 {
        return Err(FixedError::DivisionByZero);
    }
    if div_would_overflow(a, b) {
        return Err(FixedError::Overflow { operation: "div" });
    }
    Ok(fixed_div(a, b))
}

pub fn checked_mod(a: i32, b: i32) -> Result<i32> {
    if b == 0 {
        return Err(FixedError::DivisionByZero);
    }
    Ok(fixed_mod(a, b))
}
