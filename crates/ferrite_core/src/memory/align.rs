//! # Alignment Arithmetic
//!
//! All address rounding in the crate goes through these functions. Addresses
//! are plain `usize` values, never pointers.

/// Rounds `value` up to the next multiple of `alignment`.
///
/// Returns `None` if `alignment` is not a power of two or the result
/// overflows.
#[inline]
#[must_use]
pub const fn align_up(value: usize, alignment: usize) -> Option<usize> {
    if !alignment.is_power_of_two() {
        return None;
    }
    let mask = alignment - 1;
    match value.checked_add(mask) {
        Some(bumped) => Some(bumped & !mask),
        None => None,
    }
}

/// Rounds `value` down to a multiple of `alignment`.
///
/// Returns `None` if `alignment` is not a power of two.
#[inline]
#[must_use]
pub const fn align_down(value: usize, alignment: usize) -> Option<usize> {
    if !alignment.is_power_of_two() {
        return None;
    }
    Some(value & !(alignment - 1))
}

/// Returns `true` if `value` is a multiple of `alignment`.
///
/// A non-power-of-two alignment is never satisfied.
#[inline]
#[must_use]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    alignment.is_power_of_two() && (value & (alignment - 1)) == 0
}
