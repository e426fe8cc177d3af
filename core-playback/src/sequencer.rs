//! Track sequencing
//!
//! Index arithmetic for next/previous over a catalog of `len` tracks. Kept
//! free of session state so the wrap-around and shuffle rules can be tested
//! on their own.

use rand::Rng;

/// Index that follows `position`.
///
/// With shuffle on, draws uniformly from `[0, len)` excluding `position`.
/// With a single track there is nothing to exclude, so the position is kept.
/// Without shuffle, advances by one and wraps to `0`.
///
/// `position` is expected to be `< len`; the result is always `< len`.
/// Returns `None` for an empty catalog.
pub fn next_index<R: Rng + ?Sized>(
    position: usize,
    len: usize,
    shuffle: bool,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }

    if !shuffle {
        return Some((position + 1) % len);
    }

    if len == 1 {
        return Some(0);
    }

    // Draw from the len - 1 other slots and step over the current one.
    let draw = rng.gen_range(0..len - 1);
    Some(if draw >= position { draw + 1 } else { draw })
}

/// Index that precedes `position`, wrapping to `len - 1`. Shuffle never applies.
///
/// `position` is expected to be `< len`; the result is always `< len`.
/// Returns `None` for an empty catalog.
pub fn previous_index(position: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }

    Some((position + len - 1) % len)
}
