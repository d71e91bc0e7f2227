//! Stable, palette-free hue assignment for ordered entries.
//!
//! The hue circle is split recursively: index 0 lands on 180°, indices 1 and 2
//! fill the two remaining quarter points, indices 3..=6 the eighth points, and so
//! on. Each power-of-two "layer" halves the spacing of the previous one, so any
//! prefix of `2^k` indices is evenly spread around the wheel and appending more
//! entries never moves a hue that was already handed out.
//!
//! ```
//! use leaderboard_rs::hue::{hue_for_index, try_hue};
//!
//! assert_eq!(hue_for_index(0), 180.0);
//! assert_eq!(hue_for_index(3), 45.0);
//! assert!(try_hue(f64::NAN).is_err());
//! ```

use thiserror::Error;

/// Size of the hue wheel in degrees.
pub const COLOR_SPACE: f64 = 360.0;

/// Why an index could not be turned into a hue.
///
/// Negative and fractional indices are rejected rather than normalized, so a
/// caller can always tell a real hue from a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum HueError {
    #[error("index is not a number")]
    NotANumber,
    #[error("index must be finite")]
    Infinite,
    #[error("index must not be negative (got {0})")]
    Negative(f64),
    #[error("index must be a whole number (got {0})")]
    Fractional(f64),
}

/// Hue in degrees `[0, 360)` for a non-negative index.
///
/// The layer is computed with integer `ilog2`, so the layer/offset split is
/// exact for every `u64`. Beyond roughly 2^53 the final float division can round
/// neighbouring indices onto the same hue; such values are wrapped to keep the
/// result inside the wheel.
pub fn hue_for_index(index: u64) -> f64 {
    let (base, offset) = layer_position(index);
    let step = COLOR_SPACE / (2 * base) as f64;
    let hue = step * (2 * offset + 1) as f64;
    if hue >= COLOR_SPACE { hue - COLOR_SPACE } else { hue }
}

/// Validating entry point for indices that arrive as floats (JSON numbers,
/// spreadsheet cells, user input).
pub fn try_hue(index: f64) -> Result<f64, HueError> {
    if index.is_nan() {
        return Err(HueError::NotANumber);
    }
    if index.is_infinite() {
        return Err(HueError::Infinite);
    }
    if index < 0.0 {
        return Err(HueError::Negative(index));
    }
    if index.fract() != 0.0 {
        return Err(HueError::Fractional(index));
    }
    // Whole, finite and non-negative: saturates at u64::MAX for huge values.
    Ok(hue_for_index(index as u64))
}

/// Returns `(base, offset)` for the shifted index `n = index + 1`, where
/// `base = 2^floor(log2(n))` is both the first index and the size of the layer.
fn layer_position(index: u64) -> (u128, u128) {
    let n = index as u128 + 1;
    let base = 1u128 << n.ilog2();
    (base, n - base)
}

/// Endless iterator of `(index, hue)` pairs starting at a given index.
///
/// Useful when a list grows page by page: start the next page's sequence at
/// the number of rows already shown and previously assigned hues stay valid.
#[derive(Debug, Clone)]
pub struct HueSequence {
    next: Option<u64>,
}

impl HueSequence {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(index: u64) -> Self {
        Self { next: Some(index) }
    }
}

impl Default for HueSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for HueSequence {
    type Item = (u64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        self.next = index.checked_add(1);
        Some((index, hue_for_index(index)))
    }
}
