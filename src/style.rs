//! Styling utilities that turn a bisection hue into a concrete entry color.
//!
//! Design:
//! - Hue: comes from [`crate::hue`], keyed by the entry's index (rank, row, team).
//! - Saturation and lightness: fixed by the caller through a [`Tone`], so every
//!   entry on one view shares the same "weight" and only the hue varies.

use crate::hue::{HueError, hue_for_index, try_hue};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb8 {
    /// Format as `#RRGGBB`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h_deg: f64, // 0..360
    pub s: f64,     // 0..1
    pub l: f64,     // 0..1
}

impl fmt::Display for Hsl {
    /// Format as CSS: `hsl(h, s%, l%)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {:.0}%, {:.0}%)",
            trim_float(self.h_deg),
            clamp01(self.s) * 100.0,
            clamp01(self.l) * 100.0
        )
    }
}

/// Saturation and lightness shared by every entry of a view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub saturation: f64,
    pub lightness: f64,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            saturation: 0.60,
            lightness: 0.55,
        }
    }
}

impl Tone {
    pub fn new(saturation: f64, lightness: f64) -> Self {
        Self {
            saturation: clamp01(saturation),
            lightness: clamp01(lightness),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryStyle {
    /// `None` for the neutral fallback style.
    pub index: Option<u64>,
    pub hsl: Hsl,
    pub rgb: Rgb8,
    pub hex: String,
}

impl EntryStyle {
    /// Build the style for the entry at `index`.
    pub fn for_index(index: u64, tone: Tone) -> Self {
        Self::from_hue(Some(index), hue_for_index(index), tone)
    }

    /// Like [`EntryStyle::for_index`] but for indices that arrive as floats.
    pub fn try_for_value(index: f64, tone: Tone) -> Result<Self, HueError> {
        let hue = try_hue(index)?;
        Ok(Self::from_hue(Some(index as u64), hue, tone))
    }

    /// Gray style for entries without a usable index. The lightness of the
    /// tone is kept so the fallback sits visually next to colored rows.
    pub fn neutral(tone: Tone) -> Self {
        let hsl = Hsl {
            h_deg: 0.0,
            s: 0.0,
            l: clamp01(tone.lightness),
        };
        let rgb = hsl_to_rgb8(hsl);
        Self {
            index: None,
            hsl,
            rgb,
            hex: rgb.to_string(),
        }
    }

    /// CSS color string for the entry.
    pub fn css(&self) -> String {
        self.hsl.to_string()
    }

    fn from_hue(index: Option<u64>, hue: f64, tone: Tone) -> Self {
        let hsl = Hsl {
            h_deg: hue,
            s: clamp01(tone.saturation),
            l: clamp01(tone.lightness),
        };
        let rgb = hsl_to_rgb8(hsl);
        Self {
            index,
            hsl,
            rgb,
            hex: rgb.to_string(),
        }
    }
}

// ------------------------ Utilities ------------------------

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

fn trim_float(x: f64) -> String {
    let s = format!("{:.4}", x);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// HSL -> RGB conversion (linear; sufficient for UI colors).
pub fn hsl_to_rgb8(hsl: Hsl) -> Rgb8 {
    let h = (hsl.h_deg % 360.0) / 360.0;
    let s = clamp01(hsl.s);
    let l = clamp01(hsl.l);

    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return Rgb8 { r: v, g: v, b: v };
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 1.0 / 2.0 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    Rgb8 {
        r: (r * 255.0).round() as u8,
        g: (g * 255.0).round() as u8,
        b: (b * 255.0).round() as u8,
    }
}
