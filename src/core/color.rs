//! Color primitives shared by the score encoder.
//!
//! Everything here is integer/float math on `[u8; 3]` triples; no styling
//! policy lives in this module.

use serde::{Deserialize, Serialize};

/// An opaque sRGB triple.
pub type Rgb = [u8; 3];

/// Ambient page background assumed when the rendering collaborator does not
/// report one.
pub const WHITE: Rgb = [255, 255, 255];

/// Perceived-brightness threshold below which light text is used.
pub const BRIGHTNESS_DARK: f64 = 150.0;

/// The matplotlib tab10 palette, used for per-class colors in bundles
/// exported from classification runs.
pub const TAB10: [Rgb; 10] = [
    [0x1f, 0x77, 0xb4],
    [0xff, 0x7f, 0x0e],
    [0x2c, 0xa0, 0x2c],
    [0xd6, 0x27, 0x28],
    [0x94, 0x67, 0xbd],
    [0x8c, 0x56, 0x4b],
    [0xe3, 0x77, 0xc2],
    [0x7f, 0x7f, 0x7f],
    [0xbc, 0xbd, 0x22],
    [0x17, 0xbe, 0xcf],
];

/// A paint for one styling slot (background, outline).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    /// Nothing painted; the element keeps its base appearance.
    None,
    /// The CSS `currentColor` keyword: paint with the element's text color.
    Current,
    /// Fully opaque color.
    Solid(Rgb),
    /// Color with an explicit opacity in `[0, 1]`.
    Alpha(Rgb, f64),
}

impl Paint {
    pub fn is_none(&self) -> bool {
        matches!(self, Paint::None)
    }
}

/// Decode a `#rrggbb` / `rrggbb` hex string.
///
/// Returns `None` for anything that does not decode cleanly; callers fall
/// back to leaving the element unstyled, which is what browsers did with the
/// malformed `rgba(NaN, ...)` values this replaces.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Perceived brightness (ITU-R BT.601 luma weights).
pub fn brightness(rgb: Rgb) -> f64 {
    0.299 * rgb[0] as f64 + 0.587 * rgb[1] as f64 + 0.114 * rgb[2] as f64
}

/// Whether a decoded color is one of the tab10 palette entries.
pub fn is_tab10(rgb: Rgb) -> bool {
    TAB10.contains(&rgb)
}

/// Readable foreground for a solid background: white below the dark
/// threshold, black otherwise.
pub fn readable_text(rgb: Rgb) -> Rgb {
    if brightness(rgb) < BRIGHTNESS_DARK {
        WHITE
    } else {
        [0, 0, 0]
    }
}

/// Linear per-channel mix from `background` towards `foreground`.
///
/// `ratio` 0 yields the background, 1 the foreground. Used for "concept
/// heat": panels sit on a solid background and must stay opaque, so low
/// intensities mix towards the page color instead of fading to transparent.
pub fn mix(background: Rgb, foreground: Rgb, ratio: f64) -> Rgb {
    let mut out = [0u8; 3];
    for i in 0..3 {
        let bg = background[i] as f64;
        let fg = foreground[i] as f64;
        let value = (bg + (fg - bg) * ratio).round();
        out[i] = value.clamp(0.0, 255.0) as u8;
    }
    out
}
