//! Score encoder: turns raw attribution scalars into visual styles.
//!
//! All functions are pure. A style never references the data it came from;
//! the rendering collaborator applies it verbatim.

#[cfg(not(feature = "std"))]
use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};

use crate::color::{self, Paint, Rgb};
use crate::data::ClassMeta;

/// Decimal places shown in tooltips.
pub const TOOLTIP_PRECISION: usize = 3;

/// Minimum effective fill opacity before the text-contrast switch engages.
pub const TEXT_CONTRAST_OPACITY: f64 = 0.35;

/// Computed style for one rendered element. `text: None` means the element
/// keeps its inherited text color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub background: Paint,
    pub outline: Paint,
    pub text: Option<Rgb>,
}

impl ElementStyle {
    /// Baseline: nothing painted, inherited text.
    pub const UNSTYLED: ElementStyle = ElementStyle {
        background: Paint::None,
        outline: Paint::None,
        text: None,
    };

    pub fn is_unstyled(&self) -> bool {
        *self == Self::UNSTYLED
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self::UNSTYLED
    }
}

/// Sign-aware normalization of one attribution scalar against its class
/// bounds. Negative values normalize against `min` (the negative extent)
/// and come back sign-flipped into `[-1, 0]`; positive values normalize
/// against `max`. A zero bound yields `0` on that branch, never NaN/Inf.
pub fn normalize_attribution(alpha: f64, min: f64, max: f64) -> f64 {
    if alpha < 0.0 {
        if min == 0.0 {
            0.0
        } else {
            -(alpha / min)
        }
    } else if max == 0.0 {
        0.0
    } else {
        alpha / max
    }
}

/// Style for one token under a single active class.
///
/// The sign of the normalized value picks the positive or negative class
/// color; its magnitude becomes the fill opacity. With `highlight_border`
/// the fill drops to half opacity and the full opacity moves to the
/// outline, visually marking preview styling.
pub fn word_style(alpha: f64, class: &ClassMeta, highlight_border: bool) -> ElementStyle {
    let normalized = normalize_attribution(alpha, class.min, class.max);
    let rgb = if normalized < 0.0 {
        class.negative_rgb()
    } else {
        class.positive_rgb()
    };
    let Some(rgb) = rgb else {
        return ElementStyle::UNSTYLED;
    };

    let abs_alpha = normalized.abs();
    let fill_ratio = if highlight_border { 0.5 } else { 1.0 };
    let effective = abs_alpha * fill_ratio;

    ElementStyle {
        background: Paint::Alpha(rgb, effective),
        outline: if highlight_border {
            Paint::Alpha(rgb, abs_alpha)
        } else {
            Paint::None
        },
        text: white_text_if(effective, rgb, false),
    }
}

/// Style for one token in the default multi-class view. `alpha` is the
/// dominant (positive) value and `max` the global maximum across all tokens
/// and classes, so intensities stay comparable across classes of differing
/// natural scale.
pub fn default_class_style(alpha: f64, rgb: Rgb, max: f64, highlight_border: bool) -> ElementStyle {
    let normalized = if max > 0.0 { alpha / max } else { 0.0 };
    let fill_ratio = if highlight_border { 0.5 } else { 1.0 };
    let effective = normalized * fill_ratio;

    ElementStyle {
        background: Paint::Alpha(rgb, effective),
        outline: if highlight_border {
            Paint::Alpha(rgb, normalized)
        } else {
            Paint::None
        },
        text: white_text_if(effective, rgb, color::is_tab10(rgb)),
    }
}

fn white_text_if(effective_opacity: f64, rgb: Rgb, force_dark: bool) -> Option<Rgb> {
    let dark = color::brightness(rgb) < color::BRIGHTNESS_DARK || force_dark;
    if effective_opacity >= TEXT_CONTRAST_OPACITY && dark {
        Some(color::WHITE)
    } else {
        None
    }
}

/// Dominant class for one token: the strictly greatest positive value.
/// Equal values never overwrite an earlier winner, so ties resolve to the
/// lowest class index. `None` when no class is positive.
pub fn dominant_class(values: impl IntoIterator<Item = f64>) -> Option<(usize, f64)> {
    let mut max_value = f64::NEG_INFINITY;
    let mut winner = None;
    for (class_id, value) in values.into_iter().enumerate() {
        if value > 0.0 && value > max_value {
            max_value = value;
            winner = Some(class_id);
        }
    }
    winner.map(|id| (id, max_value))
}

/// Fully opaque style for a solid fill: background and outline take the
/// color, text flips to white on dark fills.
pub fn readable_style(rgb: Rgb) -> ElementStyle {
    let text = if color::brightness(rgb) < color::BRIGHTNESS_DARK {
        Some(color::WHITE)
    } else {
        None
    };
    ElementStyle {
        background: Paint::Solid(rgb),
        outline: Paint::Solid(rgb),
        text,
    }
}

/// "Concept heat" for one token: clamp the raw value to `[0, max_abs]` and
/// mix the base color over the ambient background by the resulting ratio.
/// The fill stays solid so low intensities remain legible instead of fading
/// to transparent.
pub fn concept_heat_style(value: f64, max_abs: f64, base: Rgb, background: Rgb) -> ElementStyle {
    let clamped = value.max(0.0).min(max_abs);
    let ratio = if max_abs > 0.0 { clamped / max_abs } else { 0.0 };
    readable_style(color::mix(background, base, ratio))
}

/// Solid chip color with readable text.
pub fn solid_style(base: Rgb) -> ElementStyle {
    readable_style(base)
}

/// Options for [`label_style`].
#[derive(Debug, Clone, Copy)]
pub struct LabelOptions {
    /// Lock/preview outline pair `(selected, hover)`.
    pub onclick_colors: Option<(Rgb, Rgb)>,
    /// Whether hover/select produce any highlight at all.
    pub enable_highlight: bool,
    /// Whether the base color is shown as background while idle.
    pub show_default_background: bool,
    /// Ambient page background, for the text-contrast decision when no fill
    /// is visible.
    pub background_rgb: Rgb,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            onclick_colors: None,
            enable_highlight: true,
            show_default_background: true,
            background_rgb: color::WHITE,
        }
    }
}

/// Style for a selectable chip (class or concept).
///
/// Idle chips show their base color as background, which keeps the idle
/// palette informative. Hovered/selected chips drop the fill and outline
/// with the lock or preview color when a pair is configured, else with the
/// base color. Text contrast is judged against whatever is actually
/// visible: the base fill when shown, the page background otherwise.
pub fn label_style(
    base: Option<Rgb>,
    is_active: bool,
    is_selected: bool,
    opts: &LabelOptions,
) -> ElementStyle {
    let should_highlight = opts.enable_highlight && (is_active || is_selected);
    let show_background = opts.show_default_background && base.is_some() && !should_highlight;

    let outline = if should_highlight {
        match (opts.onclick_colors, base) {
            (Some((selected, hover)), _) => {
                Paint::Solid(if is_selected { selected } else { hover })
            }
            (None, Some(base)) => Paint::Solid(base),
            (None, None) => Paint::None,
        }
    } else {
        Paint::None
    };

    let text = match base {
        Some(base) if show_background => {
            if color::is_tab10(base) {
                color::WHITE
            } else {
                color::readable_text(base)
            }
        }
        _ => color::readable_text(opts.background_rgb),
    };

    ElementStyle {
        background: match base {
            Some(base) if show_background => Paint::Solid(base),
            _ => Paint::None,
        },
        outline,
        text: Some(text),
    }
}

/// Fixed-precision decimal rendering of a scalar for tooltips.
///
/// Deliberately avoids `format!` on floats: scale + round into an `i64`,
/// then format integers (core float-to-decimal formatting has had
/// wasm-facing panics in some toolchain/browser combinations).
pub fn format_value(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value.is_sign_positive() {
            "Inf".to_string()
        } else {
            "-Inf".to_string()
        };
    }

    let decimals = decimals.min(9);
    let scale_i64 = 10_i64.checked_pow(decimals as u32).unwrap_or(1);
    let scale = scale_i64 as f64;

    let scaled = (value * scale).round();
    if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 {
        return if value.is_sign_negative() {
            "-Inf".to_string()
        } else {
            "Inf".to_string()
        };
    }

    let scaled_i = scaled as i64;
    let negative = scaled_i < 0;
    let abs_i = scaled_i.abs();
    let int_part = abs_i / scale_i64;
    let frac_part = abs_i % scale_i64;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&int_part.to_string());
    if decimals > 0 {
        out.push('.');
        let frac_str = frac_part.to_string();
        for _ in 0..decimals.saturating_sub(frac_str.len()) {
            out.push('0');
        }
        out.push_str(&frac_str);
    }
    out
}

/// Tooltip text for an attribution scalar.
pub fn tooltip(value: f64) -> String {
    format_value(value, TOOLTIP_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;

    fn class(min: f64, max: f64) -> ClassMeta {
        ClassMeta {
            positive_color: Some("#2ca02c".into()),
            negative_color: Some("#d62728".into()),
            min,
            max,
            ..ClassMeta::default()
        }
    }

    #[test]
    fn normalization_hits_unit_at_both_bounds() {
        assert_eq!(normalize_attribution(4.0, -2.0, 4.0), 1.0);
        // Negative extreme is sign-flipped to -1.
        assert_eq!(normalize_attribution(-2.0, -2.0, 4.0), -1.0);
        assert_eq!(normalize_attribution(0.0, -2.0, 4.0), 0.0);
    }

    #[test]
    fn zero_bounds_never_produce_nan_or_inf() {
        assert_eq!(normalize_attribution(3.0, -1.0, 0.0), 0.0);
        assert_eq!(normalize_attribution(-3.0, 0.0, 1.0), 0.0);
        assert_eq!(normalize_attribution(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn zero_alpha_renders_at_baseline_opacity() {
        let style = word_style(0.0, &class(-1.0, 1.0), false);
        assert_eq!(style.background, Paint::Alpha([0x2c, 0xa0, 0x2c], 0.0));
        assert_eq!(style.outline, Paint::None);
        assert_eq!(style.text, None);
    }

    #[test]
    fn sign_picks_the_color() {
        let c = class(-2.0, 4.0);
        let pos = word_style(4.0, &c, false);
        let neg = word_style(-2.0, &c, false);
        assert_eq!(pos.background, Paint::Alpha([0x2c, 0xa0, 0x2c], 1.0));
        assert_eq!(neg.background, Paint::Alpha([0xd6, 0x27, 0x28], 1.0));
    }

    #[test]
    fn highlight_border_halves_the_fill_and_keeps_the_outline() {
        let style = word_style(4.0, &class(-2.0, 4.0), true);
        assert_eq!(style.background, Paint::Alpha([0x2c, 0xa0, 0x2c], 0.5));
        assert_eq!(style.outline, Paint::Alpha([0x2c, 0xa0, 0x2c], 1.0));
    }

    #[test]
    fn missing_class_color_leaves_the_token_unstyled() {
        let c = ClassMeta {
            min: -1.0,
            max: 1.0,
            ..ClassMeta::default()
        };
        assert!(word_style(0.8, &c, false).is_unstyled());
    }

    #[test]
    fn dark_saturated_fill_switches_text_to_white() {
        // d62728 has brightness ~94; full opacity.
        let style = word_style(-2.0, &class(-2.0, 4.0), false);
        assert_eq!(style.text, Some(WHITE));
        // Below the opacity threshold the switch stays off.
        let faint = word_style(-0.2, &class(-2.0, 4.0), false);
        assert_eq!(faint.text, None);
    }

    #[test]
    fn dominant_class_ties_go_to_the_lower_index() {
        assert_eq!(dominant_class([5.0, 5.0, 1.0]), Some((0, 5.0)));
        assert_eq!(dominant_class([1.0, 5.0, 5.0]), Some((1, 5.0)));
    }

    #[test]
    fn dominant_class_ignores_non_positive_values() {
        assert_eq!(dominant_class([0.0, -3.0]), None);
        assert_eq!(dominant_class([-1.0, 0.5, -7.0]), Some((1, 0.5)));
        assert_eq!(dominant_class([]), None);
    }

    #[test]
    fn tab10_dominant_color_forces_white_text() {
        let blue = crate::color::hex_to_rgb("#1f77b4").unwrap();
        let style = default_class_style(5.0, blue, 5.0, false);
        assert_eq!(style.text, Some(WHITE));
    }

    #[test]
    fn default_class_style_guards_zero_max() {
        let style = default_class_style(5.0, [10, 10, 10], 0.0, false);
        assert_eq!(style.background, Paint::Alpha([10, 10, 10], 0.0));
        assert_eq!(style.text, None);
    }

    #[test]
    fn concept_heat_mixes_towards_the_base_color() {
        let base = [0, 0, 0];
        let bg = [255, 255, 255];
        let full = concept_heat_style(2.0, 2.0, base, bg);
        assert_eq!(full.background, Paint::Solid(base));
        assert_eq!(full.text, Some(WHITE));

        let none = concept_heat_style(0.0, 2.0, base, bg);
        assert_eq!(none.background, Paint::Solid(bg));
        assert_eq!(none.text, None);
    }

    #[test]
    fn concept_heat_clamps_and_guards_zero_max_abs() {
        let base = [0, 0, 0];
        let bg = [255, 255, 255];
        // Above max_abs clamps to full intensity.
        assert_eq!(
            concept_heat_style(9.0, 2.0, base, bg),
            concept_heat_style(2.0, 2.0, base, bg)
        );
        // Zero bound stays at the background.
        assert_eq!(
            concept_heat_style(1.0, 0.0, base, bg).background,
            Paint::Solid(bg)
        );
    }

    #[test]
    fn idle_label_shows_base_background() {
        let style = label_style(Some([200, 200, 200]), false, false, &LabelOptions::default());
        assert_eq!(style.background, Paint::Solid([200, 200, 200]));
        assert_eq!(style.outline, Paint::None);
        assert_eq!(style.text, Some([0, 0, 0]));
    }

    #[test]
    fn highlighted_label_drops_fill_and_outlines_with_lock_or_preview_color() {
        let opts = LabelOptions {
            onclick_colors: Some(([1, 1, 1], [2, 2, 2])),
            ..LabelOptions::default()
        };
        let hover = label_style(Some([200, 200, 200]), true, false, &opts);
        assert_eq!(hover.background, Paint::None);
        assert_eq!(hover.outline, Paint::Solid([2, 2, 2]));

        let locked = label_style(Some([200, 200, 200]), false, true, &opts);
        assert_eq!(locked.outline, Paint::Solid([1, 1, 1]));
    }

    #[test]
    fn highlighted_label_without_pair_outlines_with_base_color() {
        let style = label_style(Some([9, 9, 9]), true, false, &LabelOptions::default());
        assert_eq!(style.outline, Paint::Solid([9, 9, 9]));
    }

    #[test]
    fn tab10_label_fill_takes_white_text() {
        let blue = crate::color::hex_to_rgb("#1f77b4").unwrap();
        let style = label_style(Some(blue), false, false, &LabelOptions::default());
        assert_eq!(style.text, Some(WHITE));
    }

    #[test]
    fn label_text_contrast_uses_page_background_when_no_fill_shows() {
        let opts = LabelOptions {
            background_rgb: [0, 0, 0],
            show_default_background: false,
            ..LabelOptions::default()
        };
        let style = label_style(Some([255, 255, 255]), false, false, &opts);
        assert_eq!(style.background, Paint::None);
        assert_eq!(style.text, Some(WHITE));
    }

    #[test]
    fn tooltip_formatting_is_fixed_precision() {
        assert_eq!(tooltip(0.5), "0.500");
        assert_eq!(tooltip(-1.23456), "-1.235");
        assert_eq!(tooltip(0.0), "0.000");
        assert_eq!(format_value(2.5, 0), "3");
        assert_eq!(format_value(f64::NAN, 3), "NaN");
        assert_eq!(format_value(f64::INFINITY, 3), "Inf");
    }
}
