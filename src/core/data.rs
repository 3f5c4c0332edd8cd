//! The immutable data bundle behind one visualization instance.
//!
//! Bundles are produced offline and handed over as a single JSON document
//! before any interaction begins. Every field is optional-with-default: a
//! bundle only carries the sections its variant needs, and absent numeric
//! cells read as `0` rather than erroring. Structural validation beyond JSON
//! typing is the loader collaborator's job, not ours.

#[cfg(feature = "std")]
use std::collections::{BTreeMap, HashMap};

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, string::String, string::ToString, vec::Vec};
#[cfg(not(feature = "std"))]
use hashbrown::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::{self, Rgb};

/// Fallback chip color when neither the colormap nor the bundle-level
/// concept color resolves.
pub const DEFAULT_CONCEPT_COLOR: Rgb = [0xf3, 0x9c, 0x12];

/// A label that is either a single line or a list of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelText {
    One(String),
    Many(Vec<String>),
}

impl LabelText {
    /// Single display string; multi-line labels join with `\n`.
    pub fn display(&self) -> String {
        match self {
            LabelText::One(s) => s.clone(),
            LabelText::Many(lines) => lines.join("\n"),
        }
    }
}

impl Default for LabelText {
    fn default() -> Self {
        LabelText::One(String::new())
    }
}

/// Per-class metadata for attribution display.
///
/// `min`/`max` are the dataset-provided normalization bounds: `min` the
/// negative extent (expected <= 0), `max` the positive extent (>= 0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMeta {
    #[serde(default)]
    pub name: LabelText,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub positive_color: Option<String>,
    #[serde(default)]
    pub negative_color: Option<String>,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

impl ClassMeta {
    pub fn color_rgb(&self) -> Option<Rgb> {
        self.color.as_deref().and_then(color::hex_to_rgb)
    }

    pub fn positive_rgb(&self) -> Option<Rgb> {
        self.positive_color.as_deref().and_then(color::hex_to_rgb)
    }

    pub fn negative_rgb(&self) -> Option<Rgb> {
        self.negative_color.as_deref().and_then(color::hex_to_rgb)
    }
}

/// One concept row of the global (per-class) concept listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptEntry {
    #[serde(default)]
    pub label: LabelText,
    #[serde(default)]
    pub importance: f64,
    #[serde(default)]
    pub color: Option<String>,
}

/// A token sequence with its attribution tensor.
///
/// `attributions[output_id][token_id][class_id]` is sign-significant; the
/// magnitude carries the importance. Classification bundles use a single
/// virtual output at index 0. Generation bundles are causal: the rows for
/// output `i` only cover tokens visible at step `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenBlock {
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub attributions: Vec<Vec<Vec<f64>>>,
}

impl TokenBlock {
    /// Tensor cell lookup; any missing dimension reads as `0`.
    pub fn attribution(&self, output_id: usize, token_id: usize, class_id: usize) -> f64 {
        self.attributions
            .get(output_id)
            .and_then(|tokens| tokens.get(token_id))
            .and_then(|classes| classes.get(class_id))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn has_attributions(&self) -> bool {
        !self.attributions.is_empty()
    }
}

/// The full bundle for one visualization instance. Loaded once, then
/// immutable; every derived view recomputes from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub classes: Vec<ClassMeta>,
    #[serde(default)]
    pub inputs: TokenBlock,
    #[serde(default)]
    pub outputs: TokenBlock,

    /// Token sequence for the concept variants (inputs, or prompt+output
    /// for generation).
    #[serde(default)]
    pub sample: Vec<String>,

    /// Global concept listing per class: `concepts[class_id]` is the list
    /// shown when that class is active.
    #[serde(default)]
    pub concepts: Vec<Vec<ConceptEntry>>,

    /// Per-token concept activations: `activations[token_id][concept_id]`.
    #[serde(default)]
    pub activations: Vec<Vec<f64>>,
    /// Class-filtered activations, keyed by the decimal class id.
    #[serde(default)]
    pub activations_by_class: HashMap<String, Vec<Vec<f64>>>,

    /// Importance rows: per class (classification) or per output token
    /// (generation), one score per concept.
    #[serde(default)]
    pub importances: Vec<Vec<f64>>,

    #[serde(default)]
    pub labels: Vec<LabelText>,
    #[serde(default)]
    pub labels_by_class: HashMap<String, Vec<LabelText>>,

    /// Working-set bound; `<= 0` means "unbounded" (variant-dependent, see
    /// the ranker).
    #[serde(default)]
    pub top_k: i64,

    #[serde(default)]
    pub concept_color: Option<String>,
    /// Concept id (decimal string) to hex color.
    #[serde(default)]
    pub default_colormap: HashMap<String, String>,
    /// Two-element `[selected_color, hover_color]` outline pair.
    #[serde(default)]
    pub onclick_colormap: Vec<String>,
    /// Arbitrary key/value overlay the collaborator applies after the
    /// computed style.
    #[serde(default)]
    pub custom_style: BTreeMap<String, String>,
}

impl Bundle {
    /// Parse a bundle from its JSON document. The single fallible entry
    /// point of the crate.
    pub fn from_json(json: &str) -> serde_json::Result<Bundle> {
        serde_json::from_str(json)
    }

    /// Working-set bound clamped to zero; `0` means unbounded.
    pub fn top_k_limit(&self) -> usize {
        self.top_k.max(0) as usize
    }

    pub fn is_multi_class(&self) -> bool {
        self.classes.len() > 1
    }

    /// Bundle-level concept color, falling back to the documented default.
    pub fn concept_color_rgb(&self) -> Rgb {
        self.concept_color
            .as_deref()
            .and_then(color::hex_to_rgb)
            .unwrap_or(DEFAULT_CONCEPT_COLOR)
    }

    /// Chip color for one concept: colormap entry, else the bundle-level
    /// concept color. Colormap keys are the decimal string of the id;
    /// absence is not an error.
    pub fn concept_color_for(&self, concept_id: usize) -> Rgb {
        self.default_colormap
            .get(concept_id.to_string().as_str())
            .and_then(|hex| color::hex_to_rgb(hex))
            .unwrap_or_else(|| self.concept_color_rgb())
    }

    /// The lock/preview outline pair, when both entries decode.
    pub fn onclick_colors(&self) -> Option<(Rgb, Rgb)> {
        if self.onclick_colormap.len() < 2 {
            return None;
        }
        let selected = color::hex_to_rgb(&self.onclick_colormap[0])?;
        let hover = color::hex_to_rgb(&self.onclick_colormap[1])?;
        Some((selected, hover))
    }

    /// Class-filtered activations, if the bundle carries them for this
    /// class.
    pub fn activations_for_class(&self, class_id: usize) -> Option<&Vec<Vec<f64>>> {
        self.activations_by_class
            .get(class_id.to_string().as_str())
    }

    /// Concept labels for a class, falling back to the shared labels.
    pub fn labels_for_class(&self, class_id: usize) -> &[LabelText] {
        self.labels_by_class
            .get(class_id.to_string().as_str())
            .map(Vec::as_slice)
            .unwrap_or(&self.labels)
    }

    /// Importance row lookup; a missing row is an empty slice.
    pub fn importance_row(&self, index: usize) -> &[f64] {
        self.importances
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Activation cell lookup over a `[token][concept]` table; missing cells
/// read as `0`.
pub fn activation(rows: &[Vec<f64>], token_id: usize, concept_id: usize) -> f64 {
    rows.get(token_id)
        .and_then(|row| row.get(concept_id))
        .copied()
        .unwrap_or(0.0)
}

/// Display form of a token: control characters are shown as their escape
/// sequences so whitespace tokens keep a visible glyph.
pub fn display_word(word: &str) -> String {
    word.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
