//! View synchronization: pure projection from `(selection state, data)` to
//! per-element visual descriptors.
//!
//! Every function here recomputes its full descriptor list on each call and
//! depends on nothing but its arguments, so re-rendering after a transition
//! is idempotent by construction. The rendering collaborator applies the
//! descriptors and owns everything DOM-shaped.

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use serde::{Deserialize, Serialize};

use crate::color::{Rgb, WHITE};
use crate::data::{self, Bundle};
use crate::encode::{self, ElementStyle, LabelOptions};
use crate::rank::TopConcept;
use crate::state::SelectionState;

/// Visual descriptor for a selectable chip (class or concept).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipVisual {
    pub index: usize,
    pub style: ElementStyle,
    /// Discrete highlight flag (hovered or selected).
    pub emphasized: bool,
    /// Sticky selected marker, honored only by variants that use it.
    pub selected: bool,
    pub tooltip: Option<String>,
}

/// Visual descriptor for an input/sample token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenVisual {
    pub index: usize,
    pub style: ElementStyle,
    /// Sticky selected marker (generation concept view marks locked output
    /// tokens this way).
    pub selected: bool,
    pub tooltip: Option<String>,
}

impl TokenVisual {
    fn unstyled(index: usize) -> Self {
        Self {
            index,
            style: ElementStyle::UNSTYLED,
            selected: false,
            tooltip: None,
        }
    }
}

/// Position of an output token relative to the active output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputPhase {
    /// Strictly before the active output: part of the visible history,
    /// eligible for attribution coloring.
    Revealed,
    /// The active output itself.
    Current,
    /// At or after the active output (or no output active): inert.
    Pending,
}

/// Visual descriptor for an output token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputVisual {
    pub index: usize,
    pub phase: OutputPhase,
    pub style: ElementStyle,
    pub tooltip: Option<String>,
}

/// Options for [`update_classes`].
#[derive(Debug, Clone, Copy)]
pub struct ClassChipOptions {
    /// Show each class's own color as chip background while no class is
    /// active.
    pub show_class_colors_when_inactive: bool,
    /// Whether hover/select highlight the chip at all.
    pub highlight_active_text: bool,
    /// Whether the sticky `selected` marker is emitted.
    pub use_selected_style: bool,
    pub background_rgb: Rgb,
}

impl Default for ClassChipOptions {
    fn default() -> Self {
        Self {
            show_class_colors_when_inactive: true,
            highlight_active_text: false,
            use_selected_style: true,
            background_rgb: WHITE,
        }
    }
}

/// Chip styles for the class row.
pub fn update_classes(
    bundle: &Bundle,
    state: &SelectionState,
    opts: &ClassChipOptions,
) -> Vec<ChipVisual> {
    let has_active = state.active_class.is_some();
    let show_default_background = opts.show_class_colors_when_inactive && !has_active;
    let onclick = bundle.onclick_colors();

    bundle
        .classes
        .iter()
        .enumerate()
        .map(|(class_id, class)| {
            let is_active = state.active_class == Some(class_id);
            let is_selected = state.selected_class == Some(class_id);
            let base = if opts.show_class_colors_when_inactive {
                class.color_rgb()
            } else {
                None
            };
            let style = encode::label_style(
                base,
                is_active,
                is_selected,
                &LabelOptions {
                    onclick_colors: onclick,
                    enable_highlight: opts.highlight_active_text,
                    show_default_background,
                    background_rgb: opts.background_rgb,
                },
            );
            ChipVisual {
                index: class_id,
                style,
                emphasized: is_active || is_selected,
                selected: opts.use_selected_style && is_selected,
                tooltip: None,
            }
        })
        .collect()
}

/// Token styles for the input row under a single active class.
///
/// Without both an active class and a current output, every token resets to
/// baseline (this is the single-class and generation "idle" look).
pub fn update_inputs(
    bundle: &Bundle,
    state: &SelectionState,
    highlight_border: bool,
) -> Vec<TokenVisual> {
    let count = bundle.inputs.words.len();
    let (Some(class_id), Some(output_id)) = (state.active_class, state.current_output) else {
        return (0..count).map(TokenVisual::unstyled).collect();
    };
    let Some(class) = bundle.classes.get(class_id) else {
        return (0..count).map(TokenVisual::unstyled).collect();
    };

    (0..count)
        .map(|token_id| {
            let alpha = bundle.inputs.attribution(output_id, token_id, class_id);
            TokenVisual {
                index: token_id,
                style: encode::word_style(alpha, class, highlight_border),
                selected: false,
                tooltip: Some(encode::tooltip(alpha)),
            }
        })
        .collect()
}

/// Token styles for the default multi-class view: each token takes its
/// dominant class's color, normalized against the global maximum across all
/// tokens and classes of the current output.
pub fn update_inputs_dominant(
    bundle: &Bundle,
    state: &SelectionState,
    highlight_border: bool,
) -> Vec<TokenVisual> {
    let count = bundle.inputs.words.len();
    let output_id = state.current_output.unwrap_or(0);
    let n_classes = bundle.classes.len();

    let mut global_max = 0.0f64;
    for token_id in 0..count {
        for class_id in 0..n_classes {
            let value = bundle.inputs.attribution(output_id, token_id, class_id);
            if value > global_max {
                global_max = value;
            }
        }
    }

    (0..count)
        .map(|token_id| {
            let row =
                (0..n_classes).map(|class_id| bundle.inputs.attribution(output_id, token_id, class_id));
            let dominant = encode::dominant_class(row).and_then(|(class_id, value)| {
                bundle.classes[class_id]
                    .color_rgb()
                    .map(|rgb| (rgb, value))
            });
            match dominant {
                None => TokenVisual::unstyled(token_id),
                Some((rgb, value)) => TokenVisual {
                    index: token_id,
                    style: encode::default_class_style(value, rgb, global_max, highlight_border),
                    selected: false,
                    tooltip: Some(encode::tooltip(value)),
                },
            }
        })
        .collect()
}

/// Phase and styles for the output row. Tokens strictly before the active
/// output are revealed and, with an active class and an output attribution
/// tensor present, colored by their attribution towards it.
pub fn update_outputs(
    bundle: &Bundle,
    state: &SelectionState,
    highlight_border: bool,
) -> Vec<OutputVisual> {
    let count = bundle.outputs.words.len();

    (0..count)
        .map(|output_id| {
            let is_before = state
                .current_output
                .map(|current| output_id < current)
                .unwrap_or(false);
            let is_current = state.current_output == Some(output_id);
            let phase = if is_before {
                OutputPhase::Revealed
            } else if is_current {
                OutputPhase::Current
            } else {
                OutputPhase::Pending
            };

            let attributed = match (state.active_class, state.current_output) {
                (Some(class_id), Some(current)) if is_before && bundle.outputs.has_attributions() => {
                    bundle
                        .classes
                        .get(class_id)
                        .map(|class| (class, bundle.outputs.attribution(current, output_id, class_id)))
                }
                _ => None,
            };

            match attributed {
                Some((class, alpha)) => OutputVisual {
                    index: output_id,
                    phase,
                    style: encode::word_style(alpha, class, highlight_border),
                    tooltip: Some(encode::tooltip(alpha)),
                },
                None => OutputVisual {
                    index: output_id,
                    phase,
                    style: ElementStyle::UNSTYLED,
                    tooltip: None,
                },
            }
        })
        .collect()
}

/// Chip styles for the concept working set. `active_index` / `selected_index`
/// are positions in the working set, not concept ids.
pub fn update_concept_chips(
    working_set: &[TopConcept],
    active_index: Option<usize>,
    selected_index: Option<usize>,
    onclick_colors: Option<(Rgb, Rgb)>,
    background_rgb: Rgb,
) -> Vec<ChipVisual> {
    let show_default_background = active_index.is_none();

    working_set
        .iter()
        .enumerate()
        .map(|(i, concept)| {
            let is_active = active_index == Some(i);
            let is_selected = selected_index == Some(i);
            let style = encode::label_style(
                Some(concept.color),
                is_active,
                is_selected,
                &LabelOptions {
                    onclick_colors,
                    enable_highlight: true,
                    show_default_background,
                    background_rgb,
                },
            );
            ChipVisual {
                index: i,
                style,
                emphasized: is_active || is_selected,
                selected: false,
                tooltip: Some(encode::tooltip(concept.score)),
            }
        })
        .collect()
}

/// Default concept heat: each token takes the working-set concept with the
/// strongest |activation| on it; tokens touched by no working-set concept
/// stay unstyled.
pub fn update_concept_tokens_default(
    token_count: usize,
    activations: &[Vec<f64>],
    working_set: &[TopConcept],
    background_rgb: Rgb,
) -> Vec<TokenVisual> {
    (0..token_count)
        .map(|token_id| {
            let mut best: Option<(usize, f64, f64)> = None;
            for (i, concept) in working_set.iter().enumerate() {
                let raw = data::activation(activations, token_id, concept.id);
                let magnitude = raw.abs();
                let current_best = best.map(|(_, _, m)| m).unwrap_or(0.0);
                if magnitude > current_best {
                    best = Some((i, raw, magnitude));
                }
            }
            match best {
                None => TokenVisual::unstyled(token_id),
                Some((i, raw, magnitude)) => {
                    let concept = &working_set[i];
                    TokenVisual {
                        index: token_id,
                        style: encode::concept_heat_style(
                            magnitude,
                            concept.max_abs,
                            concept.color,
                            background_rgb,
                        ),
                        selected: false,
                        tooltip: Some(encode::tooltip(raw)),
                    }
                }
            }
        })
        .collect()
}

/// Focused concept heat: every token styled by one concept's activation on
/// it; zero activation stays unstyled.
pub fn update_concept_tokens_focused(
    token_count: usize,
    activations: &[Vec<f64>],
    concept: &TopConcept,
    background_rgb: Rgb,
) -> Vec<TokenVisual> {
    (0..token_count)
        .map(|token_id| {
            let raw = data::activation(activations, token_id, concept.id);
            let magnitude = raw.abs();
            if magnitude == 0.0 {
                TokenVisual::unstyled(token_id)
            } else {
                TokenVisual {
                    index: token_id,
                    style: encode::concept_heat_style(
                        magnitude,
                        concept.max_abs,
                        concept.color,
                        background_rgb,
                    ),
                    selected: false,
                    tooltip: Some(encode::tooltip(raw)),
                }
            }
        })
        .collect()
}

/// Baseline token row (no working set, or no usable activations).
pub fn cleared_tokens(token_count: usize) -> Vec<TokenVisual> {
    (0..token_count).map(TokenVisual::unstyled).collect()
}
