//! Per-variant visualization controllers.
//!
//! A controller owns one immutable [`Bundle`], the selection state for its
//! axes, and (for the concept variants) the current top-concept working set.
//! Event methods translate raw pointer events into state transitions and
//! return the resulting [`Change`], so hosts can skip re-renders that would
//! be no-ops. `render` produces a full [`Frame`] of visual descriptors from
//! scratch; calling it twice without an intervening event yields identical
//! frames.

#[cfg(feature = "std")]
use std::collections::BTreeMap;

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, string::String, vec::Vec};

use serde::{Deserialize, Serialize};

use crate::color::{Paint, Rgb, WHITE};
use crate::data::Bundle;
use crate::encode;
use crate::rank::{self, RankOptions, TopConcept, UnboundedPolicy};
use crate::state::{Change, SelectionState};
use crate::sync::{self, ChipVisual, ClassChipOptions, OutputVisual, TokenVisual};

/// One full set of visual descriptors. Sections a variant does not render
/// stay empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub classes: Vec<ChipVisual>,
    pub inputs: Vec<TokenVisual>,
    pub outputs: Vec<OutputVisual>,
    pub concepts: Vec<ChipVisual>,
    /// Whether the concept row should be shown at all (hidden when the
    /// working set is empty).
    pub concepts_visible: bool,
    /// Bundle-level overlay the collaborator applies after each computed
    /// style.
    pub custom_style: BTreeMap<String, String>,
}

impl Frame {
    fn empty(custom_style: BTreeMap<String, String>) -> Self {
        Self {
            classes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            concepts: Vec::new(),
            concepts_visible: false,
            custom_style,
        }
    }
}

fn chip_options() -> ClassChipOptions {
    ClassChipOptions {
        show_class_colors_when_inactive: true,
        highlight_active_text: true,
        use_selected_style: false,
        background_rgb: WHITE,
    }
}

/// Classification attribution view. Multi-class bundles expose the class
/// axis; single-class bundles pre-lock class 0 and never react to class
/// events. The output axis is pinned to the single virtual output 0.
#[derive(Debug, Clone)]
pub struct AttributionClassification {
    bundle: Bundle,
    state: SelectionState,
    highlight_border: bool,
}

impl AttributionClassification {
    pub fn new(bundle: Bundle, highlight_border: bool) -> Self {
        let mut state = if bundle.is_multi_class() {
            SelectionState::new()
        } else {
            SelectionState::with_locked_class(0)
        };
        state.current_output = Some(0);
        Self {
            bundle,
            state,
            highlight_border,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn hover_class(&mut self, class_id: usize) -> Change {
        if !self.bundle.is_multi_class() {
            return Change::NONE;
        }
        tracing::debug!(class_id, "class hover");
        let (next, change) = self.state.set_active_class(Some(class_id));
        self.state = next;
        change
    }

    pub fn leave_class(&mut self) -> Change {
        if !self.bundle.is_multi_class() {
            return Change::NONE;
        }
        let (next, change) = self.state.restore_selected_class();
        self.state = next;
        change
    }

    pub fn click_class(&mut self, class_id: usize) -> Change {
        if !self.bundle.is_multi_class() {
            return Change::NONE;
        }
        tracing::debug!(class_id, "class click");
        self.state.trace("before click");
        let (next, change) = self.state.toggle_selected_class(class_id);
        self.state = next;
        change
    }

    pub fn render(&self) -> Frame {
        let mut frame = Frame::empty(self.bundle.custom_style.clone());
        if self.bundle.is_multi_class() {
            frame.classes = sync::update_classes(&self.bundle, &self.state, &chip_options());
        }
        frame.inputs = if self.bundle.is_multi_class() && self.state.active_class.is_none() {
            sync::update_inputs_dominant(&self.bundle, &self.state, self.highlight_border)
        } else {
            sync::update_inputs(&self.bundle, &self.state, self.highlight_border)
        };
        frame
    }
}

/// Generation attribution view: the output axis is interactive, the class
/// axis is the single implicit class 0, locked at construction.
#[derive(Debug, Clone)]
pub struct AttributionGeneration {
    bundle: Bundle,
    state: SelectionState,
    highlight_border: bool,
}

impl AttributionGeneration {
    pub fn new(bundle: Bundle, highlight_border: bool) -> Self {
        Self {
            bundle,
            state: SelectionState::with_locked_class(0),
            highlight_border,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn hover_output(&mut self, output_id: usize) -> Change {
        tracing::debug!(output_id, "output hover");
        let (next, change) = self.state.set_active_output(Some(output_id), false);
        self.state = next;
        change
    }

    pub fn leave_output(&mut self) -> Change {
        let (next, change) = self.state.restore_selected_output();
        self.state = next;
        change
    }

    pub fn click_output(&mut self, output_id: usize) -> Change {
        tracing::debug!(output_id, "output click");
        self.state.trace("before click");
        let (next, change) = self.state.toggle_selected_output(output_id, false);
        self.state = next;
        self.state.trace("after click");
        change
    }

    pub fn render(&self) -> Frame {
        let mut frame = Frame::empty(self.bundle.custom_style.clone());
        frame.inputs = sync::update_inputs(&self.bundle, &self.state, self.highlight_border);
        frame.outputs = sync::update_outputs(&self.bundle, &self.state, self.highlight_border);
        frame
    }
}

/// Global concept importances per class: hovering or locking a class shows
/// its concept list, chips shaded by |importance| against the class maximum.
#[derive(Debug, Clone)]
pub struct ConceptsClassificationGlobal {
    bundle: Bundle,
    state: SelectionState,
}

impl ConceptsClassificationGlobal {
    pub fn new(bundle: Bundle) -> Self {
        Self {
            bundle,
            state: SelectionState::new(),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn hover_class(&mut self, class_id: usize) -> Change {
        tracing::debug!(class_id, "class hover");
        let (next, change) = self.state.set_active_class(Some(class_id));
        self.state = next;
        change
    }

    pub fn leave_class(&mut self) -> Change {
        let (next, change) = self.state.restore_selected_class();
        self.state = next;
        change
    }

    pub fn click_class(&mut self, class_id: usize) -> Change {
        tracing::debug!(class_id, "class click");
        self.state.trace("before click");
        let (next, change) = self.state.toggle_selected_class(class_id);
        self.state = next;
        change
    }

    pub fn render(&self) -> Frame {
        let mut frame = Frame::empty(self.bundle.custom_style.clone());
        frame.classes = sync::update_classes(&self.bundle, &self.state, &chip_options());

        let Some(class_id) = self.state.active_class else {
            return frame;
        };
        let concepts = self
            .bundle
            .concepts
            .get(class_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let color = self
            .bundle
            .classes
            .get(class_id)
            .and_then(|class| class.color_rgb())
            .unwrap_or_else(|| self.bundle.concept_color_rgb());

        let mut max_importance = 0.0f64;
        for concept in concepts {
            let value = concept.importance.abs();
            if value > max_importance {
                max_importance = value;
            }
        }

        frame.concepts = concepts
            .iter()
            .enumerate()
            .map(|(i, concept)| ChipVisual {
                index: i,
                style: encode::default_class_style(
                    concept.importance.abs(),
                    color,
                    max_importance,
                    false,
                ),
                emphasized: false,
                selected: false,
                tooltip: Some(encode::tooltip(concept.importance)),
            })
            .collect();
        frame.concepts_visible = true;
        frame
    }
}

/// Local concepts for classification: the class axis re-ranks the working
/// set from per-class importances, the concept axis drives token heat.
///
/// This variant keeps plain hover/select fields of its own instead of the
/// two-axis state machine: its class axis has no hover/restore coupling (a
/// class hover only restyles the chip row) and its concept axis is indexed
/// by working-set position, which any re-rank invalidates wholesale.
#[derive(Debug, Clone)]
pub struct ConceptsClassificationLocal {
    bundle: Bundle,
    background: Rgb,
    working_set: Vec<TopConcept>,
    hovered_class: Option<usize>,
    selected_class: Option<usize>,
    hovered_concept: Option<usize>,
    selected_concept: Option<usize>,
}

impl ConceptsClassificationLocal {
    pub fn new(bundle: Bundle, background: Rgb) -> Self {
        let working_set = default_classification_set(&bundle);
        Self {
            bundle,
            background,
            working_set,
            hovered_class: None,
            selected_class: None,
            hovered_concept: None,
            selected_concept: None,
        }
    }

    pub fn working_set(&self) -> &[TopConcept] {
        &self.working_set
    }

    /// Hover wins over selection, like the state machine's active/selected
    /// pair.
    fn active_concept_index(&self) -> Option<usize> {
        self.hovered_concept.or(self.selected_concept)
    }

    fn set_working_set(&mut self, set: Vec<TopConcept>) {
        self.working_set = set;
        self.hovered_concept = None;
        self.selected_concept = None;
    }

    pub fn hover_class(&mut self, class_id: usize) -> Change {
        let changed = self.hovered_class != Some(class_id);
        self.hovered_class = Some(class_id);
        Change {
            class_changed: changed,
            ..Change::NONE
        }
    }

    pub fn leave_class(&mut self, class_id: usize) -> Change {
        let changed = self.hovered_class == Some(class_id);
        if changed {
            self.hovered_class = None;
        }
        Change {
            class_changed: changed,
            ..Change::NONE
        }
    }

    /// Lock or unlock a class; either way the working set is rebuilt and
    /// the concept axis reset.
    pub fn click_class(&mut self, class_id: usize) -> Change {
        tracing::debug!(class_id, "class click");
        let was_selected = self.selected_class == Some(class_id);
        self.selected_class = if was_selected { None } else { Some(class_id) };
        self.hovered_class = None;

        let set = if was_selected {
            default_classification_set(&self.bundle)
        } else {
            self.class_set(class_id)
        };
        self.set_working_set(set);

        Change {
            class_changed: true,
            was_deselected: was_selected,
            ..Change::NONE
        }
    }

    fn class_set(&self, class_id: usize) -> Vec<TopConcept> {
        let bundle = &self.bundle;
        let activations = bundle
            .activations_for_class(class_id)
            .map(Vec::as_slice)
            .unwrap_or(&bundle.activations);
        rank::build_top_concepts(
            bundle.importance_row(class_id),
            bundle.labels_for_class(class_id),
            activations,
            classification_rank_options(bundle),
            |id| bundle.concept_color_for(id),
        )
    }

    pub fn hover_concept(&mut self, index: usize) -> Change {
        let changed = self.hovered_concept != Some(index);
        self.hovered_concept = Some(index);
        Change {
            class_changed: changed,
            ..Change::NONE
        }
    }

    pub fn leave_concept(&mut self, index: usize) -> Change {
        let changed = self.hovered_concept == Some(index);
        if changed {
            self.hovered_concept = None;
        }
        Change {
            class_changed: changed,
            ..Change::NONE
        }
    }

    pub fn click_concept(&mut self, index: usize) -> Change {
        tracing::debug!(index, "concept click");
        let was_selected = self.selected_concept == Some(index);
        self.selected_concept = if was_selected { None } else { Some(index) };
        if was_selected {
            self.hovered_concept = None;
        }
        Change {
            class_changed: true,
            was_deselected: was_selected,
            ..Change::NONE
        }
    }

    /// Token heat only engages when the active activation table covers the
    /// sample one row per token; a lone aggregate row or a mismatched table
    /// leaves the tokens at baseline.
    fn render_tokens(&self) -> Vec<TokenVisual> {
        let sample_len = self.bundle.sample.len();
        let activations = self.active_activations();
        let usable = activations.len() > 1 && activations.len() == sample_len;
        if !usable || self.working_set.is_empty() {
            return sync::cleared_tokens(sample_len);
        }

        match self.active_concept_index() {
            None => sync::update_concept_tokens_default(
                sample_len,
                activations,
                &self.working_set,
                self.background,
            ),
            Some(index) => match self.working_set.get(index) {
                Some(concept) => sync::update_concept_tokens_focused(
                    sample_len,
                    activations,
                    concept,
                    self.background,
                ),
                None => sync::cleared_tokens(sample_len),
            },
        }
    }

    /// Class-filtered activations only apply while that class is locked;
    /// hover never switches the table.
    fn active_activations(&self) -> &[Vec<f64>] {
        self.selected_class
            .and_then(|class_id| self.bundle.activations_for_class(class_id))
            .map(Vec::as_slice)
            .unwrap_or(&self.bundle.activations)
    }

    pub fn render(&self) -> Frame {
        let mut frame = Frame::empty(self.bundle.custom_style.clone());
        let chip_state = SelectionState {
            active_class: self.hovered_class,
            selected_class: self.selected_class,
            ..SelectionState::default()
        };
        frame.classes = sync::update_classes(
            &self.bundle,
            &chip_state,
            &ClassChipOptions {
                show_class_colors_when_inactive: false,
                highlight_active_text: true,
                use_selected_style: false,
                background_rgb: self.background,
            },
        );
        // Idle chips outline with the text color so the hover affordance
        // matches the label.
        for chip in &mut frame.classes {
            if !chip.emphasized {
                chip.style.outline = Paint::Current;
            }
        }
        frame.concepts = sync::update_concept_chips(
            &self.working_set,
            self.active_concept_index(),
            self.selected_concept,
            self.bundle.onclick_colors(),
            self.background,
        );
        frame.concepts_visible = !self.working_set.is_empty();
        frame.inputs = self.render_tokens();
        frame
    }
}

/// Local concepts for generation: clicking an output token re-ranks the
/// working set from that output's importance row; concept hover/select
/// drives token heat across the whole sample.
///
/// The two-axis state machine fits directly here: concepts ride the class
/// axis, output tokens the output axis, and `reset_class` on output toggles
/// gives the "context switch clears concept focus" rule for free.
#[derive(Debug, Clone)]
pub struct ConceptsGenerationLocal {
    bundle: Bundle,
    background: Rgb,
    state: SelectionState,
    working_set: Vec<TopConcept>,
    output_start: usize,
}

impl ConceptsGenerationLocal {
    pub fn new(bundle: Bundle, background: Rgb) -> Self {
        let output_start = bundle.sample.len().saturating_sub(bundle.importances.len());
        let working_set = default_generation_set(&bundle);
        Self {
            bundle,
            background,
            state: SelectionState::new(),
            working_set,
            output_start,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn working_set(&self) -> &[TopConcept] {
        &self.working_set
    }

    /// First sample index that is a generated output token.
    pub fn output_start(&self) -> usize {
        self.output_start
    }

    pub fn click_output(&mut self, output_index: usize) -> Change {
        tracing::debug!(output_index, "output click");
        let was_selected = self.state.selected_output == Some(output_index);
        let (next, change) = self.state.toggle_selected_output(output_index, true);
        self.state = next;

        let set = if was_selected {
            default_generation_set(&self.bundle)
        } else {
            self.output_set(output_index)
        };
        self.set_working_set(set);
        change
    }

    fn output_set(&self, output_index: usize) -> Vec<TopConcept> {
        let bundle = &self.bundle;
        rank::build_top_concepts(
            bundle.importance_row(output_index),
            &bundle.labels,
            &bundle.activations,
            generation_rank_options(bundle),
            |id| bundle.concept_color_for(id),
        )
    }

    /// Replacing the working set invalidates concept positions, so the
    /// concept axis is cleared with it.
    fn set_working_set(&mut self, set: Vec<TopConcept>) {
        self.working_set = set;
        self.state.active_class = None;
        self.state.selected_class = None;
    }

    pub fn hover_concept(&mut self, index: usize) -> Change {
        let (next, change) = self.state.set_active_class(Some(index));
        self.state = next;
        change
    }

    pub fn leave_concept(&mut self, index: usize) -> Change {
        if self.state.active_class != Some(index) {
            return Change::NONE;
        }
        let (next, change) = self.state.restore_selected_class();
        self.state = next;
        change
    }

    pub fn click_concept(&mut self, index: usize) -> Change {
        tracing::debug!(index, "concept click");
        let (next, change) = self.state.toggle_selected_class(index);
        self.state = next;
        change
    }

    fn render_tokens(&self) -> Vec<TokenVisual> {
        let sample_len = self.bundle.sample.len();
        let mut tokens = if self.working_set.is_empty() {
            sync::cleared_tokens(sample_len)
        } else {
            match self.state.active_class {
                None => sync::update_concept_tokens_default(
                    sample_len,
                    &self.bundle.activations,
                    &self.working_set,
                    self.background,
                ),
                Some(index) => match self.working_set.get(index) {
                    Some(concept) => sync::update_concept_tokens_focused(
                        sample_len,
                        &self.bundle.activations,
                        concept,
                        self.background,
                    ),
                    None => sync::cleared_tokens(sample_len),
                },
            }
        };

        if let Some(selected) = self.state.selected_output {
            let sample_index = self.output_start + selected;
            if let Some(token) = tokens.get_mut(sample_index) {
                token.selected = true;
            }
        }
        tokens
    }

    pub fn render(&self) -> Frame {
        let mut frame = Frame::empty(self.bundle.custom_style.clone());
        frame.concepts = sync::update_concept_chips(
            &self.working_set,
            self.state.active_class,
            self.state.selected_class,
            self.bundle.onclick_colors(),
            self.background,
        );
        frame.concepts_visible = !self.working_set.is_empty();
        frame.inputs = self.render_tokens();
        frame
    }
}

fn classification_rank_options(bundle: &Bundle) -> RankOptions {
    RankOptions {
        top_k: bundle.top_k_limit(),
        unbounded: UnboundedPolicy::KeepAll,
        keep_signed: true,
    }
}

fn generation_rank_options(bundle: &Bundle) -> RankOptions {
    RankOptions {
        top_k: bundle.top_k_limit(),
        unbounded: UnboundedPolicy::ReturnEmpty,
        keep_signed: false,
    }
}

/// Default classification working set: per-concept sums of |activation|
/// over the whole sample.
fn default_classification_set(bundle: &Bundle) -> Vec<TopConcept> {
    let scores = rank::aggregate_magnitudes(&bundle.activations);
    rank::build_top_concepts(
        &scores,
        &bundle.labels,
        &bundle.activations,
        classification_rank_options(bundle),
        |id| bundle.concept_color_for(id),
    )
}

/// Default generation working set: per-concept sums of |importance| over
/// all outputs.
fn default_generation_set(bundle: &Bundle) -> Vec<TopConcept> {
    let scores = rank::aggregate_magnitudes(&bundle.importances);
    rank::build_top_concepts(
        &scores,
        &bundle.labels,
        &bundle.activations,
        generation_rank_options(bundle),
        |id| bundle.concept_color_for(id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Paint;

    fn single_class_json() -> &'static str {
        r##"{
            "classes": [
                {"name": "only", "positive_color": "#2ca02c",
                 "negative_color": "#d62728", "min": -1.0, "max": 1.0}
            ],
            "inputs": {
                "words": ["a", "b"],
                "attributions": [[[1.0], [-0.5]]]
            }
        }"##
    }

    fn multi_class_json() -> &'static str {
        r##"{
            "classes": [
                {"name": "a", "color": "#1f77b4", "positive_color": "#2ca02c",
                 "negative_color": "#d62728", "min": -2.0, "max": 4.0},
                {"name": "b", "color": "#ff7f0e", "positive_color": "#2ca02c",
                 "negative_color": "#d62728", "min": -1.0, "max": 5.0}
            ],
            "inputs": {
                "words": ["x", "y"],
                "attributions": [[[4.0, 1.0], [-2.0, 0.5]]]
            }
        }"##
    }

    fn concepts_local_json() -> &'static str {
        r##"{
            "classes": [{"name": "a"}, {"name": "b"}],
            "sample": ["t0", "t1", "t2"],
            "activations": [[0.2, 0.0], [0.0, 0.8], [0.4, 0.1]],
            "activations_by_class": {"1": [[0.0, 0.1], [0.0, 0.9], [0.0, 0.0]]},
            "importances": [[1.0, 0.0], [0.0, -2.0]],
            "labels": ["first", "second"],
            "top_k": 5
        }"##
    }

    fn generation_local_json(top_k: i64) -> String {
        format!(
            r##"{{
                "sample": ["p0", "p1", "o0", "o1"],
                "activations": [[0.1, 0.0], [0.0, 0.0], [0.5, 0.2], [0.0, 0.9]],
                "importances": [[2.0, 1.0], [0.0, 3.0]],
                "labels": ["alpha", "beta"],
                "top_k": {top_k}
            }}"##
        )
    }

    #[test]
    fn single_class_is_pre_locked_and_styled_from_the_start() {
        let bundle = Bundle::from_json(single_class_json()).unwrap();
        let mut viz = AttributionClassification::new(bundle, false);
        assert_eq!(viz.state().selected_class, Some(0));
        assert_eq!(viz.state().current_output, Some(0));

        let frame = viz.render();
        assert!(frame.classes.is_empty());
        assert_eq!(frame.inputs[0].style.background, Paint::Alpha([0x2c, 0xa0, 0x2c], 1.0));
        assert_eq!(frame.inputs[1].style.background, Paint::Alpha([0xd6, 0x27, 0x28], 0.5));

        // Class events are not exposed for single-class data.
        assert_eq!(viz.click_class(0), Change::NONE);
        assert_eq!(viz.render(), frame);
    }

    #[test]
    fn multi_class_idle_view_uses_dominant_colors_then_hover_switches() {
        let bundle = Bundle::from_json(multi_class_json()).unwrap();
        let mut viz = AttributionClassification::new(bundle, false);

        let idle = viz.render();
        // Dominant view: token x takes class a's own color.
        assert_eq!(idle.inputs[0].style.background, Paint::Alpha([0x1f, 0x77, 0xb4], 1.0));

        let change = viz.hover_class(1);
        assert!(change.class_changed);
        let hovered = viz.render();
        // Per-class view: token x colored by class b's positive color.
        assert_eq!(hovered.inputs[0].style.background, Paint::Alpha([0x2c, 0xa0, 0x2c], 0.2));

        viz.leave_class();
        assert_eq!(viz.render(), idle);
    }

    #[test]
    fn class_click_locks_until_toggled_off() {
        let bundle = Bundle::from_json(multi_class_json()).unwrap();
        let mut viz = AttributionClassification::new(bundle, false);
        viz.click_class(0);
        viz.hover_class(1);
        viz.leave_class();
        // Leave restores the lock, not the idle view.
        assert_eq!(viz.state().active_class, Some(0));

        let change = viz.click_class(0);
        assert!(change.was_deselected);
        assert_eq!(viz.state().active_class, None);
    }

    #[test]
    fn generation_hover_is_suppressed_while_another_output_is_locked() {
        let bundle = Bundle::from_json(
            r##"{
                "classes": [{"name": "gen", "positive_color": "#2ca02c",
                             "negative_color": "#d62728", "min": -1.0, "max": 1.0}],
                "inputs": {"words": ["p"], "attributions": [[[0.5]], [[1.0]], [[0.2]]]},
                "outputs": {"words": ["o0", "o1", "o2"],
                            "attributions": [[], [[0.8]], [[0.1], [-0.9]]]}
            }"##,
        )
        .unwrap();
        let mut viz = AttributionGeneration::new(bundle, false);

        viz.click_output(2);
        let locked = viz.render();

        assert_eq!(viz.hover_output(0), Change::NONE);
        assert_eq!(viz.render(), locked);

        // Toggling the lock off releases the axis again.
        let change = viz.click_output(2);
        assert!(change.was_deselected);
        assert_eq!(viz.state().current_output, None);
        assert!(viz.hover_output(0).output_changed);
    }

    #[test]
    fn global_concepts_appear_only_while_a_class_is_active() {
        let bundle = Bundle::from_json(
            r##"{
                "classes": [{"name": "a", "color": "#1f77b4"}],
                "concepts": [[
                    {"label": "big", "importance": 2.0},
                    {"label": "small", "importance": -1.0}
                ]]
            }"##,
        )
        .unwrap();
        let mut viz = ConceptsClassificationGlobal::new(bundle);

        let idle = viz.render();
        assert!(!idle.concepts_visible);
        assert!(idle.concepts.is_empty());

        viz.hover_class(0);
        let frame = viz.render();
        assert!(frame.concepts_visible);
        // |importance| against the class max of 2.0, in the class's color.
        assert_eq!(frame.concepts[0].style.background, Paint::Alpha([0x1f, 0x77, 0xb4], 1.0));
        assert_eq!(frame.concepts[1].style.background, Paint::Alpha([0x1f, 0x77, 0xb4], 0.5));
        // Tooltip keeps the signed importance.
        assert_eq!(frame.concepts[1].tooltip.as_deref(), Some("-1.000"));

        viz.leave_class();
        assert_eq!(viz.render(), idle);
    }

    #[test]
    fn classification_local_default_set_aggregates_activations() {
        let bundle = Bundle::from_json(concepts_local_json()).unwrap();
        let viz = ConceptsClassificationLocal::new(bundle, WHITE);
        // Totals: concept 0 -> 0.6, concept 1 -> 0.9.
        let ids: Vec<usize> = viz.working_set().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 0]);
        assert_eq!(viz.working_set()[0].label, "second");
    }

    #[test]
    fn local_class_chips_outline_with_current_color_while_idle() {
        let bundle = Bundle::from_json(concepts_local_json()).unwrap();
        let mut viz = ConceptsClassificationLocal::new(bundle, WHITE);

        let frame = viz.render();
        assert_eq!(frame.classes[0].style.outline, Paint::Current);
        // No fill either way; this variant never shows class colors.
        assert_eq!(frame.classes[0].style.background, Paint::None);

        viz.hover_class(0);
        let frame = viz.render();
        assert!(frame.classes[0].emphasized);
        assert_ne!(frame.classes[0].style.outline, Paint::Current);
    }

    #[test]
    fn class_lock_reranks_and_resets_the_concept_axis() {
        let bundle = Bundle::from_json(concepts_local_json()).unwrap();
        let mut viz = ConceptsClassificationLocal::new(bundle, WHITE);
        viz.hover_concept(0);

        viz.click_class(1);
        // Class 1's importance row is [0, -2]: only concept 1 survives, with
        // its signed score.
        assert_eq!(viz.working_set().len(), 1);
        assert_eq!(viz.working_set()[0].id, 1);
        assert_eq!(viz.working_set()[0].score, -2.0);
        // Class-filtered activations bound the heat ramp.
        assert_eq!(viz.working_set()[0].max_abs, 0.9);
        // Concept hover did not survive the re-rank.
        let frame = viz.render();
        assert!(!frame.concepts[0].emphasized);

        // Unlocking restores the default set.
        let change = viz.click_class(1);
        assert!(change.was_deselected);
        assert_eq!(viz.working_set().len(), 2);
    }

    #[test]
    fn token_heat_requires_a_full_per_token_activation_table() {
        let bundle = Bundle::from_json(
            r##"{
                "classes": [{"name": "a"}],
                "sample": ["t0", "t1", "t2"],
                "activations": [[1.0, 2.0]],
                "importances": [[1.0, 1.0]],
                "top_k": 3
            }"##,
        )
        .unwrap();
        let viz = ConceptsClassificationLocal::new(bundle, WHITE);
        // One aggregate row for three tokens: tokens stay at baseline even
        // though the working set is populated.
        let frame = viz.render();
        assert!(frame.concepts_visible);
        for token in &frame.inputs {
            assert!(token.style.is_unstyled());
            assert_eq!(token.tooltip, None);
        }
    }

    #[test]
    fn concept_focus_narrows_token_heat_to_one_concept() {
        let bundle = Bundle::from_json(concepts_local_json()).unwrap();
        let mut viz = ConceptsClassificationLocal::new(bundle, WHITE);

        viz.hover_concept(0); // working-set position 0 is concept id 1
        let frame = viz.render();
        // Token t0 has zero activation on concept 1: baseline.
        assert!(frame.inputs[0].style.is_unstyled());
        // Token t1 is concept 1's maximum: full base color.
        assert_eq!(frame.inputs[1].tooltip.as_deref(), Some("0.800"));

        viz.leave_concept(0);
        let default_frame = viz.render();
        // Default heat: t0 falls back to concept 0's activation.
        assert_eq!(default_frame.inputs[0].tooltip.as_deref(), Some("0.200"));
    }

    #[test]
    fn generation_local_zero_top_k_renders_nothing() {
        let bundle = Bundle::from_json(&generation_local_json(0)).unwrap();
        let viz = ConceptsGenerationLocal::new(bundle, WHITE);
        assert!(viz.working_set().is_empty());

        let frame = viz.render();
        assert!(!frame.concepts_visible);
        for token in &frame.inputs {
            assert!(token.style.is_unstyled());
            assert_eq!(token.tooltip, None);
        }
    }

    #[test]
    fn generation_default_set_aggregates_importance_magnitudes() {
        let bundle = Bundle::from_json(&generation_local_json(1)).unwrap();
        let viz = ConceptsGenerationLocal::new(bundle, WHITE);
        // Totals: concept 0 -> 2.0, concept 1 -> 4.0; K=1 keeps concept 1
        // with its magnitude score.
        assert_eq!(viz.working_set().len(), 1);
        assert_eq!(viz.working_set()[0].id, 1);
        assert_eq!(viz.working_set()[0].score, 4.0);
        assert_eq!(viz.output_start(), 2);
    }

    #[test]
    fn output_click_reranks_and_marks_the_sample_token() {
        let bundle = Bundle::from_json(&generation_local_json(2)).unwrap();
        let mut viz = ConceptsGenerationLocal::new(bundle, WHITE);
        viz.hover_concept(0);

        let change = viz.click_output(0);
        assert!(change.output_changed);
        // Output 0's row is [2, 1]: both concepts, magnitudes, concept 0
        // first.
        let ids: Vec<usize> = viz.working_set().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 1]);
        // The context switch cleared the concept axis.
        assert_eq!(viz.state().active_class, None);

        let frame = viz.render();
        // Sample index 2 is output 0.
        assert!(frame.inputs[2].selected);
        assert!(!frame.inputs[3].selected);

        // Re-clicking unlocks and restores the aggregate set.
        let change = viz.click_output(0);
        assert!(change.was_deselected);
        let ids: Vec<usize> = viz.working_set().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 0]);
        assert!(!viz.render().inputs[2].selected);
    }

    #[test]
    fn rendering_is_idempotent_across_variants() {
        let bundle = Bundle::from_json(multi_class_json()).unwrap();
        let viz = AttributionClassification::new(bundle, true);
        assert_eq!(viz.render(), viz.render());

        let bundle = Bundle::from_json(concepts_local_json()).unwrap();
        let viz = ConceptsClassificationLocal::new(bundle, WHITE);
        assert_eq!(viz.render(), viz.render());
    }
}
