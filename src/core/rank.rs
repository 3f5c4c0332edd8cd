//! Top-K concept ranking.
//!
//! Builds the short-lived working set behind the concept chip row: filter
//! out zero-magnitude concepts, stable-sort by magnitude, truncate to the
//! configured bound, and attach per-concept display metadata. The working
//! set is recomputed from scratch whenever the ranking context (class or
//! output focus) changes; nothing here caches.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::data::{self, LabelText};

/// One surviving entry of the working set, ordered by descending
/// `|score|`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopConcept {
    /// Concept id in the underlying activation table (not the position in
    /// the working set).
    pub id: usize,
    pub label: String,
    /// Ranking score; signed or magnitude depending on
    /// [`RankOptions::keep_signed`].
    pub score: f64,
    /// Max |activation| for this concept across the context's token set.
    pub max_abs: f64,
    pub color: Rgb,
}

/// What an unbounded `top_k` (`<= 0` in the bundle) means.
///
/// The two concept variants disagree: the classification view returns every
/// non-zero concept, the generation view returns nothing. Kept as a named
/// per-variant policy rather than unified (flagged for product
/// clarification).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnboundedPolicy {
    KeepAll,
    ReturnEmpty,
}

#[derive(Debug, Clone, Copy)]
pub struct RankOptions {
    /// Working-set bound; `0` means unbounded (see `unbounded`).
    pub top_k: usize,
    pub unbounded: UnboundedPolicy,
    /// Keep the raw signed score in the working set (classification) or
    /// store its magnitude (generation).
    pub keep_signed: bool,
}

/// Aggregate context scores: per concept, the sum of |activation| across
/// every row (tokens for classification, outputs for generation).
pub fn aggregate_magnitudes(rows: &[Vec<f64>]) -> Vec<f64> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut totals = vec![0.0; first.len()];
    for row_id in 0..rows.len() {
        for (concept_id, total) in totals.iter_mut().enumerate() {
            *total += data::activation(rows, row_id, concept_id).abs();
        }
    }
    totals
}

/// Max |activation| of one concept across a `[token][concept]` table.
/// Recomputed per context: the same concept's dynamic range differs between
/// the global sample and a class- or output-filtered subset.
pub fn max_abs_for_concept(rows: &[Vec<f64>], concept_id: usize) -> f64 {
    let mut max_value = 0.0;
    for row_id in 0..rows.len() {
        let value = data::activation(rows, row_id, concept_id).abs();
        if value > max_value {
            max_value = value;
        }
    }
    max_value
}

/// Build the working set for one ranking context.
///
/// Concepts ranking exactly `0` are dropped regardless of the bound. The
/// sort is stable, so equal magnitudes keep their original concept-index
/// order. `labels` may be shorter than `scores`; missing labels fall back
/// to a generated placeholder. `color_for` resolves the chip color
/// (typically [`crate::data::Bundle::concept_color_for`]).
pub fn build_top_concepts(
    scores: &[f64],
    labels: &[LabelText],
    activations: &[Vec<f64>],
    opts: RankOptions,
    color_for: impl Fn(usize) -> Rgb,
) -> Vec<TopConcept> {
    if opts.top_k == 0 && opts.unbounded == UnboundedPolicy::ReturnEmpty {
        return Vec::new();
    }

    let mut entries: Vec<(usize, f64, f64)> = Vec::new();
    for (concept_id, &raw) in scores.iter().enumerate() {
        let rank = raw.abs();
        if rank == 0.0 {
            continue;
        }
        entries.push((concept_id, raw, rank));
    }

    entries.sort_by(|a, b| b.2.total_cmp(&a.2));
    if opts.top_k > 0 {
        entries.truncate(opts.top_k);
    }

    entries
        .into_iter()
        .map(|(concept_id, raw, rank)| TopConcept {
            id: concept_id,
            label: labels
                .get(concept_id)
                .map(LabelText::display)
                .unwrap_or_else(|| format!("Concept #{concept_id}")),
            score: if opts.keep_signed { raw } else { rank },
            max_abs: max_abs_for_concept(activations, concept_id),
            color: color_for(concept_id),
        })
        .collect()
}
