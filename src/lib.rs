//! # attriviz
//!
//! Interaction core for token-attribution visualizations.
//!
//! Given a pre-computed attribution bundle (tokens, classes, concept
//! activations), this crate runs the hover/click selection state machine
//! and turns scores into per-element visual descriptors. It does no ML and
//! touches no DOM: a rendering collaborator feeds pointer events in and
//! applies the returned styles verbatim.
//!
//! ## Quick Start
//!
//! ```
//! use attriviz::prelude::*;
//!
//! let bundle = Bundle::from_json(r##"{
//!     "classes": [
//!         {"name": "joy", "color": "#1f77b4", "positive_color": "#2ca02c",
//!          "negative_color": "#d62728", "min": -2.0, "max": 4.0},
//!         {"name": "anger", "color": "#ff7f0e", "positive_color": "#2ca02c",
//!          "negative_color": "#d62728", "min": -1.0, "max": 5.0}
//!     ],
//!     "inputs": {
//!         "words": ["great", "movie"],
//!         "attributions": [[[4.0, 1.0], [-2.0, 0.5]]]
//!     }
//! }"##).unwrap();
//!
//! let mut viz = AttributionClassification::new(bundle, false);
//!
//! // Idle multi-class view: tokens take their dominant class's color.
//! let frame = viz.render();
//! assert_eq!(frame.inputs.len(), 2);
//!
//! // Hovering a class previews its attributions; clicking locks it.
//! let change = viz.hover_class(0);
//! assert!(change.class_changed);
//! let frame = viz.render();
//! assert_eq!(frame.inputs[0].tooltip.as_deref(), Some("4.000"));
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//!
//! ## Modules
//!
//! - [`state`]: Two-axis hover/select state machine
//! - [`encode`]: Score-to-style encoder
//! - [`rank`]: Top-K concept ranking
//! - [`sync`]: State + data to visual-descriptor projection
//! - [`controller`]: Per-variant visualization controllers
//! - [`data`]: The immutable JSON bundle
//! - [`color`]: RGB primitives

// no_std support
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[path = "core/color.rs"]
pub mod color;

#[path = "core/state.rs"]
pub mod state;

#[path = "core/data.rs"]
pub mod data;

#[path = "core/encode.rs"]
pub mod encode;

#[path = "core/rank.rs"]
pub mod rank;

#[path = "core/sync.rs"]
pub mod sync;

#[path = "core/controller.rs"]
pub mod controller;

/// Prelude module for convenient imports.
///
/// ```
/// use attriviz::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::{Paint, Rgb};
    pub use crate::controller::{
        AttributionClassification, AttributionGeneration, ConceptsClassificationGlobal,
        ConceptsClassificationLocal, ConceptsGenerationLocal, Frame,
    };
    pub use crate::data::{Bundle, ClassMeta, ConceptEntry, LabelText, TokenBlock};
    pub use crate::encode::ElementStyle;
    pub use crate::rank::{RankOptions, TopConcept, UnboundedPolicy};
    pub use crate::state::{Change, SelectionState};
    pub use crate::sync::{ChipVisual, OutputPhase, OutputVisual, TokenVisual};
}
