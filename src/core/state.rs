//! Two-axis hover/select state machine.
//!
//! One axis tracks a class-like identity (a classification class or a
//! concept chip), the other an output-like identity (a generated token).
//! Each axis keeps a hover/select pair: hover is a transient preview, click
//! is a sticky lock. There is no enumerated state tag; behavior branches on
//! which ids are set.
//!
//! Transitions consume the state and return the next one together with a
//! [`Change`] descriptor, so callers replace the snapshot they hold and can
//! skip re-renders that would be no-ops.

use serde::{Deserialize, Serialize};

/// What a transition changed. All-false means the event had no effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Change {
    pub class_changed: bool,
    pub output_changed: bool,
    pub was_deselected: bool,
}

impl Change {
    pub const NONE: Change = Change {
        class_changed: false,
        output_changed: false,
        was_deselected: false,
    };
}

/// Snapshot of both selection axes.
///
/// `active_class` / `current_output` follow the pointer; `selected_class` /
/// `selected_output` only change on click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub active_class: Option<usize>,
    pub selected_class: Option<usize>,
    pub current_output: Option<usize>,
    pub selected_output: Option<usize>,
}

impl SelectionState {
    /// Fresh state with nothing hovered or selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// State with the class axis pre-locked, for single-class data where the
    /// class axis is never exposed to the user.
    pub fn with_locked_class(class_id: usize) -> Self {
        Self {
            active_class: Some(class_id),
            selected_class: Some(class_id),
            ..Self::default()
        }
    }

    /// Pointer-enter on a class chip: hover follows unconditionally.
    pub fn set_active_class(mut self, class_id: Option<usize>) -> (Self, Change) {
        let changed = self.active_class != class_id;
        self.active_class = class_id;
        (
            self,
            Change {
                class_changed: changed,
                ..Change::NONE
            },
        )
    }

    /// Click on a class chip. Selecting also moves hover onto the clicked
    /// id so the UI reflects it before the next pointer move; re-clicking
    /// the selected id clears both fields.
    pub fn toggle_selected_class(mut self, class_id: usize) -> (Self, Change) {
        let was_selected = self.selected_class == Some(class_id);
        if was_selected {
            self.selected_class = None;
            self.active_class = None;
        } else {
            self.selected_class = Some(class_id);
            self.active_class = Some(class_id);
        }
        (
            self,
            Change {
                class_changed: true,
                was_deselected: was_selected,
                ..Change::NONE
            },
        )
    }

    /// Pointer-leave on the class axis: hover reverts to the selection, not
    /// to nothing, so a locked class stays visually active.
    pub fn restore_selected_class(mut self) -> (Self, Change) {
        let changed = self.active_class != self.selected_class;
        self.active_class = self.selected_class;
        (
            self,
            Change {
                class_changed: changed,
                ..Change::NONE
            },
        )
    }

    /// Pointer-enter on an output token.
    ///
    /// Suppressed while a different output is locked: all token highlighting
    /// is relative to the locked output's history, and letting another
    /// output's hover through would show attributions inconsistent with it.
    /// `reset_class` clears both class fields alongside the output move.
    pub fn set_active_output(mut self, output_id: Option<usize>, reset_class: bool) -> (Self, Change) {
        if self.selected_output.is_some() && self.selected_output != output_id {
            return (self, Change::NONE);
        }
        let output_changed = self.current_output != output_id;
        let class_changed =
            reset_class && (self.active_class.is_some() || self.selected_class.is_some());

        self.current_output = output_id;
        if reset_class {
            self.active_class = None;
            self.selected_class = None;
        }

        (
            self,
            Change {
                class_changed,
                output_changed,
                was_deselected: false,
            },
        )
    }

    /// Click on an output token; symmetric to [`toggle_selected_class`].
    /// Deselecting also drops the current output back to none.
    ///
    /// [`toggle_selected_class`]: SelectionState::toggle_selected_class
    pub fn toggle_selected_output(mut self, output_id: usize, reset_class: bool) -> (Self, Change) {
        let was_selected = self.selected_output == Some(output_id);
        if was_selected {
            self.selected_output = None;
            self.current_output = None;
        } else {
            self.selected_output = Some(output_id);
            self.current_output = Some(output_id);
        }
        if reset_class {
            self.selected_class = None;
            self.active_class = None;
        }
        (
            self,
            Change {
                class_changed: reset_class,
                output_changed: true,
                was_deselected: was_selected,
            },
        )
    }

    /// Pointer-leave on the output axis.
    pub fn restore_selected_output(mut self) -> (Self, Change) {
        let changed = self.current_output != self.selected_output;
        self.current_output = self.selected_output;
        (
            self,
            Change {
                output_changed: changed,
                ..Change::NONE
            },
        )
    }

    pub fn is_fully_locked(&self) -> bool {
        self.selected_output.is_some() && self.selected_class.is_some()
    }

    pub fn has_selected_class(&self) -> bool {
        self.selected_class.is_some()
    }

    pub fn has_selected_output(&self) -> bool {
        self.selected_output.is_some()
    }

    /// Log the four fields at debug level.
    pub fn trace(&self, prefix: &str) {
        tracing::debug!(
            "[{prefix}] class: selected={:?}/active={:?} output: selected={:?}/current={:?}",
            self.selected_class,
            self.active_class,
            self.selected_output,
            self.current_output,
        );
    }
}
