//! Snapshot-based undo for filters, transform and annotations.
//!
//! Every mutating action records a deep copy of the editable state taken
//! *before* the mutation. Undo pops the most recent snapshot and restores it
//! wholesale, so there is no per-command reverse logic to keep in sync.

use std::collections::VecDeque;

use crate::annotation::AnnotationStore;
use crate::constants::DEFAULT_UNDO_DEPTH;
use crate::model::{Annotation, FilterState, TransformState};

/// The undoable part of the engine state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditState {
    pub filters: FilterState,
    pub transform: TransformState,
    pub annotations: AnnotationStore,
}

/// Deep copy of [`EditState`] taken before a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Human-readable name of the action that produced this snapshot
    pub label: &'static str,
    pub filters: FilterState,
    pub transform: TransformState,
    pub annotations: Vec<Annotation>,
}

impl Snapshot {
    pub fn capture(label: &'static str, state: &EditState) -> Self {
        Self {
            label,
            filters: state.filters,
            transform: state.transform,
            annotations: state.annotations.to_vec(),
        }
    }

    /// Restore filters, transform and annotations in one step.
    /// Annotation ID allocation is not rolled back, so IDs are never reused.
    pub fn restore_into(self, state: &mut EditState) {
        state.filters = self.filters;
        state.transform = self.transform;
        state.annotations.replace_all(self.annotations);
    }
}

/// Configuration for the undo history
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of snapshots to keep
    pub max_depth: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_UNDO_DEPTH,
        }
    }
}

/// Bounded LIFO of snapshots. Pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    stack: VecDeque<Snapshot>,
    config: UndoConfig,
}

impl UndoHistory {
    /// Create a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            stack: VecDeque::with_capacity(config.max_depth),
            config,
        }
    }

    /// Push a pre-mutation snapshot.
    pub fn push(&mut self, snapshot: Snapshot) {
        log::debug!("📝 Undo: pushed '{}'", snapshot.label);
        self.stack.push_back(snapshot);

        while self.stack.len() > self.config.max_depth {
            if let Some(evicted) = self.stack.pop_front() {
                log::trace!("Undo history full, dropped '{}'", evicted.label);
            }
        }
    }

    /// Pop the most recent snapshot, or `None` when there is nothing to undo.
    pub fn pop(&mut self) -> Option<Snapshot> {
        let snapshot = self.stack.pop_back()?;
        log::debug!("⏪ Undo: '{}'", snapshot.label);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Description of the action that would be undone next
    pub fn undo_description(&self) -> Option<&'static str> {
        self.stack.back().map(|s| s.label)
    }

    /// Number of snapshots in the history
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.config.max_depth
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.stack.clear();
        log::debug!("🗑️ Undo history cleared");
    }
}
