//! Bounded, branch-invalidating undo/redo over full-scene snapshots.

use std::collections::VecDeque;

use crate::scene::SceneSnapshot;

/// Maximum number of undo snapshots kept by default.
pub const DEFAULT_MAX_STEPS: usize = 20;

/// What a history operation asks the editor to load.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryStep {
    /// The respective sequence was empty; nothing to load.
    Unchanged,
    /// Undone past the first snapshot: restore the empty scene.
    Baseline,
    /// Load this snapshot as the new current state.
    Restore(SceneSnapshot),
}

/// Snapshot history. The most recent element of the undo sequence is the
/// current logical state once at least one snapshot exists.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    undo: VecDeque<SceneSnapshot>,
    redo: Vec<SceneSnapshot>,
    max_steps: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STEPS)
    }
}

impl HistoryStack {
    pub fn new(max_steps: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_steps,
        }
    }

    /// Record a new committed state. Evicts the oldest snapshot past the
    /// step limit and always invalidates the redo branch.
    pub fn push(&mut self, snapshot: SceneSnapshot) {
        if self.undo.len() >= self.max_steps {
            self.undo.pop_front();
            log::info!("history step limit reached, dropping oldest snapshot (limit {})", self.max_steps);
        }
        self.undo.push_back(snapshot);
        self.redo.clear();
    }

    /// Step back once. Moves the current snapshot to the redo side and
    /// returns the prior state to load.
    pub fn undo(&mut self) -> HistoryStep {
        let Some(current) = self.undo.pop_back() else {
            return HistoryStep::Unchanged;
        };
        self.redo.push(current);
        match self.undo.back() {
            Some(prior) => HistoryStep::Restore(prior.clone()),
            None => HistoryStep::Baseline,
        }
    }

    /// Step forward once, returning the snapshot to load.
    pub fn redo(&mut self) -> HistoryStep {
        let Some(snapshot) = self.redo.pop() else {
            return HistoryStep::Unchanged;
        };
        self.undo.push_back(snapshot.clone());
        HistoryStep::Restore(snapshot)
    }

    /// Whether the host's undo control should be enabled.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether the host's redo control should be enabled.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tag: usize) -> SceneSnapshot {
        SceneSnapshot::from_raw(format!("{{\"tag\":{tag}}}"))
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = HistoryStack::default();
        history.push(snap(1));
        history.push(snap(2));
        history.undo();
        assert!(history.can_redo());
        history.push(snap(3));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_returns_prior_state() {
        let mut history = HistoryStack::default();
        history.push(snap(1));
        history.push(snap(2));
        assert_eq!(history.undo(), HistoryStep::Restore(snap(1)));
        assert_eq!(history.undo(), HistoryStep::Baseline);
        assert_eq!(history.undo(), HistoryStep::Unchanged);
    }

    #[test]
    fn test_redo_reloads_undone_snapshot() {
        let mut history = HistoryStack::default();
        history.push(snap(1));
        history.push(snap(2));
        history.undo();
        assert_eq!(history.redo(), HistoryStep::Restore(snap(2)));
        assert_eq!(history.redo(), HistoryStep::Unchanged);
        assert_eq!(history.undo_len(), 2);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryStack::new(3);
        for i in 0..5 {
            history.push(snap(i));
        }
        assert_eq!(history.undo_len(), 3);
        // Unwind fully: the two oldest snapshots are gone.
        assert_eq!(history.undo(), HistoryStep::Restore(snap(3)));
        assert_eq!(history.undo(), HistoryStep::Restore(snap(2)));
        assert_eq!(history.undo(), HistoryStep::Baseline);
    }

    #[test]
    fn test_round_trip_restores_each_state() {
        let mut history = HistoryStack::default();
        for i in 0..5 {
            history.push(snap(i));
        }
        for i in (0..4).rev() {
            assert_eq!(history.undo(), HistoryStep::Restore(snap(i)));
        }
        assert_eq!(history.undo(), HistoryStep::Baseline);
        for i in 0..5 {
            assert_eq!(history.redo(), HistoryStep::Restore(snap(i)));
        }
        assert_eq!(history.redo(), HistoryStep::Unchanged);
    }
}
