//! Hint tracking.
//!
//! Hints are authored clues addressed by id. The interpreter shows them
//! through the windows module and marks them read or completed via
//! `control_hint`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lifecycle of one hint.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintState {
    #[default]
    Unread,
    Read,
    Completed,
}

/// Hint states by id; untouched hints read as `Unread`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hints {
    states: BTreeMap<i64, HintState>,
}

impl Hints {
    pub fn state(&self, id: i64) -> HintState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    pub fn mark_read(&mut self, id: i64) {
        // completion is terminal
        if self.state(id) != HintState::Completed {
            self.states.insert(id, HintState::Read);
        }
    }

    pub fn complete(&mut self, id: i64) {
        self.states.insert(id, HintState::Completed);
    }

    /// Number of completed hints, exposed to `set_variable system`.
    pub fn completed_count(&self) -> i64 {
        self.states
            .values()
            .filter(|s| **s == HintState::Completed)
            .count() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_hints_are_unread() {
        let hints = Hints::default();
        assert_eq!(hints.state(9), HintState::Unread);
    }

    #[test]
    fn read_then_complete() {
        let mut hints = Hints::default();
        hints.mark_read(1);
        assert_eq!(hints.state(1), HintState::Read);
        hints.complete(1);
        assert_eq!(hints.state(1), HintState::Completed);
        hints.mark_read(1);
        assert_eq!(hints.state(1), HintState::Completed);
    }

    #[test]
    fn completed_count_counts_only_completed() {
        let mut hints = Hints::default();
        hints.mark_read(1);
        hints.complete(2);
        hints.complete(3);
        assert_eq!(hints.completed_count(), 2);
    }
}
