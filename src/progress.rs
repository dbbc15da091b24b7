//! Level progress notifications
//!
//! The engine only reports; storing the record is up to the host.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Why the current level changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelChange {
    Load,
    Reset,
    Next,
    Previous,
}

/// Receives completion and level-change notifications
pub trait ProgressSink {
    fn level_completed(&mut self, index: usize);

    fn level_changed(&mut self, _index: usize, _change: LevelChange) {}
}

/// Discards everything
impl ProgressSink for () {
    fn level_completed(&mut self, _index: usize) {}
}

/// Completed-level flags plus the last level played
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompletedLevels {
    pub completed: BTreeSet<usize>,
    pub current: usize,
}

impl CompletedLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    pub fn count(&self) -> usize {
        self.completed.len()
    }

    /// First level in `0..total` not yet completed
    pub fn first_incomplete(&self, total: usize) -> Option<usize> {
        (0..total).find(|i| !self.completed.contains(i))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ProgressSink for CompletedLevels {
    fn level_completed(&mut self, index: usize) {
        if self.completed.insert(index) {
            log::info!("Level {index} completed ({} total)", self.completed.len());
        }
    }

    fn level_changed(&mut self, index: usize, _change: LevelChange) {
        self.current = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_completion_once() {
        let mut progress = CompletedLevels::new();
        progress.level_completed(2);
        progress.level_completed(2);
        assert_eq!(progress.count(), 1);
        assert!(progress.is_completed(2));
        assert_eq!(progress.first_incomplete(3), Some(0));
    }

    #[test]
    fn test_json_round_trip() {
        let mut progress = CompletedLevels::new();
        progress.level_completed(0);
        progress.level_changed(1, LevelChange::Next);
        let restored = CompletedLevels::from_json(&progress.to_json().unwrap()).unwrap();
        assert!(restored.is_completed(0));
        assert_eq!(restored.current, 1);
        assert_eq!(restored.first_incomplete(1), None);
    }
}
