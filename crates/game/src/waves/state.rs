//! Wave lifecycle states.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Current phase of the wave lifecycle.
///
/// ```text
/// Allocating → BuildingQueue → WaveRunning → Deallocating ─┐
///     ↑                          │    ↑                    │
///     │                          ↓    │                    │
///     │                         Paused                     │
///     └────────────────────────────────────────────────────┘
/// Allocating → Finished   (no next wave)
/// any phase  → Failed     (configuration or wave file error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum WaveState {
    /// Resolving the next wave and filling pool slots batch by batch
    #[default]
    Allocating,
    /// Pushing the loaded wave definition into the spawn queue
    BuildingQueue,
    /// Draining the spawn queue and waiting for kills
    WaveRunning,
    /// Clearing pool slots batch by batch
    Deallocating,
    /// Running wave frozen by an external request
    Paused,
    /// No further wave to run
    Finished,
    /// Halted on a configuration or load error
    Failed,
}

impl WaveState {
    /// Terminal states never progress on their own.
    pub fn is_terminal(self) -> bool {
        matches!(self, WaveState::Finished | WaveState::Failed)
    }

    /// Short label for HUD and log output.
    pub fn label(self) -> &'static str {
        match self {
            WaveState::Allocating => "ALLOC",
            WaveState::BuildingQueue => "QUEUE",
            WaveState::WaveRunning => "FIGHT",
            WaveState::Deallocating => "CLEAR",
            WaveState::Paused => "PAUSE",
            WaveState::Finished => "DONE",
            WaveState::Failed => "FAIL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(WaveState::Finished.is_terminal());
        assert!(WaveState::Failed.is_terminal());
        assert!(!WaveState::Paused.is_terminal());
        assert!(!WaveState::Allocating.is_terminal());
    }
}
