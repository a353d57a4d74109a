//! Errors raised by the wave lifecycle.

use std::path::PathBuf;

use thiserror::Error;

use super::state::WaveState;

#[derive(Debug, Error)]
pub enum WaveError {
    #[error("no wave file for `{wave}` on map `{map}`")]
    WaveNotFound { map: String, wave: String },

    #[error("wave `{wave}` on map `{map}` could not be parsed: {reason}")]
    CorruptWave {
        map: String,
        wave: String,
        reason: String,
    },

    #[error("wave `{wave}` needs {requested} units but the pool only holds {capacity}")]
    CapacityExceeded {
        wave: String,
        requested: usize,
        capacity: usize,
    },

    #[error("invalid wave manager configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot switch wave state from {from:?} to {to:?}")]
    InvalidTransition { from: WaveState, to: WaveState },

    #[error("a batch operation is still running in {0:?}")]
    BatchInFlight(WaveState),

    #[error("unit hooks are only valid while a wave runs (state is {0:?})")]
    WaveNotRunning(WaveState),

    #[error("slot {slot} is outside the pool (capacity {capacity})")]
    SlotOutOfRange { slot: usize, capacity: usize },

    #[error("slot {0} holds no allocated unit")]
    SlotNotAllocated(usize),

    #[error("slot {0} already holds an allocated unit")]
    SlotOccupied(usize),

    #[error("slot {0} is already bound to a live unit")]
    SlotAlreadyLive(usize),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
