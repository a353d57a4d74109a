//! Read-only wave status for HUD consumers.

use bevy::prelude::*;

use super::{manager::WaveLifecycleManager, state::WaveState};

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct WaveHud {
    pub state: WaveState,
    pub wave_name: Option<String>,
    pub wave_number: u32,
    pub enemies_remaining: u32,
    pub pending_spawns: usize,
    pub live_units: usize,
    pub waves_completed: u32,
}

impl WaveHud {
    pub fn sync<H>(&mut self, manager: &WaveLifecycleManager<H>) {
        self.state = manager.state();
        self.wave_name = manager.current_wave().map(str::to_string);
        self.wave_number = manager.wave_number();
        self.enemies_remaining = manager.enemies_remaining();
        self.pending_spawns = manager.pending_spawns();
        self.live_units = manager.live_units();
        self.waves_completed = manager.waves_completed();
    }

    /// Compact single-line status.
    pub fn summary(&self) -> String {
        format!(
            "Wave {:>2} | {:<5} | Enemies: {:>3} | Queued: {:>3} | Live: {:>3} | Cleared: {:>2}",
            self.wave_number,
            self.state.label(),
            self.enemies_remaining,
            self.pending_spawns,
            self.live_units,
            self.waves_completed,
        )
    }
}
