//! Wave lifecycle for pooled combat units.
//!
//! # Overview
//!
//! One wave at a time is driven through a small state machine:
//! - slots of a fixed-capacity pool are allocated in batches,
//! - the wave definition is turned into a FIFO spawn queue,
//! - queued units are activated when their spawn delay has elapsed,
//! - the wave ends once every unit is dead and nothing is left to spawn,
//! - the pool is cleared in batches before the next wave.
//!
//! # Wave Flow
//!
//! ```text
//! Allocating → BuildingQueue → WaveRunning ⇄ Paused
//!     ↑                            │
//!     └──────── Deallocating ◄─────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let loader = ScheduledWaveLoader::from_config("assets/waves", &config);
//! app.add_plugins(WavesPlugin::new(config, Arc::new(loader)));
//! ```
//!
//! # Configuration
//!
//! `assets/waves/<map>/schedule.ron` holds a [`WaveManagerConfig`], every wave
//! is a `<wave>.ron` list of [`UnitConfig`] records.

pub mod config;
pub mod error;
pub mod hud;
pub mod loader;
pub mod manager;
pub mod pool;
pub mod queue;
pub mod state;
pub mod systems;

use std::sync::Arc;

use bevy::prelude::*;
use tracing::error;
use utils::frame::FrameCount;

use crate::unit::{PrefabCatalog, SpawnPose, UnitStats, WaveUnit};

pub use config::{SpawnTiming, UnitConfig, WaveManagerConfig};
pub use error::WaveError;
pub use hud::WaveHud;
pub use loader::{InMemoryWaveLoader, ScheduledWaveLoader, WaveConfigLoader};
pub use manager::{UnitFactory, WaveLifecycleManager};
pub use state::WaveState;

/// The lifecycle manager over entity handles.
#[derive(Resource, Debug, Deref, DerefMut)]
pub struct WaveManager(pub WaveLifecycleManager<Entity>);

/// Source of wave order and wave definitions.
#[derive(Resource, Clone)]
pub struct WaveLoader(pub Arc<dyn WaveConfigLoader>);

/// External pause/resume requests, consumed on the next lifecycle tick.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct WaveControl {
    pub pause_requested: bool,
    pub resume_requested: bool,
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum WaveSystemSet {
    DeathTracking,
    Lifecycle,
    Hud,
}

pub struct WavesPlugin {
    config: WaveManagerConfig,
    loader: Arc<dyn WaveConfigLoader>,
}

impl WavesPlugin {
    pub fn new(config: WaveManagerConfig, loader: Arc<dyn WaveConfigLoader>) -> Self {
        Self { config, loader }
    }
}

impl Plugin for WavesPlugin {
    fn build(&self, app: &mut App) {
        let manager = match WaveLifecycleManager::new(self.config.clone()) {
            Ok(manager) => manager,
            Err(e) => {
                error!("wave system disabled: {}", e);
                return;
            }
        };

        app.init_resource::<FrameCount>();
        app.init_resource::<PrefabCatalog>();
        app.init_resource::<WaveHud>();
        app.init_resource::<WaveControl>();
        app.insert_resource(WaveManager(manager));
        app.insert_resource(WaveLoader(self.loader.clone()));

        app.register_type::<WaveState>();
        app.register_type::<WaveUnit>();
        app.register_type::<UnitStats>();
        app.register_type::<SpawnPose>();

        // Deaths recorded this frame are consumed by this frame's tick.
        app.configure_sets(
            Update,
            (
                WaveSystemSet::DeathTracking,
                WaveSystemSet::Lifecycle,
                WaveSystemSet::Hud,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                systems::wave_death_tracking_system.in_set(WaveSystemSet::DeathTracking),
                systems::wave_lifecycle_system.in_set(WaveSystemSet::Lifecycle),
                systems::wave_hud_system.in_set(WaveSystemSet::Hud),
            ),
        );
    }
}
