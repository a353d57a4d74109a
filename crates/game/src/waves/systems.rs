//! Bevy systems driving the wave lifecycle once per frame.

use bevy::prelude::*;
use tracing::{error, info, warn};
use utils::frame::FrameCount;

use crate::unit::{
    Animation, Attack, Brain, Dormant, Intent, Movement, PrefabCatalog, SpawnPose, UnitDeath,
    UnitMotion, UnitStats, WaveUnit,
};

use super::{
    config::UnitConfig,
    hud::WaveHud,
    manager::UnitFactory,
    state::WaveState,
    WaveControl, WaveLoader, WaveManager,
};

/// Unit factory spawning pooled units as entities through `Commands`.
pub struct CommandsUnitFactory<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub catalog: &'a PrefabCatalog,
}

impl UnitFactory for CommandsUnitFactory<'_, '_, '_> {
    type Handle = Entity;

    fn create(&mut self, slot: usize) -> Entity {
        self.commands.spawn((WaveUnit { slot }, Dormant)).id()
    }

    fn activate(&mut self, entity: &Entity, _slot: usize, config: &UnitConfig) {
        let prefab = self.catalog.get(&config.prefab_id);
        let stats = UnitStats::from_config(config, prefab.base_health);
        self.commands
            .entity(*entity)
            .remove::<(Dormant, UnitDeath)>()
            .insert((
                stats,
                SpawnPose::from(config),
                UnitMotion::at(config.position),
                Name::new(config.prefab_id.clone()),
                prefab.loadout.bundle(),
            ));
    }

    fn deactivate(&mut self, entity: &Entity, _slot: usize) {
        self.commands
            .entity(*entity)
            .remove::<(UnitStats, UnitMotion, Brain, Intent, Movement, Attack, Animation)>()
            .insert(Dormant);
    }

    fn destroy(&mut self, entity: Entity, _slot: usize) {
        self.commands.entity(entity).despawn();
    }
}

/// Forwards deaths of wave units to the manager.
pub fn wave_death_tracking_system(
    frame: Res<FrameCount>,
    mut manager: ResMut<WaveManager>,
    query: Query<&WaveUnit, Added<UnitDeath>>,
) {
    for unit in query.iter() {
        info!("wave{{f={} death slot={}}}", frame.frame, unit.slot);
        manager.notify_unit_death(unit.slot);
    }
}

/// Applies external pause/resume requests and runs one lifecycle tick.
pub fn wave_lifecycle_system(
    mut commands: Commands,
    time: Res<Time>,
    frame: Res<FrameCount>,
    loader: Res<WaveLoader>,
    catalog: Res<PrefabCatalog>,
    mut control: ResMut<WaveControl>,
    mut manager: ResMut<WaveManager>,
) {
    if std::mem::take(&mut control.pause_requested) {
        if let Err(e) = manager.pause() {
            warn!("wave{{f={} pause refused: {}}}", frame.frame, e);
        }
    }
    if std::mem::take(&mut control.resume_requested) {
        if let Err(e) = manager.resume() {
            warn!("wave{{f={} resume refused: {}}}", frame.frame, e);
        }
    }

    let before = manager.state();
    let mut factory = CommandsUnitFactory {
        commands: &mut commands,
        catalog: &catalog,
    };
    let after = manager.tick(time.delta_secs(), loader.0.as_ref(), &mut factory);

    if before != after {
        info!(
            "wave{{f={} state={} wave={} remaining={}}}",
            frame.frame,
            after.label(),
            manager.wave_number(),
            manager.enemies_remaining()
        );
        if after == WaveState::Failed {
            if let Some(e) = manager.error() {
                error!("wave{{f={} halted: {}}}", frame.frame, e);
            }
        }
    }
}

/// Mirrors the manager into the read-only HUD resource.
pub fn wave_hud_system(manager: Res<WaveManager>, mut hud: ResMut<WaveHud>) {
    hud.sync(&manager.0);
}
