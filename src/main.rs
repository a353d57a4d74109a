use std::{process::ExitCode, sync::Arc, time::Duration};

use bevy::{prelude::*, time::TimeUpdateStrategy};
use clap::Parser;
use game::{
    args::Opt,
    unit::{BehaviorPlugin, Dormant, UnitDeath, UnitStats},
    waves::{
        loader::load_schedule, ScheduledWaveLoader, WaveHud, WaveManager, WaveState,
        WaveSystemSet, WavesPlugin,
    },
};
use tracing::{error, info};
use utils::{frame::increase_frame_system, logs::setup_logging};

/// Live units also bleed health, so waves of a single team still end.
#[derive(Resource, Debug, Clone, Copy)]
struct Attrition {
    lifetime: f32,
}

fn attrition_system(
    mut commands: Commands,
    time: Res<Time>,
    attrition: Res<Attrition>,
    mut query: Query<(Entity, &mut UnitStats), (Without<Dormant>, Without<UnitDeath>)>,
) {
    let lifetime = attrition.lifetime.max(f32::EPSILON);
    for (entity, mut stats) in query.iter_mut() {
        stats.health -= stats.max_health * time.delta_secs() / lifetime;
        if !stats.is_alive() {
            commands.entity(entity).insert(UnitDeath);
        }
    }
}

fn main() -> ExitCode {
    let opt = Opt::parse();

    let _log_guard = match setup_logging(opt.log_suffix.clone()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to set up logging: {}", e);
            None
        }
    };

    let mut config = match load_schedule(&opt.assets, &opt.map) {
        Ok(config) => config,
        Err(e) => {
            error!("cannot read wave schedule: {}", e);
            return ExitCode::FAILURE;
        }
    };
    opt.apply_overrides(&mut config);
    if let Err(e) = config.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    info!(
        "simulating map={} waves={:?} capacity={} batch={}",
        config.map_name, config.waves, config.pool_capacity, config.batch_size
    );

    let loader = ScheduledWaveLoader::from_config(&opt.assets, &config);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            opt.frame_seconds(),
        )))
        .insert_resource(Attrition {
            lifetime: opt.unit_lifetime,
        })
        .add_plugins(WavesPlugin::new(config, Arc::new(loader)))
        .add_plugins(BehaviorPlugin)
        .add_systems(Update, attrition_system.before(WaveSystemSet::DeathTracking))
        .add_systems(Last, increase_frame_system);
    app.finish();
    app.cleanup();

    let mut last_summary = String::new();
    for _ in 0..opt.frames {
        app.update();

        let hud = app.world().resource::<WaveHud>();
        let summary = hud.summary();
        if summary != last_summary {
            info!("{}", summary);
            last_summary = summary;
        }
        if hud.state.is_terminal() {
            break;
        }
    }

    let manager = app.world().resource::<WaveManager>();
    match manager.state() {
        WaveState::Failed => {
            if let Some(e) = manager.error() {
                error!("wave run failed: {}", e);
            }
            ExitCode::FAILURE
        }
        WaveState::Finished => {
            info!("all {} waves cleared", manager.waves_completed());
            ExitCode::SUCCESS
        }
        other => {
            info!(
                "stopped after {} frames in {:?} with {} waves cleared",
                opt.frames,
                other,
                manager.waves_completed()
            );
            ExitCode::SUCCESS
        }
    }
}
