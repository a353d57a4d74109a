//! Wave configuration loaded from RON files.
//!
//! A map directory holds one `schedule.ron` (a [`WaveManagerConfig`]) and one
//! file per wave containing an ordered list of [`UnitConfig`] records.

use bevy::math::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::error::WaveError;

pub const DEFAULT_POOL_CAPACITY: usize = 64;
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// One unit spawn record of a wave definition.
///
/// Immutable once it has been pushed into the spawn queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Prefab identifier resolved by the unit factory
    pub prefab_id: String,
    /// Spawn delay in seconds, see [`SpawnTiming`]
    #[serde(default)]
    pub spawn_delay: f32,
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles in degrees (XYZ order)
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default)]
    pub team: i32,
    #[serde(default = "default_multiplier")]
    pub damage_multiplier: f32,
    #[serde(default = "default_multiplier")]
    pub health_multiplier: f32,
    #[serde(default)]
    pub movement_speed: f32,
}

fn default_multiplier() -> f32 {
    1.0
}

impl UnitConfig {
    pub fn new(prefab_id: impl Into<String>) -> Self {
        Self {
            prefab_id: prefab_id.into(),
            spawn_delay: 0.0,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            team: 0,
            damage_multiplier: 1.0,
            health_multiplier: 1.0,
            movement_speed: 0.0,
        }
    }

    pub fn with_delay(mut self, spawn_delay: f32) -> Self {
        self.spawn_delay = spawn_delay;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_team(mut self, team: i32) -> Self {
        self.team = team;
        self
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }
}

/// How `spawn_delay` values of a wave are turned into due times.
///
/// `[0, 2, 2]` activates at `0, 2, 4` under `Relative` and at `0, 2, 2`
/// under `FromWaveStart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnTiming {
    /// Each delay is an offset from the previous entry; due times are the running sum.
    #[default]
    Relative,
    /// Each delay is an offset from wave start. An entry is never due before the one ahead of it.
    FromWaveStart,
}

/// Settings of one wave manager, usually read from `schedule.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveManagerConfig {
    #[serde(default)]
    pub map_name: String,
    /// Wave ids in play order
    #[serde(default)]
    pub waves: Vec<String>,
    /// Pool slots, must cover the largest wave
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,
    /// Slots allocated or cleared per tick
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub spawn_timing: SpawnTiming,
}

fn default_pool_capacity() -> usize {
    DEFAULT_POOL_CAPACITY
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for WaveManagerConfig {
    fn default() -> Self {
        Self {
            map_name: String::new(),
            waves: Vec::new(),
            pool_capacity: DEFAULT_POOL_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            spawn_timing: SpawnTiming::Relative,
        }
    }
}

impl WaveManagerConfig {
    pub fn new(map_name: impl Into<String>) -> Self {
        Self {
            map_name: map_name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), WaveError> {
        if self.pool_capacity == 0 {
            return Err(WaveError::InvalidConfig(
                "pool_capacity must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(WaveError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Ticks needed to allocate or clear `units` slots.
    pub fn batches_for(&self, units: usize) -> usize {
        units.div_ceil(self.batch_size.max(1))
    }
}
