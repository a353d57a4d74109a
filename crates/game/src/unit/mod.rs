//! Components carried by pooled combat units.

pub mod behavior;

use bevy::{platform::collections::HashMap, prelude::*};

use crate::waves::config::UnitConfig;

pub use behavior::{Animation, Attack, BehaviorPlugin, Brain, Intent, Loadout, Movement, UnitMotion};

pub const DEFAULT_BASE_HEALTH: f32 = 100.0;

/// Marks an entity owned by the wave pool. The slot is its identity for the wave.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct WaveUnit {
    pub slot: usize,
}

/// Pooled but not in play.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
pub struct Dormant;

/// Inserted by combat resolution when a unit dies.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
pub struct UnitDeath;

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SpawnPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl From<&UnitConfig> for SpawnPose {
    fn from(config: &UnitConfig) -> Self {
        Self {
            position: config.position,
            rotation: config.rotation_quat(),
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
pub struct UnitStats {
    pub team: i32,
    pub health: f32,
    pub max_health: f32,
    pub damage_multiplier: f32,
    pub movement_speed: f32,
}

impl UnitStats {
    pub fn from_config(config: &UnitConfig, base_health: f32) -> Self {
        let max_health = (base_health * config.health_multiplier).max(0.0);
        Self {
            team: config.team,
            health: max_health,
            max_health,
            damage_multiplier: config.damage_multiplier,
            movement_speed: config.movement_speed,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prefab {
    pub base_health: f32,
    pub loadout: Loadout,
}

impl Default for Prefab {
    fn default() -> Self {
        Self {
            base_health: DEFAULT_BASE_HEALTH,
            loadout: Loadout::default(),
        }
    }
}

/// Base health and behaviour modules per prefab id.
#[derive(Resource, Debug, Clone)]
pub struct PrefabCatalog {
    pub prefabs: HashMap<String, Prefab>,
}

impl Default for PrefabCatalog {
    fn default() -> Self {
        let mut scout = Loadout::tank(40.0, 12.0, 8.0, 0.8);
        scout.animation = Animation::treads(0.9);
        let mut heavy = Loadout::tank(25.0, 15.0, 40.0, 3.0);
        heavy.animation = Animation::treads(0.4);

        let mut prefabs = HashMap::default();
        prefabs.insert(
            "scout_tank".to_string(),
            Prefab {
                base_health: 60.0,
                loadout: scout,
            },
        );
        prefabs.insert(
            "mini_tank".to_string(),
            Prefab {
                base_health: DEFAULT_BASE_HEALTH,
                loadout: Loadout::tank(30.0, 10.0, 15.0, 1.5),
            },
        );
        prefabs.insert(
            "heavy_tank".to_string(),
            Prefab {
                base_health: 250.0,
                loadout: heavy,
            },
        );
        Self { prefabs }
    }
}

impl PrefabCatalog {
    /// Unknown prefabs get default health and inert modules.
    pub fn get(&self, prefab_id: &str) -> Prefab {
        self.prefabs.get(prefab_id).copied().unwrap_or_default()
    }

    pub fn base_health(&self, prefab_id: &str) -> f32 {
        self.get(prefab_id).base_health
    }

    pub fn loadout(&self, prefab_id: &str) -> Loadout {
        self.get(prefab_id).loadout
    }
}
