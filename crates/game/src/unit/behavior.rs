//! Per-unit behaviour modules.
//!
//! Every active unit carries one module per capability, picked from its prefab
//! when it spawns. Fixed ticks run brain, then movement, then attack, so the
//! [`Intent`] written by the brain is consumed in the same tick. Animation only
//! reads the outcome, once per frame in `PostUpdate`.

use bevy::prelude::*;
use tracing::debug;

use super::{Dormant, UnitDeath, UnitStats};

/// Units taking part in the fight: spawned and not dead.
pub type ActiveUnit = (Without<Dormant>, Without<UnitDeath>);

/// Decides what the unit wants to do this tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum Brain {
    #[default]
    Idle,
    /// Heads for the closest hostile unit within `aggro_range` and holds
    /// position once it is within `engage_range`
    Chase { aggro_range: f32, engage_range: f32 },
}

/// Output of the brain, input of every other module.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct Intent {
    pub desired_move: Vec3,
    pub desired_look: Vec3,
    pub wants_to_attack: bool,
    pub target: Option<Entity>,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Movement {
    #[default]
    Static,
    /// Drives on the ground plane at the unit's movement speed
    Tracked,
}

/// Logical position of an active unit and the planar step it last took.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct UnitMotion {
    pub position: Vec3,
    pub planar_move: Vec3,
}

impl UnitMotion {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            planar_move: Vec3::ZERO,
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum Attack {
    #[default]
    None,
    /// One shell every `reload` seconds, `cooldown` is the time left
    Cannon {
        damage: f32,
        reload: f32,
        cooldown: f32,
    },
}

impl Attack {
    pub fn cannon(damage: f32, reload: f32) -> Self {
        Self::Cannon {
            damage,
            reload,
            cooldown: 0.0,
        }
    }
}

/// Purely visual state, never read by the fixed tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum Animation {
    #[default]
    None,
    /// Tread texture scroll in `[0, 1)`, advanced by forward speed
    Treads { scroll_speed: f32, progress: f32 },
}

impl Animation {
    pub fn treads(scroll_speed: f32) -> Self {
        Self::Treads {
            scroll_speed,
            progress: 0.0,
        }
    }
}

/// Module selection of one prefab.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Loadout {
    pub brain: Brain,
    pub movement: Movement,
    pub attack: Attack,
    pub animation: Animation,
}

impl Loadout {
    /// Chasing tracked tank with a cannon.
    pub fn tank(aggro_range: f32, engage_range: f32, damage: f32, reload: f32) -> Self {
        Self {
            brain: Brain::Chase {
                aggro_range,
                engage_range,
            },
            movement: Movement::Tracked,
            attack: Attack::cannon(damage, reload),
            animation: Animation::treads(0.6),
        }
    }

    pub fn bundle(self) -> (Brain, Intent, Movement, Attack, Animation) {
        (
            self.brain,
            Intent::default(),
            self.movement,
            self.attack,
            self.animation,
        )
    }
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum BehaviorSet {
    Brain,
    Movement,
    Attack,
    Animation,
}

pub struct BehaviorPlugin;

impl Plugin for BehaviorPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Brain>();
        app.register_type::<Intent>();
        app.register_type::<Movement>();
        app.register_type::<UnitMotion>();
        app.register_type::<Attack>();
        app.register_type::<Animation>();

        app.configure_sets(
            FixedUpdate,
            (BehaviorSet::Brain, BehaviorSet::Movement, BehaviorSet::Attack).chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                brain_system.in_set(BehaviorSet::Brain),
                movement_system.in_set(BehaviorSet::Movement),
                attack_system.in_set(BehaviorSet::Attack),
            ),
        );
        app.add_systems(PostUpdate, animation_system.in_set(BehaviorSet::Animation));
    }
}

pub fn brain_system(
    mut units: Query<(Entity, &Brain, &UnitMotion, &UnitStats, &mut Intent), ActiveUnit>,
) {
    let contacts: Vec<(Entity, Vec3, i32)> = units
        .iter()
        .filter(|(.., stats, _)| stats.is_alive())
        .map(|(entity, _, motion, stats, _)| (entity, motion.position, stats.team))
        .collect();

    for (entity, brain, motion, stats, mut intent) in units.iter_mut() {
        *intent = match *brain {
            Brain::Idle => Intent::default(),
            Brain::Chase {
                aggro_range,
                engage_range,
            } => chase(
                entity,
                motion.position,
                stats.team,
                aggro_range,
                engage_range,
                &contacts,
            ),
        };
    }
}

fn chase(
    entity: Entity,
    position: Vec3,
    team: i32,
    aggro_range: f32,
    engage_range: f32,
    contacts: &[(Entity, Vec3, i32)],
) -> Intent {
    let closest = contacts
        .iter()
        .filter(|(other, _, other_team)| *other != entity && *other_team != team)
        .map(|(other, other_position, _)| (*other, *other_position, position.distance(*other_position)))
        .filter(|(.., distance)| *distance <= aggro_range)
        .min_by(|a, b| a.2.total_cmp(&b.2));

    let Some((target, target_position, distance)) = closest else {
        return Intent::default();
    };

    let offset = target_position - position;
    let heading = Vec3::new(offset.x, 0.0, offset.z).normalize_or_zero();
    let in_range = distance <= engage_range;

    Intent {
        desired_move: if in_range { Vec3::ZERO } else { heading },
        desired_look: heading,
        wants_to_attack: in_range,
        target: Some(target),
    }
}

pub fn movement_system(
    time: Res<Time>,
    mut units: Query<(&Movement, &Intent, &UnitStats, &mut UnitMotion), ActiveUnit>,
) {
    let dt = time.delta_secs();
    for (movement, intent, stats, mut motion) in units.iter_mut() {
        motion.planar_move = match movement {
            Movement::Static => Vec3::ZERO,
            Movement::Tracked => Vec3::new(intent.desired_move.x, 0.0, intent.desired_move.z),
        };
        let step = motion.planar_move * stats.movement_speed * dt;
        motion.position += step;
    }
}

pub fn attack_system(
    mut commands: Commands,
    time: Res<Time>,
    mut units: ParamSet<(
        Query<(Entity, &mut Attack, &Intent, &UnitStats), ActiveUnit>,
        Query<&mut UnitStats, ActiveUnit>,
    )>,
) {
    let dt = time.delta_secs();

    let mut hits = Vec::new();
    for (entity, mut attack, intent, stats) in units.p0().iter_mut() {
        let Attack::Cannon {
            damage,
            reload,
            cooldown,
        } = &mut *attack
        else {
            continue;
        };

        *cooldown = (*cooldown - dt).max(0.0);
        if !intent.wants_to_attack || *cooldown > 0.0 {
            continue;
        }
        let Some(target) = intent.target else {
            continue;
        };

        *cooldown = *reload;
        hits.push((entity, target, *damage * stats.damage_multiplier));
    }

    let mut victims = units.p1();
    for (attacker, target, damage) in hits {
        let Ok(mut stats) = victims.get_mut(target) else {
            continue;
        };
        if !stats.is_alive() {
            continue;
        }

        stats.health -= damage;
        debug!(
            "unit{{hit {:?}->{:?} dmg={:.1} hp={:.1}}}",
            attacker, target, damage, stats.health
        );
        if !stats.is_alive() {
            commands.entity(target).insert(UnitDeath);
        }
    }
}

pub fn animation_system(time: Res<Time>, mut units: Query<(&mut Animation, &UnitMotion), ActiveUnit>) {
    let dt = time.delta_secs();
    for (mut animation, motion) in units.iter_mut() {
        if let Animation::Treads {
            scroll_speed,
            progress,
        } = &mut *animation
        {
            let forward = motion.planar_move.length() * *scroll_speed * dt;
            *progress = (*progress + forward).rem_euclid(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn behavior_app(dt: f32) -> App {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.add_plugins(BehaviorPlugin);
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(dt));
        app
    }

    fn spawn_unit(app: &mut App, team: i32, position: Vec3, loadout: Loadout, health: f32) -> Entity {
        let stats = UnitStats {
            team,
            health,
            max_health: health,
            damage_multiplier: 1.0,
            movement_speed: 2.0,
        };
        app.world_mut()
            .spawn((stats, UnitMotion::at(position), loadout.bundle()))
            .id()
    }

    fn chaser() -> Loadout {
        Loadout {
            brain: Brain::Chase {
                aggro_range: 50.0,
                engage_range: 5.0,
            },
            movement: Movement::Tracked,
            attack: Attack::cannon(10.0, 1.0),
            animation: Animation::None,
        }
    }

    fn fixed_tick(app: &mut App) {
        app.world_mut().run_schedule(FixedUpdate);
    }

    fn health(app: &App, entity: Entity) -> f32 {
        app.world().get::<UnitStats>(entity).map_or(0.0, |s| s.health)
    }

    fn position(app: &App, entity: Entity) -> Vec3 {
        app.world().get::<UnitMotion>(entity).map_or(Vec3::NAN, |m| m.position)
    }

    #[test]
    fn test_fixed_tick_runs_brain_then_movement_then_attack() {
        let mut app = behavior_app(0.5);
        let target = spawn_unit(&mut app, 2, Vec3::new(4.0, 0.0, 0.0), Loadout::default(), 25.0);
        let gunner = spawn_unit(&mut app, 1, Vec3::ZERO, chaser(), 100.0);
        let runner = spawn_unit(&mut app, 1, Vec3::new(-20.0, 0.0, 0.0), chaser(), 100.0);

        fixed_tick(&mut app);

        // Intent from this tick already drove movement and the shot.
        assert_eq!(position(&app, runner), Vec3::new(-19.0, 0.0, 0.0));
        assert_eq!(position(&app, gunner), Vec3::ZERO);
        assert_eq!(health(&app, target), 15.0);

        let intent = app.world().get::<Intent>(gunner).copied().unwrap_or_default();
        assert!(intent.wants_to_attack);
        assert_eq!(intent.target, Some(target));
        assert_eq!(app.world().get::<Intent>(target), Some(&Intent::default()));
    }

    #[test]
    fn test_cannon_reloads_and_kills() {
        let mut app = behavior_app(0.5);
        let target = spawn_unit(&mut app, 2, Vec3::new(3.0, 0.0, 0.0), Loadout::default(), 25.0);
        let gunner = spawn_unit(&mut app, 1, Vec3::ZERO, chaser(), 100.0);

        fixed_tick(&mut app);
        fixed_tick(&mut app);
        assert_eq!(health(&app, target), 15.0);

        fixed_tick(&mut app);
        assert_eq!(health(&app, target), 5.0);
        assert!(app.world().get::<UnitDeath>(target).is_none());

        fixed_tick(&mut app);
        fixed_tick(&mut app);
        assert!(app.world().get::<UnitDeath>(target).is_some());

        // Dead units are no longer targets.
        fixed_tick(&mut app);
        let intent = app.world().get::<Intent>(gunner).copied().unwrap_or_default();
        assert_eq!(intent.target, None);
    }

    #[test]
    fn test_same_team_and_dormant_units_are_ignored() {
        let mut app = behavior_app(0.5);
        let ally = spawn_unit(&mut app, 1, Vec3::new(3.0, 0.0, 0.0), Loadout::default(), 25.0);
        let gunner = spawn_unit(&mut app, 1, Vec3::ZERO, chaser(), 100.0);
        let pooled = spawn_unit(&mut app, 2, Vec3::new(-10.0, 0.0, 0.0), chaser(), 100.0);
        app.world_mut().entity_mut(pooled).insert(Dormant);

        fixed_tick(&mut app);

        assert_eq!(health(&app, ally), 25.0);
        assert_eq!(position(&app, pooled), Vec3::new(-10.0, 0.0, 0.0));
        assert_eq!(app.world().get::<Intent>(gunner), Some(&Intent::default()));
    }

    #[test]
    fn test_treads_scroll_in_post_update() {
        let mut app = behavior_app(0.5);
        let loadout = Loadout {
            animation: Animation::Treads {
                scroll_speed: 0.5,
                progress: 0.9,
            },
            ..Loadout::default()
        };
        let tank = spawn_unit(&mut app, 1, Vec3::ZERO, loadout, 100.0);
        app.world_mut()
            .entity_mut(tank)
            .insert(UnitMotion {
                position: Vec3::ZERO,
                planar_move: Vec3::X,
            });

        app.world_mut().run_schedule(PostUpdate);

        let Some(Animation::Treads { progress, .. }) = app.world().get::<Animation>(tank).copied() else {
            panic!("treads animation missing");
        };
        assert!((progress - 0.15).abs() < 1e-5, "progress {progress}");
    }
}
