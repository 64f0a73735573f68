//! Actor tuning and arena scenario configuration.
//!
//! This module provides:
//! - Per-actor tunables (health, enemy AI, player actions) with game defaults
//! - Pure validation returning non-fatal configuration defects
//! - TOML loading of a complete arena scenario

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_common::{ConfigError, Layer, LayerMask, SkirmishResult, Vec3};
use thiserror::Error;
use tracing::info;

use crate::ai::BehaviorType;

/// TOML form of an optional reference point.
///
/// `[x, y, z]` is a point, `[]` is an explicitly absent one. A missing key
/// falls back to the struct default.
mod reference_point {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use skirmish_common::Vec3;

    pub fn serialize<S: Serializer>(point: &Option<Vec3>, serializer: S) -> Result<S::Ok, S::Error> {
        match point {
            Some(point) => point.to_array().as_slice().serialize(serializer),
            None => <&[f32]>::default().serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec3>, D::Error> {
        match Vec::<f32>::deserialize(deserializer)?.as_slice() {
            [] => Ok(None),
            [x, y, z] => Ok(Some(Vec3::new(*x, *y, *z))),
            other => Err(D::Error::invalid_length(other.len(), &"[] or [x, y, z]")),
        }
    }
}

/// Valid attack range interval for melee swings.
pub const ATTACK_RANGE_LIMITS: (f32, f32) = (0.1, 3.0);

/// A non-fatal configuration problem detected at actor construction.
///
/// Defects never abort the simulation; the affected actor degrades to a safe
/// default (usually `Idle`, or a skipped attack) and the defect is reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigDefect {
    /// Melee actor without an attack point
    #[error("melee actor has no attack point")]
    MissingAttackPoint,
    /// Ranged actor without a fire point
    #[error("ranged actor has no fire point")]
    MissingFirePoint,
    /// Patrol actor with an empty route
    #[error("patrol actor has no waypoints, starting idle")]
    EmptyPatrolRoute,
    /// Target filter matches nothing
    #[error("target filter is empty")]
    EmptyTargetLayers,
    /// `ranged_stopping_distance` must be below `ranged_attack_distance`
    #[error("ranged stopping distance {stopping} should be less than ranged attack distance {attack}")]
    StoppingBeyondAttackDistance {
        /// Configured stopping distance
        stopping: f32,
        /// Configured attack distance
        attack: f32,
    },
    /// `retreat_distance` must be below `ranged_stopping_distance`
    #[error("retreat distance {retreat} should be less than ranged stopping distance {stopping}")]
    RetreatBeyondStoppingDistance {
        /// Configured retreat distance
        retreat: f32,
        /// Configured stopping distance
        stopping: f32,
    },
    /// A value that must be strictly positive is not
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Field name
        field: &'static str,
        /// Offending value
        value: f32,
    },
    /// A value that must be non-negative is negative
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Field name
        field: &'static str,
        /// Offending value
        value: f32,
    },
    /// Attack range outside the supported interval
    #[error("attack range {value} outside {min}..={max}")]
    AttackRangeOutOfBounds {
        /// Offending value
        value: f32,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
}

fn check_positive(defects: &mut Vec<ConfigDefect>, field: &'static str, value: f32) {
    if value.is_nan() || value <= 0.0 {
        defects.push(ConfigDefect::NonPositive { field, value });
    }
}

fn check_non_negative(defects: &mut Vec<ConfigDefect>, field: &'static str, value: f32) {
    if value.is_nan() || value < 0.0 {
        defects.push(ConfigDefect::Negative { field, value });
    }
}

fn check_attack_range(defects: &mut Vec<ConfigDefect>, value: f32) {
    let (min, max) = ATTACK_RANGE_LIMITS;
    if !(min..=max).contains(&value) {
        defects.push(ConfigDefect::AttackRangeOutOfBounds { value, min, max });
    }
}

// ============================================================================
// Health
// ============================================================================

/// Health and death-sequence tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthTuning {
    /// Maximum (and starting) health
    pub max_health: f32,
    /// Length of the death blink window before deactivation (seconds)
    pub disappear_delay: f32,
    /// Time between blink toggles (seconds, <= 0 disables blinking)
    pub blink_interval: f32,
}

impl Default for HealthTuning {
    fn default() -> Self {
        Self {
            max_health: 10.0,
            disappear_delay: 2.0,
            blink_interval: 0.1,
        }
    }
}

impl HealthTuning {
    /// Validate the tunables.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigDefect> {
        let mut defects = Vec::new();
        check_positive(&mut defects, "max_health", self.max_health);
        check_non_negative(&mut defects, "disappear_delay", self.disappear_delay);
        defects
    }
}

// ============================================================================
// Enemy AI
// ============================================================================

/// Projectile tunables for ranged enemies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Damage dealt on hit
    pub damage: f32,
    /// Seconds before an unspent projectile is removed
    pub lifetime: f32,
    /// Contact radius
    pub radius: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            damage: 1.0,
            lifetime: 5.0,
            radius: 0.2,
        }
    }
}

/// Enemy AI tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Overall AI style
    pub behavior: BehaviorType,

    // === Movement ===
    /// Speed while patrolling
    pub patrol_speed: f32,
    /// Speed while chasing, approaching, or retreating
    pub chase_speed: f32,
    /// Melee engagement distance
    pub stopping_distance: f32,
    /// Pause at each waypoint (seconds)
    pub patrol_wait_time: f32,
    /// Planar distance at which a waypoint counts as reached
    pub patrol_point_threshold: f32,

    // === Melee ===
    /// Damage per melee hit
    pub attack_damage: f32,
    /// Seconds between melee hits
    pub attack_rate: f32,
    /// Melee hit sphere radius
    pub attack_range: f32,
    /// Offset of the melee hit sphere from the actor position
    #[serde(with = "reference_point")]
    pub attack_point_offset: Option<Vec3>,

    // === Ranged ===
    /// Distance at which a ranged actor starts shooting
    pub ranged_attack_distance: f32,
    /// Distance at which a ranged actor stops approaching
    pub ranged_stopping_distance: f32,
    /// Distance below which a ranged actor backs away
    pub retreat_distance: f32,
    /// Projectile launch speed
    pub projectile_speed: f32,
    /// Seconds between shots
    pub ranged_attack_rate: f32,
    /// Offset of the projectile spawn point from the actor position
    #[serde(with = "reference_point")]
    pub fire_point_offset: Option<Vec3>,
    /// Projectile properties
    pub projectile: ProjectileTuning,

    // === Detection ===
    /// Radius of the detection region
    pub detection_radius: f32,
    /// Layers that count as chase targets
    pub target_layers: LayerMask,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            behavior: BehaviorType::Patrol,

            patrol_speed: 1.5,
            chase_speed: 3.0,
            stopping_distance: 0.8,
            patrol_wait_time: 2.0,
            patrol_point_threshold: 0.6,

            attack_damage: 2.0,
            attack_rate: 3.0,
            attack_range: 1.0,
            attack_point_offset: Some(Vec3::new(0.0, 0.0, 0.5)),

            ranged_attack_distance: 10.0,
            ranged_stopping_distance: 8.0,
            retreat_distance: 5.0,
            projectile_speed: 15.0,
            ranged_attack_rate: 2.0,
            fire_point_offset: Some(Vec3::new(0.0, 0.5, 0.0)),
            projectile: ProjectileTuning::default(),

            detection_radius: 6.0,
            target_layers: Layer::PLAYER.mask(),
        }
    }
}

impl EnemyTuning {
    /// Default tuning for a behavior type.
    #[must_use]
    pub fn for_behavior(behavior: BehaviorType) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    /// Validate the tunables against a patrol route of `route_len` waypoints.
    #[must_use]
    pub fn validate(&self, route_len: usize) -> Vec<ConfigDefect> {
        let mut defects = Vec::new();

        if self.target_layers.is_empty() {
            defects.push(ConfigDefect::EmptyTargetLayers);
        }
        check_non_negative(&mut defects, "chase_speed", self.chase_speed);
        check_non_negative(&mut defects, "detection_radius", self.detection_radius);

        match self.behavior {
            BehaviorType::Stationary | BehaviorType::Patrol => {
                if self.attack_point_offset.is_none() {
                    defects.push(ConfigDefect::MissingAttackPoint);
                }
                check_attack_range(&mut defects, self.attack_range);
                check_non_negative(&mut defects, "attack_damage", self.attack_damage);
                check_non_negative(&mut defects, "attack_rate", self.attack_rate);
                check_positive(&mut defects, "stopping_distance", self.stopping_distance);

                if self.behavior == BehaviorType::Patrol {
                    if route_len == 0 {
                        defects.push(ConfigDefect::EmptyPatrolRoute);
                    }
                    check_non_negative(&mut defects, "patrol_speed", self.patrol_speed);
                    check_non_negative(&mut defects, "patrol_wait_time", self.patrol_wait_time);
                    check_positive(
                        &mut defects,
                        "patrol_point_threshold",
                        self.patrol_point_threshold,
                    );
                }
            },
            BehaviorType::Ranged => {
                if self.fire_point_offset.is_none() {
                    defects.push(ConfigDefect::MissingFirePoint);
                }
                if self.ranged_stopping_distance >= self.ranged_attack_distance {
                    defects.push(ConfigDefect::StoppingBeyondAttackDistance {
                        stopping: self.ranged_stopping_distance,
                        attack: self.ranged_attack_distance,
                    });
                }
                if self.retreat_distance >= self.ranged_stopping_distance {
                    defects.push(ConfigDefect::RetreatBeyondStoppingDistance {
                        retreat: self.retreat_distance,
                        stopping: self.ranged_stopping_distance,
                    });
                }
                check_positive(&mut defects, "projectile_speed", self.projectile_speed);
                check_non_negative(&mut defects, "ranged_attack_rate", self.ranged_attack_rate);
                check_non_negative(&mut defects, "projectile.damage", self.projectile.damage);
                check_positive(&mut defects, "projectile.lifetime", self.projectile.lifetime);
            },
        }

        defects
    }
}

// ============================================================================
// Player
// ============================================================================

/// Player action tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Walking speed
    pub move_speed: f32,
    /// Dash impulse speed
    pub sprint_force: f32,
    /// Dash length (seconds)
    pub sprint_duration: f32,
    /// Extra wait after a dash before the next one (seconds)
    pub sprint_cooldown: f32,
    /// Melee hit sphere radius
    pub attack_range: f32,
    /// Damage per melee hit
    pub attack_damage: f32,
    /// Delay between the attack cue and the hit check (seconds)
    pub attack_windup: f32,
    /// Movement stays blocked this long after the hit check (seconds)
    pub attack_animation_duration: f32,
    /// Offset of the melee hit sphere; X is mirrored with the facing sign
    #[serde(with = "reference_point")]
    pub attack_point_offset: Option<Vec3>,
    /// Layers the player's attack can hit
    pub enemy_layers: LayerMask,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            sprint_force: 15.0,
            sprint_duration: 0.3,
            sprint_cooldown: 1.0,
            attack_range: 1.0,
            attack_damage: 2.5,
            attack_windup: 0.1,
            attack_animation_duration: 0.5,
            attack_point_offset: Some(Vec3::new(0.6, 0.0, 0.0)),
            enemy_layers: Layer::ENEMY.mask(),
        }
    }
}

impl PlayerTuning {
    /// Validate the tunables.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigDefect> {
        let mut defects = Vec::new();

        if self.attack_point_offset.is_none() {
            defects.push(ConfigDefect::MissingAttackPoint);
        }
        if self.enemy_layers.is_empty() {
            defects.push(ConfigDefect::EmptyTargetLayers);
        }
        check_attack_range(&mut defects, self.attack_range);
        check_non_negative(&mut defects, "move_speed", self.move_speed);
        check_non_negative(&mut defects, "sprint_force", self.sprint_force);
        check_non_negative(&mut defects, "sprint_duration", self.sprint_duration);
        check_non_negative(&mut defects, "sprint_cooldown", self.sprint_cooldown);
        check_non_negative(&mut defects, "attack_damage", self.attack_damage);
        check_non_negative(&mut defects, "attack_windup", self.attack_windup);
        check_non_negative(
            &mut defects,
            "attack_animation_duration",
            self.attack_animation_duration,
        );

        defects
    }
}

// ============================================================================
// Arena scenario
// ============================================================================

/// Player placement in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpawn {
    /// Starting position
    pub position: Vec3,
    /// Action tunables
    pub tuning: PlayerTuning,
    /// Health tunables
    pub health: HealthTuning,
}

impl Default for PlayerSpawn {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            tuning: PlayerTuning::default(),
            health: HealthTuning::default(),
        }
    }
}

/// Enemy placement in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySpawn {
    /// Display name used in logs
    pub name: String,
    /// Starting position
    pub position: Vec3,
    /// Patrol waypoints, visited in order and wrapping
    pub route: Vec<Vec3>,
    /// AI tunables
    pub tuning: EnemyTuning,
    /// Health tunables
    pub health: HealthTuning,
}

impl Default for EnemySpawn {
    fn default() -> Self {
        Self {
            name: "enemy".to_string(),
            position: Vec3::ZERO,
            route: Vec::new(),
            tuning: EnemyTuning::default(),
            health: HealthTuning::default(),
        }
    }
}

/// A complete arena scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Fixed simulation step (seconds)
    pub fixed_dt: f32,
    /// Downward acceleration applied to actors
    pub gravity: f32,
    /// Player placement (none = enemies only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerSpawn>,
    /// Enemy placements
    pub enemies: Vec<EnemySpawn>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            fixed_dt: crate::time::DEFAULT_FIXED_DT,
            gravity: 9.81,
            player: None,
            enemies: Vec::new(),
        }
    }
}

impl ArenaConfig {
    /// Parse a scenario from TOML text.
    pub fn from_toml_str(text: &str) -> SkirmishResult<Self> {
        let config = toml::from_str(text).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Serialize the scenario to TOML text.
    pub fn to_toml_string(&self) -> SkirmishResult<String> {
        let text = toml::to_string_pretty(self).map_err(ConfigError::from)?;
        Ok(text)
    }

    /// Load a scenario from a TOML file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> SkirmishResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!(
            "Loaded arena config from {:?} ({} enemies)",
            path,
            config.enemies.len()
        );
        Ok(config)
    }

    /// Save the scenario to a TOML file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> SkirmishResult<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
