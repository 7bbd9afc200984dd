//! Game configuration (physics rate, craft, camera, spawning, demo run).
//! Loaded from config.ron at startup.

use std::path::{Path, PathBuf};

use engine_core::{
    ensure_non_empty, ensure_non_negative, ensure_positive, ensure_range, ensure_within, ConfigError,
    FixedStepIntegrator,
};
use renderer::{ChaseCameraParams, Projection};
use serde::{Deserialize, Serialize};

use crate::flight::MotionProfile;

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Physics ticks per second.
    #[serde(default = "default_physics_hz")]
    pub physics_hz: f64,
    /// Longest frame (seconds) fed to the fixed-step loop.
    #[serde(default = "default_max_frame_time")]
    pub max_frame_time: f32,
    /// RNG seed for spawning. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub craft: CraftConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub projection: Projection,
    #[serde(default)]
    pub spawn: SpawnConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

fn default_physics_hz() -> f64 {
    60.0
}
/// Upper bound for `max_frame_time`, in seconds.
const MAX_FRAME_TIME_LIMIT: f32 = 10.0;

fn default_max_frame_time() -> f32 {
    0.25
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics_hz: default_physics_hz(),
            max_frame_time: default_max_frame_time(),
            seed: None,
            craft: CraftConfig::default(),
            camera: CameraConfig::default(),
            projection: Projection::default(),
            spawn: SpawnConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftConfig {
    pub motion: MotionProfile,
    pub collision_radius: f32,
    pub health: f32,
    /// Health lost per obstacle hit.
    pub collision_damage: f32,
    /// Uniform scale applied to the model when drawing.
    pub model_scale: f32,
    pub blink_duration: f32,
    pub blinks: u8,
}

impl Default for CraftConfig {
    fn default() -> Self {
        Self {
            motion: MotionProfile::default(),
            collision_radius: 1.5,
            health: 500.0,
            collision_damage: 25.0,
            model_scale: 0.016,
            blink_duration: 1.0,
            blinks: 3,
        }
    }
}

impl CraftConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        ensure_positive("craft.collision_radius", self.collision_radius)?;
        ensure_positive("craft.health", self.health)?;
        ensure_non_negative("craft.collision_damage", self.collision_damage)?;
        ensure_positive("craft.model_scale", self.model_scale)?;
        ensure_positive("craft.blink_duration", self.blink_duration)?;
        ensure_non_empty("craft.blinks", usize::from(self.blinks))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub chase: ChaseCameraParams,
    /// Fixed offset along the chased pose's forward axis.
    pub forward_offset: f32,
    /// Fixed offset along the chased pose's up axis.
    pub up_offset: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            chase: ChaseCameraParams::default(),
            forward_offset: 0.0,
            up_offset: 1.0,
        }
    }
}

/// Asteroid field tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub pool_capacity: usize,
    /// Asteroids spawned when the world is built.
    pub initial_burst: usize,
    /// Seconds between bursts.
    pub interval: f32,
    pub per_burst: usize,
    /// Spawn shells are centred this far ahead of the craft.
    pub lead_distance: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// rad/s
    pub max_angular_speed: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Seconds an asteroid lives.
    pub lifetime: f32,
    /// Asteroids farther than this from the craft are despawned.
    pub despawn_distance: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 6000,
            initial_burst: 100,
            interval: 0.1,
            per_burst: 2,
            lead_distance: 800.0,
            min_radius: 20.0,
            max_radius: 600.0,
            min_speed: 0.0,
            max_speed: 20.0,
            max_angular_speed: 1.0,
            min_scale: 2.0,
            max_scale: 14.0,
            lifetime: 40.0,
            despawn_distance: 3000.0,
        }
    }
}

impl SpawnConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_empty("spawn.pool_capacity", self.pool_capacity)?;
        if u32::try_from(self.pool_capacity).is_err() {
            return Err(ConfigError::OutOfRange {
                name: "spawn.pool_capacity",
                value: self.pool_capacity as f32,
                min: 1.0,
                max: u32::MAX as f32,
            });
        }
        ensure_positive("spawn.interval", self.interval)?;
        ensure_non_negative("spawn.lead_distance", self.lead_distance)?;
        ensure_range("spawn.radius", self.min_radius, self.max_radius)?;
        ensure_range("spawn.speed", self.min_speed, self.max_speed)?;
        ensure_non_negative("spawn.max_angular_speed", self.max_angular_speed)?;
        ensure_range("spawn.scale", self.min_scale, self.max_scale)?;
        ensure_positive("spawn.min_scale", self.min_scale)?;
        ensure_positive("spawn.lifetime", self.lifetime)?;
        ensure_positive("spawn.despawn_distance", self.despawn_distance)
    }
}

/// Headless run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Seconds of wall time before the run ends.
    pub duration: f32,
    /// Frame-rate cap.
    pub frame_rate: f32,
    /// Frames between statistics log lines.
    pub log_every: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            duration: 30.0,
            frame_rate: 60.0,
            log_every: 120,
        }
    }
}

impl DemoConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("demo.duration", self.duration)?;
        ensure_within("demo.frame_rate", self.frame_rate, 1.0, 1000.0)?;
        ensure_non_empty("demo.log_every", self.log_every as usize)
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    /// Check every tuning invariant before anything is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        FixedStepIntegrator::validate_rate(self.physics_hz)?;
        ensure_positive("max_frame_time", self.max_frame_time)?;
        ensure_within("max_frame_time", self.max_frame_time, 0.0, MAX_FRAME_TIME_LIMIT)?;
        self.craft.validate()?;
        self.camera.chase.validate()?;
        self.projection.validate()?;
        self.spawn.validate()?;
        self.demo.validate()
    }
}

pub fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_ron_fills_in_defaults() {
        let config: GameConfig = ron::from_str(
            "(physics_hz: 120.0, seed: Some(9), spawn: (pool_capacity: 16), camera: (up_offset: 2.0))",
        )
        .expect("partial config parses");
        assert_eq!(config.physics_hz, 120.0);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.spawn.pool_capacity, 16);
        assert_eq!(config.spawn.per_burst, 2);
        assert_eq!(config.camera.up_offset, 2.0);
        assert_eq!(config.camera.chase.ideal_distance, 13.0);
        assert_eq!(config.craft.motion.linear.max_speed, 400.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn round_trips_through_ron() {
        let config = GameConfig::default();
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default())
            .expect("serializes");
        let back: GameConfig = ron::from_str(&text).expect("parses back");
        assert_eq!(back.spawn.pool_capacity, config.spawn.pool_capacity);
        assert_eq!(back.craft.motion, config.craft.motion);
        assert_eq!(back.camera.chase, config.camera.chase);
    }

    #[test]
    fn validation_names_the_bad_field() {
        let mut config = GameConfig::default();
        config.spawn.min_radius = 700.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("spawn.radius"), "{err}");

        let mut config = GameConfig::default();
        config.physics_hz = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn infinite_timings_are_rejected() {
        let mut config = GameConfig::default();
        config.max_frame_time = f32::INFINITY;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_frame_time"), "{err}");

        let mut config = GameConfig::default();
        config.physics_hz = f64::INFINITY;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("physics_hz"), "{err}");

        let mut config = GameConfig::default();
        config.max_frame_time = 1e30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = GameConfig::load_from(Path::new("/nonexistent/starfaux/config.ron"));
        assert_eq!(config.physics_hz, 60.0);
    }
}
