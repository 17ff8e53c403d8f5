//! Scene configuration parsing from scene.toml files

use serde::Deserialize;
use std::path::Path;

use crate::game::constants::avatar as avatar_consts;
use crate::game::touch_events::ObjectTag;

/// Avatar configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarConfig {
    /// Spawn position, captured as the respawn target
    #[serde(default = "default_start_position")]
    pub start_position: [f32; 3],
    /// Spawn yaw in degrees, restored on respawn along with position
    #[serde(default)]
    pub start_yaw_deg: f32,
    /// Forward speed in units/second; zero or unset falls back to the default
    #[serde(default)]
    pub movement_speed: f32,
    /// Starting hit points
    #[serde(default = "default_life")]
    pub life: u32,
    /// Upward impulse magnitude for a grounded jump
    #[serde(default = "default_jump_impulse")]
    pub jump_impulse: f32,
    /// Seconds between a river contact and the teleport back to start
    #[serde(default = "default_respawn_cooldown")]
    pub respawn_cooldown: f32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            start_position: default_start_position(),
            start_yaw_deg: 0.0,
            movement_speed: 0.0,
            life: default_life(),
            jump_impulse: default_jump_impulse(),
            respawn_cooldown: default_respawn_cooldown(),
        }
    }
}

/// One tagged cuboid in the scene. Rivers become trigger volumes; objects
/// with a nonzero velocity become kinematic lane movers.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectConfig {
    pub tag: ObjectTag,
    pub position: [f32; 3],
    pub size: [f32; 3],
    #[serde(default)]
    pub rotation_deg: [f32; 3],
    #[serde(default)]
    pub velocity: [f32; 3],
}

/// Scene configuration from scene.toml
#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

fn default_start_position() -> [f32; 3] {
    [0.0, 16.25, -22.9]
}

fn default_life() -> u32 {
    avatar_consts::DEFAULT_LIFE
}

fn default_jump_impulse() -> f32 {
    avatar_consts::DEFAULT_JUMP_IMPULSE
}

fn default_respawn_cooldown() -> f32 {
    avatar_consts::DEFAULT_RESPAWN_COOLDOWN
}

impl SceneConfig {
    /// Load scene configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SceneConfigError::IoError(path.to_path_buf(), e))?;

        toml::from_str(&content).map_err(|e| SceneConfigError::ParseError(path.to_path_buf(), e))
    }
}

/// Errors that can occur when loading scene configuration
#[derive(Debug)]
pub enum SceneConfigError {
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, toml::de::Error),
}

impl std::fmt::Display for SceneConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneConfigError::IoError(path, e) => {
                write!(f, "Failed to read {}: {}", path.display(), e)
            }
            SceneConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for SceneConfigError {}
