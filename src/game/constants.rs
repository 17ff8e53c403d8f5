//! Simulation tuning constants.
//! Centralizing these prevents bugs from duplicated hardcoded values.

/// Physics constants
pub mod physics {
    /// Gravity in world units/s²
    pub const DEFAULT_GRAVITY: f32 = 9.81;

    /// Fixed timestep for the simulation loop (60 Hz)
    pub const TIMESTEP: f32 = 1.0 / 60.0;

    /// Avatar capsule radius
    pub const AVATAR_RADIUS: f32 = 0.5;

    /// Avatar capsule total height
    pub const AVATAR_HEIGHT: f32 = 2.0;

    /// Max distance for downward terrain rays
    pub const GROUND_RAY_DISTANCE: f32 = 500.0;

    /// Y origin for absolute terrain height sampling rays
    pub const HEIGHT_SAMPLE_ORIGIN_Y: f32 = 1000.0;

    /// Small epsilon for float comparisons
    pub const EPSILON: f32 = 0.001;
}

/// Avatar default values
pub mod avatar {
    /// Forward speed (units/second) used when the configured speed is unset or zero
    pub const DEFAULT_MOVEMENT_SPEED: f32 = 5.0;

    /// Yaw rate at full stick deflection (degrees/second)
    pub const TURN_RATE_DEG: f32 = 40.0 * 3.0;

    /// Height of the avatar pivot above the sampled terrain surface
    pub const GROUND_OFFSET: f32 = 5.62;

    /// Terrain-alignment slerp factor per second (factor = rate * dt, saturates at 1)
    pub const ALIGN_SLERP_RATE: f32 = 2.0;

    /// Default upward jump impulse magnitude
    pub const DEFAULT_JUMP_IMPULSE: f32 = 8.0;

    /// Default starting life count
    pub const DEFAULT_LIFE: u32 = 3;

    /// Default delay between river contact and teleport-to-start (seconds)
    pub const DEFAULT_RESPAWN_COOLDOWN: f32 = 5.0;
}
