//! Per-tick locomotion planning: digital-threshold steering, forward-only
//! translation, and the rigid-body constraint mask.

use super::super::constants::avatar as consts;

/// One frame of sampled player intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSample {
    /// Horizontal steering axis in [-1, 1]
    pub turn: f32,
    /// Forward axis in [-1, 1]
    pub forward: f32,
    /// Jump edge, true only on the frame the button went down
    pub jump_pressed: bool,
}

/// Which degrees of freedom the avatar's rigid body keeps this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintMask {
    /// Idle and not jumping: freeze everything so the engine cannot drift
    FreezeAll,
    /// Idle mid-jump: vertical motion only
    VerticalOnly,
    /// Moving: rotation stays frozen, horizontal motion is script-driven
    RotationOnly,
}

/// Per-tick movement plan for the avatar.
#[derive(Debug, Clone, Copy)]
pub struct MotionPlan {
    /// Yaw rotation to apply this tick, radians
    pub yaw_delta: f32,
    /// Translation along the avatar's local forward axis
    pub forward_distance: f32,
    /// Forward axis value, re-emitted as the idle/run animation blend signal
    pub forward_signal: f32,
    pub constraints: ConstraintMask,
}

/// Movement speed with the documented fallback: unset or zero config means
/// the default speed, never a standstill.
pub fn resolve_movement_speed(configured: f32) -> f32 {
    if configured <= 0.0 {
        consts::DEFAULT_MOVEMENT_SPEED
    } else {
        configured
    }
}

/// Build the avatar's movement plan for this tick.
///
/// Steering is intentionally digital: yaw only engages at full positive
/// deflection or any negative deflection, not proportionally. Backward
/// motion is not supported; `forward <= 0` produces no translation.
pub fn build_motion_plan(
    input: InputSample,
    movement_speed: f32,
    jumping: bool,
    dt: f32,
) -> MotionPlan {
    let turn_step = (consts::TURN_RATE_DEG * dt).to_radians();
    let yaw_delta = if input.turn >= 1.0 {
        turn_step
    } else if input.turn < 0.0 {
        -turn_step
    } else {
        0.0
    };

    let forward_distance = if input.forward > 0.0 {
        input.forward * dt * movement_speed
    } else {
        0.0
    };

    let idle = forward_distance == 0.0 && yaw_delta == 0.0;
    let constraints = match (idle, jumping) {
        (true, false) => ConstraintMask::FreezeAll,
        (true, true) => ConstraintMask::VerticalOnly,
        (false, _) => ConstraintMask::RotationOnly,
    };

    MotionPlan {
        yaw_delta,
        forward_distance,
        forward_signal: input.forward,
        constraints,
    }
}
