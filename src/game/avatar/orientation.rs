//! Terrain-following posture math.
//!
//! Each tick the avatar's height snaps to the sampled terrain plus a fixed
//! offset, and its orientation slerps toward a rotation whose forward axis
//! hugs the surface. Suspended while airborne or standing on a walkable
//! object; a missed surface query leaves the pose untouched for the tick.

use nalgebra::{UnitQuaternion, Vector3};

use super::super::constants::avatar as consts;

/// Vertical position for a sampled terrain height.
pub fn aligned_height(terrain_height: f32) -> f32 {
    terrain_height + consts::GROUND_OFFSET
}

/// Target orientation for a surface normal: forward becomes the cross
/// product of the avatar's current right axis and the normal, keeping yaw
/// while pitching to the slope. Returns `None` for a degenerate cross
/// product (normal parallel to the right axis).
pub fn terrain_target_rotation(
    current: &UnitQuaternion<f32>,
    surface_normal: &Vector3<f32>,
) -> Option<UnitQuaternion<f32>> {
    let right = current * Vector3::x();
    let forward = right.cross(surface_normal);
    if forward.norm_squared() < 1e-8 {
        return None;
    }
    Some(UnitQuaternion::face_towards(&forward, surface_normal))
}

/// One interpolation step toward the target at the fixed angular rate.
/// The factor saturates at 1, so a long frame lands exactly on the target.
pub fn align_step(
    current: &UnitQuaternion<f32>,
    target: &UnitQuaternion<f32>,
    dt: f32,
) -> UnitQuaternion<f32> {
    let factor = (consts::ALIGN_SLERP_RATE * dt).min(1.0);
    current
        .try_slerp(target, factor, 1.0e-6)
        .unwrap_or(*target)
}
