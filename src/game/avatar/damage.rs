//! Health bookkeeping, hazard de-duplication, and the delayed respawn
//! protocol.
//!
//! Both hazard paths (solid car collision, river trigger volume) route
//! through one `apply_damage` entry point. A river contact additionally
//! schedules a teleport back to the start pose after a fixed cooldown;
//! death takes precedence over a pending respawn.

use nalgebra::{UnitQuaternion, Vector3};

/// Pose captured once at initialization; the target of every respawn.
/// Rotation is restored along with position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartPose {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

/// What a damage-side transition requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Contact suppressed (same still-touching hazard, or bridge over river)
    Ignored,
    /// Life decremented; raise the damage signal
    Damaged,
    /// Life was already exhausted; raise the death signal and pause the clock
    Died,
}

/// Result of the per-tick respawn check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RespawnCheck {
    /// No respawn pending, or the deadline has not passed yet
    Idle,
    /// Teleport the avatar to the start pose and clear the damage signal
    Teleport(StartPose),
    /// Life ran out while the respawn was pending
    Died,
}

#[derive(Debug, Clone, Copy)]
pub struct DamageState {
    life: u32,
    /// Suppresses repeat damage from the same still-touching hazard
    pub last_hazard_contact: Option<u64>,
    pub respawn_pending: bool,
    /// Absolute clock value at which a pending respawn becomes effective
    pub respawn_deadline: f32,
    respawn_cooldown: f32,
    start_pose: StartPose,
}

impl DamageState {
    pub fn new(life: u32, respawn_cooldown: f32, start_pose: StartPose) -> Self {
        Self {
            life,
            last_hazard_contact: None,
            respawn_pending: false,
            respawn_deadline: 0.0,
            respawn_cooldown,
            start_pose,
        }
    }

    pub fn life(&self) -> u32 {
        self.life
    }

    /// Additive, no upper clamp.
    pub fn increase_life(&mut self, amount: u32) {
        self.life += amount;
    }

    pub fn start_pose(&self) -> StartPose {
        self.start_pose
    }

    /// Unified damage entry point for both solid and trigger contact.
    /// With life already at zero this reports death; redundant calls while
    /// dead are harmless.
    pub fn apply_damage(&mut self, source: u64) -> DamageOutcome {
        self.last_hazard_contact = Some(source);
        if self.life == 0 {
            DamageOutcome::Died
        } else {
            self.life -= 1;
            DamageOutcome::Damaged
        }
    }

    /// Solid car contact: damage only when the contact is a different object
    /// than the one still touching.
    pub fn on_car_contact(&mut self, source: u64) -> DamageOutcome {
        if self.last_hazard_contact == Some(source) {
            return DamageOutcome::Ignored;
        }
        self.apply_damage(source)
    }

    /// River trigger contact: damage unless standing on a walkable surface,
    /// then schedule the delayed teleport-to-start.
    pub fn on_river_contact(
        &mut self,
        source: u64,
        on_walkable_surface: bool,
        elapsed: f32,
    ) -> DamageOutcome {
        if on_walkable_surface {
            return DamageOutcome::Ignored;
        }
        let outcome = self.apply_damage(source);
        self.respawn_pending = true;
        self.respawn_deadline = elapsed + self.respawn_cooldown;
        outcome
    }

    /// Any car separating clears hazard dedup state, without checking which
    /// contact ended.
    pub fn on_car_separation(&mut self) {
        self.last_hazard_contact = None;
    }

    /// Executes the pending respawn once the deadline has passed, exactly
    /// once per pending cycle. A no-op until then.
    pub fn check_respawn(&mut self, elapsed: f32) -> RespawnCheck {
        if !self.respawn_pending || elapsed <= self.respawn_deadline {
            return RespawnCheck::Idle;
        }
        self.respawn_pending = false;
        self.last_hazard_contact = None;
        if self.life == 0 {
            RespawnCheck::Died
        } else {
            RespawnCheck::Teleport(self.start_pose)
        }
    }
}
