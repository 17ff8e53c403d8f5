//! The avatar controller: owns the per-avatar state machines and the named
//! animation signals, and routes contact notifications to them.

pub mod damage;
pub mod grounding;
pub mod locomotion;
pub mod orientation;

use damage::{DamageOutcome, DamageState, RespawnCheck, StartPose};
use grounding::GroundingState;
use locomotion::resolve_movement_speed;

use super::touch_events::{ContactEvent, ContactKind, ContactPhase, ObjectTag};

/// Named signals consumed by the external animation collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationSignals {
    /// Drives the idle/run blend
    pub forward_speed: f32,
    pub damage: bool,
    pub death: bool,
}

pub struct Avatar {
    pub movement_speed: f32,
    pub jump_impulse: f32,
    pub grounding: GroundingState,
    pub damage: DamageState,
    pub signals: AnimationSignals,
}

impl Avatar {
    pub fn new(
        movement_speed: f32,
        jump_impulse: f32,
        life: u32,
        respawn_cooldown: f32,
        start_pose: StartPose,
    ) -> Self {
        Self {
            movement_speed: resolve_movement_speed(movement_speed),
            jump_impulse,
            grounding: GroundingState::default(),
            damage: DamageState::new(life, respawn_cooldown, start_pose),
            signals: AnimationSignals::default(),
        }
    }

    pub fn life(&self) -> u32 {
        self.damage.life()
    }

    pub fn increase_life(&mut self, amount: u32) {
        self.damage.increase_life(amount);
    }

    /// Routes one contact notification to the grounding and damage state
    /// machines and updates the animation signals. Returns true when this
    /// event latched death, so the caller can pause the shared clock.
    ///
    /// The river path schedules the delayed respawn; the per-tick respawn
    /// check that follows contact dispatch performs the immediate attempt
    /// (a no-op until the deadline passes).
    pub fn on_contact_event(&mut self, event: &ContactEvent, elapsed: f32) -> bool {
        self.grounding.on_contact_event(event);

        let outcome = match (event.phase, event.tag, event.kind) {
            (ContactPhase::Began, ObjectTag::Car, ContactKind::Solid) => {
                self.damage.on_car_contact(event.other_id)
            }
            (ContactPhase::Began, ObjectTag::River, ContactKind::Trigger) => self
                .damage
                .on_river_contact(event.other_id, self.grounding.on_walkable_surface, elapsed),
            (ContactPhase::Ended, ObjectTag::Car, _) => {
                // Any car separating clears the damage signal and dedup state.
                self.signals.damage = false;
                self.damage.on_car_separation();
                DamageOutcome::Ignored
            }
            _ => DamageOutcome::Ignored,
        };

        match outcome {
            DamageOutcome::Damaged => {
                self.signals.damage = true;
                false
            }
            DamageOutcome::Died => {
                self.signals.death = true;
                true
            }
            DamageOutcome::Ignored => false,
        }
    }

    /// Per-tick respawn check. Returns the teleport target once the pending
    /// deadline passes; returns `Died` (latching the death signal) when life
    /// ran out while the respawn was pending.
    pub fn check_respawn(&mut self, elapsed: f32) -> RespawnCheck {
        let check = self.damage.check_respawn(elapsed);
        match check {
            RespawnCheck::Teleport(_) => {
                self.signals.damage = false;
            }
            RespawnCheck::Died => {
                self.signals.death = true;
            }
            RespawnCheck::Idle => {}
        }
        check
    }
}
