//! Grounded/airborne tracking and the single-shot jump latch.
//!
//! Grounding is contact-driven rather than velocity- or raycast-driven:
//! persisting contact with anything walkable forces Grounded, persisting
//! contact with a barrier or car forces Airborne, and a collision-begin
//! with ground-classified geometry ends a jump regardless of vertical
//! velocity.

use super::super::touch_events::{ContactEvent, ContactKind, ContactPhase, ObjectTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroundedState {
    #[default]
    Grounded,
    Airborne,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GroundingState {
    pub grounded: GroundedState,
    /// Standing on a bridge; suspends terrain alignment in either state
    pub on_walkable_surface: bool,
    /// Latched on jump input, cleared on ground-classified contact
    pub jump_requested: bool,
    /// A barrier/car contact already forced Airborne this tick
    hazard_override: bool,
}

impl GroundingState {
    /// Latches a jump while grounded. Returns true exactly when the caller
    /// should apply the one-shot upward impulse; a second request while
    /// airborne is a no-op.
    pub fn request_jump(&mut self) -> bool {
        if self.grounded == GroundedState::Grounded && !self.jump_requested {
            self.jump_requested = true;
            self.grounded = GroundedState::Airborne;
            true
        } else {
            false
        }
    }

    /// Resets per-tick override tracking; call once before dispatching the
    /// tick's contact events.
    pub fn begin_contact_batch(&mut self) {
        self.hazard_override = false;
    }

    /// Single transition function for every contact notification.
    ///
    /// Grounding is driven by solid contact exclusively; a trigger volume
    /// reports presence, not support, so passing through one mid-jump must
    /// not re-ground the avatar.
    pub fn on_contact_event(&mut self, event: &ContactEvent) {
        if event.kind == ContactKind::Trigger {
            return;
        }
        match event.phase {
            ContactPhase::Began => {
                if event.tag.is_ground_like() {
                    self.jump_requested = false;
                }
                if event.tag == ObjectTag::Bridge {
                    self.on_walkable_surface = true;
                }
            }
            ContactPhase::Persisted => match event.tag {
                // Non-walkable even while touched; overrides any walkable
                // contact seen in the same batch.
                ObjectTag::Barrier | ObjectTag::Car => {
                    self.grounded = GroundedState::Airborne;
                    self.hazard_override = true;
                }
                _ => {
                    if !self.hazard_override {
                        self.grounded = GroundedState::Grounded;
                    }
                }
            },
            ContactPhase::Ended => {
                if event.tag == ObjectTag::Bridge {
                    self.on_walkable_surface = false;
                }
            }
        }
    }
}
