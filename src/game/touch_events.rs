//! Contact lifecycle detection.
//!
//! The physics engine reports which scene objects overlap the avatar each
//! tick; diffing that set against the previous tick's yields begin/end
//! transitions, and the current set itself yields the persisting contacts.

use std::collections::HashSet;

use serde::Deserialize;

/// External classification of scene objects. The controller performs no
/// geometry analysis of its own; behavior is driven entirely by these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectTag {
    /// Terrain and other walkable base geometry
    Ground,
    /// Walkable object that suspends terrain-height alignment
    Bridge,
    /// Non-walkable solid obstacle
    Barrier,
    /// Moving hazard, damages on solid contact
    Car,
    /// Hazard trigger volume, damages and schedules a respawn
    River,
}

impl ObjectTag {
    /// Contact with ground-classified geometry ends a jump.
    pub fn is_ground_like(self) -> bool {
        matches!(self, ObjectTag::Ground | ObjectTag::Bridge)
    }
}

/// How the avatar touched the object: solid collision or sensor volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Solid,
    Trigger,
}

/// Where in the contact lifecycle this event sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Began,
    Persisted,
    Ended,
}

/// One contact notification delivered to the avatar controller.
#[derive(Debug, Clone, Copy)]
pub struct ContactEvent {
    pub other_id: u64,
    pub tag: ObjectTag,
    pub kind: ContactKind,
    pub phase: ContactPhase,
}

/// Avatar contact lifecycle for one tick.
#[derive(Debug, Default, Clone)]
pub struct ContactTransitions {
    pub began: Vec<u64>,
    pub persisted: Vec<u64>,
    pub ended: Vec<u64>,
}

/// Compute contact begin/persist/end transitions from current and previous
/// overlap sets. Every current contact persists this tick, including ones
/// that just began; downstream handlers are idempotent under that overlap.
pub fn compute_contact_transitions(
    current: &HashSet<u64>,
    previous: &HashSet<u64>,
) -> ContactTransitions {
    let began = current
        .iter()
        .filter(|id| !previous.contains(id))
        .copied()
        .collect();

    let mut persisted: Vec<u64> = current.iter().copied().collect();
    persisted.sort_unstable();

    let ended = previous
        .iter()
        .filter(|id| !current.contains(id))
        .copied()
        .collect();

    ContactTransitions {
        began,
        persisted,
        ended,
    }
}
