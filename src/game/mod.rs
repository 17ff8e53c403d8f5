pub mod avatar;
pub mod constants;
pub mod physics;
pub mod tick_pipeline;
pub mod touch_events;

use std::collections::HashSet;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use nalgebra::{UnitQuaternion, Vector3};
use parking_lot::RwLock;

use crate::config::SceneConfig;
use avatar::damage::{RespawnCheck, StartPose};
use avatar::grounding::GroundedState;
use avatar::locomotion::{InputSample, MotionPlan};
use avatar::orientation::{align_step, aligned_height, terrain_target_rotation};
use avatar::Avatar;
use constants::physics as consts;
use physics::PhysicsWorld;
use touch_events::{compute_contact_transitions, ContactEvent, ContactPhase};

/// Process-wide simulation clock. Every time-driven system checks `paused`
/// at the start of its tick; death flips it and the whole simulation stops.
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    pub elapsed: f32,
    pub paused: bool,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            paused: false,
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to the simulation clock
pub type SimClockHandle = Arc<RwLock<SimClock>>;

/// A kinematic scene object driven at a constant velocity (car lanes).
struct Mover {
    id: u64,
    velocity: [f32; 3],
}

/// One avatar, one tagged scene, one clock: the whole headless simulation.
pub struct Simulation {
    pub physics: PhysicsWorld,
    pub avatar: Avatar,
    pub clock: SimClockHandle,
    pub tick: u64,
    input_sender: Sender<InputSample>,
    input_receiver: Receiver<InputSample>,
    /// Sticky axes from the last received sample; jump is edge-consumed
    current_input: InputSample,
    previous_contacts: HashSet<u64>,
    movers: Vec<Mover>,
}

impl Simulation {
    /// Builds the scene and spawns the avatar from a parsed config.
    pub fn from_config(config: &SceneConfig) -> Self {
        let mut physics = PhysicsWorld::new();
        let mut movers = Vec::new();

        for object in &config.objects {
            let is_trigger = object.tag == touch_events::ObjectTag::River;
            let kinematic = object.velocity != [0.0; 3];
            let id = physics.add_object(
                object.position,
                object.size,
                object.rotation_deg,
                object.tag,
                is_trigger,
                kinematic,
            );
            if kinematic {
                movers.push(Mover {
                    id,
                    velocity: object.velocity,
                });
            }
        }

        let start_rotation = UnitQuaternion::from_axis_angle(
            &Vector3::y_axis(),
            config.avatar.start_yaw_deg.to_radians(),
        );
        let start_pose = StartPose {
            position: Vector3::from(config.avatar.start_position),
            rotation: start_rotation,
        };
        physics.add_avatar(config.avatar.start_position, start_rotation);

        let avatar = Avatar::new(
            config.avatar.movement_speed,
            config.avatar.jump_impulse,
            config.avatar.life,
            config.avatar.respawn_cooldown,
            start_pose,
        );

        let (input_sender, input_receiver) = crossbeam_channel::unbounded();

        Self {
            physics,
            avatar,
            clock: Arc::new(RwLock::new(SimClock::new())),
            tick: 0,
            input_sender,
            input_receiver,
            current_input: InputSample::default(),
            previous_contacts: HashSet::new(),
            movers,
        }
    }

    /// Sender half of the input queue; samples are drained once per tick.
    pub fn input_sender(&self) -> Sender<InputSample> {
        self.input_sender.clone()
    }

    pub fn clock_handle(&self) -> SimClockHandle {
        Arc::clone(&self.clock)
    }

    /// Advances the simulation by one fixed-rate tick.
    pub fn step(&mut self) {
        tick_pipeline::run_tick_phases(self, consts::TIMESTEP);
    }

    /// Runs the fixed-rate loop for a wall-clock-free span of seconds.
    pub fn run_seconds(&mut self, seconds: f32) {
        let ticks = (seconds / consts::TIMESTEP).round() as u64;
        for _ in 0..ticks {
            self.step();
        }
    }

    pub(super) fn drain_input(&mut self) -> InputSample {
        while let Ok(sample) = self.input_receiver.try_recv() {
            self.current_input.turn = sample.turn;
            self.current_input.forward = sample.forward;
            self.current_input.jump_pressed |= sample.jump_pressed;
        }
        let sample = self.current_input;
        // Jump is a press edge, consumed exactly once.
        self.current_input.jump_pressed = false;
        sample
    }

    /// Applies the tick's movement plan: constraint mask, local yaw, then
    /// translation along the rotated forward axis.
    pub(super) fn apply_motion_plan(&mut self, plan: &MotionPlan) {
        self.physics.set_avatar_constraints(plan.constraints);

        let (Some(position), Some(rotation)) =
            (self.physics.avatar_position(), self.physics.avatar_rotation())
        else {
            return;
        };

        let mut rotation = rotation;
        if plan.yaw_delta != 0.0 {
            rotation =
                rotation * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), plan.yaw_delta);
            self.physics.set_avatar_rotation(rotation);
        }

        if plan.forward_distance > 0.0 {
            let forward = rotation * Vector3::z();
            self.physics
                .set_avatar_position(position + forward * plan.forward_distance);
        }
    }

    pub(super) fn advance_movers(&mut self, dt: f32) {
        for mover in &self.movers {
            if let Some(position) = self.physics.object_position(mover.id) {
                let v = Vector3::from(mover.velocity);
                let next = position + v * dt;
                self.physics
                    .set_object_position(mover.id, [next.x, next.y, next.z]);
            }
        }
    }

    /// Diffs the avatar's overlap set against last tick's and dispatches the
    /// resulting begin/persist/end events to the avatar controller. Pauses
    /// the shared clock when an event latches death.
    pub(super) fn dispatch_contacts(&mut self) {
        let current = self.physics.detect_avatar_contacts();
        let mut transitions = compute_contact_transitions(&current, &self.previous_contacts);
        let elapsed = self.clock.read().elapsed;

        // Deterministic order within a tick: solid contacts before trigger
        // volumes, so stepping onto a bridge registers before the river
        // trigger underneath it fires.
        let trigger_last = |id: &u64| {
            let is_trigger = self
                .physics
                .contact_kind(*id)
                .map(|k| k == touch_events::ContactKind::Trigger)
                .unwrap_or(false);
            (is_trigger, *id)
        };
        transitions.began.sort_by_key(trigger_last);
        transitions.ended.sort_by_key(trigger_last);

        self.avatar.grounding.begin_contact_batch();
        let mut died = false;
        let phases = [
            (&transitions.began, ContactPhase::Began),
            (&transitions.persisted, ContactPhase::Persisted),
            (&transitions.ended, ContactPhase::Ended),
        ];
        for (ids, phase) in phases {
            for &id in ids {
                let (Some(tag), Some(kind)) =
                    (self.physics.tag_of(id), self.physics.contact_kind(id))
                else {
                    continue;
                };
                let event = ContactEvent {
                    other_id: id,
                    tag,
                    kind,
                    phase,
                };
                died |= self.avatar.on_contact_event(&event, elapsed);
            }
        }

        self.previous_contacts = current;
        if died {
            self.clock.write().paused = true;
        }
    }

    /// Snaps height to the terrain sample and slerps toward the surface
    /// normal. Suspended while airborne or standing on a walkable object; a
    /// missed query leaves the pose unchanged this tick.
    pub(super) fn align_to_terrain(&mut self, dt: f32) {
        if self.avatar.grounding.on_walkable_surface
            || self.avatar.grounding.grounded == GroundedState::Airborne
        {
            return;
        }

        // Scripted translation moved colliders since the physics step.
        self.physics.update_query_pipeline();

        let Some(position) = self.physics.avatar_position() else {
            return;
        };
        if let Some(height) = self.physics.sample_height(position.x, position.z) {
            self.physics.set_avatar_position(Vector3::new(
                position.x,
                aligned_height(height),
                position.z,
            ));
        }

        let Some(position) = self.physics.avatar_position() else {
            return;
        };
        let Some(rotation) = self.physics.avatar_rotation() else {
            return;
        };
        if let Some(hit) = self.physics.raycast_down(position) {
            if let Some(target) = terrain_target_rotation(&rotation, &hit.normal) {
                self.physics
                    .set_avatar_rotation(align_step(&rotation, &target, dt));
            }
        }
    }

    pub(super) fn run_respawn_check(&mut self) {
        let elapsed = self.clock.read().elapsed;
        match self.avatar.check_respawn(elapsed) {
            RespawnCheck::Teleport(pose) => {
                self.physics.teleport_avatar(pose.position, pose.rotation);
            }
            RespawnCheck::Died => {
                self.clock.write().paused = true;
            }
            RespawnCheck::Idle => {}
        }
    }
}
