//! End-to-end controller scenarios against a real physics scene: car damage
//! dedup, the delayed river respawn, single-shot jumps, and the death pause.
//!
//! Run with: cargo test --test avatar_sim_test

use nalgebra::Vector3;

use crossway::config::{AvatarConfig, ObjectConfig, SceneConfig};
use crossway::game::avatar::grounding::GroundedState;
use crossway::game::avatar::locomotion::InputSample;
use crossway::game::touch_events::{ContactEvent, ContactKind, ContactPhase, ObjectTag};
use crossway::game::Simulation;

const DT: f32 = 1.0 / 60.0;

fn ground_slab() -> ObjectConfig {
    ObjectConfig {
        tag: ObjectTag::Ground,
        position: [0.0, -0.5, 0.0],
        size: [400.0, 1.0, 400.0],
        rotation_deg: [0.0; 3],
        velocity: [0.0; 3],
    }
}

fn avatar_at(position: [f32; 3], life: u32, respawn_cooldown: f32) -> AvatarConfig {
    AvatarConfig {
        start_position: position,
        start_yaw_deg: 0.0,
        movement_speed: 5.0,
        life,
        jump_impulse: 8.0,
        respawn_cooldown,
    }
}

fn scene(avatar: AvatarConfig, objects: Vec<ObjectConfig>) -> SceneConfig {
    SceneConfig { avatar, objects }
}

/// The avatar hovers GROUND_OFFSET above the terrain, so objects meant to
/// touch it sit at this height.
const HOVER_Y: f32 = 5.62;

#[test]
fn car_contact_damages_once_and_separation_rearms() {
    // Car A starts overlapping the avatar and drives off in +x; car B
    // approaches from -x and passes through later.
    let config = scene(
        avatar_at([0.0, HOVER_Y, 0.0], 3, 5.0),
        vec![
            ground_slab(),
            ObjectConfig {
                tag: ObjectTag::Car,
                position: [0.5, HOVER_Y, 0.0],
                size: [2.0, 2.0, 2.0],
                rotation_deg: [0.0; 3],
                velocity: [50.0, 0.0, 0.0],
            },
            ObjectConfig {
                tag: ObjectTag::Car,
                position: [-30.0, HOVER_Y, 0.0],
                size: [2.0, 2.0, 2.0],
                rotation_deg: [0.0; 3],
                velocity: [50.0, 0.0, 0.0],
            },
        ],
    );
    let mut sim = Simulation::from_config(&config);

    // First tick: car A overlap begins, one hit despite persisting contact.
    sim.step();
    assert_eq!(sim.avatar.life(), 2);
    assert!(sim.avatar.signals.damage);

    // Car A separates within half a second; damage signal clears.
    sim.run_seconds(0.5);
    assert_eq!(sim.avatar.life(), 2);
    assert!(!sim.avatar.signals.damage);
    assert_eq!(sim.avatar.damage.last_hazard_contact, None);

    // Car B is a different object, so it damages again on arrival.
    sim.run_seconds(0.7);
    assert_eq!(sim.avatar.life(), 1);

    // Life never increased along the way and floors at zero by contract.
    assert!(sim.avatar.life() <= 3);
}

#[test]
fn river_contact_schedules_delayed_respawn_restoring_full_pose() {
    // The river volume covers the walk path, so the avatar is inside it from
    // the first tick; cooldown 2s.
    let start = [0.0, HOVER_Y, -10.0];
    let config = scene(
        avatar_at(start, 3, 2.0),
        vec![
            ground_slab(),
            ObjectConfig {
                tag: ObjectTag::River,
                position: [0.0, HOVER_Y, -2.0],
                size: [60.0, 4.0, 40.0],
                rotation_deg: [0.0; 3],
                velocity: [0.0; 3],
            },
        ],
    );
    let mut sim = Simulation::from_config(&config);
    let input = sim.input_sender();
    let clock = sim.clock_handle();

    // Walk forward so the eventual teleport is observable.
    input
        .send(InputSample {
            turn: 0.0,
            forward: 1.0,
            jump_pressed: false,
        })
        .unwrap();

    sim.step();
    assert_eq!(sim.avatar.life(), 2);
    assert!(sim.avatar.damage.respawn_pending);
    assert!((sim.avatar.damage.respawn_deadline - 2.0).abs() < 0.02);

    // Just before the deadline: still walking, no teleport yet.
    while clock.read().elapsed < 2.0 - DT / 2.0 {
        sim.step();
    }
    assert!(sim.avatar.damage.respawn_pending);
    let pos_before = sim.physics.avatar_position().unwrap();
    assert!((pos_before.z - start[2]).abs() > 5.0);

    // Stop walking, let the deadline pass: exactly one teleport to the full
    // start pose, rotation included.
    input
        .send(InputSample {
            turn: 0.0,
            forward: 0.0,
            jump_pressed: false,
        })
        .unwrap();
    for _ in 0..3 {
        sim.step();
    }
    assert!(!sim.avatar.damage.respawn_pending);
    assert!(!sim.avatar.signals.damage);
    let pos_after = sim.physics.avatar_position().unwrap();
    assert!((pos_after - Vector3::from(start)).norm() < 0.05);
    let rot_after = sim.physics.avatar_rotation().unwrap();
    assert!(rot_after.angle_to(&sim.avatar.damage.start_pose().rotation) < 0.05);
}

#[test]
fn jump_applies_exactly_one_impulse() {
    let config = scene(avatar_at([0.0, HOVER_Y, 0.0], 3, 5.0), vec![ground_slab()]);
    let mut sim = Simulation::from_config(&config);
    let input = sim.input_sender();

    input
        .send(InputSample {
            turn: 0.0,
            forward: 0.0,
            jump_pressed: true,
        })
        .unwrap();
    sim.step();

    let v_after_jump = sim.physics.avatar_vertical_velocity().unwrap();
    assert!(v_after_jump > 1.0, "jump impulse should launch upward");
    assert_eq!(sim.avatar.grounding.grounded, GroundedState::Airborne);
    assert!(sim.avatar.grounding.jump_requested);

    // A second jump request while airborne adds no impulse; gravity keeps
    // bleeding vertical velocity.
    input
        .send(InputSample {
            turn: 0.0,
            forward: 0.0,
            jump_pressed: true,
        })
        .unwrap();
    sim.step();
    let v_next = sim.physics.avatar_vertical_velocity().unwrap();
    assert!(v_next < v_after_jump);
    sim.step();
    assert!(sim.physics.avatar_vertical_velocity().unwrap() < v_next);
}

#[test]
fn jump_inside_river_volume_keeps_the_jump_arc() {
    // A tall river volume surrounds the avatar; its trigger contact must
    // not re-ground a mid-jump avatar and snap the arc away.
    let config = scene(
        avatar_at([0.0, HOVER_Y, 0.0], 3, 5.0),
        vec![
            ground_slab(),
            ObjectConfig {
                tag: ObjectTag::River,
                position: [0.0, HOVER_Y, 0.0],
                size: [20.0, 20.0, 20.0],
                rotation_deg: [0.0; 3],
                velocity: [0.0; 3],
            },
        ],
    );
    let mut sim = Simulation::from_config(&config);
    let input = sim.input_sender();

    input
        .send(InputSample {
            turn: 0.0,
            forward: 0.0,
            jump_pressed: true,
        })
        .unwrap();
    sim.step();
    assert_eq!(sim.avatar.grounding.grounded, GroundedState::Airborne);
    assert!(sim.physics.avatar_vertical_velocity().unwrap() > 1.0);

    // A quarter second later the avatar is still rising, not snapped back
    // to the hover height by resumed terrain alignment.
    sim.run_seconds(0.25);
    assert_eq!(sim.avatar.grounding.grounded, GroundedState::Airborne);
    let y = sim.physics.avatar_position().unwrap().y;
    assert!(y > 6.0, "jump arc should continue inside the river, y={}", y);
}

#[test]
fn second_jump_applies_new_impulse_after_landing() {
    let config = scene(avatar_at([0.0, HOVER_Y, 0.0], 3, 5.0), vec![ground_slab()]);
    let mut sim = Simulation::from_config(&config);
    let input = sim.input_sender();

    input
        .send(InputSample {
            turn: 0.0,
            forward: 0.0,
            jump_pressed: true,
        })
        .unwrap();
    sim.step();
    assert_eq!(sim.avatar.grounding.grounded, GroundedState::Airborne);

    // Rise, fall past the hover height, and land on the ground slab: the
    // contact ends the jump and restores Grounded.
    let mut regrounded = false;
    for _ in 0..(5.0 / DT) as u32 {
        sim.step();
        if sim.avatar.grounding.grounded == GroundedState::Grounded
            && !sim.avatar.grounding.jump_requested
        {
            regrounded = true;
            break;
        }
    }
    assert!(regrounded, "avatar should land and re-ground");

    // Terrain alignment lifts the avatar back to its hover height.
    sim.run_seconds(0.2);
    let y = sim.physics.avatar_position().unwrap().y;
    assert!((y - HOVER_Y).abs() < 0.1, "expected hover height, y={}", y);

    // Landing re-armed the jump: a fresh request launches again.
    input
        .send(InputSample {
            turn: 0.0,
            forward: 0.0,
            jump_pressed: true,
        })
        .unwrap();
    sim.step();
    assert_eq!(sim.avatar.grounding.grounded, GroundedState::Airborne);
    assert!(sim.physics.avatar_vertical_velocity().unwrap() > 1.0);
}

#[test]
fn death_on_river_contact_freezes_pose_that_tick() {
    // Sloped terrain would tilt and re-snap the avatar if alignment ran
    // after the death latch; the pose must freeze at the latching event.
    let start = [0.0, 8.0, 0.0];
    let config = scene(
        avatar_at(start, 0, 2.0),
        vec![
            ObjectConfig {
                tag: ObjectTag::Ground,
                position: [0.0, -0.5, 0.0],
                size: [400.0, 1.0, 400.0],
                rotation_deg: [10.0, 0.0, 0.0],
                velocity: [0.0; 3],
            },
            ObjectConfig {
                tag: ObjectTag::River,
                position: [0.0, 8.0, 0.0],
                size: [20.0, 10.0, 20.0],
                rotation_deg: [0.0; 3],
                velocity: [0.0; 3],
            },
        ],
    );
    let mut sim = Simulation::from_config(&config);
    let clock = sim.clock_handle();
    let start_rot = sim.physics.avatar_rotation().unwrap();

    sim.step();
    assert!(sim.avatar.signals.death);
    assert!(clock.read().paused);

    // No height snap, no tilt: the death tick mutated nothing.
    assert_eq!(
        sim.physics.avatar_position().unwrap(),
        Vector3::from(start)
    );
    assert!(sim.physics.avatar_rotation().unwrap().angle_to(&start_rot) < 1e-6);
}

#[test]
fn death_pauses_the_whole_simulation() {
    // One life: the first car hit drops it to zero, the second latches death.
    let config = scene(
        avatar_at([0.0, HOVER_Y, 0.0], 1, 5.0),
        vec![
            ground_slab(),
            ObjectConfig {
                tag: ObjectTag::Car,
                position: [0.5, HOVER_Y, 0.0],
                size: [2.0, 2.0, 2.0],
                rotation_deg: [0.0; 3],
                velocity: [50.0, 0.0, 0.0],
            },
            ObjectConfig {
                tag: ObjectTag::Car,
                position: [-30.0, HOVER_Y, 0.0],
                size: [2.0, 2.0, 2.0],
                rotation_deg: [0.0; 3],
                velocity: [50.0, 0.0, 0.0],
            },
        ],
    );
    let mut sim = Simulation::from_config(&config);
    let input = sim.input_sender();
    let clock = sim.clock_handle();

    sim.run_seconds(1.5);
    assert_eq!(sim.avatar.life(), 0);
    assert!(sim.avatar.signals.death);
    assert!(clock.read().paused);

    // Further input moves nothing and time stands still.
    let frozen_pos = sim.physics.avatar_position().unwrap();
    let frozen_rot = sim.physics.avatar_rotation().unwrap();
    let frozen_elapsed = clock.read().elapsed;
    input
        .send(InputSample {
            turn: 1.0,
            forward: 1.0,
            jump_pressed: true,
        })
        .unwrap();
    sim.run_seconds(1.0);
    assert_eq!(sim.physics.avatar_position().unwrap(), frozen_pos);
    assert_eq!(sim.physics.avatar_rotation().unwrap(), frozen_rot);
    assert_eq!(clock.read().elapsed, frozen_elapsed);
}

#[test]
fn standing_on_bridge_suspends_terrain_alignment() {
    // Spawn above the hover height while touching a bridge slab: with
    // alignment active the avatar would snap down to HOVER_Y on tick one.
    let config = scene(
        avatar_at([0.0, 7.0, 0.0], 3, 5.0),
        vec![
            ground_slab(),
            ObjectConfig {
                tag: ObjectTag::Bridge,
                position: [0.0, 6.5, 0.0],
                size: [4.0, 1.0, 4.0],
                rotation_deg: [0.0; 3],
                velocity: [0.0; 3],
            },
        ],
    );
    let mut sim = Simulation::from_config(&config);

    sim.step();
    assert!(sim.avatar.grounding.on_walkable_surface);
    let y = sim.physics.avatar_position().unwrap().y;
    assert!((y - 7.0).abs() < 0.1, "height snap must be suspended, y={}", y);
}

#[test]
fn terrain_alignment_snaps_height_and_tilts_to_slope() {
    // A 10-degree ramp as the only ground.
    let config = scene(
        avatar_at([0.0, HOVER_Y + 2.0, 0.0], 3, 5.0),
        vec![ObjectConfig {
            tag: ObjectTag::Ground,
            position: [0.0, -0.5, 0.0],
            size: [400.0, 1.0, 400.0],
            rotation_deg: [10.0, 0.0, 0.0],
            velocity: [0.0; 3],
        }],
    );
    let mut sim = Simulation::from_config(&config);

    sim.run_seconds(2.0);

    let pos = sim.physics.avatar_position().unwrap();
    let sampled = sim.physics.sample_height(pos.x, pos.z).unwrap();
    assert!((pos.y - (sampled + HOVER_Y)).abs() < 0.05);

    // Forward axis pitched along the slope, not level.
    let forward = sim.physics.avatar_rotation().unwrap() * Vector3::z();
    assert!(forward.y.abs() > 0.05, "forward should pitch with the ramp");
}

#[test]
fn river_while_on_bridge_is_harmless() {
    // Bridge slab and river volume overlap the avatar simultaneously.
    let config = scene(
        avatar_at([0.0, HOVER_Y, 0.0], 3, 2.0),
        vec![
            ground_slab(),
            ObjectConfig {
                tag: ObjectTag::Bridge,
                position: [0.0, HOVER_Y - 1.0, 0.0],
                size: [4.0, 1.0, 4.0],
                rotation_deg: [0.0; 3],
                velocity: [0.0; 3],
            },
            ObjectConfig {
                tag: ObjectTag::River,
                position: [0.0, HOVER_Y, 0.0],
                size: [20.0, 4.0, 20.0],
                rotation_deg: [0.0; 3],
                velocity: [0.0; 3],
            },
        ],
    );
    let mut sim = Simulation::from_config(&config);

    sim.run_seconds(0.5);
    assert_eq!(sim.avatar.life(), 3);
    assert!(!sim.avatar.damage.respawn_pending);
    assert!(!sim.avatar.signals.damage);
}

#[test]
fn replayed_collision_end_is_idempotent() {
    let config = scene(avatar_at([0.0, HOVER_Y, 0.0], 3, 5.0), vec![ground_slab()]);
    let mut sim = Simulation::from_config(&config);

    let end_event = ContactEvent {
        other_id: 99,
        tag: ObjectTag::Car,
        kind: ContactKind::Solid,
        phase: ContactPhase::Ended,
    };
    sim.avatar.on_contact_event(&end_event, 1.0);
    let once = (
        sim.avatar.life(),
        sim.avatar.damage.last_hazard_contact,
        sim.avatar.signals.damage,
    );
    sim.avatar.on_contact_event(&end_event, 1.0);
    let twice = (
        sim.avatar.life(),
        sim.avatar.damage.last_hazard_contact,
        sim.avatar.signals.damage,
    );
    assert_eq!(once, twice);
}
