use super::avatar::locomotion::build_motion_plan;
use super::Simulation;

/// Executes simulation phases for one tick.
/// Ordered to keep jump and contact handling deterministic:
/// input -> locomotion/jump -> scene movers -> physics -> contacts ->
/// terrain alignment -> respawn check -> clock accumulation.
pub(super) fn run_tick_phases(sim: &mut Simulation, dt: f32) {
    // Death is a process-wide pause: every time-driven phase stops, so no
    // further position or orientation mutation can occur.
    if sim.clock.read().paused {
        return;
    }

    let input = sim.drain_input();

    // Latch grounded jump intent first so the constraint mask applied below
    // already reflects the jump; an impulse against frozen translation axes
    // would be lost.
    let jumped = input.jump_pressed && sim.avatar.grounding.request_jump();

    let plan = build_motion_plan(
        input,
        sim.avatar.movement_speed,
        sim.avatar.grounding.jump_requested,
        dt,
    );
    sim.avatar.signals.forward_speed = plan.forward_signal;
    sim.apply_motion_plan(&plan);

    if jumped {
        let impulse = sim.avatar.jump_impulse;
        sim.physics.apply_avatar_jump_impulse(impulse);
    }

    // Kinematic hazards (cars) advance along their lanes.
    sim.advance_movers(dt);

    sim.physics.step(dt);

    // Contact lifecycle events feed the grounding and damage state machines.
    sim.dispatch_contacts();

    // A death latched by a contact freezes the pose at that event; the
    // remaining time-driven phases must not run.
    if sim.clock.read().paused {
        sim.tick += 1;
        return;
    }

    // Terrain-hugging posture, suspended while airborne or on a bridge.
    sim.align_to_terrain(dt);

    // Delayed teleport-to-start once a pending deadline passes.
    sim.run_respawn_check();

    // Death latched mid-tick already stops the clock.
    {
        let mut clock = sim.clock.write();
        if !clock.paused {
            clock.elapsed += dt;
        }
    }
    sim.tick += 1;
}
