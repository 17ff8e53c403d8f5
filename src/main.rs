//! Crossway CLI - init and run scenes from anywhere

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crossway::config::SceneConfig;
use crossway::game::avatar::locomotion::InputSample;
use crossway::game::constants::physics as phys_consts;
use crossway::game::Simulation;

#[derive(Parser)]
#[command(name = "crossway")]
#[command(about = "Headless avatar-controller simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample scene.toml
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Run a scene headless with scripted input
    Run {
        /// Path to scene.toml, or a directory containing one
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Simulated seconds to run
        #[arg(short, long, default_value = "30.0")]
        seconds: f32,
        /// Constant forward axis fed every tick
        #[arg(long, default_value = "1.0")]
        forward: f32,
        /// Constant turn axis fed every tick
        #[arg(long, default_value = "0.0")]
        turn: f32,
        /// Request a jump every this many simulated seconds
        #[arg(long)]
        jump_every: Option<f32>,
    },
}

const SAMPLE_SCENE: &str = r#"[avatar]
start_position = [0.0, 16.25, -22.9]
movement_speed = 5.0
life = 3
respawn_cooldown = 5.0

[[objects]]
tag = "ground"
position = [0.0, 10.0, 0.0]
size = [200.0, 1.0, 200.0]

[[objects]]
tag = "car"
position = [40.0, 17.0, -10.0]
size = [2.0, 1.5, 4.0]
velocity = [-6.0, 0.0, 0.0]

[[objects]]
tag = "river"
position = [0.0, 15.5, 20.0]
size = [200.0, 3.0, 8.0]

[[objects]]
tag = "bridge"
position = [5.0, 16.5, 20.0]
size = [4.0, 0.5, 10.0]

[[objects]]
tag = "barrier"
position = [-10.0, 17.0, 0.0]
size = [1.0, 2.0, 20.0]
"#;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init { path } => init_scene(&path),
        Commands::Run {
            path,
            seconds,
            forward,
            turn,
            jump_every,
        } => run_scene(&path, seconds, forward, turn, jump_every),
    }
}

fn init_scene(path: &PathBuf) -> ExitCode {
    let scene_path = path.join("scene.toml");
    if scene_path.exists() {
        eprintln!("{} already exists", scene_path.display());
        return ExitCode::FAILURE;
    }
    if let Err(e) = std::fs::create_dir_all(path) {
        eprintln!("Failed to create {}: {}", path.display(), e);
        return ExitCode::FAILURE;
    }
    if let Err(e) = std::fs::write(&scene_path, SAMPLE_SCENE) {
        eprintln!("Failed to write {}: {}", scene_path.display(), e);
        return ExitCode::FAILURE;
    }
    println!("Wrote {}", scene_path.display());
    ExitCode::SUCCESS
}

fn run_scene(
    path: &PathBuf,
    seconds: f32,
    forward: f32,
    turn: f32,
    jump_every: Option<f32>,
) -> ExitCode {
    let scene_path = if path.is_dir() {
        path.join("scene.toml")
    } else {
        path.clone()
    };
    let config = match SceneConfig::from_file(&scene_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut sim = Simulation::from_config(&config);
    let input = sim.input_sender();
    let clock = sim.clock_handle();

    let ticks = (seconds / phys_consts::TIMESTEP).round() as u64;
    let jump_interval_ticks =
        jump_every.map(|s| ((s / phys_consts::TIMESTEP).round() as u64).max(1));

    let mut last_life = sim.avatar.life();
    let mut last_damage = false;

    println!(
        "Running {} for {:.1}s (life={})",
        scene_path.display(),
        seconds,
        last_life
    );

    for tick in 0..ticks {
        let jump_pressed = jump_interval_ticks
            .map(|interval| tick % interval == 0 && tick > 0)
            .unwrap_or(false);
        let _ = input.send(InputSample {
            turn,
            forward,
            jump_pressed,
        });

        sim.step();

        let elapsed = clock.read().elapsed;
        let life = sim.avatar.life();
        if life != last_life {
            println!("[t={:6.2}s] life {} -> {}", elapsed, last_life, life);
            last_life = life;
        }
        if sim.avatar.signals.damage != last_damage {
            last_damage = sim.avatar.signals.damage;
            println!("[t={:6.2}s] damage signal {}", elapsed, last_damage);
        }
        if clock.read().paused {
            println!("[t={:6.2}s] death signal raised, simulation paused", elapsed);
            break;
        }
    }

    if let Some(position) = sim.physics.avatar_position() {
        println!(
            "Final position: ({:.2}, {:.2}, {:.2}) after {} ticks",
            position.x, position.y, position.z, sim.tick
        );
    }
    ExitCode::SUCCESS
}
