use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sands_core::{EngineConfig, MaterialId, Scenario, SimulationMode, Simulator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Automaton,
    Field,
    Both,
}

impl From<Mode> for SimulationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Automaton => SimulationMode::Automaton,
            Mode::Field => SimulationMode::Field,
            Mode::Both => SimulationMode::Both,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Layout {
    Empty,
    Boxed,
    Floor,
    Sand,
    Water,
    Pile,
}

/// Falling-sand demo driven by a simulated display clock
#[derive(Parser, Debug)]
#[command(name = "sands-demo")]
#[command(about = "Headless falling-sand simulation demo", long_about = None)]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 48)]
    width: u32,

    /// Grid height in cells
    #[arg(long, default_value_t = 24)]
    height: u32,

    /// Which layers run each step
    #[arg(short, long, value_enum, default_value_t = Mode::Both)]
    mode: Mode,

    /// Initial layout
    #[arg(short, long, value_enum, default_value_t = Layout::Pile)]
    layout: Layout,

    /// Fill fraction for the sand and water layouts
    #[arg(long, default_value_t = 0.3)]
    density: f32,

    /// RNG seed for layouts and display jitter
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Simulation steps per second
    #[arg(short, long, default_value_t = 60.0)]
    fps: f64,

    /// Display refresh rate in Hz (drives the simulated clock)
    #[arg(long, default_value_t = 144.0)]
    display_hz: f64,

    /// Simulated run time in seconds
    #[arg(short, long, default_value_t = 5.0)]
    duration: f64,

    /// Print the grid every N steps (0 = only at the end)
    #[arg(short, long, default_value_t = 60)]
    report_interval: u64,

    /// Push the field with a force burst once per simulated second
    #[arg(long)]
    bursts: bool,

    /// Pour sand from the top centre while running
    #[arg(long)]
    pour: bool,
}

/// Catch-up cap so a stalled display doesn't trigger a burst of steps
const MAX_STEPS_PER_FRAME: u32 = 4;

fn scenario(args: &Args) -> Scenario {
    match args.layout {
        Layout::Empty => Scenario::Empty,
        Layout::Boxed => Scenario::Boxed,
        Layout::Floor => Scenario::Floor,
        Layout::Sand => Scenario::Scatter {
            material: MaterialId::Sand,
            density: args.density,
            seed: args.seed,
        },
        Layout::Water => Scenario::Scatter {
            material: MaterialId::Water,
            density: args.density,
            seed: args.seed,
        },
        Layout::Pile => Scenario::SandPile,
    }
}

fn print_counts(sim: &Simulator) {
    let grid = sim.grid();
    let counts: Vec<String> = MaterialId::palette()
        .iter()
        .map(|m| format!("{}={}", m.name, grid.count(m.id)))
        .collect();
    println!("  cells: {}", counts.join(" "));
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!("=== Falling Sand Demo ===\n");

    let config = EngineConfig::for_mode(args.mode.into());
    let mut sim = match Simulator::with_config(args.width, args.height, config) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("Failed to create simulation: {err}");
            std::process::exit(1);
        }
    };
    match sim.seed(&scenario(&args)) {
        Ok(cells) => println!("Seeded {:?} layout ({cells} cells)", args.layout),
        Err(err) => {
            eprintln!("Failed to seed layout: {err}");
            std::process::exit(1);
        }
    }
    println!(
        "{}x{} grid, {:?} mode, {:.0} steps/s against a {:.0} Hz display\n",
        args.width, args.height, args.mode, args.fps, args.display_hz
    );

    let step_dt = 1.0 / args.fps.max(1.0);
    let frame_dt = 1.0 / args.display_hz.max(1.0);
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut clock = 0.0;
    let mut accumulator = 0.0;
    let mut frame: u64 = 0;
    let mut next_burst = 1.0;
    let mut dropped = 0_u64;

    while clock < args.duration {
        // Display frames jitter by up to 10%
        let dt = frame_dt * rng.random_range(0.9..1.1);
        clock += dt;
        accumulator += dt;
        frame += 1;

        if args.bursts && clock >= next_burst {
            next_burst += 1.0;
            let x = rng.random_range(0.2..0.8);
            let magnitude = if rng.random_bool(0.5) { 1000.0 } else { -10000.0 };
            match sim.apply_force(x, 0.3, magnitude, 6.0) {
                Ok(()) => info!("Force burst {:.0} at x={:.2}", magnitude, x),
                Err(err) => warn!("Force burst rejected: {}", err),
            }
        }

        let mut steps = 0;
        while accumulator >= step_dt {
            if steps == MAX_STEPS_PER_FRAME {
                dropped += 1;
                accumulator = 0.0;
                break;
            }
            if args.pour {
                if let Err(err) = sim.paint(0.5, 0.97, MaterialId::Sand) {
                    warn!("Pour rejected: {}", err);
                }
            }
            let report = sim.step(frame, true);
            accumulator -= step_dt;
            steps += 1;

            if args.report_interval > 0 && report.step % args.report_interval == 0 {
                println!(
                    "[t={:5.2}s] step {:5}: moved {:4}, edits {:3}",
                    clock, report.step, report.moved_cells, report.edits_applied
                );
                print_counts(&sim);
                if let Some(field) = sim.force_field() {
                    println!("  max force: {:.2}", field.max_magnitude());
                }
                println!("{}", sim.grid());
            }
        }
        if steps == 0 {
            // Display ran faster than the simulation; keep the frame index current
            sim.step(frame, false);
        }
    }

    println!("=== Final State ===");
    println!("{}", sim.grid());
    print_counts(&sim);
    let timer = sim.frame_timer();
    println!(
        "Steps: {} over {} display frames ({dropped} catch-up stalls)",
        sim.step_count(),
        frame
    );
    println!(
        "Step time: last {:.3} ms, average {:.3} ms ({} samples)",
        timer.last_frame_time_ms(),
        timer.average_frame_time_ms(),
        timer.samples()
    );
}
