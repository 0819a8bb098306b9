mod init;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use init::{InitPattern, build_lattice};
use lattice_core::energy::total_energy;
use lattice_core::{AxisRange, Dynamics, Params, SweepConfig, build_phase_diagram_with, run_steps};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Log every grid point and cancelled run
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sweep temperature and potential (or density) into a phase diagram
    Diagram(DiagramArgs),
    /// Record a single run frame by frame
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct DiagramArgs {
    /// Output JSON file for the finished diagram
    #[arg(long, default_value = "phase-diagram.json")]
    out: PathBuf,

    /// Read the whole sweep from a JSON file instead of the flags below
    #[arg(long)]
    config: Option<PathBuf>,

    /// Update rule: flip (potential axis) or exchange (density axis)
    #[arg(long, default_value = "flip")]
    dynamics: Dynamics,

    /// Grid width
    #[arg(long, default_value_t = 40)]
    width: usize,

    /// Grid height
    #[arg(long, default_value_t = 20)]
    height: usize,

    #[arg(long, default_value_t = 0.01)]
    t_min: f64,

    #[arg(long, default_value_t = 2.0)]
    t_max: f64,

    /// Lower bound of the potential (flip) or density (exchange) axis
    #[arg(long, default_value_t = -3.0, allow_hyphen_values = true)]
    control_min: f64,

    /// Upper bound of the potential (flip) or density (exchange) axis
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    control_max: f64,

    /// Ticks per axis
    #[arg(long, default_value_t = 10)]
    resolution: usize,

    /// Equilibration steps per grid point (default: 800 sweeps)
    #[arg(long)]
    iterations: Option<usize>,

    /// Readings averaged per grid point, one per sweep
    #[arg(long)]
    measurements: Option<usize>,

    /// Base RNG seed (reproducibility)
    #[arg(long, default_value_t = 123)]
    seed: u64,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Output directory
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value = "flip")]
    dynamics: Dynamics,

    #[arg(long, default_value_t = 40)]
    width: usize,

    #[arg(long, default_value_t = 20)]
    height: usize,

    /// Starting layout
    #[arg(long, value_enum, default_value_t = InitPattern::Empty)]
    init: InitPattern,

    /// Initial density for the random, exact, droplet and slab layouts
    #[arg(long, default_value_t = 0.3)]
    density: f64,

    #[arg(long, default_value_t = 0.5)]
    temperature: f64,

    /// Chemical potential (flip dynamics only)
    #[arg(long, default_value_t = -2.0, allow_hyphen_values = true)]
    potential: f64,

    /// Comma-separated temperatures, e.g. "2.0,1.0,0.3"; frames are split
    /// evenly across them in order. Overrides --temperature.
    #[arg(long)]
    schedule: Option<String>,

    /// Number of frames to record
    #[arg(long, default_value_t = 100)]
    frames: usize,

    /// Steps between frames (default: one sweep)
    #[arg(long)]
    steps_per_frame: Option<usize>,

    #[arg(long, default_value_t = 123)]
    seed: u64,
}

#[derive(Serialize)]
struct FrameRow {
    frame_idx: usize,
    step_idx: u64,

    temperature: f64,
    potential: f64,

    particles: usize,
    energy: f64,
    acceptance: f64,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Diagram(args) => run_diagram(args),
        Command::Run(args) => run_recorded(args),
    }
}

fn run_diagram(args: DiagramArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!("Reading sweep configuration from: {}", path.display());
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("Unable to read configuration file: {}", path.display()))?;
            serde_json::from_str::<SweepConfig>(&text).wrap_err("Failed to parse configuration file")?
        }
        None => SweepConfig {
            width: args.width,
            height: args.height,
            dynamics: args.dynamics,
            temperature: AxisRange::new(args.t_min, args.t_max),
            control: AxisRange::new(args.control_min, args.control_max),
            resolution: args.resolution,
            iterations_per_sample: args.iterations,
            measurements: args.measurements,
            seed: args.seed,
        },
    };
    config.validate().wrap_err("Invalid sweep configuration")?;

    let diagram = build_phase_diagram_with(&config, |done, total| {
        if done % config.resolution == 0 {
            info!("{done}/{total} grid points sampled");
        }
    })?;

    for row in &diagram.levels {
        println!("{row:?}");
    }

    let mut out = BufWriter::new(
        File::create(&args.out).wrap_err_with(|| format!("Unable to create {}", args.out.display()))?,
    );
    serde_json::to_writer_pretty(&mut out, &diagram)?;
    out.flush()?;

    info!("Wrote phase diagram to: {}", args.out.display());
    Ok(())
}

fn run_recorded(args: RunArgs) -> Result<()> {
    let schedule = match &args.schedule {
        Some(s) => parse_schedule(s)?,
        None => vec![args.temperature],
    };
    if args.frames == 0 {
        return Err(eyre!("frames must be > 0"));
    }

    fs::create_dir_all(&args.out)?;

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut lattice = build_lattice(&mut rng, args.width, args.height, args.init, args.density)
        .wrap_err("Unable to build initial lattice")?;
    let steps = args.steps_per_frame.unwrap_or(lattice.area());

    let mut frame_writer = BufWriter::new(File::create(args.out.join("frames.bin"))?);
    let mut meta_file = BufWriter::new(
        OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(args.out.join("frames.jsonl"))?,
    );

    info!(
        dynamics = args.dynamics.as_str(),
        init = args.init.as_str(),
        particles = lattice.particle_count(),
        "starting recorded run"
    );

    let mut step_idx: u64 = 0;
    for frame_idx in 0..args.frames {
        let stage = frame_idx * schedule.len() / args.frames;
        let params = Params::new(schedule[stage], args.potential);

        let stats = run_steps(&mut lattice, args.dynamics, &params, steps, &mut rng);
        step_idx += stats.total();

        frame_writer.write_all(lattice.cells())?;

        let row = FrameRow {
            frame_idx,
            step_idx,

            temperature: params.temperature,
            potential: params.potential,

            particles: lattice.particle_count(),
            energy: total_energy(&lattice),
            acceptance: stats.acceptance_rate(),
        };

        serde_json::to_writer(&mut meta_file, &row)?;
        meta_file.write_all(b"\n")?;
    }

    frame_writer.flush()?;
    meta_file.flush()?;

    println!("Wrote run to: {}", args.out.display());
    println!(
        "Frames: {} ({}x{} cells, {} steps per frame)",
        args.frames, args.width, args.height, steps
    );

    Ok(())
}

fn parse_schedule(s: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let p = part.trim();
        if p.is_empty() {
            continue;
        }
        let v: f64 = p
            .parse()
            .wrap_err_with(|| format!("Invalid temperature in schedule: '{p}'"))?;
        out.push(v);
    }
    if out.is_empty() {
        return Err(eyre!("schedule parsed to empty set"));
    }
    Ok(out)
}
