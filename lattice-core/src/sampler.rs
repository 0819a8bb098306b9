use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dynamics::{Dynamics, Params, StepStats};
use crate::energy::energy_per_site;
use crate::error::Result;
use crate::lattice::{Lattice, Seeding};

/// Sweeps of equilibration per sample when none is configured.
pub const DEFAULT_SWEEPS_PER_SAMPLE: usize = 800;
/// Readings averaged into one sample when none is configured.
pub const DEFAULT_MEASUREMENTS: usize = 64;
/// Top of the output scale used for diagram levels.
pub const LEVEL_MAX: u8 = 255;

/// Executes `n` steps back to back.
pub fn run_steps<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    dynamics: Dynamics,
    params: &Params,
    n: usize,
    rng: &mut R,
) -> StepStats {
    let mut stats = StepStats::default();
    for _ in 0..n {
        stats.record(dynamics.step(lattice, params, rng));
    }
    stats
}

/// Like [`run_steps`] but checks `stop` before every step.
pub fn run_until<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    dynamics: Dynamics,
    params: &Params,
    n: usize,
    stop: &AtomicBool,
    rng: &mut R,
) -> StepStats {
    let mut stats = StepStats::default();
    for _ in 0..n {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        stats.record(dynamics.step(lattice, params, rng));
    }
    stats
}

/// Budget and lattice shape for one order-parameter sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleConfig {
    pub width: usize,
    pub height: usize,
    pub dynamics: Dynamics,
    /// Equilibration steps before the first reading.
    pub iterations: usize,
    /// Readings averaged, one per sweep after equilibration. At least one is
    /// always taken.
    pub measurements: usize,
}

impl SampleConfig {
    pub fn new(width: usize, height: usize, dynamics: Dynamics) -> Self {
        SampleConfig {
            width,
            height,
            dynamics,
            iterations: width * height * DEFAULT_SWEEPS_PER_SAMPLE,
            measurements: DEFAULT_MEASUREMENTS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub mean_occupancy: f64,
    pub energy_per_site: f64,
    pub stats: StepStats,
}

impl Sample {
    pub fn level(&self) -> u8 {
        to_level(self.mean_occupancy)
    }
}

/// Maps a mean occupancy in [0, 1] onto `0..=LEVEL_MAX`.
pub fn to_level(mean_occupancy: f64) -> u8 {
    (mean_occupancy.clamp(0.0, 1.0) * LEVEL_MAX as f64).round() as u8
}

/// Drives a fresh lattice toward steady state and reads its mean occupancy.
///
/// Flip samples start empty and use `control` as the chemical potential.
/// Exchange samples start randomly populated at density `control`. There
/// is no convergence check; near a transition the result is noisy.
pub fn sample_order_parameter<R: Rng + ?Sized>(
    config: &SampleConfig,
    temperature: f64,
    control: f64,
    rng: &mut R,
) -> Result<Sample> {
    let (seeding, params) = match config.dynamics {
        Dynamics::Flip => (Seeding::Empty, Params::new(temperature, control)),
        Dynamics::Exchange => (
            Seeding::Random { density: control },
            Params::new(temperature, 0.0),
        ),
    };
    let mut lattice = Lattice::seeded(config.width, config.height, seeding, rng)?;

    let mut stats = run_steps(&mut lattice, config.dynamics, &params, config.iterations, rng);

    let sweep = lattice.area();
    let readings = config.measurements.max(1);
    let mut occupancy = 0.0;
    let mut energy = 0.0;
    for i in 0..readings {
        if i > 0 {
            stats.merge(&run_steps(&mut lattice, config.dynamics, &params, sweep, rng));
        }
        occupancy += lattice.mean_occupancy();
        energy += energy_per_site(&lattice);
    }

    Ok(Sample {
        mean_occupancy: occupancy / readings as f64,
        energy_per_site: energy / readings as f64,
        stats,
    })
}
