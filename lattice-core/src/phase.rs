//! Phase-diagram sweeps over a (temperature, control) grid.
//!
//! The control axis is the chemical potential for flip dynamics and the
//! initial density for exchange dynamics. Rows run from the largest control
//! value down, columns from the lowest temperature up, so the matrix reads
//! like a plot with the control axis pointing upward.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dynamics::{Dynamics, StepStats};
use crate::error::{Error, Result};
use crate::sampler::{DEFAULT_MEASUREMENTS, DEFAULT_SWEEPS_PER_SAMPLE, SampleConfig, sample_order_parameter};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        AxisRange { min, max }
    }

    fn validate(&self, name: &'static str) -> Result<()> {
        if self.max < self.min || self.min.is_nan() || self.max.is_nan() {
            return Err(Error::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// `resolution` evenly spaced ticks starting at `min`; `max` itself is
    /// not reached.
    pub fn ascending(&self, resolution: usize) -> Vec<f64> {
        let step = (self.max - self.min) / resolution as f64;
        (0..resolution).map(|i| self.min + i as f64 * step).collect()
    }

    /// `resolution` evenly spaced ticks starting at `max` and walking down.
    pub fn descending(&self, resolution: usize) -> Vec<f64> {
        let step = (self.max - self.min) / resolution as f64;
        (0..resolution).map(|j| self.max - j as f64 * step).collect()
    }
}

/// Everything needed to reproduce one phase diagram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub width: usize,
    pub height: usize,
    pub dynamics: Dynamics,
    pub temperature: AxisRange,
    /// Chemical potential (flip) or initial density (exchange).
    pub control: AxisRange,
    pub resolution: usize,
    #[serde(default)]
    pub iterations_per_sample: Option<usize>,
    #[serde(default)]
    pub measurements: Option<usize>,
    #[serde(default)]
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            width: 40,
            height: 20,
            dynamics: Dynamics::Flip,
            temperature: AxisRange::new(0.01, 2.0),
            control: AxisRange::new(-3.0, -1.0),
            resolution: 10,
            iterations_per_sample: None,
            measurements: None,
            seed: 123,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.resolution == 0 {
            return Err(Error::InvalidResolution);
        }
        self.temperature.validate("temperature")?;
        match self.dynamics {
            Dynamics::Flip => self.control.validate("potential")?,
            Dynamics::Exchange => {
                self.control.validate("density")?;
                for density in [self.control.min, self.control.max] {
                    if !(0.0..=1.0).contains(&density) {
                        return Err(Error::InvalidDensity(density));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn sample_config(&self) -> SampleConfig {
        SampleConfig {
            width: self.width,
            height: self.height,
            dynamics: self.dynamics,
            iterations: self
                .iterations_per_sample
                .unwrap_or(self.width * self.height * DEFAULT_SWEEPS_PER_SAMPLE),
            measurements: self.measurements.unwrap_or(DEFAULT_MEASUREMENTS),
        }
    }

    /// Deterministic per-point seed, independent of sweep order.
    pub fn point_seed(&self, index: usize) -> u64 {
        self.seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// A finished sweep. `levels[j][i]` belongs to `controls[j]` and
/// `temperatures[i]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseDiagram {
    pub dynamics: Dynamics,
    pub temperatures: Vec<f64>,
    pub controls: Vec<f64>,
    /// Mean occupancy scaled to 0..=255.
    pub levels: Vec<Vec<u8>>,
    pub energy_per_site: Vec<Vec<f64>>,
    pub stats: StepStats,
}

impl PhaseDiagram {
    pub fn resolution(&self) -> usize {
        self.temperatures.len()
    }

    /// Row-major copy of `levels`, for consumers that want a flat buffer.
    pub fn flat_levels(&self) -> Vec<u8> {
        self.levels.iter().flatten().copied().collect()
    }
}

pub fn build_phase_diagram(config: &SweepConfig) -> Result<PhaseDiagram> {
    build_phase_diagram_with(config, |_, _| {})
}

/// Runs the sweep, calling `progress(done, total)` after every grid point.
pub fn build_phase_diagram_with<F>(config: &SweepConfig, mut progress: F) -> Result<PhaseDiagram>
where
    F: FnMut(usize, usize),
{
    config.validate()?;

    let res = config.resolution;
    let temperatures = config.temperature.ascending(res);
    let controls = config.control.descending(res);
    let sample_config = config.sample_config();
    let total = res * res;

    info!(
        dynamics = config.dynamics.as_str(),
        width = config.width,
        height = config.height,
        resolution = res,
        iterations = sample_config.iterations,
        "starting phase diagram sweep"
    );

    let mut levels = Vec::with_capacity(res);
    let mut energy = Vec::with_capacity(res);
    let mut stats = StepStats::default();

    for (j, &control) in controls.iter().enumerate() {
        let mut level_row = Vec::with_capacity(res);
        let mut energy_row = Vec::with_capacity(res);
        for (i, &temperature) in temperatures.iter().enumerate() {
            let index = j * res + i;
            let mut rng = ChaCha8Rng::seed_from_u64(config.point_seed(index));
            let sample = sample_order_parameter(&sample_config, temperature, control, &mut rng)?;

            debug!(
                temperature,
                control,
                mean_occupancy = sample.mean_occupancy,
                acceptance = sample.stats.acceptance_rate(),
                "sampled grid point"
            );

            level_row.push(sample.level());
            energy_row.push(sample.energy_per_site);
            stats.merge(&sample.stats);
            progress(index + 1, total);
        }
        levels.push(level_row);
        energy.push(energy_row);
    }

    info!(points = total, accepted = stats.accepted, "phase diagram sweep finished");

    Ok(PhaseDiagram {
        dynamics: config.dynamics,
        temperatures,
        controls,
        levels,
        energy_per_site: energy,
        stats,
    })
}
