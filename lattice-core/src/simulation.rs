use std::sync::atomic::AtomicBool;

use rand::Rng;
use tracing::debug;

use crate::dynamics::{Dynamics, Params, StepOutcome, StepStats};
use crate::energy::total_energy;
use crate::error::Result;
use crate::lattice::{Coord, Lattice, Seeding, Snapshot};
use crate::sampler::{run_steps, run_until};

/// A live run: one lattice, one update rule, one random source.
///
/// Parameters are not stored here. The caller owns them and passes them to
/// every step, so they can change between any two calls.
#[derive(Debug, Clone)]
pub struct Simulation<R> {
    lattice: Lattice,
    dynamics: Dynamics,
    rng: R,
    stats: StepStats,
}

impl<R: Rng> Simulation<R> {
    pub fn new(
        width: usize,
        height: usize,
        dynamics: Dynamics,
        seeding: Seeding,
        mut rng: R,
    ) -> Result<Simulation<R>> {
        let lattice = Lattice::seeded(width, height, seeding, &mut rng)?;
        Ok(Simulation {
            lattice,
            dynamics,
            rng,
            stats: StepStats::default(),
        })
    }

    pub fn step(&mut self, params: &Params) -> StepOutcome {
        let outcome = self.dynamics.step(&mut self.lattice, params, &mut self.rng);
        self.stats.record(outcome);
        outcome
    }

    pub fn run_steps(&mut self, params: &Params, n: usize) -> StepStats {
        let stats = run_steps(&mut self.lattice, self.dynamics, params, n, &mut self.rng);
        self.stats.merge(&stats);
        stats
    }

    /// Runs up to `n` steps, stopping early once `stop` is raised.
    pub fn run_until(&mut self, params: &Params, n: usize, stop: &AtomicBool) -> StepStats {
        let stats = run_until(&mut self.lattice, self.dynamics, params, n, stop, &mut self.rng);
        if stats.total() < n as u64 {
            debug!(completed = stats.total(), requested = n, "live run cancelled");
        }
        self.stats.merge(&stats);
        stats
    }

    /// Clears the lattice and repopulates it, keeping the dynamics.
    pub fn reset(&mut self, seeding: Seeding) -> Result<()> {
        self.lattice.reseed(seeding, &mut self.rng)?;
        self.stats = StepStats::default();
        Ok(())
    }

    pub fn set_dynamics(&mut self, dynamics: Dynamics) {
        self.dynamics = dynamics;
    }

    /// Manual edit outside the stochastic process.
    pub fn toggle_cell(&mut self, coord: Coord) -> Result<u8> {
        self.lattice.toggle(coord)
    }

    // ---- Accessors ----
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn dynamics(&self) -> Dynamics {
        self.dynamics
    }

    pub fn stats(&self) -> &StepStats {
        &self.stats
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lattice.snapshot()
    }

    pub fn particle_count(&self) -> usize {
        self.lattice.particle_count()
    }

    pub fn total_energy(&self) -> f64 {
        total_energy(&self.lattice)
    }
}
