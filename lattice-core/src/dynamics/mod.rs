//! Monte Carlo update rules.
//!
//! Both rules mutate a [`Lattice`] in place and read their parameters fresh
//! on every call, so a caller may retune temperature or potential between
//! any two steps.

pub mod exchange;
pub mod flip;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::lattice::Lattice;

/// Externally owned thermodynamic knobs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Temperature in units of the bond energy. Steps at `T <= 0` are skipped.
    pub temperature: f64,
    /// Chemical potential; only read by [`Dynamics::Flip`].
    #[serde(default)]
    pub potential: f64,
}

impl Params {
    pub fn new(temperature: f64, potential: f64) -> Self {
        Params {
            temperature,
            potential,
        }
    }
}

/// Selects the update rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dynamics {
    /// Kawasaki particle exchange; conserves the particle count.
    Exchange,
    /// Glauber single-site flip in the grand-canonical ensemble.
    Flip,
}

impl Dynamics {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dynamics::Exchange => "exchange",
            Dynamics::Flip => "flip",
        }
    }

    /// One proposal/accept/reject cycle.
    pub fn step<R: Rng + ?Sized>(
        self,
        lattice: &mut Lattice,
        params: &Params,
        rng: &mut R,
    ) -> StepOutcome {
        match self {
            Dynamics::Exchange => exchange::step(lattice, params.temperature, rng),
            Dynamics::Flip => flip::step(lattice, params.temperature, params.potential, rng),
        }
    }
}

impl std::str::FromStr for Dynamics {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exchange" | "kawasaki" => Ok(Dynamics::Exchange),
            "flip" | "glauber" => Ok(Dynamics::Flip),
            other => Err(format!("unknown dynamics '{other}' (expected exchange or flip)")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Accepted,
    Rejected,
    /// No proposal was evaluated: `T <= 0`, or an exchange drew two sites
    /// with equal occupancy.
    Skipped,
}

/// Tally of step outcomes over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStats {
    pub accepted: u64,
    pub rejected: u64,
    pub skipped: u64,
}

impl StepStats {
    pub fn record(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Accepted => self.accepted += 1,
            StepOutcome::Rejected => self.rejected += 1,
            StepOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn merge(&mut self, other: &StepStats) {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.skipped += other.skipped;
    }

    pub fn total(&self) -> u64 {
        self.accepted + self.rejected + self.skipped
    }

    /// Fraction of evaluated proposals that were accepted; 0 if none were.
    pub fn acceptance_rate(&self) -> f64 {
        let evaluated = self.accepted + self.rejected;
        if evaluated == 0 {
            0.0
        } else {
            self.accepted as f64 / evaluated as f64
        }
    }
}
