//! Two-dimensional lattice gas driven by Monte Carlo dynamics.
//!
//! Sites hold 0 or 1 and neighboring particles attract. Two update rules are
//! provided: a particle-conserving exchange (Kawasaki) and a grand-canonical
//! flip (Glauber). The sampler and phase-diagram driver sweep temperature and
//! chemical potential or density to map the gas/liquid transition.

pub mod dynamics;
pub mod energy;
pub mod error;
pub mod lattice;
pub mod phase;
pub mod sampler;
pub mod simulation;

pub use dynamics::{Dynamics, Params, StepOutcome, StepStats};
pub use error::{Error, Result};
pub use lattice::{Coord, Lattice, Seeding, Snapshot};
pub use phase::{AxisRange, PhaseDiagram, SweepConfig, build_phase_diagram, build_phase_diagram_with};
pub use sampler::{Sample, SampleConfig, run_steps, run_until, sample_order_parameter};
pub use simulation::Simulation;
