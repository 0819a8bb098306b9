use lattice_core::{
    AxisRange, Coord, Dynamics, Params, Seeding, Simulation, SweepConfig, build_phase_diagram,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct LiveLattice {
    inner: Simulation<ChaCha8Rng>,
    params: Params,
    density: f64,
}

#[wasm_bindgen]
impl LiveLattice {
    /// `dynamics` is "flip" or "exchange". Flip runs start empty; exchange
    /// runs start randomly populated at `density`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: usize,
        height: usize,
        dynamics: &str,
        density: f64,
        seed: u64,
    ) -> Result<LiveLattice, JsValue> {
        let dynamics: Dynamics = dynamics.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let inner = Simulation::new(
            width,
            height,
            dynamics,
            seeding_for(dynamics, density),
            ChaCha8Rng::seed_from_u64(seed),
        )
        .map_err(to_js)?;
        Ok(LiveLattice {
            inner,
            params: Params::new(0.5, -2.0),
            density,
        })
    }

    // Parameters
    pub fn set_temperature(&mut self, t: f64) { self.params.temperature = t; }
    pub fn set_potential(&mut self, mu: f64) { self.params.potential = mu; }

    pub fn temperature(&self) -> f64 { self.params.temperature }
    pub fn potential(&self) -> f64 { self.params.potential }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        let seeding = seeding_for(self.inner.dynamics(), self.density);
        self.inner.reset(seeding).map_err(to_js)
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<u8, JsValue> {
        self.inner.toggle_cell(Coord::new(row, col)).map_err(to_js)
    }

    pub fn width(&self) -> usize { self.inner.lattice().width() }
    pub fn height(&self) -> usize { self.inner.lattice().height() }
    pub fn particle_count(&self) -> usize { self.inner.particle_count() }
    pub fn total_energy(&self) -> f64 { self.inner.total_energy() }

    // Copy-based JS access (reliable)
    pub fn cells(&self) -> Vec<u8> {
        self.inner.snapshot().cells
    }

    // Step + timing (WASM-only)
    pub fn step_batch(&mut self, n: usize) -> StepInfo {
        let t0 = now_ms();
        let stats = self.inner.run_steps(&self.params, n);
        let t1 = now_ms();
        StepInfo {
            steps: stats.total() as u32,
            acceptance: stats.acceptance_rate(),
            compute_ms: t1 - t0,
        }
    }

    /// One sweep: as many steps as there are sites.
    pub fn step_sweep(&mut self) -> StepInfo {
        let n = self.inner.lattice().area();
        self.step_batch(n)
    }
}

#[wasm_bindgen]
pub struct StepInfo {
    steps: u32,
    acceptance: f64,
    compute_ms: f64,
}

#[wasm_bindgen]
impl StepInfo {
    pub fn steps(&self) -> u32 { self.steps }
    pub fn acceptance(&self) -> f64 { self.acceptance }
    pub fn compute_ms(&self) -> f64 { self.compute_ms }
}

/// Row-major `resolution * resolution` levels for the heatmap widget.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn phase_diagram(
    width: usize,
    height: usize,
    dynamics: &str,
    t_min: f64,
    t_max: f64,
    control_min: f64,
    control_max: f64,
    resolution: usize,
    seed: u64,
) -> Result<Vec<u8>, JsValue> {
    let dynamics: Dynamics = dynamics.parse().map_err(|e: String| JsValue::from_str(&e))?;
    let config = SweepConfig {
        width,
        height,
        dynamics,
        temperature: AxisRange::new(t_min, t_max),
        control: AxisRange::new(control_min, control_max),
        resolution,
        iterations_per_sample: None,
        measurements: None,
        seed,
    };
    let diagram = build_phase_diagram(&config).map_err(to_js)?;
    Ok(diagram.flat_levels())
}

fn seeding_for(dynamics: Dynamics, density: f64) -> Seeding {
    match dynamics {
        Dynamics::Flip => Seeding::Empty,
        Dynamics::Exchange => Seeding::Random { density },
    }
}

fn to_js(e: lattice_core::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
