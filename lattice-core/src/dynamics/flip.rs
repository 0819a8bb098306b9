//! Glauber flip dynamics in the grand-canonical ensemble.
//!
//! A single site is proposed to change state. The energy carries the site's
//! bond term plus `-mu * N`, so the particle count enters the comparison and
//! is updated only when the flip is committed.

use rand::Rng;

use super::StepOutcome;
use crate::energy::open_bonds_at;
use crate::error::Result;
use crate::lattice::{Coord, Lattice};

pub fn step<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    temperature: f64,
    potential: f64,
    rng: &mut R,
) -> StepOutcome {
    if temperature <= 0.0 {
        return StepOutcome::Skipped;
    }
    let c = lattice.random_coord(rng);
    flip_site(lattice, c, temperature, potential, rng)
}

/// Evaluates flipping a chosen site instead of a random one.
pub fn propose_flip<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    c: Coord,
    temperature: f64,
    potential: f64,
    rng: &mut R,
) -> Result<StepOutcome> {
    lattice.get(c)?;
    if temperature <= 0.0 {
        return Ok(StepOutcome::Skipped);
    }
    Ok(flip_site(lattice, c, temperature, potential, rng))
}

fn flip_site<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    c: Coord,
    temperature: f64,
    potential: f64,
    rng: &mut R,
) -> StepOutcome {
    let s0 = lattice.at(c);
    // neighbors are untouched by the flip, so one count serves both states
    let n = open_bonds_at(lattice, c) as f64;
    let count = lattice.particle_count() as f64;

    let s1 = 1 - s0;
    let proposed_count = if s1 == 1 { count + 1.0 } else { count - 1.0 };

    let e0 = -(s0 as f64 * n) - potential * count;
    let e1 = -(s1 as f64 * n) - potential * proposed_count;

    if metropolis(e1 - e0, temperature, rng) {
        lattice.assign(c, s1);
        StepOutcome::Accepted
    } else {
        StepOutcome::Rejected
    }
}

/// Accepts downhill moves outright, uphill ones with `exp(-delta / T)`.
pub fn metropolis<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    if delta < 0.0 {
        return true;
    }
    rng.gen_range(0.0..1.0) <= (-delta / temperature).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::grand_energy;
    use crate::lattice::Seeding;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn particle_count_tracks_lattice() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut lattice = Lattice::new(15, 10).unwrap();
        for i in 0..20_000 {
            let mu = if i < 10_000 { -0.5 } else { -3.0 };
            step(&mut lattice, 0.8, mu, &mut rng);
            assert_eq!(lattice.particle_count(), lattice.count_occupied());
        }
    }

    #[test]
    fn non_positive_temperature_is_a_no_op() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut lattice = Lattice::seeded(6, 6, Seeding::Random { density: 0.5 }, &mut rng).unwrap();
        let before = lattice.clone();
        for _ in 0..200 {
            assert_eq!(step(&mut lattice, 0.0, 1.0, &mut rng), StepOutcome::Skipped);
            assert_eq!(step(&mut lattice, -0.5, 1.0, &mut rng), StepOutcome::Skipped);
        }
        assert_eq!(lattice, before);
    }

    #[test]
    fn cold_lattice_never_raises_grand_energy() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mu = -1.7;
        let mut lattice = Lattice::seeded(12, 12, Seeding::Random { density: 0.5 }, &mut rng).unwrap();
        let mut energy = grand_energy(&lattice, mu);
        for _ in 0..20_000 {
            if step(&mut lattice, 1e-9, mu, &mut rng) == StepOutcome::Accepted {
                let next = grand_energy(&lattice, mu);
                assert!(next <= energy, "grand energy rose from {energy} to {next}");
                energy = next;
            }
        }
    }

    #[test]
    fn hot_lattice_accepts_nearly_everything() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut lattice = Lattice::seeded(10, 10, Seeding::Random { density: 0.5 }, &mut rng).unwrap();
        let trials = 10_000;
        let mut accepted = 0;
        for _ in 0..trials {
            if step(&mut lattice, 1e12, -2.0, &mut rng) == StepOutcome::Accepted {
                accepted += 1;
            }
        }
        assert!(accepted as f64 / trials as f64 > 0.999);
    }

    #[test]
    fn strongly_negative_potential_empties_the_lattice() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let mut lattice = Lattice::seeded(10, 10, Seeding::Full, &mut rng).unwrap();
        for _ in 0..20_000 {
            step(&mut lattice, 0.1, -6.0, &mut rng);
        }
        assert_eq!(lattice.particle_count(), 0);
    }

    #[test]
    fn flip_energy_matches_grand_energy_difference() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let mu = -1.2;
        let mut lattice = Lattice::seeded(5, 5, Seeding::Random { density: 0.5 }, &mut rng).unwrap();
        let c = Coord::new(2, 3);
        let before = grand_energy(&lattice, mu);
        let s0 = lattice.at(c) as f64;
        let n = open_bonds_at(&lattice, c) as f64;
        // at T -> inf every proposal passes, so the flip is always applied
        assert_eq!(propose_flip(&mut lattice, c, 1e300, mu, &mut rng), Ok(StepOutcome::Accepted));
        let after = grand_energy(&lattice, mu);
        let sign = 1.0 - 2.0 * s0;
        assert!((after - before - (-(sign * n) - mu * sign)).abs() < 1e-12);
    }

    #[test]
    fn chosen_site_must_be_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut lattice = Lattice::new(4, 4).unwrap();
        assert!(propose_flip(&mut lattice, Coord::new(4, 0), 1.0, 0.0, &mut rng).is_err());
        assert_eq!(lattice.particle_count(), 0);
    }
}
