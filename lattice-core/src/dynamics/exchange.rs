//! Kawasaki exchange dynamics.
//!
//! Two sites are drawn independently; when exactly one holds a particle the
//! pair is swapped and the swap kept with the logistic probability
//! `q / (1 + q)`, `q = exp((e0 - e1) / T)`. A swap moves a particle, never
//! creates or destroys one, so the particle count is conserved.

use rand::Rng;

use super::StepOutcome;
use crate::energy::bonds_at;
use crate::error::Result;
use crate::lattice::{Coord, Lattice};

pub fn step<R: Rng + ?Sized>(lattice: &mut Lattice, temperature: f64, rng: &mut R) -> StepOutcome {
    if temperature <= 0.0 {
        return StepOutcome::Skipped;
    }
    let c1 = lattice.random_coord(rng);
    let c2 = lattice.random_coord(rng);
    swap_sites(lattice, c1, c2, temperature, rng)
}

/// Evaluates swapping a chosen pair instead of a random one.
pub fn propose_swap<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    c1: Coord,
    c2: Coord,
    temperature: f64,
    rng: &mut R,
) -> Result<StepOutcome> {
    lattice.get(c1)?;
    lattice.get(c2)?;
    Ok(swap_sites(lattice, c1, c2, temperature, rng))
}

fn swap_sites<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    c1: Coord,
    c2: Coord,
    temperature: f64,
    rng: &mut R,
) -> StepOutcome {
    if temperature <= 0.0 || lattice.at(c1) == lattice.at(c2) {
        return StepOutcome::Skipped;
    }

    let e0 = pair_energy(lattice, c1, c2);
    lattice.swap(c1, c2);
    let e1 = pair_energy(lattice, c1, c2);

    let threshold = acceptance_threshold(e0, e1, temperature);
    if rng.gen_range(0.0..1.0) <= threshold {
        StepOutcome::Accepted
    } else {
        lattice.swap(c1, c2);
        StepOutcome::Rejected
    }
}

/// `q / (1 + q)` with `q = exp((e0 - e1) / T)`, written as a logistic so a
/// large energy drop saturates at 1 instead of overflowing to `inf / inf`.
pub fn acceptance_threshold(e0: f64, e1: f64, temperature: f64) -> f64 {
    1.0 / (1.0 + ((e1 - e0) / temperature).exp())
}

fn pair_energy(lattice: &Lattice, c1: Coord, c2: Coord) -> f64 {
    -((bonds_at(lattice, c1) + bonds_at(lattice, c2)) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::total_energy;
    use crate::lattice::Seeding;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn threshold_is_half_for_equal_energies() {
        assert_eq!(acceptance_threshold(0.0, 0.0, 0.3), 0.5);
        assert_eq!(acceptance_threshold(-2.0, -2.0, 7.0), 0.5);
    }

    #[test]
    fn threshold_saturates_without_nan() {
        let down = acceptance_threshold(0.0, -4.0, 1e-6);
        let up = acceptance_threshold(-4.0, 0.0, 1e-6);
        assert_eq!(down, 1.0);
        assert_eq!(up, 0.0);
        assert!(acceptance_threshold(0.0, -1.0, f64::MIN_POSITIVE).is_finite());
    }

    #[test]
    fn non_positive_temperature_is_a_no_op() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut lattice = Lattice::seeded(8, 8, Seeding::Random { density: 0.5 }, &mut rng).unwrap();
        let before = lattice.clone();
        for t in [0.0, -1.0] {
            for _ in 0..100 {
                assert_eq!(step(&mut lattice, t, &mut rng), StepOutcome::Skipped);
            }
        }
        assert_eq!(lattice, before);
    }

    #[test]
    fn equal_sites_are_skipped() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut lattice = Lattice::new(3, 1).unwrap();
        let c = Coord::new(0, 1);
        assert_eq!(propose_swap(&mut lattice, c, c, 1.0, &mut rng), Ok(StepOutcome::Skipped));
        assert_eq!(
            propose_swap(&mut lattice, Coord::new(0, 0), Coord::new(0, 2), 1.0, &mut rng),
            Ok(StepOutcome::Skipped)
        );
    }

    #[test]
    fn chosen_pair_must_be_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut lattice = Lattice::new(3, 2).unwrap();
        lattice.set(Coord::new(0, 0), 1).unwrap();
        assert!(propose_swap(&mut lattice, Coord::new(0, 0), Coord::new(0, 3), 1.0, &mut rng).is_err());
        assert_eq!(lattice.particle_count(), 1);
        assert_eq!(lattice.get(Coord::new(0, 0)), Ok(1));
    }

    #[test]
    fn two_site_swap_is_a_fair_coin() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut lattice = Lattice::new(2, 1).unwrap();
        lattice.set(Coord::new(0, 0), 1).unwrap();
        let (a, b) = (Coord::new(0, 0), Coord::new(0, 1));

        let trials = 20_000;
        let mut accepted = 0;
        for _ in 0..trials {
            assert_eq!(pair_energy(&lattice, a, b), 0.0);
            let before = lattice.cells().to_vec();
            match propose_swap(&mut lattice, a, b, 0.7, &mut rng).unwrap() {
                StepOutcome::Accepted => {
                    accepted += 1;
                    let mut swapped = before.clone();
                    swapped.swap(0, 1);
                    assert_eq!(lattice.cells(), &swapped[..]);
                }
                StepOutcome::Rejected => assert_eq!(lattice.cells(), &before[..]),
                StepOutcome::Skipped => panic!("differing sites must be evaluated"),
            }
            assert_eq!(lattice.particle_count(), 1);
        }
        let rate = accepted as f64 / trials as f64;
        assert!((rate - 0.5).abs() < 0.02, "acceptance rate {rate}");
    }

    #[test]
    fn conserves_particles_every_step() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut lattice = Lattice::seeded(12, 9, Seeding::Random { density: 0.35 }, &mut rng).unwrap();
        let start = lattice.count_occupied();
        for i in 0..5_000 {
            let t = if i % 2 == 0 { 0.4 } else { 3.0 };
            step(&mut lattice, t, &mut rng);
            assert_eq!(lattice.count_occupied(), start);
            assert_eq!(lattice.particle_count(), start);
        }
    }

    #[test]
    fn cold_lattice_never_raises_energy() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut lattice = Lattice::seeded(10, 10, Seeding::Exact { density: 0.4 }, &mut rng).unwrap();
        let mut energy = total_energy(&lattice);
        let mut accepted = 0;
        for _ in 0..20_000 {
            if step(&mut lattice, 1e-9, &mut rng) == StepOutcome::Accepted {
                accepted += 1;
                let next = total_energy(&lattice);
                assert!(next <= energy, "energy rose from {energy} to {next}");
                energy = next;
            }
        }
        assert!(accepted > 0);
    }

    #[test]
    fn hot_lattice_accepts_about_half() {
        // the logistic rule tends to 1/2, not 1, as T grows
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let mut lattice = Lattice::seeded(10, 10, Seeding::Exact { density: 0.5 }, &mut rng).unwrap();
        let (mut accepted, mut evaluated) = (0u32, 0u32);
        for _ in 0..20_000 {
            match step(&mut lattice, 1e9, &mut rng) {
                StepOutcome::Accepted => {
                    accepted += 1;
                    evaluated += 1;
                }
                StepOutcome::Rejected => evaluated += 1,
                StepOutcome::Skipped => {}
            }
        }
        let rate = accepted as f64 / evaluated as f64;
        assert!((rate - 0.5).abs() < 0.03, "acceptance rate {rate}");
    }
}
