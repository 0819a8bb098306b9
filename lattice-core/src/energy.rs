//! Nearest-neighbor energy model with open boundaries.
//!
//! Every bond between two occupied sites contributes -1. Sites on the edge
//! simply have fewer neighbors; nothing wraps around.

use crate::error::Result;
use crate::lattice::{Coord, Lattice};

/// Axis-aligned offsets: up, left, down, right.
const NEIGHBORS: [(isize, isize); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

/// In-bounds neighbor sites of `coord`.
pub fn neighbor_sites(lattice: &Lattice, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
    NEIGHBORS.iter().filter_map(move |&(dr, dc)| {
        let row = coord.row.checked_add_signed(dr)?;
        let col = coord.col.checked_add_signed(dc)?;
        let site = Coord::new(row, col);
        lattice.contains(site).then_some(site)
    })
}

/// Occupied neighbors of `coord`, or 0 when `coord` itself is empty.
///
/// This is the bond count the site contributes to the energy.
pub fn neighbor_count(lattice: &Lattice, coord: Coord) -> Result<u32> {
    lattice.get(coord)?;
    Ok(bonds_at(lattice, coord))
}

/// Occupied neighbors of `coord` regardless of its own state.
pub fn open_neighbor_count(lattice: &Lattice, coord: Coord) -> Result<u32> {
    lattice.get(coord)?;
    Ok(open_bonds_at(lattice, coord))
}

#[inline]
pub(crate) fn bonds_at(lattice: &Lattice, coord: Coord) -> u32 {
    if lattice.at(coord) == 0 {
        return 0;
    }
    open_bonds_at(lattice, coord)
}

#[inline]
pub(crate) fn open_bonds_at(lattice: &Lattice, coord: Coord) -> u32 {
    NEIGHBORS
        .iter()
        .filter(|&&(dr, dc)| lattice.at_offset(coord, dr, dc) == Some(1))
        .count() as u32
}

/// Interaction energy: minus the number of occupied nearest-neighbor pairs.
pub fn total_energy(lattice: &Lattice) -> f64 {
    let mut bonds = 0u64;
    for row in 0..lattice.height() {
        for col in 0..lattice.width() {
            bonds += bonds_at(lattice, Coord::new(row, col)) as u64;
        }
    }
    // each bond was seen from both ends
    -((bonds / 2) as f64)
}

/// Grand-canonical energy `E - mu * N`.
pub fn grand_energy(lattice: &Lattice, potential: f64) -> f64 {
    total_energy(lattice) - potential * lattice.particle_count() as f64
}

pub fn energy_per_site(lattice: &Lattice) -> f64 {
    total_energy(lattice) / lattice.area() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: usize, height: usize) -> Lattice {
        let mut lattice = Lattice::new(width, height).unwrap();
        for row in 0..height {
            for col in 0..width {
                lattice.set(Coord::new(row, col), 1).unwrap();
            }
        }
        lattice
    }

    #[test]
    fn boundary_sites_have_fewer_neighbors() {
        let lattice = filled(5, 5);
        assert_eq!(neighbor_sites(&lattice, Coord::new(0, 0)).count(), 2);
        assert_eq!(neighbor_sites(&lattice, Coord::new(4, 4)).count(), 2);
        assert_eq!(neighbor_sites(&lattice, Coord::new(0, 2)).count(), 3);
        assert_eq!(neighbor_sites(&lattice, Coord::new(3, 0)).count(), 3);
        assert_eq!(neighbor_sites(&lattice, Coord::new(2, 2)).count(), 4);

        assert_eq!(neighbor_count(&lattice, Coord::new(0, 4)), Ok(2));
        assert_eq!(neighbor_count(&lattice, Coord::new(4, 1)), Ok(3));
        assert_eq!(neighbor_count(&lattice, Coord::new(1, 3)), Ok(4));
    }

    #[test]
    fn two_by_two_corners() {
        let lattice = filled(2, 2);
        for row in 0..2 {
            for col in 0..2 {
                assert_eq!(neighbor_count(&lattice, Coord::new(row, col)), Ok(2));
            }
        }
        assert_eq!(total_energy(&lattice), -4.0);
    }

    #[test]
    fn empty_site_contributes_nothing() {
        let mut lattice = filled(3, 3);
        let centre = Coord::new(1, 1);
        lattice.set(centre, 0).unwrap();
        assert_eq!(neighbor_count(&lattice, centre), Ok(0));
        assert_eq!(open_neighbor_count(&lattice, centre), Ok(4));
    }

    #[test]
    fn out_of_range_centre_is_an_error() {
        let lattice = filled(3, 2);
        // (0, 5) would alias (1, 2) in the flat buffer
        assert!(neighbor_count(&lattice, Coord::new(0, 5)).is_err());
        assert!(open_neighbor_count(&lattice, Coord::new(2, 0)).is_err());
    }

    #[test]
    fn total_energy_counts_each_bond_once() {
        let mut lattice = Lattice::new(4, 3).unwrap();
        assert_eq!(total_energy(&lattice), 0.0);
        lattice.set(Coord::new(1, 1), 1).unwrap();
        assert_eq!(total_energy(&lattice), 0.0);
        lattice.set(Coord::new(1, 2), 1).unwrap();
        assert_eq!(total_energy(&lattice), -1.0);
        lattice.set(Coord::new(2, 2), 1).unwrap();
        assert_eq!(total_energy(&lattice), -2.0);
        // diagonal only, no bond
        lattice.set(Coord::new(0, 0), 1).unwrap();
        assert_eq!(total_energy(&lattice), -2.0);
    }

    #[test]
    fn grand_energy_includes_potential_term() {
        let lattice = filled(2, 1);
        assert_eq!(grand_energy(&lattice, -1.5), -1.0 + 3.0);
        assert_eq!(energy_per_site(&lattice), -0.5);
    }
}
