use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A (row, col) site address. Row 0 is the top of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }
}

/// How a fresh lattice is populated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Seeding {
    Empty,
    Full,
    /// Each site is occupied independently with probability `density`.
    Random { density: f64 },
    /// Exactly `round(density * area)` sites, chosen without replacement.
    Exact { density: f64 },
}

impl Seeding {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Seeding::Random { density } | Seeding::Exact { density } => {
                if (0.0..=1.0).contains(&density) {
                    Ok(())
                } else {
                    Err(Error::InvalidDensity(density))
                }
            }
            Seeding::Empty | Seeding::Full => Ok(()),
        }
    }
}

/// Occupancy grid of a 2D lattice gas with open boundaries.
///
/// The particle count is kept in step with the cells by every mutator, so
/// `particle_count()` always equals the sum of all occupancies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lattice {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    particles: usize,
}

impl Lattice {
    /// Empty lattice of `width` columns by `height` rows.
    pub fn new(width: usize, height: usize) -> Result<Lattice> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Lattice {
            width,
            height,
            cells: vec![0; width * height],
            particles: 0,
        })
    }

    pub fn seeded<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        seeding: Seeding,
        rng: &mut R,
    ) -> Result<Lattice> {
        let mut lattice = Lattice::new(width, height)?;
        lattice.reseed(seeding, rng)?;
        Ok(lattice)
    }

    /// Clears the grid and repopulates it in place.
    pub fn reseed<R: Rng + ?Sized>(&mut self, seeding: Seeding, rng: &mut R) -> Result<()> {
        seeding.validate()?;
        self.cells.fill(0);
        match seeding {
            Seeding::Empty => {}
            Seeding::Full => self.cells.fill(1),
            Seeding::Random { density } => {
                for cell in self.cells.iter_mut() {
                    if rng.gen_range(0.0..1.0) < density {
                        *cell = 1;
                    }
                }
            }
            Seeding::Exact { density } => {
                let area = self.area();
                let target = ((density * area as f64).round() as usize).min(area);
                for i in index::sample(rng, area, target) {
                    self.cells[i] = 1;
                }
            }
        }
        self.particles = self.count_occupied();
        Ok(())
    }

    // ---- Accessors ----
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn particle_count(&self) -> usize {
        self.particles
    }

    pub fn mean_occupancy(&self) -> f64 {
        self.particles as f64 / self.area() as f64
    }

    /// Recounts occupied sites from scratch, ignoring the tracked total.
    pub fn count_occupied(&self) -> usize {
        self.cells.iter().map(|&c| c as usize).sum()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    pub fn get(&self, coord: Coord) -> Result<u8> {
        let i = self.index(coord)?;
        Ok(self.cells[i])
    }

    /// Writes `value` at `coord`, adjusting the particle count.
    pub fn set(&mut self, coord: Coord, value: u8) -> Result<()> {
        if value > 1 {
            return Err(Error::InvalidOccupancy(value));
        }
        let i = self.index(coord)?;
        self.write(i, value);
        Ok(())
    }

    /// Flips one site outside the stochastic process and returns its new value.
    pub fn toggle(&mut self, coord: Coord) -> Result<u8> {
        let i = self.index(coord)?;
        let flipped = 1 - self.cells[i];
        self.write(i, flipped);
        Ok(flipped)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
        }
    }

    pub fn random_coord<R: Rng + ?Sized>(&self, rng: &mut R) -> Coord {
        Coord::new(rng.gen_range(0..self.height), rng.gen_range(0..self.width))
    }

    // ---- Unchecked access for coordinates already known to be in bounds ----

    #[inline]
    pub(crate) fn at(&self, coord: Coord) -> u8 {
        self.cells[coord.row * self.width + coord.col]
    }

    #[inline]
    pub(crate) fn at_offset(&self, coord: Coord, dr: isize, dc: isize) -> Option<u8> {
        let row = coord.row.checked_add_signed(dr)?;
        let col = coord.col.checked_add_signed(dc)?;
        if row < self.height && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    /// Exchanges two sites. The particle count is unchanged by construction.
    pub(crate) fn swap(&mut self, a: Coord, b: Coord) {
        let ia = a.row * self.width + a.col;
        let ib = b.row * self.width + b.col;
        self.cells.swap(ia, ib);
    }

    pub(crate) fn assign(&mut self, coord: Coord, value: u8) {
        let i = coord.row * self.width + coord.col;
        self.write(i, value);
    }

    fn write(&mut self, i: usize, value: u8) {
        match (self.cells[i], value) {
            (0, 1) => self.particles += 1,
            (1, 0) => self.particles -= 1,
            _ => {}
        }
        self.cells[i] = value;
    }

    fn index(&self, coord: Coord) -> Result<usize> {
        if !self.contains(coord) {
            return Err(Error::OutOfBounds {
                row: coord.row,
                col: coord.col,
                height: self.height,
                width: self.width,
            });
        }
        Ok(coord.row * self.width + coord.col)
    }
}

/// Immutable row-major copy of the occupancy grid, handed to renderers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<u8>,
}

impl Snapshot {
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.width)
    }

    pub fn get(&self, coord: Coord) -> Option<u8> {
        if coord.row < self.height && coord.col < self.width {
            Some(self.cells[coord.row * self.width + coord.col])
        } else {
            None
        }
    }
}
