use clap::ValueEnum;
use lattice_core::{Coord, Lattice, Seeding};
use rand::Rng;

/// Starting configuration for a recorded run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InitPattern {
    Empty,
    Random,
    Exact,
    Droplet,
    Slab,
}

impl InitPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitPattern::Empty => "empty",
            InitPattern::Random => "random",
            InitPattern::Exact => "exact",
            InitPattern::Droplet => "droplet",
            InitPattern::Slab => "slab",
        }
    }
}

/// Builds a `width` x `height` lattice holding roughly `density * area`
/// particles laid out as `pattern`.
pub fn build_lattice<R: Rng>(
    rng: &mut R,
    width: usize,
    height: usize,
    pattern: InitPattern,
    density: f64,
) -> lattice_core::Result<Lattice> {
    match pattern {
        InitPattern::Empty => Lattice::seeded(width, height, Seeding::Empty, rng),
        InitPattern::Random => Lattice::seeded(width, height, Seeding::Random { density }, rng),
        InitPattern::Exact => Lattice::seeded(width, height, Seeding::Exact { density }, rng),
        InitPattern::Droplet => {
            Seeding::Exact { density }.validate()?;
            let mut lattice = Lattice::new(width, height)?;
            let target = (density * lattice.area() as f64).round() as usize;

            // fill sites nearest the centre first
            let cy = (height as f64 - 1.0) / 2.0;
            let cx = (width as f64 - 1.0) / 2.0;
            let mut sites: Vec<(f64, Coord)> = (0..height)
                .flat_map(|row| (0..width).map(move |col| Coord::new(row, col)))
                .map(|c| {
                    let dy = c.row as f64 - cy;
                    let dx = c.col as f64 - cx;
                    (dx * dx + dy * dy, c)
                })
                .collect();
            sites.sort_by(|a, b| a.0.total_cmp(&b.0));
            for &(_, c) in sites.iter().take(target) {
                lattice.set(c, 1)?;
            }
            Ok(lattice)
        }
        InitPattern::Slab => {
            Seeding::Exact { density }.validate()?;
            let mut lattice = Lattice::new(width, height)?;
            let target = (density * lattice.area() as f64).round() as usize;
            let top = (height - target.div_ceil(width).min(height)) / 2;

            let mut placed = 0;
            'fill: for row in top..height {
                for col in 0..width {
                    if placed == target {
                        break 'fill;
                    }
                    lattice.set(Coord::new(row, col), 1)?;
                    placed += 1;
                }
            }
            Ok(lattice)
        }
    }
}
