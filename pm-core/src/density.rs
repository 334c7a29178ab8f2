use rayon::prelude::*;

use crate::{
    config::DepositStrategy,
    mesh::{Grid, Mesh},
    particles::ParticleSet,
    types::CellIndex,
};

/// Per-cell particle tally used to build the density field.
///
/// Each deposited particle adds one to the count of the cell that
/// contains it; [`DensityBuffer::density`] turns the tallies into a mass
/// density by scaling with `1 / dx²`. Keeping integer counts makes
/// merging partial buffers exact, so every deposition strategy yields
/// bit-identical grids.
#[derive(Clone, Debug)]
pub struct DensityBuffer {
    mesh: Mesh,
    /// Number of particles binned into each cell, row-major.
    pub count: Vec<u32>,
}

impl DensityBuffer {
    /// Creates an empty buffer covering every cell of `mesh`.
    pub fn with_mesh(mesh: Mesh) -> Self {
        Self {
            mesh,
            count: vec![0; mesh.cell_count()],
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Clears all tallies, keeping the allocation.
    pub fn clear(&mut self) {
        self.count.fill(0);
    }

    /// Adds one particle to `cell`.
    ///
    /// ### Panics
    /// Panics if `cell` lies outside the mesh.
    #[inline]
    pub fn add(&mut self, cell: CellIndex) {
        let i = self.mesh.flat(cell);
        self.count[i] += 1;
    }

    /// Number of particles deposited so far.
    pub fn total(&self) -> u64 {
        self.count.iter().map(|&c| c as u64).sum()
    }

    /// Adds the tallies of `other` into `self`.
    ///
    /// ### Panics
    /// Panics if the two buffers cover different meshes.
    pub fn merge_from(&mut self, other: &DensityBuffer) {
        assert_eq!(self.mesh, other.mesh);
        for (c, o) in self.count.iter_mut().zip(&other.count) {
            *c += *o;
        }
    }

    /// Materializes the mass density, `count / dx²` per cell.
    pub fn density(&self) -> Grid<f64> {
        let w = 1.0 / (self.mesh.cell_width * self.mesh.cell_width);
        let cells = self.count.iter().map(|&c| c as f64 * w).collect();
        Grid::from_cells(self.mesh, cells)
    }
}

/// Scatters every particle into its nearest-grid-point cell.
///
/// ### Parameters
/// - `particles` - Bodies to deposit; read only.
/// - `mesh` - Mesh the density is defined on.
/// - `strategy` - Whether to bin in one pass or with per-thread partial
///   buffers that are reduced once all particles are processed.
///
/// ### Returns
/// The fully populated tally buffer. Collisions in a cell always add.
pub fn deposit(particles: &ParticleSet, mesh: Mesh, strategy: DepositStrategy) -> DensityBuffer {
    match strategy {
        DepositStrategy::Sequential => {
            let mut acc = DensityBuffer::with_mesh(mesh);
            for p in &particles.points {
                acc.add(mesh.cell_of(p.pos));
            }
            acc
        }
        DepositStrategy::Partitioned => particles
            .points
            .par_iter()
            .fold(
                || DensityBuffer::with_mesh(mesh),
                |mut acc, p| {
                    acc.add(mesh.cell_of(p.pos));
                    acc
                },
            )
            .reduce(
                || DensityBuffer::with_mesh(mesh),
                |mut a, b| {
                    a.merge_from(&b);
                    a
                },
            ),
    }
}

/// Total mass `Σ ρ · dx²` represented by a density grid.
pub fn total_mass(density: &Grid<f64>) -> f64 {
    let dx = density.mesh().cell_width;
    density.cells().iter().sum::<f64>() * dx * dx
}
