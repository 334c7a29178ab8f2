//! Periodic square mesh geometry and the step-scoped grids laid over it.

use glam::DVec2;

use crate::{
    error::{Result, SimError},
    types::CellIndex,
};

/// Geometry of a `size × size` periodic mesh with square cells.
///
/// Every cell lookup in the pipeline goes through [`Mesh::cell_of`], so
/// deposition and force gathering always agree on which cell a particle
/// occupies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mesh {
    pub size: usize,
    pub cell_width: f64,
}

impl Mesh {
    /// Creates a mesh of `size` cells of width `cell_width` per side.
    ///
    /// ### Returns
    /// `Err(SimError::Configuration)` if `size` is zero or the width is
    /// not a positive finite number.
    pub fn new(size: usize, cell_width: f64) -> Result<Self> {
        if size == 0 {
            return Err(SimError::Configuration(
                "mesh needs at least one cell per side".to_string(),
            ));
        }
        if !cell_width.is_finite() || cell_width <= 0.0 {
            return Err(SimError::Configuration(format!(
                "cell width must be positive, got {cell_width}"
            )));
        }
        Ok(Self { size, cell_width })
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    /// Nearest-grid-point binning: `floor(x / dx) mod G` on each axis.
    ///
    /// Uses Euclidean remainder, so coordinates outside `[0, L)` still
    /// land on the periodic image of their cell.
    #[inline]
    pub fn cell_of(&self, pos: DVec2) -> CellIndex {
        (self.bin(pos.x), self.bin(pos.y))
    }

    #[inline]
    fn bin(&self, coord: f64) -> usize {
        let g = self.size as i64;
        ((coord / self.cell_width).floor() as i64).rem_euclid(g) as usize
    }

    /// Row-major flat index of `(ix, iy)`; `ix` selects the row.
    #[inline]
    pub fn flat(&self, (ix, iy): CellIndex) -> usize {
        ix * self.size + iy
    }

    /// Flat index of the cell offset by `(dx, dy)` from `(ix, iy)`, wrapped
    /// around the torus.
    #[inline]
    pub fn offset(&self, (ix, iy): CellIndex, dx: isize, dy: isize) -> usize {
        let g = self.size as isize;
        let x = (ix as isize + dx).rem_euclid(g) as usize;
        let y = (iy as isize + dy).rem_euclid(g) as usize;
        self.flat((x, y))
    }

    /// Inverse of [`Mesh::flat`].
    #[inline]
    pub fn unflat(&self, i: usize) -> CellIndex {
        (i / self.size, i % self.size)
    }
}

/// A `G × G` buffer of per-cell values bound to a [`Mesh`].
///
/// Grids are rebuilt every step by the phase that owns them and handed
/// read-only to the next phase.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    mesh: Mesh,
    cells: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    /// A grid with every cell set to `T::default()`.
    pub fn zeros(mesh: Mesh) -> Self {
        Self {
            mesh,
            cells: vec![T::default(); mesh.cell_count()],
        }
    }

    /// Resets every cell to `T::default()`, keeping the allocation.
    pub fn clear(&mut self) {
        self.cells.fill(T::default());
    }
}

impl<T> Grid<T> {
    /// Wraps an existing row-major buffer.
    ///
    /// ### Panics
    /// Panics if `cells.len()` differs from `mesh.cell_count()`.
    pub fn from_cells(mesh: Mesh, cells: Vec<T>) -> Self {
        assert_eq!(cells.len(), mesh.cell_count());
        Self { mesh, cells }
    }

    /// Mesh this grid is laid over.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// All cells in row-major order, see [`Mesh::flat`].
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Mutable row-major view of all cells.
    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Consumes the grid, returning its row-major buffer.
    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }

    #[inline]
    pub fn at(&self, cell: CellIndex) -> &T {
        &self.cells[self.mesh.flat(cell)]
    }

    #[inline]
    pub fn at_mut(&mut self, cell: CellIndex) -> &mut T {
        let i = self.mesh.flat(cell);
        &mut self.cells[i]
    }

    /// Value in the cell offset by `(dx, dy)` from `cell`, with periodic wrap.
    #[inline]
    pub fn shifted(&self, cell: CellIndex, dx: isize, dy: isize) -> &T {
        &self.cells[self.mesh.offset(cell, dx, dy)]
    }
}
