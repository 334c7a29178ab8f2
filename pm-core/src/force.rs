use glam::DVec2;
use rayon::prelude::*;

use crate::mesh::Grid;

/// Force per unit mass on every cell, `F = -∇φ`.
///
/// Each partial derivative is a centered difference over the periodic
/// neighbours, `-(φ[i+1] - φ[i-1]) / (2·dx)`, so mass sitting in a
/// potential well is pulled toward it.
pub fn compute(potential: &Grid<f64>) -> Grid<DVec2> {
    let mesh = *potential.mesh();
    let scale = -0.5 / mesh.cell_width;

    let cells = (0..mesh.cell_count())
        .into_par_iter()
        .map(|i| {
            let cell = mesh.unflat(i);
            let fx = potential.shifted(cell, 1, 0) - potential.shifted(cell, -1, 0);
            let fy = potential.shifted(cell, 0, 1) - potential.shifted(cell, 0, -1);
            DVec2::new(fx, fy) * scale
        })
        .collect();

    Grid::from_cells(mesh, cells)
}
