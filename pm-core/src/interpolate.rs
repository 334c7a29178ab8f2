use glam::DVec2;
use rayon::prelude::*;

use crate::{mesh::Grid, particles::ParticleSet};

/// Reads the force of each particle's nearest-grid-point cell.
///
/// Uses the same binning as deposition, with no weighting across
/// neighbouring cells. Output index `i` belongs to particle `i`.
pub fn sample(particles: &ParticleSet, field: &Grid<DVec2>) -> Vec<DVec2> {
    let mesh = field.mesh();
    particles
        .points
        .par_iter()
        .map(|p| *field.at(mesh.cell_of(p.pos)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    #[test]
    fn sample_reads_the_containing_cell() {
        let mesh = Mesh::new(2, 1.0).unwrap();
        let field = Grid::from_cells(
            mesh,
            vec![
                DVec2::new(1.0, 0.0),
                DVec2::new(2.0, 0.0),
                DVec2::new(3.0, 0.0),
                DVec2::new(4.0, 0.0),
            ],
        );
        let particles = ParticleSet::from_positions(vec![
            DVec2::new(0.2, 0.9),
            DVec2::new(1.5, 0.1),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.99, 1.99),
        ]);

        let forces = sample(&particles, &field);

        assert_eq!(
            forces,
            vec![
                DVec2::new(1.0, 0.0),
                DVec2::new(3.0, 0.0),
                DVec2::new(2.0, 0.0),
                DVec2::new(4.0, 0.0),
            ]
        );
    }

    #[test]
    fn sample_of_empty_set_is_empty() {
        let mesh = Mesh::new(2, 1.0).unwrap();
        let field = Grid::<DVec2>::zeros(mesh);
        assert!(sample(&ParticleSet::from_positions(vec![]), &field).is_empty());
    }
}
