//! Spectral solution of the periodic Poisson equation `∇²φ = 4πGρ`.

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;

use crate::{
    error::{Result, SimError},
    mesh::{Grid, Mesh},
    transform::SpectralTransform,
};

/// Angular wavenumbers of an `n`-point periodic axis with spacing `dx`.
///
/// Bins are ordered `0, 1, .., ⌈n/2⌉-1, -⌊n/2⌋, .., -1`, each scaled by
/// `2π / (n·dx)`.
pub fn wavenumbers(n: usize, dx: f64) -> Vec<f64> {
    let scale = 2.0 * PI / (n as f64 * dx);
    (0..n)
        .map(|i| {
            let f = if i <= (n - 1) / 2 {
                i as f64
            } else {
                i as f64 - n as f64
            };
            f * scale
        })
        .collect()
}

/// Solves for the gravitational potential of a density grid.
///
/// The `K² = kx² + ky²` table is computed once per mesh. Its DC entry
/// holds the placeholder `1.0` so the elementwise divide never hits zero;
/// the DC mode of the potential is then set to zero, which fixes the
/// arbitrary potential offset.
pub struct PoissonSolver {
    mesh: Mesh,
    gravity: f64,
    transform: Box<dyn SpectralTransform>,
    k2: Vec<f64>,
}

impl PoissonSolver {
    /// ### Parameters
    /// - `mesh` - Mesh every density grid passed to [`PoissonSolver::solve`]
    ///   must be defined on.
    /// - `gravity` - Gravitational constant.
    /// - `transform` - 2-D transform whose size matches `mesh.size`.
    pub fn new(mesh: Mesh, gravity: f64, transform: Box<dyn SpectralTransform>) -> Result<Self> {
        if transform.size() != mesh.size {
            return Err(SimError::Transform(format!(
                "transform size {} does not match mesh size {}",
                transform.size(),
                mesh.size
            )));
        }

        let k = wavenumbers(mesh.size, mesh.cell_width);
        let mut k2: Vec<f64> = k
            .iter()
            .flat_map(|kx| k.iter().map(move |ky| kx * kx + ky * ky))
            .collect();
        k2[0] = 1.0;

        Ok(Self {
            mesh,
            gravity,
            transform,
            k2,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn transform(&self) -> &dyn SpectralTransform {
        self.transform.as_ref()
    }

    /// Computes `φ` from `ρ`.
    ///
    /// `φ̂(k) = -4πG ρ̂(k) / K²` for every mode except DC, which is zero.
    /// The imaginary part left after the inverse transform is discarded.
    pub fn solve(&self, density: &Grid<f64>) -> Result<Grid<f64>> {
        if *density.mesh() != self.mesh {
            return Err(SimError::Configuration(
                "density grid does not match the solver mesh".to_string(),
            ));
        }

        let cells = self.mesh.cell_count();
        let mut spectrum = self.transform.forward(density.cells())?;
        check_len("forward", spectrum.len(), cells)?;
        let factor = -4.0 * PI * self.gravity;
        for (mode, k2) in spectrum.iter_mut().zip(&self.k2) {
            *mode = *mode * (factor / k2);
        }
        spectrum[0] = Complex64::new(0.0, 0.0);

        let phi = self.transform.inverse_real(&spectrum)?;
        check_len("inverse", phi.len(), cells)?;
        Ok(Grid::from_cells(self.mesh, phi))
    }
}

/// A backend returning the wrong number of cells is a transform failure.
fn check_len(direction: &str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(SimError::Transform(format!(
            "{direction} transform returned {got} values, expected {expected}"
        )));
    }
    Ok(())
}
