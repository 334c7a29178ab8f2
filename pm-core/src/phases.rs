//! The five per-step phases of the particle-mesh pipeline.
//!
//! One step runs, strictly in order:
//! 1. [`deposit_phase`] — bin every particle into the density grid.
//! 2. [`solve_phase`] — spectral Poisson solve for the potential.
//! 3. [`gradient_phase`] — force field `-∇φ` on the mesh.
//! 4. [`gather_phase`] — per-particle force from its cell.
//! 5. [`integrate_phase`] — kick, drift and periodic wrap.
//!
//! Each phase returns its complete output before the next one starts;
//! the grids live only for the duration of [`step_pipeline`].

use glam::DVec2;

use crate::{
    config::DepositStrategy,
    density,
    error::{Phase, Result, SimError},
    force, integrator, interpolate,
    mesh::{Grid, Mesh},
    particles::ParticleSet,
    poisson::PoissonSolver,
};

/// Builds a fresh density grid from the current particle positions.
pub fn deposit_phase(particles: &ParticleSet, mesh: Mesh, strategy: DepositStrategy) -> Grid<f64> {
    density::deposit(particles, mesh, strategy).density()
}

/// Solves for the potential and rejects non-finite results.
///
/// ### Parameters
/// - `solver` - Solver bound to the run's mesh.
/// - `density` - Output of [`deposit_phase`].
/// - `step` - Step index, reported if the potential is degenerate.
pub fn solve_phase(solver: &PoissonSolver, density: &Grid<f64>, step: usize) -> Result<Grid<f64>> {
    let phi = solver.solve(density)?;
    // NaN or ±Inf anywhere poisons the sum
    if !phi.cells().iter().sum::<f64>().is_finite() {
        return Err(SimError::NumericDegeneracy {
            step,
            phase: Phase::Solve,
        });
    }
    Ok(phi)
}

/// Derives the force field from the potential.
///
/// ### Parameters
/// - `potential` - Output of [`solve_phase`]; only read access is required.
///
/// ### Returns
/// A new grid holding `-∇φ` in every cell.
pub fn gradient_phase(potential: &Grid<f64>) -> Grid<DVec2> {
    force::compute(potential)
}

/// Reads each particle's force from the completed field.
///
/// ### Parameters
/// - `particles` - Bodies whose cells are looked up; not modified.
/// - `field` - Output of [`gradient_phase`].
///
/// ### Returns
/// One force per particle, aligned with `particles.points`.
pub fn gather_phase(particles: &ParticleSet, field: &Grid<DVec2>) -> Vec<DVec2> {
    interpolate::sample(particles, field)
}

/// Advances every particle and checks that the new state is finite.
///
/// The check is a single aggregate: the sum of squared speeds and of
/// coordinates, which is non-finite as soon as any component is.
pub fn integrate_phase(
    particles: &mut ParticleSet,
    forces: &[DVec2],
    dt: f64,
    domain_size: f64,
    step: usize,
) -> Result<()> {
    integrator::kick_drift(particles, forces, dt, domain_size);

    let aggregate: f64 = particles
        .points
        .iter()
        .map(|p| p.vel.length_squared() + p.pos.x + p.pos.y)
        .sum();
    if !aggregate.is_finite() {
        return Err(SimError::NumericDegeneracy {
            step,
            phase: Phase::Integrate,
        });
    }
    Ok(())
}

/// Runs one full step of the pipeline on `particles`.
///
/// ### Parameters
/// - `particles` - Bodies to advance in place.
/// - `solver` - Solver bound to the run's mesh.
/// - `strategy` - Scatter strategy for [`deposit_phase`].
/// - `dt` - Time step shared by the kick and the drift.
/// - `domain_size` - Configured side length `L` used for the periodic
///   wrap. `G * (L / G)` can differ from `L` by an ulp, so the mesh is
///   not asked for it.
/// - `step` - Step index, reported on failure.
///
/// ### Returns
/// - `Ok(())` once the particles have been advanced by `dt`.
/// - `Err(SimError::NumericDegeneracy)` naming `step` and the phase that
///   produced a non-finite value; `particles` may then hold a partially
///   advanced state and the run must not continue.
pub fn step_pipeline(
    particles: &mut ParticleSet,
    solver: &PoissonSolver,
    strategy: DepositStrategy,
    dt: f64,
    domain_size: f64,
    step: usize,
) -> Result<()> {
    let mesh = *solver.mesh();

    let rho = deposit_phase(particles, mesh, strategy);
    let phi = solve_phase(solver, &rho, step)?;
    let field = gradient_phase(&phi);
    let forces = gather_phase(particles, &field);
    integrate_phase(particles, &forces, dt, domain_size, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{density::total_mass, transform::RustFft2d};
    use approx::assert_abs_diff_eq;
    use rand::{SeedableRng, rngs::StdRng};

    fn solver(size: usize, dx: f64, gravity: f64) -> PoissonSolver {
        let mesh = Mesh::new(size, dx).unwrap();
        PoissonSolver::new(mesh, gravity, Box::new(RustFft2d::new(size).unwrap())).unwrap()
    }

    #[test]
    fn deposit_phase_conserves_particle_count() {
        let mesh = Mesh::new(16, 0.75).unwrap();
        let particles = ParticleSet::random_in_domain(777, 12.0, &mut StdRng::seed_from_u64(1));
        let rho = deposit_phase(&particles, mesh, DepositStrategy::Partitioned);
        assert_abs_diff_eq!(total_mass(&rho), 777.0, epsilon = 1e-9);
    }

    #[test]
    fn solve_phase_flags_non_finite_potential() {
        let s = solver(4, 1.0, f64::INFINITY);
        let mut rho = Grid::zeros(*s.mesh());
        *rho.at_mut((1, 2)) = 1.0;
        assert_eq!(
            solve_phase(&s, &rho, 7),
            Err(SimError::NumericDegeneracy {
                step: 7,
                phase: Phase::Solve
            })
        );
    }

    #[test]
    fn integrate_phase_flags_non_finite_velocity() {
        let mut particles = ParticleSet::from_positions(vec![DVec2::new(1.0, 1.0)]);
        let result = integrate_phase(
            &mut particles,
            &[DVec2::new(f64::NAN, 0.0)],
            1.0,
            4.0,
            3,
        );
        assert_eq!(
            result,
            Err(SimError::NumericDegeneracy {
                step: 3,
                phase: Phase::Integrate
            })
        );
    }

    #[test]
    fn uniform_lattice_feels_no_force() {
        // one particle per cell: flat density, so nothing moves
        let s = solver(8, 1.0, 1.0);
        let positions = (0..64)
            .map(|i| {
                let (ix, iy) = s.mesh().unflat(i);
                DVec2::new(ix as f64 + 0.5, iy as f64 + 0.5)
            })
            .collect();
        let mut particles = ParticleSet::from_positions(positions);
        let before = particles.clone();

        step_pipeline(&mut particles, &s, DepositStrategy::Sequential, 0.5, 8.0, 0).unwrap();

        for (a, b) in particles.points.iter().zip(&before.points) {
            assert_abs_diff_eq!(a.vel.length(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(a.pos.x, b.pos.x, epsilon = 1e-12);
            assert_abs_diff_eq!(a.pos.y, b.pos.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn single_particle_on_two_cell_mesh_stays_at_rest() {
        // On a 2-cell axis the ±1 neighbours coincide, so the centered
        // difference is zero in every cell.
        let s = solver(2, 1.0, 1.0);
        let mut particles = ParticleSet::from_positions(vec![DVec2::new(0.5, 0.5)]);

        let rho = deposit_phase(&particles, *s.mesh(), DepositStrategy::Sequential);
        assert_eq!(rho.cells(), &[1.0, 0.0, 0.0, 0.0]);

        let phi = solve_phase(&s, &rho, 0).unwrap();
        assert!(phi.cells().iter().all(|v| v.is_finite()));

        let field = gradient_phase(&phi);
        assert!(field.cells().iter().all(|f| *f == DVec2::ZERO));

        let forces = gather_phase(&particles, &field);
        integrate_phase(&mut particles, &forces, 1.0, 2.0, 0).unwrap();

        assert_eq!(particles.points[0].vel, DVec2::ZERO);
        assert_eq!(particles.points[0].pos, DVec2::new(0.5, 0.5));
    }
}
