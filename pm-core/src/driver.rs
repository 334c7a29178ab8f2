//! Run-level orchestration: the step loop, its state machine and the
//! snapshot history.

use std::time::{Duration, Instant};

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::Config,
    error::{Result, SimError},
    history::{History, Snapshot},
    integrator::wrap_coordinate,
    mesh::Mesh,
    particles::ParticleSet,
    phases,
    poisson::PoissonSolver,
    transform::{RustFft2d, SpectralTransform, verify_round_trip},
};

/// Lifecycle of a [`Simulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Built and validated; no step has run yet.
    Uninitialized,
    /// `step` is the index of the next step to execute.
    Running { step: usize },
    /// Every configured step has produced its snapshot.
    Completed,
    /// A phase of `step` produced a non-finite value.
    Aborted { step: usize },
}

/// Owns the particles, the solver and the history of one run.
///
/// All configuration and transform checks happen in the constructors;
/// once a `Simulation` exists only per-step numeric degeneracy can stop it.
pub struct Simulation {
    config: Config,
    particles: ParticleSet,
    solver: PoissonSolver,
    history: History,
    state: DriverState,
}

impl Simulation {
    /// Validates `config` and places `config.particle_count` bodies at rest,
    /// uniformly over the domain, using a generator seeded with `config.seed`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let particles =
            ParticleSet::random_in_domain(config.particle_count, config.domain_size, &mut rng);
        Self::with_particles(config, particles)
    }

    /// Starts from an explicit particle set; `config.particle_count` is
    /// replaced by the size of the set and positions are wrapped into the
    /// domain.
    pub fn with_particles(config: Config, particles: ParticleSet) -> Result<Self> {
        let transform = RustFft2d::new(config.grid_size.max(1))?;
        Self::with_transform(config, particles, Box::new(transform))
    }

    /// Like [`Simulation::with_particles`] but with a caller-supplied
    /// spectral transform, which must pass the round-trip self check.
    pub fn with_transform(
        mut config: Config,
        mut particles: ParticleSet,
        transform: Box<dyn SpectralTransform>,
    ) -> Result<Self> {
        config.particle_count = particles.len();
        config.validate()?;

        for p in &mut particles.points {
            if !(p.pos.is_finite() && p.vel.is_finite()) {
                return Err(SimError::Configuration(
                    "initial particle state must be finite".to_string(),
                ));
            }
            p.pos.x = wrap_coordinate(p.pos.x, config.domain_size);
            p.pos.y = wrap_coordinate(p.pos.y, config.domain_size);
        }

        let mesh = Mesh::new(config.grid_size, config.cell_width())?;
        let err = verify_round_trip(transform.as_ref(), config.round_trip_tolerance)?;
        log::debug!("transform round-trip relative error {err:e}");
        let solver = PoissonSolver::new(mesh, config.gravity, transform)?;

        Ok(Self {
            history: History::with_capacity(config.steps),
            config,
            particles,
            solver,
            state: DriverState::Uninitialized,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }

    /// Performs one state transition.
    ///
    /// Executes the phase sequence for the next step and records its
    /// snapshot, or moves straight to [`DriverState::Completed`] when the
    /// run has no steps left.
    ///
    /// ### Returns
    /// - The new state.
    /// - `Err(SimError::RunFinished)` if the run is already completed or
    ///   aborted.
    /// - The phase error if the step fails; the run is then aborted.
    pub fn advance(&mut self) -> Result<DriverState> {
        let step = match self.state {
            DriverState::Uninitialized => {
                log::info!(
                    "starting run: {} particles, {}x{} mesh, {} steps, dt = {}",
                    self.particles.len(),
                    self.config.grid_size,
                    self.config.grid_size,
                    self.config.steps,
                    self.config.dt
                );
                0
            }
            DriverState::Running { step } => step,
            DriverState::Completed | DriverState::Aborted { .. } => {
                return Err(SimError::RunFinished);
            }
        };

        if step >= self.config.steps {
            self.state = DriverState::Completed;
            log::info!("run completed after {step} steps");
            return Ok(self.state);
        }

        if let Err(e) = phases::step_pipeline(
            &mut self.particles,
            &self.solver,
            self.config.deposition,
            self.config.dt,
            self.config.domain_size,
            step,
        ) {
            self.state = DriverState::Aborted { step };
            log::error!("aborting run: {e}");
            return Err(e);
        }

        let snapshot = Snapshot::capture(&self.particles);
        log::debug!(
            "step {step}: kinetic energy {:.6e}, max speed {:.6e}",
            snapshot.kinetic_energy(),
            snapshot.max_speed()
        );
        self.history.push(snapshot);

        self.state = if step + 1 == self.config.steps {
            log::info!("run completed after {} steps", step + 1);
            DriverState::Completed
        } else {
            DriverState::Running { step: step + 1 }
        };
        Ok(self.state)
    }

    /// Advances until the run completes.
    ///
    /// If `config.time_budget_secs` is set, the budget is checked between
    /// steps; when it is spent the loop stops early and the partial
    /// history is returned.
    pub fn run(&mut self) -> Result<&History> {
        let started = Instant::now();
        let budget = self
            .config
            .time_budget_secs
            .and_then(|s| Duration::try_from_secs_f64(s).ok());

        while self.state != DriverState::Completed {
            if let Some(budget) = budget
                && started.elapsed() >= budget
            {
                log::warn!(
                    "time budget of {:?} spent after {} of {} steps",
                    budget,
                    self.history.len(),
                    self.config.steps
                );
                break;
            }
            self.advance()?;
        }
        Ok(&self.history)
    }
}
