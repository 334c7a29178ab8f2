//! Run configuration and its up-front validation.

use serde::Deserialize;

use crate::error::{Result, SimError};

/// How particle mass is scattered onto the density grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStrategy {
    /// One pass over all particles into a single grid.
    Sequential,
    /// Per-thread partial grids, merged by a reduction once every
    /// particle has been binned.
    #[default]
    Partitioned,
}

/// Parameters of a particle-mesh run.
///
/// ### Fields
/// - `domain_size` - Side length `L` of the periodic square domain.
/// - `grid_size` - Number of cells `G` per side of the mesh.
/// - `particle_count` - Number of unit-mass bodies `N`.
/// - `gravity` - Gravitational constant in `∇²φ = 4πGρ`.
/// - `dt` - Time step used for both kick and drift.
/// - `steps` - Number of steps (and snapshots) in a run.
/// - `seed` - Seed for the initial uniform placement.
/// - `deposition` - Scatter strategy for the density phase.
/// - `round_trip_tolerance` - Max relative error accepted by the
///   transform self-check.
/// - `time_budget_secs` - Optional wall-clock budget, checked between steps.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub domain_size: f64,
    pub grid_size: usize,
    pub particle_count: usize,
    pub gravity: f64,
    pub dt: f64,
    pub steps: usize,
    pub seed: u64,
    pub deposition: DepositStrategy,
    pub round_trip_tolerance: f64,
    pub time_budget_secs: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain_size: 10_000.0,
            grid_size: 128,
            particle_count: 10_000,
            gravity: 1.0,
            dt: 1.0,
            steps: 300,
            seed: 0,
            deposition: DepositStrategy::Partitioned,
            round_trip_tolerance: 1e-5,
            time_budget_secs: None,
        }
    }
}

impl Config {
    /// Width `dx = L / G` of one mesh cell.
    pub fn cell_width(&self) -> f64 {
        self.domain_size / self.grid_size as f64
    }

    /// Checks every parameter before a run is allowed to start.
    ///
    /// ### Returns
    /// - `Ok(())` if the configuration describes a runnable simulation.
    /// - `Err(SimError::Configuration)` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !self.domain_size.is_finite() || self.domain_size <= 0.0 {
            return Err(SimError::Configuration(format!(
                "domain_size must be positive and finite, got {}",
                self.domain_size
            )));
        }
        if self.grid_size == 0 {
            return Err(SimError::Configuration(
                "grid_size must be at least 1".to_string(),
            ));
        }
        let dx = self.cell_width();
        if !dx.is_finite() || dx <= 0.0 {
            return Err(SimError::Configuration(format!(
                "cell width must be positive, got {dx}"
            )));
        }
        if self.particle_count == 0 {
            return Err(SimError::Configuration(
                "particle_count must be at least 1".to_string(),
            ));
        }
        if !self.gravity.is_finite() {
            return Err(SimError::Configuration(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::Configuration(format!(
                "dt must be positive and finite, got {}",
                self.dt
            )));
        }
        if !self.round_trip_tolerance.is_finite() || self.round_trip_tolerance <= 0.0 {
            return Err(SimError::Configuration(format!(
                "round_trip_tolerance must be positive, got {}",
                self.round_trip_tolerance
            )));
        }
        if let Some(budget) = self.time_budget_secs
            && (budget.is_nan() || budget < 0.0)
        {
            return Err(SimError::Configuration(format!(
                "time_budget_secs must be non-negative, got {budget}"
            )));
        }
        if !self.grid_size.is_power_of_two() {
            log::warn!(
                "grid_size {} is not a power of two; transforms will be slower",
                self.grid_size
            );
        }
        Ok(())
    }
}
