//! Particle-mesh gravity on a 2-D periodic domain.
//!
//! Main components:
//! - [`particles`] — unit-mass bodies and seeded initial placement.
//! - [`mesh`] — periodic mesh geometry, NGP binning and step-scoped grids.
//! - [`density`] — mass deposition with exact per-cell accumulation.
//! - [`transform`] — the 2-D spectral transform seam and its FFT backend.
//! - [`poisson`] — spectral Poisson solve for the potential.
//! - [`force`] — centered-difference force field `-∇φ`.
//! - [`interpolate`] — gathers per-particle forces from the field.
//! - [`integrator`] — kick-drift update with periodic wrap.
//! - [`phases`] — the ordered per-step pipeline.
//! - [`driver`] — run state machine and snapshot recording.
//! - [`history`] — per-step snapshots of positions and velocities.
//! - [`config`] — run parameters and their validation.
//! - [`error`] — error taxonomy.
//! - [`types`] — shared type aliases.

pub mod config;
pub mod density;
pub mod driver;
pub mod error;
pub mod force;
pub mod history;
pub mod integrator;
pub mod interpolate;
pub mod mesh;
pub mod particles;
pub mod phases;
pub mod poisson;
pub mod transform;
pub mod types;

pub use config::{Config, DepositStrategy};
pub use driver::{DriverState, Simulation};
pub use error::{Phase, Result, SimError};
pub use history::{History, Snapshot};
pub use particles::{Particle, ParticleSet};
