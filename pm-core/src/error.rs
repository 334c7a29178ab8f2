//! Error taxonomy for the particle-mesh pipeline.

use std::fmt;

use thiserror::Error;

/// One of the five per-step phases of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Deposit,
    Solve,
    Gradient,
    Gather,
    Integrate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Deposit => "deposit",
            Phase::Solve => "solve",
            Phase::Gradient => "gradient",
            Phase::Gather => "gather",
            Phase::Integrate => "integrate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("non-finite value produced at step {step} during {phase}")]
    NumericDegeneracy { step: usize, phase: Phase },

    #[error("spectral transform failure: {0}")]
    Transform(String),

    #[error("run already finished; a completed or aborted simulation cannot advance")]
    RunFinished,
}

pub type Result<T> = std::result::Result<T, SimError>;
