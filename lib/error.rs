//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use ndarray_linalg::error::LinalgError;
use thiserror::Error;

/// Returned from master equation solver functions.
#[derive(Debug, Error)]
pub enum MEError {
    /// Returned when a solver name does not correspond to a known
    /// [`SolverKind`][crate::solver::SolverKind].
    #[error("invalid solver '{0}' (supported: 'rk4')")]
    UnsupportedSolver(String),

    /// Returned when a save-time grid is empty, multi-dimensional, or not
    /// strictly ascending.
    #[error("invalid save times: {0}")]
    InvalidSaveTimes(String),

    /// Returned when a non-positive or non-finite step size is encountered.
    #[error("step size must be finite and greater than 0; got {0}")]
    InvalidStepSize(f64),

    /// Returned when the Hamiltonian, jump operators, and initial state do not
    /// all share the same square shape.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Returned when a recognized solver option holds a malformed value.
    #[error("bad value for option '{key}': {reason}")]
    BadOption { key: String, reason: String },

    /// [`toml::de::Error`].
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// [`LinalgError`].
    #[error("linalg error: {0}")]
    Linalg(#[from] LinalgError),

    /// [`ndarray_npy::WriteNpzError`].
    #[error("npz write error: {0}")]
    Npz(#[from] ndarray_npy::WriteNpzError),

    /// [`std::io::Error`].
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MEResult<T> = Result<T, MEError>;

impl MEError {
    pub(crate) fn check_step_size(dt: f64) -> MEResult<()> {
        (dt.is_finite() && dt > 0.0).then_some(())
            .ok_or(Self::InvalidStepSize(dt))
    }

    pub(crate) fn check_square(name: &str, shape: &[usize], n: usize)
        -> MEResult<()>
    {
        (shape == [n, n]).then_some(())
            .ok_or_else(|| {
                Self::DimensionMismatch(
                    format!("expected {name} with shape [{n}, {n}]; got {shape:?}")
                )
            })
    }
}
