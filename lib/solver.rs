//! Single-step update rules and the registry of named solvers.
//!
//! New solvers are added as a variant of [`SolverKind`] and wired to a
//! concrete [`FixedStep`] implementation in [`SolverKind::build`].

use std::{ fmt, str::FromStr };
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    config::SolverOptions,
    error::{ MEError, MEResult },
    odeint::FixedStep,
};

/// Take a single classical fourth-order Runge-Kutta step, generic over the
/// dimension of the state array.
///
/// `rhs(t, y)` should compute the time derivative of `y` at time `t`.
pub fn rk4_step<D, F>(rhs: F, t: f64, dt: f64, y: &nd::Array<C64, D>)
    -> nd::Array<C64, D>
where
    D: nd::Dimension,
    F: Fn(f64, &nd::Array<C64, D>) -> nd::Array<C64, D>,
{
    let k1 = rhs(t, y);
    let k2 = rhs(t + dt / 2.0, &(y + &k1 * (dt / 2.0)));
    let k3 = rhs(t + dt / 2.0, &(y + &k2 * (dt / 2.0)));
    let k4 = rhs(t + dt, &(y + &k3 * dt));
    y + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

/// Fixed-step fourth-order Runge-Kutta solver for a given RHS.
#[derive(Clone)]
pub struct Rk4<F> {
    rhs: F,
    dt: f64,
}

impl<F> fmt::Debug for Rk4<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rk4 {{ rhs: ..., dt: {} }}", self.dt)
    }
}

impl<F> Rk4<F> {
    /// Create a new `Rk4`.
    ///
    /// Fails if `dt` is not finite and positive.
    pub fn new(rhs: F, dt: f64) -> MEResult<Self> {
        MEError::check_step_size(dt)?;
        Ok(Self { rhs, dt })
    }
}

impl<D, F> FixedStep<C64, D> for Rk4<F>
where
    D: nd::Dimension,
    F: Fn(f64, &nd::Array<C64, D>) -> nd::Array<C64, D>,
{
    fn dt(&self) -> f64 { self.dt }

    fn forward(&self, t: f64, dt: f64, y: &nd::Array<C64, D>)
        -> nd::Array<C64, D>
    {
        rk4_step(&self.rhs, t, dt, y)
    }
}

/// Supported solvers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SolverKind {
    /// Classical fourth-order Runge-Kutta with a fixed step size.
    Rk4,
}

impl SolverKind {
    /// Name by which the solver is selected.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rk4 => "rk4",
        }
    }

    /// Build the single-step solver for this kind around a RHS function, with
    /// the step size taken from `options`.
    ///
    /// Fails if `options` holds an invalid step size.
    pub fn build<'a, D, F>(self, rhs: F, options: &SolverOptions)
        -> MEResult<Box<dyn FixedStep<C64, D> + 'a>>
    where
        D: nd::Dimension,
        F: Fn(f64, &nd::Array<C64, D>) -> nd::Array<C64, D> + 'a,
    {
        match self {
            Self::Rk4 => Ok(Box::new(Rk4::new(rhs, options.step_size())?)),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SolverKind {
    type Err = MEError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rk4" => Ok(Self::Rk4),
            _ => Err(MEError::UnsupportedSolver(s.to_string())),
        }
    }
}
