#![allow(dead_code, non_snake_case, non_upper_case_globals)]

//! Fixed-step integration of the Lindblad master equation
//! ```text
//! dρ/dt = -i[H, ρ] + Σ_k (L_k ρ L_k^† - ½{L_k^† L_k, ρ})
//! ```
//! for a time-independent Hamiltonian and a set of jump operators.
//!
//! The main entry point is [`mesolve`], which returns the density matrix at
//! each of a grid of save times as a [`Trajectory`].

pub mod error;
pub mod utils;
pub mod operators;
pub mod lindblad;
pub mod odeint;
pub mod solver;
pub mod config;
pub mod mesolve;

pub use error::{ MEError, MEResult };
pub use config::SolverOptions;
pub use solver::SolverKind;
pub use mesolve::{ Trajectory, mesolve, mesolve_with };
