//! Top-level master equation solver.
//!
//! [`mesolve`] validates all of its inputs up front, builds the Lindbladian
//! (computing jump operator adjoints once), resolves the named solver, and
//! integrates from *t* = 0 through the last save time.

use std::path::Path;
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    config::SolverOptions,
    error::{ MEError, MEResult },
    lindblad::Lindbladian,
    odeint::{ FixedStep, SaveTimes, step_through, validate_save_times },
    operators::{ expectation, purity, trace },
    solver::SolverKind,
    write_npz,
};

/// Density matrices recorded at a series of save times.
///
/// States are stored in a single 3D array whose first axis indexes time.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    tsave: nd::Array1<f64>,
    states: nd::Array3<C64>,
}

impl Trajectory {
    /// Number of recorded states.
    pub fn len(&self) -> usize { self.tsave.len() }

    /// Return `true` if no states were recorded.
    pub fn is_empty(&self) -> bool { self.tsave.is_empty() }

    /// Return a reference to the save times.
    pub fn times(&self) -> &nd::Array1<f64> { &self.tsave }

    /// Return a reference to all recorded states.
    pub fn states(&self) -> &nd::Array3<C64> { &self.states }

    /// Return a view of the `k`-th recorded state, if it exists.
    pub fn state(&self, k: usize) -> Option<nd::ArrayView2<'_, C64>> {
        (k < self.len()).then(|| self.states.index_axis(nd::Axis(0), k))
    }

    /// Return a view of the last recorded state, if it exists.
    pub fn final_state(&self) -> Option<nd::ArrayView2<'_, C64>> {
        self.len().checked_sub(1).and_then(|k| self.state(k))
    }

    /// Iterate over `(time, state)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, nd::ArrayView2<'_, C64>)> + '_ {
        self.tsave.iter().copied()
            .zip(self.states.axis_iter(nd::Axis(0)))
    }

    /// Compute the trace of each state.
    pub fn traces(&self) -> nd::Array1<C64> {
        self.states.axis_iter(nd::Axis(0))
            .map(|rho| trace(&rho))
            .collect()
    }

    /// Compute the purity of each state.
    pub fn purities(&self) -> nd::Array1<f64> {
        self.states.axis_iter(nd::Axis(0))
            .map(|rho| purity(&rho))
            .collect()
    }

    /// Compute the expectation value of an operator for each state.
    pub fn expect<S>(&self, op: &nd::ArrayBase<S, nd::Ix2>) -> nd::Array1<C64>
    where S: nd::Data<Elem = C64>
    {
        self.states.axis_iter(nd::Axis(0))
            .map(|rho| expectation(op, &rho))
            .collect()
    }

    /// Unpack into save times and states.
    pub fn into_parts(self) -> (nd::Array1<f64>, nd::Array3<C64>) {
        (self.tsave, self.states)
    }

    /// Write save times and states to a `.npz` file as arrays `time` and `rho`.
    pub fn write_npz<P>(&self, path: P) -> MEResult<()>
    where P: AsRef<Path>
    {
        write_npz!(
            path.as_ref(),
            arrays: {
                "time" => &self.tsave,
                "rho" => &self.states,
            }
        )
    }
}

/// Numerically integrate the Lindblad equation for a time-independent
/// Hamiltonian `H` and jump operators `Ls`, using the solver named by
/// `solver`.
///
/// Returns the state at each of `tlist`; the state at *t* = 0 is `rho0`. Fails
/// immediately, before any integration, if `solver` does not name a supported
/// solver (currently only `"rk4"`), if the step size in `options` is not
/// positive, if `tlist` is not a valid grid of save times (see
/// [`validate_save_times`]), or if the operators and `rho0` do not share a
/// common square shape.
pub fn mesolve<T>(
    H: &nd::Array2<C64>,
    Ls: &[nd::Array2<C64>],
    rho0: &nd::Array2<C64>,
    tlist: T,
    solver: &str,
    options: &SolverOptions,
) -> MEResult<Trajectory>
where T: Into<SaveTimes>
{
    let kind: SolverKind = solver.parse()?;
    mesolve_with(H, Ls, rho0, tlist, kind, options)
}

/// Like [`mesolve`], but with the solver given as a [`SolverKind`].
pub fn mesolve_with<T>(
    H: &nd::Array2<C64>,
    Ls: &[nd::Array2<C64>],
    rho0: &nd::Array2<C64>,
    tlist: T,
    kind: SolverKind,
    options: &SolverOptions,
) -> MEResult<Trajectory>
where T: Into<SaveTimes>
{
    options.validate()?;
    let tsave = validate_save_times(tlist)?;
    let lindbladian = Lindbladian::new(H, Ls)?;
    MEError::check_square("initial state", rho0.shape(), lindbladian.dim())?;
    debug!(
        solver = %kind,
        dim = lindbladian.dim(),
        num_jump_ops = lindbladian.num_jump_ops(),
        num_save = tsave.len(),
        t_final = tsave[tsave.len() - 1],
        step_size = options.step_size(),
        "integrating Lindblad equation"
    );
    let solver: Box<dyn FixedStep<C64, nd::Ix2> + '_>
        = kind.build(lindbladian.rhs_fn(), options)?;
    let states = step_through(
        |t, dt, y| solver.forward(t, dt, y), rho0, &tsave, solver.dt());
    Ok(Trajectory { tsave, states })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::operators::*;

    const GAMMA: f64 = 0.1;

    fn decay_problem() -> (nd::Array2<C64>, Vec<nd::Array2<C64>>, nd::Array2<C64>) {
        let H = sigma_z() * 0.5;
        let Ls = vec![sigma_minus() * GAMMA.sqrt()];
        let rho0 = basis_density(2, 0);
        (H, Ls, rho0)
    }

    fn mixed_state() -> nd::Array2<C64> {
        nd::array![
            [C64::new(0.7, 0.0), C64::new(0.2, -0.3)],
            [C64::new(0.2, 0.3), C64::new(0.3, 0.0)],
        ]
    }

    #[test]
    fn qubit_decay() {
        let (H, Ls, rho0) = decay_problem();
        let tsave = [0.0, 1.0, 5.0, 10.0];
        let traj = mesolve(&H, &Ls, &rho0, tsave, "rk4", &SolverOptions::new())
            .unwrap();
        assert_eq!(traj.len(), 4);
        assert_eq!(traj.times(), &nd::arr1(&tsave));
        assert_eq!(traj.state(0).unwrap(), rho0);
        for (t, rho) in traj.iter() {
            assert_abs_diff_eq!(rho[[0, 0]].re, (-GAMMA * t).exp(), epsilon = 1e-6);
            assert_abs_diff_eq!(rho[[1, 1]].re, 1.0 - (-GAMMA * t).exp(), epsilon = 1e-6);
            assert_abs_diff_eq!(rho[[0, 1]].norm(), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(trace(&rho).re, 1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(trace(&rho).im, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn intermediate_save_times_are_on_time() {
        let (H, Ls, rho0) = decay_problem();
        let tsave = [0.0, 1.0, 2.0, 3.0];
        let traj = mesolve(&H, &Ls, &rho0, tsave, "rk4", &SolverOptions::new())
            .unwrap();
        assert_eq!(traj.times(), &nd::arr1(&tsave));
        for (t, rho) in traj.iter() {
            assert_abs_diff_eq!(rho[[0, 0]].re, (-GAMMA * t).exp(), epsilon = 1e-6);
        }
        // a one-step delay would show up well above RK4 error
        assert_abs_diff_eq!(
            traj.state(2).unwrap()[[0, 0]].re, (-GAMMA * 2.0).exp(), epsilon = 1e-10);
    }

    #[test]
    fn preserves_trace_and_hermiticity() {
        let H = sigma_z() * 0.5 + sigma_x() * 0.8;
        let Ls = [sigma_minus() * 0.3, sigma_z() * 0.2];
        let traj = mesolve(
            &H, &Ls, &mixed_state(), [0.0, 0.5, 1.5, 3.0], "rk4",
            &SolverOptions::new().with_step_size(0.01),
        ).unwrap();
        for tr in traj.traces().iter() {
            assert_abs_diff_eq!(tr.re, 1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(tr.im, 0.0, epsilon = 1e-6);
        }
        for (_, rho) in traj.iter() {
            assert!(is_hermitian(&rho, 1e-9));
        }
    }

    #[test]
    fn dephasing_reduces_purity() {
        let H = sigma_z() * 0.5;
        let Ls = [sigma_z() * 0.5];
        let rho0 = nd::Array2::from_elem((2, 2), C64::from(0.5));
        let traj = mesolve(&H, &Ls, &rho0, [0.0, 1.0, 2.0, 3.0], "rk4", &SolverOptions::new())
            .unwrap();
        let purities = traj.purities();
        assert_abs_diff_eq!(purities[0], 1.0, epsilon = 1e-15);
        assert!(purities.iter().zip(purities.iter().skip(1)).all(|(p, q)| q < p));
        // populations are untouched by dephasing
        for (_, rho) in traj.iter() {
            assert_abs_diff_eq!(rho[[0, 0]].re, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn reduces_to_unitary_evolution() {
        let H = sigma_x() * 0.6 + sigma_z() * 0.25;
        let rho0 = mixed_state();
        let tsave = nd::array![0.0, 0.3, 0.7, 1.0];
        let traj = mesolve(&H, &[], &rho0, &tsave, "rk4", &SolverOptions::new())
            .unwrap();
        for (t, rho) in traj.iter() {
            let expected = unitary_evolve(&H, &rho0, t).unwrap();
            rho.iter().zip(&expected)
                .for_each(|(a, b)| {
                    assert_abs_diff_eq!((a - b).norm(), 0.0, epsilon = 1e-9)
                });
        }
        assert_abs_diff_eq!(traj.purities()[3], purity(&rho0), epsilon = 1e-9);
    }

    #[test]
    fn records_initial_state_exactly() {
        let (H, Ls, rho0) = decay_problem();
        let traj = mesolve(&H, &Ls, &rho0, [0.0, 0.2, 0.4], "rk4", &SolverOptions::new())
            .unwrap();
        assert_eq!(traj.len(), 3);
        assert_eq!(traj.state(0).unwrap(), rho0);
        assert!(traj.state(3).is_none());
        assert_ne!(traj.final_state().unwrap(), rho0);
    }

    #[test]
    fn expectation_values_follow_decay() {
        let (H, Ls, rho0) = decay_problem();
        let traj = mesolve(&H, &Ls, &rho0, [0.0, 1.0, 5.0], "rk4", &SolverOptions::new())
            .unwrap();
        let sz = traj.expect(&sigma_z());
        for (t, z) in traj.times().iter().zip(&sz) {
            assert_abs_diff_eq!(z.re, 2.0 * (-GAMMA * t).exp() - 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn rejects_unsupported_solver() {
        let (H, Ls, rho0) = decay_problem();
        assert!(matches!(
            mesolve(&H, &Ls, &rho0, [0.0, 1.0], "euler", &SolverOptions::new()),
            Err(MEError::UnsupportedSolver(name)) if name == "euler"
        ));
    }

    #[test]
    fn rejects_invalid_inputs_eagerly() {
        let (H, Ls, rho0) = decay_problem();
        let opts = SolverOptions::new();
        assert!(matches!(
            mesolve(&H, &Ls, &rho0, [0.0, 1.0], "rk4", &opts.with_step_size(0.0)),
            Err(MEError::InvalidStepSize(_))
        ));
        assert!(matches!(
            mesolve(&H, &Ls, &rho0, [0.0, 1.0, 1.0, 2.0], "rk4", &opts),
            Err(MEError::InvalidSaveTimes(_))
        ));
        assert!(matches!(
            mesolve(&H, &Ls, &rho0, Vec::<f64>::new(), "rk4", &opts),
            Err(MEError::InvalidSaveTimes(_))
        ));
        let rho3 = basis_density(3, 0);
        assert!(matches!(
            mesolve(&H, &Ls, &rho3, [0.0, 1.0], "rk4", &opts),
            Err(MEError::DimensionMismatch(_))
        ));
        let L3 = nd::Array2::zeros((3, 3));
        assert!(matches!(
            mesolve(&H, &[L3], &rho0, [0.0, 1.0], "rk4", &opts),
            Err(MEError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn accepts_nested_save_times() {
        let (H, Ls, rho0) = decay_problem();
        let tlist = vec![vec![0.0, 0.5], vec![1.0]];
        let traj = mesolve(&H, &Ls, &rho0, tlist, "rk4", &SolverOptions::new())
            .unwrap();
        assert_eq!(traj.times(), &nd::array![0.0, 0.5, 1.0]);
    }

    #[test]
    fn writes_npz() {
        let (H, Ls, rho0) = decay_problem();
        let traj = mesolve(&H, &Ls, &rho0, [0.0, 0.1], "rk4", &SolverOptions::new())
            .unwrap();
        let path = std::env::temp_dir()
            .join(format!("mesolve_traj_{}.npz", std::process::id()));
        traj.write_npz(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        std::fs::remove_file(&path).unwrap();
    }
}
