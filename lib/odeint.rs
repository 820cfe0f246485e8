//! Fixed-step integration of first-order ODEs over a grid of save times.
//!
//! Integration always starts from *t* = 0 and proceeds in uniform steps until
//! the last requested save time, with the final step shrunk to land on it
//! exactly. States are recorded whenever the running time reaches or passes a
//! pending save time. In all output arrays, the first (zero-th) axis indexes
//! time.

use itertools::Itertools;
use ndarray::{ self as nd, Dimension };
use num_traits::Zero;
use tracing::trace;
use crate::error::{ MEError, MEResult };

/// Extend an array shape with a new leading axis.
pub trait NewAxis: nd::Dimension {
    fn new_axis(self, size: usize) -> <Self::Larger as Dimension>::Pattern;
}

impl NewAxis for nd::Ix0 {
    fn new_axis(self, new_size: usize) -> usize { new_size }
}

impl NewAxis for nd::Ix1 {
    fn new_axis(self, new_size: usize) -> (usize, usize) {
        let n = self.into_pattern();
        (new_size, n)
    }
}

impl NewAxis for nd::Ix2 {
    fn new_axis(self, new_size: usize) -> (usize, usize, usize) {
        let (a, b) = self.into_pattern();
        (new_size, a, b)
    }
}

impl NewAxis for nd::Ix3 {
    fn new_axis(self, new_size: usize) -> (usize, usize, usize, usize) {
        let (a, b, c) = self.into_pattern();
        (new_size, a, b, c)
    }
}

/// Different descriptions of a grid of save times, convertible to a single 1D
/// array.
#[derive(Clone, Debug, PartialEq)]
pub enum SaveTimes {
    /// A single 1D sequence.
    Flat(nd::Array1<f64>),
    /// A series of 1D sequences, to be concatenated in order.
    Nested(Vec<nd::Array1<f64>>),
    /// An array with more than one dimension, given by its shape. Never valid.
    MultiDim(Vec<usize>),
}

impl From<nd::Array1<f64>> for SaveTimes {
    fn from(t: nd::Array1<f64>) -> Self { Self::Flat(t) }
}

impl From<&nd::Array1<f64>> for SaveTimes {
    fn from(t: &nd::Array1<f64>) -> Self { Self::Flat(t.clone()) }
}

impl From<nd::ArrayView1<'_, f64>> for SaveTimes {
    fn from(t: nd::ArrayView1<'_, f64>) -> Self { Self::Flat(t.to_owned()) }
}

impl From<&[f64]> for SaveTimes {
    fn from(t: &[f64]) -> Self { Self::Flat(nd::Array1::from_vec(t.to_vec())) }
}

impl From<Vec<f64>> for SaveTimes {
    fn from(t: Vec<f64>) -> Self { Self::Flat(nd::Array1::from_vec(t)) }
}

impl<const N: usize> From<[f64; N]> for SaveTimes {
    fn from(t: [f64; N]) -> Self { Self::Flat(nd::Array1::from_vec(t.to_vec())) }
}

impl From<Vec<nd::Array1<f64>>> for SaveTimes {
    fn from(ts: Vec<nd::Array1<f64>>) -> Self { Self::Nested(ts) }
}

impl From<&[nd::Array1<f64>]> for SaveTimes {
    fn from(ts: &[nd::Array1<f64>]) -> Self { Self::Nested(ts.to_vec()) }
}

impl From<Vec<Vec<f64>>> for SaveTimes {
    fn from(ts: Vec<Vec<f64>>) -> Self {
        Self::Nested(ts.into_iter().map(nd::Array1::from_vec).collect())
    }
}

impl From<nd::Array2<f64>> for SaveTimes {
    fn from(t: nd::Array2<f64>) -> Self { Self::MultiDim(t.shape().to_vec()) }
}

impl SaveTimes {
    /// Convert to a single 1D array, concatenating nested sequences.
    ///
    /// Fails for [`Self::MultiDim`].
    pub fn into_array(self) -> MEResult<nd::Array1<f64>> {
        match self {
            Self::Flat(t) => Ok(t),
            Self::Nested(ts) => {
                Ok(ts.iter().flat_map(|t| t.iter().copied()).collect())
            },
            Self::MultiDim(shape) => Err(MEError::InvalidSaveTimes(
                format!("expected a 1D sequence; got an array with shape {shape:?}")
            )),
        }
    }
}

/// Check that a grid of save times is a non-empty, 1D, strictly ascending
/// sequence of finite, non-negative times, returning it as a 1D array.
pub fn validate_save_times<T>(tsave: T) -> MEResult<nd::Array1<f64>>
where T: Into<SaveTimes>
{
    let tsave = tsave.into().into_array()?;
    if tsave.is_empty() {
        return Err(MEError::InvalidSaveTimes(
            "save times must be a non-empty 1D sequence".into()
        ));
    }
    if let Some(bad) = tsave.iter().find(|t| !t.is_finite()) {
        return Err(MEError::InvalidSaveTimes(
            format!("save times must be finite; got {bad}")
        ));
    }
    if !tsave.iter().tuple_windows().all(|(tk, tkp1)| tkp1 - tk > 0.0) {
        return Err(MEError::InvalidSaveTimes(
            "save times are not sorted in ascending order or contain duplicate \
            values".into()
        ));
    }
    if tsave[0] < 0.0 {
        return Err(MEError::InvalidSaveTimes(
            format!("save times must be non-negative; got {}", tsave[0])
        ));
    }
    Ok(tsave)
}

/// Integrate from *t* = 0 with a fixed step size, recording the state at each
/// of `tsave`.
///
/// `step(t, dt, y)` should advance the state `y` at time `t` by a single step
/// of size `dt`. `dt` is used for every step except the last, which is shrunk
/// to land exactly on the final save time. Every save time reached or passed
/// by a step is filled with the state at the end of that step, so save times
/// spaced more finely than `dt` will hold repeated states; the initial state
/// is recorded only if `tsave[0] == 0`.
///
/// Returns the save times alongside the recorded states, with the first axis
/// indexing time. Fails if `dt` is not finite and positive, or if `tsave` is
/// invalid (see [`validate_save_times`]).
pub fn fixed_step_integrate<A, D, F>(
    step: F,
    y0: &nd::Array<A, D>,
    tsave: &nd::Array1<f64>,
    dt: f64,
) -> MEResult<(nd::Array1<f64>, nd::Array<A, D::Larger>)>
where
    A: Clone + Zero,
    D: NewAxis,
    D::Larger: nd::RemoveAxis,
    F: FnMut(f64, f64, &nd::Array<A, D>) -> nd::Array<A, D>,
{
    MEError::check_step_size(dt)?;
    let tsave = validate_save_times(tsave)?;
    let ysave = step_through(step, y0, &tsave, dt);
    Ok((tsave, ysave))
}

// `tsave` and `dt` must already have been validated.
pub(crate) fn step_through<A, D, F>(
    mut step: F,
    y0: &nd::Array<A, D>,
    tsave: &nd::Array1<f64>,
    dt: f64,
) -> nd::Array<A, D::Larger>
where
    A: Clone + Zero,
    D: NewAxis,
    D::Larger: nd::RemoveAxis,
    F: FnMut(f64, f64, &nd::Array<A, D>) -> nd::Array<A, D>,
{
    let n = tsave.len();
    let t_final = tsave[n - 1];
    let mut ysave: nd::Array<A, D::Larger>
        = nd::Array::zeros(y0.raw_dim().new_axis(n));
    let mut save_counter: usize = 0;
    if tsave[0] == 0.0 {
        ysave.index_axis_mut(nd::Axis(0), 0).assign(y0);
        save_counter += 1;
    }

    // times are computed from the step count, not accumulated
    let mut k: u64 = 0;
    let mut t: f64 = 0.0;
    let mut y: nd::Array<A, D> = y0.clone();
    let mut dtk: f64;
    let mut t_next: f64;
    while t < t_final {
        k += 1;
        t_next = k as f64 * dt;
        // last step is shrunk and pinned to t_final
        (dtk, t_next)
            = if t_next > t_final { (t_final - t, t_final) } else { (dt, t_next) };
        y = step(t, dtk, &y);
        t = t_next;
        while save_counter < n && t >= tsave[save_counter] {
            trace!(k = save_counter, t, "record state");
            ysave.index_axis_mut(nd::Axis(0), save_counter).assign(&y);
            save_counter += 1;
        }
    }
    ysave
}

/// A fixed-step integrator: something that can advance a state by a single
/// step and knows its own nominal step size.
pub trait FixedStep<A, D>
where D: nd::Dimension
{
    /// Nominal step size.
    fn dt(&self) -> f64;

    /// Advance the state `y` at time `t` by a step of size `dt`.
    fn forward(&self, t: f64, dt: f64, y: &nd::Array<A, D>) -> nd::Array<A, D>;
}

/// Integrate using a [`FixedStep`] solver, recording the state at each of
/// `tsave`.
///
/// See [`fixed_step_integrate`].
pub fn odeint<A, D, S, T>(solver: &S, y0: &nd::Array<A, D>, tsave: T)
    -> MEResult<(nd::Array1<f64>, nd::Array<A, D::Larger>)>
where
    A: Clone + Zero,
    D: NewAxis,
    D::Larger: nd::RemoveAxis,
    S: FixedStep<A, D> + ?Sized,
    T: Into<SaveTimes>,
{
    let tsave = validate_save_times(tsave)?;
    let dt = solver.dt();
    MEError::check_step_size(dt)?;
    let ysave = step_through(|t, dt, y| solver.forward(t, dt, y), y0, &tsave, dt);
    Ok((tsave, ysave))
}
