//! Basic matrix operations on operators and density matrices.
//!
//! All operators are represented as 2D complex-valued arrays. Stacks of
//! operators (e.g. a collection of jump operators) are 3D arrays whose first
//! (zero-th) axis indexes the operator.

use ndarray as nd;
use ndarray_linalg::{ Eigh, UPLO };
use num_complex::Complex64 as C64;
use crate::error::MEResult;

/// Compute the commutator `[A, B] = A B - B A`.
pub fn commutator<SA, SB>(
    A: &nd::ArrayBase<SA, nd::Ix2>,
    B: &nd::ArrayBase<SB, nd::Ix2>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    A.dot(B) - B.dot(A)
}

/// Compute the anti-commutator `{A, B} = A B + B A`.
pub fn anti_commutator<SA, SB>(
    A: &nd::ArrayBase<SA, nd::Ix2>,
    B: &nd::ArrayBase<SB, nd::Ix2>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    A.dot(B) + B.dot(A)
}

/// Compute the conjugate transpose of a matrix.
pub fn dagger<S>(A: &nd::ArrayBase<S, nd::Ix2>) -> nd::Array2<C64>
where S: nd::Data<Elem = C64>
{
    A.t().mapv(|a| a.conj())
}

/// Compute the conjugate transpose of every matrix in a stack, leaving the
/// stacking axis in place.
pub fn dagger_stack<S>(Ls: &nd::ArrayBase<S, nd::Ix3>) -> nd::Array3<C64>
where S: nd::Data<Elem = C64>
{
    Ls.view()
        .permuted_axes([0, 2, 1])
        .mapv(|a| a.conj())
        .as_standard_layout()
        .into_owned()
}

/// Stack a series of `n x n` operators along a new leading axis.
///
/// An empty series produces an array of shape `(0, n, n)`.
pub fn stack_ops(n: usize, ops: &[nd::Array2<C64>])
    -> Result<nd::Array3<C64>, nd::ShapeError>
{
    if ops.is_empty() {
        Ok(nd::Array3::zeros((0, n, n)))
    } else {
        nd::stack(
            nd::Axis(0),
            &ops.iter().map(|op| op.view()).collect::<Vec<_>>(),
        )
    }
}

/// Compute the trace of a matrix.
pub fn trace<S>(A: &nd::ArrayBase<S, nd::Ix2>) -> C64
where S: nd::Data<Elem = C64>
{
    A.diag().iter().sum()
}

/// Compute the purity `Tr(ρ²)` of a density matrix.
pub fn purity<S>(rho: &nd::ArrayBase<S, nd::Ix2>) -> f64
where S: nd::Data<Elem = C64>
{
    // Tr(ρ ρ) = Σ_ij ρ_ij ρ_ji, without forming the full product
    rho.indexed_iter()
        .map(|((i, j), rij)| rij * rho[[j, i]])
        .sum::<C64>()
        .re
}

/// Compute the expectation value `Tr(A ρ)`.
pub fn expectation<SA, SR>(
    A: &nd::ArrayBase<SA, nd::Ix2>,
    rho: &nd::ArrayBase<SR, nd::Ix2>,
) -> C64
where
    SA: nd::Data<Elem = C64>,
    SR: nd::Data<Elem = C64>,
{
    A.indexed_iter()
        .map(|((i, j), aij)| aij * rho[[j, i]])
        .sum()
}

/// Return `true` if `A` is square and equal to its own conjugate transpose to
/// within `tol` in every element.
pub fn is_hermitian<S>(A: &nd::ArrayBase<S, nd::Ix2>, tol: f64) -> bool
where S: nd::Data<Elem = C64>
{
    A.is_square()
        && A.indexed_iter()
            .all(|((i, j), aij)| (aij - A[[j, i]].conj()).norm() <= tol)
}

/// Compute the outer product `|a⟩⟨b|` of two state vectors.
pub fn outer_prod<SA, SB>(
    a: &nd::ArrayBase<SA, nd::Ix1>,
    b: &nd::ArrayBase<SB, nd::Ix1>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    nd::Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j].conj())
}

/// Construct the density matrix `|k⟩⟨k|` of the `k`-th basis state in an
/// `n`-dimensional space.
///
/// *Panics* if `k >= n`.
pub fn basis_density(n: usize, k: usize) -> nd::Array2<C64> {
    let mut rho: nd::Array2<C64> = nd::Array2::zeros((n, n));
    rho[[k, k]] = C64::from(1.0);
    rho
}

/// Pauli X.
pub fn sigma_x() -> nd::Array2<C64> {
    nd::array![
        [C64::from(0.0), C64::from(1.0)],
        [C64::from(1.0), C64::from(0.0)],
    ]
}

/// Pauli Y.
pub fn sigma_y() -> nd::Array2<C64> {
    nd::array![
        [C64::from(0.0), -C64::i()     ],
        [C64::i(),       C64::from(0.0)],
    ]
}

/// Pauli Z, `diag(1, -1)`.
///
/// The zero-th basis state is the upper (σ<sub>z</sub> = +1) level.
pub fn sigma_z() -> nd::Array2<C64> {
    nd::array![
        [C64::from(1.0), C64::from( 0.0)],
        [C64::from(0.0), C64::from(-1.0)],
    ]
}

/// Lowering operator `|1⟩⟨0|`, taking the upper level (index 0) to the lower
/// level (index 1).
pub fn sigma_minus() -> nd::Array2<C64> {
    nd::array![
        [C64::from(0.0), C64::from(0.0)],
        [C64::from(1.0), C64::from(0.0)],
    ]
}

/// Raising operator `|0⟩⟨1|`.
pub fn sigma_plus() -> nd::Array2<C64> { dagger(&sigma_minus()) }

/// Compute the propagator `exp(-i H t)` for a Hermitian Hamiltonian `H`.
///
/// Fails if `H` cannot be diagonalized.
pub fn unitary_propagator<S>(H: &nd::ArrayBase<S, nd::Ix2>, t: f64)
    -> MEResult<nd::Array2<C64>>
where S: nd::Data<Elem = C64>
{
    let (evals, V): (nd::Array1<f64>, nd::Array2<C64>) = H.eigh(UPLO::Lower)?;
    let phases = nd::Array2::from_diag(
        &evals.mapv(|ek| C64::from_polar(1.0, -ek * t)));
    Ok(V.dot(&phases).dot(&dagger(&V)))
}

/// Compute the closed-unitary-evolution state `U ρ0 U†` with `U = exp(-i H t)`.
///
/// Fails if `H` cannot be diagonalized.
pub fn unitary_evolve<SH, SR>(
    H: &nd::ArrayBase<SH, nd::Ix2>,
    rho0: &nd::ArrayBase<SR, nd::Ix2>,
    t: f64,
) -> MEResult<nd::Array2<C64>>
where
    SH: nd::Data<Elem = C64>,
    SR: nd::Data<Elem = C64>,
{
    let U = unitary_propagator(H, t)?;
    Ok(U.dot(rho0).dot(&dagger(&U)))
}
