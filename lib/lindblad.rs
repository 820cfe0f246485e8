//! Right-hand side of the Lindblad master equation.
//!
//! For a Hamiltonian *H* and a set of jump operators *L<sub>k</sub>*, the
//! density matrix *ρ* evolves as
//! ```text
//! dρ/dt = -i [H, ρ] + Σ_k ( L_k ρ L_k† - ½ {L_k† L_k, ρ} )
//! ```
//! where all decay rates are assumed to have been absorbed into the jump
//! operators (i.e. a channel with rate *γ* and bare operator *A* is passed as
//! *L* = √*γ* *A*).

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::{ MEError, MEResult },
    operators::{ anti_commutator, commutator, dagger_stack, stack_ops },
};

/// Compute the dissipator for a single jump operator `L`, given its
/// pre-computed adjoint `Ldag`.
pub fn dissipator<SL, SD, SR>(
    L: &nd::ArrayBase<SL, nd::Ix2>,
    Ldag: &nd::ArrayBase<SD, nd::Ix2>,
    rho: &nd::ArrayBase<SR, nd::Ix2>,
) -> nd::Array2<C64>
where
    SL: nd::Data<Elem = C64>,
    SD: nd::Data<Elem = C64>,
    SR: nd::Data<Elem = C64>,
{
    let LdagL = Ldag.dot(L);
    L.dot(rho).dot(Ldag) - anti_commutator(&LdagL, rho) * 0.5
}

/// Compute the full RHS of the Lindblad equation.
///
/// `Ls` and `Lsdag` are stacks of jump operators and their adjoints, with the
/// first axis indexing the operator; dissipators are summed over this axis. An
/// empty stack (shape `(0, n, n)`) gives the Liouville equation.
///
/// *Panics* if the shapes of `H`, `rho`, and the operators in `Ls` and `Lsdag`
/// are incompatible for matrix multiplication. See [`Lindbladian::new`] for a
/// checked construction.
pub fn lindbladian<SH, SL, SD, SR>(
    H: &nd::ArrayBase<SH, nd::Ix2>,
    Ls: &nd::ArrayBase<SL, nd::Ix3>,
    Lsdag: &nd::ArrayBase<SD, nd::Ix3>,
    rho: &nd::ArrayBase<SR, nd::Ix2>,
) -> nd::Array2<C64>
where
    SH: nd::Data<Elem = C64>,
    SL: nd::Data<Elem = C64>,
    SD: nd::Data<Elem = C64>,
    SR: nd::Data<Elem = C64>,
{
    assert_eq!(
        Ls.shape(), Lsdag.shape(),
        "lindbladian: jump operator and adjoint stacks differ in shape"
    );
    let mut drho: nd::Array2<C64> = -C64::i() * commutator(H, rho);
    Ls.outer_iter().zip(Lsdag.outer_iter())
        .for_each(|(L, Ldag)| { drho += &dissipator(&L, &Ldag, rho); });
    drho
}

/// A fixed Lindbladian generator: a Hamiltonian and a stack of jump operators
/// whose adjoints are computed once upon construction.
#[derive(Clone, Debug)]
pub struct Lindbladian {
    H: nd::Array2<C64>,
    Ls: nd::Array3<C64>,
    Lsdag: nd::Array3<C64>,
}

impl Lindbladian {
    /// Create a new `Lindbladian`.
    ///
    /// Fails if `H` is not square or any jump operator differs in shape from
    /// `H`.
    pub fn new(H: &nd::Array2<C64>, Ls: &[nd::Array2<C64>]) -> MEResult<Self> {
        let n = H.nrows();
        MEError::check_square("Hamiltonian", H.shape(), n)?;
        Ls.iter().enumerate()
            .try_for_each(|(k, L)| {
                MEError::check_square(&format!("jump operator {k}"), L.shape(), n)
            })?;
        let Ls = stack_ops(n, Ls)
            .map_err(|e| MEError::DimensionMismatch(e.to_string()))?;
        let Lsdag = dagger_stack(&Ls);
        Ok(Self { H: H.clone(), Ls, Lsdag })
    }

    /// Dimension of the Hilbert space.
    pub fn dim(&self) -> usize { self.H.nrows() }

    /// Number of jump operators.
    pub fn num_jump_ops(&self) -> usize { self.Ls.len_of(nd::Axis(0)) }

    /// Return a reference to the Hamiltonian.
    pub fn hamiltonian(&self) -> &nd::Array2<C64> { &self.H }

    /// Return a reference to the stacked jump operators.
    pub fn jump_ops(&self) -> &nd::Array3<C64> { &self.Ls }

    /// Return a reference to the stacked jump operator adjoints.
    pub fn jump_ops_dag(&self) -> &nd::Array3<C64> { &self.Lsdag }

    /// Evaluate the RHS of the Lindblad equation for a density matrix.
    pub fn rhs<S>(&self, rho: &nd::ArrayBase<S, nd::Ix2>) -> nd::Array2<C64>
    where S: nd::Data<Elem = C64>
    {
        lindbladian(&self.H, &self.Ls, &self.Lsdag, rho)
    }

    /// Return a closure capturing `self` that evaluates the RHS, with the
    /// (unused) time argument expected by the step functions in
    /// [`solver`][crate::solver].
    pub fn rhs_fn(&self) -> impl Fn(f64, &nd::Array2<C64>) -> nd::Array2<C64> + '_ {
        move |_t: f64, rho: &nd::Array2<C64>| self.rhs(rho)
    }
}
