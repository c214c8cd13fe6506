//! Direct solvers for dense linear systems
//!
//! This module provides direct (non-iterative) factorizations:
//! - [`lu_factorize`]: LU decomposition without, with partial, or with complete pivoting
//! - [`cholesky_factorize`]: Cholesky for SPD systems, optionally diagonally pivoted
//! - [`LinearSolver`]: stateful solver over one owned working matrix

pub mod cholesky;
pub mod lu;
pub mod permutation;
pub mod pivot;
mod solver;
pub mod triangular;

pub use cholesky::{CholeskyFactorization, cholesky_factorize};
pub use lu::{LuFactorization, LuPivoting, lu_factorize, lu_solve};
pub use permutation::Transpositions;
pub use solver::{
    DEFAULT_PIVOT_TOLERANCE, Factorization, LinearSolver, Mode, SolverConfig, Status,
};
pub use triangular::Diagonal;
