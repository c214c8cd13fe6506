//! Dense direct linear solvers
//!
//! This crate factorizes square dense matrices and solves linear systems with
//! the factors, tracking the row and column swaps made by pivoting.
//!
//! # Features
//!
//! - **LU Decomposition**: no pivoting, partial (row) pivoting, or complete pivoting with rank
//! - **Cholesky Decomposition**: plain, and diagonally pivoted for semi-definite inputs
//! - **Triangular Solves**: forward and backward substitution on packed factors
//! - **Permutations**: transposition sequences, explicit permutation matrices
//! - **Dense Utilities**: norms, submatrices, random test matrices, a plain-text matrix format
//!
//! # Example
//!
//! ```rust
//! use math_audio_dense::{LinearSolver, SolverError};
//! use ndarray::array;
//!
//! let a = array![[4.0, 12.0, -16.0], [12.0, 37.0, -43.0], [-16.0, -43.0, 98.0]];
//! let mut solver = LinearSolver::from_matrix(&a)?;
//! solver.chole_decomp()?;
//!
//! let x = solver.solve(&array![1.0, 2.0, 3.0])?;
//! assert_eq!(x.len(), 3);
//! # Ok::<(), SolverError>(())
//! ```

pub mod dense;
pub mod direct;
pub mod error;

// Re-export main types
pub use dense::{DenseMatrixExt, Matrix, Vector};
pub use error::{Result, SolverError};

// Re-export direct solvers
pub use direct::{
    CholeskyFactorization, Factorization, LinearSolver, LuFactorization, LuPivoting, Mode,
    SolverConfig, Status, Transpositions, cholesky_factorize, lu_factorize, lu_solve,
};
