//! Triangular solves on packed factors
//!
//! The factor matrix is the packed working buffer of a factorization, so
//! each routine reads only its own triangle and ignores the rest.

use crate::dense::{Matrix, Vector};
use crate::error::{Result, SolverError};
use ndarray::Array1;

/// How the diagonal of a lower-triangular factor is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagonal {
    /// Implicit ones (LU multipliers), no division
    Unit,
    /// Stored diagonal (Cholesky), divide by it
    NonUnit,
}

/// Forward substitution `L·y = b` over the first `rank` rows.
///
/// Rows at or beyond `rank` are left zero. This truncation is applied to the
/// forward pass only; the backward pass always covers every row.
pub fn solve_lower(factor: &Matrix, b: &Vector, rank: usize, diagonal: Diagonal) -> Result<Vector> {
    let n = check_dims(factor, b)?;
    let mut y = Array1::zeros(n);
    for i in 0..rank.min(n) {
        let mut sum = b[i];
        for j in 0..i {
            sum -= factor[[i, j]] * y[j];
        }
        y[i] = match diagonal {
            Diagonal::Unit => sum,
            Diagonal::NonUnit => sum / factor[[i, i]],
        };
    }
    Ok(y)
}

/// Backward substitution `U·x = y` with U the upper triangle of `factor`
pub fn solve_upper(factor: &Matrix, y: &Vector) -> Result<Vector> {
    let n = check_dims(factor, y)?;
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= factor[[i, j]] * x[j];
        }
        x[i] = sum / factor[[i, i]];
    }
    Ok(x)
}

/// Backward substitution `Lᵗ·x = y` with L the lower triangle of `factor`
pub fn solve_lower_transpose(factor: &Matrix, y: &Vector) -> Result<Vector> {
    let n = check_dims(factor, y)?;
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= factor[[j, i]] * x[j];
        }
        x[i] = sum / factor[[i, i]];
    }
    Ok(x)
}

fn check_dims(factor: &Matrix, b: &Vector) -> Result<usize> {
    let (n, cols) = factor.dim();
    if n != cols {
        return Err(SolverError::NotSquare { rows: n, cols });
    }
    if b.len() != n {
        return Err(SolverError::DimensionMismatch {
            expected: n,
            got: b.len(),
        });
    }
    Ok(n)
}
