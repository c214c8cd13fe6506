//! LU decomposition
//!
//! Gaussian elimination with no, partial (row) or complete (row and column)
//! pivoting. The factors are packed into the working matrix: the strictly
//! lower triangle holds L's multipliers (unit diagonal implied) and the upper
//! triangle, diagonal included, holds U.

use super::permutation::Transpositions;
use super::pivot::{complete_pivot, partial_pivot};
use super::triangular::{Diagonal, solve_lower, solve_upper};
use crate::dense::{DenseMatrixExt, Matrix, Vector};
use crate::error::{Result, SolverError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Pivoting strategy for LU elimination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LuPivoting {
    /// Plain elimination, fails on the first zero pivot
    None,
    /// Largest magnitude in the pivot column (`P·A = L·U`)
    #[default]
    Partial,
    /// Largest magnitude in the trailing block (`P·A·Q = L·U`)
    Complete,
}

/// LU factorization result
///
/// Stores the packed L and U factors along with the recorded row and column
/// transpositions.
#[derive(Debug, Clone)]
pub struct LuFactorization {
    /// Combined L and U matrices (L is unit lower triangular, stored below diagonal)
    pub lu: Matrix,
    /// Strategy used to build the factors
    pub pivoting: LuPivoting,
    /// Row swaps, one per elimination step
    pub row_perm: Transpositions,
    /// Column swaps (identity unless pivoting is complete)
    pub col_perm: Transpositions,
}

impl LuFactorization {
    /// Matrix order
    pub fn order(&self) -> usize {
        self.lu.nrows()
    }

    /// Unit lower-triangular factor L
    pub fn lower(&self) -> Matrix {
        let n = self.order();
        let mut l = Array2::eye(n);
        for i in 1..n {
            for j in 0..i {
                l[[i, j]] = self.lu[[i, j]];
            }
        }
        l
    }

    /// Upper-triangular factor U
    pub fn upper(&self) -> Matrix {
        let n = self.order();
        let mut u = Array2::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                u[[i, j]] = self.lu[[i, j]];
            }
        }
        u
    }

    /// Numerical rank.
    ///
    /// Only complete pivoting orders the diagonal of U by magnitude, so the
    /// other strategies always report full rank. With complete pivoting the
    /// rank is the number of leading diagonal entries with
    /// `|u_ii| >= |u_00| * tolerance * n`.
    pub fn rank(&self, tolerance: f64) -> usize {
        let n = self.order();
        if self.pivoting != LuPivoting::Complete {
            return n;
        }
        let threshold = self.lu[[0, 0]].abs() * tolerance * n as f64;
        (0..n)
            .position(|i| self.lu[[i, i]].abs() < threshold)
            .unwrap_or(n)
    }

    /// Solve `A·x = b`, using only the first `rank` rows in the forward pass.
    pub fn solve(&self, b: &Vector, rank: usize) -> Result<Vector> {
        let n = self.order();
        if b.len() != n {
            return Err(SolverError::DimensionMismatch {
                expected: n,
                got: b.len(),
            });
        }

        let mut pb = b.clone();
        self.row_perm.apply_forward(&mut pb);
        let y = solve_lower(&self.lu, &pb, rank, Diagonal::Unit)?;
        let mut x = solve_upper(&self.lu, &y)?;
        self.col_perm.apply_reverse(&mut x);
        Ok(x)
    }

    /// Product of U's diagonal with the sign of the recorded swaps
    pub fn determinant(&self) -> f64 {
        let swaps = self.row_perm.swap_count() + self.col_perm.swap_count();
        let sign = if swaps % 2 == 0 { 1.0 } else { -1.0 };
        sign * self.lu.diag().iter().product::<f64>()
    }

    /// Apply the recorded row swaps and then the column swaps to `m`.
    ///
    /// For the factorized matrix this yields `P·A·Q`, which should equal `L·U`.
    pub fn permute(&self, m: &Matrix) -> Matrix {
        let mut out = m.clone();
        self.row_perm.permute_rows(&mut out);
        self.col_perm.permute_cols(&mut out);
        out
    }
}

/// Factorize `a` in place.
///
/// Runs `n - 1` elimination steps; the last diagonal entry is never pivoted
/// and is allowed to be zero. On error `a` is left partially eliminated.
pub fn lu_in_place(
    a: &mut Matrix,
    pivoting: LuPivoting,
) -> Result<(Transpositions, Transpositions)> {
    let (n, cols) = a.dim();
    if n == 0 || cols == 0 {
        return Err(SolverError::EmptyMatrix);
    }
    if n != cols {
        return Err(SolverError::NotSquare { rows: n, cols });
    }

    let mut row_perm = Transpositions::identity(n);
    let mut col_perm = Transpositions::identity(n);

    for k in 0..n - 1 {
        match pivoting {
            LuPivoting::None => {}
            LuPivoting::Partial => {
                let p = partial_pivot(a, k);
                if p != k {
                    log::debug!("LU step {}: swapping rows {} and {}", k, k, p);
                }
                a.swap_rows(k, p);
                row_perm.record(k, p);
            }
            LuPivoting::Complete => {
                let (p, q) = complete_pivot(a, k);
                if (p, q) != (k, k) {
                    log::debug!("LU step {}: pivot moved from ({}, {})", k, p, q);
                }
                a.swap_rows(k, p);
                a.swap_cols(k, q);
                row_perm.record(k, p);
                col_perm.record(k, q);
            }
        }

        let pivot = a[[k, k]];
        if pivot == 0.0 {
            log::warn!("LU ({:?} pivoting): zero pivot at step {}", pivoting, k);
            return Err(SolverError::SingularPivot { step: k });
        }

        // Compute multipliers and eliminate
        for i in (k + 1)..n {
            a[[i, k]] /= pivot;
        }
        for i in (k + 1)..n {
            let mult = a[[i, k]];
            for j in (k + 1)..n {
                let update = mult * a[[k, j]];
                a[[i, j]] -= update;
            }
        }
    }

    if a[[n - 1, n - 1]] == 0.0 && pivoting != LuPivoting::Complete {
        log::warn!("LU: last diagonal entry of U is exactly zero, solves will not be finite");
    }
    log::debug!("LU ({:?} pivoting) of order {} succeeded", pivoting, n);

    Ok((row_perm, col_perm))
}

/// Compute an LU factorization of a copy of `a`
pub fn lu_factorize(a: &Matrix, pivoting: LuPivoting) -> Result<LuFactorization> {
    let mut lu = a.clone();
    let (row_perm, col_perm) = lu_in_place(&mut lu, pivoting)?;
    Ok(LuFactorization {
        lu,
        pivoting,
        row_perm,
        col_perm,
    })
}

/// Solve Ax = b using LU decomposition with partial pivoting
///
/// This is a convenience function that combines factorization and solve.
pub fn lu_solve(a: &Matrix, b: &Vector) -> Result<Vector> {
    let factorization = lu_factorize(a, LuPivoting::Partial)?;
    factorization.solve(b, factorization.order())
}
