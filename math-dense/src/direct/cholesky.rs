//! Cholesky decomposition
//!
//! `A = L·Lᵗ` for symmetric positive-definite `A`, and the diagonally pivoted
//! variant `P·A·Pᵗ = L·Lᵗ` for positive semi-definite or numerically marginal
//! inputs. L is stored in the lower triangle of the working matrix.

use super::permutation::Transpositions;
use super::pivot::diagonal_pivot;
use super::triangular::{Diagonal, solve_lower, solve_lower_transpose};
use crate::dense::{DenseMatrixExt, Matrix, Vector};
use crate::error::{Result, SolverError};
use ndarray::Array2;

/// Cholesky factorization result
#[derive(Debug, Clone)]
pub struct CholeskyFactorization {
    /// Working matrix with L in its lower triangle (diagonal included)
    pub l: Matrix,
    /// Symmetric swaps, present only for the pivoted variant
    pub perm: Option<Transpositions>,
}

impl CholeskyFactorization {
    /// Matrix order
    pub fn order(&self) -> usize {
        self.l.nrows()
    }

    /// `true` if built with diagonal pivoting
    pub fn is_pivoted(&self) -> bool {
        self.perm.is_some()
    }

    /// Lower-triangular factor L with zeros above the diagonal
    pub fn factor(&self) -> Matrix {
        let n = self.order();
        let mut l = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                l[[i, j]] = self.l[[i, j]];
            }
        }
        l
    }

    /// Solve `A·x = b`
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        let n = self.order();
        if b.len() != n {
            return Err(SolverError::DimensionMismatch {
                expected: n,
                got: b.len(),
            });
        }

        let mut pb = b.clone();
        if let Some(perm) = &self.perm {
            perm.apply_forward(&mut pb);
        }
        let y = solve_lower(&self.l, &pb, n, Diagonal::NonUnit)?;
        let mut x = solve_lower_transpose(&self.l, &y)?;
        if let Some(perm) = &self.perm {
            perm.apply_reverse(&mut x);
        }
        Ok(x)
    }

    /// Square of the product of L's diagonal
    pub fn determinant(&self) -> f64 {
        let d: f64 = self.l.diag().iter().product();
        d * d
    }

    /// Explicit permutation matrix `P` with `Pᵗ·A·P = L·Lᵗ`
    pub fn permutation_matrix(&self) -> Matrix {
        match &self.perm {
            Some(perm) => perm.to_matrix().t().to_owned(),
            None => Array2::eye(self.order()),
        }
    }

    /// Apply the symmetric swaps to rows and then columns of `m`.
    ///
    /// For the factorized matrix this yields `Pᵗ·A·P`, which should equal
    /// `L·Lᵗ`. Without pivoting `m` is returned unchanged.
    pub fn permute(&self, m: &Matrix) -> Matrix {
        let mut out = m.clone();
        if let Some(perm) = &self.perm {
            perm.permute_rows(&mut out);
            perm.permute_cols(&mut out);
        }
        out
    }
}

fn check_square(a: &Matrix) -> Result<usize> {
    let (n, cols) = a.dim();
    if n == 0 || cols == 0 {
        return Err(SolverError::EmptyMatrix);
    }
    if n != cols {
        return Err(SolverError::NotSquare { rows: n, cols });
    }
    Ok(n)
}

/// Factorize a symmetric positive-definite `a` in place.
///
/// Only the lower triangle of `a` is read. Fails with
/// `NotPositiveDefinite { step: i }` when the `i`-th diagonal would be
/// `sqrt` of a non-positive value.
pub fn cholesky_in_place(a: &mut Matrix) -> Result<()> {
    let n = check_square(a)?;

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += a[[i, k]] * a[[j, k]];
            }

            if i == j {
                let d = a[[i, i]] - sum;
                // also rejects NaN
                if !(d > 0.0) {
                    log::warn!("Cholesky: non-positive diagonal {:e} at row {}", d, i);
                    return Err(SolverError::NotPositiveDefinite { step: i });
                }
                a[[i, i]] = d.sqrt();
            } else {
                a[[i, j]] = (a[[i, j]] - sum) / a[[j, j]];
            }
        }
    }

    log::debug!("Cholesky of order {} succeeded", n);
    Ok(())
}

/// Factorize `a` in place with diagonal pivoting.
///
/// At step `k` the largest remaining diagonal is swapped (row and column)
/// into position `k`. The factorization stops with
/// `NotPositiveDefinite { step: k }` once that diagonal is not positive;
/// `k` is then the numerical rank. With `cutoff = Some(t)` it also stops
/// once the diagonal is no larger than `t * n * d_max`, `d_max` being the
/// largest initial diagonal. The full symmetric matrix is updated, so both
/// triangles of `a` must be filled in.
pub fn cholesky_pivoted_in_place(a: &mut Matrix, cutoff: Option<f64>) -> Result<Transpositions> {
    let n = check_square(a)?;
    let mut perm = Transpositions::identity(n);

    let threshold = match cutoff {
        Some(t) => {
            let d_max = a.diag().iter().fold(f64::NEG_INFINITY, |m, &d| m.max(d));
            (t * n as f64 * d_max).max(0.0)
        }
        None => 0.0,
    };

    for k in 0..n {
        let q = diagonal_pivot(a, k);
        let pivot = a[[q, q]];
        if !(pivot > threshold) {
            log::warn!(
                "pivoted Cholesky: diagonal {:e} at step {} is below {:e}, rank {}",
                pivot,
                k,
                threshold,
                k
            );
            return Err(SolverError::NotPositiveDefinite { step: k });
        }

        if q != k {
            log::debug!("pivoted Cholesky step {}: swapping {} and {}", k, k, q);
        }
        a.swap_rows(k, q);
        a.swap_cols(k, q);
        perm.record(k, q);

        let lkk = pivot.sqrt();
        a[[k, k]] = lkk;
        for j in (k + 1)..n {
            a[[k, j]] /= lkk;
        }

        // rank-1 update of the trailing block
        for i in (k + 1)..n {
            let lki = a[[k, i]];
            for j in (k + 1)..n {
                let update = lki * a[[k, j]];
                a[[i, j]] -= update;
            }
        }

        // keep column k of L in the lower triangle
        for j in (k + 1)..n {
            a[[j, k]] = a[[k, j]];
        }
    }

    log::debug!("pivoted Cholesky of order {} succeeded", n);
    Ok(perm)
}

/// Compute a Cholesky factorization of a copy of `a`.
///
/// `cutoff` only applies to the pivoted variant.
pub fn cholesky_factorize(
    a: &Matrix,
    pivoted: bool,
    cutoff: Option<f64>,
) -> Result<CholeskyFactorization> {
    let mut l = a.clone();
    let perm = if pivoted {
        Some(cholesky_pivoted_in_place(&mut l, cutoff)?)
    } else {
        cholesky_in_place(&mut l)?;
        None
    };
    Ok(CholeskyFactorization { l, perm })
}
