//! Dense matrix primitives
//!
//! Matrices are plain `ndarray` containers: [`Matrix`] is a row-major
//! `Array2<f64>` and [`Vector`] an `Array1<f64>`. ndarray already provides
//! allocation, element access, transpose, elementwise arithmetic and `dot`;
//! [`DenseMatrixExt`] adds the row/column swaps, submatrix extraction and
//! norms the factorizations need.
//!
//! - [`random`]: seeded random matrix generators
//! - [`io`]: the `DENSE` text format and pretty-printing

pub mod io;
pub mod random;

use ndarray::{Array1, Array2};

/// Dense row-major matrix of doubles
pub type Matrix = Array2<f64>;

/// Dense vector of doubles
pub type Vector = Array1<f64>;

/// Extra operations on dense matrices used by the factorization engine.
pub trait DenseMatrixExt {
    /// Swap two rows in place (no-op when `i == j`)
    fn swap_rows(&mut self, i: usize, j: usize);

    /// Swap two columns in place (no-op when `i == j`)
    fn swap_cols(&mut self, i: usize, j: usize);

    /// Copy out the block `[r_beg, r_end] x [c_beg, c_end]`.
    ///
    /// Bounds are inclusive. Negative bounds count from the end, so `-1`
    /// names the last row or column.
    fn submatrix(&self, r_beg: isize, r_end: isize, c_beg: isize, c_end: isize) -> Matrix;

    /// Reset to the given shape with every entry set to `fill`
    fn resize(&mut self, rows: usize, cols: usize, fill: f64);

    /// Entrywise p-norm.
    ///
    /// `p <= 0` is the max-abs norm, `p == 1` the sum of absolute values and
    /// `p == 2` the Frobenius norm.
    fn norm(&self, p: i32) -> f64;

    /// Sum of absolute values of all entries
    fn norm_l1(&self) -> f64;

    /// Largest absolute value of all entries
    fn norm_inf(&self) -> f64;

    /// `true` if rows == cols
    fn is_square(&self) -> bool;

    /// `true` if square and `|a_ij - a_ji| <= tol` for all entries
    fn is_symmetric(&self, tol: f64) -> bool;
}

impl DenseMatrixExt for Matrix {
    fn swap_rows(&mut self, i: usize, j: usize) {
        assert!(
            i < self.nrows() && j < self.nrows(),
            "row index out of range"
        );
        if i == j {
            return;
        }
        for k in 0..self.ncols() {
            self.swap((i, k), (j, k));
        }
    }

    fn swap_cols(&mut self, i: usize, j: usize) {
        assert!(
            i < self.ncols() && j < self.ncols(),
            "column index out of range"
        );
        if i == j {
            return;
        }
        for k in 0..self.nrows() {
            self.swap((k, i), (k, j));
        }
    }

    fn submatrix(&self, r_beg: isize, r_end: isize, c_beg: isize, c_end: isize) -> Matrix {
        let wrap = |idx: isize, len: usize| -> usize {
            if idx < 0 {
                (len as isize + idx) as usize
            } else {
                idx as usize
            }
        };
        let (r0, r1) = (wrap(r_beg, self.nrows()), wrap(r_end, self.nrows()));
        let (c0, c1) = (wrap(c_beg, self.ncols()), wrap(c_end, self.ncols()));
        assert!(r0 <= r1 && r1 < self.nrows(), "invalid row range");
        assert!(c0 <= c1 && c1 < self.ncols(), "invalid column range");

        Array2::from_shape_fn((r1 - r0 + 1, c1 - c0 + 1), |(i, j)| self[[r0 + i, c0 + j]])
    }

    fn resize(&mut self, rows: usize, cols: usize, fill: f64) {
        *self = Array2::from_elem((rows, cols), fill);
    }

    fn norm(&self, p: i32) -> f64 {
        match p {
            p if p <= 0 => self.norm_inf(),
            1 => self.norm_l1(),
            2 => self.iter().map(|v| v * v).sum::<f64>().sqrt(),
            p => self
                .iter()
                .map(|v| v.abs().powi(p))
                .sum::<f64>()
                .powf(1.0 / p as f64),
        }
    }

    fn norm_l1(&self) -> f64 {
        self.iter().map(|v| v.abs()).sum()
    }

    fn norm_inf(&self) -> f64 {
        self.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }

    fn is_symmetric(&self, tol: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        let n = self.nrows();
        (0..n).all(|i| (0..i).all(|j| (self[[i, j]] - self[[j, i]]).abs() <= tol))
    }
}

/// Build an `n x 1` column matrix from values
pub fn column_vector(values: &[f64]) -> Matrix {
    Array2::from_shape_fn((values.len(), 1), |(i, _)| values[i])
}

/// Flatten the first column of a matrix into a vector
pub fn vector_from_column(mat: &Matrix) -> Vector {
    mat.column(0).to_owned()
}
