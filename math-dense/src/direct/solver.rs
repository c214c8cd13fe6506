//! Linear solver state machine
//!
//! [`LinearSolver`] owns a copy of the caller's matrix and moves through
//! `Empty -> MatrixSet -> {LuSuccess | CholeskySuccess}`. A successful
//! decomposition is terminal until [`LinearSolver::set_matrix`] is called
//! again; a failed one leaves the partially eliminated matrix in the
//! `MatrixSet` state so the caller can inspect or replace it.
//!
//! ```rust
//! use math_audio_dense::LinearSolver;
//! use ndarray::array;
//!
//! let a = array![[4.0, 3.0], [6.0, 3.0]];
//! let mut solver = LinearSolver::from_matrix(&a).expect("square matrix");
//! solver.lu_decomp_partial().expect("nonsingular");
//!
//! let x = solver.solve(&array![1.0, 1.0]).expect("solve");
//! let ax = a.dot(&x);
//! assert!((ax[0] - 1.0).abs() < 1e-9 && (ax[1] - 1.0).abs() < 1e-9);
//! ```

use super::cholesky::{CholeskyFactorization, cholesky_in_place, cholesky_pivoted_in_place};
use super::lu::{LuFactorization, LuPivoting, lu_in_place};
use super::triangular::{Diagonal, solve_lower, solve_lower_transpose, solve_upper};
use crate::dense::{Matrix, Vector};
use crate::error::{Result, SolverError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;

/// Default relative pivot tolerance for rank estimation
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-16;

/// Lifecycle of a [`LinearSolver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// No matrix yet
    Empty,
    /// Matrix stored, not (successfully) decomposed
    MatrixSet,
    /// An LU decomposition succeeded
    LuSuccess,
    /// A Cholesky decomposition succeeded
    CholeskySuccess,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Empty => "empty",
            Status::MatrixSet => "matrix set",
            Status::LuSuccess => "LU success",
            Status::CholeskySuccess => "Cholesky success",
        };
        write!(f, "{}", s)
    }
}

/// Which decomposition produced the current factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Nothing decomposed yet
    None,
    /// LU without pivoting
    UnpivotedLu,
    /// LU with row pivoting
    PartialLu,
    /// LU with row and column pivoting
    CompleteLu,
    /// Cholesky without pivoting
    Cholesky,
    /// Cholesky with symmetric diagonal pivoting
    PivotedCholesky,
}

/// Solver configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Relative tolerance for complete-pivoting LU rank estimation
    pub pivot_tolerance: f64,
    /// Optional relative cutoff for pivoted Cholesky: stop once the next
    /// pivot is at most `cutoff * n * d_max`. Off by default, in which case
    /// only non-positive pivots stop the factorization.
    #[serde(default)]
    pub cholesky_cutoff: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            cholesky_cutoff: None,
        }
    }
}

/// Current contents of a solver, one variant per decomposition kind
#[derive(Debug, Clone, Default)]
pub enum Factorization {
    /// No matrix
    #[default]
    Empty,
    /// Working matrix not yet decomposed (or after a failed attempt)
    Unfactored(Matrix),
    /// Packed LU factors and permutations
    Lu(LuFactorization),
    /// Cholesky factor and optional symmetric permutation
    Cholesky(CholeskyFactorization),
}

/// Direct solver over a single owned working matrix
#[derive(Debug, Clone, Default)]
pub struct LinearSolver {
    config: SolverConfig,
    state: Factorization,
    cached_rank: Cell<Option<usize>>,
}

impl LinearSolver {
    /// Empty solver with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty solver with a custom configuration
    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Solver holding a copy of `mat`
    pub fn from_matrix(mat: &Matrix) -> Result<Self> {
        let mut solver = Self::new();
        solver.set_matrix(mat)?;
        Ok(solver)
    }

    /// Active configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Change the pivot tolerance; forgets a rank derived from LU factors
    pub fn set_pivot_tolerance(&mut self, tolerance: f64) {
        self.config.pivot_tolerance = tolerance;
        if matches!(self.state, Factorization::Lu(_)) {
            self.cached_rank.set(None);
        }
    }

    /// Enable or disable the relative pivoted Cholesky cutoff; applies to the
    /// next decomposition
    pub fn set_cholesky_cutoff(&mut self, cutoff: Option<f64>) {
        self.config.cholesky_cutoff = cutoff;
    }

    /// Replace the working matrix with a copy of `mat` and reset all
    /// derived state.
    ///
    /// Non-square or empty matrices are rejected and leave the solver as
    /// it was.
    pub fn set_matrix(&mut self, mat: &Matrix) -> Result<()> {
        let (rows, cols) = mat.dim();
        if rows == 0 || cols == 0 {
            return Err(SolverError::EmptyMatrix);
        }
        if rows != cols {
            return Err(SolverError::NotSquare { rows, cols });
        }
        self.state = Factorization::Unfactored(mat.clone());
        self.cached_rank.set(None);
        Ok(())
    }

    /// Current lifecycle status
    pub fn status(&self) -> Status {
        match &self.state {
            Factorization::Empty => Status::Empty,
            Factorization::Unfactored(_) => Status::MatrixSet,
            Factorization::Lu(_) => Status::LuSuccess,
            Factorization::Cholesky(_) => Status::CholeskySuccess,
        }
    }

    /// Decomposition that produced the current factors
    pub fn mode(&self) -> Mode {
        match &self.state {
            Factorization::Empty | Factorization::Unfactored(_) => Mode::None,
            Factorization::Lu(f) => match f.pivoting {
                LuPivoting::None => Mode::UnpivotedLu,
                LuPivoting::Partial => Mode::PartialLu,
                LuPivoting::Complete => Mode::CompleteLu,
            },
            Factorization::Cholesky(f) if f.is_pivoted() => Mode::PivotedCholesky,
            Factorization::Cholesky(_) => Mode::Cholesky,
        }
    }

    /// Order of the working matrix (0 when empty)
    pub fn order(&self) -> usize {
        match &self.state {
            Factorization::Empty => 0,
            Factorization::Unfactored(m) => m.nrows(),
            Factorization::Lu(f) => f.order(),
            Factorization::Cholesky(f) => f.order(),
        }
    }

    /// Current contents
    pub fn factorization(&self) -> &Factorization {
        &self.state
    }

    fn take_unfactored(&mut self, operation: &'static str) -> Result<Matrix> {
        match std::mem::take(&mut self.state) {
            Factorization::Unfactored(m) => Ok(m),
            other => {
                let status = match &other {
                    Factorization::Empty => Status::Empty,
                    Factorization::Lu(_) => Status::LuSuccess,
                    _ => Status::CholeskySuccess,
                };
                self.state = other;
                Err(SolverError::InvalidState { operation, status })
            }
        }
    }

    /// LU decomposition of the working matrix with the given pivoting
    pub fn decompose_lu(&mut self, pivoting: LuPivoting) -> Result<()> {
        let mut a = self.take_unfactored("decompose_lu")?;
        match lu_in_place(&mut a, pivoting) {
            Ok((row_perm, col_perm)) => {
                self.state = Factorization::Lu(LuFactorization {
                    lu: a,
                    pivoting,
                    row_perm,
                    col_perm,
                });
                self.cached_rank.set(None);
                log::info!(
                    "{:?} decomposition of order {} done",
                    self.mode(),
                    self.order()
                );
                Ok(())
            }
            Err(err) => {
                self.state = Factorization::Unfactored(a);
                Err(err)
            }
        }
    }

    /// Cholesky decomposition of the working matrix.
    ///
    /// When `pivoted` fails, the failing step is kept as the rank.
    pub fn decompose_cholesky(&mut self, pivoted: bool) -> Result<()> {
        let mut a = self.take_unfactored("decompose_cholesky")?;
        let outcome = if pivoted {
            cholesky_pivoted_in_place(&mut a, self.config.cholesky_cutoff).map(Some)
        } else {
            cholesky_in_place(&mut a).map(|_| None)
        };
        match outcome {
            Ok(perm) => {
                self.state = Factorization::Cholesky(CholeskyFactorization { l: a, perm });
                self.cached_rank.set(None);
                log::info!(
                    "{:?} decomposition of order {} done",
                    self.mode(),
                    self.order()
                );
                Ok(())
            }
            Err(err) => {
                if let (true, SolverError::NotPositiveDefinite { step }) = (pivoted, &err) {
                    self.cached_rank.set(Some(*step));
                }
                self.state = Factorization::Unfactored(a);
                Err(err)
            }
        }
    }

    /// LU with partial pivoting
    pub fn lu_decomp_partial(&mut self) -> Result<()> {
        self.decompose_lu(LuPivoting::Partial)
    }

    /// LU with complete pivoting
    pub fn lu_decomp(&mut self) -> Result<()> {
        self.decompose_lu(LuPivoting::Complete)
    }

    /// Cholesky without pivoting
    pub fn chole_decomp(&mut self) -> Result<()> {
        self.decompose_cholesky(false)
    }

    /// Cholesky with diagonal pivoting
    pub fn chole_decomp_pivoting(&mut self) -> Result<()> {
        self.decompose_cholesky(true)
    }

    fn lu(&self, operation: &'static str) -> Result<&LuFactorization> {
        match &self.state {
            Factorization::Lu(f) => Ok(f),
            _ => Err(self.invalid(operation)),
        }
    }

    fn cholesky(&self, operation: &'static str) -> Result<&CholeskyFactorization> {
        match &self.state {
            Factorization::Cholesky(f) => Ok(f),
            _ => Err(self.invalid(operation)),
        }
    }

    fn invalid(&self, operation: &'static str) -> SolverError {
        SolverError::InvalidState {
            operation,
            status: self.status(),
        }
    }

    /// Unit lower-triangular factor of an LU decomposition
    pub fn get_lower(&self) -> Result<Matrix> {
        Ok(self.lu("get_lower")?.lower())
    }

    /// Upper-triangular factor of an LU decomposition
    pub fn get_upper(&self) -> Result<Matrix> {
        Ok(self.lu("get_upper")?.upper())
    }

    /// Lower-triangular factor of a Cholesky decomposition
    pub fn get_chole(&self) -> Result<Matrix> {
        Ok(self.cholesky("get_chole")?.factor())
    }

    /// Numerical rank, memoized until the working matrix or factors change.
    ///
    /// Full order for everything but complete-pivoting LU and failed
    /// pivoted Cholesky; 0 for an empty solver.
    pub fn rank(&self) -> usize {
        if let Some(rank) = self.cached_rank.get() {
            return rank;
        }
        let rank = match &self.state {
            Factorization::Empty => 0,
            Factorization::Unfactored(m) => m.nrows(),
            Factorization::Lu(f) => f.rank(self.config.pivot_tolerance),
            Factorization::Cholesky(f) => f.order(),
        };
        self.cached_rank.set(Some(rank));
        rank
    }

    /// Forward substitution with the stored lower factor, on `b` as given
    /// (no permutation). LU uses a unit diagonal and only the first
    /// `rank()` rows.
    pub fn solve_lower_triangular(&self, b: &Vector) -> Result<Vector> {
        match &self.state {
            Factorization::Lu(f) => solve_lower(&f.lu, b, self.rank(), Diagonal::Unit),
            Factorization::Cholesky(f) => solve_lower(&f.l, b, f.order(), Diagonal::NonUnit),
            _ => Err(self.invalid("solve_lower_triangular")),
        }
    }

    /// Backward substitution with U (LU) or Lᵗ (Cholesky), on `b` as given
    pub fn solve_upper_triangular(&self, b: &Vector) -> Result<Vector> {
        match &self.state {
            Factorization::Lu(f) => solve_upper(&f.lu, b),
            Factorization::Cholesky(f) => solve_lower_transpose(&f.l, b),
            _ => Err(self.invalid("solve_upper_triangular")),
        }
    }

    /// Solve `A·x = b` with the current factors
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        match &self.state {
            Factorization::Lu(f) => f.solve(b, self.rank()),
            Factorization::Cholesky(f) => f.solve(b),
            _ => Err(self.invalid("solve")),
        }
    }

    /// Solve `A·X = B` column by column
    pub fn solve_matrix(&self, b: &Matrix) -> Result<Matrix> {
        if !matches!(self.state, Factorization::Lu(_) | Factorization::Cholesky(_)) {
            return Err(self.invalid("solve_matrix"));
        }
        let n = self.order();
        if b.nrows() != n {
            return Err(SolverError::DimensionMismatch {
                expected: n,
                got: b.nrows(),
            });
        }
        let mut x = Array2::zeros(b.dim());
        for (j, col) in b.columns().into_iter().enumerate() {
            let xj = self.solve(&col.to_owned())?;
            x.column_mut(j).assign(&xj);
        }
        Ok(x)
    }

    /// Explicit permutation matrix `P`: `P·A = L·U` (`P·A·Q = L·U` with
    /// complete pivoting) for LU, `Pᵗ·A·P = L·Lᵗ` for Cholesky
    pub fn permutation_matrix(&self) -> Result<Matrix> {
        match &self.state {
            Factorization::Lu(f) => Ok(f.row_perm.to_matrix()),
            Factorization::Cholesky(f) => Ok(f.permutation_matrix()),
            _ => Err(self.invalid("permutation_matrix")),
        }
    }

    /// Explicit column permutation matrix `Q`: `P·A·Q = L·U` for LU; for
    /// Cholesky the same `P` as [`LinearSolver::permutation_matrix`]
    pub fn column_permutation_matrix(&self) -> Result<Matrix> {
        match &self.state {
            Factorization::Lu(f) => Ok(f.col_perm.to_matrix().t().to_owned()),
            Factorization::Cholesky(f) => Ok(f.permutation_matrix()),
            _ => Err(self.invalid("column_permutation_matrix")),
        }
    }

    /// Apply the recorded row and column swaps to `m`; for the original
    /// matrix the result should match the product of the factors
    pub fn apply_permutation(&self, m: &Matrix) -> Result<Matrix> {
        let (rows, cols) = m.dim();
        let n = self.order();
        if rows != n || cols != n {
            return Err(SolverError::DimensionMismatch {
                expected: n,
                got: if rows != n { rows } else { cols },
            });
        }
        match &self.state {
            Factorization::Lu(f) => Ok(f.permute(m)),
            Factorization::Cholesky(f) => Ok(f.permute(m)),
            _ => Err(self.invalid("apply_permutation")),
        }
    }

    /// Recorded row swaps, once decomposed
    pub fn row_permutation(&self) -> Option<&[usize]> {
        match &self.state {
            Factorization::Lu(f) => Some(f.row_perm.as_slice()),
            Factorization::Cholesky(f) => f.perm.as_ref().map(|p| p.as_slice()),
            _ => None,
        }
    }

    /// Recorded column swaps of an LU decomposition
    pub fn column_permutation(&self) -> Option<&[usize]> {
        match &self.state {
            Factorization::Lu(f) => Some(f.col_perm.as_slice()),
            _ => None,
        }
    }

    /// Determinant of the decomposed matrix
    pub fn determinant(&self) -> Result<f64> {
        match &self.state {
            Factorization::Lu(f) => Ok(f.determinant()),
            Factorization::Cholesky(f) => Ok(f.determinant()),
            _ => Err(self.invalid("determinant")),
        }
    }
}
