//! Error types for dense factorizations and solves.
//!
//! Every failure of the factorization engine is a local, recoverable
//! condition: it is reported to the caller as a [`SolverError`] and never
//! aborts the process. Retrying with another strategy (for example switching
//! from plain to pivoted Cholesky) is left to the caller.

use crate::direct::Status;
use thiserror::Error;

/// Errors that can occur while factorizing or solving a dense system.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// An exact-zero pivot was met during LU elimination.
    #[error("singular pivot at elimination step {step}")]
    SingularPivot {
        /// Elimination step at which the zero pivot appeared
        step: usize,
    },

    /// The Cholesky diagonal condition failed.
    ///
    /// For pivoted Cholesky, `step` is also the numerical rank.
    #[error("matrix is not positive definite (failed at step {step})")]
    NotPositiveDefinite {
        /// Row (plain) or step (pivoted) at which the diagonal was not positive
        step: usize,
    },

    /// Right-hand side length does not match the matrix order.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Order of the factorized matrix
        expected: usize,
        /// Length supplied by the caller
        got: usize,
    },

    /// A factorization was requested for a non-square matrix.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// A factorization was requested for a matrix with a zero dimension.
    #[error("matrix must have at least one row and one column")]
    EmptyMatrix,

    /// The operation needs a state the solver has not reached.
    #[error("{operation} is not available in state {status}")]
    InvalidState {
        /// Name of the rejected operation
        operation: &'static str,
        /// State the solver was in
        status: Status,
    },
}

/// A specialized `Result` type for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;

impl SolverError {
    /// Returns `true` if a decomposition attempt failed numerically.
    ///
    /// This includes `SingularPivot` and `NotPositiveDefinite`.
    pub fn is_decomposition_failure(&self) -> bool {
        matches!(
            self,
            SolverError::SingularPivot { .. } | SolverError::NotPositiveDefinite { .. }
        )
    }

    /// Returns `true` if the input had the wrong shape.
    ///
    /// This includes `DimensionMismatch`, `NotSquare` and `EmptyMatrix`.
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            SolverError::DimensionMismatch { .. }
                | SolverError::NotSquare { .. }
                | SolverError::EmptyMatrix
        )
    }

    /// Returns `true` if the operation was called out of order.
    pub fn is_state_error(&self) -> bool {
        matches!(self, SolverError::InvalidState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SolverError::SingularPivot { step: 0 };
        assert_eq!(err.to_string(), "singular pivot at elimination step 0");

        let err = SolverError::NotSquare { rows: 2, cols: 3 };
        assert_eq!(err.to_string(), "matrix must be square, got 2x3");
    }

    #[test]
    fn test_invalid_state_display() {
        let err = SolverError::InvalidState {
            operation: "solve",
            status: Status::MatrixSet,
        };
        assert_eq!(err.to_string(), "solve is not available in state matrix set");
    }

    #[test]
    fn test_is_decomposition_failure() {
        let pivot_err = SolverError::SingularPivot { step: 1 };
        let spd_err = SolverError::NotPositiveDefinite { step: 2 };
        let dim_err = SolverError::DimensionMismatch {
            expected: 3,
            got: 2,
        };

        assert!(pivot_err.is_decomposition_failure());
        assert!(spd_err.is_decomposition_failure());
        assert!(!dim_err.is_decomposition_failure());
    }

    #[test]
    fn test_is_dimension_error() {
        assert!(SolverError::EmptyMatrix.is_dimension_error());
        assert!(SolverError::NotSquare { rows: 1, cols: 2 }.is_dimension_error());
        assert!(!SolverError::SingularPivot { step: 0 }.is_dimension_error());
    }

    #[test]
    fn test_is_state_error() {
        let err = SolverError::InvalidState {
            operation: "get_lower",
            status: Status::Empty,
        };
        assert!(err.is_state_error());
        assert!(!SolverError::EmptyMatrix.is_state_error());
    }
}
