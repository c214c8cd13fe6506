//! Permutation tracking
//!
//! Pivoting records one transposition per elimination step: entry `k`
//! holds the index swapped into position `k` at step `k` (or `k` itself when
//! nothing moved). The encoding is order sensitive, so every application
//! replays the swaps in the order the operation requires rather than
//! building an index map up front.

use crate::dense::{DenseMatrixExt, Matrix, Vector};
use ndarray::Array2;

/// Sequence of transpositions recorded during a factorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transpositions {
    swaps: Vec<usize>,
}

impl Transpositions {
    /// No swaps for a matrix of order `n`
    pub fn identity(n: usize) -> Self {
        Self {
            swaps: (0..n).collect(),
        }
    }

    /// Order of the permutation
    pub fn len(&self) -> usize {
        self.swaps.len()
    }

    /// `true` for the order-0 permutation
    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }

    /// Record that index `with` was swapped into position `step`
    pub fn record(&mut self, step: usize, with: usize) {
        self.swaps[step] = with;
    }

    /// Recorded swap targets, one per step
    pub fn as_slice(&self) -> &[usize] {
        &self.swaps
    }

    /// `true` if no step moved anything
    pub fn is_identity(&self) -> bool {
        self.swaps.iter().enumerate().all(|(k, &s)| k == s)
    }

    /// Number of steps that actually swapped two distinct indices
    pub fn swap_count(&self) -> usize {
        self.swaps
            .iter()
            .enumerate()
            .filter(|&(k, &s)| k != s)
            .count()
    }

    /// Apply the swaps to `v` in recording order, i.e. `v <- P·v`.
    ///
    /// Steps `0..n-1` are replayed; the last step never pivots.
    pub fn apply_forward(&self, v: &mut Vector) {
        let n = v.len();
        for i in 0..n.saturating_sub(1) {
            v.swap(i, self.swaps[i]);
        }
    }

    /// Undo the swaps on `v` by replaying them from the last step down.
    pub fn apply_reverse(&self, v: &mut Vector) {
        for i in (0..v.len()).rev() {
            v.swap(i, self.swaps[i]);
        }
    }

    /// Final position map: `index_map()[i]` is the original index that
    /// ends up at position `i`
    pub fn index_map(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.len()).collect();
        for (i, &s) in self.swaps.iter().enumerate() {
            idx.swap(i, s);
        }
        idx
    }

    /// Explicit permutation matrix `P` such that `P·A` replays the row swaps
    pub fn to_matrix(&self) -> Matrix {
        let n = self.len();
        let mut p = Array2::zeros((n, n));
        for (i, &src) in self.index_map().iter().enumerate() {
            p[[i, src]] = 1.0;
        }
        p
    }

    /// Replay the swaps on the rows of `m`
    pub fn permute_rows(&self, m: &mut Matrix) {
        for (i, &s) in self.swaps.iter().enumerate() {
            m.swap_rows(i, s);
        }
    }

    /// Replay the swaps on the columns of `m`
    pub fn permute_cols(&self, m: &mut Matrix) {
        for (i, &s) in self.swaps.iter().enumerate() {
            m.swap_cols(i, s);
        }
    }
}
