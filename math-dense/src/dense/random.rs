//! Random matrix generators
//!
//! Every generator draws from an explicit random source, so results are
//! reproducible once the caller seeds it:
//!
//! ```rust
//! use math_audio_dense::dense::random::random_spd;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let a = random_spd(4, &mut rng);
//! assert_eq!(a.dim(), (4, 4));
//! ```

use super::Matrix;
use ndarray::Array2;
use rand::Rng;

/// Square matrix with entries uniform in `[-1000, 1000)`
pub fn random_matrix<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Matrix {
    Array2::from_shape_simple_fn((n, n), || rng.random_range(-1000.0..1000.0))
}

/// Lower-triangular matrix with entries uniform in `[-10, 10)`
pub fn random_lower_triangular<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Matrix {
    lower_triangular_in(n, -10.0, 10.0, rng)
}

/// Symmetric matrix with entries uniform in `[-1, 1)`
pub fn random_symmetric<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Matrix {
    let mut a = lower_triangular_in(n, -1.0, 1.0, rng);
    for i in 0..n {
        for j in (i + 1)..n {
            a[[i, j]] = a[[j, i]];
        }
    }
    a
}

/// Symmetric positive-definite matrix `L·Lᵗ + n·I`.
///
/// `L` has entries in `[-1, 1)` and a diagonal in `[1, 2)`; the `n·I` shift
/// bounds the smallest eigenvalue below by `n` whatever the draw.
pub fn random_spd<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Matrix {
    let mut l = lower_triangular_in(n, -1.0, 1.0, rng);
    for i in 0..n {
        l[[i, i]] = rng.random_range(1.0..2.0);
    }
    let mut a = l.dot(&l.t());
    a.diag_mut().mapv_inplace(|d| d + n as f64);
    a
}

/// Symmetric positive semi-definite matrix of the given rank, `B·Bᵗ` with
/// `B` of shape `n x rank`
pub fn random_low_rank_psd<R: Rng + ?Sized>(n: usize, rank: usize, rng: &mut R) -> Matrix {
    let b = Array2::from_shape_simple_fn((n, rank), || rng.random_range(-1.0..1.0));
    b.dot(&b.t())
}

fn lower_triangular_in<R: Rng + ?Sized>(n: usize, lo: f64, hi: f64, rng: &mut R) -> Matrix {
    let mut a = Matrix::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            a[[i, j]] = rng.random_range(lo..hi);
        }
    }
    a
}
