//! Property checks for the factorizations over seeded random matrices

use approx::assert_relative_eq;
use math_audio_dense::dense::random::{random_low_rank_psd, random_matrix, random_spd};
use math_audio_dense::{
    DenseMatrixExt, LinearSolver, LuPivoting, Matrix, Mode, SolverError, Status, Vector,
};
use ndarray::{Array1, array};
use rand::SeedableRng;
use rand::rngs::StdRng;

const ORDERS: [usize; 5] = [1, 2, 5, 12, 30];

/// ‖x - y‖∞ / max(‖y‖∞, 1)
fn relative_gap(x: &Matrix, y: &Matrix) -> f64 {
    (x - y).norm_inf() / y.norm_inf().max(1.0)
}

fn assert_solves(a: &Matrix, solver: &LinearSolver, b: &Vector) {
    let x = solver.solve(b).expect("solve");
    let r = a.dot(&x) - b;
    let scale = b.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    for v in r.iter() {
        assert!(
            v.abs() / scale < 1e-8,
            "residual {:e} too large for {:?}",
            v,
            solver.mode()
        );
    }
}

#[test]
fn partial_lu_reproduces_row_permuted_matrix() {
    let mut rng = StdRng::seed_from_u64(1);
    for n in ORDERS {
        let a = random_matrix(n, &mut rng);
        let mut solver = LinearSolver::from_matrix(&a).unwrap();
        solver.lu_decomp_partial().unwrap();
        assert_eq!(solver.mode(), Mode::PartialLu);

        let p = solver.permutation_matrix().unwrap();
        let lu = solver.get_lower().unwrap().dot(&solver.get_upper().unwrap());
        assert!(relative_gap(&p.dot(&a), &lu) < 1e-12, "order {}", n);
        assert!(relative_gap(&solver.apply_permutation(&a).unwrap(), &lu) < 1e-12);
    }
}

#[test]
fn complete_lu_reproduces_row_and_column_permuted_matrix() {
    let mut rng = StdRng::seed_from_u64(2);
    for n in ORDERS {
        let a = random_matrix(n, &mut rng);
        let mut solver = LinearSolver::from_matrix(&a).unwrap();
        solver.lu_decomp().unwrap();
        assert_eq!(solver.mode(), Mode::CompleteLu);
        assert_eq!(solver.rank(), n);

        let p = solver.permutation_matrix().unwrap();
        let q = solver.column_permutation_matrix().unwrap();
        let lu = solver.get_lower().unwrap().dot(&solver.get_upper().unwrap());
        assert!(relative_gap(&p.dot(&a).dot(&q), &lu) < 1e-12, "order {}", n);
        assert!(relative_gap(&solver.apply_permutation(&a).unwrap(), &lu) < 1e-12);
    }
}

#[test]
fn unpivoted_lu_keeps_identity_permutations() {
    let mut rng = StdRng::seed_from_u64(3);
    // SPD, so elimination without pivoting is stable
    let mut a = random_spd(6, &mut rng);
    a.diag_mut().mapv_inplace(|d| d + 10.0);
    let mut solver = LinearSolver::from_matrix(&a).unwrap();
    solver.decompose_lu(LuPivoting::None).unwrap();

    assert_eq!(solver.mode(), Mode::UnpivotedLu);
    assert_eq!(solver.permutation_matrix().unwrap(), Matrix::eye(6));
    let lu = solver.get_lower().unwrap().dot(&solver.get_upper().unwrap());
    assert!(relative_gap(&a, &lu) < 1e-12);
    assert_solves(&a, &solver, &Array1::ones(6));
}

#[test]
fn cholesky_reproduces_spd_matrix() {
    let mut rng = StdRng::seed_from_u64(4);
    for n in ORDERS {
        let a = random_spd(n, &mut rng);
        let mut solver = LinearSolver::from_matrix(&a).unwrap();
        solver.chole_decomp().unwrap();

        let l = solver.get_chole().unwrap();
        assert!(l.diag().iter().all(|&d| d > 0.0));
        assert!(relative_gap(&l.dot(&l.t()), &a) < 1e-12, "order {}", n);
        assert_eq!(solver.rank(), n);
    }
}

#[test]
fn pivoted_cholesky_reproduces_conjugated_spd_matrix() {
    let mut rng = StdRng::seed_from_u64(5);
    for n in ORDERS {
        let a = random_spd(n, &mut rng);
        let mut solver = LinearSolver::from_matrix(&a).unwrap();
        solver.chole_decomp_pivoting().unwrap();
        assert_eq!(solver.mode(), Mode::PivotedCholesky);

        let p = solver.permutation_matrix().unwrap();
        let l = solver.get_chole().unwrap();
        let ptap = p.t().dot(&a).dot(&p);
        assert!(relative_gap(&ptap, &l.dot(&l.t())) < 1e-12, "order {}", n);
        assert_eq!(solver.rank(), n);

        // pivots come out in non-increasing order
        let d = l.diag();
        for k in 1..n {
            assert!(d[k] <= d[k - 1] * (1.0 + 1e-12));
        }
    }
}

#[test]
fn rank_is_stable_across_calls() {
    let mut rng = StdRng::seed_from_u64(6);
    let a = random_matrix(8, &mut rng);
    let mut solver = LinearSolver::from_matrix(&a).unwrap();
    solver.lu_decomp().unwrap();
    let first = solver.rank();
    assert_eq!(solver.rank(), first);
    assert_eq!(solver.rank(), first);
}

#[test]
fn solve_round_trip_for_every_mode() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in ORDERS {
        let general = random_matrix(n, &mut rng);
        let spd = random_spd(n, &mut rng);
        let b = Array1::from_shape_fn(n, |i| (i as f64 + 1.0).sin());

        for pivoting in [LuPivoting::Partial, LuPivoting::Complete] {
            let mut solver = LinearSolver::from_matrix(&general).unwrap();
            solver.decompose_lu(pivoting).unwrap();
            assert_solves(&general, &solver, &b);
        }
        for pivoted in [false, true] {
            let mut solver = LinearSolver::from_matrix(&spd).unwrap();
            solver.decompose_cholesky(pivoted).unwrap();
            assert_solves(&spd, &solver, &b);
        }
    }
}

#[test]
fn solve_matrix_matches_column_solves() {
    let mut rng = StdRng::seed_from_u64(8);
    let a = random_matrix(5, &mut rng);
    let b = random_matrix(5, &mut rng);
    let mut solver = LinearSolver::from_matrix(&a).unwrap();
    solver.lu_decomp_partial().unwrap();

    let x = solver.solve_matrix(&b).unwrap();
    for j in 0..5 {
        let xj = solver.solve(&b.column(j).to_owned()).unwrap();
        for i in 0..5 {
            assert_relative_eq!(x[[i, j]], xj[i]);
        }
    }
}

#[test]
fn order_one_matrix() {
    let a = array![[5.0]];

    let mut solver = LinearSolver::from_matrix(&a).unwrap();
    solver.lu_decomp_partial().unwrap();
    assert_eq!(solver.get_lower().unwrap(), array![[1.0]]);
    assert_eq!(solver.get_upper().unwrap(), array![[5.0]]);
    assert_relative_eq!(solver.solve(&array![10.0]).unwrap()[0], 2.0);

    solver.set_matrix(&a).unwrap();
    solver.chole_decomp().unwrap();
    assert_relative_eq!(solver.get_chole().unwrap()[[0, 0]], 5.0_f64.sqrt());
}

#[test]
fn singular_matrix_reports_zero_pivot() {
    let mut solver = LinearSolver::from_matrix(&array![[0.0, 1.0], [0.0, 1.0]]).unwrap();
    let err = solver.lu_decomp_partial().unwrap_err();
    assert_eq!(err, SolverError::SingularPivot { step: 0 });
    assert!(err.is_decomposition_failure());
    assert_eq!(solver.status(), Status::MatrixSet);
}

#[test]
fn partial_lu_two_by_two_scenario() {
    let a = array![[4.0, 3.0], [6.0, 3.0]];
    let mut solver = LinearSolver::from_matrix(&a).unwrap();
    solver.lu_decomp_partial().unwrap();

    assert_eq!(solver.row_permutation(), Some(&[1, 1][..]));
    let u = solver.get_upper().unwrap();
    let l = solver.get_lower().unwrap();
    assert_relative_eq!(u[[0, 0]], 6.0);
    assert_relative_eq!(l[[1, 0]], 4.0 / 6.0, epsilon = 1e-15);

    let x = solver.solve(&array![1.0, 1.0]).unwrap();
    let ax = a.dot(&x);
    assert_relative_eq!(ax[0], 1.0, epsilon = 1e-9);
    assert_relative_eq!(ax[1], 1.0, epsilon = 1e-9);
}

#[test]
fn pivoted_cholesky_detects_duplicated_row() {
    let a = array![[4.0, 2.0, 2.0], [2.0, 2.0, 2.0], [2.0, 2.0, 2.0]];
    let mut solver = LinearSolver::from_matrix(&a).unwrap();
    assert_eq!(
        solver.chole_decomp_pivoting().unwrap_err(),
        SolverError::NotPositiveDefinite { step: 2 }
    );
    assert_eq!(solver.rank(), 2);
    assert_eq!(solver.status(), Status::MatrixSet);
}

#[test]
fn low_rank_inputs_report_their_rank() {
    let mut rng = StdRng::seed_from_u64(9);
    let a = random_low_rank_psd(6, 3, &mut rng);

    let mut lu = LinearSolver::from_matrix(&a).unwrap();
    lu.set_pivot_tolerance(1e-10);
    lu.lu_decomp().unwrap();
    assert_eq!(lu.rank(), 3);

    let mut chol = LinearSolver::from_matrix(&a).unwrap();
    chol.set_cholesky_cutoff(Some(1e-10));
    let err = chol.chole_decomp_pivoting().unwrap_err();
    assert_eq!(err, SolverError::NotPositiveDefinite { step: 3 });
    assert_eq!(chol.rank(), 3);
}

#[test]
fn rank_deficient_forward_pass_stops_at_rank() {
    // second row is half the first
    let a = array![[2.0, 4.0, 6.0], [1.0, 2.0, 3.0], [4.0, 1.0, 0.0]];
    let mut solver = LinearSolver::from_matrix(&a).unwrap();
    solver.lu_decomp().unwrap();
    assert_eq!(solver.rank(), 2);

    // only the forward half is truncated; rows beyond the rank stay zero
    let y = solver.solve_lower_triangular(&array![12.0, 6.0, 5.0]).unwrap();
    assert_eq!(y[2], 0.0);
}

#[test]
fn rank_deficient_full_solve_divides_by_zero_pivot() {
    let a = array![[2.0, 4.0, 6.0], [1.0, 2.0, 3.0], [4.0, 1.0, 0.0]];
    let mut solver = LinearSolver::from_matrix(&a).unwrap();
    solver.lu_decomp().unwrap();
    assert_eq!(solver.get_upper().unwrap()[[2, 2]], 0.0);

    // the backward pass still covers every row: 0/0 in the last pivot row
    // spreads through the back substitution
    let x = solver.solve(&array![12.0, 6.0, 5.0]).unwrap();
    assert!(x.iter().all(|v| v.is_nan()), "got {}", x);
}

#[test]
fn pivoted_cholesky_three_cycle_permutation() {
    let a = array![[2.0, 0.1, 0.2], [0.1, 1.0, 0.3], [0.2, 0.3, 3.0]];
    let mut solver = LinearSolver::from_matrix(&a).unwrap();
    solver.chole_decomp_pivoting().unwrap();
    assert_eq!(solver.row_permutation(), Some(&[2, 2, 2][..]));

    let p = solver.permutation_matrix().unwrap();
    assert_ne!(p, p.t().to_owned());
    let l = solver.get_chole().unwrap();
    let llt = l.dot(&l.t());
    assert!(relative_gap(&p.t().dot(&a).dot(&p), &llt) < 1e-14);
    assert!(relative_gap(&solver.apply_permutation(&a).unwrap(), &llt) < 1e-14);
    assert_eq!(solver.column_permutation_matrix().unwrap(), p);

    assert_solves(&a, &solver, &array![1.0, -2.0, 0.5]);
}

#[test]
fn pivoted_cholesky_keeps_tiny_positive_pivot() {
    let a = array![[1.0, 0.0], [0.0, 1e-17]];

    let mut plain = LinearSolver::from_matrix(&a).unwrap();
    plain.chole_decomp().unwrap();

    let mut pivoted = LinearSolver::from_matrix(&a).unwrap();
    pivoted.chole_decomp_pivoting().unwrap();
    assert_eq!(pivoted.status(), Status::CholeskySuccess);
    assert_eq!(pivoted.rank(), 2);
    assert_relative_eq!(
        pivoted.get_chole().unwrap()[[1, 1]],
        plain.get_chole().unwrap()[[1, 1]]
    );
}

#[test]
fn determinant_matches_known_values() {
    let a = array![[4.0, 12.0, -16.0], [12.0, 37.0, -43.0], [-16.0, -43.0, 98.0]];
    for method in 0..4 {
        let mut solver = LinearSolver::from_matrix(&a).unwrap();
        match method {
            0 => solver.lu_decomp_partial().unwrap(),
            1 => solver.lu_decomp().unwrap(),
            2 => solver.chole_decomp().unwrap(),
            _ => solver.chole_decomp_pivoting().unwrap(),
        }
        assert_relative_eq!(solver.determinant().unwrap(), 36.0, epsilon = 1e-8);
    }
}
