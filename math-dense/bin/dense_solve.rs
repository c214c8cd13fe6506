use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use math_audio_dense::dense::io::{format_dense, pretty, read_dense};
use math_audio_dense::dense::{column_vector, vector_from_column};
use math_audio_dense::{LinearSolver, LuPivoting, Mode, SolverConfig, Vector};
use ndarray::Array1;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "dense-solve",
    about = "Factorize a dense matrix and solve A·x = b"
)]
struct Cli {
    /// Matrix file in DENSE text format
    matrix: PathBuf,

    /// Right-hand side as an n x 1 DENSE file (defaults to all ones)
    #[arg(long)]
    rhs: Option<PathBuf>,

    /// Decomposition to use
    #[arg(long, value_enum, default_value_t = Method::PartialLu)]
    method: Method,

    /// Relative pivot tolerance for rank estimation
    #[arg(long, default_value_t = math_audio_dense::direct::DEFAULT_PIVOT_TOLERANCE)]
    tol: f64,

    /// Relative cutoff for pivoted Cholesky (by default only non-positive pivots stop it)
    #[arg(long)]
    cholesky_cutoff: Option<f64>,

    /// Significant digits in the printed solution
    #[arg(long, default_value_t = 10)]
    precision: usize,

    /// Print the factors after decomposition
    #[arg(long)]
    show_factors: bool,

    /// Write a JSON report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Method {
    /// LU without pivoting
    Lu,
    PartialLu,
    CompleteLu,
    Cholesky,
    PivotedCholesky,
}

#[derive(Debug, Serialize)]
struct Report {
    mode: Mode,
    order: usize,
    rank: usize,
    determinant: f64,
    residual_inf: f64,
    row_permutation: Option<Vec<usize>>,
    column_permutation: Option<Vec<usize>>,
    solution: Vec<f64>,
}

fn decompose(solver: &mut LinearSolver, method: Method) -> math_audio_dense::Result<()> {
    match method {
        Method::Lu => solver.decompose_lu(LuPivoting::None),
        Method::PartialLu => solver.lu_decomp_partial(),
        Method::CompleteLu => solver.lu_decomp(),
        Method::Cholesky => solver.chole_decomp(),
        Method::PivotedCholesky => solver.chole_decomp_pivoting(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let a = read_dense(&args.matrix)
        .with_context(|| format!("reading matrix {}", args.matrix.display()))?;
    let n = a.nrows();

    let b: Vector = match &args.rhs {
        Some(path) => {
            let m = read_dense(path).with_context(|| format!("reading rhs {}", path.display()))?;
            if m.ncols() != 1 || m.nrows() != n {
                bail!(
                    "right-hand side must be {}x1, got {}x{}",
                    n,
                    m.nrows(),
                    m.ncols()
                );
            }
            vector_from_column(&m)
        }
        None => Array1::ones(n),
    };

    let mut solver = LinearSolver::with_config(SolverConfig {
        pivot_tolerance: args.tol,
        cholesky_cutoff: args.cholesky_cutoff,
    });
    solver.set_matrix(&a)?;

    let start = Instant::now();
    decompose(&mut solver, args.method).with_context(|| {
        format!(
            "{:?} decomposition failed (rank {})",
            args.method,
            solver.rank()
        )
    })?;
    let x = solver.solve(&b)?;
    let elapsed = start.elapsed();

    let residual = (&a.dot(&x) - &b).fold(0.0_f64, |m, v| m.max(v.abs()));
    let rank = solver.rank();
    let determinant = solver.determinant()?;

    if args.show_factors {
        match args.method {
            Method::Cholesky | Method::PivotedCholesky => {
                println!("L =\n{}", pretty(&solver.get_chole()?));
            }
            _ => {
                println!("L =\n{}", pretty(&solver.get_lower()?));
                println!("U =\n{}", pretty(&solver.get_upper()?));
            }
        }
        println!("P =\n{}", pretty(&solver.permutation_matrix()?));
    }

    println!(
        "{:?}: order {}, rank {}, det {:e}, residual {:e} ({:.3?})",
        solver.mode(),
        n,
        rank,
        determinant,
        residual,
        elapsed
    );
    print!("{}", format_dense(&column_vector(&x.to_vec()), args.precision));

    if let Some(path) = &args.report {
        let report = Report {
            mode: solver.mode(),
            order: n,
            rank,
            determinant,
            residual_inf: residual,
            row_permutation: solver.row_permutation().map(<[usize]>::to_vec),
            column_permutation: solver.column_permutation().map(<[usize]>::to_vec),
            solution: x.to_vec(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing report {}", path.display()))?;
    }

    Ok(())
}
