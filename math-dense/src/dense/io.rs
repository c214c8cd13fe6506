//! `DENSE` text format and pretty-printing
//!
//! A file starts with a header line `<rows> <cols> DENSE` followed by the
//! entries in row-major order, whitespace separated:
//!
//! ```text
//! 2 2 DENSE
//! 4 3
//! 6 3
//! ```

use super::Matrix;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading or writing matrix files
#[derive(Debug, Error)]
pub enum MatrixIoError {
    /// Underlying filesystem error
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The input has no `<rows> <cols> <format>` header
    #[error("missing or truncated header")]
    MissingHeader,

    /// Only the `DENSE` layout is supported
    #[error("unsupported matrix format: {0} (only DENSE is supported)")]
    UnsupportedFormat(String),

    /// Header dimensions are not positive integers
    #[error("invalid dimensions in header: {0}")]
    InvalidDimensions(String),

    /// An entry could not be parsed as a number
    #[error("invalid value {token:?} on line {line}")]
    InvalidValue {
        /// 1-based line number
        line: usize,
        /// Offending token
        token: String,
    },

    /// The body holds the wrong number of entries
    #[error("expected {expected} values, got {got}")]
    ValueCount {
        /// rows * cols
        expected: usize,
        /// Number of entries found
        got: usize,
    },
}

/// Parse a matrix from `DENSE` text
pub fn parse_dense(text: &str) -> Result<Matrix, MatrixIoError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().ok_or(MatrixIoError::MissingHeader)?;
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(MatrixIoError::MissingHeader);
    }
    let parse_dim = |s: &str| -> Result<usize, MatrixIoError> {
        match s.parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(MatrixIoError::InvalidDimensions(header.trim().to_string())),
        }
    };
    let rows = parse_dim(fields[0])?;
    let cols = parse_dim(fields[1])?;
    if fields[2] != "DENSE" {
        return Err(MatrixIoError::UnsupportedFormat(fields[2].to_string()));
    }

    let mut values = Vec::with_capacity(rows * cols);
    for (idx, line) in lines {
        for token in line.split_whitespace() {
            let v = token
                .parse::<f64>()
                .map_err(|_| MatrixIoError::InvalidValue {
                    line: idx + 1,
                    token: token.to_string(),
                })?;
            values.push(v);
        }
    }

    let got = values.len();
    Matrix::from_shape_vec((rows, cols), values).map_err(|_| MatrixIoError::ValueCount {
        expected: rows * cols,
        got,
    })
}

/// Read a `DENSE` matrix file
pub fn read_dense<P: AsRef<Path>>(path: P) -> Result<Matrix, MatrixIoError> {
    let text = fs::read_to_string(path)?;
    parse_dense(&text)
}

/// Format a matrix as `DENSE` text with `precision` significant digits
pub fn format_dense(mat: &Matrix, precision: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {} DENSE", mat.nrows(), mat.ncols());
    for row in mat.rows() {
        let line: Vec<String> = row
            .iter()
            .map(|v| format_significant(*v, precision))
            .collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    out
}

/// Write a matrix to a `DENSE` file
pub fn write_dense<P: AsRef<Path>>(
    path: P,
    mat: &Matrix,
    precision: usize,
) -> Result<(), MatrixIoError> {
    fs::write(path, format_dense(mat, precision))?;
    Ok(())
}

/// Fixed-width table, 12 characters per entry with 6 significant digits
pub fn pretty(mat: &Matrix) -> String {
    let mut out = String::new();
    for row in mat.rows() {
        for v in row.iter() {
            let _ = write!(out, "{:>12}", format_significant(*v, 6));
        }
        out.push('\n');
    }
    out
}

// Shortest representation with at most `precision` significant digits.
fn format_significant(v: f64, precision: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{}", v);
    }
    let precision = precision.max(1);
    let exponent = v.abs().log10().floor() as i32;
    if exponent < -5 || exponent >= precision as i32 {
        return format!("{:.*e}", precision - 1, v);
    }
    let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
    let s = format!("{:.*}", decimals, v);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
