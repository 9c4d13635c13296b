use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinearSolveError {
    #[error("system of size {matrix} cannot be solved against a right-hand side of length {rhs}")]
    DimensionMismatch { matrix: usize, rhs: usize },
    #[error("zero pivot at row {row}")]
    ZeroPivot { row: usize },
    #[error("non-finite value at row {row}")]
    NonFinite { row: usize },
}

/// Tridiagonal matrix stored as three bands of length `n`.
///
/// `lower[i]` is `A[i][i-1]` and `upper[i]` is `A[i][i+1]`; `lower[0]` and
/// `upper[n-1]` are unused and kept at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Tridiagonal {
    pub lower: Vec<f64>,
    pub diag: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Tridiagonal {
    pub fn zeros(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            self.diag[i]
        } else if j + 1 == i {
            self.lower[i]
        } else if i + 1 == j {
            self.upper[i]
        } else {
            0.0
        }
    }

    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        let n = self.len();
        DVector::from_fn(n, |i, _| {
            let mut acc = self.diag[i] * x[i];
            if i > 0 {
                acc += self.lower[i] * x[i - 1];
            }
            if i + 1 < n {
                acc += self.upper[i] * x[i + 1];
            }
            acc
        })
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.len();
        DMatrix::from_fn(n, n, |i, j| self.get(i, j))
    }

    /// Solve `A·x = rhs` with the Thomas algorithm.
    ///
    /// A pivot that vanishes relative to its row, or any non-finite
    /// intermediate, is reported instead of producing NaN.
    pub fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
        let n = self.len();
        if rhs.len() != n || n == 0 {
            return Err(LinearSolveError::DimensionMismatch {
                matrix: n,
                rhs: rhs.len(),
            });
        }

        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        // Forward sweep
        for i in 0..n {
            let (pivot, rhs_i) = if i == 0 {
                (self.diag[0], rhs[0])
            } else {
                (
                    self.diag[i] - self.lower[i] * c_prime[i - 1],
                    rhs[i] - self.lower[i] * d_prime[i - 1],
                )
            };
            check_pivot(pivot, self.row_scale(i), i)?;
            if i + 1 < n {
                c_prime[i] = self.upper[i] / pivot;
            }
            d_prime[i] = rhs_i / pivot;
        }

        // Back substitution
        let mut x = DVector::zeros(n);
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }

        if let Some(row) = x.iter().position(|v| !v.is_finite()) {
            return Err(LinearSolveError::NonFinite { row });
        }
        Ok(x)
    }

    fn row_scale(&self, i: usize) -> f64 {
        self.lower[i].abs() + self.diag[i].abs() + self.upper[i].abs()
    }
}

fn check_pivot(pivot: f64, scale: f64, row: usize) -> Result<(), LinearSolveError> {
    if !pivot.is_finite() {
        return Err(LinearSolveError::NonFinite { row });
    }
    if pivot.abs() <= f64::EPSILON * scale || pivot == 0.0 {
        return Err(LinearSolveError::ZeroPivot { row });
    }
    Ok(())
}
