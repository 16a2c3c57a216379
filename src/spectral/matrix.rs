//! Dense coefficient matrix
//!
//! Row-major storage of filter weights, one row per filter and one column per
//! spectral bin.

use crate::error::{FilterbankError, FilterbankResult};

/// Dense `(rows, cols)` matrix of filter weights stored in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl CoefficientMatrix {
    /// Create an all-zero matrix
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create a matrix from row-major data
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if `data.len() != rows * cols`
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> FilterbankResult<Self> {
        if data.len() != rows * cols {
            return Err(FilterbankError::length("matrix data", rows * cols, data.len()));
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a matrix from a list of equally long rows
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the rows are ragged
    pub fn from_rows(rows: &[Vec<f32>]) -> FilterbankResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(FilterbankError::length("matrix row", cols, row.len()));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Number of rows (filters)
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (spectral bins)
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Weight at `(row, col)`, or `None` when out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Borrow one row
    ///
    /// # Panics
    /// Panics if `row >= self.rows()`
    #[must_use]
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Mutably borrow one row
    ///
    /// # Panics
    /// Panics if `row >= self.rows()`
    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Iterate over rows in order
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on zero chunk size
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Row-major backing slice
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Copy out as nested rows
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.iter_rows().map(<[f32]>::to_vec).collect()
    }

    /// Consume into the row-major backing vector
    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Reset every weight to zero
    pub fn fill_zero(&mut self) {
        self.data.fill(0.0);
    }

    /// True when every weight is zero
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&w| w == 0.0)
    }

    /// Sum of each row
    #[must_use]
    pub fn row_sums(&self) -> Vec<f32> {
        self.iter_rows().map(|row| row.iter().sum::<f32>()).collect()
    }

    /// Matrix-vector product into `out`
    ///
    /// Callers check shapes; `x.len() == cols` and `out.len() == rows`.
    pub(crate) fn mul_vec_into(&self, x: &[f32], out: &mut [f32]) {
        debug_assert_eq!(x.len(), self.cols);
        debug_assert_eq!(out.len(), self.rows);
        for (slot, row) in out.iter_mut().zip(self.iter_rows()) {
            *slot = dot(row, x);
        }
    }
}

#[inline]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(&w, &v)| w * v).sum()
}
