//! Parallel map helpers for batch filterbank application
//!
//! With the `parallel` feature the helper runs on rayon's global pool;
//! without it it falls back to sequential iteration. Results are always
//! returned in index order, so both paths produce identical output.

use crate::error::FilterbankResult;

/// Parallel map that collects Results, short-circuiting on first error.
///
/// # Arguments
///
/// * `range` - The range of indices to iterate over
/// * `f` - A fallible function that maps each index to a result
///
/// # Returns
///
/// Ok(Vec) in index order if all succeed, Err on first failure.
#[cfg(feature = "parallel")]
pub fn parallel_try_map<T, F>(range: std::ops::Range<usize>, f: F) -> FilterbankResult<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> FilterbankResult<T> + Send + Sync,
{
    use rayon::prelude::*;
    range.into_par_iter().map(f).collect()
}

/// Sequential fallback for try_map.
#[cfg(not(feature = "parallel"))]
pub fn parallel_try_map<T, F>(range: std::ops::Range<usize>, f: F) -> FilterbankResult<Vec<T>>
where
    F: Fn(usize) -> FilterbankResult<T>,
{
    range.map(f).collect()
}
