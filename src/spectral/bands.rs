//! Triangle-band coefficient builder
//!
//! Turns an ascending list of breakpoint frequencies into overlapping
//! triangular filters. Filter `i` uses breakpoints `i`, `i + 1` and `i + 2`
//! as its lower edge, centre and upper edge.
//!
//! # Algorithm
//!
//! 1. Reject non-finite, negative or decreasing breakpoints
//! 2. Record tolerated conditions (above nyquist, duplicates, filter count)
//! 3. Evaluate each triangle at every bin centre frequency `b * sr / win_size`
//!
//! Each triangle peaks at `2 / (upper - lower)` when area normalisation is
//! enabled, so wide and narrow bands carry comparable energy.

use super::matrix::CoefficientMatrix;
use super::warning::{BuildReport, FilterbankWarning};
use crate::error::{FilterbankError, FilterbankResult};

/// Number of spectral bins produced by a real FFT of `win_size` samples
#[inline]
#[must_use]
pub const fn bins_for_window(win_size: usize) -> usize {
    win_size / 2 + 1
}

/// Centre frequency in Hz of spectral bin `bin`
#[inline]
#[must_use]
pub fn bin_to_freq(bin: usize, samplerate: f32, win_size: usize) -> f32 {
    bin as f32 * samplerate / win_size as f32
}

/// Check a sample rate is usable
pub(crate) fn validate_samplerate(samplerate: f32) -> FilterbankResult<()> {
    if !samplerate.is_finite() || samplerate <= 0.0 {
        return Err(FilterbankError::InvalidArgument(format!(
            "samplerate should be > 0, got {samplerate}"
        )));
    }
    Ok(())
}

/// Reject breakpoint lists that cannot describe triangles
///
/// Runs before any warning is raised so that a failing call reports nothing
/// but its error.
pub fn validate_breakpoints(freqs: &[f32]) -> FilterbankResult<()> {
    if freqs.len() < 3 {
        return Err(FilterbankError::InvalidArgument(format!(
            "at least 3 frequencies are needed to define a triangle, got {}",
            freqs.len()
        )));
    }

    for (index, &freq) in freqs.iter().enumerate() {
        if !freq.is_finite() {
            return Err(FilterbankError::InvalidArgument(format!(
                "non-finite frequency {freq} at index {index}"
            )));
        }
        if freq < 0.0 {
            return Err(FilterbankError::InvalidArgument(format!(
                "negative frequency {freq} at index {index}"
            )));
        }
        if index > 0 && freq < freqs[index - 1] {
            return Err(FilterbankError::InvalidArgument(format!(
                "frequencies not monotonically increasing: freqs[{index}] = {freq} < freqs[{}] = {}",
                index - 1,
                freqs[index - 1]
            )));
        }
    }

    Ok(())
}

fn collect_warnings(freqs: &[f32], samplerate: f32, n_filters: usize, report: &mut BuildReport) {
    let requested = freqs.len() - 2;
    if requested > n_filters {
        report.push(FilterbankWarning::NotEnoughFilters {
            allocated: n_filters,
            requested,
        });
    } else if requested < n_filters {
        report.push(FilterbankWarning::TooManyFilters {
            allocated: n_filters,
            requested,
        });
    }

    let nyquist = samplerate / 2.0;
    for (index, &freq) in freqs.iter().enumerate() {
        if freq > nyquist {
            report.push(FilterbankWarning::AboveNyquist {
                index,
                freq,
                nyquist,
            });
        } else if index > 0 && freq == freqs[index - 1] {
            report.push(FilterbankWarning::DuplicateFrequency { index, freq });
        }
    }
}

/// Fill `row` with one triangle evaluated at every bin centre
///
/// Centre and upper edge are clamped to the last bin, so a triangle peaking
/// above nyquist still reaches its full height there. The height always
/// comes from the unclamped edges.
///
/// Returns false when the triangle has zero width and the row is left zero.
fn fill_triangle(
    row: &mut [f32],
    (lower, center, upper): (f32, f32, f32),
    samplerate: f32,
    win_size: usize,
    norm: bool,
) -> bool {
    if upper <= lower {
        return false;
    }

    let height = if norm { 2.0 / (upper - lower) } else { 1.0 };

    let last = bin_to_freq(row.len().saturating_sub(1), samplerate, win_size);
    // lies wholly past the last bin
    if lower > last || (lower == last && center > last) {
        return true;
    }
    let center = center.min(last);
    let upper = upper.min(last);

    let rise = height / (center - lower);
    let fall = height / (upper - center);

    for (bin, weight) in row.iter_mut().enumerate() {
        let freq = bin_to_freq(bin, samplerate, win_size);
        *weight = if freq == center {
            height
        } else if freq > lower && freq < center {
            (freq - lower) * rise
        } else if freq > center && freq < upper {
            (upper - freq) * fall
        } else {
            0.0
        };
    }
    true
}

/// Build a `(n_filters, win_size / 2 + 1)` matrix of triangular filters
///
/// # Arguments
/// * `freqs` - Ascending breakpoints in Hz; `freqs.len() - 2` triangles
/// * `samplerate` - Sample rate in Hz
/// * `n_filters` - Rows of the output matrix
/// * `win_size` - FFT window size
/// * `norm` - Scale each triangle to unit area instead of unit height
///
/// # Errors
/// Returns `InvalidArgument` for a bad sample rate, fewer than 3 breakpoints,
/// non-finite, negative or decreasing frequencies
pub fn triangle_bands(
    freqs: &[f32],
    samplerate: f32,
    n_filters: usize,
    win_size: usize,
    norm: bool,
) -> FilterbankResult<(CoefficientMatrix, BuildReport)> {
    validate_samplerate(samplerate)?;
    validate_breakpoints(freqs)?;

    let mut report = BuildReport::new();
    collect_warnings(freqs, samplerate, n_filters, &mut report);

    let mut coeffs = CoefficientMatrix::zeros(n_filters, bins_for_window(win_size));
    for (filter, vertices) in freqs.windows(3).take(n_filters).enumerate() {
        let row = coeffs.row_mut(filter);
        let filled = fill_triangle(
            row,
            (vertices[0], vertices[1], vertices[2]),
            samplerate,
            win_size,
            norm,
        );
        if !filled || row.iter().all(|&w| w == 0.0) {
            report.push(FilterbankWarning::EmptyBand { filter });
        }
    }

    crate::trace_event!(
        "built {} triangle bands over {} bins ({} warnings)",
        n_filters,
        coeffs.cols(),
        report.warnings().len()
    );

    Ok((coeffs, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_FREQS: [f32; 11] = [
        40.0, 80.0, 200.0, 400.0, 800.0, 1600.0, 3200.0, 6400.0, 12800.0, 15000.0, 24000.0,
    ];

    // ============================================================
    // UNIT TESTS: Helpers
    // ============================================================

    #[test]
    fn test_bins_for_window() {
        assert_eq!(bins_for_window(1024), 513);
        assert_eq!(bins_for_window(512), 257);
        assert_eq!(bins_for_window(1), 1);
    }

    #[test]
    fn test_bin_to_freq() {
        assert_eq!(bin_to_freq(0, 48000.0, 1024), 0.0);
        assert!((bin_to_freq(1, 48000.0, 1024) - 46.875).abs() < 1e-6);
        assert!((bin_to_freq(512, 48000.0, 1024) - 24000.0).abs() < 1e-3);
    }

    // ============================================================
    // UNIT TESTS: Validation
    // ============================================================

    #[test]
    fn test_rejects_negative_frequency() {
        let err = triangle_bands(&[-10.0, 0.0, 80.0], 48000.0, 1, 1024, true);
        assert!(matches!(err, Err(FilterbankError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_unordered_frequencies() {
        let err = triangle_bands(&[0.0, 80.0, 40.0], 48000.0, 1, 1024, true);
        assert!(matches!(err, Err(FilterbankError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_short_list() {
        let err = triangle_bands(&[0.0, 80.0], 48000.0, 1, 1024, true);
        assert!(matches!(err, Err(FilterbankError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_nan_and_bad_samplerate() {
        assert!(triangle_bands(&[0.0, f32::NAN, 80.0], 48000.0, 1, 1024, true).is_err());
        assert!(triangle_bands(&[0.0, 40.0, 80.0], 0.0, 1, 1024, true).is_err());
        assert!(triangle_bands(&[0.0, 40.0, 80.0], -8000.0, 1, 1024, true).is_err());
    }

    // ============================================================
    // UNIT TESTS: Coefficients
    // ============================================================

    #[test]
    fn test_reference_row_sums() {
        let (coeffs, report) =
            triangle_bands(&REFERENCE_FREQS, 48000.0, 9, 1024, true).expect("valid bands");
        assert_eq!(coeffs.shape(), (9, 513));
        assert!(report.is_clean(), "unexpected warnings: {:?}", report.warnings());

        let expected = [
            0.020_703_13,
            0.021_386_72,
            0.021_276_04,
            0.021_354_17,
            0.021_333_01,
            0.021_333_01,
            0.021_333_11,
            0.021_333_34,
            0.021_333_45,
        ];
        for (got, want) in coeffs.row_sums().iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "row sum {got} != {want}");
        }
    }

    #[test]
    fn test_triangular_shape() {
        // One wide band: rises to the centre bin, then falls
        let (coeffs, _) =
            triangle_bands(&[1000.0, 2000.0, 3000.0], 8000.0, 1, 64, true).expect("valid");
        let row = coeffs.row(0);
        let peak = row
            .iter()
            .enumerate()
            .fold((0, 0.0_f32), |acc, (i, &w)| if w > acc.1 { (i, w) } else { acc });

        // bin spacing is 125 Hz, so 2000 Hz is bin 16
        assert_eq!(peak.0, 16);
        assert!((peak.1 - 2.0 / 2000.0).abs() < 1e-9);
        for b in 1..=peak.0 {
            assert!(row[b] >= row[b - 1], "should rise up to the peak");
        }
        for b in peak.0 + 1..row.len() {
            assert!(row[b] <= row[b - 1], "should fall after the peak");
        }
        assert_eq!(row[8], 0.0, "lower edge bin is zero");
        assert_eq!(row[24], 0.0, "upper edge bin is zero");
    }

    #[test]
    fn test_unit_height_without_norm() {
        let (coeffs, _) =
            triangle_bands(&[1000.0, 2000.0, 3000.0], 8000.0, 1, 64, false).expect("valid");
        let max = coeffs.row(0).iter().copied().fold(0.0_f32, f32::max);
        assert!((max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_coefficients_nonnegative() {
        let (coeffs, _) =
            triangle_bands(&REFERENCE_FREQS, 48000.0, 9, 1024, true).expect("valid bands");
        assert!(coeffs.as_slice().iter().all(|&w| w >= 0.0 && w.is_finite()));
    }

    #[test]
    fn test_starts_at_zero() {
        let (coeffs, report) =
            triangle_bands(&[0.0, 40.0, 80.0], 48000.0, 1, 1024, true).expect("valid");
        assert_eq!(coeffs.shape(), (1, 513));
        assert_eq!(coeffs.row(0)[0], 0.0);
        assert!(coeffs.row(0)[1] > 0.0);
        assert!(report.is_clean());
    }

    // ============================================================
    // UNIT TESTS: Warnings
    // ============================================================

    #[test]
    fn test_above_nyquist_warns() {
        let samplerate = 22050.0;
        let freqs = [0.0, 5512.0, 11026.0];
        let (coeffs, report) = triangle_bands(&freqs, samplerate, 1, 1024, true).expect("tolerated");
        assert!(report.has(|w| matches!(w, FilterbankWarning::AboveNyquist { index: 2, .. })));
        assert!(coeffs.as_slice().iter().all(|w| w.is_finite()));
    }

    #[test]
    fn test_not_enough_filters_warns() {
        let freqs = [0.0, 100.0, 1000.0, 4000.0, 8000.0, 10000.0];
        let (coeffs, report) = triangle_bands(&freqs, 22050.0, 3, 1024, true).expect("tolerated");
        assert_eq!(coeffs.rows(), 3);
        assert!(report.has(|w| *w
            == FilterbankWarning::NotEnoughFilters {
                allocated: 3,
                requested: 4
            }));
    }

    #[test]
    fn test_too_many_filters_leaves_rows_zero() {
        let freqs = [0.0, 100.0, 1000.0, 4000.0, 8000.0, 10000.0];
        let (coeffs, report) = triangle_bands(&freqs, 22050.0, 5, 1024, true).expect("tolerated");
        assert_eq!(coeffs.rows(), 5);
        assert!(report.has(|w| *w
            == FilterbankWarning::TooManyFilters {
                allocated: 5,
                requested: 4
            }));
        assert!(coeffs.row(4).iter().all(|&w| w == 0.0));
        assert!(coeffs.row(3).iter().any(|&w| w > 0.0));
    }

    #[test]
    fn test_duplicate_frequencies() {
        let freqs = [0.0, 100.0, 1000.0, 4000.0, 4000.0, 4000.0, 10000.0];
        let (coeffs, report) = triangle_bands(&freqs, 22050.0, 5, 1024, true).expect("tolerated");

        assert!(report.has(|w| matches!(w, FilterbankWarning::DuplicateFrequency { index: 4, .. })));
        assert!(report.has(|w| matches!(w, FilterbankWarning::DuplicateFrequency { index: 5, .. })));
        // filter 3 spans 4000..4000..4000
        assert!(coeffs.row(3).iter().all(|&w| w == 0.0));
        assert!(report.has(|w| *w == FilterbankWarning::EmptyBand { filter: 3 }));
        assert!(coeffs.as_slice().iter().all(|w| w.is_finite() && *w >= 0.0));
    }

    #[test]
    fn test_centre_above_nyquist_peaks_at_last_bin() {
        let freqs = [10000.0, 30000.0, 40000.0];
        let (coeffs, report) = triangle_bands(&freqs, 48000.0, 1, 1024, true).expect("tolerated");
        assert!(report.has(|w| matches!(w, FilterbankWarning::AboveNyquist { index: 1, .. })));

        let row = coeffs.row(0);
        let peak = 2.0 / 30000.0;
        assert!((row[512] - peak).abs() < 1e-9, "last bin {} != {peak}", row[512]);
        assert!(row.iter().all(|&w| w <= row[512]));
        // 10 kHz lower edge is bin 213.33, rising from there
        assert_eq!(row[213], 0.0);
        assert!(row[214] > 0.0 && row[214] < row[300]);
    }

    #[test]
    fn test_band_starting_at_nyquist_is_empty() {
        let (coeffs, report) =
            triangle_bands(&[24000.0, 30000.0, 40000.0], 48000.0, 1, 1024, true)
                .expect("tolerated");
        assert!(coeffs.is_zero());
        assert!(report.has(|w| *w == FilterbankWarning::EmptyBand { filter: 0 }));
    }

    #[test]
    fn test_half_degenerate_triangle_is_finite() {
        // lower == centre: no rising slope, peak on the centre
        let (coeffs, _) =
            triangle_bands(&[1000.0, 1000.0, 3000.0], 8000.0, 1, 64, true).expect("valid");
        let row = coeffs.row(0);
        assert!(row.iter().all(|w| w.is_finite()));
        assert!((row[8] - 2.0 / 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_collapsed_band_warns() {
        // 5 Hz wide triangle between two 46.875 Hz bins
        let (coeffs, report) =
            triangle_bands(&[50.0, 52.0, 55.0], 48000.0, 1, 1024, true).expect("valid");
        assert!(coeffs.is_zero());
        assert!(report.has(|w| *w == FilterbankWarning::EmptyBand { filter: 0 }));
    }

    #[test]
    fn test_failure_reports_no_partial_result() {
        // decreasing pair after an above-nyquist value still fails outright
        let err = triangle_bands(&[0.0, 30000.0, 100.0], 48000.0, 1, 1024, true);
        assert!(err.is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(50))]

            #[test]
            fn property_bands_nonnegative_and_shaped(
                mut freqs in proptest::collection::vec(0.0f32..24000.0, 3..20),
                win_pow in 6u32..12,
            ) {
                freqs.sort_by(f32::total_cmp);
                let win_size = 1usize << win_pow;
                let n_filters = freqs.len() - 2;
                let (coeffs, _) = triangle_bands(&freqs, 48000.0, n_filters, win_size, true)
                    .expect("sorted non-negative list is valid");
                prop_assert_eq!(coeffs.shape(), (n_filters, win_size / 2 + 1));
                for &w in coeffs.as_slice() {
                    prop_assert!(w >= 0.0 && w.is_finite());
                }
            }

            #[test]
            fn property_rebuild_is_deterministic(
                mut freqs in proptest::collection::vec(0.0f32..8000.0, 3..12),
            ) {
                freqs.sort_by(f32::total_cmp);
                let n = freqs.len() - 2;
                let a = triangle_bands(&freqs, 16000.0, n, 512, true).expect("valid");
                let b = triangle_bands(&freqs, 16000.0, n, 512, true).expect("valid");
                prop_assert_eq!(a, b);
            }
        }
    }
}
