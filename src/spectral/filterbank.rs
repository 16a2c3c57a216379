//! Filterbank: build once, apply many times
//!
//! A [`Filterbank`] owns a `(n_filters, win_size / 2 + 1)` coefficient matrix.
//! Builders overwrite the whole matrix or fail without touching it; `apply`
//! reduces a magnitude spectrum to one energy per filter.
//!
//! # Example
//!
//! ```rust,ignore
//! use spectral_filterbank::{Filterbank, Spectrum};
//!
//! let mut fb = Filterbank::new(40, 1024)?;
//! fb.set_mel_coeffs_slaney(44100.0)?;
//! let bands = fb.apply(&Spectrum::from_frame(&frame)?)?;
//! ```

use super::bands::{bins_for_window, triangle_bands, validate_samplerate};
use super::matrix::CoefficientMatrix;
use super::scale::{MelScale, SLANEY_LOWEST_FREQUENCY};
use super::spectrum::Spectrum;
use super::warning::BuildReport;
use super::{BandScale, FilterbankConfig};
use crate::error::{FilterbankError, FilterbankResult};
use crate::parallel;

/// Bank of spectral filters applied as a matrix-vector product
#[derive(Debug, Clone, PartialEq)]
pub struct Filterbank {
    /// Number of output bands
    n_filters: usize,
    /// FFT window size
    win_size: usize,
    /// `n_filters` x `win_size / 2 + 1` weights
    coeffs: CoefficientMatrix,
    /// Scale triangles to unit area when building
    norm: bool,
    /// Exponent applied to magnitudes before filtering
    power: f32,
}

impl Filterbank {
    /// Create a filterbank with all-zero coefficients
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `n_filters` or `win_size` is zero
    pub fn new(n_filters: usize, win_size: usize) -> FilterbankResult<Self> {
        if n_filters == 0 {
            return Err(FilterbankError::InvalidArgument(
                "n_filters should be > 0".into(),
            ));
        }
        if win_size == 0 {
            return Err(FilterbankError::InvalidArgument(
                "win_size should be > 0".into(),
            ));
        }

        Ok(Self {
            n_filters,
            win_size,
            coeffs: CoefficientMatrix::zeros(n_filters, bins_for_window(win_size)),
            norm: true,
            power: 1.0,
        })
    }

    /// Create and build a filterbank from a configuration
    ///
    /// # Errors
    /// Returns the first construction or build error
    pub fn from_config(config: &FilterbankConfig) -> FilterbankResult<(Self, BuildReport)> {
        let mut fb = Self::new(config.n_filters, config.win_size)?;
        fb.set_norm(config.norm);
        fb.set_power(config.power)?;

        let report = match config.scale {
            BandScale::Slaney => fb.set_mel_coeffs_slaney(config.samplerate)?,
            BandScale::Mel { fmin, fmax } => fb.set_mel_coeffs(config.samplerate, fmin, fmax)?,
            BandScale::Htk { fmin, fmax } => {
                fb.set_mel_coeffs_htk(config.samplerate, fmin, fmax)?
            }
        };
        Ok((fb, report))
    }

    // ------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------

    /// Build triangular filters from explicit breakpoints
    ///
    /// Filter `i` spans `freqs[i]..freqs[i + 2]` and peaks at `freqs[i + 1]`.
    /// Frequencies above nyquist, duplicates and a breakpoint count that does
    /// not match `n_filters + 2` are tolerated and reported.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for negative, non-finite or decreasing
    /// frequencies, fewer than 3 breakpoints or a non-positive sample rate.
    /// The coefficients are left unchanged on error.
    #[allow(clippy::no_effect_underscore_binding)]
    pub fn set_triangle_bands(
        &mut self,
        freqs: &[f32],
        samplerate: f32,
    ) -> FilterbankResult<BuildReport> {
        let _span = crate::trace_enter!("set_triangle_bands");

        let (coeffs, report) =
            triangle_bands(freqs, samplerate, self.n_filters, self.win_size, self.norm)?;
        self.coeffs = coeffs;
        Ok(report)
    }

    /// Build Slaney mel filters from the Slaney low edge up to nyquist
    ///
    /// When nyquist does not exceed the low edge every breakpoint collapses
    /// onto nyquist: the build succeeds with all-zero rows and one
    /// `EmptyBand` warning per filter.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `samplerate` is not positive
    #[allow(clippy::no_effect_underscore_binding)]
    pub fn set_mel_coeffs_slaney(&mut self, samplerate: f32) -> FilterbankResult<BuildReport> {
        let _span = crate::trace_enter!("set_mel_coeffs_slaney");

        validate_samplerate(samplerate)?;
        let nyquist = samplerate / 2.0;
        if nyquist <= SLANEY_LOWEST_FREQUENCY {
            crate::trace_event!("nyquist {} Hz is below the Slaney low edge", nyquist);
            let collapsed = vec![nyquist; self.n_filters + 2];
            return self.set_triangle_bands(&collapsed, samplerate);
        }
        self.set_mel_scaled(MelScale::Slaney, samplerate, SLANEY_LOWEST_FREQUENCY, nyquist)
    }

    /// Build filters spaced uniformly on the Slaney mel scale
    ///
    /// `fmax == 0` selects the nyquist frequency.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a non-positive sample rate, negative
    /// bounds or `fmin >= fmax`
    #[allow(clippy::no_effect_underscore_binding)]
    pub fn set_mel_coeffs(
        &mut self,
        samplerate: f32,
        fmin: f32,
        fmax: f32,
    ) -> FilterbankResult<BuildReport> {
        let _span = crate::trace_enter!("set_mel_coeffs");
        self.set_mel_scaled(MelScale::Slaney, samplerate, fmin, fmax)
    }

    /// Build filters spaced uniformly on the HTK mel scale
    ///
    /// `fmax == 0` selects the nyquist frequency.
    ///
    /// # Errors
    /// Same as [`Filterbank::set_mel_coeffs`]
    #[allow(clippy::no_effect_underscore_binding)]
    pub fn set_mel_coeffs_htk(
        &mut self,
        samplerate: f32,
        fmin: f32,
        fmax: f32,
    ) -> FilterbankResult<BuildReport> {
        let _span = crate::trace_enter!("set_mel_coeffs_htk");
        self.set_mel_scaled(MelScale::Htk, samplerate, fmin, fmax)
    }

    fn set_mel_scaled(
        &mut self,
        scale: MelScale,
        samplerate: f32,
        fmin: f32,
        fmax: f32,
    ) -> FilterbankResult<BuildReport> {
        validate_samplerate(samplerate)?;

        if !fmin.is_finite() || fmin < 0.0 {
            return Err(FilterbankError::InvalidArgument(format!(
                "fmin should be >= 0, got {fmin}"
            )));
        }
        if !fmax.is_finite() || fmax < 0.0 {
            return Err(FilterbankError::InvalidArgument(format!(
                "fmax should be >= 0, got {fmax}"
            )));
        }
        let fmax = if fmax == 0.0 { samplerate / 2.0 } else { fmax };
        if fmin >= fmax {
            return Err(FilterbankError::InvalidArgument(format!(
                "fmin ({fmin}) should be below fmax ({fmax})"
            )));
        }

        let freqs = scale.breakpoints(self.n_filters, fmin, fmax, samplerate);
        crate::trace_event!(
            "{:?} mel breakpoints {} Hz .. {} Hz",
            scale,
            freqs[0],
            freqs[freqs.len() - 1]
        );
        self.set_triangle_bands(&freqs, samplerate)
    }

    /// Replace the coefficients with a caller-supplied matrix
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the shape differs from
    /// `(n_filters, win_size / 2 + 1)` and `InvalidArgument` if any weight is
    /// negative or non-finite
    pub fn set_coefficients(&mut self, coeffs: CoefficientMatrix) -> FilterbankResult<()> {
        if coeffs.shape() != self.coeffs.shape() {
            return Err(FilterbankError::shape(
                "coefficients",
                self.coeffs.shape(),
                coeffs.shape(),
            ));
        }
        if let Some(bad) = coeffs
            .as_slice()
            .iter()
            .find(|w| !w.is_finite() || **w < 0.0)
        {
            return Err(FilterbankError::InvalidArgument(format!(
                "coefficients should be finite and non-negative, found {bad}"
            )));
        }
        self.coeffs = coeffs;
        Ok(())
    }

    /// Scale triangles to unit area (`true`, default) or unit height
    ///
    /// Takes effect on the next build.
    pub fn set_norm(&mut self, norm: bool) {
        self.norm = norm;
    }

    /// Exponent applied to each magnitude before filtering (default 1)
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `power` is not finite and positive; a zero
    /// or negative exponent would turn silent bins into non-zero or infinite
    /// energy
    pub fn set_power(&mut self, power: f32) -> FilterbankResult<()> {
        if !power.is_finite() || power <= 0.0 {
            return Err(FilterbankError::InvalidArgument(format!(
                "power should be finite and > 0, got {power}"
            )));
        }
        self.power = power;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Application
    // ------------------------------------------------------------------

    /// Reduce a spectrum to one energy per filter
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the spectrum does not have
    /// `win_size / 2 + 1` bins
    pub fn apply(&self, spectrum: &Spectrum) -> FilterbankResult<Vec<f32>> {
        self.apply_slice(spectrum.norm())
    }

    /// Reduce a bare magnitude array to one energy per filter
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if `norm.len() != win_size / 2 + 1`
    pub fn apply_slice(&self, norm: &[f32]) -> FilterbankResult<Vec<f32>> {
        let mut out = vec![0.0; self.n_filters];
        self.apply_slice_into(norm, &mut out)?;
        Ok(out)
    }

    /// Reduce a spectrum into a caller-provided buffer of `n_filters` values
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if either length is wrong
    pub fn apply_into(&self, spectrum: &Spectrum, out: &mut [f32]) -> FilterbankResult<()> {
        self.apply_slice_into(spectrum.norm(), out)
    }

    fn apply_slice_into(&self, norm: &[f32], out: &mut [f32]) -> FilterbankResult<()> {
        if norm.len() != self.n_bins() {
            return Err(FilterbankError::length("spectrum", self.n_bins(), norm.len()));
        }
        if out.len() != self.n_filters {
            return Err(FilterbankError::length("output", self.n_filters, out.len()));
        }

        if self.power == 1.0 {
            self.coeffs.mul_vec_into(norm, out);
        } else {
            let powered: Vec<f32> = norm.iter().map(|v| v.powf(self.power)).collect();
            self.coeffs.mul_vec_into(&powered, out);
        }
        Ok(())
    }

    /// Apply to many spectra, in parallel with the `parallel` feature
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if any spectrum has the wrong length
    pub fn apply_batch(&self, spectra: &[Spectrum]) -> FilterbankResult<Vec<Vec<f32>>> {
        parallel::parallel_try_map(0..spectra.len(), |i| self.apply(&spectra[i]))
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Number of output bands
    #[must_use]
    pub const fn n_filters(&self) -> usize {
        self.n_filters
    }

    /// FFT window size
    #[must_use]
    pub const fn win_size(&self) -> usize {
        self.win_size
    }

    /// Number of spectral bins (`win_size / 2 + 1`)
    #[must_use]
    pub const fn n_bins(&self) -> usize {
        bins_for_window(self.win_size)
    }

    /// Area normalisation flag used by builders
    #[must_use]
    pub const fn norm(&self) -> bool {
        self.norm
    }

    /// Magnitude exponent used by `apply`
    #[must_use]
    pub const fn power(&self) -> f32 {
        self.power
    }

    /// Borrow the current coefficients
    #[must_use]
    pub const fn coefficients(&self) -> &CoefficientMatrix {
        &self.coeffs
    }

    /// Owned snapshot of the current coefficients
    #[must_use]
    pub fn get_coefficients(&self) -> CoefficientMatrix {
        self.coeffs.clone()
    }

    /// True once any non-zero coefficient has been set
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.coeffs.is_zero()
    }
}
