//! Spectral filterbank module
//!
//! Builds triangular weighting matrices over FFT bins and applies them to
//! magnitude spectra to obtain band energies.

mod bands;
mod filterbank;
mod matrix;
mod scale;
mod spectrum;
mod warning;

pub use bands::{bin_to_freq, bins_for_window, triangle_bands, validate_breakpoints};
pub use filterbank::Filterbank;
pub use matrix::CoefficientMatrix;
pub use scale::{
    MelScale, SLANEY_LINEAR_SPACING, SLANEY_LOG_STEP, SLANEY_LOWEST_FREQUENCY, SLANEY_SPLIT_HZ,
    SLANEY_SPLIT_MEL,
};
pub use spectrum::Spectrum;
pub use warning::{BuildReport, FilterbankWarning};

/// Default number of filters (Slaney's 13 linear + 27 logarithmic bands)
pub const N_FILTERS: usize = 40;

/// Default FFT window size
pub const WIN_SIZE: usize = 1024;

/// Default sample rate in Hz
pub const SAMPLE_RATE: f32 = 44100.0;

/// How filter breakpoints are placed
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BandScale {
    /// Slaney mel scale from the Slaney low edge up to nyquist
    #[default]
    Slaney,
    /// Slaney mel scale over `fmin..fmax` (`fmax == 0` means nyquist)
    Mel {
        /// Lowest breakpoint in Hz
        fmin: f32,
        /// Highest breakpoint in Hz
        fmax: f32,
    },
    /// HTK mel scale over `fmin..fmax` (`fmax == 0` means nyquist)
    Htk {
        /// Lowest breakpoint in Hz
        fmin: f32,
        /// Highest breakpoint in Hz
        fmax: f32,
    },
}

/// Filterbank configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FilterbankConfig {
    /// Number of output bands (default: 40)
    pub n_filters: usize,
    /// FFT window size (default: 1024)
    pub win_size: usize,
    /// Sample rate in Hz (default: 44100)
    pub samplerate: f32,
    /// Breakpoint placement (default: Slaney)
    pub scale: BandScale,
    /// Unit-area triangles (default: true)
    pub norm: bool,
    /// Magnitude exponent applied before filtering (default: 1)
    pub power: f32,
}

impl Default for FilterbankConfig {
    fn default() -> Self {
        Self {
            n_filters: N_FILTERS,
            win_size: WIN_SIZE,
            samplerate: SAMPLE_RATE,
            scale: BandScale::Slaney,
            norm: true,
            power: 1.0,
        }
    }
}

impl FilterbankConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of filters
    #[must_use]
    pub fn with_n_filters(mut self, n_filters: usize) -> Self {
        self.n_filters = n_filters;
        self
    }

    /// Set the FFT window size
    #[must_use]
    pub fn with_win_size(mut self, win_size: usize) -> Self {
        self.win_size = win_size;
        self
    }

    /// Set the sample rate
    #[must_use]
    pub fn with_samplerate(mut self, samplerate: f32) -> Self {
        self.samplerate = samplerate;
        self
    }

    /// Set the breakpoint placement
    #[must_use]
    pub fn with_scale(mut self, scale: BandScale) -> Self {
        self.scale = scale;
        self
    }

    /// Enable or disable unit-area triangles
    #[must_use]
    pub fn with_norm(mut self, norm: bool) -> Self {
        self.norm = norm;
        self
    }

    /// Set the magnitude exponent
    #[must_use]
    pub fn with_power(mut self, power: f32) -> Self {
        self.power = power;
        self
    }
}
