//! Perceptual frequency scales
//!
//! Two mel conventions are provided:
//!
//! - **Slaney** (Auditory Toolbox): linear below 1000 Hz at 200/3 Hz per mel,
//!   logarithmic above with a step of `ln(6.4) / 27` per mel, so that 1000 Hz
//!   maps to mel 15 and 6400 Hz to mel 42.
//! - **HTK**: `mel = 1127 * ln(1 + f / 700)`.
//!
//! # References
//!
//! - Slaney, M. (1998). Auditory Toolbox, Technical Report #1998-010.
//! - Young, S. et al. The HTK Book.

/// Lowest breakpoint of the Slaney filterbank (mel 2)
pub const SLANEY_LOWEST_FREQUENCY: f32 = 133.333_33;

/// Hz per mel in the Slaney linear region
pub const SLANEY_LINEAR_SPACING: f32 = 200.0 / 3.0;

/// Frequency at which the Slaney scale turns logarithmic
pub const SLANEY_SPLIT_HZ: f32 = 1000.0;

/// Mel value at [`SLANEY_SPLIT_HZ`]
pub const SLANEY_SPLIT_MEL: f32 = SLANEY_SPLIT_HZ / SLANEY_LINEAR_SPACING;

/// Natural-log step per mel in the Slaney logarithmic region, `ln(6.4) / 27`
pub const SLANEY_LOG_STEP: f32 = 0.068_751_78;

const HTK_CORNER_HZ: f32 = 700.0;
const HTK_FACTOR: f32 = 1127.0;

/// Mel scale convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MelScale {
    /// Slaney's piecewise linear/logarithmic scale
    #[default]
    Slaney,
    /// HTK's purely logarithmic scale
    Htk,
}

impl MelScale {
    /// Convert a non-negative frequency in Hz to mel
    #[inline]
    #[must_use]
    pub fn hz_to_mel(self, hz: f32) -> f32 {
        match self {
            Self::Slaney => {
                if hz < SLANEY_SPLIT_HZ {
                    hz / SLANEY_LINEAR_SPACING
                } else {
                    SLANEY_SPLIT_MEL + (hz / SLANEY_SPLIT_HZ).ln() / SLANEY_LOG_STEP
                }
            }
            Self::Htk => HTK_FACTOR * (hz / HTK_CORNER_HZ).ln_1p(),
        }
    }

    /// Convert a mel value back to Hz
    #[inline]
    #[must_use]
    pub fn mel_to_hz(self, mel: f32) -> f32 {
        match self {
            Self::Slaney => {
                if mel < SLANEY_SPLIT_MEL {
                    SLANEY_LINEAR_SPACING * mel
                } else {
                    SLANEY_SPLIT_HZ * ((mel - SLANEY_SPLIT_MEL) * SLANEY_LOG_STEP).exp()
                }
            }
            Self::Htk => HTK_CORNER_HZ * (mel / HTK_FACTOR).exp_m1(),
        }
    }

    /// `n_filters + 2` breakpoints spaced uniformly in mel between `fmin` and
    /// `fmax`, clamped to the Nyquist frequency
    ///
    /// Arguments are validated by the caller.
    #[must_use]
    pub fn breakpoints(self, n_filters: usize, fmin: f32, fmax: f32, samplerate: f32) -> Vec<f32> {
        let nyquist = samplerate / 2.0;
        let start = self.hz_to_mel(fmin);
        let end = self.hz_to_mel(fmax);
        let step = (end - start) / (n_filters + 1) as f32;

        (0..n_filters + 2)
            .map(|m| self.mel_to_hz(start + step * m as f32).min(nyquist))
            .collect()
    }
}
