//! Magnitude spectrum container
//!
//! Holds the non-redundant half (`win_size / 2 + 1` bins) of a real FFT as
//! separate norm and phase channels. The filterbank only reads the norm.

use super::bands::bins_for_window;
use crate::error::{FilterbankError, FilterbankResult};
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

/// Norm and phase of one analysis frame
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    win_size: usize,
    norm: Vec<f32>,
    phas: Vec<f32>,
}

impl Spectrum {
    /// Create a zeroed spectrum for an FFT of `win_size` samples
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `win_size` is zero
    pub fn new(win_size: usize) -> FilterbankResult<Self> {
        if win_size == 0 {
            return Err(FilterbankError::InvalidArgument(
                "win_size should be > 0".into(),
            ));
        }
        let n_bins = bins_for_window(win_size);
        Ok(Self {
            win_size,
            norm: vec![0.0; n_bins],
            phas: vec![0.0; n_bins],
        })
    }

    /// Wrap an existing magnitude array; phase is zeroed
    ///
    /// The window size is inferred as `2 * (norm.len() - 1)`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `norm` has fewer than 2 bins
    pub fn from_norm(norm: Vec<f32>) -> FilterbankResult<Self> {
        if norm.len() < 2 {
            return Err(FilterbankError::InvalidArgument(format!(
                "a spectrum needs at least 2 bins, got {}",
                norm.len()
            )));
        }
        let phas = vec![0.0; norm.len()];
        Ok(Self {
            win_size: 2 * (norm.len() - 1),
            norm,
            phas,
        })
    }

    /// Hann-windowed spectrum of one frame of samples
    ///
    /// The frame length sets the window size.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `frame` is empty
    pub fn from_frame(frame: &[f32]) -> FilterbankResult<Self> {
        let win_size = frame.len();
        let mut spectrum = Self::new(win_size)?;

        let window = hann_window(win_size);
        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .zip(&window)
            .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
            .collect();

        let mut planner = FftPlanner::new();
        planner.plan_fft_forward(win_size).process(&mut buffer);

        for ((norm, phas), c) in spectrum
            .norm
            .iter_mut()
            .zip(spectrum.phas.iter_mut())
            .zip(&buffer)
        {
            *norm = c.norm();
            *phas = c.arg();
        }

        Ok(spectrum)
    }

    /// FFT window size this spectrum belongs to
    #[must_use]
    pub const fn win_size(&self) -> usize {
        self.win_size
    }

    /// Number of bins (`win_size / 2 + 1`)
    #[must_use]
    pub fn len(&self) -> usize {
        self.norm.len()
    }

    /// Always false; a spectrum has at least one bin
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.norm.is_empty()
    }

    /// Magnitudes
    #[must_use]
    pub fn norm(&self) -> &[f32] {
        &self.norm
    }

    /// Mutable magnitudes
    pub fn norm_mut(&mut self) -> &mut [f32] {
        &mut self.norm
    }

    /// Phases in radians
    #[must_use]
    pub fn phas(&self) -> &[f32] {
        &self.phas
    }

    /// Set every magnitude to `value`
    pub fn fill_norm(&mut self, value: f32) {
        self.norm.fill(value);
    }
}

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|n| 0.5 * (1.0 - (2.0 * PI * n as f32 / size as f32).cos()))
        .collect()
}
