//! # spectral-filterbank
//!
//! Triangular spectral filterbanks for audio feature extraction.
//!
//! ## Overview
//!
//! A [`Filterbank`] holds a `(n_filters, win_size / 2 + 1)` matrix of
//! non-negative weights. Builders populate it from the Slaney or HTK mel scale
//! or from an explicit list of breakpoint frequencies; `apply` then reduces a
//! magnitude spectrum to one energy per band.
//!
//! Slightly malformed band layouts (frequencies above nyquist, duplicate
//! breakpoints, a breakpoint count that does not match the filter count) are
//! tolerated: the build succeeds and returns a [`BuildReport`] listing what was
//! tolerated. Invalid input (negative or decreasing frequencies, wrong shapes)
//! fails with a [`FilterbankError`] and leaves the filterbank untouched.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spectral_filterbank::{Filterbank, Spectrum};
//!
//! let mut fb = Filterbank::new(40, 1024)?;
//! let report = fb.set_mel_coeffs_slaney(44100.0)?;
//! for warning in report.warnings() {
//!     eprintln!("{warning}");
//! }
//! let energies = fb.apply(&Spectrum::from_frame(&frame)?)?;
//! ```
//!
//! ## Features
//!
//! - `tracing`: spans around builders and `WARN` events for tolerated input
//! - `parallel`: rayon-backed [`Filterbank::apply_batch`]

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

pub mod error;
/// Sequential/parallel map helpers
pub mod parallel;
pub mod spectral;
#[macro_use]
pub mod trace;

pub use error::{FilterbankError, FilterbankResult};
pub use spectral::{
    BandScale, BuildReport, CoefficientMatrix, Filterbank, FilterbankConfig, FilterbankWarning,
    MelScale, Spectrum,
};
