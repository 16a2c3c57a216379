//! Non-fatal build diagnostics
//!
//! Builders accept slightly malformed band layouts and report what they had
//! to tolerate here instead of failing.

use std::fmt;

/// A condition tolerated while building coefficients
#[derive(Debug, Clone, PartialEq)]
pub enum FilterbankWarning {
    /// A breakpoint lies above the Nyquist frequency
    AboveNyquist {
        /// Position in the breakpoint list
        index: usize,
        /// Offending frequency in Hz
        freq: f32,
        /// Nyquist frequency in Hz
        nyquist: f32,
    },
    /// The breakpoints describe more triangles than the filterbank has rows;
    /// the surplus breakpoints are ignored
    NotEnoughFilters {
        /// Rows in the filterbank
        allocated: usize,
        /// Triangles described by the breakpoints
        requested: usize,
    },
    /// The breakpoints describe fewer triangles than the filterbank has rows;
    /// the surplus rows stay all-zero
    TooManyFilters {
        /// Rows in the filterbank
        allocated: usize,
        /// Triangles described by the breakpoints
        requested: usize,
    },
    /// A breakpoint repeats its predecessor
    DuplicateFrequency {
        /// Position in the breakpoint list
        index: usize,
        /// Repeated frequency in Hz
        freq: f32,
    },
    /// A triangle covers no spectral bin, so its row is all-zero
    EmptyBand {
        /// Filter (row) index
        filter: usize,
    },
}

impl fmt::Display for FilterbankWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AboveNyquist {
                index,
                freq,
                nyquist,
            } => write!(
                f,
                "frequency {freq} Hz at index {index} is above nyquist ({nyquist} Hz)"
            ),
            Self::NotEnoughFilters {
                allocated,
                requested,
            } => write!(
                f,
                "not enough filters, {allocated} allocated but {requested} requested"
            ),
            Self::TooManyFilters {
                allocated,
                requested,
            } => write!(
                f,
                "too many filters, {allocated} allocated but {requested} requested"
            ),
            Self::DuplicateFrequency { index, freq } => {
                write!(f, "frequency {freq} Hz repeated at index {index}")
            }
            Self::EmptyBand { filter } => {
                write!(f, "filter {filter} covers no spectral bin")
            }
        }
    }
}

/// Outcome of a successful coefficient build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    warnings: Vec<FilterbankWarning>,
}

impl BuildReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning, forwarding it to the tracing subscriber
    pub(crate) fn push(&mut self, warning: FilterbankWarning) {
        crate::trace_warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// True when the build needed no tolerance
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warnings in the order they were raised
    #[must_use]
    pub fn warnings(&self) -> &[FilterbankWarning] {
        &self.warnings
    }

    /// True when any warning matches `pred`
    pub fn has(&self, pred: impl Fn(&FilterbankWarning) -> bool) -> bool {
        self.warnings.iter().any(pred)
    }
}

impl IntoIterator for BuildReport {
    type Item = FilterbankWarning;
    type IntoIter = std::vec::IntoIter<FilterbankWarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.into_iter()
    }
}
