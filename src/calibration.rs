//! Significance cutoffs for a family of tests.
//!
//! Every test family (gene expression or transcript splicing) is reduced to a
//! single [`Cutoff`]: a test is significant when its error probability is less
//! than or equal to the cutoff. Cutoffs are produced by a [`Calibrate`]
//! strategy. Two strategies are provided:
//!
//! - [`pep::Calibrator`], which searches for the largest cutoff whose Bayesian
//!   false discovery rate stays within a target (used for posterior error
//!   probabilities, such as those from HBA-DEALS).
//! - [`fixed::Threshold`], which always returns the same cutoff (used for
//!   classical adjusted p-values, such as those from edgeR).
//!
//! ```
//! use isopret::calibration::Calibrate as _;
//! use isopret::calibration::Calibration;
//! use isopret::calibration::ScoreSet;
//!
//! let scores = ScoreSet::from(vec![0.0, 0.0, 0.2, 0.3]);
//! let cutoff = Calibration::default().calibrate(scores);
//!
//! assert_eq!(cutoff.get(), 0.0);
//! assert!(cutoff.admits(0.0));
//! assert!(!cutoff.admits(0.2));
//! ```

pub mod fixed;
pub mod pep;

/// The largest error probability that can ever be considered significant.
pub const MAX_PEP: f64 = 0.25;

/// An error related to calibration.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// A cutoff was outside of `[0, MAX_PEP]`.
    InvalidCutoff(f64),

    /// A target false discovery rate was outside of `[0, 1]`.
    InvalidTarget(f64),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidCutoff(value) => {
                write!(f, "cutoff must be within [0, {MAX_PEP}], found {value}")
            }
            Error::InvalidTarget(value) => {
                write!(f, "target false discovery rate must be within [0, 1], found {value}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// The error probabilities of one family of tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreSet(Vec<f64>);

impl ScoreSet {
    /// Gets the number of scores.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no scores.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets the scores as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consumes `self` and returns the inner scores.
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for ScoreSet {
    fn from(scores: Vec<f64>) -> Self {
        Self(scores)
    }
}

impl FromIterator<f64> for ScoreSet {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A significance cutoff within `[0, MAX_PEP]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Cutoff(f64);

impl Cutoff {
    /// A cutoff that only admits error probabilities of exactly zero.
    pub const ZERO: Cutoff = Cutoff(0.0);

    /// Attempts to create a new cutoff.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::calibration::Cutoff;
    ///
    /// let cutoff = Cutoff::try_new(0.05)?;
    /// assert!(cutoff.admits(0.05));
    /// assert!(!cutoff.admits(0.051));
    ///
    /// assert!(Cutoff::try_new(0.3).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(value: f64) -> Result<Self> {
        if !(0.0..=MAX_PEP).contains(&value) {
            return Err(Error::InvalidCutoff(value));
        }

        Ok(Self(value))
    }

    /// Creates a cutoff, clamping `value` into `[0, MAX_PEP]`.
    pub(crate) fn clamped(value: f64) -> Self {
        Self(value.clamp(0.0, MAX_PEP))
    }

    /// Gets the inner value.
    pub fn get(&self) -> f64 {
        self.0
    }

    /// Whether `p` is significant under this cutoff.
    pub fn admits(&self, p: f64) -> bool {
        p <= self.0
    }
}

impl std::fmt::Display for Cutoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strategy for turning the scores of a test family into a [`Cutoff`].
pub trait Calibrate {
    /// Calibrates a cutoff for `scores`.
    ///
    /// This never fails: degenerate input produces [`Cutoff::ZERO`].
    fn calibrate(&self, scores: ScoreSet) -> Cutoff;
}

/// The calibration strategy selected for an analysis.
#[derive(Clone, Debug, PartialEq)]
pub enum Calibration {
    /// Bayesian false discovery rate control over posterior error
    /// probabilities.
    Bayesian(pep::Calibrator),

    /// A fixed threshold over adjusted p-values.
    Fixed(fixed::Threshold),
}

impl Calibration {
    /// Gets a short name for the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Calibration::Bayesian(_) => "bayesian",
            Calibration::Fixed(_) => "fixed",
        }
    }

    /// Gets the target false discovery rate, if this is a Bayesian
    /// calibration.
    pub fn target_fdr(&self) -> Option<f64> {
        match self {
            Calibration::Bayesian(calibrator) => Some(calibrator.target_fdr()),
            Calibration::Fixed(_) => None,
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::Bayesian(pep::Calibrator::default())
    }
}

impl From<pep::Calibrator> for Calibration {
    fn from(calibrator: pep::Calibrator) -> Self {
        Self::Bayesian(calibrator)
    }
}

impl From<fixed::Threshold> for Calibration {
    fn from(threshold: fixed::Threshold) -> Self {
        Self::Fixed(threshold)
    }
}

impl Calibrate for Calibration {
    fn calibrate(&self, scores: ScoreSet) -> Cutoff {
        match self {
            Calibration::Bayesian(calibrator) => calibrator.calibrate(scores),
            Calibration::Fixed(threshold) => threshold.calibrate(scores),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_validates_cutoffs() {
        assert_eq!(Cutoff::try_new(-0.1), Err(Error::InvalidCutoff(-0.1)));
        assert!(Cutoff::try_new(f64::NAN).is_err());
        assert_eq!(Cutoff::try_new(MAX_PEP).map(|c| c.get()), Ok(MAX_PEP));

        assert_eq!(Cutoff::clamped(1.0).get(), MAX_PEP);
        assert_eq!(Cutoff::clamped(-1.0).get(), 0.0);
    }

    #[test]
    fn zero_is_always_admitted() {
        assert!(Cutoff::ZERO.admits(0.0));
        assert!(!Cutoff::ZERO.admits(f64::MIN_POSITIVE));
    }

    #[test]
    fn strategies_dispatch() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let scores = ScoreSet::from(vec![0.001, 0.002, 0.01, 0.05, 0.5]);

        let bayesian = Calibration::default();
        assert_eq!(bayesian.name(), "bayesian");
        assert_eq!(bayesian.target_fdr(), Some(0.05));
        assert_eq!(bayesian.calibrate(scores.clone()).get(), 0.05);

        let fixed = Calibration::from(fixed::Threshold::try_new(0.01)?);
        assert_eq!(fixed.name(), "fixed");
        assert_eq!(fixed.target_fdr(), None);
        assert_eq!(fixed.calibrate(scores).get(), 0.01);

        Ok(())
    }
}
