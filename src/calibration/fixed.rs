//! A fixed significance threshold.

use tracing::debug;

use crate::calibration::Calibrate;
use crate::calibration::Cutoff;
use crate::calibration::Error;
use crate::calibration::ScoreSet;

/// The default fixed threshold for adjusted p-values.
pub const DEFAULT_THRESHOLD: f64 = 0.05;

/// A calibration strategy that ignores the scores and always returns the same
/// cutoff.
///
/// This is the strategy for classical pipelines (such as edgeR) that already
/// report multiple-testing adjusted p-values.
#[derive(Clone, Debug, PartialEq)]
pub struct Threshold(Cutoff);

impl Threshold {
    /// Attempts to create a new fixed threshold.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::calibration::Calibrate as _;
    /// use isopret::calibration::ScoreSet;
    /// use isopret::calibration::fixed::Threshold;
    ///
    /// let threshold = Threshold::try_new(0.01)?;
    /// let cutoff = threshold.calibrate(ScoreSet::from(vec![0.0, 0.5]));
    /// assert_eq!(cutoff.get(), 0.01);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(value: f64) -> Result<Self, Error> {
        Cutoff::try_new(value).map(Self)
    }

    /// Gets the cutoff.
    pub fn cutoff(&self) -> Cutoff {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(Cutoff(DEFAULT_THRESHOLD))
    }
}

impl Calibrate for Threshold {
    fn calibrate(&self, scores: ScoreSet) -> Cutoff {
        debug!(
            "using a fixed cutoff of {} for {} scores",
            self.0,
            scores.len()
        );
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_default_threshold_is_five_percent() {
        assert_eq!(Threshold::default().cutoff().get(), 0.05);
    }

    #[test]
    fn it_rejects_thresholds_above_the_cap() {
        assert_eq!(Threshold::try_new(0.5), Err(Error::InvalidCutoff(0.5)));
    }
}
