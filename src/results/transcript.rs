//! A transcript-level (splicing) result.

use crate::calibration::Cutoff;
use crate::core::Accession;
use crate::core::Namespace;
use crate::results;

/// A [`Result`](std::result::Result) with a [`results::Error`].
type Result<T> = std::result::Result<T, results::Error>;

/// A splicing result for a single transcript.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptResult {
    /// The transcript accession.
    accession: Accession,

    /// The fold change.
    fold_change: f64,

    /// The error probability (a PEP or an adjusted p-value).
    p: f64,
}

impl TranscriptResult {
    /// Attempts to create a new transcript result.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::results::TranscriptResult;
    ///
    /// let result = TranscriptResult::try_new(Accession::transcript("ENST00000380152")?, 2.0, 0.01)?;
    /// assert_eq!(result.log2_fold_change(), 1.0);
    ///
    /// let err = TranscriptResult::try_new(Accession::gene("ENSG00000139618")?, 2.0, 0.01)
    ///     .unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "expected a transcript accession, found gene accession \"ENSG00000139618\""
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(accession: Accession, fold_change: f64, p: f64) -> Result<Self> {
        results::check_namespace(&accession, Namespace::Transcript)?;
        results::check_fold_change(fold_change)?;
        results::check_probability(p)?;

        Ok(Self {
            accession,
            fold_change,
            p,
        })
    }

    /// Gets the transcript accession.
    pub fn accession(&self) -> &Accession {
        &self.accession
    }

    /// Gets the fold change.
    pub fn fold_change(&self) -> f64 {
        self.fold_change
    }

    /// Gets the base-2 logarithm of the fold change.
    ///
    /// A fold change of exactly zero is reported as zero.
    pub fn log2_fold_change(&self) -> f64 {
        if self.fold_change == 0.0 {
            return 0.0;
        }

        self.fold_change.log2()
    }

    /// Gets the error probability.
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Whether the result passes `cutoff`.
    pub fn is_significant(&self, cutoff: Cutoff) -> bool {
        cutoff.admits(self.p)
    }
}
