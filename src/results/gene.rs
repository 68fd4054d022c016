//! A gene-level result and its transcripts.

pub mod builder;

pub use builder::Builder;

use crate::calibration::Cutoff;
use crate::core::Accession;
use crate::results::TranscriptResult;

/// The expression result for a gene along with the splicing results for each
/// of its observed transcripts.
///
/// A [`GeneResult`] cannot be instantiated directly. Use a [`Builder`]
/// instead.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneResult {
    /// The gene accession.
    accession: Accession,

    /// The expression fold change.
    fold_change: f64,

    /// The expression error probability.
    p: f64,

    /// The transcript results in the order they were observed.
    transcripts: Vec<TranscriptResult>,
}

impl GeneResult {
    /// Gets the gene accession.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::results::gene::Builder;
    ///
    /// let result = Builder::default()
    ///     .accession(Accession::gene("ENSG00000139618")?)?
    ///     .expression(1.5, 0.01)?
    ///     .try_build()?;
    ///
    /// assert_eq!(result.accession().as_str(), "ENSG00000139618");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn accession(&self) -> &Accession {
        &self.accession
    }

    /// Gets the expression fold change.
    pub fn fold_change(&self) -> f64 {
        self.fold_change
    }

    /// Gets the base-2 logarithm of the expression fold change (zero stays
    /// zero).
    pub fn log2_fold_change(&self) -> f64 {
        if self.fold_change == 0.0 {
            return 0.0;
        }

        self.fold_change.log2()
    }

    /// Gets the expression error probability.
    pub fn expression_p(&self) -> f64 {
        self.p
    }

    /// Gets the transcript results in the order they were observed.
    pub fn transcripts(&self) -> &[TranscriptResult] {
        &self.transcripts
    }

    /// Gets the result for a single transcript, if it was observed.
    pub fn transcript(&self, accession: &Accession) -> Option<&TranscriptResult> {
        self.transcripts.iter().find(|t| t.accession() == accession)
    }

    /// Returns an iterator over the splicing error probabilities of every
    /// transcript.
    pub fn splicing_ps(&self) -> impl Iterator<Item = f64> + '_ {
        self.transcripts.iter().map(|t| t.p())
    }

    /// Gets the number of transcripts observed for this gene.
    pub fn expressed_transcript_count(&self) -> usize {
        self.transcripts.len()
    }

    /// Gets the number of transcripts passing `cutoff`.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::calibration::Cutoff;
    /// use isopret::core::Accession;
    /// use isopret::results::TranscriptResult;
    /// use isopret::results::gene::Builder;
    ///
    /// let result = Builder::default()
    ///     .accession(Accession::gene("ENSG00000139618")?)?
    ///     .expression(1.5, 0.2)?
    ///     .push_transcript(TranscriptResult::try_new(
    ///         Accession::transcript("ENST00000380152")?,
    ///         2.0,
    ///         0.01,
    ///     )?)
    ///     .push_transcript(TranscriptResult::try_new(
    ///         Accession::transcript("ENST00000544455")?,
    ///         1.1,
    ///         0.6,
    ///     )?)
    ///     .try_build()?;
    ///
    /// let cutoff = Cutoff::try_new(0.05)?;
    /// assert_eq!(result.significant_transcript_count(cutoff), 1);
    /// assert!(result.is_differentially_spliced(cutoff));
    /// assert!(!result.is_differentially_expressed(cutoff));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn significant_transcript_count(&self, cutoff: Cutoff) -> usize {
        self.transcripts
            .iter()
            .filter(|t| t.is_significant(cutoff))
            .count()
    }

    /// Whether the gene-level expression result passes `cutoff`.
    pub fn is_differentially_expressed(&self, cutoff: Cutoff) -> bool {
        cutoff.admits(self.p)
    }

    /// Whether any transcript passes `cutoff`.
    pub fn is_differentially_spliced(&self, cutoff: Cutoff) -> bool {
        self.transcripts.iter().any(|t| t.is_significant(cutoff))
    }

    /// Gets the smallest splicing error probability, or `1.0` if the gene has
    /// no transcripts.
    pub fn smallest_splicing_p(&self) -> f64 {
        self.splicing_ps().fold(1.0, f64::min)
    }

    /// Gets the smaller of the expression error probability and the smallest
    /// splicing error probability.
    pub fn smallest_p(&self) -> f64 {
        self.p.min(self.smallest_splicing_p())
    }
}
