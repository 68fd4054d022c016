//! A builder for a [`GeneResult`].

use crate::core::Accession;
use crate::core::Namespace;
use crate::results;
use crate::results::GeneResult;
use crate::results::TranscriptResult;

/// An error that occurs when a required field was never provided to the
/// [`Builder`].
#[derive(Debug, PartialEq)]
pub enum MissingError {
    /// No accession was provided to the [`Builder`].
    Accession,

    /// No expression result was provided to the [`Builder`].
    Expression,
}

impl std::fmt::Display for MissingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingError::Accession => write!(f, "accession"),
            MissingError::Expression => write!(f, "expression"),
        }
    }
}

impl std::error::Error for MissingError {}

/// An error that occurs when a singular field was provided multiple times to
/// the [`Builder`].
#[derive(Debug, PartialEq)]
pub enum MultipleError {
    /// The accession was provided multiple times to the [`Builder`].
    Accession,

    /// The expression result was provided multiple times to the [`Builder`].
    Expression,
}

impl std::fmt::Display for MultipleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultipleError::Accession => write!(f, "accession"),
            MultipleError::Expression => write!(f, "expression"),
        }
    }
}

impl std::error::Error for MultipleError {}

/// An error related to a [`Builder`].
#[derive(Debug, PartialEq)]
pub enum Error {
    /// An error where a required field was never provided to the [`Builder`].
    Missing(MissingError),

    /// An error where a singular field was provided to the [`Builder`] more
    /// than once.
    Multiple(MultipleError),

    /// An invalid value was provided to the [`Builder`].
    Invalid(results::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Missing(err) => write!(f, "missing required field: {err}"),
            Error::Multiple(err) => write!(f, "singular field set multiple times: {err}"),
            Error::Invalid(err) => write!(f, "invalid value: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for a [`GeneResult`].
#[derive(Debug, Default)]
pub struct Builder {
    /// The gene accession.
    accession: Option<Accession>,

    /// The expression fold change and error probability.
    expression: Option<(f64, f64)>,

    /// The transcript results.
    transcripts: Vec<TranscriptResult>,
}

impl Builder {
    /// Sets the gene accession for the [`Builder`].
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::results::gene::Builder;
    ///
    /// let builder = Builder::default().accession(Accession::gene("ENSG00000139618")?)?;
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn accession(mut self, accession: Accession) -> Result<Self> {
        if self.accession.is_some() {
            return Err(Error::Multiple(MultipleError::Accession));
        }

        results::check_namespace(&accession, Namespace::Gene).map_err(Error::Invalid)?;

        self.accession = Some(accession);
        Ok(self)
    }

    /// Sets the expression fold change and error probability for the
    /// [`Builder`].
    pub fn expression(mut self, fold_change: f64, p: f64) -> Result<Self> {
        if self.expression.is_some() {
            return Err(Error::Multiple(MultipleError::Expression));
        }

        results::check_fold_change(fold_change).map_err(Error::Invalid)?;
        results::check_probability(p).map_err(Error::Invalid)?;

        self.expression = Some((fold_change, p));
        Ok(self)
    }

    /// Pushes a [`TranscriptResult`] into the [`Builder`].
    ///
    /// If a result for the same transcript was already pushed, the first one
    /// is kept.
    pub fn push_transcript(mut self, result: TranscriptResult) -> Self {
        if !self
            .transcripts
            .iter()
            .any(|t| t.accession() == result.accession())
        {
            self.transcripts.push(result);
        }

        self
    }

    /// Whether the expression result has been set.
    pub fn has_expression(&self) -> bool {
        self.expression.is_some()
    }

    /// Consumes `self` to attempt to build a [`GeneResult`].
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::results::TranscriptResult;
    /// use isopret::results::gene::Builder;
    ///
    /// let result = Builder::default()
    ///     .accession(Accession::gene("ENSG00000139618")?)?
    ///     .expression(1.5, 0.01)?
    ///     .push_transcript(TranscriptResult::try_new(
    ///         Accession::transcript("ENST00000380152")?,
    ///         2.0,
    ///         0.2,
    ///     )?)
    ///     .try_build()?;
    ///
    /// assert_eq!(result.expression_p(), 0.01);
    /// assert_eq!(result.expressed_transcript_count(), 1);
    /// assert_eq!(result.smallest_splicing_p(), 0.2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build(self) -> Result<GeneResult> {
        let accession = self
            .accession
            .ok_or(Error::Missing(MissingError::Accession))?;

        let (fold_change, p) = self
            .expression
            .ok_or(Error::Missing(MissingError::Expression))?;

        Ok(GeneResult {
            accession,
            fold_change,
            p,
            transcripts: self.transcripts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(
        accession: &str,
        p: f64,
    ) -> std::result::Result<TranscriptResult, Box<dyn std::error::Error>> {
        Ok(TranscriptResult::try_new(
            Accession::transcript(accession)?,
            1.0,
            p,
        )?)
    }

    #[test]
    fn it_fails_to_produce_a_result_when_no_accession_is_provided()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let err = Builder::default()
            .expression(1.0, 0.5)?
            .try_build()
            .unwrap_err();

        assert_eq!(err.to_string(), "missing required field: accession");

        Ok(())
    }

    #[test]
    fn it_fails_to_produce_a_result_when_no_expression_is_provided()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let err = Builder::default()
            .accession(Accession::gene("ENSG00000139618")?)?
            .push_transcript(transcript("ENST00000380152", 0.1)?)
            .try_build()
            .unwrap_err();

        assert_eq!(err.to_string(), "missing required field: expression");

        Ok(())
    }

    #[test]
    fn it_fails_when_the_expression_is_provided_more_than_once()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let err = Builder::default()
            .expression(1.0, 0.5)?
            .expression(1.0, 0.5)
            .unwrap_err();

        assert_eq!(err.to_string(), "singular field set multiple times: expression");

        Ok(())
    }

    #[test]
    fn it_rejects_transcript_accessions_for_the_gene()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let err = Builder::default()
            .accession(Accession::transcript("ENST00000380152")?)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Invalid(results::Error::Namespace { .. })
        ));

        Ok(())
    }

    #[test]
    fn it_keeps_the_first_duplicate_transcript()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let result = Builder::default()
            .accession(Accession::gene("ENSG00000139618")?)?
            .expression(1.0, 0.5)?
            .push_transcript(transcript("ENST00000380152", 0.1)?)
            .push_transcript(transcript("ENST00000380152.2", 0.9)?)
            .push_transcript(transcript("ENST00000544455", 0.3)?)
            .try_build()?;

        assert_eq!(result.expressed_transcript_count(), 2);
        assert_eq!(
            result
                .transcript(&Accession::transcript("ENST00000380152")?)
                .map(|t| t.p()),
            Some(0.1)
        );
        assert_eq!(result.splicing_ps().collect::<Vec<_>>(), vec![0.1, 0.3]);
        assert_eq!(result.smallest_p(), 0.1);

        Ok(())
    }

    #[test]
    fn a_gene_without_transcripts_has_a_smallest_splicing_p_of_one()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let result = Builder::default()
            .accession(Accession::gene("ENSG00000139618")?)?
            .expression(0.0, 0.5)?
            .try_build()?;

        assert_eq!(result.smallest_splicing_p(), 1.0);
        assert_eq!(result.log2_fold_change(), 0.0);

        Ok(())
    }
}
