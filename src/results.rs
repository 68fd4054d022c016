//! Per-gene and per-transcript differential results.
//!
//! A [`GeneResult`] owns the gene-level expression result and every
//! [`TranscriptResult`] observed for that gene. Results are constructed once
//! (usually by the [`Reader`](crate::Reader)) and are read-only thereafter.

pub mod gene;
pub mod transcript;

pub use gene::GeneResult;
pub use transcript::TranscriptResult;

use crate::core::Accession;
use crate::core::Namespace;

/// An error related to a single result value.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// An accession from the wrong namespace was supplied.
    Namespace {
        /// The namespace that was expected.
        expected: Namespace,

        /// The offending accession.
        found: Accession,
    },

    /// A probability was outside of `[0, 1]`.
    Probability(f64),

    /// A fold change was not a number.
    FoldChange(f64),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Namespace { expected, found } => write!(
                f,
                "expected a {expected} accession, found {} accession \"{found}\"",
                found.namespace()
            ),
            Error::Probability(p) => write!(f, "probability must be within [0, 1], found {p}"),
            Error::FoldChange(fc) => write!(f, "fold change must be a number, found {fc}"),
        }
    }
}

impl std::error::Error for Error {}

/// Ensures that `accession` belongs to `expected`.
pub(crate) fn check_namespace(accession: &Accession, expected: Namespace) -> Result<(), Error> {
    if accession.namespace() != expected {
        return Err(Error::Namespace {
            expected,
            found: accession.clone(),
        });
    }

    Ok(())
}

/// Ensures that `p` is a probability.
pub(crate) fn check_probability(p: f64) -> Result<(), Error> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::Probability(p));
    }

    Ok(())
}

/// Ensures that `fold_change` is a number.
pub(crate) fn check_fold_change(fold_change: f64) -> Result<(), Error> {
    if fold_change.is_nan() {
        return Err(Error::FoldChange(fold_change));
    }

    Ok(())
}
