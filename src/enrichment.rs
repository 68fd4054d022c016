//! The contract for external term enrichment calculators.
//!
//! This crate assembles the study and population sets that a term enrichment
//! test consumes (see [`Associations`](crate::differential::Associations)),
//! but it does not implement the test itself. Any calculator (for example, a
//! term-for-term or parent-child hypergeometric test) can be plugged in by
//! implementing [`TermEnrichment`].

use std::str::FromStr;

use crate::core::TermId;
use crate::ontology::Ontology;
use crate::ontology::StudySet;

/// An error related to parsing a [`Correction`].
#[derive(Debug, Eq, PartialEq)]
pub struct ParseCorrectionError(String);

impl std::fmt::Display for ParseCorrectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown multiple testing correction: \"{}\"", self.0)
    }
}

impl std::error::Error for ParseCorrectionError {}

/// A multiple testing correction strategy.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Correction {
    /// Benjamini-Hochberg.
    BenjaminiHochberg,
    /// Benjamini-Yekutieli.
    BenjaminiYekutieli,
    /// Bonferroni.
    #[default]
    Bonferroni,
    /// Bonferroni-Holm.
    BonferroniHolm,
    /// Šidák.
    Sidak,
    /// No correction.
    None,
}

impl std::fmt::Display for Correction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Correction::BenjaminiHochberg => write!(f, "Benjamini-Hochberg"),
            Correction::BenjaminiYekutieli => write!(f, "Benjamini-Yekutieli"),
            Correction::Bonferroni => write!(f, "Bonferroni"),
            Correction::BonferroniHolm => write!(f, "Bonferroni-Holm"),
            Correction::Sidak => write!(f, "Sidak"),
            Correction::None => write!(f, "None"),
        }
    }
}

impl FromStr for Correction {
    type Err = ParseCorrectionError;

    /// Parses a correction by name (case-insensitive), also accepting the
    /// short forms `bh`, `by`, and `holm`.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::enrichment::Correction;
    ///
    /// assert_eq!("BH".parse::<Correction>()?, Correction::BenjaminiHochberg);
    /// assert_eq!("bonferroni-holm".parse::<Correction>()?, Correction::BonferroniHolm);
    /// assert!("fisher".parse::<Correction>().is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "benjamini-hochberg" | "bh" => Ok(Self::BenjaminiHochberg),
            "benjamini-yekutieli" | "by" => Ok(Self::BenjaminiYekutieli),
            "bonferroni" => Ok(Self::Bonferroni),
            "bonferroni-holm" | "holm" => Ok(Self::BonferroniHolm),
            "sidak" => Ok(Self::Sidak),
            "none" => Ok(Self::None),
            _ => Err(ParseCorrectionError(s.to_string())),
        }
    }
}

/// The enrichment of a single term in a study set relative to its population.
#[derive(Clone, Debug, PartialEq)]
pub struct TermEnrichmentResult {
    /// The term.
    term: TermId,

    /// The number of study items annotated to the term.
    study_count: usize,

    /// The number of study items.
    study_total: usize,

    /// The number of population items annotated to the term.
    population_count: usize,

    /// The number of population items.
    population_total: usize,

    /// The raw p-value.
    raw_p: f64,

    /// The p-value after multiple testing correction.
    adjusted_p: f64,
}

impl TermEnrichmentResult {
    /// Creates a new result.
    pub fn new(
        term: TermId,
        (study_count, study_total): (usize, usize),
        (population_count, population_total): (usize, usize),
        raw_p: f64,
        adjusted_p: f64,
    ) -> Self {
        Self {
            term,
            study_count,
            study_total,
            population_count,
            population_total,
            raw_p,
            adjusted_p,
        }
    }

    /// Gets the term.
    pub fn term(&self) -> &TermId {
        &self.term
    }

    /// Gets the number of study items annotated to the term.
    pub fn study_count(&self) -> usize {
        self.study_count
    }

    /// Gets the number of study items.
    pub fn study_total(&self) -> usize {
        self.study_total
    }

    /// Gets the number of population items annotated to the term.
    pub fn population_count(&self) -> usize {
        self.population_count
    }

    /// Gets the number of population items.
    pub fn population_total(&self) -> usize {
        self.population_total
    }

    /// Gets the raw p-value.
    pub fn raw_p(&self) -> f64 {
        self.raw_p
    }

    /// Gets the p-value after multiple testing correction.
    pub fn adjusted_p(&self) -> f64 {
        self.adjusted_p
    }
}

/// A term enrichment calculator.
pub trait TermEnrichment {
    /// The error returned when a calculation fails.
    type Error: std::error::Error;

    /// Tests every term annotated in `study` for enrichment relative to
    /// `population`, correcting the p-values with `correction`.
    fn calculate<O>(
        &self,
        ontology: &O,
        population: &StudySet,
        study: &StudySet,
        correction: Correction,
    ) -> Result<Vec<TermEnrichmentResult>, Self::Error>
    where
        O: Ontology;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        for correction in [
            Correction::BenjaminiHochberg,
            Correction::BenjaminiYekutieli,
            Correction::Bonferroni,
            Correction::BonferroniHolm,
            Correction::Sidak,
            Correction::None,
        ] {
            assert_eq!(correction.to_string().parse::<Correction>()?, correction);
        }

        Ok(())
    }

    #[test]
    fn bonferroni_is_the_default() {
        assert_eq!(Correction::default(), Correction::Bonferroni);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            "fdr".parse::<Correction>().unwrap_err().to_string(),
            "unknown multiple testing correction: \"fdr\""
        );
    }
}
