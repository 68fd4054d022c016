//! InterPro reference data and domain overrepresentation.
//!
//! InterPro entries are loaded from a description table ([`Descriptions`]),
//! per-transcript domain hits are loaded from a hit table ([`Hits`]), and
//! [`Overrepresentation`] tests each entry for enrichment among the
//! transcripts that are significant for splicing.

pub mod entry;
pub mod hit;
pub mod overrep;

use std::num::ParseIntError;
use std::str::FromStr;

pub use entry::Descriptions;
pub use entry::Entry;
pub use entry::EntryType;
pub use hit::Hit;
pub use hit::Hits;
pub use overrep::AnnotatedGene;
pub use overrep::DomainOverrepResult;
pub use overrep::Overrepresentation;

/// The prefix of an InterPro accession.
pub const PREFIX: &str = "IPR";

/// The number of digits in an InterPro accession.
const DIGITS: usize = 6;

/// An error related to parsing an [`InterproId`].
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The accession did not start with [`PREFIX`].
    MissingPrefix(String),

    /// The accession did not have exactly six digits.
    InvalidLength(String),

    /// The digits could not be parsed.
    InvalidNumber(ParseIntError, String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingPrefix(value) => {
                write!(f, "missing \"{PREFIX}\" prefix in InterPro accession \"{value}\"")
            }
            ParseError::InvalidLength(value) => write!(
                f,
                "InterPro accession \"{value}\" must have exactly {DIGITS} digits"
            ),
            ParseError::InvalidNumber(err, value) => {
                write!(f, "invalid InterPro accession \"{value}\": {err}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// An InterPro accession such as `IPR000001`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct InterproId(u32);

impl InterproId {
    /// Creates a new InterPro accession from its numeric part.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::interpro::InterproId;
    ///
    /// assert_eq!(InterproId::new(1).to_string(), "IPR000001");
    /// ```
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Gets the numeric part of the accession.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for InterproId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{PREFIX}{:0width$}", self.0, width = DIGITS)
    }
}

impl FromStr for InterproId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let digits = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| ParseError::MissingPrefix(s.to_string()))?;

        if digits.len() != DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidLength(s.to_string()));
        }

        digits
            .parse::<u32>()
            .map(Self)
            .map_err(|err| ParseError::InvalidNumber(err, s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_and_displays_accessions() -> Result<(), Box<dyn std::error::Error>> {
        let id = "IPR002117".parse::<InterproId>()?;
        assert_eq!(id.get(), 2117);
        assert_eq!(id.to_string(), "IPR002117");

        let id = " IPR000000 ".parse::<InterproId>()?;
        assert_eq!(id.get(), 0);

        Ok(())
    }

    #[test]
    fn it_rejects_malformed_accessions() {
        assert_eq!(
            "PF00001".parse::<InterproId>().unwrap_err(),
            ParseError::MissingPrefix(String::from("PF00001"))
        );

        assert_eq!(
            "IPR12".parse::<InterproId>().unwrap_err(),
            ParseError::InvalidLength(String::from("IPR12"))
        );

        assert_eq!(
            "IPR00000a".parse::<InterproId>().unwrap_err(),
            ParseError::InvalidLength(String::from("IPR00000a"))
        );
    }
}
