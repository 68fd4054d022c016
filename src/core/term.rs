//! Ontology term identifiers.

use std::str::FromStr;

/// The separator between the prefix and the local part of a [`TermId`].
pub const SEPARATOR: char = ':';

/// An error related to parsing a [`TermId`].
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The separator was missing.
    MissingSeparator(String),

    /// The prefix was empty or not alphanumeric.
    InvalidPrefix(String),

    /// The local part was empty or contained whitespace.
    InvalidLocal(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingSeparator(s) => {
                write!(f, "missing \"{SEPARATOR}\" separator in term id \"{s}\"")
            }
            ParseError::InvalidPrefix(s) => write!(f, "invalid prefix in term id \"{s}\""),
            ParseError::InvalidLocal(s) => write!(f, "invalid local part in term id \"{s}\""),
        }
    }
}

impl std::error::Error for ParseError {}

/// An ontology term identifier such as `GO:0008150`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TermId {
    /// The full identifier.
    value: String,

    /// The byte offset of the separator within `value`.
    separator: usize,
}

impl TermId {
    /// Gets the prefix (the part before the separator).
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::TermId;
    ///
    /// let term = "GO:0008150".parse::<TermId>()?;
    /// assert_eq!(term.prefix(), "GO");
    /// assert_eq!(term.local(), "0008150");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn prefix(&self) -> &str {
        &self.value[..self.separator]
    }

    /// Gets the local part (the part after the separator).
    pub fn local(&self) -> &str {
        &self.value[self.separator + SEPARATOR.len_utf8()..]
    }

    /// Gets the full identifier.
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for TermId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let (prefix, local) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| ParseError::MissingSeparator(s.to_string()))?;

        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ParseError::InvalidPrefix(s.to_string()));
        }

        if local.is_empty() || local.chars().any(char::is_whitespace) {
            return Err(ParseError::InvalidLocal(s.to_string()));
        }

        Ok(Self {
            value: s.to_string(),
            separator: prefix.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_term_ids() -> Result<(), Box<dyn std::error::Error>> {
        let term = " GO:0003674 ".parse::<TermId>()?;
        assert_eq!(term.as_str(), "GO:0003674");
        assert_eq!(term.prefix(), "GO");
        assert_eq!(term.local(), "0003674");
        Ok(())
    }

    #[test]
    fn it_rejects_invalid_term_ids() {
        let err = "GO0003674".parse::<TermId>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing \":\" separator in term id \"GO0003674\""
        );

        assert!(matches!(
            ":0003674".parse::<TermId>(),
            Err(ParseError::InvalidPrefix(_))
        ));
        assert!(matches!(
            "GO:".parse::<TermId>(),
            Err(ParseError::InvalidLocal(_))
        ));
    }
}
