//! Namespaced gene and transcript accessions.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// The pattern for an Ensembl gene or transcript accession.
///
/// The first group is the (optional) species code, the second group is the
/// feature letter (`G` or `T`), and the third group is the numeric part. Any
/// version suffix is matched but not captured.
static ENSEMBL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ENS([A-Z]*?)([GT])(\d+)(?:\.\d+)?$").unwrap());

/// An error related to parsing an [`Accession`].
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The accession was empty.
    Empty,

    /// The accession contained whitespace.
    Whitespace(String),

    /// An Ensembl accession was used in the wrong namespace.
    NamespaceMismatch {
        /// The namespace that was requested.
        expected: Namespace,

        /// The offending value.
        value: String,
    },

    /// The namespace could not be inferred from the value.
    UnknownNamespace(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty accession"),
            ParseError::Whitespace(value) => {
                write!(f, "accession contains whitespace: \"{value}\"")
            }
            ParseError::NamespaceMismatch { expected, value } => {
                write!(f, "\"{value}\" is not a {expected} accession")
            }
            ParseError::UnknownNamespace(value) => {
                write!(f, "cannot infer the namespace of \"{value}\"")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A [`Result`](std::result::Result) with a [`ParseError`].
type Result<T> = std::result::Result<T, ParseError>;

/// The namespace an [`Accession`] lives in.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Namespace {
    /// Gene-level identifiers.
    Gene,

    /// Transcript-level identifiers.
    Transcript,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Namespace::Gene => write!(f, "gene"),
            Namespace::Transcript => write!(f, "transcript"),
        }
    }
}

/// A gene or transcript accession.
///
/// Equality, ordering, and hashing all take the namespace into account, so a
/// gene accession never compares equal to a transcript accession with the same
/// text.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Accession {
    /// The namespace.
    namespace: Namespace,

    /// The normalized value.
    value: String,
}

impl Accession {
    /// Attempts to create a new accession within `namespace`.
    ///
    /// Ensembl accessions have their version suffix removed, and their feature
    /// letter must agree with `namespace`. Other identifiers are kept as-is
    /// (after trimming surrounding whitespace).
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::core::Namespace;
    ///
    /// let accession = Accession::try_new(Namespace::Gene, "ENSG00000139618.15")?;
    /// assert_eq!(accession.as_str(), "ENSG00000139618");
    /// assert_eq!(accession.namespace(), Namespace::Gene);
    ///
    /// assert!(Accession::try_new(Namespace::Transcript, "ENSG00000139618").is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(namespace: Namespace, value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref().trim();

        if value.is_empty() {
            return Err(ParseError::Empty);
        }

        if value.chars().any(char::is_whitespace) {
            return Err(ParseError::Whitespace(value.to_string()));
        }

        match ensembl(value) {
            Some((found, normalized)) if found == namespace => Ok(Self {
                namespace,
                value: normalized,
            }),
            Some(_) => Err(ParseError::NamespaceMismatch {
                expected: namespace,
                value: value.to_string(),
            }),
            None => Ok(Self {
                namespace,
                value: value.to_string(),
            }),
        }
    }

    /// Attempts to create a new gene accession.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    ///
    /// let accession = Accession::gene("ENSG00000139618")?;
    /// assert_eq!(accession.to_string(), "ENSG00000139618");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn gene(value: impl AsRef<str>) -> Result<Self> {
        Self::try_new(Namespace::Gene, value)
    }

    /// Attempts to create a new transcript accession.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    ///
    /// let accession = Accession::transcript("ENST00000380152.8")?;
    /// assert_eq!(accession.to_string(), "ENST00000380152");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn transcript(value: impl AsRef<str>) -> Result<Self> {
        Self::try_new(Namespace::Transcript, value)
    }

    /// Gets the namespace of the accession.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Gets the normalized value of the accession.
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Accession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Accession {
    type Err = ParseError;

    /// Parses an Ensembl accession, inferring its namespace.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        match ensembl(s) {
            Some((namespace, value)) => Ok(Self { namespace, value }),
            None => Err(ParseError::UnknownNamespace(s.to_string())),
        }
    }
}

/// Matches an Ensembl accession, returning its namespace and its unversioned
/// form.
fn ensembl(value: &str) -> Option<(Namespace, String)> {
    let groups = ENSEMBL.captures(value)?;

    let species = groups.get(1)?.as_str();
    let letter = groups.get(2)?.as_str();
    let number = groups.get(3)?.as_str();

    let namespace = match letter {
        "G" => Namespace::Gene,
        "T" => Namespace::Transcript,
        _ => return None,
    };

    Some((namespace, format!("ENS{species}{letter}{number}")))
}
