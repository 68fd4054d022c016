//! A line within a differential results table.
//!
//! HBA-DEALS and edgeR both write a four-column, tab-delimited table. The
//! header names the method through its fourth column (`P` for HBA-DEALS
//! posterior error probabilities, `BH` for edgeR Benjamini-Hochberg adjusted
//! p-values). Every other line is either the gene-level expression result
//! (second column `Expression`) or the splicing result for one transcript.

use std::num::ParseFloatError;
use std::str::FromStr;

use crate::core::accession;
use crate::core::Accession;

/// The delimiter between fields.
pub const DELIMITER: char = '\t';

/// The number of fields on every line.
pub const NUM_FIELDS: usize = 4;

/// The leading header fields shared by every method.
pub const HEADER_PREFIX: [&str; 3] = ["Gene", "Isoform", "ExplogFC/FC"];

/// The value of the second column on an expression line.
pub const EXPRESSION: &str = "Expression";

/// An error associated with parsing a single record.
#[derive(Debug, PartialEq)]
pub enum RecordError {
    /// An invalid gene accession.
    InvalidGene(accession::ParseError),
    /// An invalid transcript accession.
    InvalidTranscript(accession::ParseError),
    /// An unparseable fold change.
    InvalidFoldChange(ParseFloatError),
    /// A fold change that is not a number.
    NanFoldChange,
    /// An unparseable probability.
    InvalidProbability(ParseFloatError),
    /// A probability outside of `[0, 1]`.
    ProbabilityOutOfRange(f64),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::InvalidGene(err) => write!(f, "invalid gene: {err}"),
            RecordError::InvalidTranscript(err) => write!(f, "invalid transcript: {err}"),
            RecordError::InvalidFoldChange(err) => write!(f, "invalid fold change: {err}"),
            RecordError::NanFoldChange => write!(f, "fold change is not a number"),
            RecordError::InvalidProbability(err) => write!(f, "invalid probability: {err}"),
            RecordError::ProbabilityOutOfRange(p) => {
                write!(f, "probability must be within [0, 1], found {p}")
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// An error associated with parsing a line.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// An incorrect number of fields.
    IncorrectNumberOfFields(usize, String),
    /// A header line that names no known method.
    InvalidHeader(String),
    /// An invalid record.
    InvalidRecord(RecordError, String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(n, line) => write!(
                f,
                "invalid number of fields: expected {NUM_FIELDS} fields, found {n} \
                 fields\n\nline: {line}"
            ),
            ParseError::InvalidHeader(line) => write!(
                f,
                "invalid header: expected \"{}\" followed by \"{}\" or \"{}\"\n\nline: {line}",
                HEADER_PREFIX.join("\\t"),
                Method::HbaDeals.column(),
                Method::EdgeR.column()
            ),
            ParseError::InvalidRecord(err, line) => {
                write!(f, "invalid record: {err}\n\nline: {line}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// The method that produced a results table.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    /// HBA-DEALS (posterior error probabilities).
    HbaDeals,
    /// edgeR (Benjamini-Hochberg adjusted p-values).
    EdgeR,
}

impl Method {
    /// Gets the name of the fourth header column for this method.
    pub fn column(&self) -> &'static str {
        match self {
            Method::HbaDeals => "P",
            Method::EdgeR => "BH",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::HbaDeals => write!(f, "HBA-DEALS"),
            Method::EdgeR => write!(f, "edgeR"),
        }
    }
}

/// A line within a differential results table.
#[derive(Clone, Debug, PartialEq)]
pub enum Line {
    /// An empty line.
    Empty,
    /// A header line.
    Header(Method),
    /// A gene-level expression result.
    Expression {
        /// The gene.
        gene: Accession,
        /// The fold change.
        fold_change: f64,
        /// The error probability.
        p: f64,
    },
    /// A transcript-level splicing result.
    Isoform {
        /// The gene.
        gene: Accession,
        /// The transcript.
        transcript: Accession,
        /// The fold change.
        fold_change: f64,
        /// The error probability.
        p: f64,
    },
}

impl Line {
    /// Gets the gene accession of a result line.
    pub fn gene(&self) -> Option<&Accession> {
        match self {
            Line::Expression { gene, .. } | Line::Isoform { gene, .. } => Some(gene),
            Line::Empty | Line::Header(_) => None,
        }
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Line::Empty => write!(f, ""),
            Line::Header(method) => {
                write!(f, "{}\t{}", HEADER_PREFIX.join("\t"), method.column())
            }
            Line::Expression {
                gene,
                fold_change,
                p,
            } => write!(f, "{gene}\t{EXPRESSION}\t{fold_change}\t{p}"),
            Line::Isoform {
                gene,
                transcript,
                fold_change,
                p,
            } => write!(f, "{gene}\t{transcript}\t{fold_change}\t{p}"),
        }
    }
}

impl FromStr for Line {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::Empty);
        }

        let parts = s.split(DELIMITER).map(str::trim).collect::<Vec<_>>();
        if parts.len() != NUM_FIELDS {
            return Err(ParseError::IncorrectNumberOfFields(parts.len(), s.into()));
        }

        if parts[0] == HEADER_PREFIX[0] {
            if parts[..3] != HEADER_PREFIX {
                return Err(ParseError::InvalidHeader(s.into()));
            }

            return match parts[3] {
                "P" => Ok(Self::Header(Method::HbaDeals)),
                "BH" => Ok(Self::Header(Method::EdgeR)),
                _ => Err(ParseError::InvalidHeader(s.into())),
            };
        }

        parse_record(&parts).map_err(|e| ParseError::InvalidRecord(e, s.into()))
    }
}

/// Parses the fields of a result line.
fn parse_record(parts: &[&str]) -> Result<Line, RecordError> {
    let gene = Accession::gene(parts[0]).map_err(RecordError::InvalidGene)?;

    let fold_change = parts[2]
        .parse::<f64>()
        .map_err(RecordError::InvalidFoldChange)?;
    if fold_change.is_nan() {
        return Err(RecordError::NanFoldChange);
    }

    let p = parts[3]
        .parse::<f64>()
        .map_err(RecordError::InvalidProbability)?;
    if !(0.0..=1.0).contains(&p) {
        return Err(RecordError::ProbabilityOutOfRange(p));
    }

    if parts[1].eq_ignore_ascii_case(EXPRESSION) {
        return Ok(Line::Expression {
            gene,
            fold_change,
            p,
        });
    }

    let transcript = Accession::transcript(parts[1]).map_err(RecordError::InvalidTranscript)?;

    Ok(Line::Isoform {
        gene,
        transcript,
        fold_change,
        p,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_header_lines() -> Result<(), Box<dyn std::error::Error>> {
        let line = "Gene\tIsoform\tExplogFC/FC\tP".parse::<Line>()?;
        assert_eq!(line, Line::Header(Method::HbaDeals));

        let line = "Gene\tIsoform\tExplogFC/FC\tBH\r".parse::<Line>()?;
        assert_eq!(line, Line::Header(Method::EdgeR));

        Ok(())
    }

    #[test]
    fn test_valid_expression_line() -> Result<(), Box<dyn std::error::Error>> {
        let line = "ENSG00000160710\tExpression\t1.54770825394965\t0".parse::<Line>()?;
        assert_eq!(
            line,
            Line::Expression {
                gene: Accession::gene("ENSG00000160710")?,
                fold_change: 1.54770825394965,
                p: 0.0,
            }
        );
        Ok(())
    }

    #[test]
    fn test_valid_isoform_line() -> Result<(), Box<dyn std::error::Error>> {
        let line = "ENSG00000160710.3\tENST00000368471.7\t0.563281823470453\t1e-05"
            .parse::<Line>()?;

        match line {
            Line::Isoform {
                gene,
                transcript,
                fold_change,
                p,
            } => {
                assert_eq!(gene.as_str(), "ENSG00000160710");
                assert_eq!(transcript.as_str(), "ENST00000368471");
                assert_eq!(fold_change, 0.563281823470453);
                assert_eq!(p, 1e-05);
            }
            _ => panic!("expected an isoform line"),
        }

        Ok(())
    }

    #[test]
    fn test_invalid_header_line() {
        let err = "Gene\tIsoform\tExplogFC/FC\tFDR"
            .parse::<Line>()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid header: expected \"Gene\\tIsoform\\tExplogFC/FC\" followed by \"P\" or \
             \"BH\"\n\nline: Gene\tIsoform\tExplogFC/FC\tFDR"
        );
    }

    #[test]
    fn test_invalid_number_of_fields() {
        let err = "ENSG00000160710\tExpression\t1.5".parse::<Line>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid number of fields: expected 4 fields, found 3 fields\n\n\
             line: ENSG00000160710\tExpression\t1.5"
        );
    }

    #[test]
    fn test_invalid_records() {
        assert!(matches!(
            "ENSG00000160710\tExpression\t1.5\t1.2".parse::<Line>(),
            Err(ParseError::InvalidRecord(
                RecordError::ProbabilityOutOfRange(_),
                _
            ))
        ));
        assert!(matches!(
            "ENSG00000160710\tExpression\tNaN\t0.2".parse::<Line>(),
            Err(ParseError::InvalidRecord(RecordError::NanFoldChange, _))
        ));
        assert!(matches!(
            "ENSG00000160710\tExpression\t1.5\tNA".parse::<Line>(),
            Err(ParseError::InvalidRecord(
                RecordError::InvalidProbability(_),
                _
            ))
        ));
        assert!(matches!(
            "ENSG00000160710\tENSG00000160711\t1.5\t0.1".parse::<Line>(),
            Err(ParseError::InvalidRecord(
                RecordError::InvalidTranscript(_),
                _
            ))
        ));
    }
}
