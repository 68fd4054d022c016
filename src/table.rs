//! Tab-delimited reference tables.
//!
//! The reference inputs (catalogs, annotations, ontology edges, and InterPro
//! tables) are all simple tab-delimited files. Empty lines and lines starting
//! with `#` are skipped.

use std::io;
use std::io::BufRead;

use crate::reader::read_line;

/// The delimiter between fields.
pub const DELIMITER: char = '\t';

/// The prefix of a comment line.
pub const COMMENT_PREFIX: char = '#';

/// An error related to reading a reference table.
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// A line had the wrong number of fields.
    IncorrectNumberOfFields {
        /// The one-based line number.
        line: usize,

        /// The number of fields that were expected.
        expected: usize,

        /// The number of fields that were found.
        found: usize,
    },

    /// A record could not be parsed.
    InvalidRecord {
        /// The one-based line number.
        line: usize,

        /// The reason the record was rejected.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::IncorrectNumberOfFields {
                line,
                expected,
                found,
            } => write!(
                f,
                "invalid number of fields at line {line}: expected {expected} fields, found \
                 {found} fields"
            ),
            Error::InvalidRecord { line, source } => {
                write!(f, "invalid record at line {line}: {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// The outcome of handling a single record.
pub(crate) type RecordResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Calls `handle` with the line number and fields of every record in
/// `reader`, requiring exactly `expected` fields per record.
pub(crate) fn for_each_record<T, F>(mut reader: T, expected: usize, mut handle: F) -> Result<(), Error>
where
    T: BufRead,
    F: FnMut(usize, &[&str]) -> RecordResult,
{
    let mut buffer = String::new();
    let mut number = 0;

    while read_line(&mut reader, &mut buffer).map_err(Error::Io)? > 0 {
        number += 1;

        if buffer.trim().is_empty() || buffer.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let fields = buffer.split(DELIMITER).map(str::trim).collect::<Vec<_>>();
        if fields.len() != expected {
            return Err(Error::IncorrectNumberOfFields {
                line: number,
                expected,
                found: fields.len(),
            });
        }

        handle(number, &fields).map_err(|source| Error::InvalidRecord {
            line: number,
            source,
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_skips_comments_and_empty_lines() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"# a comment\n\na\tb\r\nc\td\n";
        let mut seen = Vec::new();

        for_each_record(&data[..], 2, |line, fields| {
            seen.push((line, fields.join(",")));
            Ok(())
        })?;

        assert_eq!(
            seen,
            vec![(3, String::from("a,b")), (4, String::from("c,d"))]
        );

        Ok(())
    }

    #[test]
    fn it_reports_the_offending_line() {
        let data = b"a\tb\nc\n";
        let err = for_each_record(&data[..], 2, |_, _| Ok(())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid number of fields at line 2: expected 2 fields, found 1 fields"
        );

        let err = for_each_record(&data[..1], 1, |_, _| Err("bad".into())).unwrap_err();
        assert_eq!(err.to_string(), "invalid record at line 1: bad");
    }
}
