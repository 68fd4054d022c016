//! A differential results table reader.

use std::collections::HashMap;
use std::io::BufRead;
use std::io::{self};
use std::iter;

use tracing::debug;

use crate::core::Accession;
use crate::line;
use crate::line::Method;
use crate::results::gene;
use crate::results::GeneResult;
use crate::results::TranscriptResult;
use crate::Line;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// An error related to a [`Reader`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// A line error (with the one-based line number).
    Line(usize, line::ParseError),

    /// The table did not start with a header.
    MissingHeader,

    /// A header was found after the first line (with the one-based line
    /// number).
    UnexpectedHeader(usize),

    /// A gene result could not be assembled.
    Gene(Accession, gene::builder::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Line(number, err) => write!(f, "line error at line {number}: {err}"),
            Error::MissingHeader => write!(f, "missing header"),
            Error::UnexpectedHeader(number) => write!(f, "unexpected header at line {number}"),
            Error::Gene(accession, err) => write!(f, "invalid gene \"{accession}\": {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// The parsed contents of a differential results table.
#[derive(Clone, Debug)]
pub struct ResultTable {
    /// The method that produced the table.
    method: Method,

    /// The results keyed by gene accession.
    genes: HashMap<Accession, GeneResult>,
}

impl ResultTable {
    /// Gets the method that produced the table.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Gets the results keyed by gene accession.
    pub fn genes(&self) -> &HashMap<Accession, GeneResult> {
        &self.genes
    }

    /// Consumes `self` and returns the results keyed by gene accession.
    pub fn into_genes(self) -> HashMap<Accession, GeneResult> {
        self.genes
    }
}

/// A differential results table reader.
#[derive(Clone, Debug)]
pub struct Reader<T>(T)
where
    T: BufRead;

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a results table reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"Gene\tIsoform\tExplogFC/FC\tP\nENSG00000160710\tExpression\t1.5\t0";
    /// let reader = isopret::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self::from(inner)
    }

    /// Gets a reference to the inner reader.
    pub fn inner(&self) -> &T {
        &self.0
    }

    /// Gets a mutable reference to the inner reader.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.0
    }

    /// Consumes self and returns the inner reader.
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Reads a raw, textual line from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b"Gene\tIsoform\tExplogFC/FC\tP\r\nENSG00000160710\tExpression\t1.5\t0";
    /// let mut reader = isopret::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 28);
    /// assert_eq!(buffer, "Gene\tIsoform\tExplogFC/FC\tP");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 32);
    /// assert_eq!(buffer, "ENSG00000160710\tExpression\t1.5\t0");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 0);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        read_line(self.inner_mut(), buffer)
    }

    /// Attempts to read a [`Line`] from the underlying reader.
    ///
    /// The line number reported in errors is always `0`; use
    /// [`Reader::results()`] to get line-numbered errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::Line;
    /// use isopret::line::Method;
    ///
    /// let data = b"Gene\tIsoform\tExplogFC/FC\tBH\nENSG00000160710\tExpression\t1.5\t0";
    /// let mut reader = isopret::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    /// assert_eq!(
    ///     reader.read_line(&mut buffer)?,
    ///     Some(Line::Header(Method::EdgeR))
    /// );
    /// assert!(matches!(
    ///     reader.read_line(&mut buffer)?,
    ///     Some(Line::Expression { .. })
    /// ));
    /// assert_eq!(reader.read_line(&mut buffer)?, None);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read_line(&mut self, buffer: &mut String) -> Result<Option<Line>> {
        let read = self.read_line_raw(buffer).map_err(Error::Io)?;

        match read {
            0 => Ok(None),
            _ => {
                let line = buffer.parse::<Line>().map_err(|e| Error::Line(0, e))?;
                Ok(Some(line))
            }
        }
    }

    /// Returns an iterator over the [`Line`]s in the underlying reader.
    pub fn lines(&mut self) -> impl Iterator<Item = io::Result<Line>> + '_ {
        let mut buffer = String::new();

        iter::from_fn(move || {
            buffer.clear();

            match self.read_line_raw(&mut buffer) {
                Ok(0) => None,
                Ok(_) => Some(
                    buffer
                        .parse()
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
                ),
                Err(e) => Some(Err(e)),
            }
        })
    }

    /// Reads the whole table and assembles one [`GeneResult`] per gene.
    ///
    /// The first non-empty line must be the header. Every gene must have an
    /// expression line. Repeated transcript lines for the same gene keep the
    /// first occurrence.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::line::Method;
    ///
    /// let data = b"Gene\tIsoform\tExplogFC/FC\tP
    /// ENSG00000160710\tExpression\t1.5\t0
    /// ENSG00000160710\tENST00000368471\t0.56\t1e-05
    /// ENSG00000160710\tENST00000368474\t1.2\t0.4";
    /// let mut reader = isopret::Reader::new(&data[..]);
    ///
    /// let table = reader.results()?;
    /// assert_eq!(table.method(), Method::HbaDeals);
    ///
    /// let gene = &table.genes()[&Accession::gene("ENSG00000160710")?];
    /// assert_eq!(gene.expressed_transcript_count(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn results(&mut self) -> Result<ResultTable> {
        let mut buffer = String::new();
        let mut method = None;
        let mut builders = HashMap::<Accession, gene::Builder>::new();
        let mut number = 0usize;

        loop {
            if self.read_line_raw(&mut buffer).map_err(Error::Io)? == 0 {
                break;
            }

            number += 1;

            let line = buffer
                .parse::<Line>()
                .map_err(|e| Error::Line(number, e))?;

            match (line, method) {
                (Line::Empty, _) => continue,
                (Line::Header(m), None) => method = Some(m),
                (Line::Header(_), Some(_)) => return Err(Error::UnexpectedHeader(number)),
                (_, None) => return Err(Error::MissingHeader),
                (
                    Line::Expression {
                        gene,
                        fold_change,
                        p,
                    },
                    Some(_),
                ) => {
                    let builder = take_builder(&mut builders, &gene)?
                        .expression(fold_change, p)
                        .map_err(|e| Error::Gene(gene.clone(), e))?;
                    builders.insert(gene, builder);
                }
                (
                    Line::Isoform {
                        gene,
                        transcript,
                        fold_change,
                        p,
                    },
                    Some(_),
                ) => {
                    let result = TranscriptResult::try_new(transcript, fold_change, p)
                        .map_err(|e| Error::Gene(gene.clone(), gene::builder::Error::Invalid(e)))?;
                    let builder = take_builder(&mut builders, &gene)?.push_transcript(result);
                    builders.insert(gene, builder);
                }
            }
        }

        let method = method.ok_or(Error::MissingHeader)?;

        let mut genes = HashMap::with_capacity(builders.len());
        for (accession, builder) in builders {
            let result = builder
                .try_build()
                .map_err(|e| Error::Gene(accession.clone(), e))?;
            genes.insert(accession, result);
        }

        debug!(
            "read {} {method} gene results from {number} lines",
            genes.len()
        );

        Ok(ResultTable { method, genes })
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self(inner)
    }
}

/// Removes the builder for `gene`, starting a new one if none exists.
fn take_builder(
    builders: &mut HashMap<Accession, gene::Builder>,
    gene: &Accession,
) -> Result<gene::Builder> {
    match builders.remove(gene) {
        Some(builder) => Ok(builder),
        None => gene::Builder::default()
            .accession(gene.clone())
            .map_err(|e| Error::Gene(gene.clone(), e)),
    }
}

/// Reads a line from a buffered reader, stripping the line ending.
pub(crate) fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();

    match reader.read_line(buffer) {
        Ok(0) => Ok(0),
        Ok(n) => {
            if buffer.ends_with(NEW_LINE) {
                buffer.pop();

                if buffer.ends_with(CARRIAGE_RETURN) {
                    buffer.pop();
                }
            }

            Ok(n)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_read_line() {
        let data = b"hello\r\nworld!";
        let mut cursor = io::Cursor::new(data);

        let mut buffer = String::new();
        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "hello");
        assert_eq!(len, 7);

        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "world!");
        assert_eq!(len, 6);
    }

    #[test]
    fn it_assembles_edger_results_in_any_order() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let data = b"Gene\tIsoform\tExplogFC/FC\tBH\n\
            ENSG00000000971\tENST00000367429\t1.52835998738455\t0.0640936190681988\n\
            ENSG00000000971\tENST00000630130\t2.66993070863875\t0.326994012740595\n\
            ENSG00000001036\tExpression\t0.9\t0.01\n\
            ENSG00000000971\tExpression\t-0.379897497979925\t1\n";
        let table = Reader::new(&data[..]).results()?;

        assert_eq!(table.method(), Method::EdgeR);
        assert_eq!(table.genes().len(), 2);

        let gene = &table.genes()[&Accession::gene("ENSG00000000971")?];
        assert_eq!(gene.expression_p(), 1.0);
        assert_eq!(gene.expressed_transcript_count(), 2);

        let gene = &table.genes()[&Accession::gene("ENSG00000001036")?];
        assert_eq!(gene.expressed_transcript_count(), 0);

        Ok(())
    }

    #[test]
    fn it_requires_a_header() {
        let data = b"\nENSG00000001036\tExpression\t0.9\t0.01\n";
        let err = Reader::new(&data[..]).results().unwrap_err();
        assert!(matches!(err, Error::MissingHeader));

        let err = Reader::new(&b""[..]).results().unwrap_err();
        assert!(matches!(err, Error::MissingHeader));
    }

    #[test]
    fn it_rejects_a_second_header() {
        let data = b"Gene\tIsoform\tExplogFC/FC\tP\nGene\tIsoform\tExplogFC/FC\tP\n";
        let err = Reader::new(&data[..]).results().unwrap_err();
        assert_eq!(err.to_string(), "unexpected header at line 2");
    }

    #[test]
    fn it_reports_line_numbers() {
        let data = b"Gene\tIsoform\tExplogFC/FC\tP\nENSG00000001036\tExpression\t0.9\n";
        let err = Reader::new(&data[..]).results().unwrap_err();
        assert!(matches!(err, Error::Line(2, _)));
    }

    #[test]
    fn it_requires_an_expression_line_per_gene() {
        let data = b"Gene\tIsoform\tExplogFC/FC\tP\nENSG00000001036\tENST00000002165\t0.9\t0.1\n";
        let err = Reader::new(&data[..]).results().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid gene \"ENSG00000001036\": missing required field: expression"
        );
    }

    #[test]
    fn it_rejects_repeated_expression_lines() {
        let data = b"Gene\tIsoform\tExplogFC/FC\tP\n\
            ENSG00000001036\tExpression\t0.9\t0.1\n\
            ENSG00000001036\tExpression\t0.9\t0.1\n";
        let err = Reader::new(&data[..]).results().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid gene \"ENSG00000001036\": singular field set multiple times: expression"
        );
    }
}
