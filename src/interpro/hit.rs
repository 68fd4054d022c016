//! InterPro domain hits on transcripts.

use std::collections::HashMap;
use std::collections::HashSet;
use std::io::BufRead;

use tracing::debug;

use crate::core::Accession;
use crate::interpro::InterproId;
use crate::table;

/// The number of fields in a hit table record.
const NUM_FIELDS: usize = 5;

/// A single InterPro hit on a transcript's protein product.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hit {
    /// The transcript.
    transcript: Accession,

    /// The gene.
    gene: Accession,

    /// The InterPro entry.
    entry: InterproId,

    /// The first residue covered by the hit.
    start: u32,

    /// The last residue covered by the hit.
    end: u32,
}

impl Hit {
    /// Parses a hit from `transcript`, `gene`, `accession`, `start`, `end`
    /// fields. Returns `Ok(None)` when the accession field is empty, which
    /// marks a transcript without hits.
    fn from_fields(
        fields: &[&str],
    ) -> std::result::Result<Option<Self>, Box<dyn std::error::Error + Send + Sync>> {
        if fields[2].is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            transcript: Accession::transcript(fields[0])?,
            gene: Accession::gene(fields[1])?,
            entry: fields[2].parse()?,
            start: fields[3].parse()?,
            end: fields[4].parse()?,
        }))
    }

    /// Gets the transcript.
    pub fn transcript(&self) -> &Accession {
        &self.transcript
    }

    /// Gets the gene.
    pub fn gene(&self) -> &Accession {
        &self.gene
    }

    /// Gets the InterPro entry.
    pub fn entry(&self) -> InterproId {
        self.entry
    }

    /// Gets the first residue covered by the hit.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Gets the last residue covered by the hit.
    pub fn end(&self) -> u32 {
        self.end
    }
}

/// The set of InterPro entries hit on each transcript.
///
/// Overlapping hits of the same entry on one transcript collapse to a single
/// membership.
#[derive(Clone, Debug, Default)]
pub struct Hits(HashMap<Accession, HashSet<InterproId>>);

impl Hits {
    /// Reads a hit table of
    /// `transcript<TAB>gene<TAB>accession<TAB>start<TAB>end` rows. Rows with
    /// an empty accession are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::interpro::Hits;
    ///
    /// let data = b"ENST00000380152\tENSG00000139618\tIPR015525\t1\t40
    /// ENST00000380152\tENSG00000139618\tIPR015525\t60\t90
    /// ENST00000544455\tENSG00000139618\t\t\t
    /// ";
    /// let hits = Hits::read(&data[..])?;
    ///
    /// let transcript = Accession::transcript("ENST00000380152")?;
    /// assert_eq!(hits.get(&transcript).map(|entries| entries.len()), Some(1));
    /// assert!(hits.get(&Accession::transcript("ENST00000544455")?).is_none());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read<T>(reader: T) -> Result<Self, table::Error>
    where
        T: BufRead,
    {
        let mut hits = Self::default();
        let mut count = 0usize;

        table::for_each_record(reader, NUM_FIELDS, |_, fields| {
            if let Some(hit) = Hit::from_fields(fields)? {
                count += 1;
                hits.insert(hit);
            }

            Ok(())
        })?;

        debug!(
            "read {count} InterPro hits on {} transcripts",
            hits.transcript_count()
        );

        Ok(hits)
    }

    /// Records a hit, returning whether the transcript did not already carry
    /// the entry.
    pub fn insert(&mut self, hit: Hit) -> bool {
        self.0.entry(hit.transcript).or_default().insert(hit.entry)
    }

    /// Gets the entries hit on `transcript`.
    pub fn get(&self, transcript: &Accession) -> Option<&HashSet<InterproId>> {
        self.0.get(transcript)
    }

    /// Gets the number of transcripts with at least one hit.
    pub fn transcript_count(&self) -> usize {
        self.0.len()
    }

    /// Whether no transcript has a hit.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Accession, InterproId)> for Hits {
    fn from_iter<I: IntoIterator<Item = (Accession, InterproId)>>(iter: I) -> Self {
        let mut hits = Self::default();

        for (transcript, entry) in iter {
            hits.0.entry(transcript).or_default().insert(entry);
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_hits() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"ENST00000380152.8\tENSG00000139618.16\tIPR015525\t1\t40
ENST00000380152.8\tENSG00000139618.16\tIPR002093\t1000\t1030
ENST00000544455\tENSG00000139618\t\t\t
";
        let hits = Hits::read(&data[..])?;
        assert_eq!(hits.transcript_count(), 1);

        let entries = hits.get(&Accession::transcript("ENST00000380152")?).unwrap();
        assert!(entries.contains(&InterproId::new(15525)));
        assert!(entries.contains(&InterproId::new(2093)));

        Ok(())
    }

    #[test]
    fn it_rejects_swapped_columns() {
        let data = b"ENSG00000139618\tENST00000380152\tIPR015525\t1\t40\n";
        assert!(Hits::read(&data[..]).is_err());
    }

    #[test]
    fn it_rejects_bad_coordinates() {
        let data = b"ENST00000380152\tENSG00000139618\tIPR015525\tone\t40\n";
        let err = Hits::read(&data[..]).unwrap_err();
        assert!(err.to_string().starts_with("invalid record at line 1:"));
    }
}
