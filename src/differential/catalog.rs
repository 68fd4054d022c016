//! The reference catalog of known genes and transcripts.

use std::collections::HashSet;
use std::io::BufRead;

use crate::core::Accession;
use crate::core::Namespace;
use crate::table;

/// The genes and transcripts known to the loaded reference.
///
/// Differential results are resolved against a catalog before they are split
/// into study and population sets.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Catalog {
    /// The known genes.
    genes: HashSet<Accession>,

    /// The known transcripts.
    transcripts: HashSet<Accession>,
}

impl Catalog {
    /// Reads `gene<TAB>transcript` records.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::differential::Catalog;
    ///
    /// let data = b"ENSG00000160710\tENST00000368471\nENSG00000160710\tENST00000368474.5\n";
    /// let catalog = Catalog::read(&data[..])?;
    ///
    /// assert!(catalog.contains(&Accession::gene("ENSG00000160710")?));
    /// assert!(catalog.contains(&Accession::transcript("ENST00000368474")?));
    /// assert_eq!(catalog.gene_count(), 1);
    /// assert_eq!(catalog.transcript_count(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read<T>(reader: T) -> Result<Self, table::Error>
    where
        T: BufRead,
    {
        let mut catalog = Self::default();

        table::for_each_record(reader, 2, |_, fields| {
            let gene = Accession::try_new(Namespace::Gene, fields[0])?;
            let transcript = Accession::try_new(Namespace::Transcript, fields[1])?;
            catalog.genes.insert(gene);
            catalog.transcripts.insert(transcript);
            Ok(())
        })?;

        Ok(catalog)
    }

    /// Adds an accession to the catalog, returning whether it was new.
    pub fn insert(&mut self, accession: Accession) -> bool {
        match accession.namespace() {
            Namespace::Gene => self.genes.insert(accession),
            Namespace::Transcript => self.transcripts.insert(accession),
        }
    }

    /// Whether the catalog knows `accession`.
    pub fn contains(&self, accession: &Accession) -> bool {
        match accession.namespace() {
            Namespace::Gene => self.genes.contains(accession),
            Namespace::Transcript => self.transcripts.contains(accession),
        }
    }

    /// Gets the number of known genes.
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    /// Gets the number of known transcripts.
    pub fn transcript_count(&self) -> usize {
        self.transcripts.len()
    }
}

impl FromIterator<Accession> for Catalog {
    fn from_iter<I: IntoIterator<Item = Accession>>(iter: I) -> Self {
        let mut catalog = Self::default();

        for accession in iter {
            catalog.insert(accession);
        }

        catalog
    }
}
