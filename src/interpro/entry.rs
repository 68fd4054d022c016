//! InterPro entries and their descriptions.

use std::collections::HashMap;
use std::io::BufRead;

use tracing::debug;
use tracing::warn;

use crate::interpro::InterproId;
use crate::table;

/// The first field of the description table's header line.
const HEADER: &str = "ENTRY_AC";

/// The number of fields in a description table record.
const NUM_FIELDS: usize = 3;

/// The type of an InterPro entry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntryType {
    /// An active site.
    ActiveSite,

    /// A binding site.
    BindingSite,

    /// A conserved site.
    ConservedSite,

    /// A domain.
    Domain,

    /// A protein family.
    Family,

    /// A homologous superfamily.
    HomologousSuperfamily,

    /// A post-translational modification.
    Ptm,

    /// A repeat.
    Repeat,

    /// Any other type.
    Unknown,
}

impl EntryType {
    /// Parses an entry type, ignoring case. Unrecognized values map to
    /// [`EntryType::Unknown`].
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::interpro::EntryType;
    ///
    /// assert_eq!(EntryType::parse("Domain"), EntryType::Domain);
    /// assert_eq!(EntryType::parse("homologous_superfamily"), EntryType::HomologousSuperfamily);
    /// assert_eq!(EntryType::parse("DUF4510"), EntryType::Unknown);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE_SITE" => Self::ActiveSite,
            "BINDING_SITE" => Self::BindingSite,
            "CONSERVED_SITE" => Self::ConservedSite,
            "DOMAIN" => Self::Domain,
            "FAMILY" => Self::Family,
            "HOMOLOGOUS_SUPERFAMILY" => Self::HomologousSuperfamily,
            "PTM" => Self::Ptm,
            "REPEAT" => Self::Repeat,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryType::ActiveSite => write!(f, "Active_site"),
            EntryType::BindingSite => write!(f, "Binding_site"),
            EntryType::ConservedSite => write!(f, "Conserved_site"),
            EntryType::Domain => write!(f, "Domain"),
            EntryType::Family => write!(f, "Family"),
            EntryType::HomologousSuperfamily => write!(f, "Homologous_superfamily"),
            EntryType::Ptm => write!(f, "PTM"),
            EntryType::Repeat => write!(f, "Repeat"),
            EntryType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// An InterPro entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// The accession.
    id: InterproId,

    /// The type.
    entry_type: EntryType,

    /// The human-readable description.
    description: String,
}

impl Entry {
    /// Creates a new entry.
    pub fn new(id: InterproId, entry_type: EntryType, description: impl Into<String>) -> Self {
        Self {
            id,
            entry_type,
            description: description.into(),
        }
    }

    /// Gets the accession.
    pub fn id(&self) -> InterproId {
        self.id
    }

    /// Gets the type.
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Gets the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the entry is a family or a homologous superfamily.
    pub fn is_family_or_superfamily(&self) -> bool {
        matches!(
            self.entry_type,
            EntryType::Family | EntryType::HomologousSuperfamily
        )
    }
}

/// The InterPro entries, keyed by accession.
#[derive(Clone, Debug, Default)]
pub struct Descriptions(HashMap<InterproId, Entry>);

impl Descriptions {
    /// Reads a description table of `accession<TAB>type<TAB>description`
    /// rows. A leading `ENTRY_AC` header is skipped, and entries with an
    /// unrecognized type are skipped with a warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::interpro::Descriptions;
    /// use isopret::interpro::InterproId;
    ///
    /// let data = b"ENTRY_AC\tENTRY_TYPE\tENTRY_NAME\nIPR000008\tDomain\tC2 domain\n";
    /// let descriptions = Descriptions::read(&data[..])?;
    ///
    /// let entry = descriptions.get(&InterproId::new(8)).unwrap();
    /// assert_eq!(entry.description(), "C2 domain");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read<T>(reader: T) -> Result<Self, table::Error>
    where
        T: BufRead,
    {
        let mut descriptions = Self::default();
        let mut skipped = 0usize;

        table::for_each_record(reader, NUM_FIELDS, |line, fields| {
            if fields[0] == HEADER {
                return Ok(());
            }

            let id = fields[0].parse::<InterproId>()?;
            let entry_type = EntryType::parse(fields[1]);

            if entry_type == EntryType::Unknown {
                warn!(
                    "skipping InterPro entry {id} at line {line} with unrecognized type \"{}\"",
                    fields[1]
                );
                skipped += 1;
                return Ok(());
            }

            descriptions.insert(Entry::new(id, entry_type, fields[2]));
            Ok(())
        })?;

        debug!(
            "read {} InterPro entries ({skipped} skipped)",
            descriptions.len()
        );

        Ok(descriptions)
    }

    /// Adds an entry, replacing any entry with the same accession.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        self.0.insert(entry.id(), entry)
    }

    /// Gets an entry by accession.
    pub fn get(&self, id: &InterproId) -> Option<&Entry> {
        self.0.get(id)
    }

    /// Gets the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Entry> for Descriptions {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self(iter.into_iter().map(|entry| (entry.id(), entry)).collect())
    }
}
