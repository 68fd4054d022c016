//! Ontology annotations and their propagation through the term hierarchy.
//!
//! The ontology itself is supplied through the [`Ontology`] trait. An
//! in-memory implementation, [`Graph`](graph::Graph), is provided for callers
//! that load the hierarchy from simple edge tables.
//!
//! A [`Propagator`] indexes the direct annotations of one namespace of items
//! (genes or transcripts) and answers, for any subset of those items, which
//! items annotate each term directly and which annotate it indirectly through a
//! descendant term.
//!
//! ```
//! use isopret::core::Accession;
//! use isopret::core::Namespace;
//! use isopret::core::TermId;
//! use isopret::ontology::AnnotationMap;
//! use isopret::ontology::Propagator;
//! use isopret::ontology::graph::Builder;
//!
//! let graph = Builder::default()
//!     .edge("GO:0000002".parse()?, "GO:0000001".parse()?)
//!     .try_build()?;
//!
//! let item = Accession::gene("ENSG00000139618")?;
//! let annotations = AnnotationMap::from_iter([(item.clone(), "GO:0000002".parse::<TermId>()?)]);
//!
//! let propagator = Propagator::try_new(Namespace::Gene, &graph, annotations)?;
//! let (map, drift) = propagator.association_map([&item]);
//!
//! let child = "GO:0000002".parse::<TermId>()?;
//! let parent = "GO:0000001".parse::<TermId>()?;
//!
//! assert!(map[&child].direct().contains(&item));
//! assert!(map[&parent].indirect().contains(&item));
//! assert!(!map[&parent].direct().contains(&item));
//! assert_eq!(drift.items_not_found(), 0);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod graph;
pub mod propagator;

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::HashSet;
use std::io::BufRead;
use std::ops::AddAssign;

pub use propagator::Propagator;

use crate::core::Accession;
use crate::core::Namespace;
use crate::core::TermId;
use crate::table;

/// An ontology as seen by the propagator.
pub trait Ontology {
    /// Whether `term` (either a primary or an alternate identifier) is part of
    /// the ontology.
    fn contains_term(&self, term: &TermId) -> bool;

    /// Resolves `term` to its primary identifier.
    ///
    /// Returns [`None`] if the term cannot be resolved.
    fn primary_term_id(&self, term: &TermId) -> Option<TermId>;

    /// Gets the proper ancestors of `term` (the term itself is excluded).
    fn ancestors_of(&self, term: &TermId) -> Cow<'_, HashSet<TermId>>;
}

/// The items annotating one term, split by how they reached it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DirectAndIndirect {
    /// Items annotated directly to the term.
    direct: HashSet<Accession>,

    /// Items annotated to a proper descendant of the term.
    indirect: HashSet<Accession>,
}

impl DirectAndIndirect {
    /// Gets the items annotated directly to the term.
    pub fn direct(&self) -> &HashSet<Accession> {
        &self.direct
    }

    /// Gets the items annotated to a proper descendant of the term.
    pub fn indirect(&self) -> &HashSet<Accession> {
        &self.indirect
    }

    /// Gets the number of distinct items annotated to the term either way.
    pub fn total_count(&self) -> usize {
        self.direct.union(&self.indirect).count()
    }

    /// Records a direct annotation.
    pub(crate) fn add_direct(&mut self, item: Accession) {
        self.direct.insert(item);
    }

    /// Records an indirect annotation.
    pub(crate) fn add_indirect(&mut self, item: Accession) {
        self.indirect.insert(item);
    }
}

/// Soft drift counters from a propagation query.
///
/// Neither condition is an error: items legitimately lack annotations, and
/// annotation files routinely reference terms an ontology snapshot no longer
/// resolves.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Drift {
    /// Queried items absent from the annotation index.
    items_not_found: usize,

    /// Annotations whose term could not be resolved to a primary term.
    terms_not_found: usize,
}

impl Drift {
    /// Gets the number of queried items absent from the annotation index.
    pub fn items_not_found(&self) -> usize {
        self.items_not_found
    }

    /// Gets the number of annotations whose term could not be resolved.
    pub fn terms_not_found(&self) -> usize {
        self.terms_not_found
    }
}

impl AddAssign for Drift {
    fn add_assign(&mut self, rhs: Self) {
        self.items_not_found += rhs.items_not_found;
        self.terms_not_found += rhs.terms_not_found;
    }
}

/// A named set of items along with the propagated annotations of exactly
/// those items.
///
/// This is the shape consumed by term enrichment calculators, for both the
/// study set and the population set.
#[derive(Clone, Debug, PartialEq)]
pub struct StudySet {
    /// The name.
    name: String,

    /// The items.
    items: HashSet<Accession>,

    /// The propagated annotations of `items`.
    annotations: HashMap<TermId, DirectAndIndirect>,
}

impl StudySet {
    /// Creates a new study set.
    pub fn new(
        name: impl Into<String>,
        items: HashSet<Accession>,
        annotations: HashMap<TermId, DirectAndIndirect>,
    ) -> Self {
        Self {
            name: name.into(),
            items,
            annotations,
        }
    }

    /// Gets the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the items.
    pub fn items(&self) -> &HashSet<Accession> {
        &self.items
    }

    /// Gets the propagated annotations.
    pub fn annotations(&self) -> &HashMap<TermId, DirectAndIndirect> {
        &self.annotations
    }

    /// Gets the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the study set has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Gets the number of items with at least one propagated annotation.
    pub fn annotated_item_count(&self) -> usize {
        self.annotations
            .values()
            .flat_map(|a| a.direct.iter())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Direct term annotations keyed by item.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnnotationMap(HashMap<Accession, HashSet<TermId>>);

impl AnnotationMap {
    /// Reads `item<TAB>term` records, placing every item in `namespace`.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::core::Namespace;
    /// use isopret::ontology::AnnotationMap;
    ///
    /// let data = b"# gene\tterm\nENSG00000139618\tGO:0006281\nENSG00000139618\tGO:0000724\n";
    /// let map = AnnotationMap::read(&data[..], Namespace::Gene)?;
    ///
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get(&Accession::gene("ENSG00000139618")?).map(|t| t.len()), Some(2));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read<T>(reader: T, namespace: Namespace) -> Result<Self, table::Error>
    where
        T: BufRead,
    {
        let mut map = Self::default();

        table::for_each_record(reader, 2, |_, fields| {
            let item = Accession::try_new(namespace, fields[0])?;
            let term = fields[1].parse::<TermId>()?;
            map.insert(item, term);
            Ok(())
        })?;

        Ok(map)
    }

    /// Adds an annotation, returning whether it was new.
    pub fn insert(&mut self, item: Accession, term: TermId) -> bool {
        self.0.entry(item).or_default().insert(term)
    }

    /// Gets the terms annotating `item`.
    pub fn get(&self, item: &Accession) -> Option<&HashSet<TermId>> {
        self.0.get(item)
    }

    /// Gets the number of annotated items.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no annotated items.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the items and their terms.
    pub fn iter(&self) -> impl Iterator<Item = (&Accession, &HashSet<TermId>)> {
        self.0.iter()
    }
}

impl FromIterator<(Accession, TermId)> for AnnotationMap {
    fn from_iter<I: IntoIterator<Item = (Accession, TermId)>>(iter: I) -> Self {
        let mut map = Self::default();

        for (item, term) in iter {
            map.insert(item, term);
        }

        map
    }
}

impl IntoIterator for AnnotationMap {
    type Item = (Accession, HashSet<TermId>);
    type IntoIter = std::collections::hash_map::IntoIter<Accession, HashSet<TermId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_accumulates() {
        let mut drift = Drift {
            items_not_found: 1,
            terms_not_found: 2,
        };
        drift += Drift {
            items_not_found: 3,
            terms_not_found: 4,
        };

        assert_eq!(drift.items_not_found(), 4);
        assert_eq!(drift.terms_not_found(), 6);
    }

    #[test]
    fn total_count_does_not_double_count() -> Result<(), Box<dyn std::error::Error>> {
        let item = Accession::gene("ENSG00000139618")?;
        let other = Accession::gene("ENSG00000012048")?;

        let mut annotation = DirectAndIndirect::default();
        annotation.add_direct(item.clone());
        annotation.add_indirect(item);
        annotation.add_indirect(other);

        assert_eq!(annotation.total_count(), 2);

        Ok(())
    }

    #[test]
    fn reading_rejects_bad_terms() {
        let data = b"ENSG00000139618\tGO0006281\n";
        let err = AnnotationMap::read(&data[..], Namespace::Gene).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid record at line 1: missing \":\" separator in term id \"GO0006281\""
        );
    }
}
