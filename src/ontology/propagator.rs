//! Propagation of direct annotations to every ancestor term.

use std::collections::HashMap;
use std::collections::HashSet;

use tracing::debug;
use tracing::trace;

use crate::core::Accession;
use crate::core::Namespace;
use crate::core::TermId;
use crate::ontology::AnnotationMap;
use crate::ontology::DirectAndIndirect;
use crate::ontology::Drift;
use crate::ontology::Ontology;
use crate::ontology::StudySet;

/// An error related to constructing a [`Propagator`].
#[derive(Debug, PartialEq)]
pub enum Error {
    /// An annotated item belongs to a different namespace than the
    /// propagator.
    Namespace {
        /// The namespace of the propagator.
        expected: Namespace,

        /// The offending item.
        found: Accession,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Namespace { expected, found } => write!(
                f,
                "{expected} annotations contain {} accession \"{found}\"",
                found.namespace()
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// An index of the direct annotations of a single namespace of items that
/// propagates them through an [`Ontology`] on request.
///
/// Construction drops every term the ontology does not contain, along with
/// items left without any terms. The index is immutable afterwards.
#[derive(Debug)]
pub struct Propagator<'o, O>
where
    O: Ontology,
{
    /// The namespace of every indexed item.
    namespace: Namespace,

    /// The ontology.
    ontology: &'o O,

    /// The terms annotating each item, in a stable order.
    index: HashMap<Accession, Vec<TermId>>,
}

impl<'o, O> Propagator<'o, O>
where
    O: Ontology,
{
    /// Attempts to create a new propagator for the items of `namespace`.
    ///
    /// Fails if any annotated item belongs to another namespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::core::Namespace;
    /// use isopret::core::TermId;
    /// use isopret::ontology::AnnotationMap;
    /// use isopret::ontology::Propagator;
    /// use isopret::ontology::graph::Builder;
    ///
    /// let graph = Builder::default().term("GO:0000001".parse()?).try_build()?;
    ///
    /// let mut annotations = AnnotationMap::default();
    /// annotations.insert(Accession::gene("ENSG00000139618")?, "GO:0000001".parse()?);
    /// annotations.insert(Accession::transcript("ENST00000380152")?, "GO:0000001".parse()?);
    ///
    /// assert!(Propagator::try_new(Namespace::Gene, &graph, annotations).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(namespace: Namespace, ontology: &'o O, annotations: AnnotationMap) -> Result<Self> {
        let mut index = HashMap::with_capacity(annotations.len());
        let mut dropped = 0usize;

        for (item, terms) in annotations {
            if item.namespace() != namespace {
                return Err(Error::Namespace {
                    expected: namespace,
                    found: item,
                });
            }

            let mut kept = Vec::with_capacity(terms.len());
            for term in terms {
                if ontology.contains_term(&term) {
                    kept.push(term);
                } else {
                    dropped += 1;
                }
            }

            if !kept.is_empty() {
                kept.sort();
                index.insert(item, kept);
            }
        }

        debug!(
            "indexed {} {namespace} items ({dropped} annotations to unknown terms dropped)",
            index.len()
        );

        Ok(Self {
            namespace,
            ontology,
            index,
        })
    }

    /// Gets the namespace of the indexed items.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Gets the number of items with at least one annotation.
    pub fn annotated_item_count(&self) -> usize {
        self.index.len()
    }

    /// Gets the number of distinct terms used in direct annotations.
    pub fn annotating_term_count(&self) -> usize {
        self.index
            .values()
            .flatten()
            .collect::<HashSet<_>>()
            .len()
    }

    /// Gets the total number of direct annotations.
    pub fn total_annotation_count(&self) -> usize {
        self.index.values().map(Vec::len).sum()
    }

    /// Returns an iterator over the indexed items.
    pub fn items(&self) -> impl Iterator<Item = &Accession> {
        self.index.keys()
    }

    /// Gets the items annotated to `term`, either directly or (when
    /// `include_descendants` is set) through any descendant term.
    ///
    /// Annotations that do not resolve to a primary term are ignored.
    pub fn items_annotated_by(&self, term: &TermId, include_descendants: bool) -> HashSet<&Accession> {
        let target = match self.ontology.primary_term_id(term) {
            Some(target) => target,
            None => return HashSet::new(),
        };

        self.index
            .iter()
            .filter(|(_, terms)| {
                terms.iter().any(|t| match self.ontology.primary_term_id(t) {
                    Some(primary) if primary == target => true,
                    Some(primary) if include_descendants => {
                        self.ontology.ancestors_of(&primary).contains(&target)
                    }
                    _ => false,
                })
            })
            .map(|(item, _)| item)
            .collect()
    }

    /// Builds the propagated annotations of `items`.
    ///
    /// Each item is recorded in the direct set of every (primary) term it is
    /// annotated with, and in the indirect set of every proper ancestor of
    /// those terms. Requested items missing from the index and annotations
    /// whose term does not resolve are counted in the returned [`Drift`].
    pub fn association_map<'a, I>(&self, items: I) -> (HashMap<TermId, DirectAndIndirect>, Drift)
    where
        I: IntoIterator<Item = &'a Accession>,
    {
        let mut map = HashMap::<TermId, DirectAndIndirect>::new();
        let mut drift = Drift::default();

        for item in items {
            let terms = match self.index.get(item) {
                Some(terms) => terms,
                None => {
                    drift.items_not_found += 1;
                    continue;
                }
            };

            let mut primaries = HashSet::with_capacity(terms.len());
            for term in terms {
                match self.ontology.primary_term_id(term) {
                    Some(primary) => {
                        primaries.insert(primary);
                    }
                    None => drift.terms_not_found += 1,
                }
            }

            for primary in primaries {
                for ancestor in self.ontology.ancestors_of(&primary).iter() {
                    map.entry(ancestor.clone())
                        .or_default()
                        .add_indirect(item.clone());
                }

                map.entry(primary).or_default().add_direct(item.clone());
            }
        }

        if drift.items_not_found > 0 {
            trace!(
                "could not find {} {} items in the annotation index",
                drift.items_not_found,
                self.namespace
            );
        }

        if drift.terms_not_found > 0 {
            trace!(
                "could not resolve {} annotating terms for {} items",
                drift.terms_not_found,
                self.namespace
            );
        }

        (map, drift)
    }

    /// Builds a [`StudySet`] named `name` over `items`.
    pub fn study_set(&self, name: impl Into<String>, items: HashSet<Accession>) -> (StudySet, Drift) {
        let (annotations, drift) = self.association_map(&items);
        (StudySet::new(name, items, annotations), drift)
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::ontology::graph::Builder;
    use crate::ontology::graph::Graph;

    fn term(s: &str) -> TermId {
        s.parse().unwrap()
    }

    fn gene(s: &str) -> Accession {
        Accession::gene(s).unwrap()
    }

    /// `T:1` <- `T:2` <- `T:3`, `T:1` <- `T:4`, with `T:9` an alternate of
    /// `T:3`.
    fn graph() -> Graph {
        Builder::default()
            .edge(term("T:2"), term("T:1"))
            .edge(term("T:3"), term("T:2"))
            .edge(term("T:4"), term("T:1"))
            .alternate(term("T:9"), term("T:3"))
            .try_build()
            .unwrap()
    }

    #[test]
    fn it_propagates_to_ancestors_only() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let graph = graph();
        let annotations = AnnotationMap::from_iter([(gene("G1"), term("T:2"))]);
        let propagator = Propagator::try_new(Namespace::Gene, &graph, annotations)?;

        let (map, drift) = propagator.association_map([&gene("G1")]);

        assert_eq!(drift, Drift::default());
        assert!(map[&term("T:2")].direct().contains(&gene("G1")));
        assert!(map[&term("T:2")].indirect().is_empty());
        assert!(map[&term("T:1")].indirect().contains(&gene("G1")));
        assert!(map[&term("T:1")].direct().is_empty());
        assert!(!map.contains_key(&term("T:3")));
        assert!(!map.contains_key(&term("T:4")));

        Ok(())
    }

    #[test]
    fn indirect_sets_are_unions_of_descendant_direct_sets()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let graph = graph();
        let annotations = AnnotationMap::from_iter([
            (gene("G1"), term("T:3")),
            (gene("G1"), term("T:2")),
            (gene("G2"), term("T:4")),
            (gene("G3"), term("T:1")),
            (gene("G4"), term("T:3")),
        ]);
        let propagator = Propagator::try_new(Namespace::Gene, &graph, annotations)?;

        let query = [gene("G1"), gene("G2"), gene("G3")];
        let (map, _) = propagator.association_map(&query);

        for (term, annotation) in &map {
            let mut expected = HashSet::new();
            for (other, other_annotation) in &map {
                if graph.ancestors_of(other).contains(term) {
                    expected.extend(other_annotation.direct().iter().cloned());
                }
            }

            assert_eq!(annotation.indirect(), &expected, "term {term}");
        }

        // G1 is direct at T:2 and indirect at T:2 through T:3.
        assert!(map[&term("T:2")].direct().contains(&gene("G1")));
        assert!(map[&term("T:2")].indirect().contains(&gene("G1")));
        assert_eq!(map[&term("T:1")].direct().len(), 1);
        assert_eq!(map[&term("T:1")].total_count(), 3);

        // G4 was not queried.
        assert!(!map[&term("T:3")].direct().contains(&gene("G4")));

        Ok(())
    }

    #[test]
    fn it_resolves_alternate_ids() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let graph = graph();
        let annotations = AnnotationMap::from_iter([
            (gene("G1"), term("T:9")),
            (gene("G1"), term("T:3")),
        ]);
        let propagator = Propagator::try_new(Namespace::Gene, &graph, annotations)?;

        let (map, _) = propagator.association_map([&gene("G1")]);
        assert!(!map.contains_key(&term("T:9")));
        assert_eq!(map[&term("T:3")].direct().len(), 1);
        assert_eq!(map[&term("T:1")].indirect().len(), 1);

        Ok(())
    }

    #[test]
    fn it_counts_drift() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let graph = graph();
        let annotations = AnnotationMap::from_iter([
            (gene("G1"), term("T:2")),
            (gene("G2"), term("X:1")),
        ]);
        let propagator = Propagator::try_new(Namespace::Gene, &graph, annotations)?;

        // G2 is left without any known terms and is therefore not indexed.
        assert_eq!(propagator.annotated_item_count(), 1);

        let (map, drift) = propagator.association_map([&gene("G1"), &gene("G2"), &gene("G3")]);
        assert_eq!(drift.items_not_found(), 2);
        assert_eq!(drift.terms_not_found(), 0);
        assert_eq!(map.len(), 2);

        Ok(())
    }

    /// An ontology that knows about a term but cannot resolve it.
    struct Stale;

    impl Ontology for Stale {
        fn contains_term(&self, _: &TermId) -> bool {
            true
        }

        fn primary_term_id(&self, term: &TermId) -> Option<TermId> {
            (term.local() != "obsolete").then(|| term.clone())
        }

        fn ancestors_of(&self, _: &TermId) -> Cow<'_, HashSet<TermId>> {
            Cow::Owned(HashSet::new())
        }
    }

    #[test]
    fn unresolved_terms_are_soft() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let annotations = AnnotationMap::from_iter([
            (gene("G1"), term("T:obsolete")),
            (gene("G1"), term("T:1")),
        ]);
        let propagator = Propagator::try_new(Namespace::Gene, &Stale, annotations)?;

        let (map, drift) = propagator.association_map([&gene("G1")]);
        assert_eq!(drift.terms_not_found(), 1);
        assert_eq!(map.len(), 1);

        Ok(())
    }

    #[test]
    fn it_rejects_mixed_namespaces() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let graph = graph();
        let annotations = AnnotationMap::from_iter([
            (gene("G1"), term("T:2")),
            (Accession::transcript("TX1")?, term("T:2")),
        ]);

        let err = Propagator::try_new(Namespace::Gene, &graph, annotations).unwrap_err();
        assert_eq!(
            err.to_string(),
            "gene annotations contain transcript accession \"TX1\""
        );

        Ok(())
    }

    #[test]
    fn it_summarizes_the_index() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let graph = graph();
        let annotations = AnnotationMap::from_iter([
            (gene("G1"), term("T:3")),
            (gene("G1"), term("T:4")),
            (gene("G2"), term("T:3")),
        ]);
        let propagator = Propagator::try_new(Namespace::Gene, &graph, annotations)?;

        assert_eq!(propagator.annotated_item_count(), 2);
        assert_eq!(propagator.annotating_term_count(), 2);
        assert_eq!(propagator.total_annotation_count(), 3);

        assert_eq!(propagator.items_annotated_by(&term("T:4"), false).len(), 1);
        assert_eq!(propagator.items_annotated_by(&term("T:2"), false).len(), 0);
        assert_eq!(propagator.items_annotated_by(&term("T:2"), true).len(), 2);
        assert_eq!(propagator.items_annotated_by(&term("T:1"), true).len(), 2);

        let (study, _) = propagator.study_set("study", HashSet::from([gene("G2")]));
        assert_eq!(study.name(), "study");
        assert_eq!(study.len(), 1);
        assert_eq!(study.annotated_item_count(), 1);

        Ok(())
    }
}
