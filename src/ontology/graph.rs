//! An in-memory ontology graph.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::HashSet;
use std::io::BufRead;

use tracing::debug;

use crate::core::TermId;
use crate::ontology::Ontology;
use crate::table;

/// An error related to building a [`Graph`].
#[derive(Debug)]
pub enum Error {
    /// The parent edges contain a cycle through the term.
    Cycle(TermId),

    /// An alternate identifier points to a term that is not in the graph.
    UnknownPrimary {
        /// The alternate identifier.
        alternate: TermId,

        /// The missing primary identifier.
        primary: TermId,
    },

    /// An alternate identifier is also used as a primary term.
    AlternateIsPrimary(TermId),

    /// A table could not be read.
    Table(table::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Cycle(term) => write!(f, "cycle detected through term {term}"),
            Error::UnknownPrimary { alternate, primary } => write!(
                f,
                "alternate id {alternate} points to unknown primary term {primary}"
            ),
            Error::AlternateIsPrimary(term) => {
                write!(f, "alternate id {term} is also a primary term")
            }
            Error::Table(err) => write!(f, "table error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// An in-memory ontology with a precomputed ancestor closure.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    /// The primary terms.
    terms: HashSet<TermId>,

    /// Alternate identifiers mapped to their primary terms.
    alternates: HashMap<TermId, TermId>,

    /// The proper ancestors of every primary term.
    ancestors: HashMap<TermId, HashSet<TermId>>,
}

impl Graph {
    /// Gets the number of primary terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the graph has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns an iterator over the primary terms.
    pub fn terms(&self) -> impl Iterator<Item = &TermId> {
        self.terms.iter()
    }
}

impl Ontology for Graph {
    fn contains_term(&self, term: &TermId) -> bool {
        self.terms.contains(term) || self.alternates.contains_key(term)
    }

    fn primary_term_id(&self, term: &TermId) -> Option<TermId> {
        if self.terms.contains(term) {
            return Some(term.clone());
        }

        self.alternates.get(term).cloned()
    }

    fn ancestors_of(&self, term: &TermId) -> Cow<'_, HashSet<TermId>> {
        let primary = self.alternates.get(term).unwrap_or(term);

        match self.ancestors.get(primary) {
            Some(ancestors) => Cow::Borrowed(ancestors),
            None => Cow::Owned(HashSet::new()),
        }
    }
}

/// A builder for a [`Graph`].
#[derive(Debug, Default)]
pub struct Builder {
    /// The primary terms.
    terms: HashSet<TermId>,

    /// The direct parents of each term.
    parents: HashMap<TermId, HashSet<TermId>>,

    /// Alternate identifiers mapped to their primary terms.
    alternates: HashMap<TermId, TermId>,
}

impl Builder {
    /// Adds a term without any parents.
    pub fn term(mut self, term: TermId) -> Self {
        self.terms.insert(term);
        self
    }

    /// Adds an `is_a` (or other hierarchical) edge from `child` to `parent`.
    /// Both terms are added to the graph.
    pub fn edge(mut self, child: TermId, parent: TermId) -> Self {
        self.terms.insert(child.clone());
        self.terms.insert(parent.clone());
        self.parents.entry(child).or_default().insert(parent);
        self
    }

    /// Adds an alternate identifier for `primary`.
    pub fn alternate(mut self, alternate: TermId, primary: TermId) -> Self {
        self.alternates.insert(alternate, primary);
        self
    }

    /// Reads `child<TAB>parent` edge records.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::TermId;
    /// use isopret::ontology::Ontology as _;
    /// use isopret::ontology::graph::Builder;
    ///
    /// let edges = b"GO:0000003\tGO:0000002\nGO:0000002\tGO:0000001\n";
    /// let graph = Builder::default().read_edges(&edges[..])?.try_build()?;
    ///
    /// let ancestors = graph.ancestors_of(&"GO:0000003".parse::<TermId>()?);
    /// assert_eq!(ancestors.len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read_edges<T>(mut self, reader: T) -> Result<Self>
    where
        T: BufRead,
    {
        table::for_each_record(reader, 2, |_, fields| {
            let child = fields[0].parse::<TermId>()?;
            let parent = fields[1].parse::<TermId>()?;
            self.terms.insert(child.clone());
            self.terms.insert(parent.clone());
            self.parents.entry(child).or_default().insert(parent);
            Ok(())
        })
        .map_err(Error::Table)?;

        Ok(self)
    }

    /// Reads `alternate<TAB>primary` records.
    pub fn read_alternates<T>(mut self, reader: T) -> Result<Self>
    where
        T: BufRead,
    {
        table::for_each_record(reader, 2, |_, fields| {
            let alternate = fields[0].parse::<TermId>()?;
            let primary = fields[1].parse::<TermId>()?;
            self.alternates.insert(alternate, primary);
            Ok(())
        })
        .map_err(Error::Table)?;

        Ok(self)
    }

    /// Consumes `self` to attempt to build a [`Graph`].
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::TermId;
    /// use isopret::ontology::Ontology as _;
    /// use isopret::ontology::graph::Builder;
    ///
    /// let root = "GO:0008150".parse::<TermId>()?;
    /// let child = "GO:0009987".parse::<TermId>()?;
    /// let alternate = "GO:0008151".parse::<TermId>()?;
    ///
    /// let graph = Builder::default()
    ///     .edge(child.clone(), root.clone())
    ///     .alternate(alternate.clone(), child.clone())
    ///     .try_build()?;
    ///
    /// assert!(graph.contains_term(&alternate));
    /// assert_eq!(graph.primary_term_id(&alternate), Some(child.clone()));
    /// assert!(graph.ancestors_of(&child).contains(&root));
    /// assert!(graph.ancestors_of(&root).is_empty());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build(self) -> Result<Graph> {
        for (alternate, primary) in &self.alternates {
            if self.terms.contains(alternate) {
                return Err(Error::AlternateIsPrimary(alternate.clone()));
            }

            if !self.terms.contains(primary) {
                return Err(Error::UnknownPrimary {
                    alternate: alternate.clone(),
                    primary: primary.clone(),
                });
            }
        }

        let mut ancestors = HashMap::with_capacity(self.terms.len());
        let mut visiting = HashSet::new();

        for term in &self.terms {
            close(term, &self.parents, &mut ancestors, &mut visiting)?;
        }

        debug!(
            "built an ontology graph with {} terms and {} alternate ids",
            self.terms.len(),
            self.alternates.len()
        );

        Ok(Graph {
            terms: self.terms,
            alternates: self.alternates,
            ancestors,
        })
    }
}

/// Computes the proper ancestors of `term`, memoizing into `done`.
fn close(
    term: &TermId,
    parents: &HashMap<TermId, HashSet<TermId>>,
    done: &mut HashMap<TermId, HashSet<TermId>>,
    visiting: &mut HashSet<TermId>,
) -> Result<()> {
    if done.contains_key(term) {
        return Ok(());
    }

    if !visiting.insert(term.clone()) {
        return Err(Error::Cycle(term.clone()));
    }

    let mut closure = HashSet::new();

    if let Some(direct) = parents.get(term) {
        for parent in direct {
            close(parent, parents, done, visiting)?;

            closure.insert(parent.clone());
            if let Some(inherited) = done.get(parent) {
                closure.extend(inherited.iter().cloned());
            }
        }
    }

    visiting.remove(term);
    done.insert(term.clone(), closure);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> TermId {
        s.parse().unwrap()
    }

    #[test]
    fn it_closes_over_diamonds() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let graph = Builder::default()
            .edge(term("T:4"), term("T:2"))
            .edge(term("T:4"), term("T:3"))
            .edge(term("T:2"), term("T:1"))
            .edge(term("T:3"), term("T:1"))
            .term(term("T:5"))
            .try_build()?;

        let ancestors = graph.ancestors_of(&term("T:4"));
        assert_eq!(
            *ancestors,
            HashSet::from([term("T:1"), term("T:2"), term("T:3")])
        );
        assert!(!ancestors.contains(&term("T:4")));
        assert!(graph.ancestors_of(&term("T:5")).is_empty());
        assert!(graph.ancestors_of(&term("T:99")).is_empty());
        assert_eq!(graph.len(), 5);

        Ok(())
    }

    #[test]
    fn it_rejects_cycles() {
        let err = Builder::default()
            .edge(term("T:1"), term("T:2"))
            .edge(term("T:2"), term("T:1"))
            .try_build()
            .unwrap_err();
        assert!(matches!(err, Error::Cycle(_)));

        let err = Builder::default()
            .edge(term("T:1"), term("T:1"))
            .try_build()
            .unwrap_err();
        assert_eq!(err.to_string(), "cycle detected through term T:1");
    }

    #[test]
    fn it_validates_alternates() {
        let err = Builder::default()
            .term(term("T:1"))
            .alternate(term("T:2"), term("T:3"))
            .try_build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "alternate id T:2 points to unknown primary term T:3"
        );

        let err = Builder::default()
            .term(term("T:1"))
            .term(term("T:2"))
            .alternate(term("T:2"), term("T:1"))
            .try_build()
            .unwrap_err();
        assert!(matches!(err, Error::AlternateIsPrimary(_)));
    }

    #[test]
    fn unknown_terms_do_not_resolve() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let graph = Builder::default().term(term("T:1")).try_build()?;
        assert!(!graph.contains_term(&term("T:2")));
        assert_eq!(graph.primary_term_id(&term("T:2")), None);
        Ok(())
    }

    #[test]
    fn it_reads_alternates() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let graph = Builder::default()
            .read_edges(&b"T:2\tT:1\n"[..])?
            .read_alternates(&b"T:3\tT:2\n"[..])?
            .try_build()?;

        assert_eq!(graph.primary_term_id(&term("T:3")), Some(term("T:2")));
        assert!(graph.ancestors_of(&term("T:3")).contains(&term("T:1")));

        Ok(())
    }
}
