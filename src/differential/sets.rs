//! Study and population sets for both test families.

use std::collections::HashSet;

use tracing::debug;

use crate::calibration::Calibration;
use crate::calibration::Cutoff;
use crate::core::Accession;
use crate::core::Namespace;
use crate::differential::Error;
use crate::ontology::Drift;
use crate::ontology::Ontology;
use crate::ontology::Propagator;
use crate::ontology::StudySet;

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// The population of one test family and the study subset of it that passed
/// the family's cutoff.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    /// The namespace of the items.
    namespace: Namespace,

    /// Every observed item.
    population: HashSet<Accession>,

    /// The items that passed the cutoff.
    study: HashSet<Accession>,
}

impl Partition {
    /// Creates a partition by filtering `items` with `cutoff`.
    ///
    /// The study set is always drawn from the population.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::calibration::Cutoff;
    /// use isopret::core::Accession;
    /// use isopret::core::Namespace;
    /// use isopret::differential::Partition;
    ///
    /// let a = Accession::transcript("ENST00000380152")?;
    /// let b = Accession::transcript("ENST00000544455")?;
    ///
    /// let partition = Partition::from_scored(
    ///     Namespace::Transcript,
    ///     [(&a, 0.01), (&b, 0.6)],
    ///     Cutoff::try_new(0.05)?,
    /// );
    ///
    /// assert_eq!(partition.population().len(), 2);
    /// assert!(partition.study().contains(&a));
    /// assert!(!partition.study().contains(&b));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_scored<'a, I>(namespace: Namespace, items: I, cutoff: Cutoff) -> Self
    where
        I: IntoIterator<Item = (&'a Accession, f64)>,
    {
        let mut population = HashSet::new();
        let mut study = HashSet::new();

        for (accession, p) in items {
            population.insert(accession.clone());

            if cutoff.admits(p) {
                study.insert(accession.clone());
            }
        }

        Self {
            namespace,
            population,
            study,
        }
    }

    /// Gets the namespace of the items.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Gets every observed item.
    pub fn population(&self) -> &HashSet<Accession> {
        &self.population
    }

    /// Gets the items that passed the cutoff.
    pub fn study(&self) -> &HashSet<Accession> {
        &self.study
    }
}

/// How many accessions of one namespace resolved against the reference
/// catalog.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Resolution {
    /// The number of accessions that resolved.
    pub(crate) resolved: usize,

    /// The number of accessions that did not resolve.
    pub(crate) unresolved: usize,
}

impl Resolution {
    /// Gets the number of accessions that resolved.
    pub fn resolved(&self) -> usize {
        self.resolved
    }

    /// Gets the number of accessions that did not resolve.
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    /// Gets the total number of accessions.
    pub fn total(&self) -> usize {
        self.resolved + self.unresolved
    }
}

/// The study and population sets for differential gene expression (DGE) and
/// differential alternative splicing (DAS).
///
/// Use a [`Builder`](crate::differential::Builder) to construct one of these.
#[derive(Clone, Debug, PartialEq)]
pub struct DifferentialSets {
    /// The calibration strategy that produced the cutoffs.
    pub(crate) calibration: Calibration,

    /// The cutoff applied to gene expression.
    pub(crate) expression_cutoff: Cutoff,

    /// The cutoff applied to transcript splicing.
    pub(crate) splicing_cutoff: Cutoff,

    /// The gene expression partition.
    pub(crate) dge: Partition,

    /// The transcript splicing partition.
    pub(crate) das: Partition,

    /// How the gene accessions resolved.
    pub(crate) genes: Resolution,

    /// How the transcript accessions resolved.
    pub(crate) transcripts: Resolution,
}

impl DifferentialSets {
    /// Gets the calibration strategy that produced the cutoffs.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Gets the cutoff applied to gene expression.
    pub fn expression_cutoff(&self) -> Cutoff {
        self.expression_cutoff
    }

    /// Gets the cutoff applied to transcript splicing.
    pub fn splicing_cutoff(&self) -> Cutoff {
        self.splicing_cutoff
    }

    /// Gets the gene expression partition.
    pub fn dge(&self) -> &Partition {
        &self.dge
    }

    /// Gets the transcript splicing partition.
    pub fn das(&self) -> &Partition {
        &self.das
    }

    /// Gets how the gene accessions resolved.
    pub fn genes(&self) -> Resolution {
        self.genes
    }

    /// Gets how the transcript accessions resolved.
    pub fn transcripts(&self) -> Resolution {
        self.transcripts
    }

    /// Builds the gene-level study and population sets through `propagator`.
    pub fn gene_associations<O>(
        &self,
        propagator: &Propagator<'_, O>,
    ) -> Result<(StudySet, StudySet, Drift)>
    where
        O: Ontology,
    {
        associate(&self.dge, propagator, "DGE")
    }

    /// Builds the transcript-level study and population sets through
    /// `propagator`.
    pub fn transcript_associations<O>(
        &self,
        propagator: &Propagator<'_, O>,
    ) -> Result<(StudySet, StudySet, Drift)>
    where
        O: Ontology,
    {
        associate(&self.das, propagator, "DAS")
    }

    /// Builds both the gene-level and the transcript-level study and
    /// population sets.
    ///
    /// The two propagators must index genes and transcripts respectively.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Namespace;
    /// use isopret::differential::Builder;
    /// use isopret::ontology::AnnotationMap;
    /// use isopret::ontology::Propagator;
    /// use isopret::ontology::graph;
    ///
    /// let data = b"Gene\tIsoform\tExplogFC/FC\tP
    /// ENSG00000160710\tExpression\t1.5\t0
    /// ENSG00000160710\tENST00000368471\t0.56\t0";
    /// let table = isopret::Reader::new(&data[..]).results()?;
    /// let sets = Builder::default().try_build_from(table.genes())?;
    ///
    /// let graph = graph::Builder::default()
    ///     .edge("GO:0000002".parse()?, "GO:0000001".parse()?)
    ///     .try_build()?;
    ///
    /// let genes = AnnotationMap::read(&b"ENSG00000160710\tGO:0000002"[..], Namespace::Gene)?;
    /// let transcripts =
    ///     AnnotationMap::read(&b"ENST00000368471\tGO:0000002"[..], Namespace::Transcript)?;
    ///
    /// let genes = Propagator::try_new(Namespace::Gene, &graph, genes)?;
    /// let transcripts = Propagator::try_new(Namespace::Transcript, &graph, transcripts)?;
    ///
    /// let associations = sets.associations(&genes, &transcripts)?;
    /// assert_eq!(associations.dge_study().len(), 1);
    /// assert_eq!(associations.das_population().annotations().len(), 2);
    ///
    /// assert!(sets.associations(&transcripts, &genes).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn associations<G, T>(
        &self,
        genes: &Propagator<'_, G>,
        transcripts: &Propagator<'_, T>,
    ) -> Result<Associations>
    where
        G: Ontology,
        T: Ontology,
    {
        let (dge_study, dge_population, gene_drift) = self.gene_associations(genes)?;
        let (das_study, das_population, transcript_drift) =
            self.transcript_associations(transcripts)?;

        Ok(Associations {
            dge_study,
            dge_population,
            das_study,
            das_population,
            gene_drift,
            transcript_drift,
        })
    }
}

/// Builds the study and population sets of `partition`.
fn associate<O>(
    partition: &Partition,
    propagator: &Propagator<'_, O>,
    family: &str,
) -> Result<(StudySet, StudySet, Drift)>
where
    O: Ontology,
{
    if propagator.namespace() != partition.namespace {
        return Err(Error::PropagatorNamespace {
            expected: partition.namespace,
            found: propagator.namespace(),
        });
    }

    let (study, mut drift) =
        propagator.study_set(format!("{family} study"), partition.study.clone());
    let (population, population_drift) =
        propagator.study_set(format!("{family} population"), partition.population.clone());
    drift += population_drift;

    debug!(
        "{family}: {} of {} study items and {} of {} population items are annotated",
        study.annotated_item_count(),
        study.len(),
        population.annotated_item_count(),
        population.len()
    );

    Ok((study, population, drift))
}

/// The propagated study and population sets for both test families, ready for
/// term enrichment testing.
#[derive(Clone, Debug, PartialEq)]
pub struct Associations {
    /// The gene expression study set.
    dge_study: StudySet,

    /// The gene expression population set.
    dge_population: StudySet,

    /// The transcript splicing study set.
    das_study: StudySet,

    /// The transcript splicing population set.
    das_population: StudySet,

    /// The drift accumulated while propagating gene annotations.
    gene_drift: Drift,

    /// The drift accumulated while propagating transcript annotations.
    transcript_drift: Drift,
}

impl Associations {
    /// Gets the gene expression study set.
    pub fn dge_study(&self) -> &StudySet {
        &self.dge_study
    }

    /// Gets the gene expression population set.
    pub fn dge_population(&self) -> &StudySet {
        &self.dge_population
    }

    /// Gets the transcript splicing study set.
    pub fn das_study(&self) -> &StudySet {
        &self.das_study
    }

    /// Gets the transcript splicing population set.
    pub fn das_population(&self) -> &StudySet {
        &self.das_population
    }

    /// Gets the drift accumulated while propagating gene annotations.
    pub fn gene_drift(&self) -> Drift {
        self.gene_drift
    }

    /// Gets the drift accumulated while propagating transcript annotations.
    pub fn transcript_drift(&self) -> Drift {
        self.transcript_drift
    }
}
