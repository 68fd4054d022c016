//! The end-to-end analysis of one experiment.
//!
//! An [`Analysis`] calibrates the cutoffs, splits the results into study and
//! population sets, and optionally tests InterPro entries for
//! overrepresentation. The returned [`Outcome`] can then propagate ontology
//! annotations for term enrichment and summarizes the run as a [`Report`].
//!
//! ```
//! use isopret::analysis::Analysis;
//!
//! let data = b"Gene\tIsoform\tExplogFC/FC\tP
//! ENSG00000160710\tExpression\t1.5\t0
//! ENSG00000160710\tENST00000368471\t0.56\t0.001
//! ENSG00000160710\tENST00000368474\t1.2\t0.4
//! ENSG00000001036\tExpression\t0.9\t0.3";
//! let table = isopret::Reader::new(&data[..]).results()?;
//!
//! let outcome = Analysis::default().run(table.genes())?;
//! let report = outcome.report();
//!
//! assert_eq!(report.dge_study_size(), 1);
//! assert_eq!(report.das_population_size(), 2);
//! assert!(report.to_string().starts_with("calibration\tbayesian\n"));
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod report;

use std::collections::HashMap;

pub use report::Report;

use crate::core::Accession;
use crate::differential;
use crate::differential::Associations;
use crate::differential::DifferentialSets;
use crate::enrichment::Correction;
use crate::enrichment::TermEnrichment;
use crate::enrichment::TermEnrichmentResult;
use crate::interpro::AnnotatedGene;
use crate::interpro::Descriptions;
use crate::interpro::Hits;
use crate::interpro::Overrepresentation;
use crate::ontology::Ontology;
use crate::ontology::Propagator;
use crate::results::GeneResult;

/// A [`Result`](std::result::Result) with a [`differential::Error`].
type Result<T> = std::result::Result<T, differential::Error>;

/// The configuration of an analysis run.
#[derive(Debug, Default)]
pub struct Analysis<'a> {
    /// The builder for the differential sets.
    sets: differential::Builder,

    /// The InterPro reference data, if domains should be tested.
    interpro: Option<(&'a Hits, &'a Descriptions)>,
}

impl<'a> Analysis<'a> {
    /// Sets the builder used to calibrate and split the results.
    pub fn sets(mut self, builder: differential::Builder) -> Self {
        self.sets = builder;
        self
    }

    /// Enables InterPro overrepresentation with `hits` and `descriptions`.
    pub fn interpro(mut self, hits: &'a Hits, descriptions: &'a Descriptions) -> Self {
        self.interpro = Some((hits, descriptions));
        self
    }

    /// Runs the analysis over `results`.
    ///
    /// The InterPro test runs over the same splicing study and population
    /// sets as term enrichment, so accessions that did not resolve against
    /// the reference catalog take no part in it.
    pub fn run(&self, results: &HashMap<Accession, GeneResult>) -> Result<Outcome> {
        let sets = self.sets.try_build_from(results)?;

        let overrepresentation = self.interpro.map(|(hits, descriptions)| {
            let genes = results
                .values()
                .filter(|result| sets.dge().population().contains(result.accession()))
                .map(|result| AnnotatedGene::new(result, hits))
                .collect::<Vec<_>>();

            Overrepresentation::compute(&genes, sets.das(), descriptions)
        });

        Ok(Outcome {
            sets,
            associations: None,
            overrepresentation,
        })
    }
}

/// The outcome of an analysis run.
#[derive(Clone, Debug)]
pub struct Outcome {
    /// The study and population sets.
    sets: DifferentialSets,

    /// The propagated study and population sets, once computed.
    associations: Option<Associations>,

    /// The InterPro overrepresentation results, if requested.
    overrepresentation: Option<Overrepresentation>,
}

impl Outcome {
    /// Gets the study and population sets.
    pub fn sets(&self) -> &DifferentialSets {
        &self.sets
    }

    /// Gets the propagated study and population sets, if
    /// [`propagate`](Self::propagate) was called.
    pub fn associations(&self) -> Option<&Associations> {
        self.associations.as_ref()
    }

    /// Gets the InterPro overrepresentation results, if requested.
    pub fn overrepresentation(&self) -> Option<&Overrepresentation> {
        self.overrepresentation.as_ref()
    }

    /// Propagates the annotations of the gene and transcript study and
    /// population sets.
    pub fn propagate<G, T>(
        &mut self,
        genes: &Propagator<'_, G>,
        transcripts: &Propagator<'_, T>,
    ) -> Result<&Associations>
    where
        G: Ontology,
        T: Ontology,
    {
        let associations = self.sets.associations(genes, transcripts)?;
        Ok(&*self.associations.insert(associations))
    }

    /// Summarizes the run.
    pub fn report(&self) -> Report {
        let calibration = self.sets.calibration();

        Report {
            calibration: calibration.name(),
            target_fdr: calibration.target_fdr(),
            expression_cutoff: self.sets.expression_cutoff(),
            splicing_cutoff: self.sets.splicing_cutoff(),
            genes: self.sets.genes(),
            transcripts: self.sets.transcripts(),
            dge: (
                self.sets.dge().study().len(),
                self.sets.dge().population().len(),
            ),
            das: (
                self.sets.das().study().len(),
                self.sets.das().population().len(),
            ),
            drift: self
                .associations
                .as_ref()
                .map(|a| (a.gene_drift(), a.transcript_drift())),
            interpro_tests: self
                .overrepresentation
                .as_ref()
                .map(|o| o.effective_tests()),
        }
    }
}

/// The term enrichment results for both test families.
#[derive(Clone, Debug, PartialEq)]
pub struct GoEnrichment {
    /// The gene expression results, ordered by adjusted p-value.
    dge: Vec<TermEnrichmentResult>,

    /// The transcript splicing results, ordered by adjusted p-value.
    das: Vec<TermEnrichmentResult>,
}

impl GoEnrichment {
    /// Gets the gene expression results, ordered by adjusted p-value.
    pub fn dge(&self) -> &[TermEnrichmentResult] {
        &self.dge
    }

    /// Gets the transcript splicing results, ordered by adjusted p-value.
    pub fn das(&self) -> &[TermEnrichmentResult] {
        &self.das
    }
}

/// Runs `calculator` over the gene expression and transcript splicing sets in
/// `associations`.
pub fn go_enrichment<C, O>(
    calculator: &C,
    ontology: &O,
    associations: &Associations,
    correction: Correction,
) -> std::result::Result<GoEnrichment, C::Error>
where
    C: TermEnrichment,
    O: Ontology,
{
    let mut dge = calculator.calculate(
        ontology,
        associations.dge_population(),
        associations.dge_study(),
        correction,
    )?;
    let mut das = calculator.calculate(
        ontology,
        associations.das_population(),
        associations.das_study(),
        correction,
    )?;

    sort_by_adjusted_p(&mut dge);
    sort_by_adjusted_p(&mut das);

    Ok(GoEnrichment { dge, das })
}

/// Orders `results` by adjusted p-value, breaking ties by term.
fn sort_by_adjusted_p(results: &mut [TermEnrichmentResult]) {
    results.sort_by(|a, b| {
        a.adjusted_p()
            .total_cmp(&b.adjusted_p())
            .then_with(|| a.term().cmp(b.term()))
    });
}
