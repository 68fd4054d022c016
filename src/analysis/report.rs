//! A summary of an analysis run.

use crate::calibration::Cutoff;
use crate::differential::Resolution;
use crate::ontology::Drift;

/// The summary statistics of an analysis run.
///
/// The [`Display`](std::fmt::Display) implementation renders one
/// `key<TAB>value` line per statistic. Statistics for stages that did not run
/// are omitted.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// The name of the calibration strategy.
    pub(crate) calibration: &'static str,

    /// The target false discovery rate, if calibration was Bayesian.
    pub(crate) target_fdr: Option<f64>,

    /// The cutoff applied to gene expression.
    pub(crate) expression_cutoff: Cutoff,

    /// The cutoff applied to transcript splicing.
    pub(crate) splicing_cutoff: Cutoff,

    /// How the gene accessions resolved.
    pub(crate) genes: Resolution,

    /// How the transcript accessions resolved.
    pub(crate) transcripts: Resolution,

    /// The sizes of the DGE study and population sets.
    pub(crate) dge: (usize, usize),

    /// The sizes of the DAS study and population sets.
    pub(crate) das: (usize, usize),

    /// The drift of gene and transcript annotation propagation.
    pub(crate) drift: Option<(Drift, Drift)>,

    /// The number of InterPro entries tested.
    pub(crate) interpro_tests: Option<usize>,
}

impl Report {
    /// Gets the name of the calibration strategy.
    pub fn calibration(&self) -> &'static str {
        self.calibration
    }

    /// Gets the target false discovery rate, if calibration was Bayesian.
    pub fn target_fdr(&self) -> Option<f64> {
        self.target_fdr
    }

    /// Gets the cutoff applied to gene expression.
    pub fn expression_cutoff(&self) -> Cutoff {
        self.expression_cutoff
    }

    /// Gets the cutoff applied to transcript splicing.
    pub fn splicing_cutoff(&self) -> Cutoff {
        self.splicing_cutoff
    }

    /// Gets how the gene accessions resolved.
    pub fn genes(&self) -> Resolution {
        self.genes
    }

    /// Gets how the transcript accessions resolved.
    pub fn transcripts(&self) -> Resolution {
        self.transcripts
    }

    /// Gets the number of differentially expressed genes.
    pub fn dge_study_size(&self) -> usize {
        self.dge.0
    }

    /// Gets the number of expressed genes.
    pub fn dge_population_size(&self) -> usize {
        self.dge.1
    }

    /// Gets the number of differentially spliced transcripts.
    pub fn das_study_size(&self) -> usize {
        self.das.0
    }

    /// Gets the number of expressed transcripts.
    pub fn das_population_size(&self) -> usize {
        self.das.1
    }

    /// Gets the drift of gene annotation propagation, if it ran.
    pub fn gene_drift(&self) -> Option<Drift> {
        self.drift.map(|(genes, _)| genes)
    }

    /// Gets the drift of transcript annotation propagation, if it ran.
    pub fn transcript_drift(&self) -> Option<Drift> {
        self.drift.map(|(_, transcripts)| transcripts)
    }

    /// Gets the number of InterPro entries tested, if overrepresentation ran.
    pub fn interpro_tests(&self) -> Option<usize> {
        self.interpro_tests
    }

    /// Gets the statistics as key-value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![("calibration", self.calibration.to_string())];

        if let Some(target) = self.target_fdr {
            entries.push(("target_fdr", target.to_string()));
        }

        entries.extend([
            ("expression_cutoff", self.expression_cutoff.to_string()),
            ("splicing_cutoff", self.splicing_cutoff.to_string()),
            ("genes_resolved", self.genes.resolved().to_string()),
            ("genes_unresolved", self.genes.unresolved().to_string()),
            ("transcripts_resolved", self.transcripts.resolved().to_string()),
            ("transcripts_unresolved", self.transcripts.unresolved().to_string()),
            ("dge_study", self.dge.0.to_string()),
            ("dge_population", self.dge.1.to_string()),
            ("das_study", self.das.0.to_string()),
            ("das_population", self.das.1.to_string()),
        ]);

        if let Some((genes, transcripts)) = self.drift {
            entries.extend([
                ("gene_items_not_found", genes.items_not_found().to_string()),
                ("gene_terms_not_found", genes.terms_not_found().to_string()),
                (
                    "transcript_items_not_found",
                    transcripts.items_not_found().to_string(),
                ),
                (
                    "transcript_terms_not_found",
                    transcripts.terms_not_found().to_string(),
                ),
            ]);
        }

        if let Some(tests) = self.interpro_tests {
            entries.push(("interpro_tests", tests.to_string()));
        }

        entries
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, value) in self.entries() {
            writeln!(f, "{key}\t{value}")?;
        }

        Ok(())
    }
}
