//! `isopret` is a crate for interpreting differential expression and
//! differential splicing results from RNA-seq experiments.
//!
//! The crate provides three main facilities:
//!
//! - Calibrating significance cutoffs, either by Bayesian false discovery rate
//!   control over posterior error probabilities or by a fixed threshold.
//! - Propagating gene and transcript annotations through an ontology so that
//!   term enrichment tests see both direct and inherited annotations.
//! - Testing InterPro entries for overrepresentation among the transcripts
//!   that are significant for splicing.
//!
//! ## Reading results
//!
//! Result tables written by HBA-DEALS or edgeR can be read with the
//! [`Reader`] facility. [`Reader::results()`] collects the rows into one
//! [`GeneResult`](crate::results::GeneResult) per gene, each carrying the
//! results of its transcripts.
//!
//! ## Differential sets
//!
//! A [`differential::Builder`] calibrates a cutoff for each test family
//! (differential gene expression and differential alternative splicing) and
//! splits the results into study and population sets. If a reference
//! [`differential::Catalog`] is supplied, results whose accessions do not
//! resolve are excluded, and the build fails if most of them do not resolve.
//!
//! ## Annotation propagation and domain overrepresentation
//!
//! The study and population sets are handed to an
//! [`ontology::Propagator`] for each namespace to build the propagated
//! [`ontology::StudySet`]s that a [`enrichment::TermEnrichment`] calculator
//! consumes. Independently, [`interpro::Overrepresentation`] tests InterPro
//! entries over the splicing sets.
//!
//! The [`analysis`] module ties these stages together and summarizes a run as
//! an [`analysis::Report`].
//!
//! ```
//! use isopret::analysis::Analysis;
//! use isopret::core::Namespace;
//! use isopret::ontology::AnnotationMap;
//! use isopret::ontology::Propagator;
//! use isopret::ontology::graph;
//!
//! let data = b"Gene\tIsoform\tExplogFC/FC\tP
//! ENSG00000160710\tExpression\t1.5\t0
//! ENSG00000160710\tENST00000368471\t0.56\t0
//! ENSG00000001036\tExpression\t0.9\t0.3
//! ENSG00000001036\tENST00000002165\t0.7\t0.6";
//! let table = isopret::Reader::new(&data[..]).results()?;
//! let mut outcome = Analysis::default().run(table.genes())?;
//!
//! let graph = graph::Builder::default()
//!     .edge("GO:0000002".parse()?, "GO:0000001".parse()?)
//!     .try_build()?;
//! let genes = AnnotationMap::read(&b"ENSG00000160710\tGO:0000002"[..], Namespace::Gene)?;
//! let transcripts = AnnotationMap::read(&b"ENST00000368471\tGO:0000002"[..], Namespace::Transcript)?;
//!
//! let genes = Propagator::try_new(Namespace::Gene, &graph, genes)?;
//! let transcripts = Propagator::try_new(Namespace::Transcript, &graph, transcripts)?;
//!
//! let associations = outcome.propagate(&genes, &transcripts)?;
//! assert_eq!(associations.dge_study().len(), 1);
//! assert_eq!(associations.das_population().len(), 2);
//!
//! println!("{}", outcome.report());
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod analysis;
pub mod calibration;
pub mod core;
pub mod differential;
pub mod enrichment;
pub mod interpro;
pub mod line;
pub mod ontology;
pub mod reader;
pub mod results;
pub mod table;

pub use line::Line;

pub use self::reader::Reader;
