//! A command line front end for `isopret`.
//!
//! ```shell
//! cargo run --release --bin=isopret --features=binaries -- thresholds results.tsv
//! ```

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap_verbosity_flag::Verbosity;
use flate2::read::GzDecoder;
use isopret::analysis::Analysis;
use isopret::analysis::Outcome;
use isopret::calibration::Calibration;
use isopret::calibration::fixed::Threshold;
use isopret::calibration::pep;
use isopret::core::Namespace;
use isopret::differential;
use isopret::differential::Catalog;
use isopret::interpro::Descriptions;
use isopret::interpro::Hits;
use isopret::interpro::overrep::format_p_value;
use isopret::line::Method;
use isopret::ontology::AnnotationMap;
use isopret::ontology::Propagator;
use isopret::ontology::graph;
use isopret::reader::ResultTable;
use tabled::builder::Builder;
use tabled::settings::Alignment;
use tabled::settings::Style;
use tabled::settings::object::Rows;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

/// Opens `path`, decompressing it if it ends in `.gz`.
fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Renders a table with a header row.
fn render(builder: Builder) -> String {
    builder
        .build()
        .with(Style::rounded())
        .modify(Rows::new(1..), Alignment::left())
        .to_string()
}

////////////////////////////////////////////////////////////////////////////////////////
// Shared arguments
////////////////////////////////////////////////////////////////////////////////////////

/// Arguments describing the results and how to split them.
#[derive(Args)]
struct Experiment {
    /// The HBA-DEALS or edgeR result table.
    results: PathBuf,

    /// The target Bayesian false discovery rate.
    #[arg(long, default_value_t = pep::DEFAULT_TARGET_FDR)]
    fdr: f64,

    /// Use a fixed cutoff instead of Bayesian calibration. edgeR results
    /// always use a fixed cutoff (0.05 unless given).
    #[arg(long)]
    fixed: Option<f64>,

    /// A table of `gene<TAB>transcript` accessions to resolve results against.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// The largest fraction of accessions that may fail to resolve.
    #[arg(long, default_value_t = differential::builder::DEFAULT_MAX_UNRESOLVED_FRACTION)]
    max_unresolved: f64,
}

impl Experiment {
    /// Reads the result table.
    fn read(&self) -> Result<ResultTable> {
        isopret::Reader::new(open(&self.results)?)
            .results()
            .with_context(|| format!("reading results from {}", self.results.display()))
    }

    /// Configures the differential set builder for results of `method`.
    fn builder(&self, method: Method) -> Result<differential::Builder> {
        let calibration: Calibration = match (self.fixed, method) {
            (Some(cutoff), _) => Threshold::try_new(cutoff)?.into(),
            (None, Method::EdgeR) => Threshold::default().into(),
            (None, Method::HbaDeals) => pep::Calibrator::try_new(self.fdr)?.into(),
        };

        let mut builder = differential::Builder::default()
            .calibration(calibration)
            .max_unresolved_fraction(self.max_unresolved)?;

        if let Some(path) = &self.catalog {
            let catalog = Catalog::read(open(path)?)
                .with_context(|| format!("reading catalog from {}", path.display()))?;
            builder = builder.catalog(catalog);
        }

        Ok(builder)
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Commands
////////////////////////////////////////////////////////////////////////////////////////

/// Interprets differential expression and splicing results.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// The subcommand.
    #[command(subcommand)]
    command: Command,

    /// The verbosity.
    #[command(flatten)]
    verbose: Verbosity,
}

/// A subcommand.
#[derive(Subcommand)]
enum Command {
    /// Calibrates the cutoffs and reports the study and population sets.
    Thresholds {
        /// The experiment.
        #[command(flatten)]
        experiment: Experiment,
    },

    /// Tests InterPro entries for overrepresentation among the transcripts
    /// that are significant for splicing.
    Interpro {
        /// The experiment.
        #[command(flatten)]
        experiment: Experiment,

        /// The `transcript<TAB>gene<TAB>accession<TAB>start<TAB>end` hit table.
        #[arg(long)]
        hits: PathBuf,

        /// The `accession<TAB>type<TAB>description` table.
        #[arg(long)]
        descriptions: PathBuf,
    },

    /// Propagates ontology annotations over the study and population sets.
    Propagate {
        /// The experiment.
        #[command(flatten)]
        experiment: Experiment,

        /// The `child<TAB>parent` term table.
        #[arg(long)]
        edges: PathBuf,

        /// The `alternate<TAB>primary` term table.
        #[arg(long)]
        aliases: Option<PathBuf>,

        /// The `gene<TAB>term` annotation table.
        #[arg(long)]
        gene_annotations: PathBuf,

        /// The `transcript<TAB>term` annotation table.
        #[arg(long)]
        transcript_annotations: PathBuf,
    },
}

/// Prints the cutoffs and set sizes.
fn thresholds(experiment: &Experiment) -> Result<Outcome> {
    let table = experiment.read()?;
    let outcome = Analysis::default()
        .sets(experiment.builder(table.method())?)
        .run(table.genes())?;

    let sets = outcome.sets();

    let mut builder = Builder::default();
    builder.push_record(["Family", "Cutoff", "Study", "Population"]);
    builder.push_record([
        String::from("DGE"),
        sets.expression_cutoff().to_string(),
        sets.dge().study().len().to_string(),
        sets.dge().population().len().to_string(),
    ]);
    builder.push_record([
        String::from("DAS"),
        sets.splicing_cutoff().to_string(),
        sets.das().study().len().to_string(),
        sets.das().population().len().to_string(),
    ]);

    println!("{}", render(builder));
    Ok(outcome)
}

/// Prints the InterPro overrepresentation table.
fn interpro(experiment: &Experiment, hits: &Path, descriptions: &Path) -> Result<Outcome> {
    let table = experiment.read()?;

    let hits = Hits::read(open(hits)?)
        .with_context(|| format!("reading InterPro hits from {}", hits.display()))?;
    let descriptions = Descriptions::read(open(descriptions)?).with_context(|| {
        format!(
            "reading InterPro descriptions from {}",
            descriptions.display()
        )
    })?;

    let outcome = Analysis::default()
        .sets(experiment.builder(table.method())?)
        .interpro(&hits, &descriptions)
        .run(table.genes())?;

    let mut builder = Builder::default();
    builder.push_record([
        "Accession",
        "Type",
        "Description",
        "Study",
        "Population",
        "p",
        "Adjusted p",
    ]);

    for result in outcome
        .overrepresentation()
        .map(|o| o.results())
        .unwrap_or_default()
    {
        builder.push_record([
            result.entry().id().to_string(),
            result.entry().entry_type().to_string(),
            result.entry().description().to_string(),
            result.study_counts(),
            result.population_counts(),
            format_p_value(result.raw_p()),
            format_p_value(result.corrected_p()),
        ]);
    }

    println!("{}", render(builder));
    Ok(outcome)
}

/// Prints the direct and total annotation counts of each term.
fn propagate(
    experiment: &Experiment,
    edges: &Path,
    aliases: Option<&Path>,
    gene_annotations: &Path,
    transcript_annotations: &Path,
) -> Result<Outcome> {
    let table = experiment.read()?;

    let mut graph = graph::Builder::default()
        .read_edges(open(edges)?)
        .with_context(|| format!("reading ontology edges from {}", edges.display()))?;

    if let Some(aliases) = aliases {
        graph = graph
            .read_alternates(open(aliases)?)
            .with_context(|| format!("reading ontology aliases from {}", aliases.display()))?;
    }

    let graph = graph.try_build().context("building the ontology")?;
    info!("loaded {} ontology terms", graph.len());

    let genes = AnnotationMap::read(open(gene_annotations)?, Namespace::Gene).with_context(|| {
        format!(
            "reading gene annotations from {}",
            gene_annotations.display()
        )
    })?;
    let transcripts = AnnotationMap::read(open(transcript_annotations)?, Namespace::Transcript)
        .with_context(|| {
            format!(
                "reading transcript annotations from {}",
                transcript_annotations.display()
            )
        })?;

    let genes = Propagator::try_new(Namespace::Gene, &graph, genes)?;
    let transcripts = Propagator::try_new(Namespace::Transcript, &graph, transcripts)?;

    let mut outcome = Analysis::default()
        .sets(experiment.builder(table.method())?)
        .run(table.genes())?;
    let associations = outcome.propagate(&genes, &transcripts)?;

    let sets = [
        associations.dge_study(),
        associations.dge_population(),
        associations.das_study(),
        associations.das_population(),
    ];

    let mut terms = sets
        .iter()
        .flat_map(|set| set.annotations().keys())
        .collect::<Vec<_>>();
    terms.sort();
    terms.dedup();

    let mut builder = Builder::default();
    builder.push_record([
        String::from("Term"),
        sets[0].name().to_string(),
        sets[1].name().to_string(),
        sets[2].name().to_string(),
        sets[3].name().to_string(),
    ]);

    for term in terms {
        let mut record = vec![term.to_string()];

        for set in &sets {
            record.push(
                set.annotations()
                    .get(term)
                    .map(|counts| format!("{}/{}", counts.direct().len(), counts.total_count()))
                    .unwrap_or_else(|| String::from("0/0")),
            );
        }

        builder.push_record(record);
    }

    println!("{}", render(builder));
    Ok(outcome)
}

////////////////////////////////////////////////////////////////////////////////////////
// Main
////////////////////////////////////////////////////////////////////////////////////////

fn main() -> Result<()> {
    let cli = Cli::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(cli.verbose.log_level_filter().as_trace())
            .init(),
    };

    let outcome = match &cli.command {
        Command::Thresholds { experiment } => thresholds(experiment)?,
        Command::Interpro {
            experiment,
            hits,
            descriptions,
        } => interpro(experiment, hits, descriptions)?,
        Command::Propagate {
            experiment,
            edges,
            aliases,
            gene_annotations,
            transcript_annotations,
        } => propagate(
            experiment,
            edges,
            aliases.as_deref(),
            gene_annotations,
            transcript_annotations,
        )?,
    };

    print!("{}", outcome.report());

    Ok(())
}
