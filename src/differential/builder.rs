//! A builder for [`DifferentialSets`].

use std::collections::HashMap;

use tracing::info;
use tracing::warn;

use crate::calibration::Calibrate as _;
use crate::calibration::Calibration;
use crate::calibration::ScoreSet;
use crate::core::Accession;
use crate::core::Namespace;
use crate::differential::Catalog;
use crate::differential::DifferentialSets;
use crate::differential::Error;
use crate::differential::Partition;
use crate::differential::Resolution;
use crate::results::GeneResult;

/// The default largest fraction of accessions that may fail to resolve.
pub const DEFAULT_MAX_UNRESOLVED_FRACTION: f64 = 0.5;

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for [`DifferentialSets`].
#[derive(Debug)]
pub struct Builder {
    /// The calibration strategy.
    calibration: Calibration,

    /// The reference catalog, if results should be resolved against one.
    catalog: Option<Catalog>,

    /// The largest fraction of accessions (per namespace) that may fail to
    /// resolve before the build is aborted.
    max_unresolved_fraction: f64,
}

impl Builder {
    /// Sets the calibration strategy for the [`Builder`].
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::calibration::fixed::Threshold;
    /// use isopret::differential::Builder;
    ///
    /// let builder = Builder::default().calibration(Threshold::try_new(0.05)?);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn calibration(mut self, calibration: impl Into<Calibration>) -> Self {
        self.calibration = calibration.into();
        self
    }

    /// Sets the reference catalog for the [`Builder`].
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the largest fraction of accessions that may fail to resolve.
    pub fn max_unresolved_fraction(mut self, fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::InvalidFraction(fraction));
        }

        self.max_unresolved_fraction = fraction;
        Ok(self)
    }

    /// Builds the [`DifferentialSets`] for `results`.
    ///
    /// Accessions that the catalog does not know are excluded (as are the
    /// transcripts of excluded genes). If, for either namespace, the excluded
    /// accessions make up more than the allowed fraction, the build fails
    /// with [`Error::IdentifierMapping`]. Calibration only considers the
    /// accessions that resolved.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::core::Accession;
    /// use isopret::differential::Builder;
    /// use isopret::differential::Catalog;
    ///
    /// let data = b"Gene\tIsoform\tExplogFC/FC\tP
    /// ENSG00000160710\tExpression\t1.5\t0
    /// ENSG00000001036\tExpression\t0.9\t0.3
    /// ENSG00000001084\tExpression\t0.9\t0.3";
    /// let table = isopret::Reader::new(&data[..]).results()?;
    ///
    /// let catalog = Catalog::from_iter([Accession::gene("ENSG00000160710")?]);
    /// let err = Builder::default()
    ///     .catalog(catalog)
    ///     .try_build_from(table.genes())
    ///     .unwrap_err();
    ///
    /// assert_eq!(
    ///     err.to_string(),
    ///     "could not map most gene accessions (2 unresolved, 1 resolved): the results do not \
    ///      match the reference data"
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build_from(&self, results: &HashMap<Accession, GeneResult>) -> Result<DifferentialSets> {
        let mut genes = Resolution::default();
        let mut transcripts = Resolution::default();
        let mut resolved = Vec::with_capacity(results.len());

        for result in results.values() {
            if !self.resolves(result.accession()) {
                genes.unresolved += 1;
                continue;
            }

            genes.resolved += 1;
            resolved.push(result);

            for transcript in result.transcripts() {
                if self.resolves(transcript.accession()) {
                    transcripts.resolved += 1;
                } else {
                    transcripts.unresolved += 1;
                }
            }
        }

        self.check(Namespace::Gene, genes)?;
        self.check(Namespace::Transcript, transcripts)?;

        let expression_scores = resolved
            .iter()
            .map(|r| r.expression_p())
            .collect::<ScoreSet>();
        let splicing_scores = resolved
            .iter()
            .flat_map(|r| r.transcripts())
            .filter(|t| self.resolves(t.accession()))
            .map(|t| t.p())
            .collect::<ScoreSet>();

        let expression_cutoff = self.calibration.calibrate(expression_scores);
        let splicing_cutoff = self.calibration.calibrate(splicing_scores);

        let dge = Partition::from_scored(
            Namespace::Gene,
            resolved.iter().map(|r| (r.accession(), r.expression_p())),
            expression_cutoff,
        );
        let das = Partition::from_scored(
            Namespace::Transcript,
            resolved
                .iter()
                .flat_map(|r| r.transcripts())
                .filter(|t| self.resolves(t.accession()))
                .map(|t| (t.accession(), t.p())),
            splicing_cutoff,
        );

        info!(
            "{} calibration: expression cutoff {expression_cutoff} ({} of {} genes), splicing \
             cutoff {splicing_cutoff} ({} of {} transcripts)",
            self.calibration.name(),
            dge.study().len(),
            dge.population().len(),
            das.study().len(),
            das.population().len()
        );

        Ok(DifferentialSets {
            calibration: self.calibration.clone(),
            expression_cutoff,
            splicing_cutoff,
            dge,
            das,
            genes,
            transcripts,
        })
    }

    /// Whether `accession` resolves against the catalog (if any).
    fn resolves(&self, accession: &Accession) -> bool {
        self.catalog
            .as_ref()
            .map_or(true, |catalog| catalog.contains(accession))
    }

    /// Fails if too many accessions of `namespace` were unresolved.
    fn check(&self, namespace: Namespace, resolution: Resolution) -> Result<()> {
        if resolution.unresolved == 0 {
            return Ok(());
        }

        let limit = self.max_unresolved_fraction * resolution.total() as f64;
        if resolution.unresolved as f64 > limit {
            return Err(Error::IdentifierMapping {
                namespace,
                resolved: resolution.resolved,
                unresolved: resolution.unresolved,
            });
        }

        warn!(
            "could not resolve {} of {} {namespace} accessions against the catalog",
            resolution.unresolved,
            resolution.total()
        );

        Ok(())
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            catalog: None,
            max_unresolved_fraction: DEFAULT_MAX_UNRESOLVED_FRACTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::fixed::Threshold;
    use crate::calibration::pep::Calibrator;
    use crate::results::gene;
    use crate::results::TranscriptResult;

    fn result(
        gene: &str,
        p: f64,
        transcripts: &[(&str, f64)],
    ) -> std::result::Result<GeneResult, Box<dyn std::error::Error>> {
        let mut builder = gene::Builder::default()
            .accession(Accession::gene(gene)?)?
            .expression(1.0, p)?;

        for (accession, p) in transcripts {
            builder = builder.push_transcript(TranscriptResult::try_new(
                Accession::transcript(accession)?,
                1.0,
                *p,
            )?);
        }

        Ok(builder.try_build()?)
    }

    fn results() -> std::result::Result<HashMap<Accession, GeneResult>, Box<dyn std::error::Error>>
    {
        let results = vec![
            result("G1", 0.0, &[("T1", 0.0), ("T2", 0.3)])?,
            result("G2", 0.0, &[("T3", 0.01)])?,
            result("G3", 0.2, &[("T4", 0.04), ("T5", 0.9)])?,
            result("G4", 0.3, &[])?,
        ];

        Ok(results
            .into_iter()
            .map(|r| (r.accession().clone(), r))
            .collect())
    }

    #[test]
    fn study_sets_are_subsets_of_populations() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let results = results()?;

        for calibration in [
            Calibration::default(),
            Calibration::from(Calibrator::try_new(0.2)?),
            Calibration::from(Threshold::try_new(0.05)?),
            Calibration::from(Threshold::try_new(0.0)?),
        ] {
            let sets = Builder::default()
                .calibration(calibration)
                .try_build_from(&results)?;

            assert!(sets.dge().study().is_subset(sets.dge().population()));
            assert!(sets.das().study().is_subset(sets.das().population()));
            assert_eq!(sets.dge().population().len(), 4);
            assert_eq!(sets.das().population().len(), 5);
        }

        Ok(())
    }

    #[test]
    fn bayesian_cutoffs_are_calibrated_per_family()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let sets = Builder::default().try_build_from(&results()?)?;

        // Expression: [0, 0, 0.2, 0.3] admits only the zeros.
        assert_eq!(sets.expression_cutoff().get(), 0.0);
        assert_eq!(sets.dge().study().len(), 2);

        // Splicing: [0, 0.01, 0.04, 0.3, 0.9] admits the first three.
        assert_eq!(sets.splicing_cutoff().get(), 0.04);
        assert_eq!(sets.das().study().len(), 3);

        Ok(())
    }

    #[test]
    fn fixed_cutoffs_are_shared() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let sets = Builder::default()
            .calibration(Threshold::try_new(0.01)?)
            .try_build_from(&results()?)?;

        assert_eq!(sets.expression_cutoff().get(), 0.01);
        assert_eq!(sets.splicing_cutoff().get(), 0.01);
        assert_eq!(sets.das().study().len(), 2);

        Ok(())
    }

    #[test]
    fn building_is_deterministic() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let results = results()?;
        let builder = Builder::default();

        let a = builder.try_build_from(&results)?;
        let b = builder.try_build_from(&results)?;
        assert_eq!(
            a.expression_cutoff().get().to_bits(),
            b.expression_cutoff().get().to_bits()
        );
        assert_eq!(
            a.splicing_cutoff().get().to_bits(),
            b.splicing_cutoff().get().to_bits()
        );
        assert_eq!(a, b);

        Ok(())
    }

    #[test]
    fn unresolved_accessions_are_excluded() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let catalog = ["G1", "G2", "G3"]
            .into_iter()
            .map(Accession::gene)
            .chain(["T1", "T2", "T3", "T4"].into_iter().map(Accession::transcript))
            .collect::<std::result::Result<Catalog, _>>()?;

        let sets = Builder::default()
            .catalog(catalog)
            .try_build_from(&results()?)?;

        assert_eq!(sets.genes().resolved(), 3);
        assert_eq!(sets.genes().unresolved(), 1);
        assert_eq!(sets.transcripts().resolved(), 4);
        assert_eq!(sets.transcripts().unresolved(), 1);
        assert_eq!(sets.dge().population().len(), 3);
        assert_eq!(sets.das().population().len(), 4);
        assert!(!sets.das().population().contains(&Accession::transcript("T5")?));

        Ok(())
    }

    #[test]
    fn a_majority_of_unresolved_accessions_is_fatal()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let catalog = ["G1", "G2", "G3", "G4"]
            .into_iter()
            .map(Accession::gene)
            .chain(["T1", "T2"].into_iter().map(Accession::transcript))
            .collect::<std::result::Result<Catalog, _>>()?;

        let err = Builder::default()
            .catalog(catalog.clone())
            .try_build_from(&results()?)
            .unwrap_err();

        assert_eq!(
            err,
            Error::IdentifierMapping {
                namespace: Namespace::Transcript,
                resolved: 2,
                unresolved: 3,
            }
        );

        // A more lenient threshold lets the same data through.
        let sets = Builder::default()
            .catalog(catalog)
            .max_unresolved_fraction(0.75)?
            .try_build_from(&results()?)?;
        assert_eq!(sets.das().population().len(), 2);

        Ok(())
    }

    #[test]
    fn it_rejects_invalid_fractions() {
        let err = Builder::default().max_unresolved_fraction(1.5).unwrap_err();
        assert_eq!(err, Error::InvalidFraction(1.5));
    }
}
