//! Hypergeometric overrepresentation of InterPro entries among the
//! transcripts that are significant for splicing.

use std::collections::BTreeMap;

use statrs::distribution::DiscreteCDF;
use statrs::distribution::Hypergeometric;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::calibration::Cutoff;
use crate::core::Accession;
use crate::core::Namespace;
use crate::differential::Partition;
use crate::interpro::Descriptions;
use crate::interpro::Entry;
use crate::interpro::EntryType;
use crate::interpro::Hits;
use crate::interpro::InterproId;
use crate::results::GeneResult;

/// The minimum number of significant transcripts carrying an entry for the
/// entry to be tested.
pub const MINIMUM_TERM_COUNT_TO_TEST: usize = 2;

/// A transcript with its splicing error probability and InterPro entries.
#[derive(Clone, Debug)]
struct AnnotatedTranscript {
    /// The transcript accession.
    accession: Accession,

    /// The splicing error probability.
    p: f64,

    /// The entries hit on the transcript, sorted.
    entries: Vec<InterproId>,
}

/// A gene whose expressed transcripts carry their InterPro hits.
#[derive(Clone, Debug)]
pub struct AnnotatedGene {
    /// The gene accession.
    accession: Accession,

    /// The expressed transcripts.
    transcripts: Vec<AnnotatedTranscript>,
}

impl AnnotatedGene {
    /// Attaches the hits for each transcript of `result`. Transcripts without
    /// hits are kept with no entries.
    pub fn new(result: &GeneResult, hits: &Hits) -> Self {
        let transcripts = result
            .transcripts()
            .iter()
            .map(|transcript| {
                let mut entries = hits
                    .get(transcript.accession())
                    .map(|entries| entries.iter().copied().collect::<Vec<_>>())
                    .unwrap_or_default();
                entries.sort();

                AnnotatedTranscript {
                    accession: transcript.accession().clone(),
                    p: transcript.p(),
                    entries,
                }
            })
            .collect();

        Self {
            accession: result.accession().clone(),
            transcripts,
        }
    }

    /// Gets the gene accession.
    pub fn accession(&self) -> &Accession {
        &self.accession
    }

    /// Gets the number of expressed transcripts.
    pub fn expressed_transcript_count(&self) -> usize {
        self.transcripts.len()
    }

    /// Gets the number of transcripts passing `cutoff`.
    pub fn significant_transcript_count(&self, cutoff: Cutoff) -> usize {
        self.transcripts
            .iter()
            .filter(|t| cutoff.admits(t.p))
            .count()
    }

    /// Gets the entries hit on `transcript`, or [`None`] if the transcript is
    /// not expressed for this gene.
    pub fn entries(&self, transcript: &Accession) -> Option<&[InterproId]> {
        self.transcripts
            .iter()
            .find(|t| &t.accession == transcript)
            .map(|t| t.entries.as_slice())
    }

    /// Gets the number of transcripts with at least one hit.
    pub fn annotated_transcript_count(&self) -> usize {
        self.transcripts
            .iter()
            .filter(|t| !t.entries.is_empty())
            .count()
    }
}

/// The overrepresentation test result for a single InterPro entry.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainOverrepResult {
    /// The entry.
    entry: Entry,

    /// The number of transcripts in the population.
    population_total: usize,

    /// The number of population transcripts carrying the entry.
    population_annotated: usize,

    /// The number of transcripts in the study set.
    study_total: usize,

    /// The number of study transcripts carrying the entry.
    study_annotated: usize,

    /// The raw hypergeometric p-value.
    raw_p: f64,

    /// The Bonferroni-corrected p-value.
    corrected_p: f64,
}

impl DomainOverrepResult {
    /// Gets the entry.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Gets the number of transcripts in the population.
    pub fn population_total(&self) -> usize {
        self.population_total
    }

    /// Gets the number of population transcripts carrying the entry.
    pub fn population_annotated(&self) -> usize {
        self.population_annotated
    }

    /// Gets the number of transcripts in the study set.
    pub fn study_total(&self) -> usize {
        self.study_total
    }

    /// Gets the number of study transcripts carrying the entry.
    pub fn study_annotated(&self) -> usize {
        self.study_annotated
    }

    /// Gets the raw hypergeometric p-value.
    pub fn raw_p(&self) -> f64 {
        self.raw_p
    }

    /// Gets the Bonferroni-corrected p-value.
    pub fn corrected_p(&self) -> f64 {
        self.corrected_p
    }

    /// Formats the study counts as `annotated/total (percent)`.
    pub fn study_counts(&self) -> String {
        format_counts(self.study_annotated, self.study_total)
    }

    /// Formats the population counts as `annotated/total (percent)`.
    pub fn population_counts(&self) -> String {
        format_counts(self.population_annotated, self.population_total)
    }
}

/// Formats `count` out of `total` with a percentage.
///
/// # Examples
///
/// ```
/// use isopret::interpro::overrep::format_counts;
///
/// assert_eq!(format_counts(5, 10), "5/10 (50.00%)");
/// assert_eq!(format_counts(0, 0), "0/0 (0%)");
/// ```
pub fn format_counts(count: usize, total: usize) -> String {
    if total == 0 {
        return format!("{count}/{total} (0%)");
    }

    let percent = 100.0 * count as f64 / total as f64;
    format!("{count}/{total} ({percent:.2}%)")
}

/// Formats a p-value for display.
///
/// # Examples
///
/// ```
/// use isopret::interpro::overrep::format_p_value;
///
/// assert_eq!(format_p_value(0.25), "0.250");
/// assert_eq!(format_p_value(0.005), "0.0050");
/// assert_eq!(format_p_value(0.0), "0");
/// assert_eq!(format_p_value(0.000123), "1.23e-4");
/// ```
pub fn format_p_value(p: f64) -> String {
    if p > 0.01 {
        format!("{p:.3}")
    } else if p > 0.001 {
        format!("{p:.4}")
    } else if p == 0.0 {
        String::from("0")
    } else {
        format!("{p:.2e}")
    }
}

/// The per-entry transcript counts.
#[derive(Debug, Default)]
struct Counts {
    /// The number of population transcripts carrying the entry.
    population: usize,

    /// The number of study transcripts carrying the entry.
    study: usize,
}

/// The InterPro overrepresentation analysis for one experiment.
#[derive(Clone, Debug)]
pub struct Overrepresentation {
    /// The number of population transcripts.
    population_size: usize,

    /// The number of study transcripts.
    study_size: usize,

    /// The number of entries with enough study transcripts to be tested.
    effective_tests: usize,

    /// The results, ordered by raw p-value.
    results: Vec<DomainOverrepResult>,
}

impl Overrepresentation {
    /// Tests each InterPro entry for enrichment among the study transcripts
    /// of `das`.
    ///
    /// Only transcripts in the population of `das` are counted, and a
    /// transcript is significant when it is in the study set of `das`.
    /// Transcripts of `genes` that the partition excludes (for example,
    /// transcripts that did not resolve against the reference catalog) take
    /// no part in the test. Only entries carried by at least
    /// [`MINIMUM_TERM_COUNT_TO_TEST`] study transcripts are tested and
    /// reported, and the Bonferroni correction counts only those tests.
    /// Entries missing from `descriptions` are reported with an
    /// [`EntryType::Unknown`] placeholder.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::calibration::Cutoff;
    /// use isopret::core::Accession;
    /// use isopret::core::Namespace;
    /// use isopret::differential::Partition;
    /// use isopret::interpro::AnnotatedGene;
    /// use isopret::interpro::Descriptions;
    /// use isopret::interpro::Hits;
    /// use isopret::interpro::InterproId;
    /// use isopret::interpro::Overrepresentation;
    /// use isopret::results::TranscriptResult;
    /// use isopret::results::gene::Builder;
    ///
    /// let mut builder = Builder::default()
    ///     .accession(Accession::gene("ENSG00000139618")?)?
    ///     .expression(1.0, 0.5)?;
    /// let mut hits = Vec::new();
    ///
    /// for i in 0..4 {
    ///     let transcript = Accession::transcript(format!("ENST{i:011}"))?;
    ///     let p = if i < 2 { 0.001 } else { 0.9 };
    ///     builder = builder.push_transcript(TranscriptResult::try_new(transcript.clone(), 2.0, p)?);
    ///     hits.push((transcript, InterproId::new(1)));
    /// }
    ///
    /// let result = builder.try_build()?;
    /// let das = Partition::from_scored(
    ///     Namespace::Transcript,
    ///     result.transcripts().iter().map(|t| (t.accession(), t.p())),
    ///     Cutoff::try_new(0.05)?,
    /// );
    ///
    /// let gene = AnnotatedGene::new(&result, &hits.into_iter().collect::<Hits>());
    /// let analysis = Overrepresentation::compute(&[gene], &das, &Descriptions::default());
    ///
    /// assert_eq!(analysis.population_size(), 4);
    /// assert_eq!(analysis.study_size(), 2);
    /// assert_eq!(analysis.results().len(), 1);
    /// // Every transcript carries the entry.
    /// assert_eq!(analysis.results()[0].raw_p(), 1.0);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn compute(genes: &[AnnotatedGene], das: &Partition, descriptions: &Descriptions) -> Self {
        if das.namespace() != Namespace::Transcript {
            warn!(
                "InterPro overrepresentation expects a transcript partition, found a {} partition",
                das.namespace()
            );
        }

        let mut population_size = 0;
        let mut study_size = 0;
        let mut counts: BTreeMap<InterproId, Counts> = BTreeMap::new();

        for transcript in genes
            .iter()
            .flat_map(|g| g.transcripts.iter())
            .filter(|t| das.population().contains(&t.accession))
        {
            let significant = das.study().contains(&transcript.accession);

            population_size += 1;
            if significant {
                study_size += 1;
            }

            for entry in &transcript.entries {
                let tally = counts.entry(*entry).or_default();
                tally.population += 1;

                if significant {
                    tally.study += 1;
                }
            }
        }

        let effective_tests = counts
            .values()
            .filter(|c| c.study >= MINIMUM_TERM_COUNT_TO_TEST)
            .count();

        let mut results = Vec::with_capacity(effective_tests);

        for (id, counts) in counts
            .into_iter()
            .filter(|(_, c)| c.study >= MINIMUM_TERM_COUNT_TO_TEST)
        {
            let raw_p = match upper_tail(population_size, counts.population, study_size, counts.study)
            {
                Some(p) => p,
                None => {
                    warn!(
                        "could not test {id}: {} of {population_size} population and {} of \
                         {study_size} study transcripts",
                        counts.population, counts.study
                    );
                    continue;
                }
            };

            let entry = match descriptions.get(&id) {
                Some(entry) => entry.clone(),
                None => {
                    debug!("no description for {id}");
                    Entry::new(id, EntryType::Unknown, "")
                }
            };

            results.push(DomainOverrepResult {
                entry,
                population_total: population_size,
                population_annotated: counts.population,
                study_total: study_size,
                study_annotated: counts.study,
                raw_p,
                corrected_p: (raw_p * effective_tests as f64).min(1.0),
            });
        }

        results.sort_by(|a, b| {
            a.raw_p
                .total_cmp(&b.raw_p)
                .then_with(|| a.entry.id().cmp(&b.entry.id()))
        });

        info!(
            "tested {effective_tests} InterPro entries over {study_size} study and \
             {population_size} population transcripts"
        );

        Self {
            population_size,
            study_size,
            effective_tests,
            results,
        }
    }

    /// Gets the number of population transcripts.
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Gets the number of study transcripts.
    pub fn study_size(&self) -> usize {
        self.study_size
    }

    /// Gets the number of entries that were tested.
    pub fn effective_tests(&self) -> usize {
        self.effective_tests
    }

    /// Gets the results, ordered by raw p-value.
    pub fn results(&self) -> &[DomainOverrepResult] {
        &self.results
    }

    /// Consumes `self` and returns the results.
    pub fn into_results(self) -> Vec<DomainOverrepResult> {
        self.results
    }
}

/// The probability of drawing `observed` or more successes in `draws` draws
/// from a population of `population` items containing `successes` successes.
fn upper_tail(population: usize, successes: usize, draws: usize, observed: usize) -> Option<f64> {
    let distribution =
        Hypergeometric::new(population as u64, successes as u64, draws as u64).ok()?;

    // `sf(x)` is P(X > x).
    Some(distribution.sf(observed.checked_sub(1)? as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::gene::Builder;
    use crate::results::TranscriptResult;

    fn choose(n: u64, k: u64) -> f64 {
        (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
    }

    /// Builds a gene with `n` transcripts. Transcript `i` has error
    /// probability `p(i)`.
    fn gene(n: usize, p: impl Fn(usize) -> f64) -> Result<GeneResult, Box<dyn std::error::Error>> {
        let mut builder = Builder::default()
            .accession(Accession::gene("ENSG00000139618")?)?
            .expression(1.0, 0.5)?;

        for i in 0..n {
            builder = builder.push_transcript(TranscriptResult::try_new(
                transcript(i)?,
                1.5,
                p(i),
            )?);
        }

        Ok(builder.try_build()?)
    }

    fn transcript(i: usize) -> Result<Accession, Box<dyn std::error::Error>> {
        Ok(Accession::transcript(format!("ENST{i:011}"))?)
    }

    /// Splits every transcript of `result` at a cutoff of 0.05.
    fn splicing(result: &GeneResult) -> Result<Partition, Box<dyn std::error::Error>> {
        Ok(Partition::from_scored(
            Namespace::Transcript,
            result.transcripts().iter().map(|t| (t.accession(), t.p())),
            Cutoff::try_new(0.05)?,
        ))
    }

    #[test]
    fn it_tests_a_single_entry_without_inflating_the_correction(
    ) -> Result<(), Box<dyn std::error::Error>> {
        // 100 expressed transcripts, 10 significant. Entry 1 is carried by 20
        // transcripts, 5 of them significant. Entry 2 is carried by only one
        // significant transcript and is not tested.
        let result = gene(100, |i| if i < 5 || (20..25).contains(&i) { 0.001 } else { 0.5 })?;

        let mut hits = Vec::new();
        for i in 0..20 {
            hits.push((transcript(i)?, InterproId::new(1)));
        }
        hits.push((transcript(20)?, InterproId::new(2)));
        hits.push((transcript(50)?, InterproId::new(2)));

        let gene = AnnotatedGene::new(&result, &hits.into_iter().collect::<Hits>());
        let descriptions = Descriptions::from_iter([Entry::new(
            InterproId::new(1),
            EntryType::Domain,
            "Kringle",
        )]);

        let analysis = Overrepresentation::compute(&[gene], &splicing(&result)?, &descriptions);
        assert_eq!(analysis.population_size(), 100);
        assert_eq!(analysis.study_size(), 10);
        assert_eq!(analysis.effective_tests(), 1);
        assert_eq!(analysis.results().len(), 1);

        let domain = &analysis.results()[0];
        assert_eq!(domain.entry().description(), "Kringle");
        assert_eq!(domain.population_annotated(), 20);
        assert_eq!(domain.study_annotated(), 5);
        assert_eq!(domain.study_counts(), "5/10 (50.00%)");
        assert_eq!(domain.population_counts(), "20/100 (20.00%)");

        let expected = (5..=10)
            .map(|k| choose(20, k) * choose(80, 10 - k))
            .sum::<f64>()
            / choose(100, 10);
        assert!((domain.raw_p() - expected).abs() < 1e-9);
        assert_eq!(domain.corrected_p(), domain.raw_p());

        Ok(())
    }

    #[test]
    fn it_applies_bonferroni_and_orders_by_raw_p() -> Result<(), Box<dyn std::error::Error>> {
        // Entry 7 is carried only by significant transcripts; entry 3 by all
        // of them.
        let result = gene(40, |i| if i < 6 { 0.01 } else { 0.9 })?;

        let mut hits = Vec::new();
        for i in 0..40 {
            hits.push((transcript(i)?, InterproId::new(3)));
        }
        for i in 0..4 {
            hits.push((transcript(i)?, InterproId::new(7)));
        }

        let gene = AnnotatedGene::new(&result, &hits.into_iter().collect::<Hits>());
        let analysis =
            Overrepresentation::compute(&[gene], &splicing(&result)?, &Descriptions::default());

        assert_eq!(analysis.effective_tests(), 2);

        let ids = analysis
            .results()
            .iter()
            .map(|r| r.entry().id())
            .collect::<Vec<_>>();
        assert_eq!(ids, [InterproId::new(7), InterproId::new(3)]);

        for result in analysis.results() {
            assert_eq!(result.corrected_p(), (result.raw_p() * 2.0).min(1.0));
            assert_eq!(result.entry().entry_type(), EntryType::Unknown);
        }

        assert!((analysis.results()[1].raw_p() - 1.0).abs() < 1e-12);

        Ok(())
    }

    #[test]
    fn transcripts_without_hits_only_count_toward_the_population(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let result = gene(3, |_| 0.01)?;
        let hits = [(transcript(0)?, InterproId::new(1))]
            .into_iter()
            .collect::<Hits>();

        let gene = AnnotatedGene::new(&result, &hits);
        assert_eq!(gene.annotated_transcript_count(), 1);
        assert_eq!(gene.entries(&transcript(1)?), Some(&[][..]));

        let analysis =
            Overrepresentation::compute(&[gene], &splicing(&result)?, &Descriptions::default());
        assert_eq!(analysis.population_size(), 3);
        assert_eq!(analysis.study_size(), 3);
        assert!(analysis.results().is_empty());

        Ok(())
    }

    #[test]
    fn transcripts_outside_the_partition_are_not_counted(
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Transcript 4 is significant and carries entry 1, but the partition
        // leaves it out.
        let result = gene(5, |i| if i == 1 || i >= 3 { 0.001 } else { 0.5 })?;
        let hits = [0, 1, 3, 4]
            .into_iter()
            .map(|i| Ok((transcript(i)?, InterproId::new(1))))
            .collect::<Result<Hits, Box<dyn std::error::Error>>>()?;

        let excluded = transcript(4)?;
        let das = Partition::from_scored(
            Namespace::Transcript,
            result
                .transcripts()
                .iter()
                .filter(|t| t.accession() != &excluded)
                .map(|t| (t.accession(), t.p())),
            Cutoff::try_new(0.05)?,
        );
        assert_eq!(das.population().len(), 4);
        assert_eq!(das.study().len(), 2);

        let gene = AnnotatedGene::new(&result, &hits);
        let analysis = Overrepresentation::compute(&[gene], &das, &Descriptions::default());

        assert_eq!(analysis.population_size(), das.population().len());
        assert_eq!(analysis.study_size(), das.study().len());

        let domain = &analysis.results()[0];
        assert_eq!(domain.population_annotated(), 3);
        assert_eq!(domain.study_annotated(), 2);

        Ok(())
    }

    #[test]
    fn it_formats_p_values() {
        assert_eq!(format_p_value(1.0), "1.000");
        assert_eq!(format_p_value(0.01), "0.0100");
        assert_eq!(format_p_value(0.001), "1.00e-3");
        assert_eq!(format_p_value(0.0), "0");
    }
}
