//! Bayesian false discovery rate control over posterior error probabilities.

use tracing::debug;
use tracing::warn;

use crate::calibration::Calibrate;
use crate::calibration::Cutoff;
use crate::calibration::Error;
use crate::calibration::ScoreSet;
use crate::calibration::MAX_PEP;

/// The default target false discovery rate.
pub const DEFAULT_TARGET_FDR: f64 = 0.05;

/// The width at which the bisection stops.
pub const TOLERANCE: f64 = 0.001;

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A calibrator that finds the largest posterior error probability cutoff
/// whose Bayesian false discovery rate does not exceed a target.
///
/// The Bayesian false discovery rate at a cutoff `t` is the mean of every
/// posterior error probability less than or equal to `t` (zero when none
/// qualify). The cutoff is found by bisection over `[0, MAX_PEP]` until the
/// search interval is no wider than [`TOLERANCE`]. The converged bound is then
/// tightened to the largest observed probability it admits, unless it admits
/// every observation, in which case the bound itself is returned. Tightening
/// never changes which tests pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Calibrator {
    /// The target false discovery rate.
    target_fdr: f64,
}

impl Calibrator {
    /// Attempts to create a new calibrator with the given target false
    /// discovery rate.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::calibration::pep::Calibrator;
    ///
    /// let calibrator = Calibrator::try_new(0.1)?;
    /// assert_eq!(calibrator.target_fdr(), 0.1);
    ///
    /// assert!(Calibrator::try_new(1.5).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(target_fdr: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&target_fdr) {
            return Err(Error::InvalidTarget(target_fdr));
        }

        Ok(Self { target_fdr })
    }

    /// Gets the target false discovery rate.
    pub fn target_fdr(&self) -> f64 {
        self.target_fdr
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self {
            target_fdr: DEFAULT_TARGET_FDR,
        }
    }
}

impl Calibrate for Calibrator {
    /// Calibrates a cutoff for `scores`.
    ///
    /// # Examples
    ///
    /// ```
    /// use isopret::calibration::Calibrate as _;
    /// use isopret::calibration::ScoreSet;
    /// use isopret::calibration::pep::Calibrator;
    ///
    /// let scores = ScoreSet::from(vec![0.5, 0.001, 0.05, 0.002, 0.01]);
    /// let cutoff = Calibrator::default().calibrate(scores);
    /// assert_eq!(cutoff.get(), 0.05);
    ///
    /// let cutoff = Calibrator::default().calibrate(ScoreSet::default());
    /// assert_eq!(cutoff.get(), 0.0);
    /// ```
    fn calibrate(&self, scores: ScoreSet) -> Cutoff {
        let mut scores = scores.into_inner();

        if scores.is_empty() {
            debug!("no scores to calibrate: using a cutoff of zero");
            return Cutoff::ZERO;
        }

        if let Some(value) = scores.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            warn!(
                "found a score that is not a probability ({value}) among {} scores: using a \
                 cutoff of zero",
                scores.len()
            );
            return Cutoff::ZERO;
        }

        scores.sort_by(f64::total_cmp);

        let mut low = 0.0;
        let mut high = MAX_PEP;
        let mut best = None;

        while high - low > TOLERANCE {
            let mid = low + (high - low) / 2.0;

            if fdr(&scores, mid) <= self.target_fdr {
                low = mid;
                best = Some(mid);
            } else {
                high = mid;
            }
        }

        let bound = match best {
            Some(bound) => bound,
            None => return Cutoff::ZERO,
        };

        let admitted = scores.partition_point(|p| *p <= bound);
        let cutoff = if admitted == scores.len() {
            bound
        } else if admitted == 0 {
            0.0
        } else {
            scores[admitted - 1]
        };

        debug!(
            "calibrated a cutoff of {cutoff} (bound {bound}) admitting {admitted} of {} scores",
            scores.len()
        );

        Cutoff::clamped(cutoff)
    }
}

/// Computes the Bayesian false discovery rate of ascending `scores` at
/// `cutoff`.
fn fdr(scores: &[f64], cutoff: f64) -> f64 {
    let admitted = &scores[..scores.partition_point(|p| *p <= cutoff)];

    if admitted.is_empty() {
        return 0.0;
    }

    admitted.iter().sum::<f64>() / admitted.len() as f64
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::Rng;
    use rand::SeedableRng;

    use super::*;

    /// Draws `n` probabilities from `rng`, skewed toward small values.
    fn draw(rng: &mut StdRng, n: usize) -> Vec<f64> {
        (0..n)
            .map(|_| {
                let x: f64 = rng.gen();
                x * x * x
            })
            .collect()
    }

    fn calibrate(scores: &[f64], target: f64) -> f64 {
        Calibrator::try_new(target)
            .unwrap()
            .calibrate(ScoreSet::from(scores.to_vec()))
            .get()
    }

    fn mean_at_or_below(scores: &[f64], cutoff: f64) -> f64 {
        let mut admitted = scores
            .iter()
            .filter(|p| **p <= cutoff)
            .copied()
            .collect::<Vec<_>>();
        admitted.sort_by(f64::total_cmp);

        if admitted.is_empty() {
            return 0.0;
        }

        admitted.iter().sum::<f64>() / admitted.len() as f64
    }

    #[test]
    fn it_includes_only_the_zeros() {
        let cutoff = calibrate(&[0.0, 0.0, 0.2, 0.3], 0.05);
        assert_eq!(cutoff, 0.0);
    }

    #[test]
    fn it_tightens_to_the_largest_admitted_score() {
        assert_eq!(calibrate(&[0.0, 0.1, 0.2, 0.25, 0.3], 0.01), 0.0);
        assert_eq!(calibrate(&[0.001, 0.002, 0.01, 0.05, 0.5], 0.05), 0.05);
    }

    #[test]
    fn all_zeros_converge_near_the_cap() {
        let cutoff = calibrate(&[0.0; 10], 0.05);
        assert_eq!(cutoff, 0.2490234375);
        assert!(cutoff <= MAX_PEP);
    }

    #[test]
    fn degenerate_input_yields_zero() {
        assert_eq!(calibrate(&[], 0.05), 0.0);
        assert_eq!(calibrate(&[0.01, f64::NAN], 0.05), 0.0);
        assert_eq!(calibrate(&[0.01, 1.5], 0.05), 0.0);
        assert_eq!(calibrate(&[0.01, -0.5], 0.05), 0.0);
    }

    #[test]
    fn scores_above_the_cap_are_never_admitted() {
        let cutoff = calibrate(&[0.3, 0.4, 0.9], 0.05);
        assert_eq!(cutoff, 0.0);
    }

    #[test]
    fn the_target_is_respected() {
        let mut rng = StdRng::seed_from_u64(42);

        for n in [1, 2, 5, 50, 500] {
            let scores = draw(&mut rng, n);

            for target in [0.0, 0.01, 0.05, 0.1, 0.2] {
                let cutoff = calibrate(&scores, target);
                assert!((0.0..=MAX_PEP).contains(&cutoff));
                assert!(
                    mean_at_or_below(&scores, cutoff) <= target,
                    "n = {n}, target = {target}, cutoff = {cutoff}"
                );
            }
        }
    }

    #[test]
    fn a_larger_target_never_shrinks_the_cutoff() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let scores = draw(&mut rng, 200);
            let mut previous = 0.0;

            for target in [0.0, 0.001, 0.01, 0.025, 0.05, 0.1, 0.15, 0.25, 0.5] {
                let cutoff = calibrate(&scores, target);
                assert!(cutoff >= previous, "target = {target}");
                previous = cutoff;
            }
        }
    }

    #[test]
    fn calibration_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(1234);
        let scores = draw(&mut rng, 1000);

        let mut shuffled = scores.clone();
        shuffled.reverse();

        let a = calibrate(&scores, 0.05);
        let b = calibrate(&scores, 0.05);
        let c = calibrate(&shuffled, 0.05);
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(a.to_bits(), c.to_bits());
    }

    #[test]
    fn it_rejects_invalid_targets() {
        assert_eq!(
            Calibrator::try_new(-0.01).unwrap_err().to_string(),
            "target false discovery rate must be within [0, 1], found -0.01"
        );
        assert!(Calibrator::try_new(f64::NAN).is_err());
    }
}
