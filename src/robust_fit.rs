//! # Robust fit engine: iterative weighted fit with outlier pruning
//!
//! The algorithmic heart of the crate. Starting from the full raw measurement
//! set of one track, each iteration:
//!
//! 1. terminates with an empty result when the working set is empty or its
//!    total 1/β weight is zero (guards the divide-by-zero),
//! 2. computes the weighted means of 1/β and of the vertex time,
//! 3. finds the measurement with the largest weighted squared deviation from
//!    the vertex-time mean,
//! 4. removes that single measurement when its deviation exceeds `prune_cut`
//!    and loops, otherwise declares convergence.
//!
//! Only the vertex-time deviation drives pruning; the 1/β deviation is
//! accumulated for diagnostics but never used as the pruning criterion. This
//! is a fixed design choice, not configurable.
//!
//! ## Determinism and termination
//!
//! Ties on the maximal deviation are broken by the strict `>` comparison: the
//! first measurement (in working-set order) reaching the maximum is the one
//! pruned. The working set strictly shrinks by one element on every
//! non-terminal iteration, so the loop terminates in at most `|W₀|` rounds.
//!
//! Each round scans an immutable snapshot of the working set and only then
//! removes one index, so no container is ever mutated while being iterated.
//!
//! ## Diagnostics
//!
//! [`FitDiagnostics`] exposes the fitted values with their weighted standard
//! errors (n−1 degrees-of-freedom correction). They are a pure side channel:
//! nothing in them feeds back into the pruning decision, preserving the
//! termination guarantee.

use tracing::{debug, trace};

use crate::constants::{InverseBeta, Nanosecond, TimeMeasurements};
use crate::measurement::{TimeMeasurement, TimeMeasurementSequence};
use crate::tofit_errors::TofitError;

/// Fitted values and dispersion of a converged working set.
///
/// Fields
/// -----------------
/// * `inv_beta`, `time_vtx`: Weighted means over the surviving set.
/// * `inv_beta_err`, `time_vtx_err`: Weighted standard errors with the n−1
///   correction; `None` when fewer than two measurements survive.
/// * `iterations`: Number of fit rounds executed (≥ 1 for non-empty input).
/// * `pruned`: Number of measurements removed as outliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitDiagnostics {
    pub inv_beta: InverseBeta,
    pub inv_beta_err: Option<f64>,
    pub time_vtx: Nanosecond,
    pub time_vtx_err: Option<f64>,
    pub iterations: usize,
    pub pruned: usize,
}

/// Weighted means of one fit round, together with the pruning candidate.
#[derive(Debug, Clone, Copy)]
struct RoundFit {
    inv_beta: f64,
    time_vtx: f64,
    inv_beta_dev: f64,
    time_vtx_dev: f64,
    /// Index and weighted squared vertex-time deviation of the worst hit.
    worst: Option<(usize, f64)>,
}

/// The iterative outlier-pruning weighted-fit engine.
///
/// Family-agnostic and stateless across invocations: one instance can serve
/// any number of tracks, concurrently, as long as each call receives its own
/// measurement set.
#[derive(Debug, Clone, Copy)]
pub struct RobustFit {
    prune_cut: f64,
    debug: bool,
}

impl RobustFit {
    /// Create an engine with the given pruning threshold.
    ///
    /// Arguments
    /// -----------------
    /// * `prune_cut`: Weighted squared vertex-time deviation above which the
    ///   single worst measurement of a round is removed. Must be finite and ≥ 0.
    /// * `debug`: When set, per-round fit values are reported through
    ///   `tracing::debug!`.
    ///
    /// Return
    /// ----------
    /// * `Ok(RobustFit)` or [`TofitError::InvalidTimingParameter`] for a
    ///   negative or non-finite cut.
    pub fn new(prune_cut: f64, debug: bool) -> Result<Self, TofitError> {
        if !prune_cut.is_finite() || prune_cut < 0.0 {
            return Err(TofitError::InvalidTimingParameter(
                "prune_cut must be finite and >= 0".into(),
            ));
        }
        Ok(RobustFit { prune_cut, debug })
    }

    #[inline]
    pub fn prune_cut(&self) -> f64 {
        self.prune_cut
    }

    /// Run the pruning loop and return the cleaned sequence.
    ///
    /// See [`fit_with_diagnostics`](Self::fit_with_diagnostics) for the
    /// side-channel outputs.
    pub fn fit(&self, measurements: TimeMeasurements) -> TimeMeasurementSequence {
        self.fit_with_diagnostics(measurements).0
    }

    /// Run the pruning loop, returning the cleaned sequence and the fit
    /// diagnostics of the converged set.
    ///
    /// Arguments
    /// -----------------
    /// * `measurements`: The full raw set produced by the per-hit builder
    ///   across all hits of all matched segments.
    ///
    /// Return
    /// ----------
    /// * The final [`TimeMeasurementSequence`] with its totals recomputed from
    ///   the surviving set, and `Some(FitDiagnostics)` when at least one
    ///   measurement survives (`None` for a degenerate input).
    pub fn fit_with_diagnostics(
        &self,
        measurements: TimeMeasurements,
    ) -> (TimeMeasurementSequence, Option<FitDiagnostics>) {
        let initial = measurements.len();
        let mut working: Vec<TimeMeasurement> = measurements.into_vec();
        let mut iterations = 0usize;

        let round = loop {
            let total_weight_inv_beta: f64 = working.iter().map(|m| m.weight_inv_beta).sum();
            if working.is_empty() || total_weight_inv_beta == 0.0 {
                return (TimeMeasurementSequence::empty(), None);
            }
            iterations += 1;

            let round = Self::fit_round(&working, total_weight_inv_beta);
            if self.debug {
                self.report_round(&working, &round, total_weight_inv_beta);
            }

            match round.worst {
                Some((idx, dev)) if dev > self.prune_cut => {
                    trace!(index = idx, deviation = dev, "pruning timing outlier");
                    // Scan is done; removing one index here never invalidates
                    // an in-flight iterator.
                    working.remove(idx);
                }
                _ => break round,
            }
        };

        let diagnostics = self.diagnostics(&working, &round, iterations, initial);
        (
            TimeMeasurementSequence::from_measurements(working),
            Some(diagnostics),
        )
    }

    /// One weighted-fit round over an immutable snapshot of the working set.
    fn fit_round(working: &[TimeMeasurement], total_weight_inv_beta: f64) -> RoundFit {
        let total_weight_time_vtx: f64 = working.iter().map(|m| m.weight_time_vtx).sum();

        let mut inv_beta = 0.0;
        let mut time_vtx = 0.0;
        for tm in working {
            inv_beta += tm.local_inv_beta() * tm.weight_inv_beta / total_weight_inv_beta;
            time_vtx += tm.time_corr * tm.weight_time_vtx / total_weight_time_vtx;
        }

        let mut inv_beta_dev = 0.0;
        let mut time_vtx_dev = 0.0;
        let mut worst: Option<(usize, f64)> = None;
        for (i, tm) in working.iter().enumerate() {
            let diff_ibeta = tm.local_inv_beta() - inv_beta;
            inv_beta_dev += diff_ibeta * diff_ibeta * tm.weight_inv_beta;

            let diff_tvtx = tm.time_corr - time_vtx;
            let dev = diff_tvtx * diff_tvtx * tm.weight_time_vtx;
            time_vtx_dev += dev;

            // Strict > keeps the first-seen maximum on ties.
            if worst.is_none_or(|(_, max)| dev > max) {
                worst = Some((i, dev));
            }
        }

        RoundFit {
            inv_beta,
            time_vtx,
            inv_beta_dev,
            time_vtx_dev,
            worst,
        }
    }

    fn diagnostics(
        &self,
        working: &[TimeMeasurement],
        round: &RoundFit,
        iterations: usize,
        initial: usize,
    ) -> FitDiagnostics {
        let (inv_beta_err, time_vtx_err) = Self::standard_errors(working, round);
        FitDiagnostics {
            inv_beta: round.inv_beta,
            inv_beta_err,
            time_vtx: round.time_vtx,
            time_vtx_err,
            iterations,
            pruned: initial - working.len(),
        }
    }

    /// Weighted standard errors with the n−1 correction; undefined below two
    /// measurements.
    fn standard_errors(
        working: &[TimeMeasurement],
        round: &RoundFit,
    ) -> (Option<f64>, Option<f64>) {
        if working.len() < 2 {
            return (None, None);
        }
        let cf = 1.0 / (working.len() as f64 - 1.0);
        let total_ib: f64 = working.iter().map(|m| m.weight_inv_beta).sum();
        let total_tv: f64 = working.iter().map(|m| m.weight_time_vtx).sum();
        (
            Some((round.inv_beta_dev / total_ib * cf).sqrt()),
            Some((round.time_vtx_dev / total_tv * cf).sqrt()),
        )
    }

    fn report_round(&self, working: &[TimeMeasurement], round: &RoundFit, total_ib: f64) {
        let (inv_beta_err, time_vtx_err) = Self::standard_errors(working, round);
        debug!(
            points = working.len(),
            total_weight_inv_beta = total_ib,
            inv_beta = round.inv_beta,
            inv_beta_err,
            time_vtx = round.time_vtx,
            time_vtx_err,
            "timing fit round"
        );
    }
}
