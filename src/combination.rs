//! # Cross-family sequence combination
//!
//! Helpers for fusing the cleaned per-family sequences into a single
//! estimate:
//!
//! * [`combine_sequences`] – concatenate sequences, recomputing the totals,
//! * [`TimingSummary`] – fitted values of any sequence (weighted means plus
//!   n−1-corrected standard errors and degrees of freedom).
//!
//! The combination consumes already-pruned sequences; no further outlier
//! removal happens here.

use crate::constants::{InverseBeta, Nanosecond, VLIGHT_TIMING};
use crate::measurement::TimeMeasurementSequence;

/// Concatenate per-family sequences into one combined sequence.
///
/// Order is preserved (first all measurements of the first input, then the
/// second, …) so combined results stay reproducible. Totals are recomputed
/// from the merged set; empty inputs contribute nothing.
pub fn combine_sequences(sequences: &[&TimeMeasurementSequence]) -> TimeMeasurementSequence {
    TimeMeasurementSequence::from_measurements(
        sequences.iter().flat_map(|seq| seq.iter().copied()),
    )
}

/// Fitted values of one measurement sequence.
///
/// Fields
/// -----------------
/// * `inv_beta`, `time_vtx`: Weighted means over the sequence.
/// * `inv_beta_err`, `time_vtx_err`: Weighted standard errors with the n−1
///   correction; `None` below two measurements.
/// * `n_dof`: Degrees of freedom of the estimate, `n − 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSummary {
    pub inv_beta: InverseBeta,
    pub inv_beta_err: Option<f64>,
    pub time_vtx: Nanosecond,
    pub time_vtx_err: Option<f64>,
    pub n_dof: usize,
}

impl TimingSummary {
    /// Summarize a cleaned sequence.
    ///
    /// Return
    /// ----------
    /// * `None` for an empty sequence or one with zero total 1/β weight
    ///   (nothing to estimate, and no division by zero).
    pub fn from_sequence(seq: &TimeMeasurementSequence) -> Option<TimingSummary> {
        let total_ib = seq.total_weight_inv_beta();
        let total_tv = seq.total_weight_time_vtx();
        if seq.is_empty() || total_ib == 0.0 {
            return None;
        }

        let mut inv_beta = 0.0;
        let mut time_vtx = 0.0;
        for tm in seq.iter() {
            inv_beta += (1.0 + tm.time_corr / tm.distance * VLIGHT_TIMING) * tm.weight_inv_beta
                / total_ib;
            time_vtx += tm.time_corr * tm.weight_time_vtx / total_tv;
        }

        let (inv_beta_err, time_vtx_err) = if seq.len() >= 2 {
            let cf = 1.0 / (seq.len() as f64 - 1.0);
            let mut dev_ib = 0.0;
            let mut dev_tv = 0.0;
            for tm in seq.iter() {
                let d_ib = tm.local_inv_beta() - inv_beta;
                dev_ib += d_ib * d_ib * tm.weight_inv_beta;
                let d_tv = tm.time_corr - time_vtx;
                dev_tv += d_tv * d_tv * tm.weight_time_vtx;
            }
            (
                Some((dev_ib / total_ib * cf).sqrt()),
                Some((dev_tv / total_tv * cf).sqrt()),
            )
        } else {
            (None, None)
        };

        Some(TimingSummary {
            inv_beta,
            inv_beta_err,
            time_vtx,
            time_vtx_err,
            n_dof: seq.len() - 1,
        })
    }
}

#[cfg(test)]
mod combination_test {
    use super::*;
    use crate::measurement::TimeMeasurement;
    use approx::assert_relative_eq;

    fn tm(distance: f64, time_corr: f64) -> TimeMeasurement {
        TimeMeasurement {
            distance,
            time_corr,
            weight_inv_beta: 1.0,
            weight_time_vtx: 1.0,
        }
    }

    #[test]
    fn test_combine_preserves_order_and_totals() {
        let dt = TimeMeasurementSequence::from_measurements(vec![tm(100.0, 0.0), tm(150.0, 0.2)]);
        let csc = TimeMeasurementSequence::from_measurements(vec![tm(600.0, 0.1)]);

        let combined = combine_sequences(&[&dt, &csc]);
        assert_eq!(combined.len(), 3);
        assert_relative_eq!(combined.total_weight_inv_beta(), 3.0, max_relative = 1e-12);
        let distances: Vec<f64> = combined.iter().map(|m| m.distance).collect();
        assert_eq!(distances, vec![100.0, 150.0, 600.0]);
    }

    #[test]
    fn test_combine_with_empty_family() {
        let dt = TimeMeasurementSequence::empty();
        let csc = TimeMeasurementSequence::from_measurements(vec![tm(600.0, 0.1)]);
        let combined = combine_sequences(&[&dt, &csc]);
        assert_eq!(combined.len(), 1);
    }

    #[test]
    fn test_summary_of_empty_sequence() {
        assert!(TimingSummary::from_sequence(&TimeMeasurementSequence::empty()).is_none());
    }

    #[test]
    fn test_summary_values() {
        let seq = TimeMeasurementSequence::from_measurements(vec![tm(300.0, 0.0), tm(300.0, 10.0)]);
        let summary = TimingSummary::from_sequence(&seq).unwrap();
        // 1/beta averages 1.0 (in time) and 2.0 (10 ns late over 300 cm).
        assert_relative_eq!(summary.inv_beta, 1.5, max_relative = 1e-12);
        assert_relative_eq!(summary.time_vtx, 5.0, max_relative = 1e-12);
        assert_eq!(summary.n_dof, 1);
        assert!(summary.inv_beta_err.is_some());
        assert!(summary.time_vtx_err.is_some());
    }

    #[test]
    fn test_summary_single_measurement_has_no_errors() {
        let seq = TimeMeasurementSequence::from_measurements(vec![tm(300.0, 0.0)]);
        let summary = TimingSummary::from_sequence(&seq).unwrap();
        assert!(summary.inv_beta_err.is_none());
        assert!(summary.time_vtx_err.is_none());
        assert_eq!(summary.n_dof, 0);
    }
}
