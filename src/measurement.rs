//! # Timing measurements and the per-hit builder
//!
//! The atoms of the timing fit live here:
//!
//! * [`TimeMeasurement`] – one timing observation, carrying its flight
//!   distance and the two statistical weights the fit needs,
//! * [`TimeMeasurementSequence`] – the surviving measurements of one track in
//!   one subdetector family, with the aggregate weights of the final set,
//! * [`ChannelConfig`] / [`PerHitTimeBuilder`] – the pure transformation from
//!   a raw hit (plus its propagated distance) into zero, one, or two
//!   measurements, depending on which timing channels are enabled and which
//!   readings are valid.
//!
//! ## Weight model
//!
//! For a channel with fixed timing resolution `σ` (ns) and a hit at flight
//! distance `d` (cm):
//!
//! ```text
//! weight_inv_beta = d² / (σ² · c²)      with c = 30 cm/ns
//! weight_time_vtx = 1 / σ²
//! ```
//!
//! Both weights are strictly positive for every measurement ever constructed:
//! a hit with no valid reading on a channel simply produces no measurement for
//! it, never a zero or placeholder weight.

use smallvec::SmallVec;

use crate::constants::{Centimeter, Nanosecond, TimeMeasurements, VLIGHT_TIMING};
use crate::hits::{Hit, TimingChannel};

/// One timing observation entering the robust fit.
///
/// Fields
/// -----------------
/// * `distance`: Flight distance from the reference point to the hit, in cm
///   (path length along the trajectory, or the straight-line fallback).
/// * `time_corr`: Timing reading minus the channel's fixed offset, in ns.
/// * `weight_inv_beta`: Statistical weight for the 1/β estimate.
/// * `weight_time_vtx`: Statistical weight for the vertex-time estimate.
///
/// Invariant: both weights are strictly positive. Instances are only built by
/// [`PerHitTimeBuilder`] from valid readings and positive distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMeasurement {
    pub distance: Centimeter,
    pub time_corr: Nanosecond,
    pub weight_inv_beta: f64,
    pub weight_time_vtx: f64,
}

impl TimeMeasurement {
    /// Local 1/β of this single measurement, `1 + t/d·c`.
    #[inline]
    pub fn local_inv_beta(&self) -> f64 {
        1.0 + self.time_corr / self.distance * VLIGHT_TIMING
    }
}

/// The ordered collection of measurements surviving the fit, with the summed
/// weights of the final set.
///
/// Order is not semantically significant after the fit but is kept stable for
/// reproducibility. A sequence is created fresh per track per subdetector
/// family and never mutated after being returned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeMeasurementSequence {
    measurements: TimeMeasurements,
    total_weight_inv_beta: f64,
    total_weight_time_vtx: f64,
}

impl TimeMeasurementSequence {
    /// A well-formed empty sequence (both totals zero).
    pub fn empty() -> Self {
        TimeMeasurementSequence::default()
    }

    /// Build a sequence from a final measurement set, recomputing both totals.
    pub fn from_measurements(measurements: impl IntoIterator<Item = TimeMeasurement>) -> Self {
        let measurements: TimeMeasurements = measurements.into_iter().collect();
        let total_weight_inv_beta = measurements.iter().map(|m| m.weight_inv_beta).sum();
        let total_weight_time_vtx = measurements.iter().map(|m| m.weight_time_vtx).sum();
        TimeMeasurementSequence {
            measurements,
            total_weight_inv_beta,
            total_weight_time_vtx,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeMeasurement> {
        self.measurements.iter()
    }

    /// Sum of `weight_inv_beta` over the final set (zero when empty).
    #[inline]
    pub fn total_weight_inv_beta(&self) -> f64 {
        self.total_weight_inv_beta
    }

    /// Sum of `weight_time_vtx` over the final set (zero when empty).
    #[inline]
    pub fn total_weight_time_vtx(&self) -> f64 {
        self.total_weight_time_vtx
    }
}

impl std::fmt::Display for TimeMeasurementSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TimeMeasurementSequence(n={}, w_invbeta={:.4}, w_timevtx={:.4})",
            self.len(),
            self.total_weight_inv_beta,
            self.total_weight_time_vtx
        )
    }
}

/// Configuration of one timing channel of a subdetector family.
///
/// Fields
/// -----------------
/// * `channel`: Which hit reading this configuration applies to.
/// * `offset`: Fixed calibration offset subtracted from every reading, in ns.
/// * `resolution`: Fixed timing resolution of the channel, in ns (must be > 0,
///   validated by the family parameter builders).
/// * `enabled`: Disabled channels emit no measurements at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    pub channel: TimingChannel,
    pub offset: Nanosecond,
    pub resolution: Nanosecond,
    pub enabled: bool,
}

impl ChannelConfig {
    pub fn new(channel: TimingChannel, offset: Nanosecond, resolution: Nanosecond) -> Self {
        ChannelConfig {
            channel,
            offset,
            resolution,
            enabled: true,
        }
    }
}

/// Pure transformation from a matched hit into its timing measurements.
///
/// Given a hit and its flight distance, emits one [`TimeMeasurement`] per
/// enabled channel that carries a valid reading: 0–2 measurements per hit,
/// no side effects.
#[derive(Debug, Clone)]
pub struct PerHitTimeBuilder {
    channels: SmallVec<[ChannelConfig; 2]>,
}

impl PerHitTimeBuilder {
    pub fn new(channels: impl IntoIterator<Item = ChannelConfig>) -> Self {
        PerHitTimeBuilder {
            channels: channels.into_iter().collect(),
        }
    }

    /// Convert one hit into its measurements.
    ///
    /// Arguments
    /// -----------------
    /// * `hit`: The matched hit with its raw channel readings.
    /// * `distance`: Flight distance from the reference point, in cm.
    ///
    /// Return
    /// ----------
    /// * 0–2 measurements, one per enabled channel with a valid reading.
    ///   A non-positive distance (degenerate geometry) yields none: it would
    ///   produce a zero 1/β weight, which must never be constructed.
    pub fn build_measurements(
        &self,
        hit: &Hit,
        distance: Centimeter,
    ) -> SmallVec<[TimeMeasurement; 2]> {
        let mut out = SmallVec::new();
        if distance <= 0.0 {
            return out;
        }
        for config in self.channels.iter().filter(|c| c.enabled) {
            if let Some(reading) = hit.time(config.channel) {
                let sigma2 = config.resolution * config.resolution;
                out.push(TimeMeasurement {
                    distance,
                    time_corr: reading - config.offset,
                    weight_inv_beta: distance * distance
                        / (sigma2 * VLIGHT_TIMING * VLIGHT_TIMING),
                    weight_time_vtx: 1.0 / sigma2,
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod measurement_test {
    use super::*;
    use crate::geometry::DetectorId;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn strip_and_wire() -> PerHitTimeBuilder {
        PerHitTimeBuilder::new([
            ChannelConfig::new(TimingChannel::Fast, 0.0, 7.0),
            ChannelConfig::new(TimingChannel::Slow, 0.0, 8.6),
        ])
    }

    #[test]
    fn test_two_channels_two_measurements() {
        let hit = Hit::new(DetectorId(1), Vector3::zeros(), Some(3.0), Some(5.0));
        let tms = strip_and_wire().build_measurements(&hit, 600.0);
        assert_eq!(tms.len(), 2);

        // Fast channel: sigma = 7 ns.
        assert_relative_eq!(
            tms[0].weight_inv_beta,
            600.0 * 600.0 / (49.0 * 900.0),
            max_relative = 1e-12
        );
        assert_relative_eq!(tms[0].weight_time_vtx, 1.0 / 49.0, max_relative = 1e-12);
        assert_relative_eq!(tms[0].time_corr, 3.0, max_relative = 1e-12);

        // Slow channel: sigma = 8.6 ns.
        assert_relative_eq!(tms[1].weight_time_vtx, 1.0 / (8.6 * 8.6), max_relative = 1e-12);
        assert_relative_eq!(tms[1].time_corr, 5.0, max_relative = 1e-12);
    }

    #[test]
    fn test_offset_is_subtracted() {
        let builder = PerHitTimeBuilder::new([ChannelConfig::new(TimingChannel::Fast, 2.5, 2.8)]);
        let hit = Hit::with_fast_time(DetectorId(2), Vector3::zeros(), 10.0);
        let tms = builder.build_measurements(&hit, 450.0);
        assert_eq!(tms.len(), 1);
        assert_relative_eq!(tms[0].time_corr, 7.5, max_relative = 1e-12);
    }

    #[test]
    fn test_missing_reading_emits_nothing() {
        // Wire reading absent: only the strip measurement comes out.
        let hit = Hit::new(DetectorId(3), Vector3::zeros(), Some(1.0), None);
        let tms = strip_and_wire().build_measurements(&hit, 600.0);
        assert_eq!(tms.len(), 1);
        assert!(tms.iter().all(|m| m.weight_inv_beta > 0.0 && m.weight_time_vtx > 0.0));
    }

    #[test]
    fn test_disabled_channel_emits_nothing() {
        let mut wire = ChannelConfig::new(TimingChannel::Slow, 0.0, 8.6);
        wire.enabled = false;
        let builder = PerHitTimeBuilder::new([
            ChannelConfig::new(TimingChannel::Fast, 0.0, 7.0),
            wire,
        ]);
        let hit = Hit::new(DetectorId(4), Vector3::zeros(), Some(1.0), Some(2.0));
        let tms = builder.build_measurements(&hit, 600.0);
        assert_eq!(tms.len(), 1);
        assert_relative_eq!(tms[0].time_corr, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_degenerate_distance_emits_nothing() {
        let hit = Hit::new(DetectorId(5), Vector3::zeros(), Some(1.0), Some(2.0));
        assert!(strip_and_wire().build_measurements(&hit, 0.0).is_empty());
        assert!(strip_and_wire().build_measurements(&hit, -1.0).is_empty());
    }

    #[test]
    fn test_light_speed_hit_has_unit_local_inv_beta() {
        // Readings are calibrated against the light-speed expectation, so an
        // in-time reading of 0 ns corresponds to 1/beta = 1.
        let builder = PerHitTimeBuilder::new([ChannelConfig::new(TimingChannel::Fast, 0.0, 2.8)]);
        let hit = Hit::with_fast_time(DetectorId(6), Vector3::zeros(), 0.0);
        let tms = builder.build_measurements(&hit, 300.0);
        assert_relative_eq!(tms[0].local_inv_beta(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_sequence_totals() {
        let hit = Hit::new(DetectorId(7), Vector3::zeros(), Some(1.0), Some(2.0));
        let tms = strip_and_wire().build_measurements(&hit, 600.0);
        let seq = TimeMeasurementSequence::from_measurements(tms.clone());
        let expected_ib: f64 = tms.iter().map(|m| m.weight_inv_beta).sum();
        let expected_tv: f64 = tms.iter().map(|m| m.weight_time_vtx).sum();
        assert_relative_eq!(seq.total_weight_inv_beta(), expected_ib, max_relative = 1e-12);
        assert_relative_eq!(seq.total_weight_time_vtx(), expected_tv, max_relative = 1e-12);
        assert_eq!(seq.len(), 2);

        let empty = TimeMeasurementSequence::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.total_weight_inv_beta(), 0.0);
        assert_eq!(empty.total_weight_time_vtx(), 0.0);
    }
}
