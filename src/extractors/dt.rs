//! # DT timing extractor
//!
//! Timing extraction for the drift-tube family. Drift cells expose a single
//! timing reading per hit, and short segments carry too little information to
//! constrain a time: segments with fewer than `hits_min` hits are skipped
//! entirely before any measurement is built.

use std::fmt;

use tracing::debug;

use crate::constants::Nanosecond;
use crate::extractors::{measurements_from_segments, TimeMeasurementExtractor};
use crate::geometry::GeometryProvider;
use crate::hits::{SegmentMatcher, TimingChannel};
use crate::measurement::{ChannelConfig, PerHitTimeBuilder, TimeMeasurementSequence};
use crate::propagation::{Propagator, TrackState};
use crate::robust_fit::RobustFit;
use crate::tofit_errors::TofitError;

/// Configuration of the DT timing extraction.
///
/// Fields
/// -----------------
/// * `prune_cut` – deviation threshold of the outlier-pruning loop.
/// * `time_offset` – fixed calibration offset, in ns.
/// * `hit_error` – fixed timing resolution of a drift cell, in ns.
/// * `hits_min` – minimum number of hits a segment must carry to contribute.
/// * `debug` – report per-round fit values through `tracing`.
///
/// Defaults match the production reconstruction configuration:
/// `prune_cut = 5.0`, `time_offset = 0.0`, `hit_error = 2.8`, `hits_min = 3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DtTimingParams {
    pub prune_cut: f64,
    pub time_offset: Nanosecond,
    pub hit_error: Nanosecond,
    pub hits_min: usize,
    pub debug: bool,
}

impl Default for DtTimingParams {
    fn default() -> Self {
        DtTimingParams {
            prune_cut: 5.0,
            time_offset: 0.0,
            hit_error: 2.8,
            hits_min: 3,
            debug: false,
        }
    }
}

impl DtTimingParams {
    /// Create a new [`DtTimingParamsBuilder`] initialized with the defaults.
    pub fn builder() -> DtTimingParamsBuilder {
        DtTimingParamsBuilder::new()
    }

    pub(crate) fn channel(&self) -> ChannelConfig {
        ChannelConfig::new(TimingChannel::Fast, self.time_offset, self.hit_error)
    }
}

impl fmt::Display for DtTimingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DtTimingParams(prune_cut={:.1}, offset={:.2}ns, err={:.2}ns, hits_min={})",
            self.prune_cut, self.time_offset, self.hit_error, self.hits_min,
        )
    }
}

/// Builder for [`DtTimingParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct DtTimingParamsBuilder {
    params: DtTimingParams,
}

impl DtTimingParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prune_cut(mut self, v: f64) -> Self {
        self.params.prune_cut = v;
        self
    }
    pub fn time_offset(mut self, v: Nanosecond) -> Self {
        self.params.time_offset = v;
        self
    }
    pub fn hit_error(mut self, v: Nanosecond) -> Self {
        self.params.hit_error = v;
        self
    }
    pub fn hits_min(mut self, v: usize) -> Self {
        self.params.hits_min = v;
        self
    }
    pub fn debug(mut self, v: bool) -> Self {
        self.params.debug = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `prune_cut` finite and ≥ 0,
    /// * `hit_error > 0`,
    /// * `hits_min ≥ 1` (a zero minimum would admit empty segments).
    pub fn build(self) -> Result<DtTimingParams, TofitError> {
        let p = &self.params;
        if !p.prune_cut.is_finite() || p.prune_cut < 0.0 {
            return Err(TofitError::InvalidTimingParameter(
                "prune_cut must be finite and >= 0".into(),
            ));
        }
        if !(p.hit_error > 0.0) {
            return Err(TofitError::InvalidChannelConfiguration(
                "hit_error must be > 0".into(),
            ));
        }
        if p.hits_min == 0 {
            return Err(TofitError::InvalidTimingParameter(
                "hits_min must be >= 1".into(),
            ));
        }
        Ok(self.params)
    }
}

/// Timing extractor for the DT subdetector family.
pub struct DtTimingExtractor<'a, M, P, G> {
    params: DtTimingParams,
    builder: PerHitTimeBuilder,
    fit: RobustFit,
    matcher: &'a M,
    propagator: &'a P,
    geometry: &'a G,
}

impl<'a, M, P, G> DtTimingExtractor<'a, M, P, G>
where
    M: SegmentMatcher,
    P: Propagator,
    G: GeometryProvider,
{
    /// Build an extractor from validated parameters and injected services.
    pub fn new(
        params: DtTimingParams,
        matcher: &'a M,
        propagator: &'a P,
        geometry: &'a G,
    ) -> Result<Self, TofitError> {
        let fit = RobustFit::new(params.prune_cut, params.debug)?;
        Ok(DtTimingExtractor {
            builder: PerHitTimeBuilder::new([params.channel()]),
            params,
            fit,
            matcher,
            propagator,
            geometry,
        })
    }

    pub fn params(&self) -> &DtTimingParams {
        &self.params
    }
}

impl<M, P, G> TimeMeasurementExtractor for DtTimingExtractor<'_, M, P, G>
where
    M: SegmentMatcher,
    P: Propagator,
    G: GeometryProvider,
{
    type Event = M::Event;

    fn extract(&self, track: &TrackState, event: &Self::Event) -> TimeMeasurementSequence {
        let segments = self.matcher.match_segments(track, event);
        if self.params.debug {
            debug!(segments = segments.len(), "DT timing extraction");
        }
        let raw = measurements_from_segments(
            &segments,
            track,
            self.propagator,
            self.geometry,
            &self.builder,
            self.params.hits_min,
        );
        self.fit.fit(raw)
    }
}

#[cfg(test)]
mod dt_params_test {
    use super::*;

    #[test]
    fn test_defaults_match_production_configuration() {
        let p = DtTimingParams::default();
        assert_eq!(p.prune_cut, 5.0);
        assert_eq!(p.hit_error, 2.8);
        assert_eq!(p.hits_min, 3);
    }

    #[test]
    fn test_builder_validation() {
        assert!(DtTimingParams::builder().hit_error(0.0).build().is_err());
        assert!(DtTimingParams::builder().hits_min(0).build().is_err());
        assert!(DtTimingParams::builder().prune_cut(f64::NAN).build().is_err());
        let p = DtTimingParams::builder().hits_min(1).build().unwrap();
        assert_eq!(p.hits_min, 1);
    }
}
