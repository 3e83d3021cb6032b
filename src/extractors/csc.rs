//! # CSC timing extractor
//!
//! Timing extraction for the cathode-strip-chamber family. Every CSC hit can
//! carry two independent readings — the fast strip peaking time and the slower
//! anode-wire time — and each enabled channel contributes its own
//! [`TimeMeasurement`](crate::measurement::TimeMeasurement) to the fit.
//!
//! ## Configuration
//!
//! [`CscTimingParams`] follows the builder-with-validation idiom:
//!
//! ```rust
//! use tofit::extractors::csc::CscTimingParams;
//!
//! let params = CscTimingParams::builder()
//!     .prune_cut(9.0)
//!     .strip_error(7.0)
//!     .wire_error(8.6)
//!     .use_wire_time(false)
//!     .build()
//!     .unwrap();
//! ```

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

/// Configuration of the CSC timing extraction.
///
/// Fields
/// -----------------
/// * `prune_cut` – deviation threshold of the outlier-pruning loop.
/// * `strip_time_offset`, `wire_time_offset` – fixed per-channel calibration
///   offsets, in ns.
/// * `strip_error`, `wire_error` – fixed per-channel timing resolutions, in ns.
/// * `use_strip_time`, `use_wire_time` – channel enable switches. With both
///   disabled the extractor produces only empty sequences.
/// * `debug` – report per-round fit values through `tracing`.
///
/// Defaults match the production reconstruction configuration:
/// `prune_cut = 9.0`, offsets 0.0, `strip_error = 7.0`, `wire_error = 8.6`,
/// both channels enabled, debug off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CscTimingParams {
    pub prune_cut: f64,
    pub strip_time_offset: Nanosecond,
    pub wire_time_offset: Nanosecond,
    pub strip_error: Nanosecond,
    pub wire_error: Nanosecond,
    pub use_strip_time: bool,
    pub use_wire_time: bool,
    pub debug: bool,
}

impl Default for CscTimingParams {
    fn default() -> Self {
        CscTimingParams {
            prune_cut: 9.0,
            strip_time_offset: 0.0,
            wire_time_offset: 0.0,
            strip_error: 7.0,
            wire_error: 8.6,
            use_strip_time: true,
            use_wire_time: true,
            debug: false,
        }
    }
}

impl CscTimingParams {
    /// Create a new [`CscTimingParamsBuilder`] initialized with the defaults.
    pub fn builder() -> CscTimingParamsBuilder {
        CscTimingParamsBuilder::new()
    }

    pub(crate) fn channels(&self) -> [ChannelConfig; 2] {
        [
            ChannelConfig {
                channel: TimingChannel::Fast,
                offset: self.strip_time_offset,
                resolution: self.strip_error,
                enabled: self.use_strip_time,
            },
            ChannelConfig {
                channel: TimingChannel::Slow,
                offset: self.wire_time_offset,
                resolution: self.wire_error,
                enabled: self.use_wire_time,
            },
        ]
    }
}

impl fmt::Display for CscTimingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CscTimingParams(prune_cut={:.1}, strip: off={:.2}ns err={:.2}ns on={}, wire: off={:.2}ns err={:.2}ns on={})",
            self.prune_cut,
            self.strip_time_offset,
            self.strip_error,
            self.use_strip_time,
            self.wire_time_offset,
            self.wire_error,
            self.use_wire_time,
        )
    }
}

/// Builder for [`CscTimingParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct CscTimingParamsBuilder {
    params: CscTimingParams,
}

impl CscTimingParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prune_cut(mut self, v: f64) -> Self {
        self.params.prune_cut = v;
        self
    }
    pub fn strip_time_offset(mut self, v: Nanosecond) -> Self {
        self.params.strip_time_offset = v;
        self
    }
    pub fn wire_time_offset(mut self, v: Nanosecond) -> Self {
        self.params.wire_time_offset = v;
        self
    }
    pub fn strip_error(mut self, v: Nanosecond) -> Self {
        self.params.strip_error = v;
        self
    }
    pub fn wire_error(mut self, v: Nanosecond) -> Self {
        self.params.wire_error = v;
        self
    }
    pub fn use_strip_time(mut self, v: bool) -> Self {
        self.params.use_strip_time = v;
        self
    }
    pub fn use_wire_time(mut self, v: bool) -> Self {
        self.params.use_wire_time = v;
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
    /// * `strip_error > 0`, `wire_error > 0` (weights divide by them).
    pub fn build(self) -> Result<CscTimingParams, TofitError> {
        let p = &self.params;
        if !p.prune_cut.is_finite() || p.prune_cut < 0.0 {
            return Err(TofitError::InvalidTimingParameter(
                "prune_cut must be finite and >= 0".into(),
            ));
        }
        if !(p.strip_error > 0.0) || !(p.wire_error > 0.0) {
            return Err(TofitError::InvalidChannelConfiguration(
                "channel resolutions must be > 0".into(),
            ));
        }
        Ok(self.params)
    }
}

/// Timing extractor for the CSC subdetector family.
///
/// Holds its configuration plus read-only references to the collaborator
/// services; safe to share across threads as long as the services are.
pub struct CscTimingExtractor<'a, M, P, G> {
    params: CscTimingParams,
    builder: PerHitTimeBuilder,
    fit: RobustFit,
    matcher: &'a M,
    propagator: &'a P,
    geometry: &'a G,
}

impl<'a, M, P, G> CscTimingExtractor<'a, M, P, G>
where
    M: SegmentMatcher,
    P: Propagator,
    G: GeometryProvider,
{
    /// Build an extractor from validated parameters and injected services.
    pub fn new(
        params: CscTimingParams,
        matcher: &'a M,
        propagator: &'a P,
        geometry: &'a G,
    ) -> Result<Self, TofitError> {
        let fit = RobustFit::new(params.prune_cut, params.debug)?;
        Ok(CscTimingExtractor {
            builder: PerHitTimeBuilder::new(params.channels()),
            params,
            fit,
            matcher,
            propagator,
            geometry,
        })
    }

    pub fn params(&self) -> &CscTimingParams {
        &self.params
    }
}

impl<M, P, G> TimeMeasurementExtractor for CscTimingExtractor<'_, M, P, G>
where
    M: SegmentMatcher,
    P: Propagator,
    G: GeometryProvider,
{
    type Event = M::Event;

    fn extract(&self, track: &TrackState, event: &Self::Event) -> TimeMeasurementSequence {
        let segments = self.matcher.match_segments(track, event);
        if self.params.debug {
            debug!(segments = segments.len(), "CSC timing extraction");
        }
        // A segment needs at least one hit to contribute.
        let raw = measurements_from_segments(
            &segments,
            track,
            self.propagator,
            self.geometry,
            &self.builder,
            1,
        );
        self.fit.fit(raw)
    }
}

#[cfg(test)]
mod csc_params_test {
    use super::*;

    #[test]
    fn test_defaults_match_production_configuration() {
        let p = CscTimingParams::default();
        assert_eq!(p.prune_cut, 9.0);
        assert_eq!(p.strip_error, 7.0);
        assert_eq!(p.wire_error, 8.6);
        assert!(p.use_strip_time && p.use_wire_time);
        assert!(!p.debug);
    }

    #[test]
    fn test_builder_validation() {
        assert!(CscTimingParams::builder().prune_cut(-1.0).build().is_err());
        assert!(CscTimingParams::builder().strip_error(0.0).build().is_err());
        assert!(CscTimingParams::builder().wire_error(-3.0).build().is_err());
        let p = CscTimingParams::builder()
            .prune_cut(4.0)
            .use_wire_time(false)
            .build()
            .unwrap();
        assert_eq!(p.prune_cut, 4.0);
        assert!(!p.use_wire_time);
    }
}
