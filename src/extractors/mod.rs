//! # Per-family timing extractors
//!
//! One extractor per subdetector family, all behind the
//! [`TimeMeasurementExtractor`] capability:
//!
//! * [`csc::CscTimingExtractor`] – cathode-strip chambers, strip + wire channels,
//! * [`dt::DtTimingExtractor`] – drift tubes, one channel with a minimum-hits
//!   requirement per segment.
//!
//! Each extractor orchestrates the same pipeline: matcher → per-hit
//! propagation → per-hit builder → robust fit. The fit engine itself is
//! family-agnostic; only the channel configuration and segment filtering
//! differ between families.
//!
//! Collaborator services (matcher, propagator, geometry) are injected as
//! read-only references whose lifetime is bound to the enclosing per-event
//! context; the extractors never own or extend them.

use tracing::debug;

use crate::constants::TimeMeasurements;
use crate::geometry::GeometryProvider;
use crate::hits::Segment;
use crate::measurement::{PerHitTimeBuilder, TimeMeasurementSequence};
use crate::propagation::{Propagator, TrackState};

pub mod csc;
pub mod dt;

/// Capability of one subdetector family: turn a track and an event into a
/// cleaned timing-measurement sequence.
///
/// A track with zero associated hits yields a well-formed empty sequence,
/// never an error.
pub trait TimeMeasurementExtractor {
    type Event;

    fn extract(&self, track: &TrackState, event: &Self::Event) -> TimeMeasurementSequence;
}

/// Shared hit loop of the family extractors.
///
/// For every hit of every segment with at least `hits_min` hits:
///
/// 1. resolve the hit's surface (unknown identifiers drop the hit),
/// 2. propagate the reference state to it; on success the distance is
///    `path_length + |reference position|`, on failure the straight-line
///    magnitude of the hit's global position (an approximation, never an
///    error),
/// 3. hand the `(hit, distance)` pair to the builder.
pub(crate) fn measurements_from_segments<P, G>(
    segments: &[Segment],
    track: &TrackState,
    propagator: &P,
    geometry: &G,
    builder: &PerHitTimeBuilder,
    hits_min: usize,
) -> TimeMeasurements
where
    P: Propagator,
    G: GeometryProvider,
{
    let reference = track.reference_distance();
    let mut raw = TimeMeasurements::new();

    for segment in segments {
        if segment.hits.len() < hits_min {
            continue;
        }
        for hit in &segment.hits {
            let Some(surface) = geometry.surface_of(hit.id) else {
                debug!(id = %hit.id, "hit on unmapped detector element, dropped");
                continue;
            };
            let distance = match propagator.propagate_with_path(track, &surface) {
                Some(crossing) if crossing.valid => crossing.path_length + reference,
                _ => surface.to_global(&hit.local_position).norm(),
            };
            raw.extend(builder.build_measurements(hit, distance));
        }
    }

    raw
}
