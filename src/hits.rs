//! # Timing hits, segments, and the matcher capability
//!
//! A [`Hit`] is one detector cell crossing carrying up to two independent
//! timing readings; a [`Segment`] is a pre-built cluster of co-located hits
//! associated with one physical chamber crossing. The [`SegmentMatcher`]
//! capability returns, for a given track and event, the segments that were
//! geometrically associated with the track in one subdetector family.
//!
//! Segment/track matching itself is out of scope here: the matcher is injected
//! by the caller and only ever read.

use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::constants::{Centimeter, Nanosecond};
use crate::geometry::DetectorId;
use crate::propagation::TrackState;

/// Independent timing channels a hit can carry.
///
/// Cathode-strip chambers read out a fast strip channel and a slower wire
/// channel; drift tubes expose a single reading, mapped to [`Fast`](Self::Fast).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingChannel {
    /// Fast channel (CSC strip peaking time, DT cell time).
    Fast,
    /// Slow channel (CSC wire time).
    Slow,
}

impl TimingChannel {
    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            TimingChannel::Fast => 0,
            TimingChannel::Slow => 1,
        }
    }
}

/// One reconstructed detector hit with its timing readings.
///
/// Fields
/// -----------------
/// * `id`: Identifier of the detection element that recorded the hit.
/// * `local_position`: Hit position in the element's surface frame, in cm.
/// * `times`: Raw timing readings in ns, indexed by [`TimingChannel`];
///   `None` marks an invalid or absent reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: DetectorId,
    pub local_position: Vector3<Centimeter>,
    times: [Option<Nanosecond>; 2],
}

impl Hit {
    /// Create a hit with readings on both channels (pass `None` for a missing one).
    pub fn new(
        id: DetectorId,
        local_position: Vector3<Centimeter>,
        fast_time: Option<Nanosecond>,
        slow_time: Option<Nanosecond>,
    ) -> Self {
        Hit {
            id,
            local_position,
            times: [fast_time, slow_time],
        }
    }

    /// Create a hit carrying only a fast-channel reading (DT style).
    pub fn with_fast_time(
        id: DetectorId,
        local_position: Vector3<Centimeter>,
        time: Nanosecond,
    ) -> Self {
        Hit::new(id, local_position, Some(time), None)
    }

    /// The raw reading of one channel, if valid.
    #[inline]
    pub fn time(&self, channel: TimingChannel) -> Option<Nanosecond> {
        self.times[channel.index()]
    }
}

/// Inline-optimized hit container of one segment.
pub type SegmentHits = SmallVec<[Hit; 6]>;

/// A pre-built cluster of co-located hits from one chamber crossing.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Chamber that contains the segment.
    pub chamber: DetectorId,
    pub hits: SegmentHits,
}

impl Segment {
    pub fn new(chamber: DetectorId, hits: impl IntoIterator<Item = Hit>) -> Self {
        Segment {
            chamber,
            hits: hits.into_iter().collect(),
        }
    }
}

/// Capability returning the segments associated with a track in one
/// subdetector family.
///
/// The event type is opaque to this crate: whatever the caller's framework
/// hands around, the matcher knows how to look hits up in it.
pub trait SegmentMatcher {
    type Event;

    /// Segments geometrically associated with `track` in `event`.
    ///
    /// May return an empty collection; the extractors then produce a
    /// well-formed empty sequence.
    fn match_segments(&self, track: &TrackState, event: &Self::Event) -> Vec<Segment>;
}
