//! # Tofit — robust time-of-flight estimation for muon tracks
//!
//! `tofit` estimates a charged particle's inverse velocity (1/β) and its time
//! at vertex from the timing readings of the detector hits associated with its
//! track, automatically discarding outliers caused by noise, mis-association,
//! or out-of-time background.
//!
//! ## Pipeline
//!
//! ```text
//! track + event → matcher → hits → (propagator → distance) → per-hit builder
//!               → raw measurements → robust fit → cleaned sequence
//! ```
//!
//! The iterative outlier-pruning weighted fit lives in [`robust_fit`]; the
//! per-family orchestrators (CSC, DT) in [`extractors`]; the cross-family
//! fusion helpers in [`combination`]. Collaborator services — segment
//! matcher, trajectory propagator, detector geometry — are capability traits
//! injected by the caller and only ever read.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tofit::extractors::csc::{CscTimingExtractor, CscTimingParams};
//! use tofit::extractors::TimeMeasurementExtractor;
//! use tofit::combination::TimingSummary;
//!
//! # fn run<M, P, G>(matcher: &M, propagator: &P, geometry: &G,
//! #                 track: &tofit::propagation::TrackState, event: &M::Event)
//! # -> Result<(), tofit::tofit_errors::TofitError>
//! # where M: tofit::hits::SegmentMatcher,
//! #       P: tofit::propagation::Propagator,
//! #       G: tofit::geometry::GeometryProvider,
//! # {
//! let params = CscTimingParams::builder().prune_cut(9.0).build()?;
//! let extractor = CscTimingExtractor::new(params, matcher, propagator, geometry)?;
//!
//! let sequence = extractor.extract(track, event);
//! if let Some(summary) = TimingSummary::from_sequence(&sequence) {
//!     eprintln!("1/beta = {:.3}, t_vtx = {:.2} ns", summary.inv_beta, summary.time_vtx);
//! }
//! # Ok(()) }
//! ```
//!
//! ## Concurrency
//!
//! All computation is single-threaded, synchronous, and per-track; the crate
//! holds no global mutable state. Tracks of the same event may be processed in
//! parallel by the caller as long as the injected services are safe for
//! concurrent read access.

pub mod combination;
pub mod constants;
pub mod extractors;
pub mod geometry;
pub mod hits;
pub mod measurement;
pub mod propagation;
pub mod robust_fit;
pub mod tofit_errors;

pub use combination::{combine_sequences, TimingSummary};
pub use extractors::csc::{CscTimingExtractor, CscTimingParams};
pub use extractors::dt::{DtTimingExtractor, DtTimingParams};
pub use extractors::TimeMeasurementExtractor;
pub use measurement::{TimeMeasurement, TimeMeasurementSequence};
pub use robust_fit::{FitDiagnostics, RobustFit};
pub use tofit_errors::TofitError;
