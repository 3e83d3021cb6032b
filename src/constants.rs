//! # Constants and type definitions for Tofit
//!
//! This module centralizes the **physical constants**, **unit aliases**, and **common
//! container types** used throughout the `tofit` library.
//!
//! ## Overview
//!
//! - Speed-of-light constants in detector units (cm/ns)
//! - Unit aliases used across the crate (`Centimeter`, `Nanosecond`, …)
//! - Inline-optimized containers for per-track timing data
//!
//! These definitions are shared by the per-hit builder, the robust fit engine,
//! and the family extractors.

use crate::measurement::TimeMeasurement;
use smallvec::SmallVec;

// -------------------------------------------------------------------------------------------------
// Physical constants
// -------------------------------------------------------------------------------------------------

/// Speed of light in vacuum, in cm/ns (CODATA).
pub const VLIGHT_CM_NS: f64 = 29.9792458;

/// Speed of light as used by the timing fit, in cm/ns.
///
/// The detector timing calibration is expressed against the rounded value 30,
/// so the fit and the per-hit weights must use the same constant: a hit at
/// distance `d` with corrected time 0 then yields exactly `1/beta = 1`.
pub const VLIGHT_TIMING: f64 = 30.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Distance in centimeters
pub type Centimeter = f64;
/// Time in nanoseconds
pub type Nanosecond = f64;
/// Ratio of the speed of light to the particle speed (1 for light-speed particles)
pub type InverseBeta = f64;

// -------------------------------------------------------------------------------------------------
// Data containers
// -------------------------------------------------------------------------------------------------

/// A small, inline-optimized container for the timing measurements of a single track.
///
/// Muon tracks rarely cross more than a handful of chambers, so the common case
/// stays on the stack.
pub type TimeMeasurements = SmallVec<[TimeMeasurement; 8]>;
