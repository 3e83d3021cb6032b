//! # Track states and trajectory propagation
//!
//! This module defines the kinematic snapshot used to seed propagation
//! ([`TrackState`]) and the [`Propagator`] capability that carries a state to a
//! detection surface.
//!
//! ## Role in the timing fit
//!
//! Every matched hit needs a flight distance before it can contribute a
//! timing measurement. The extractors ask the injected propagator for the
//! path length from the reference state to the hit's surface; when no valid
//! intersection exists they fall back to the straight-line magnitude of the
//! hit's global position. Propagation failure is therefore per-hit and never
//! fatal.
//!
//! ## Reference point convention
//!
//! Distances accumulate from the true reference point along the trajectory:
//! `distance = path_length + |state.position|`. The reference state is
//! normally the track endpoint closest to the origin, see
//! [`TrackState::from_endpoints`].

use nalgebra::Vector3;

use crate::constants::Centimeter;
use crate::geometry::Surface;

/// Electric charge of a track, in units of the elementary charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charge {
    Plus,
    Minus,
}

/// Immutable kinematic snapshot seeding trajectory propagation.
///
/// Owned by the caller, borrowed by the timing extractors for the duration of
/// one extraction call.
///
/// Fields
/// -----------------
/// * `position`: Global reference position, in cm.
/// * `momentum`: Momentum at the reference position, in GeV/c.
/// * `charge`: Track charge (±1).
/// * `field`: Reference magnetic field along z, in T.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackState {
    pub position: Vector3<Centimeter>,
    pub momentum: Vector3<f64>,
    pub charge: Charge,
    pub field: f64,
}

impl TrackState {
    /// Create a track state from explicit kinematics.
    pub fn new(
        position: Vector3<Centimeter>,
        momentum: Vector3<f64>,
        charge: Charge,
        field: f64,
    ) -> Self {
        TrackState {
            position,
            momentum,
            charge,
            field,
        }
    }

    /// Build the reference state from a track's innermost and outermost endpoints.
    ///
    /// The fit measures all distances from the point of the trajectory closest
    /// to the interaction region, so the endpoint with the smaller position
    /// magnitude is chosen. When the outer endpoint wins, its momentum is
    /// flipped so the state still points along increasing flight distance.
    ///
    /// Arguments
    /// -----------------
    /// * `inner_position`, `inner_momentum`: Innermost track endpoint.
    /// * `outer_position`, `outer_momentum`: Outermost track endpoint.
    /// * `charge`: Track charge.
    /// * `field`: Reference magnetic field along z, in T.
    ///
    /// Return
    /// ----------
    /// * A [`TrackState`] anchored at the endpoint closer to the origin.
    pub fn from_endpoints(
        inner_position: Vector3<Centimeter>,
        inner_momentum: Vector3<f64>,
        outer_position: Vector3<Centimeter>,
        outer_momentum: Vector3<f64>,
        charge: Charge,
        field: f64,
    ) -> Self {
        if inner_position.norm() > outer_position.norm() {
            TrackState::new(outer_position, -outer_momentum, charge, field)
        } else {
            TrackState::new(inner_position, inner_momentum, charge, field)
        }
    }

    /// Distance of the reference point from the origin, in cm.
    #[inline]
    pub fn reference_distance(&self) -> Centimeter {
        self.position.norm()
    }
}

/// Outcome of a propagation to a target surface.
///
/// Fields
/// -----------------
/// * `path_length`: Signed path length along the trajectory, in cm.
/// * `valid`: Whether the propagated state actually crosses the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub path_length: Centimeter,
    pub valid: bool,
}

impl Crossing {
    pub fn new(path_length: Centimeter) -> Self {
        Crossing {
            path_length,
            valid: true,
        }
    }
}

/// Trajectory propagation capability.
///
/// Implemented by the caller (e.g. a stepping-helix propagator); this crate
/// only consumes it. Implementations must be safe for concurrent read access,
/// the extractors never mutate them.
pub trait Propagator {
    /// Propagate `state` to `surface`.
    ///
    /// Return
    /// ----------
    /// * `Some(Crossing)` with the path length when the trajectory reaches the
    ///   surface (check [`Crossing::valid`]),
    /// * `None` when no intersection exists.
    fn propagate_with_path(&self, state: &TrackState, surface: &Surface) -> Option<Crossing>;
}

#[cfg(test)]
mod propagation_test {
    use super::*;

    #[test]
    fn test_from_endpoints_keeps_inner() {
        let state = TrackState::from_endpoints(
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, 5.0, 0.0),
            Vector3::new(500.0, 0.0, 0.0),
            Vector3::new(0.0, 4.0, 0.0),
            Charge::Minus,
            3.8,
        );
        assert_eq!(state.position, Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(state.momentum, Vector3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_from_endpoints_flips_outer_momentum() {
        // Cosmic-like topology: the "inner" endpoint sits farther out.
        let state = TrackState::from_endpoints(
            Vector3::new(700.0, 0.0, 0.0),
            Vector3::new(3.0, 0.0, 0.0),
            Vector3::new(20.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Charge::Plus,
            3.8,
        );
        assert_eq!(state.position, Vector3::new(20.0, 0.0, 0.0));
        assert_eq!(state.momentum, Vector3::new(-2.0, 0.0, 0.0));
        assert!((state.reference_distance() - 20.0).abs() < 1e-12);
    }
}
