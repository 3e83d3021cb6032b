//! # Detector geometry capabilities
//!
//! This module defines the read-only geometry boundary of the timing fit:
//! the [`DetectorId`] identifying a detection element, the [`Surface`] carrying
//! its local→global transform, and the [`GeometryProvider`] capability through
//! which the extractors resolve hit identifiers.
//!
//! The crate never builds or owns geometry; providers are injected by the
//! caller and must be safe for concurrent read access.

use nalgebra::{Matrix3, Vector3};

use crate::constants::Centimeter;

/// Raw identifier of a detection element (chamber or layer).
///
/// Opaque to this crate: it is only ever forwarded to the injected
/// [`GeometryProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DetectorId(pub u32);

impl std::fmt::Display for DetectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "det:{}", self.0)
    }
}

/// Oriented detection surface in the global frame.
///
/// Fields
/// -----------------
/// * `center`: Global position of the surface reference point, in cm.
/// * `rotation`: Local→global rotation of the surface frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub center: Vector3<Centimeter>,
    pub rotation: Matrix3<f64>,
}

impl Surface {
    /// Build a surface from its global center, with the local frame aligned to the global one.
    pub fn axis_aligned(center: Vector3<Centimeter>) -> Self {
        Surface {
            center,
            rotation: Matrix3::identity(),
        }
    }

    /// Map a local position on this surface to the global frame.
    ///
    /// Arguments
    /// -----------------
    /// * `local`: Position in the surface frame, in cm.
    ///
    /// Return
    /// ----------
    /// * The corresponding global position, in cm.
    #[inline]
    pub fn to_global(&self, local: &Vector3<Centimeter>) -> Vector3<Centimeter> {
        self.center + self.rotation * local
    }
}

/// Read-only access to the detector geometry.
///
/// Implemented by the caller's geometry service; the timing extractors only
/// ever query it, one hit at a time. A hit whose identifier is unknown to the
/// provider is dropped from the fit (per-hit, non-fatal).
pub trait GeometryProvider {
    /// Resolve the detection surface of an element, or `None` if the
    /// identifier is not mapped.
    fn surface_of(&self, id: DetectorId) -> Option<Surface>;

    /// Global position of a local point on the element's surface.
    ///
    /// The default implementation goes through [`surface_of`](Self::surface_of).
    fn global_position_of(
        &self,
        id: DetectorId,
        local: &Vector3<Centimeter>,
    ) -> Option<Vector3<Centimeter>> {
        self.surface_of(id).map(|s| s.to_global(local))
    }
}

#[cfg(test)]
mod geometry_test {
    use super::*;

    #[test]
    fn test_to_global_axis_aligned() {
        let surface = Surface::axis_aligned(Vector3::new(100.0, 0.0, 0.0));
        let global = surface.to_global(&Vector3::new(0.0, 2.0, -3.0));
        assert_eq!(global, Vector3::new(100.0, 2.0, -3.0));
    }

    #[test]
    fn test_global_position_goes_through_surface() {
        struct OneChamber;
        impl GeometryProvider for OneChamber {
            fn surface_of(&self, id: DetectorId) -> Option<Surface> {
                (id == DetectorId(5)).then(|| Surface::axis_aligned(Vector3::new(0.0, 50.0, 0.0)))
            }
        }

        let local = Vector3::new(1.0, 0.0, 0.0);
        assert_eq!(
            OneChamber.global_position_of(DetectorId(5), &local),
            Some(Vector3::new(1.0, 50.0, 0.0))
        );
        assert_eq!(OneChamber.global_position_of(DetectorId(6), &local), None);
    }

    #[test]
    fn test_to_global_rotated() {
        // 90 degree rotation around z: local x maps to global y.
        let rotation = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let surface = Surface {
            center: Vector3::zeros(),
            rotation,
        };
        let global = surface.to_global(&Vector3::new(1.0, 0.0, 0.0));
        assert!((global - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }
}
