//! Local planar projection
//!
//! Maps lon/lat degrees to east/north meters around a reference point using
//! the ellipsoid's radii of curvature at the reference latitude:
//!
//! - `x = N(φ0) · cos(φ0) · Δλ`
//! - `y = M(φ0) · Δφ`
//!
//! The mapping is affine, so straight lines stay straight in both frames and
//! the inverse is exact. Distortion grows with distance from the reference;
//! it is intended for channel-scale geometry (a few kilometers).

use geo::Coord;

use crate::geodesy::Ellipsoid;

/// Equirectangular tangent-plane projector anchored at a reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjector {
    origin: Coord<f64>,
    /// meters per degree of longitude at the reference latitude
    kx: f64,
    /// meters per degree of latitude at the reference latitude
    ky: f64,
}

impl LocalProjector {
    pub fn new(origin: Coord<f64>, ellipsoid: &Ellipsoid) -> Self {
        let lat = origin.y.to_radians();
        let n = ellipsoid.prime_vertical_radius(lat);
        let m = ellipsoid.meridional_radius(lat);
        Self {
            origin,
            kx: n * lat.cos() * std::f64::consts::PI / 180.0,
            ky: m * std::f64::consts::PI / 180.0,
        }
    }

    /// Projector centered on the bounding-box center of `coords`.
    ///
    /// Returns `None` for an empty slice.
    pub fn centered_on(coords: &[Coord<f64>], ellipsoid: &Ellipsoid) -> Option<Self> {
        let first = coords.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for c in coords {
            min_x = min_x.min(c.x);
            min_y = min_y.min(c.y);
            max_x = max_x.max(c.x);
            max_y = max_y.max(c.y);
        }
        let center = Coord { x: (min_x + max_x) / 2.0, y: (min_y + max_y) / 2.0 };
        Some(Self::new(center, ellipsoid))
    }

    pub fn origin(&self) -> Coord<f64> {
        self.origin
    }

    /// lon/lat degrees → local east/north meters
    #[inline]
    pub fn project(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin.x) * self.kx,
            y: (c.y - self.origin.y) * self.ky,
        }
    }

    /// local east/north meters → lon/lat degrees
    #[inline]
    pub fn unproject(&self, p: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.origin.x + p.x / self.kx,
            y: self.origin.y + p.y / self.ky,
        }
    }

    pub fn project_all(&self, coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
        coords.iter().map(|&c| self.project(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_maps_to_zero() {
        let origin = Coord { x: -92.86, y: 30.03 };
        let proj = LocalProjector::new(origin, &Ellipsoid::WGS84);
        let p = proj.project(origin);
        assert_eq!(p, Coord { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_roundtrip() {
        let proj = LocalProjector::new(Coord { x: 5.0, y: 52.0 }, &Ellipsoid::WGS84);
        let c = Coord { x: 5.013, y: 51.991 };
        let back = proj.unproject(proj.project(c));
        assert_relative_eq!(back.x, c.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, c.y, epsilon = 1e-12);
    }

    #[test]
    fn test_short_distance_matches_geodesic() {
        let e = Ellipsoid::WGS84;
        let origin = Coord { x: 10.0, y: 45.0 };
        let proj = LocalProjector::new(origin, &e);
        let q = Coord { x: 10.001, y: 45.001 };
        let p = proj.project(q);
        let planar = (p.x * p.x + p.y * p.y).sqrt();
        assert_relative_eq!(planar, e.distance(origin, q), max_relative = 1e-4);
    }

    #[test]
    fn test_centered_on() {
        let coords = [Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 4.0 }];
        let proj = LocalProjector::centered_on(&coords, &Ellipsoid::WGS84).unwrap();
        assert_eq!(proj.origin(), Coord { x: 1.0, y: 2.0 });
        assert!(LocalProjector::centered_on(&[], &Ellipsoid::WGS84).is_none());
    }
}
