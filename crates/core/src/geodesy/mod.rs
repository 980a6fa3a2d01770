//! Geodesy on a reference ellipsoid
//!
//! Coordinates are `geo::Coord<f64>` with `x = longitude` and
//! `y = latitude`, both in degrees. Distances are in meters, azimuths in
//! degrees clockwise from north.
//!
//! - [`Ellipsoid`]: named reference ellipsoids, parsed from identifier strings
//! - [`Ellipsoid::inverse`]: Vincenty (1975) inverse problem
//! - [`Ellipsoid::direct`]: Vincenty (1975) direct problem
//!
//! Reference:
//! Vincenty, T. (1975). Direct and inverse solutions of geodesics on the
//! ellipsoid with application of nested equations. *Survey Review*, 23(176).

mod vincenty;

use geo::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Solution of the geodesic inverse problem between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodesic {
    /// Ellipsoidal distance in meters
    pub distance: f64,
    /// Azimuth at the first point, degrees in [0, 360)
    pub initial_azimuth: f64,
    /// Azimuth at the second point, degrees in [0, 360)
    pub final_azimuth: f64,
}

/// Reference ellipsoid defined by semi-major axis and flattening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Semi-major axis (m)
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    /// WGS84 (GPS)
    pub const WGS84: Self = Self { a: 6_378_137.0, f: 1.0 / 298.257_223_563 };
    /// WGS72
    pub const WGS72: Self = Self { a: 6_378_135.0, f: 1.0 / 298.26 };
    /// GRS80 (NAD83, ETRS89)
    pub const GRS80: Self = Self { a: 6_378_137.0, f: 1.0 / 298.257_222_101 };
    /// Airy 1830 (OSGB36)
    pub const AIRY_1830: Self = Self { a: 6_377_563.396, f: 1.0 / 299.324_964_6 };
    /// Clarke 1866 (NAD27)
    pub const CLARKE_1866: Self = Self { a: 6_378_206.4, f: 1.0 / 294.978_698_214 };
    /// International 1924 (Hayford)
    pub const INTERNATIONAL_1924: Self = Self { a: 6_378_388.0, f: 1.0 / 297.0 };
    /// Krassovsky 1940
    pub const KRASSOVSKY_1940: Self = Self { a: 6_378_245.0, f: 1.0 / 298.3 };
    /// IUGG mean-radius sphere
    pub const SPHERE: Self = Self { a: 6_371_008.8, f: 0.0 };

    pub const fn new(a: f64, f: f64) -> Self {
        Self { a, f }
    }

    /// Semi-minor axis b = a(1-f)
    #[inline]
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// First eccentricity squared e² = 2f - f²
    #[inline]
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Meridional radius of curvature M at a latitude (radians)
    #[inline]
    pub fn meridional_radius(&self, lat_rad: f64) -> f64 {
        let s = lat_rad.sin();
        let e2 = self.e2();
        self.a * (1.0 - e2) / (1.0 - e2 * s * s).powf(1.5)
    }

    /// Prime-vertical radius of curvature N at a latitude (radians)
    #[inline]
    pub fn prime_vertical_radius(&self, lat_rad: f64) -> f64 {
        let s = lat_rad.sin();
        self.a / (1.0 - self.e2() * s * s).sqrt()
    }

    /// Mean radius (2a + b) / 3, used for spherical fallbacks
    #[inline]
    pub fn mean_radius(&self) -> f64 {
        (2.0 * self.a + self.b()) / 3.0
    }

    /// Geodesic distance in meters between two lon/lat points.
    pub fn distance(&self, p: Coord<f64>, q: Coord<f64>) -> f64 {
        self.inverse(p, q).distance
    }

    /// Initial azimuth (degrees) of the geodesic from `p` to `q`.
    pub fn bearing(&self, p: Coord<f64>, q: Coord<f64>) -> f64 {
        self.inverse(p, q).initial_azimuth
    }

    /// Solve the inverse problem between `p` and `q`.
    pub fn inverse(&self, p: Coord<f64>, q: Coord<f64>) -> Geodesic {
        vincenty::inverse(self, p, q)
    }

    /// Point reached from `start` after `distance` meters along `azimuth` degrees.
    pub fn direct(&self, start: Coord<f64>, azimuth: f64, distance: f64) -> Coord<f64> {
        vincenty::direct(self, start, azimuth, distance)
    }

    /// Total geodesic length of a polyline in meters.
    pub fn path_length(&self, coords: &[Coord<f64>]) -> f64 {
        coords.windows(2).map(|w| self.distance(w[0], w[1])).sum()
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

impl FromStr for Ellipsoid {
    type Err = Error;

    /// Parse an ellipsoid identifier such as `"WGS84"`, `"grs-80"` or
    /// `"Clarke 1866"`. Case, spaces, dashes and underscores are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(|c| c.to_lowercase())
            .collect();

        match key.as_str() {
            "wgs84" => Ok(Self::WGS84),
            "wgs72" => Ok(Self::WGS72),
            "grs80" => Ok(Self::GRS80),
            "airy" | "airy1830" => Ok(Self::AIRY_1830),
            "clrk66" | "clarke1866" => Ok(Self::CLARKE_1866),
            "intl" | "intl1924" | "international1924" | "hayford" => {
                Ok(Self::INTERNATIONAL_1924)
            }
            "krass" | "krassovsky" | "krassovsky1940" => Ok(Self::KRASSOVSKY_1940),
            "sphere" => Ok(Self::SPHERE),
            _ => Err(Error::UnknownEllipsoid(s.to_string())),
        }
    }
}

impl fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ellipsoid(a={}, 1/f={})", self.a, if self.f > 0.0 { 1.0 / self.f } else { 0.0 })
    }
}
