//! Centerline value type

use geo::{Coord, LineString};
use meander_core::Ellipsoid;
use serde::{Deserialize, Serialize};

/// How a centerline was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CenterlineKind {
    /// Raw shortest path through the bisector skeleton
    Voronoi,
    /// Fixed geodesic step along the raw path
    EqualDistance,
    /// Fixed point count along the raw path
    EvenlySpaced,
    /// Low-pass filtered evenly-spaced path
    Smoothed,
}

/// Ordered centerline coordinates (`x = lon`, `y = lat`), start anchor first.
#[derive(Debug, Clone, PartialEq)]
pub struct Centerline {
    kind: CenterlineKind,
    coords: Vec<Coord<f64>>,
}

impl Centerline {
    pub fn new(kind: CenterlineKind, coords: Vec<Coord<f64>>) -> Self {
        Self { kind, coords }
    }

    pub fn kind(&self) -> CenterlineKind {
        self.kind
    }

    pub fn coords(&self) -> &[Coord<f64>] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn first(&self) -> Option<Coord<f64>> {
        self.coords.first().copied()
    }

    pub fn last(&self) -> Option<Coord<f64>> {
        self.coords.last().copied()
    }

    /// Geodesic length in meters.
    pub fn length_m(&self, ellipsoid: &Ellipsoid) -> f64 {
        ellipsoid.path_length(&self.coords)
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.coords.clone())
    }

    pub fn into_coords(self) -> Vec<Coord<f64>> {
        self.coords
    }
}
