//! # Meander Core
//!
//! Core types and primitives shared by the meander river algorithms.
//!
//! This crate provides:
//! - `Ellipsoid`: named reference ellipsoids with Vincenty geodesics
//! - `LocalProjector`: lon/lat to local east/north meters
//! - `geometry`: point-in-polygon, line/ring crossings, polygon splitting
//! - `Diagnostics`: caller-owned collector of data-quality events
//! - `Algorithm`: trait for a consistent algorithm API

pub mod diagnostics;
pub mod error;
pub mod geodesy;
pub mod geometry;
pub mod projection;

pub use diagnostics::{DataQualityEvent, Diagnostics};
pub use error::{Error, Result};
pub use geodesy::{Ellipsoid, Geodesic};
pub use projection::LocalProjector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::diagnostics::{DataQualityEvent, Diagnostics};
    pub use crate::error::{Error, Result};
    pub use crate::geodesy::Ellipsoid;
    pub use crate::projection::LocalProjector;
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in meander.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(
        &self,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
