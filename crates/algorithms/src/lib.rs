//! # Meander Algorithms
//!
//! River centerline and channel width extraction from bank lines.
//!
//! Given ordered left and right bank coordinates (lon/lat), the `channel`
//! module builds the channel polygon, extracts its Voronoi skeleton, finds
//! the centerline as a shortest path through it, resamples and smooths that
//! centerline, and measures width with perpendicular transects.
//!
//! ```no_run
//! use meander_algorithms::prelude::*;
//! use geo::Coord;
//!
//! let banks = BankLines::new(
//!     vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.01 }],
//!     vec![Coord { x: 0.001, y: 0.0 }, Coord { x: 0.001, y: 0.01 }],
//! )?;
//! let mut analysis = ChannelAnalysis::new(banks, RiverParams::default())?;
//! let transects = analysis.width_transects(CenterlineKind::Smoothed)?;
//! println!("{:?}", analysis.statistics(&transects));
//! # Ok::<(), meander_core::Error>(())
//! ```

pub mod channel;
pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::channel::{
        build_channel_polygon, compute_width_transects, extract_skeleton_graph, find_centerline,
        resample_equal_distance, resample_evenly_spaced, resolve_conflicts, smooth, BankLines,
        BankPolygon, Centerline, CenterlineExtraction, CenterlineKind, ChannelAnalysis,
        RiverParams, RiverStatistics, SkeletonGraph, SlopeMode, Transect, WidthParams,
    };
    pub use meander_core::prelude::*;
}
