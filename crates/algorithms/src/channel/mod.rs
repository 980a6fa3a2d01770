//! River channel analysis
//!
//! Stages, in pipeline order:
//! - Bank polygon: closes left/right banks into a ring with top/bottom closures
//! - Skeleton: Voronoi ridges inside the polygon as a weighted node graph
//! - Path: shortest skeleton path between the closure anchors (raw centerline)
//! - Resample: equal-distance, evenly-spaced and smoothed centerline variants
//! - Width: bank-to-bank transects perpendicular to the centerline
//! - Conflicts: greedy removal of mutually crossing transects
//! - Measurements: lengths, area, sinuosity
//!
//! [`ChannelAnalysis`] chains them.

mod centerline;
mod conflicts;
mod measurements;
mod path;
mod pipeline;
mod polygon;
mod resample;
mod skeleton;
mod width;

pub use centerline::{Centerline, CenterlineKind};
pub use conflicts::{conflicting_transects, resolve_conflicts, ConflictGraph};
pub use measurements::{
    bank_lengths, centerline_length, channel_area, mean_width, river_statistics, sinuosity,
    RiverStatistics,
};
pub use path::{find_centerline, select_anchors, shortest_path, CenterlinePath};
pub use pipeline::{CenterlineExtraction, ChannelAnalysis, RiverParams};
pub use polygon::{
    build_channel_polygon, densify, BankLines, BankParams, BankPolygon, BankSide, ChannelPolygon,
    ClosureBoundary,
};
pub use resample::{
    resample_equal_distance, resample_evenly_spaced, smooth, ResampleParams,
    SmoothingParams,
};
pub use skeleton::{extract_skeleton_graph, SkeletonGraph};
pub use width::{
    compute_width_transects, window_starts, SlopeMode, Transect, WidthParams, CLOSURE_TOLERANCE,
};
