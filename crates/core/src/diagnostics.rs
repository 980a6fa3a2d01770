//! Data-quality diagnostics
//!
//! Stages never fail on questionable input geometry. Instead they push a
//! [`DataQualityEvent`] into the caller-owned [`Diagnostics`] and carry on
//! with a best-effort (possibly empty) result. Every recorded event is also
//! emitted as a `tracing` warning.

use geo::Coord;
use std::fmt;

/// A non-fatal condition detected while processing a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DataQualityEvent {
    /// The bank ring crosses itself.
    InvalidPolygon { self_intersections: usize },
    /// No bisector ridge survived the inside/degree filters.
    EmptySkeleton,
    /// The two anchors are not connected in the skeleton graph.
    DisconnectedSkeleton { start: Coord<f64>, end: Coord<f64> },
    /// A transect anchor lies outside the channel polygon.
    AnchorOutsidePolygon { anchor: Coord<f64> },
    /// A transect crossing touches a synthetic closure boundary.
    ClosureArtifact { anchor: Coord<f64> },
    /// No unique inside sub-segment contains the transect anchor.
    AmbiguousSplit { anchor: Coord<f64> },
    /// Both crossings of a transect fall on the same bank.
    SameBankCrossing { anchor: Coord<f64> },
}

impl DataQualityEvent {
    /// Short machine-friendly label for the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DataQualityEvent::InvalidPolygon { .. } => "invalid_polygon",
            DataQualityEvent::EmptySkeleton => "empty_skeleton",
            DataQualityEvent::DisconnectedSkeleton { .. } => "disconnected_skeleton",
            DataQualityEvent::AnchorOutsidePolygon { .. } => "anchor_outside_polygon",
            DataQualityEvent::ClosureArtifact { .. } => "closure_artifact",
            DataQualityEvent::AmbiguousSplit { .. } => "ambiguous_split",
            DataQualityEvent::SameBankCrossing { .. } => "same_bank_crossing",
        }
    }
}

impl fmt::Display for DataQualityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityEvent::InvalidPolygon { self_intersections } => write!(
                f,
                "bank polygon is not simple ({} self-intersections)",
                self_intersections
            ),
            DataQualityEvent::EmptySkeleton => write!(f, "skeleton graph is empty"),
            DataQualityEvent::DisconnectedSkeleton { start, end } => write!(
                f,
                "no skeleton path between ({}, {}) and ({}, {})",
                start.x, start.y, end.x, end.y
            ),
            DataQualityEvent::AnchorOutsidePolygon { anchor } => write!(
                f,
                "transect anchor ({}, {}) lies outside the channel",
                anchor.x, anchor.y
            ),
            DataQualityEvent::ClosureArtifact { anchor } => write!(
                f,
                "transect at ({}, {}) touches a closure boundary",
                anchor.x, anchor.y
            ),
            DataQualityEvent::AmbiguousSplit { anchor } => write!(
                f,
                "transect at ({}, {}) has no unique inside segment",
                anchor.x, anchor.y
            ),
            DataQualityEvent::SameBankCrossing { anchor } => write!(
                f,
                "transect at ({}, {}) crosses the same bank twice",
                anchor.x, anchor.y
            ),
        }
    }
}

/// Caller-owned accumulator of data-quality events for one run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    events: Vec<DataQualityEvent>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and log it.
    pub fn record(&mut self, event: DataQualityEvent) {
        tracing::warn!(kind = event.kind(), "{}", event);
        self.events.push(event);
    }

    pub fn events(&self) -> &[DataQualityEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of recorded events of the given kind (see [`DataQualityEvent::kind`]).
    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Drain all events, leaving the accumulator empty.
    pub fn take(&mut self) -> Vec<DataQualityEvent> {
        std::mem::take(&mut self.events)
    }
}
