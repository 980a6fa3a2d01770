//! Channel analysis pipeline
//!
//! [`ChannelAnalysis`] runs the stages that depend only on the banks
//! (polygon, skeleton, raw centerline) once and keeps their outputs.
//! Centerline variants, transects and statistics are derived from those on
//! demand and never modify them.

use meander_core::{Algorithm, DataQualityEvent, Diagnostics, Ellipsoid, Error, Result};
use serde::{Deserialize, Serialize};

use super::centerline::{Centerline, CenterlineKind};
use super::conflicts::resolve_conflicts;
use super::measurements::{river_statistics, RiverStatistics};
use super::path::{find_centerline, CenterlinePath};
use super::polygon::{build_channel_polygon, BankLines, BankParams, BankPolygon};
use super::resample::{
    resample_equal_distance, resample_evenly_spaced, smooth, ResampleParams, SmoothingParams,
};
use super::skeleton::{extract_skeleton_graph, SkeletonGraph};
use super::width::{compute_width_transects, Transect, WidthParams};

/// Everything configurable about a channel analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverParams {
    /// Ellipsoid identifier, e.g. `"WGS84"` or `"GRS80"`
    pub ellipsoid: String,
    pub bank: BankParams,
    pub resample: ResampleParams,
    pub smoothing: SmoothingParams,
    pub width: WidthParams,
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            ellipsoid: "WGS84".to_string(),
            bank: BankParams::default(),
            resample: ResampleParams::default(),
            smoothing: SmoothingParams::default(),
            width: WidthParams::default(),
        }
    }
}

/// Cached bank-derived stages plus on-demand derived products.
#[derive(Debug, Clone)]
pub struct ChannelAnalysis {
    params: RiverParams,
    ellipsoid: Ellipsoid,
    banks: BankLines,
    bank_polygon: BankPolygon,
    skeleton: SkeletonGraph,
    path: CenterlinePath,
    diagnostics: Diagnostics,
}

impl ChannelAnalysis {
    /// Build the polygon, skeleton and raw centerline.
    ///
    /// Only invalid parameters fail. A missing centerline is reported
    /// through [`ChannelAnalysis::diagnostics`].
    pub fn new(banks: BankLines, params: RiverParams) -> Result<Self> {
        let ellipsoid: Ellipsoid = params.ellipsoid.parse()?;
        let banks = banks.densified(params.bank.densify);
        let mut diagnostics = Diagnostics::new();

        let bank_polygon = build_channel_polygon(&banks.left, &banks.right, &mut diagnostics)?;
        let skeleton = extract_skeleton_graph(
            &banks.left,
            &banks.right,
            &bank_polygon.polygon,
            &ellipsoid,
            &mut diagnostics,
        );
        let path = find_centerline(
            &skeleton,
            &bank_polygon.top,
            &bank_polygon.bottom,
            &mut diagnostics,
        );

        tracing::info!(
            ellipsoid = %ellipsoid,
            bank_points = banks.left.len() + banks.right.len(),
            skeleton_nodes = skeleton.node_count(),
            centerline_points = path.centerline.as_ref().map_or(0, Centerline::len),
            events = diagnostics.len(),
            "channel analysis ready"
        );

        Ok(Self { params, ellipsoid, banks, bank_polygon, skeleton, path, diagnostics })
    }

    pub fn params(&self) -> &RiverParams {
        &self.params
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Banks after densification
    pub fn banks(&self) -> &BankLines {
        &self.banks
    }

    pub fn bank_polygon(&self) -> &BankPolygon {
        &self.bank_polygon
    }

    pub fn skeleton(&self) -> &SkeletonGraph {
        &self.skeleton
    }

    pub fn path(&self) -> &CenterlinePath {
        &self.path
    }

    /// Shortest skeleton path, `None` when the skeleton is disconnected.
    pub fn raw_centerline(&self) -> Option<&Centerline> {
        self.path.centerline.as_ref()
    }

    /// Data-quality events recorded so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn events(&self) -> &[DataQualityEvent] {
        self.diagnostics.events()
    }

    /// Centerline variant of the given kind. `Ok(None)` when there is no raw
    /// centerline.
    pub fn centerline(&self, kind: CenterlineKind) -> Result<Option<Centerline>> {
        let Some(raw) = self.raw_centerline() else {
            return Ok(None);
        };
        let resample = &self.params.resample;
        let line = match kind {
            CenterlineKind::Voronoi => raw.clone(),
            CenterlineKind::EqualDistance => {
                resample_equal_distance(raw, resample.equal_distance_step_m, &self.ellipsoid)?
            }
            CenterlineKind::EvenlySpaced => {
                resample_evenly_spaced(raw, resample.evenly_spaced_points, &self.ellipsoid)?
            }
            CenterlineKind::Smoothed => {
                let even =
                    resample_evenly_spaced(raw, resample.evenly_spaced_points, &self.ellipsoid)?;
                smooth(&even, &self.params.smoothing)?
            }
        };
        Ok(Some(line))
    }

    /// Width transects along the given centerline variant, conflict-resolved
    /// when `params.width.remove_intersections` is set.
    pub fn width_transects(&mut self, kind: CenterlineKind) -> Result<Vec<Transect>> {
        let Some(line) = self.centerline(kind)? else {
            return Ok(Vec::new());
        };
        let transects = compute_width_transects(
            &line,
            &self.bank_polygon,
            &self.params.width,
            &self.ellipsoid,
            &mut self.diagnostics,
        )?;
        if self.params.width.remove_intersections {
            Ok(resolve_conflicts(&transects))
        } else {
            Ok(transects)
        }
    }

    /// Lengths, area and sinuosity of the raw centerline, plus the mean
    /// width of `transects`.
    pub fn statistics(&self, transects: &[Transect]) -> RiverStatistics {
        river_statistics(
            &self.banks,
            &self.bank_polygon,
            self.raw_centerline(),
            transects,
            &self.ellipsoid,
        )
    }
}

/// Centerline extraction as an [`Algorithm`].
#[derive(Debug, Clone, Default)]
pub struct CenterlineExtraction;

impl Algorithm for CenterlineExtraction {
    type Input = BankLines;
    type Output = ChannelAnalysis;
    type Params = RiverParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Centerline Extraction"
    }

    fn description(&self) -> &'static str {
        "River centerline from bank lines via the shortest path through the Voronoi skeleton"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        ChannelAnalysis::new(input, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::Coord;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn rectangle() -> BankLines {
        BankLines::new(vec![c(0.0, 0.0), c(0.0, 10.0)], vec![c(1.0, 0.0), c(1.0, 10.0)]).unwrap()
    }

    #[test]
    fn test_params_json_round_trip() {
        let params = RiverParams {
            ellipsoid: "GRS80".to_string(),
            width: WidthParams { span: 5, ..WidthParams::default() },
            ..RiverParams::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: RiverParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_partial_params_use_defaults() {
        let json = r#"{"width": {"slope_mode": "Direct"}, "bank": {"densify": 2}}"#;
        let params: RiverParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.ellipsoid, "WGS84");
        assert_eq!(params.bank.densify, 2);
        assert_eq!(params.width.span, 3);
        assert_eq!(params.width.slope_mode, crate::channel::SlopeMode::Direct);
        assert_eq!(params.resample, ResampleParams::default());
    }

    #[test]
    fn test_unknown_ellipsoid() {
        let params = RiverParams { ellipsoid: "mars".to_string(), ..RiverParams::default() };
        let err = ChannelAnalysis::new(rectangle(), params).unwrap_err();
        assert!(matches!(err, Error::UnknownEllipsoid(_)));
    }

    #[test]
    fn test_rectangle_end_to_end() {
        let mut analysis = CenterlineExtraction.execute_default(rectangle()).unwrap();
        let raw = analysis.raw_centerline().unwrap();
        assert!(raw.len() >= 2);
        for p in raw.coords() {
            assert_relative_eq!(p.x, 0.5, epsilon = 1e-9);
        }

        let transects = analysis.width_transects(CenterlineKind::Voronoi).unwrap();
        assert!(!transects.is_empty());
        for t in &transects {
            assert_relative_eq!(t.width_coord(), 1.0, epsilon = 1e-9);
        }
        assert!(analysis.diagnostics().is_empty(), "{:?}", analysis.events());
    }

    #[test]
    fn test_empty_skeleton_reported_once() {
        // four co-circular corners give no finite ridge
        let params = RiverParams { bank: BankParams { densify: 0 }, ..RiverParams::default() };
        let mut analysis = ChannelAnalysis::new(rectangle(), params).unwrap();

        assert!(analysis.skeleton().is_empty());
        assert!(analysis.raw_centerline().is_none());
        assert_eq!(analysis.diagnostics().count("empty_skeleton"), 1);
        assert_eq!(analysis.diagnostics().len(), 1);
        assert!(analysis.centerline(CenterlineKind::Smoothed).unwrap().is_none());
        assert!(analysis.width_transects(CenterlineKind::Voronoi).unwrap().is_empty());
    }

    #[test]
    fn test_variants_share_endpoints() {
        let analysis = ChannelAnalysis::new(rectangle(), RiverParams::default()).unwrap();
        let raw = analysis.raw_centerline().unwrap().clone();
        let kinds = [
            CenterlineKind::EqualDistance,
            CenterlineKind::EvenlySpaced,
            CenterlineKind::Smoothed,
        ];
        for kind in kinds {
            let line = analysis.centerline(kind).unwrap().unwrap();
            assert_eq!(line.kind(), kind);
            let (a, b) = (line.first().unwrap(), line.last().unwrap());
            assert_relative_eq!(a.x, raw.first().unwrap().x, epsilon = 1e-9);
            assert_relative_eq!(a.y, raw.first().unwrap().y, epsilon = 1e-9);
            assert_relative_eq!(b.x, raw.last().unwrap().x, epsilon = 1e-9);
            assert_relative_eq!(b.y, raw.last().unwrap().y, epsilon = 1e-9);
        }
    }
}
