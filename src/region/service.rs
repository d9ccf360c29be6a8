//! Region query service: filter, summarize, and describe a selection.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::analysis::analyze_concentration;
use super::RegionIndex;
use crate::dataset::AttributeFilter;
use crate::error::RegionError;
use crate::geometry::{
    circle_area_km2, circle_boundary_points, polygon_area_km2, validate_ring,
    DEFAULT_CIRCLE_SEGMENTS, MAX_CIRCLE_SEGMENTS,
};
use crate::models::{BusinessRecord, ConcentrationSummary, RegionDescriptor};

/// Everything the map needs to show for one selected region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionReport<'a> {
    pub region: RegionDescriptor,
    pub summary: ConcentrationSummary,
    /// Closed `(lon, lat)` outline to draw
    pub boundary: Vec<(f64, f64)>,
    pub area_km2: f64,
    /// Businesses per km²
    pub density_per_km2: f64,
    pub records: Vec<&'a BusinessRecord>,
}

/// Region lookup service over an immutable dataset
pub struct RegionService {
    index: RegionIndex,
    circle_segments: usize,
}

impl RegionService {
    pub fn new(records: Vec<BusinessRecord>) -> Self {
        Self {
            index: RegionIndex::build(records),
            circle_segments: DEFAULT_CIRCLE_SEGMENTS,
        }
    }

    /// Number of segments used when drawing circle outlines, capped at
    /// [`MAX_CIRCLE_SEGMENTS`].
    pub fn with_circle_segments(mut self, segments: usize) -> Self {
        self.circle_segments = if segments == 0 {
            DEFAULT_CIRCLE_SEGMENTS
        } else {
            segments.min(MAX_CIRCLE_SEGMENTS)
        };
        self
    }

    pub fn records(&self) -> &[BusinessRecord] {
        self.index.records()
    }

    /// Analyze the businesses inside `region`.
    ///
    /// Structurally invalid regions (including circles with a non-positive
    /// radius) are rejected rather than reported as empty.
    pub fn query(&self, region: &RegionDescriptor) -> Result<RegionReport<'_>, RegionError> {
        self.query_filtered(region, &AttributeFilter::default())
    }

    /// Like [`query`](Self::query), restricted to records passing `filter`.
    pub fn query_filtered(
        &self,
        region: &RegionDescriptor,
        filter: &AttributeFilter,
    ) -> Result<RegionReport<'_>, RegionError> {
        // Each region is validated once; the polygon built here drives the
        // lookup, the outline and the area.
        let (mut records, boundary, area_km2) = match region {
            RegionDescriptor::Polygon { vertices } => {
                let polygon = validate_ring(vertices)?;
                let boundary = polygon.exterior().coords().map(|c| (c.x, c.y)).collect();
                (
                    self.index.within_polygon(&polygon),
                    boundary,
                    polygon_area_km2(&polygon),
                )
            }
            RegionDescriptor::Circle { center, radius_km } => {
                region.validate()?;
                let boundary =
                    circle_boundary_points(center.lat, center.lon, *radius_km, self.circle_segments)
                        .iter()
                        .collect();
                (
                    self.index.within_circle(center.lat, center.lon, *radius_km),
                    boundary,
                    circle_area_km2(*radius_km),
                )
            }
        };
        if !filter.is_empty() {
            records.retain(|r| filter.matches(r));
        }

        let summary = analyze_concentration(records.iter().copied());
        let density_per_km2 = if area_km2 > 0.0 {
            records.len() as f64 / area_km2
        } else {
            0.0
        };

        debug!(
            "{} query: {} records, dominant {} ({:.1}%)",
            region.kind(),
            records.len(),
            summary.dominant_label(),
            summary.dominant_percentage
        );

        Ok(RegionReport {
            region: region.clone(),
            summary,
            boundary,
            area_km2,
            density_per_km2,
            records,
        })
    }

    /// Run independent queries in parallel; results keep the input order.
    pub fn query_batch(
        &self,
        regions: &[RegionDescriptor],
    ) -> Vec<Result<RegionReport<'_>, RegionError>> {
        regions.par_iter().map(|region| self.query(region)).collect()
    }
}
