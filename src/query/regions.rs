//! Region request handling: parameter parsing and response building.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use segmenta::dataset::AttributeFilter;
use segmenta::geometry::{circle_boundary_points, MAX_CIRCLE_SEGMENTS};
use segmenta::models::{BusinessRecord, ConcentrationSummary, Position, RegionDescriptor};
use segmenta::region::{RegionReport, RegionService};
use segmenta::RegionError;

/// Upper bound on records returned in one response regardless of `limit`
const MAX_RECORD_LIMIT: usize = 10_000;

/// Largest polygon accepted in a request
const MAX_POLYGON_VERTICES: usize = 1_000;

/// Largest number of regions in one batch request
const MAX_BATCH_REGIONS: usize = 100;

/// Rejected request; answered with 400 and the message
#[derive(Debug)]
pub struct ApiError(pub String);

impl From<RegionError> for ApiError {
    fn from(err: RegionError) -> Self {
        ApiError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("Rejected request: {}", self.0);
        (StatusCode::BAD_REQUEST, Json(ErrorBody { error: self.0 })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Attribute filter fields shared by every region request
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub municipality: Option<String>,
    pub size: Option<String>,
}

impl FilterParams {
    pub fn to_filter(&self) -> Result<AttributeFilter, ApiError> {
        let size = match self.size.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(s.parse().map_err(ApiError)?),
            _ => None,
        };
        let municipality = self
            .municipality
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from);
        Ok(AttributeFilter { municipality, size })
    }
}

/// `POST /v1/region` body
#[derive(Debug, Deserialize)]
pub struct RegionRequest {
    pub region: RegionDescriptor,
    pub municipality: Option<String>,
    pub size: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /v1/region/circle` query
#[derive(Debug, Deserialize)]
pub struct CircleParams {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub segments: Option<usize>,
    pub municipality: Option<String>,
    pub size: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /v1/region/square` query
#[derive(Debug, Deserialize)]
pub struct SquareParams {
    pub lat: f64,
    pub lon: f64,
    pub side_km: f64,
    pub municipality: Option<String>,
    pub size: Option<String>,
    pub limit: Option<usize>,
}

/// `POST /v1/region/batch` body
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub regions: Vec<RegionDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct RegionResponse<'a> {
    pub summary: ConcentrationSummary,
    pub boundary: Vec<(f64, f64)>,
    pub area_km2: f64,
    pub density_per_km2: f64,
    /// True when `records` was cut at the limit
    pub truncated: bool,
    pub records: Vec<&'a BusinessRecord>,
}

impl<'a> RegionResponse<'a> {
    fn from_report(report: RegionReport<'a>, limit: usize) -> Self {
        let mut records = report.records;
        let truncated = records.len() > limit;
        records.truncate(limit);
        Self {
            summary: report.summary,
            boundary: report.boundary,
            area_km2: report.area_km2,
            density_per_km2: report.density_per_km2,
            truncated,
            records,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchItem {
    Summary {
        summary: ConcentrationSummary,
        area_km2: f64,
        density_per_km2: f64,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
}

fn check_region_size(region: &RegionDescriptor) -> Result<(), ApiError> {
    match region {
        RegionDescriptor::Polygon { vertices } if vertices.len() > MAX_POLYGON_VERTICES => {
            Err(ApiError(format!(
                "polygon has {} vertices, at most {} are accepted",
                vertices.len(),
                MAX_POLYGON_VERTICES
            )))
        }
        _ => Ok(()),
    }
}

fn effective_limit(requested: Option<usize>, default_limit: usize) -> usize {
    requested.unwrap_or(default_limit).min(MAX_RECORD_LIMIT)
}

pub fn execute_region<'a>(
    service: &'a RegionService,
    request: &RegionRequest,
    default_limit: usize,
) -> Result<RegionResponse<'a>, ApiError> {
    let filter = FilterParams {
        municipality: request.municipality.clone(),
        size: request.size.clone(),
    }
    .to_filter()?;
    check_region_size(&request.region)?;

    let report = service.query_filtered(&request.region, &filter)?;
    debug!(
        "{} region matched {} records",
        request.region.kind(),
        report.records.len()
    );
    Ok(RegionResponse::from_report(
        report,
        effective_limit(request.limit, default_limit),
    ))
}

pub fn execute_circle<'a>(
    service: &'a RegionService,
    params: &CircleParams,
    default_limit: usize,
) -> Result<RegionResponse<'a>, ApiError> {
    if let Some(segments) = params.segments.filter(|&s| s > MAX_CIRCLE_SEGMENTS) {
        return Err(ApiError(format!(
            "segments must be at most {}, got {}",
            MAX_CIRCLE_SEGMENTS, segments
        )));
    }
    let center = Position::new(params.lat, params.lon);
    let region = RegionDescriptor::circle(center, params.radius_km)?;
    let request = RegionRequest {
        region,
        municipality: params.municipality.clone(),
        size: params.size.clone(),
        limit: params.limit,
    };

    let mut response = execute_region(service, &request, default_limit)?;
    if let Some(segments) = params.segments {
        response.boundary =
            circle_boundary_points(params.lat, params.lon, params.radius_km, segments)
                .iter()
                .collect();
    }
    Ok(response)
}

pub fn execute_square<'a>(
    service: &'a RegionService,
    params: &SquareParams,
    default_limit: usize,
) -> Result<RegionResponse<'a>, ApiError> {
    let center = Position::new(params.lat, params.lon);
    let request = RegionRequest {
        region: RegionDescriptor::square(center, params.side_km)?,
        municipality: params.municipality.clone(),
        size: params.size.clone(),
        limit: params.limit,
    };
    execute_region(service, &request, default_limit)
}

pub fn execute_batch(
    service: &RegionService,
    request: &BatchRequest,
) -> Result<BatchResponse, ApiError> {
    if request.regions.len() > MAX_BATCH_REGIONS {
        return Err(ApiError(format!(
            "batch has {} regions, at most {} are accepted",
            request.regions.len(),
            MAX_BATCH_REGIONS
        )));
    }
    for region in &request.regions {
        check_region_size(region)?;
    }

    let results = service
        .query_batch(&request.regions)
        .into_iter()
        .map(|result| match result {
            Ok(report) => BatchItem::Summary {
                summary: report.summary,
                area_km2: report.area_km2,
                density_per_km2: report.density_per_km2,
            },
            Err(err) => BatchItem::Error {
                error: err.to_string(),
            },
        })
        .collect();
    Ok(BatchResponse { results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use segmenta::models::SizeCategory;

    fn service() -> RegionService {
        let records = (0..30u64)
            .map(|i| {
                let mut r = BusinessRecord::new(i, format!("Negocio {}", i));
                r.size_category = if i < 20 {
                    SizeCategory::Micro
                } else {
                    SizeCategory::Medium
                };
                r.municipality = Some("Benito Juárez".to_string());
                r.position = Some(Position::new(19.37 + i as f64 * 0.0005, -99.16));
                r
            })
            .collect();
        RegionService::new(records)
    }

    fn circle(radius_km: f64) -> CircleParams {
        CircleParams {
            lat: 19.377,
            lon: -99.16,
            radius_km,
            segments: None,
            municipality: None,
            size: None,
            limit: None,
        }
    }

    #[test]
    fn test_records_truncated_summary_complete() {
        let service = service();
        let mut params = circle(3.0);
        params.limit = Some(5);

        let response = execute_circle(&service, &params, 100).unwrap();
        assert_eq!(response.records.len(), 5);
        assert!(response.truncated);
        assert_eq!(response.summary.total_records, 30);
        assert_eq!(response.records[0].id, 0);
    }

    #[test]
    fn test_default_limit_used() {
        let service = service();
        let response = execute_circle(&service, &circle(3.0), 10).unwrap();
        assert_eq!(response.records.len(), 10);

        let response = execute_circle(&service, &circle(3.0), 500).unwrap();
        assert_eq!(response.records.len(), 30);
        assert!(!response.truncated);
    }

    #[test]
    fn test_custom_segments() {
        let service = service();
        let mut params = circle(1.0);
        params.segments = Some(8);
        let response = execute_circle(&service, &params, 100).unwrap();
        assert_eq!(response.boundary.len(), 9);
    }

    #[test]
    fn test_invalid_region_is_bad_request() {
        let service = service();
        let err = execute_circle(&service, &circle(-2.0), 100).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let params = SquareParams {
            lat: 19.37,
            lon: -99.16,
            side_km: 0.0,
            municipality: None,
            size: None,
            limit: None,
        };
        assert!(matches!(
            execute_square(&service, &params, 100),
            Err(ApiError(_))
        ));
    }

    #[test]
    fn test_unknown_size_is_bad_request() {
        let service = service();
        let mut params = circle(3.0);
        params.size = Some("gigantic".to_string());
        assert!(matches!(
            execute_circle(&service, &params, 100),
            Err(ApiError(_))
        ));
    }

    #[test]
    fn test_region_request_body() {
        let service = service();
        let body = r#"{
            "region": {"type": "circle", "center": {"lat": 19.377, "lon": -99.16}, "radius_km": 3.0},
            "size": "medium"
        }"#;
        let request: RegionRequest = serde_json::from_str(body).unwrap();
        let response = execute_region(&service, &request, 100).unwrap();
        assert_eq!(response.summary.total_records, 10);
        assert_eq!(response.summary.dominant_category, Some(SizeCategory::Medium));
    }

    #[test]
    fn test_square_endpoint() {
        let service = service();
        let params = SquareParams {
            lat: 19.3775,
            lon: -99.16,
            side_km: 4.0,
            municipality: Some("benito juárez".to_string()),
            size: None,
            limit: None,
        };
        let response = execute_square(&service, &params, 100).unwrap();
        assert_eq!(response.summary.total_records, 30);
        assert_eq!(response.boundary.len(), 5);
    }

    #[test]
    fn test_batch_reports_errors_inline() {
        let service = service();
        let body = r#"{"regions": [
            {"type": "circle", "center": {"lat": 19.377, "lon": -99.16}, "radius_km": 3.0},
            {"type": "circle", "center": {"lat": 19.377, "lon": -99.16}, "radius_km": 0.0},
            {"type": "polygon", "vertices": [[0.0, 0.0], [1.0, 1.0]]}
        ]}"#;
        let request: BatchRequest = serde_json::from_str(body).unwrap();
        let response = execute_batch(&service, &request).unwrap();

        assert_eq!(response.results.len(), 3);
        assert!(matches!(
            &response.results[0],
            BatchItem::Summary { summary, .. } if summary.total_records == 30
        ));
        assert!(matches!(response.results[1], BatchItem::Error { .. }));
        assert!(matches!(response.results[2], BatchItem::Error { .. }));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["results"][1]["error"].is_string());
    }

    #[test]
    fn test_segments_above_cap_rejected() {
        let service = service();
        for segments in [MAX_CIRCLE_SEGMENTS + 1, 1_000_000_000, usize::MAX] {
            let mut params = circle(1.0);
            params.segments = Some(segments);
            let err = execute_circle(&service, &params, 100).unwrap_err();
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }

        let mut params = circle(1.0);
        params.segments = Some(MAX_CIRCLE_SEGMENTS);
        let response = execute_circle(&service, &params, 100).unwrap();
        assert_eq!(response.boundary.len(), MAX_CIRCLE_SEGMENTS + 1);
    }

    #[test]
    fn test_oversized_polygon_rejected() {
        let service = service();
        let vertices: Vec<(f64, f64)> =
            circle_boundary_points(19.377, -99.16, 2.0, MAX_POLYGON_VERTICES)
                .iter()
                .collect();
        assert_eq!(vertices.len(), MAX_POLYGON_VERTICES + 1);

        let request = RegionRequest {
            region: RegionDescriptor::Polygon {
                vertices: vertices.clone(),
            },
            municipality: None,
            size: None,
            limit: None,
        };
        assert!(matches!(
            execute_region(&service, &request, 100),
            Err(ApiError(_))
        ));

        let batch = BatchRequest {
            regions: vec![RegionDescriptor::Polygon { vertices }],
        };
        assert!(execute_batch(&service, &batch).is_err());
    }

    #[test]
    fn test_polygon_at_vertex_cap_accepted() {
        let service = service();
        // Closing point repeats the first, so this is within the cap
        let vertices: Vec<(f64, f64)> =
            circle_boundary_points(19.377, -99.16, 2.0, MAX_POLYGON_VERTICES - 1)
                .iter()
                .collect();
        let request = RegionRequest {
            region: RegionDescriptor::Polygon { vertices },
            municipality: None,
            size: None,
            limit: None,
        };
        let response = execute_region(&service, &request, 100).unwrap();
        assert_eq!(response.summary.total_records, 30);
    }

    #[test]
    fn test_too_many_batch_regions_rejected() {
        let service = service();
        let region = RegionDescriptor::circle(Position::new(19.377, -99.16), 1.0).unwrap();
        let batch = BatchRequest {
            regions: vec![region; MAX_BATCH_REGIONS + 1],
        };
        assert!(execute_batch(&service, &batch).is_err());
    }

    #[test]
    fn test_filter_params() {
        let params = FilterParams {
            municipality: Some("  Coyoacán ".to_string()),
            size: Some("small".to_string()),
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.size, Some(SizeCategory::Small));
        assert_eq!(filter.municipality.as_deref(), Some("Coyoacán"));

        let blank = FilterParams {
            municipality: Some(" ".to_string()),
            size: Some(String::new()),
        };
        assert!(blank.to_filter().unwrap().is_empty());

        let unknown = FilterParams {
            municipality: None,
            size: Some("huge".to_string()),
        };
        assert!(unknown.to_filter().is_err());
    }
}
