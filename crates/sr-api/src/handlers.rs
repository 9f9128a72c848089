//! HTTP handlers

use crate::error::{ApiError, ApiResult};
use crate::server::{ApiState, RESULT_LIMIT};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sr_core::unique_countries;
use sr_subscribe::{
    format_timestamp, to_connection_descriptor, to_encoded_subscription, to_routing_config,
    to_subscription_text, SubscriptionOptions,
};
use sr_types::CandidateRecord;

const NO_MATCH: &str = "No servers found";
const NO_WORKING: &str = "No working servers found";

/// `?country=` on the GET endpoints
#[derive(Debug, Default, Deserialize)]
pub struct CountryQuery {
    pub country: Option<String>,
}

/// `POST /api/find-vpn` body
#[derive(Debug, Default, Deserialize)]
pub struct FindRequest {
    #[serde(default)]
    pub country: Option<String>,
}

impl FindRequest {
    fn from_body(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundServer {
    pub name: String,
    /// `host:port`
    pub server: String,
    pub method: String,
    pub latency: u64,
    pub config_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindResponse {
    pub success: bool,
    pub total_tested: usize,
    pub working: usize,
    pub results: Vec<FoundServer>,
    /// Base64 blob of `subscription_links`
    pub subscription_link: String,
    pub subscription_links: Vec<String>,
    pub servers_count: usize,
}

fn no_cache_text() -> [(header::HeaderName, &'static str); 4] {
    [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
    ]
}

/// GET /api/countries
pub async fn countries(State(state): State<ApiState>) -> ApiResult<Json<serde_json::Value>> {
    let candidates = state.discovery.candidates().await?;
    let countries = unique_countries(&candidates);
    tracing::debug!(count = countries.len(), "countries listed");
    Ok(Json(json!({ "countries": countries })))
}

/// POST /api/find-vpn
///
/// An empty body is an empty request (any country); a body that is present must be JSON.
pub async fn find_vpn(State(state): State<ApiState>, body: Bytes) -> ApiResult<Response> {
    let req = FindRequest::from_body(&body)?;
    let country = req.country.unwrap_or_default();
    let report = state.discovery.discover(&country).await?;

    if report.no_match() {
        return Ok(Json(json!({
            "success": false,
            "message": "No servers found matching your criteria"
        }))
        .into_response());
    }
    if report.ranked.is_empty() {
        return Ok(Json(json!({
            "success": false,
            "message": NO_WORKING,
            "totalTested": report.tested
        }))
        .into_response());
    }

    let top = report.ranked.top(RESULT_LIMIT);
    let results: Vec<FoundServer> = top
        .iter()
        .map(|r| FoundServer {
            name: if r.record.label.is_empty() {
                "Unknown".to_string()
            } else {
                r.record.label.clone()
            },
            server: r.record.endpoint(),
            method: r.record.method.clone(),
            latency: r.latency_ms().unwrap_or_default(),
            config_link: to_connection_descriptor(&r.record),
        })
        .collect();
    let records: Vec<CandidateRecord> = top.iter().map(|r| r.record.clone()).collect();

    Ok(Json(FindResponse {
        success: true,
        total_tested: report.tested,
        working: report.working_count,
        subscription_link: to_encoded_subscription(&records),
        subscription_links: results.iter().map(|r| r.config_link.clone()).collect(),
        results,
        servers_count: report.working_count,
    })
    .into_response())
}

/// GET /api/subscription
pub async fn subscription(
    State(state): State<ApiState>,
    Query(query): Query<CountryQuery>,
) -> ApiResult<Response> {
    let records = best_for(&state, query.country.as_deref()).await?;
    let body = to_subscription_text(&records, &SubscriptionOptions::plain());
    Ok((no_cache_text(), body).into_response())
}

/// GET /api/sing-box
pub async fn sing_box(
    State(state): State<ApiState>,
    Query(query): Query<CountryQuery>,
) -> ApiResult<Response> {
    let records = best_for(&state, query.country.as_deref()).await?;
    Ok(Json(to_routing_config(&records, &state.routing)).into_response())
}

/// GET /api/hiddify
pub async fn hiddify(
    State(state): State<ApiState>,
    Query(query): Query<CountryQuery>,
) -> ApiResult<Response> {
    let records = best_for(&state, query.country.as_deref()).await?;
    let options = SubscriptionOptions::hiddify(format_timestamp(&chrono::Local::now()))
        .with_metadata(state.metadata.as_ref().clone());
    let body = to_subscription_text(&records, &options);
    Ok((no_cache_text(), body).into_response())
}

/// Top ranked records for a required country, or the matching 4xx.
async fn best_for(state: &ApiState, country: Option<&str>) -> ApiResult<Vec<CandidateRecord>> {
    let country = country.map(str::trim).unwrap_or_default();
    if country.is_empty() {
        return Err(ApiError::bad_request("Country parameter required"));
    }

    let report = state.discovery.discover(country).await?;
    if report.no_match() {
        return Err(ApiError::not_found(NO_MATCH));
    }
    if report.ranked.is_empty() {
        return Err(ApiError::not_found(NO_WORKING));
    }
    Ok(report.ranked.top_records(RESULT_LIMIT))
}
