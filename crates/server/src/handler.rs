//! HTTP handlers.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use contribs_core::ShapedResponse;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters of `GET /v4/{username}`.
///
/// `y` may repeat, so the raw query string is parsed instead of going
/// through a map-shaped extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionsParams {
    pub years: Vec<String>,
    pub format: Option<String>,
}

impl ContributionsParams {
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "y" => params.years.push(value.into_owned()),
                "format" => params.format = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".into(), version: env!("CARGO_PKG_VERSION").into() })
}

/// GET /v4/{username}?y=<year|all|last>...&format=nested
pub async fn get_contributions(
    State(state): State<AppState>, Path(username): Path<String>, RawQuery(raw): RawQuery,
) -> Result<Json<ShapedResponse>, ApiError> {
    let params = ContributionsParams::from_query(raw.as_deref());

    let body = state
        .service
        .contributions(&username, &params.years, params.format.as_deref())
        .await?;

    Ok(Json(body))
}
