use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use core_types::{CountryFilter, CountryRecord, CountrySummary, NewCountry, SortOrder, UpdateCountry};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

impl ListQuery {
    // Unknown sort values fall back to store-defined order rather than
    // failing the request.
    fn into_filter(self) -> CountryFilter {
        let sort = match self.sort.as_deref() {
            Some("gdp_desc") => Some(SortOrder::GdpDesc),
            _ => None,
        };
        CountryFilter {
            region: self.region,
            currency_code: self.currency,
            sort,
        }
    }
}

/// # POST /countries/refresh
/// Runs one full refresh pass: concurrent source fetches, reconciliation,
/// atomic apply. Concurrent requests serialize behind the engine's
/// single-flight guard.
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let summary = state.refresh.refresh().await?;
    Ok(Json(json!({
        "success": true,
        "refreshed_at": summary.refreshed_at.to_rfc3339(),
    })))
}

/// # GET /countries
pub async fn list_countries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CountryRecord>>, AppError> {
    let countries = state.repository.list(&query.into_filter()).await?;
    Ok(Json(countries))
}

/// # GET /countries/:name
pub async fn get_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<CountryRecord>, AppError> {
    let country = state
        .repository
        .find_by_name(&name)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(country))
}

/// # POST /countries
pub async fn create_country(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewCountry>,
) -> Result<(StatusCode, Json<CountryRecord>), AppError> {
    let country = state.repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(country)))
}

/// # PUT /countries/:name
pub async fn update_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(payload): Json<UpdateCountry>,
) -> Result<Json<CountryRecord>, AppError> {
    let country = state.repository.update(&name, &payload).await?;
    Ok(Json(country))
}

/// # DELETE /countries/:name
pub async fn delete_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.repository.delete_by_name(&name).await?;
    Ok(Json(json!({ "success": true })))
}

/// # GET /countries/summary
/// The read-only snapshot consumed by the image-rendering collaborator:
/// total count, top five records by estimated GDP, and the watermark.
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountrySummary>, AppError> {
    let total = state.repository.count().await?;
    let top5 = state.repository.top_by_gdp(5).await?;
    let last_refreshed_at = state.repository.watermark().await?;
    Ok(Json(CountrySummary {
        total,
        top5,
        last_refreshed_at,
    }))
}

/// # GET /status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let total = state.repository.count().await?;
    let last_refreshed_at = state.repository.watermark().await?;
    Ok(Json(json!({
        "total_countries": total,
        "last_refreshed_at": last_refreshed_at,
    })))
}
