use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::SortOrder;

/// The canonical per-country record as persisted in the store.
///
/// `name` is the identifying key and is unique under case-insensitive
/// comparison. A record whose currency has no known exchange rate carries
/// `exchange_rate = None` and `estimated_gdp = 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRecord {
    pub id: i64,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: f64,
    pub flag_url: Option<String>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// A reconciled, not-yet-persisted country record produced by one refresh
/// pass. Same shape as `CountryRecord` minus the storage id; the timestamp
/// is always the shared pass timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: f64,
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

/// Payload for creating a record directly, bypassing the refresh pass.
///
/// Unlike refresh candidates, a direct create may omit the currency code;
/// the stored record then carries a zero GDP estimate.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

/// Partial update payload. `None` means "leave the stored value unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCountry {
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: Option<i64>,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

/// Filter and ordering options for the country listing.
#[derive(Debug, Clone, Default)]
pub struct CountryFilter {
    pub region: Option<String>,
    pub currency_code: Option<String>,
    pub sort: Option<SortOrder>,
}

/// The result of a successful refresh pass.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub refreshed_at: DateTime<Utc>,
    pub inserted: u64,
    pub updated: u64,
}

/// One entry of the "largest estimated GDP" leaderboard in the summary
/// snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct GdpLeader {
    pub name: String,
    pub estimated_gdp: f64,
    pub flag_url: Option<String>,
}

/// Read-only snapshot consumed by the status and image-rendering
/// collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct CountrySummary {
    pub total: i64,
    pub top5: Vec<GdpLeader>,
    pub last_refreshed_at: Option<String>,
}
