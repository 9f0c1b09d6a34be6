use crate::error::SourceError;
use async_trait::async_trait;
use configuration::SourcesConfig;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::{CatalogEntry, CurrencyEntry, RateTable};

/// The generic, abstract interface for the two external read-only sources.
/// This trait is the contract the refresh engine works against, allowing the
/// underlying implementation (live or mock) to be swapped out.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetches the country catalog: one entry per country with name,
    /// population and listed currencies.
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, SourceError>;

    /// Fetches the exchange-rate table: a mapping from currency code to its
    /// USD rate.
    async fn fetch_rates(&self) -> Result<RateTable, SourceError>;
}

/// A concrete implementation of `SourceClient` over plain REST endpoints.
///
/// Both fetches share one `reqwest::Client` carrying the configured timeout,
/// so each request is independently bounded. No retries happen here; a
/// failed fetch is reported to the caller, who may re-invoke the pass.
#[derive(Clone)]
pub struct RestSourceClient {
    client: reqwest::Client,
    countries_url: String,
    rates_url: String,
}

impl RestSourceClient {
    pub fn new(config: &SourcesConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("Failed to build reqwest client"),
            countries_url: config.countries_url.clone(),
            rates_url: config.rates_url.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        debug!("Requesting external source {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| SourceError::Deserialization(e.to_string()))
        } else {
            Err(SourceError::Status(status))
        }
    }
}

#[async_trait]
impl SourceClient for RestSourceClient {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, SourceError> {
        self.get_json(&self.countries_url).await
    }

    async fn fetch_rates(&self) -> Result<RateTable, SourceError> {
        self.get_json(&self.rates_url).await
    }
}
