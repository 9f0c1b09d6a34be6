//! # Atlas Refresh Engine
//!
//! The orchestrator of one refresh pass: fetch both external sources
//! concurrently, reconcile the catalog against the rate table, and hand the
//! candidate set to the store's transactional applier. A pass either
//! succeeds completely or leaves the store untouched; the per-record skip
//! policy inside `reconcile` is the only sanctioned partial outcome.

use api_client::SourceClient;
use chrono::Utc;
use core_types::RefreshSummary;
use database::CountryRepository;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub mod error;
pub mod reconciler;

pub use error::RefreshError;
pub use reconciler::{
    reconcile, FixedMultiplier, MultiplierSource, UniformMultiplier, MULTIPLIER_MAX,
    MULTIPLIER_MIN,
};

/// Runs refresh passes against the store, one at a time.
///
/// The store's transaction serializes the candidates *within* a pass, but
/// two concurrent passes could still race each other at the isolation level.
/// `refresh_lock` makes the required "one refresh at a time" discipline an
/// explicit single-flight guard instead of an accident of request
/// serialization: concurrent callers queue behind it.
pub struct RefreshService {
    source_client: Arc<dyn SourceClient>,
    repository: CountryRepository,
    refresh_lock: Mutex<()>,
}

impl RefreshService {
    pub fn new(source_client: Arc<dyn SourceClient>, repository: CountryRepository) -> Self {
        Self {
            source_client,
            repository,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Executes one full refresh pass: concurrent bounded fetches, then
    /// reconciliation, then the atomic upsert + watermark transaction.
    ///
    /// No retries happen here; a failed pass is reported to the caller, who
    /// may re-invoke.
    pub async fn refresh(&self) -> Result<RefreshSummary, RefreshError> {
        let _guard = self.refresh_lock.lock().await;

        let (catalog_result, rates_result) = tokio::join!(
            self.source_client.fetch_catalog(),
            self.source_client.fetch_rates()
        );

        // Either fetch failing, or returning a structurally invalid payload,
        // collapses into one availability verdict for the caller.
        let catalog = catalog_result.map_err(|e| {
            warn!(error = %e, "Country catalog fetch failed");
            RefreshError::SourceUnavailable(format!("Could not fetch the country catalog: {e}"))
        })?;
        let rates = rates_result.map_err(|e| {
            warn!(error = %e, "Rate table fetch failed");
            RefreshError::SourceUnavailable(format!("Could not fetch the exchange-rate table: {e}"))
        })?;

        let now = Utc::now();
        let mut multipliers = UniformMultiplier;
        let candidates = reconciler::reconcile(&catalog, &rates, now, &mut multipliers);
        info!(
            catalog = catalog.len(),
            candidates = candidates.len(),
            "Reconciled catalog against rate table"
        );

        let outcome = self.repository.apply_refresh(&candidates, now).await?;
        info!(
            inserted = outcome.inserted,
            updated = outcome.updated,
            "Refresh pass complete"
        );

        Ok(RefreshSummary {
            refreshed_at: now,
            inserted: outcome.inserted,
            updated: outcome.updated,
        })
    }
}
