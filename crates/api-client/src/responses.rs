use serde::Deserialize;
use std::collections::HashMap;

/// One country as reported by the catalog source.
///
/// Every field is optional: the source makes no promises about completeness,
/// and the reconciliation skip policy decides what an incomplete entry means.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    pub name: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: Option<f64>,
    pub flag: Option<String>,
    pub currencies: Vec<CurrencyEntry>,
}

/// A currency listed for a country; only the code matters here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrencyEntry {
    pub code: Option<String>,
}

/// The exchange-rate table. A payload without a `rates` mapping fails
/// deserialization, which the caller reports as an unavailable source.
#[derive(Debug, Clone, Deserialize)]
pub struct RateTable {
    pub rates: HashMap<String, f64>,
}
