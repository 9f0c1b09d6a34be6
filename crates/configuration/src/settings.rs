use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Bind address for the HTTP surface.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// The two external read-only sources and the shared fetch timeout.
///
/// Both fetches are bounded by the same timeout; exceeding it is treated
/// identically to a network failure.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_countries_url")]
    pub countries_url: String,
    #[serde(default = "default_rates_url")]
    pub rates_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Connection string for the persistent store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_countries_url() -> String {
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies"
        .to_string()
}

fn default_rates_url() -> String {
    "https://open.er-api.com/v6/latest/USD".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_database_url() -> String {
    "sqlite://atlas.db?mode=rwc".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            countries_url: default_countries_url(),
            rates_url: default_rates_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}
