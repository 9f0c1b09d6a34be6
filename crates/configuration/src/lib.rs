use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{DatabaseConfig, ServerConfig, Settings, SourcesConfig};

/// Loads the application configuration from the `config.toml` file.
///
/// Any value can be overridden through the environment with an `ATLAS_`
/// prefix and `__` as the section separator, e.g. `ATLAS_DATABASE__URL` or
/// `ATLAS_SOURCES__TIMEOUT_SECS`.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`.
        .add_source(config::File::with_name("config.toml").required(false))
        .add_source(config::Environment::with_prefix("ATLAS").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct.
    let settings = builder.try_deserialize::<Settings>()?;

    Ok(settings)
}
