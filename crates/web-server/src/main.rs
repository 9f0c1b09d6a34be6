// This main function is the entry point when running `cargo run -p web-server`.
// Its only job is to load the settings and hand off to the library.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = configuration::load_settings()?;
    web_server::run_from_settings(settings).await
}
