use api_client::RestSourceClient;
use axum::{
    routing::{get, post},
    Router,
};
use configuration::Settings;
use database::CountryRepository;
use engine::RefreshService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub repository: CountryRepository,
    pub refresh: Arc<RefreshService>,
}

/// Builds the application router over the shared state.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/status", get(handlers::get_status))
        .route("/countries/refresh", post(handlers::refresh))
        .route("/countries/summary", get(handlers::get_summary))
        .route(
            "/countries",
            get(handlers::list_countries).post(handlers::create_country),
        )
        .route(
            "/countries/:name",
            get(handlers::get_country)
                .put(handlers::update_country)
                .delete(handlers::delete_country),
        )
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every
        // incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = app(state);

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wires the full stack from loaded settings: store pool + migrations,
/// source adapter, refresh engine, router.
pub async fn run_from_settings(settings: Settings) -> anyhow::Result<()> {
    let pool = database::connect(&settings.database).await?;
    database::run_migrations(&pool).await?;
    let repository = CountryRepository::new(pool);

    let source_client = Arc::new(RestSourceClient::new(&settings.sources));
    let refresh = Arc::new(RefreshService::new(source_client, repository.clone()));

    let state = Arc::new(AppState {
        repository,
        refresh,
    });

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    run_server(addr, state).await
}
