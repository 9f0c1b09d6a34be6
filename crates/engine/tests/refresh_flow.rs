//! End-to-end refresh scenarios: mocked external sources in front of a real
//! in-memory store, driven through the full fetch → reconcile → apply path.

use std::sync::Arc;

use api_client::RestSourceClient;
use configuration::SourcesConfig;
use database::{run_migrations, CountryRepository};
use engine::{RefreshError, RefreshService};
use sqlx::sqlite::SqlitePoolOptions;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn test_repository() -> CountryRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    CountryRepository::new(pool)
}

fn sources_for(server: &MockServer) -> SourcesConfig {
    SourcesConfig {
        countries_url: format!("{}/countries", server.uri()),
        rates_url: format!("{}/rates", server.uri()),
        timeout_secs: 2,
    }
}

async fn mount_catalog(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

async fn mount_rates(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/rates"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn refresh_stores_reconciled_records_and_watermark() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        r#"[
            {"name":"Wakanda","capital":"Birnin Zana","region":"Africa","population":1000000,
             "flag":"https://example.com/wk.svg","currencies":[{"code":"WKD"}]},
            {"name":"Zeropolis","population":0,"currencies":[{"code":"ZPL"}]},
            {"name":"Cashless","population":5000}
        ]"#,
    )
    .await;
    mount_rates(
        &server,
        ResponseTemplate::new(200).set_body_string(r#"{"rates":{"WKD":2.0,"ZPL":1.0}}"#),
    )
    .await;

    let repo = test_repository().await;
    let service = RefreshService::new(
        Arc::new(RestSourceClient::new(&sources_for(&server))),
        repo.clone(),
    );

    let summary = service.refresh().await.unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.updated, 0);

    // Only Wakanda survives the skip policy.
    assert_eq!(repo.count().await.unwrap(), 1);
    assert!(repo.find_by_name("Zeropolis").await.unwrap().is_none());
    assert!(repo.find_by_name("Cashless").await.unwrap().is_none());

    let wakanda = repo.find_by_name("wakanda").await.unwrap().unwrap();
    assert_eq!(wakanda.name, "Wakanda");
    assert_eq!(wakanda.capital.as_deref(), Some("Birnin Zana"));
    assert_eq!(wakanda.population, 1_000_000);
    assert_eq!(wakanda.currency_code.as_deref(), Some("WKD"));
    assert_eq!(wakanda.exchange_rate, Some(2.0));
    assert!((500_000_000.0..=1_000_000_000.0).contains(&wakanda.estimated_gdp));
    assert_eq!(
        wakanda.last_refreshed_at.map(|t| t.to_rfc3339()),
        Some(summary.refreshed_at.to_rfc3339())
    );

    // The watermark records the pass timestamp exactly.
    assert_eq!(
        repo.watermark().await.unwrap(),
        Some(summary.refreshed_at.to_rfc3339())
    );
}

#[tokio::test]
async fn second_pass_updates_in_place_without_duplicating() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        r#"[{"name":"Wakanda","population":1000000,"currencies":[{"code":"WKD"}]}]"#,
    )
    .await;
    mount_rates(
        &server,
        ResponseTemplate::new(200).set_body_string(r#"{"rates":{"WKD":2.0}}"#),
    )
    .await;

    let repo = test_repository().await;
    let service = RefreshService::new(
        Arc::new(RestSourceClient::new(&sources_for(&server))),
        repo.clone(),
    );

    let first = service.refresh().await.unwrap();
    let second = service.refresh().await.unwrap();

    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 1);
    assert_eq!(repo.count().await.unwrap(), 1);
    assert!(second.refreshed_at >= first.refreshed_at);
    assert_eq!(
        repo.watermark().await.unwrap(),
        Some(second.refreshed_at.to_rfc3339())
    );
}

#[tokio::test]
async fn unavailable_rate_source_fails_the_pass_without_mutation() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        r#"[{"name":"Wakanda","population":1000000,"currencies":[{"code":"WKD"}]}]"#,
    )
    .await;
    mount_rates(&server, ResponseTemplate::new(500)).await;

    let repo = test_repository().await;
    let service = RefreshService::new(
        Arc::new(RestSourceClient::new(&sources_for(&server))),
        repo.clone(),
    );

    let err = service.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::SourceUnavailable(_)));

    assert_eq!(repo.count().await.unwrap(), 0);
    assert_eq!(repo.watermark().await.unwrap(), None);
}

#[tokio::test]
async fn structurally_invalid_catalog_is_reported_as_unavailable() {
    let server = MockServer::start().await;
    // The catalog must be a sequence of records; an object is a shape error.
    mount_catalog(&server, r#"{"unexpected":"shape"}"#).await;
    mount_rates(
        &server,
        ResponseTemplate::new(200).set_body_string(r#"{"rates":{"WKD":2.0}}"#),
    )
    .await;

    let repo = test_repository().await;
    let service = RefreshService::new(
        Arc::new(RestSourceClient::new(&sources_for(&server))),
        repo.clone(),
    );

    let err = service.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::SourceUnavailable(_)));
    assert_eq!(repo.watermark().await.unwrap(), None);
}

#[tokio::test]
async fn refresh_never_deletes_records_absent_from_the_catalog() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        r#"[{"name":"Wakanda","population":1000000,"currencies":[{"code":"WKD"}]}]"#,
    )
    .await;
    mount_rates(
        &server,
        ResponseTemplate::new(200).set_body_string(r#"{"rates":{"WKD":2.0}}"#),
    )
    .await;

    let repo = test_repository().await;
    repo.create(&core_types::NewCountry {
        name: "Atlantis".to_string(),
        capital: None,
        region: None,
        population: 12,
        currency_code: None,
        exchange_rate: None,
        estimated_gdp: None,
        flag_url: None,
    })
    .await
    .unwrap();

    let service = RefreshService::new(
        Arc::new(RestSourceClient::new(&sources_for(&server))),
        repo.clone(),
    );
    service.refresh().await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 2);
    assert!(repo.find_by_name("Atlantis").await.unwrap().is_some());
}
