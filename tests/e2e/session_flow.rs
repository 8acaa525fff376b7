/// Configuration file and persisted session driving a real client.
use anyhow::Result;
use tokio_test::{assert_err, assert_ok};

use chem_catalog_core::{CatalogApi, CatalogConfig, CatalogError, CatalogHttpClient, SessionStore};
use test_harness::fixtures::sample_products;
use test_harness::{MockCatalogServer, TEST_TOKEN};

#[tokio::test]
async fn config_file_and_saved_token_reach_the_service() -> Result<()> {
    let server = MockCatalogServer::start().await;
    server.mount_products(&sample_products()).await;

    let dir = tempfile::tempdir()?;
    let session_path = dir.path().join("session.json");
    let config_path = dir.path().join("chem-catalog.toml");
    std::fs::write(
        &config_path,
        format!(
            "[api]\nbase_url = \"{}/\"\ntimeout_secs = 5\n\n[session]\npath = \"{}\"\n",
            server.uri(),
            session_path.display().to_string().replace('\\', "\\\\"),
        ),
    )?;

    let config = CatalogConfig::load_from_file(&config_path)?;
    assert_eq!(config.api.base_url, server.uri());

    SessionStore::open(config.session_path()).save_token(TEST_TOKEN)?;
    let client = CatalogHttpClient::from_config(&config)?;

    let products = assert_ok!(client.list_products().await);
    assert_eq!(products.len(), 3);
    Ok(())
}

#[tokio::test]
async fn clearing_the_session_stops_requests() -> Result<()> {
    let server = MockCatalogServer::start().await;
    server.mount_products(&sample_products()).await;

    let session = SessionStore::in_memory(Some(TEST_TOKEN));
    let client = server.client_with_session(session.clone());
    assert_ok!(client.list_products().await);

    session.clear()?;
    let err = assert_err!(client.list_products().await);
    assert!(matches!(err, CatalogError::NotAuthenticated));
    assert_eq!(server.received().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn wrong_token_is_not_accepted() -> Result<()> {
    let server = MockCatalogServer::start().await;
    server.mount_products(&sample_products()).await;

    let client = server.client_with_session(SessionStore::in_memory(Some("stale-token")));
    let err = assert_err!(client.list_products().await);

    // wiremock answers unmatched requests with a bare 404.
    assert!(matches!(err, CatalogError::ServerError { status: 404 }));
    Ok(())
}
