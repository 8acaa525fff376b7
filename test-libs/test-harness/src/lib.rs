pub mod fake_api;
pub mod fixtures;
pub mod gated_api;
pub mod mock_server;

use std::sync::Once;

pub use fake_api::{FakeCatalogApi, Failure, Operation, RecordedCall};
pub use fixtures::TestFixtures;
pub use gated_api::GatedCatalogApi;
pub use mock_server::{MockCatalogServer, TEST_TOKEN};

static TRACING: Once = Once::new();

/// Route tracing output through the test writer, once per process.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Main test harness that coordinates the mock service and fixtures
pub struct TestHarness {
    pub server: MockCatalogServer,
    pub fixtures: TestFixtures,
}

impl TestHarness {
    /// Start a mock catalog server preloaded with the sample lists.
    pub async fn setup() -> anyhow::Result<Self> {
        init_tracing();

        let fixtures = TestFixtures::load();
        let server = MockCatalogServer::start().await;
        server.mount_products(&fixtures.products).await;
        server.mount_categories(&fixtures.categories).await;
        server.mount_sub_categories(&fixtures.sub_categories).await;

        Ok(Self { server, fixtures })
    }

    pub fn client(&self) -> chem_catalog_core::CatalogHttpClient {
        self.server.client()
    }
}

/// Body of a captured request as text (multipart bodies are mostly ASCII).
pub fn body_text(request: &wiremock::Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}
