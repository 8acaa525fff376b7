use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use chem_catalog_core::api::endpoints;
use chem_catalog_core::{CatalogHttpClient, Category, Product, SessionStore, SubCategory};

use crate::fixtures::{envelope, product_json, rejection};

pub const TEST_TOKEN: &str = "test-token-123";

/// wiremock server speaking the catalog admin API.
pub struct MockCatalogServer {
    server: MockServer,
}

impl MockCatalogServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        tracing::info!("Mock catalog server started at {}", server.uri());
        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Client pointed at this server, authenticated with [`TEST_TOKEN`].
    pub fn client(&self) -> CatalogHttpClient {
        self.client_with_session(SessionStore::in_memory(Some(TEST_TOKEN)))
    }

    pub fn client_with_session(&self, session: SessionStore) -> CatalogHttpClient {
        CatalogHttpClient::new(&self.uri(), session, Duration::from_secs(5))
            .expect("reqwest client should build")
    }

    fn authorized(verb: &str, route: String) -> wiremock::MockBuilder {
        Mock::given(method(verb))
            .and(path(route))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
    }

    pub async fn mount_products(&self, products: &[Product]) {
        let data: Vec<Value> = products.iter().map(product_json).collect();
        Self::authorized("GET", endpoints::LIST_PRODUCTS.to_string())
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(data))))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_categories(&self, categories: &[Category]) {
        Self::authorized("GET", endpoints::LIST_CATEGORIES.to_string())
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(categories))))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_sub_categories(&self, sub_categories: &[SubCategory]) {
        Self::authorized("GET", endpoints::LIST_SUB_CATEGORIES.to_string())
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(sub_categories))))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_create_success(&self, id: &str, sds: Option<&str>, tds: Option<&str>) {
        let data = json!({ "_id": id, "sds": sds, "tds": tds });
        Self::authorized("POST", endpoints::ADD_PRODUCT.to_string())
            .respond_with(ResponseTemplate::new(201).set_body_json(envelope(data)))
            .mount(&self.server)
            .await;
    }

    /// Create answered with `{ success: false, message }` and the given status.
    pub async fn mount_create_rejection(&self, status: u16, message: &str) {
        Self::authorized("POST", endpoints::ADD_PRODUCT.to_string())
            .respond_with(ResponseTemplate::new(status).set_body_json(rejection(message)))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_update_success(&self, id: &str) {
        Self::authorized("POST", format!("{}/{id}", endpoints::UPDATE_PRODUCT))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "message": "Product updated" })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_delete_success(&self, id: &str) {
        Self::authorized("DELETE", format!("{}/{id}", endpoints::DELETE_PRODUCT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&self.server)
            .await;
    }

    /// Any route answered with a bare status and a non-JSON body.
    pub async fn mount_plain_error(&self, verb: &str, route: &str, status: u16) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
            .mount(&self.server)
            .await;
    }

    pub async fn received(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests that hit `route`, in arrival order.
    pub async fn received_on(&self, route: &str) -> Vec<Request> {
        self.received()
            .await
            .into_iter()
            .filter(|request| request.url.path() == route)
            .collect()
    }
}
