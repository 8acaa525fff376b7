use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{endpoints, ApiEnvelope, CatalogApi};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::models::{Attachment, Category, CreatedProduct, Product, ProductDraft, ProductField, SubCategory};
use crate::session::SessionStore;

/// reqwest-backed client for the catalog admin API.
#[derive(Debug, Clone)]
pub struct CatalogHttpClient {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl CatalogHttpClient {
    pub fn new(base_url: &str, session: SessionStore, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let session = SessionStore::open(config.session_path());
        Self::new(&config.api.base_url, session, config.api.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}{path}/{id}` with the identifier percent-encoded as one segment.
    fn item_url(&self, path: &str, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url(path)).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl(self.base_url.clone()))?
            .push(id);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.session.token()?.ok_or(CatalogError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    /// Parse the envelope even on non-2xx so the server's message survives.
    async fn read_envelope<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<ApiEnvelope<T>> {
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<ApiEnvelope<T>>(&body) {
            Ok(envelope) if status.is_success() => Ok(envelope),
            Ok(envelope) => {
                warn!("catalog service answered {status}: {:?}", envelope.message);
                Err(envelope.rejection(Some(status.as_u16()), fallback))
            }
            Err(_) if !status.is_success() => {
                warn!("catalog service answered {status} with a non-envelope body");
                Err(CatalogError::ServerError {
                    status: status.as_u16(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_list<T: DeserializeOwned>(&self, request: RequestBuilder, fallback: &str) -> Result<Vec<T>> {
        let response = self.authorized(request)?.send().await?;
        Self::read_envelope::<Vec<T>>(response, fallback)
            .await?
            .into_data(fallback)
    }
}

/// Multipart body for create/update.
///
/// Pending uploads become file parts. Stored references are echoed back as
/// text only when `include_stored` is set (updates), so the server keeps them.
pub fn product_form(draft: &ProductDraft, include_stored: bool) -> Result<Form> {
    let mut form = Form::new();
    for field in ProductField::REQUIRED {
        form = form.text(field.wire_name(), draft.text(field).trim().to_string());
    }

    for field in [ProductField::Sds, ProductField::Tds] {
        match draft.attachment(field) {
            Some(Attachment::Pending(upload)) => {
                let part = Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.content_type)
                    .map_err(|_| CatalogError::InvalidContentType {
                        file_name: upload.file_name.clone(),
                        content_type: upload.content_type.clone(),
                    })?;
                form = form.part(field.wire_name(), part);
            }
            Some(Attachment::Stored(url)) if include_stored => {
                form = form.text(field.wire_name(), url.clone());
            }
            _ => {}
        }
    }

    Ok(form)
}

#[async_trait]
impl CatalogApi for CatalogHttpClient {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let url = self.url(endpoints::LIST_PRODUCTS);
        debug!("fetching products: {url}");

        let products: Vec<Product> = self
            .get_list(self.client.get(&url), "Failed to load products")
            .await?;
        info!("loaded {} products", products.len());
        Ok(products)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let url = self.url(endpoints::LIST_CATEGORIES);
        debug!("fetching categories: {url}");

        self.get_list(self.client.get(&url), "Failed to load categories").await
    }

    async fn list_sub_categories(&self, category: &str) -> Result<Vec<SubCategory>> {
        let url = self.url(endpoints::LIST_SUB_CATEGORIES);
        debug!("fetching sub-categories of {category:?}: {url}");

        let request = self.client.get(&url).query(&[("category", category)]);
        self.get_list(request, "Failed to load subcategories").await
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<CreatedProduct> {
        let url = self.url(endpoints::ADD_PRODUCT);
        info!("creating product {:?} ({})", draft.name, draft.cas);

        let form = product_form(draft, false)?;
        let response = self.authorized(self.client.post(&url))?.multipart(form).send().await?;
        let created = Self::read_envelope::<CreatedProduct>(response, "Failed to add product")
            .await?
            .into_data("Failed to add product")?;

        info!("created product {}", created.id);
        Ok(created)
    }

    async fn update_product(&self, id: &str, draft: &ProductDraft) -> Result<()> {
        let url = self.item_url(endpoints::UPDATE_PRODUCT, id)?;
        info!("updating product {id}");

        let form = product_form(draft, true)?;
        let response = self.authorized(self.client.post(url))?.multipart(form).send().await?;
        Self::read_envelope::<serde_json::Value>(response, "Update failed")
            .await?
            .into_ack("Update failed")
    }

    async fn delete_product(&self, id: &str) -> Result<()> {
        let url = self.item_url(endpoints::DELETE_PRODUCT, id)?;
        info!("deleting product {id}");

        let response = self.authorized(self.client.delete(url))?.send().await?;
        Self::read_envelope::<serde_json::Value>(response, "Delete failed")
            .await?
            .into_ack("Delete failed")
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
