use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::models::{Category, CreatedProduct, Product, ProductDraft, SubCategory};

pub mod endpoints {
    pub const LIST_PRODUCTS: &str = "/api/admin/get-all-product";
    pub const LIST_CATEGORIES: &str = "/api/admin/get-all-product-categories";
    pub const LIST_SUB_CATEGORIES: &str = "/api/admin/get-all-product-sub-categories";
    pub const ADD_PRODUCT: &str = "/api/admin/add-product";
    pub const UPDATE_PRODUCT: &str = "/api/admin/update-product";
    pub const DELETE_PRODUCT: &str = "/api/admin/delete-product";
}

/// `{ success, data?, message? }` wrapper around every response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Turn an application-level failure into `Rejected`.
    pub fn into_data(self, fallback: &str) -> Result<T> {
        if !self.success {
            return Err(self.rejection(None, fallback));
        }
        self.data.ok_or(CatalogError::MissingData)
    }

    /// For calls whose success carries no payload.
    pub fn into_ack(self, fallback: &str) -> Result<()> {
        if !self.success {
            return Err(self.rejection(None, fallback));
        }
        Ok(())
    }

    pub fn rejection(&self, status: Option<u16>, fallback: &str) -> CatalogError {
        CatalogError::Rejected {
            status,
            message: self
                .message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

/// The remote catalog service as the dashboard consumes it.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Sub-categories for the selected category name.
    async fn list_sub_categories(&self, category: &str) -> Result<Vec<SubCategory>>;

    /// Uploads the draft, including any pending attachments.
    async fn create_product(&self, draft: &ProductDraft) -> Result<CreatedProduct>;

    async fn update_product(&self, id: &str, draft: &ProductDraft) -> Result<()>;

    async fn delete_product(&self, id: &str) -> Result<()>;

    /// Human-readable location of the service, for headers and logs.
    fn describe(&self) -> String;
}
