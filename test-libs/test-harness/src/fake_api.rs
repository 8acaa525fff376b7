use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chem_catalog_core::{
    Attachment, CatalogApi, CatalogError, Category, CreatedProduct, Product, ProductDraft, Result, SubCategory,
};

use crate::fixtures;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListProducts,
    ListCategories,
    ListSubCategories,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ListProducts,
    ListCategories,
    ListSubCategories(String),
    Create(ProductDraft),
    Update(String, ProductDraft),
    Delete(String),
}

impl RecordedCall {
    pub fn operation(&self) -> Operation {
        match self {
            RecordedCall::ListProducts => Operation::ListProducts,
            RecordedCall::ListCategories => Operation::ListCategories,
            RecordedCall::ListSubCategories(_) => Operation::ListSubCategories,
            RecordedCall::Create(_) => Operation::Create,
            RecordedCall::Update(..) => Operation::Update,
            RecordedCall::Delete(_) => Operation::Delete,
        }
    }
}

/// Scripted failure for the next call of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// `{ success: false, message }`
    Rejected(String),
    /// Non-2xx without an envelope.
    Server(u16),
    /// Connection refused.
    Unreachable,
}

impl Failure {
    fn into_error(self) -> CatalogError {
        match self {
            Failure::Rejected(message) => CatalogError::Rejected { status: None, message },
            Failure::Server(status) => CatalogError::ServerError { status },
            Failure::Unreachable => CatalogError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "catalog service unreachable",
            )),
        }
    }
}

#[derive(Default)]
struct FakeState {
    products: Vec<Product>,
    categories: Vec<Category>,
    sub_categories: Vec<SubCategory>,
    calls: Vec<RecordedCall>,
    failures: HashMap<Operation, VecDeque<Failure>>,
    next_id: u64,
}

/// In-memory catalog service that records every call.
///
/// Sub-category lookups ignore the requested category, like the real
/// service, so client-side filtering gets exercised.
#[derive(Default)]
pub struct FakeCatalogApi {
    state: Mutex<FakeState>,
}

impl FakeCatalogApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preloaded with the sample products and reference lists.
    pub fn with_fixtures() -> Self {
        let api = Self::new();
        {
            let mut state = api.lock();
            state.products = fixtures::sample_products();
            state.categories = fixtures::sample_categories();
            state.sub_categories = fixtures::sample_sub_categories();
        }
        api
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::new();
        api.lock().products = products;
        api
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn fail_next(&self, operation: Operation, failure: Failure) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(failure);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    fn record(&self, call: RecordedCall) -> Result<()> {
        let mut state = self.lock();
        let operation = call.operation();
        state.calls.push(call);
        match state.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }
}

/// Pending uploads land as stored references, the way the service answers.
fn settle(attachment: &Attachment) -> Attachment {
    match attachment {
        Attachment::Pending(upload) => Attachment::Stored(format!("uploads/{}", upload.file_name)),
        other => other.clone(),
    }
}

#[async_trait]
impl CatalogApi for FakeCatalogApi {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.record(RecordedCall::ListProducts)?;
        Ok(self.lock().products.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.record(RecordedCall::ListCategories)?;
        Ok(self.lock().categories.clone())
    }

    async fn list_sub_categories(&self, category: &str) -> Result<Vec<SubCategory>> {
        self.record(RecordedCall::ListSubCategories(category.to_string()))?;
        Ok(self.lock().sub_categories.clone())
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<CreatedProduct> {
        self.record(RecordedCall::Create(draft.clone()))?;

        let mut state = self.lock();
        if state.products.iter().any(|p| p.cas == draft.cas) {
            return Err(Failure::Rejected("CAS exists".to_string()).into_error());
        }
        state.next_id += 1;
        let id = format!("fake-{}", state.next_id);
        let product = Product {
            sds: settle(&draft.sds),
            tds: settle(&draft.tds),
            ..draft.clone().into_product(id.clone())
        };
        let created = CreatedProduct {
            id,
            sds: product.sds.clone(),
            tds: product.tds.clone(),
        };
        state.products.push(product);
        Ok(created)
    }

    async fn update_product(&self, id: &str, draft: &ProductDraft) -> Result<()> {
        self.record(RecordedCall::Update(id.to_string(), draft.clone()))?;

        let mut state = self.lock();
        let Some(existing) = state.products.iter_mut().find(|p| p.id == id) else {
            return Err(Failure::Rejected("Product not found".to_string()).into_error());
        };
        *existing = Product {
            sds: settle(&draft.sds),
            tds: settle(&draft.tds),
            ..draft.clone().into_product(id.to_string())
        };
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> Result<()> {
        self.record(RecordedCall::Delete(id.to_string()))?;

        let mut state = self.lock();
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(Failure::Rejected("Product not found".to_string()).into_error());
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory catalog".to_string()
    }
}
