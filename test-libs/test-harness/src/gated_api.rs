use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Semaphore;

use chem_catalog_core::{CatalogApi, Category, CreatedProduct, Product, ProductDraft, Result, SubCategory};

use crate::fake_api::{FakeCatalogApi, Operation};

#[derive(Default)]
struct Gates {
    held: HashMap<Operation, Arc<Semaphore>>,
    arrivals: HashMap<Operation, usize>,
}

/// [`FakeCatalogApi`] whose calls can be parked until the test lets them go,
/// so responses can be made to land in any order.
///
/// A held list read takes its snapshot before parking, the way a slow
/// response reflects the catalog at the time it was served. Held mutations
/// park before touching the catalog.
pub struct GatedCatalogApi {
    inner: FakeCatalogApi,
    gates: Mutex<Gates>,
}

impl GatedCatalogApi {
    pub fn new(inner: FakeCatalogApi) -> Self {
        Self {
            inner,
            gates: Mutex::new(Gates::default()),
        }
    }

    pub fn fake(&self) -> &FakeCatalogApi {
        &self.inner
    }

    fn lock(&self) -> MutexGuard<'_, Gates> {
        self.gates.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Park every later call of `operation` until [`release`](Self::release).
    pub fn hold(&self, operation: Operation) {
        self.lock().held.insert(operation, Arc::new(Semaphore::new(0)));
    }

    /// Let parked and future calls of `operation` through.
    pub fn release(&self, operation: Operation) {
        if let Some(gate) = self.lock().held.remove(&operation) {
            gate.close();
        }
    }

    /// Calls of `operation` that have reached their gate so far.
    pub fn arrivals(&self, operation: Operation) -> usize {
        self.lock().arrivals.get(&operation).copied().unwrap_or(0)
    }

    /// Wait until `count` calls of `operation` have reached their gate.
    pub async fn wait_for_arrivals(&self, operation: Operation, count: usize) {
        for _ in 0..400 {
            if self.arrivals(operation) >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("{operation:?} never reached {count} call(s)");
    }

    async fn pass(&self, operation: Operation) {
        let gate = {
            let mut gates = self.lock();
            *gates.arrivals.entry(operation).or_default() += 1;
            gates.held.get(&operation).cloned()
        };
        if let Some(gate) = gate {
            // Closing the semaphore is the release signal.
            let _ = gate.acquire().await;
        }
    }
}

#[async_trait]
impl CatalogApi for GatedCatalogApi {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let snapshot = self.inner.list_products().await;
        self.pass(Operation::ListProducts).await;
        snapshot
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories = self.inner.list_categories().await;
        self.pass(Operation::ListCategories).await;
        categories
    }

    async fn list_sub_categories(&self, category: &str) -> Result<Vec<SubCategory>> {
        let sub_categories = self.inner.list_sub_categories(category).await;
        self.pass(Operation::ListSubCategories).await;
        sub_categories
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<CreatedProduct> {
        self.pass(Operation::Create).await;
        self.inner.create_product(draft).await
    }

    async fn update_product(&self, id: &str, draft: &ProductDraft) -> Result<()> {
        self.pass(Operation::Update).await;
        self.inner.update_product(id, draft).await
    }

    async fn delete_product(&self, id: &str) -> Result<()> {
        self.pass(Operation::Delete).await;
        self.inner.delete_product(id).await
    }

    fn describe(&self) -> String {
        format!("gated {}", self.inner.describe())
    }
}
