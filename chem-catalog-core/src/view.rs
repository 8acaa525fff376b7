use tracing::{debug, info, warn};

use crate::api::CatalogApi;
use crate::error::Result;
use crate::models::Product;
use crate::store::CatalogStore;
use crate::workflow::{CreateWorkflow, UpdateWorkflow};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Shown with a retry control; the store keeps whatever it had.
    Failed(String),
}

/// Identifies one list load. Only the most recently issued load may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// A delete waiting for confirmation or for the service to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: String,
    pub name: String,
    pub in_flight: bool,
    pub error: Option<String>,
}

/// Everything the product table needs besides the store itself.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    status: ListStatus,
    loads_issued: u64,
    create: CreateWorkflow,
    update: UpdateWorkflow,
    delete: Option<PendingDelete>,
    notice: Option<String>,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn needs_initial_load(&self) -> bool {
        self.status == ListStatus::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListStatus::Loading
    }

    pub fn create(&self) -> &CreateWorkflow {
        &self.create
    }

    pub fn create_mut(&mut self) -> &mut CreateWorkflow {
        &mut self.create
    }

    pub fn update(&self) -> &UpdateWorkflow {
        &self.update
    }

    pub fn update_mut(&mut self) -> &mut UpdateWorkflow {
        &mut self.update
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    // ---- list loading ----

    /// None when a load is already running.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.status == ListStatus::Loading {
            return None;
        }
        Some(self.issue_load())
    }

    /// Start a load that supersedes any running one. Used after a mutation,
    /// whose effect an older response may not include.
    pub fn begin_refresh(&mut self) -> LoadTicket {
        if self.status == ListStatus::Loading {
            debug!("superseding running product load");
        }
        self.issue_load()
    }

    fn issue_load(&mut self) -> LoadTicket {
        self.loads_issued += 1;
        self.status = ListStatus::Loading;
        LoadTicket(self.loads_issued)
    }

    /// Apply a list result. Returns false when `ticket` was superseded and the
    /// result was dropped.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Product>>,
        store: &mut CatalogStore,
    ) -> bool {
        if ticket != LoadTicket(self.loads_issued) {
            debug!("dropping product list from superseded load {}", ticket.0);
            return false;
        }
        match result {
            Ok(products) => {
                store.replace_all(products);
                self.status = ListStatus::Loaded;
            }
            Err(e) => {
                warn!("product list load failed: {e}");
                let message = if e.is_transport() {
                    "Could not reach the catalog service".to_string()
                } else {
                    e.user_message("Failed to load products")
                };
                self.status = ListStatus::Failed(message);
            }
        }
        true
    }

    pub async fn reload(&mut self, api: &dyn CatalogApi, store: &mut CatalogStore) {
        let Some(ticket) = self.begin_load() else {
            return;
        };
        let result = api.list_products().await;
        self.finish_load(ticket, result, store);
    }

    // ---- dialogs ----

    pub fn open_create(&mut self) {
        self.create.open();
    }

    /// False when an update of another record is still in flight.
    pub fn open_edit(&mut self, product: &Product) -> bool {
        if !self.update.select(product) {
            return false;
        }
        self.update.open();
        true
    }

    // ---- delete ----

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.delete.as_ref()
    }

    pub fn request_delete(&mut self, product: &Product) {
        if self.delete.as_ref().is_some_and(|d| d.in_flight) {
            return;
        }
        self.delete = Some(PendingDelete {
            id: product.id.clone(),
            name: product.name.clone(),
            in_flight: false,
            error: None,
        });
    }

    pub fn cancel_delete(&mut self) {
        if self.delete.as_ref().is_some_and(|d| !d.in_flight) {
            self.delete = None;
        }
    }

    /// Confirm the pending delete; returns the id to send.
    pub fn begin_delete(&mut self) -> Option<String> {
        let pending = self.delete.as_mut()?;
        if pending.in_flight {
            return None;
        }
        pending.in_flight = true;
        pending.error = None;
        Some(pending.id.clone())
    }

    /// Returns true when the record was removed.
    pub fn finish_delete(&mut self, id: &str, result: Result<()>, store: &mut CatalogStore) -> bool {
        match result {
            Ok(()) => {
                let removed = store.remove(id);
                let name = removed
                    .map(|p| p.name)
                    .or_else(|| self.delete.as_ref().map(|d| d.name.clone()))
                    .unwrap_or_else(|| id.to_string());
                info!("product {id} deleted");
                self.notice = Some(format!("Deleted {name}"));
                if self.delete.as_ref().is_some_and(|d| d.id == id) {
                    self.delete = None;
                }
                true
            }
            Err(e) => {
                warn!("delete of {id} failed: {e}");
                let message = if e.is_transport() {
                    "Error deleting product. Please try again.".to_string()
                } else {
                    e.user_message("Delete failed")
                };
                if let Some(pending) = self.delete.as_mut().filter(|d| d.id == id) {
                    pending.in_flight = false;
                    pending.error = Some(message);
                }
                false
            }
        }
    }

    pub async fn confirm_delete(&mut self, api: &dyn CatalogApi, store: &mut CatalogStore) -> bool {
        let Some(id) = self.begin_delete() else {
            return false;
        };
        let result = api.delete_product(&id).await;
        self.finish_delete(&id, result, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::models::Attachment;

    fn product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            category: "Acids".to_string(),
            sub_category: "Mineral".to_string(),
            name: format!("Acid {id}"),
            cas: "7664-93-9".to_string(),
            description: "Concentrated".to_string(),
            sds: Attachment::Absent,
            tds: Attachment::Absent,
        }
    }

    #[test]
    fn load_replaces_store_contents() {
        let mut view = CatalogView::new();
        let mut store = CatalogStore::with_products(vec![product("old")]);
        assert!(view.needs_initial_load());
        let ticket = view.begin_load().unwrap();
        assert!(view.begin_load().is_none());

        assert!(view.finish_load(ticket, Ok(vec![product("1"), product("2")]), &mut store));
        assert_eq!(view.status(), &ListStatus::Loaded);
        assert_eq!(store.len(), 2);
        assert!(store.get("old").is_none());
    }

    #[test]
    fn failed_load_is_surfaced_and_retryable() {
        let mut view = CatalogView::new();
        let mut store = CatalogStore::new();
        let ticket = view.begin_load().unwrap();
        view.finish_load(ticket, Err(CatalogError::ServerError { status: 503 }), &mut store);
        assert_eq!(view.status(), &ListStatus::Failed("Failed to load products".to_string()));
        assert!(store.is_empty());

        let ticket = view.begin_load().unwrap();
        view.finish_load(ticket, Ok(vec![product("1")]), &mut store);
        assert_eq!(view.status(), &ListStatus::Loaded);
    }

    #[test]
    fn refresh_supersedes_a_running_load() {
        let mut view = CatalogView::new();
        let mut store = CatalogStore::new();
        let stale = view.begin_load().unwrap();

        // A create lands while the first load is still out.
        store.append(product("new"));
        let fresh = view.begin_refresh();
        assert_ne!(stale, fresh);

        assert!(!view.finish_load(stale, Ok(vec![product("1")]), &mut store));
        assert!(view.is_loading());
        assert!(store.get("new").is_some());

        assert!(view.finish_load(fresh, Ok(vec![product("1"), product("new")]), &mut store));
        assert_eq!(view.status(), &ListStatus::Loaded);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn open_edit_populates_and_opens() {
        let mut view = CatalogView::new();
        let record = product("7");
        assert!(view.open_edit(&record));
        assert!(view.update().is_open());
        assert_eq!(view.update().draft().name, "Acid 7");
        assert!(!view.create().is_open());
    }

    #[test]
    fn delete_removes_only_after_success() {
        let mut view = CatalogView::new();
        let mut store = CatalogStore::with_products(vec![product("1"), product("2")]);

        view.request_delete(&product("1"));
        let id = view.begin_delete().unwrap();
        assert!(view.begin_delete().is_none());
        assert!(!view.finish_delete(
            &id,
            Err(CatalogError::Rejected {
                status: Some(404),
                message: "Product not found".to_string()
            }),
            &mut store,
        ));
        assert_eq!(store.len(), 2);
        assert_eq!(
            view.pending_delete().and_then(|d| d.error.as_deref()),
            Some("Product not found")
        );

        let id = view.begin_delete().unwrap();
        assert!(view.finish_delete(&id, Ok(()), &mut store));
        assert_eq!(store.len(), 1);
        assert!(store.get("1").is_none());
        assert!(view.pending_delete().is_none());
        assert_eq!(view.notice(), Some("Deleted Acid 1"));
    }

    #[test]
    fn cancel_drops_unconfirmed_delete() {
        let mut view = CatalogView::new();
        view.request_delete(&product("1"));
        view.cancel_delete();
        assert!(view.pending_delete().is_none());
        assert!(view.begin_delete().is_none());
    }
}
