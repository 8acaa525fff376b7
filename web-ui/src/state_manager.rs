// Catalog State Manager - single source of truth for the desktop dashboard
// Pure state - no UI logic. Widgets read it and call the methods below.

use std::sync::Arc;
use tracing::{debug, info};

use chem_catalog_core::{
    CatalogApi, CatalogStore, CatalogView, Category, CreatedProduct, FormEvent, LoadTicket, Product,
    ProductField, ProductFormState, Result, SubCategory, SubCategoryRequest, SubmitOutcome,
};

use crate::platform::AsyncSlot;

/// Which dialog a form belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Create,
    Edit,
}

pub struct CatalogStateManager {
    // ---- Core state ----
    pub store: CatalogStore,
    pub view: CatalogView,
    pub create_form: ProductFormState,
    pub edit_form: ProductFormState,

    // ---- Internal ----
    api: Arc<dyn CatalogApi>,

    // Async state bridges, polled by update_from_async()
    list_slot: Option<(LoadTicket, AsyncSlot<Result<Vec<Product>>>)>,
    create_slot: Option<AsyncSlot<Result<CreatedProduct>>>,
    update_slot: Option<(String, AsyncSlot<Result<()>>)>,
    delete_slot: Option<(String, AsyncSlot<Result<()>>)>,
    category_slots: Vec<(FormTarget, AsyncSlot<Result<Vec<Category>>>)>,
    sub_category_slots: Vec<(FormTarget, SubCategoryRequest, AsyncSlot<Result<Vec<SubCategory>>>)>,
}

impl CatalogStateManager {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            store: CatalogStore::new(),
            view: CatalogView::new(),
            create_form: ProductFormState::new(),
            edit_form: ProductFormState::new(),
            api,
            list_slot: None,
            create_slot: None,
            update_slot: None,
            delete_slot: None,
            category_slots: Vec::new(),
            sub_category_slots: Vec::new(),
        }
    }

    pub fn service(&self) -> String {
        self.api.describe()
    }

    // ============================================
    // PUBLIC API - UI calls these methods
    // ============================================

    /// First-frame load of the product list.
    pub fn ensure_loaded(&mut self) {
        if self.view.needs_initial_load() {
            self.reload();
        }
    }

    pub fn reload(&mut self) {
        let Some(ticket) = self.view.begin_load() else {
            return;
        };
        debug!("reloading products from {}", self.api.describe());
        self.spawn_list(ticket);
    }

    pub fn open_create(&mut self) {
        self.view.open_create();
        self.create_form.reset();
        self.load_categories(FormTarget::Create);
        let category = self.view.create().draft().category.clone();
        self.sync_category(FormTarget::Create, &category);
    }

    pub fn open_edit(&mut self, id: &str) {
        let Some(product) = self.store.get(id).cloned() else {
            debug!("edit requested for unknown product {id}");
            return;
        };
        if self.update_slot.is_some() {
            debug!("edit of {id} refused while an update is saving");
            return;
        }
        if !self.view.open_edit(&product) {
            return;
        }
        self.edit_form.reset();
        self.load_categories(FormTarget::Edit);
        let category = self.view.update().draft().category.clone();
        self.sync_category(FormTarget::Edit, &category);
    }

    pub fn close_dialog(&mut self, target: FormTarget) {
        match target {
            FormTarget::Create => self.view.create_mut().close(),
            FormTarget::Edit => self.view.update_mut().close(),
        }
    }

    /// Apply what the rendered form reported.
    pub fn handle_form_event(&mut self, target: FormTarget, event: FormEvent) {
        let category_changed = matches!(event, FormEvent::Changed(ProductField::Category, _));
        let wants_submit = match target {
            FormTarget::Create => self.view.create_mut().apply_event(event),
            FormTarget::Edit => self.view.update_mut().apply_event(event),
        };

        if category_changed {
            let category = self.draft_category(target);
            self.sync_category(target, &category);
        }
        if wants_submit {
            self.submit(target);
        }
    }

    pub fn submit(&mut self, target: FormTarget) {
        if !self.form(target).can_submit() {
            return;
        }
        let api = Arc::clone(&self.api);
        match target {
            FormTarget::Create => {
                if self.create_slot.is_some() {
                    return;
                }
                let Ok(draft) = self.view.create_mut().begin_submit() else {
                    return;
                };
                self.create_slot = Some(AsyncSlot::spawn(async move { api.create_product(&draft).await }));
            }
            FormTarget::Edit => {
                if self.update_slot.is_some() {
                    return;
                }
                let Ok((id, draft)) = self.view.update_mut().begin_submit() else {
                    return;
                };
                let target = id.clone();
                let slot = AsyncSlot::spawn(async move { api.update_product(&target, &draft).await });
                self.update_slot = Some((id, slot));
            }
        }
    }

    pub fn request_delete(&mut self, id: &str) {
        if let Some(product) = self.store.get(id).cloned() {
            self.view.request_delete(&product);
        }
    }

    pub fn cancel_delete(&mut self) {
        self.view.cancel_delete();
    }

    pub fn confirm_delete(&mut self) {
        if self.delete_slot.is_some() {
            return;
        }
        let Some(id) = self.view.begin_delete() else {
            return;
        };
        let api = Arc::clone(&self.api);
        let target = id.clone();
        self.delete_slot = Some((id, AsyncSlot::spawn(async move { api.delete_product(&target).await })));
    }

    /// Call once per frame to apply finished background calls
    pub fn update_from_async(&mut self) {
        if let Some((ticket, slot)) = self.list_slot.take() {
            match slot.take() {
                Some(result) => {
                    self.view.finish_load(ticket, result, &mut self.store);
                }
                None => self.list_slot = Some((ticket, slot)),
            }
        }

        if let Some(result) = self.create_slot.as_ref().and_then(AsyncSlot::take) {
            self.create_slot = None;
            if self.view.create_mut().finish_submit(result, &mut self.store) == SubmitOutcome::Saved {
                self.create_form.reset();
                self.refresh();
            }
        }

        if let Some((id, slot)) = self.update_slot.take() {
            match slot.take() {
                Some(result) => {
                    if self.view.update_mut().finish_submit(&id, result) == SubmitOutcome::Saved {
                        if !self.view.update().is_open() {
                            self.edit_form.reset();
                        }
                        self.refresh();
                    }
                }
                None => self.update_slot = Some((id, slot)),
            }
        }

        if let Some((id, slot)) = self.delete_slot.take() {
            match slot.take() {
                Some(result) => {
                    let removed = self.view.finish_delete(&id, result, &mut self.store);
                    // A list read that started before the delete would bring the row back.
                    if removed && self.list_slot.is_some() {
                        self.refresh();
                    }
                }
                None => self.delete_slot = Some((id, slot)),
            }
        }

        let mut pending = Vec::new();
        for (target, slot) in std::mem::take(&mut self.category_slots) {
            match slot.take() {
                Some(result) => self.form_mut(target).finish_category_load(result),
                None => pending.push((target, slot)),
            }
        }
        self.category_slots = pending;

        let mut pending = Vec::new();
        for (target, request, slot) in std::mem::take(&mut self.sub_category_slots) {
            match slot.take() {
                Some(result) => {
                    self.form_mut(target).finish_sub_category_load(&request, result);
                }
                None => pending.push((target, request, slot)),
            }
        }
        self.sub_category_slots = pending;
    }

    // ============================================
    // READ-ONLY GETTERS
    // ============================================

    /// True while any background call is outstanding.
    pub fn has_pending(&self) -> bool {
        self.list_slot.is_some()
            || self.create_slot.is_some()
            || self.update_slot.is_some()
            || self.delete_slot.is_some()
            || !self.category_slots.is_empty()
            || !self.sub_category_slots.is_empty()
    }

    pub fn form(&self, target: FormTarget) -> &ProductFormState {
        match target {
            FormTarget::Create => &self.create_form,
            FormTarget::Edit => &self.edit_form,
        }
    }

    // ============================================
    // INTERNAL
    // ============================================

    fn form_mut(&mut self, target: FormTarget) -> &mut ProductFormState {
        match target {
            FormTarget::Create => &mut self.create_form,
            FormTarget::Edit => &mut self.edit_form,
        }
    }

    fn draft_category(&self, target: FormTarget) -> String {
        match target {
            FormTarget::Create => self.view.create().draft().category.clone(),
            FormTarget::Edit => self.view.update().draft().category.clone(),
        }
    }

    /// Reload after a mutation, superseding any list load already running.
    fn refresh(&mut self) {
        let ticket = self.view.begin_refresh();
        self.spawn_list(ticket);
    }

    fn spawn_list(&mut self, ticket: LoadTicket) {
        let api = Arc::clone(&self.api);
        self.list_slot = Some((ticket, AsyncSlot::spawn(async move { api.list_products().await })));
    }

    fn load_categories(&mut self, target: FormTarget) {
        if !self.form(target).needs_categories() {
            return;
        }
        self.form_mut(target).begin_category_load();
        let api = Arc::clone(&self.api);
        self.category_slots
            .push((target, AsyncSlot::spawn(async move { api.list_categories().await })));
    }

    fn sync_category(&mut self, target: FormTarget, category: &str) {
        let Some(request) = self.form_mut(target).sync_category(category) else {
            return;
        };
        info!("loading sub-categories of {:?}", request.category);
        let api = Arc::clone(&self.api);
        let category = request.category.clone();
        let slot = AsyncSlot::spawn(async move { api.list_sub_categories(&category).await });
        self.sub_category_slots.push((target, request, slot));
    }
}
