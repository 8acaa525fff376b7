//! Add and edit dialogs as state machines.
//!
//! Both workflows follow the same two-step submit so that a UI can run the
//! network call elsewhere: `begin_submit` validates and hands out what to
//! send, `finish_submit` applies the result. The `submit` helpers chain the
//! two around an awaited [`CatalogApi`] call.

use tracing::{debug, info, warn};

use crate::api::CatalogApi;
use crate::error::{CatalogError, Result};
use crate::form::FormEvent;
use crate::models::{Attachment, CreatedProduct, PendingUpload, Product, ProductDraft, ProductField};
use crate::store::CatalogStore;
use crate::validation::{validate_draft, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogPhase {
    #[default]
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Required fields are missing; nothing was sent.
    Invalid,
    /// Already submitting, or there is nothing to submit.
    Ignored,
    Saved,
    Failed(String),
}

/// Draft plus the error state the form renders.
#[derive(Debug, Clone, Default)]
struct DraftEditor {
    draft: ProductDraft,
    errors: FieldErrors,
    api_error: Option<String>,
}

impl DraftEditor {
    fn set_text(&mut self, field: ProductField, value: String) {
        self.draft.set_text(field, value);
        self.errors.clear_field(field);
    }

    fn attach(&mut self, field: ProductField, upload: PendingUpload) -> Result<()> {
        self.draft.set_attachment(field, Attachment::Pending(upload))?;
        self.errors.clear_field(field);
        Ok(())
    }

    /// Returns true when the event asks for a submit.
    fn apply(&mut self, event: FormEvent) -> bool {
        match event {
            FormEvent::Changed(field, value) => {
                self.set_text(field, value);
                false
            }
            FormEvent::FileSelected(field, path) => {
                match PendingUpload::from_path(&path).and_then(|upload| self.attach(field, upload)) {
                    Ok(()) => debug!("attached {} as {field}", path.display()),
                    Err(e) => {
                        warn!("could not attach {}: {e}", path.display());
                        self.errors
                            .insert(field, format!("Could not read {}: {e}", path.display()));
                    }
                }
                false
            }
            FormEvent::Submit => true,
        }
    }

    fn validate(&mut self) -> bool {
        self.errors = validate_draft(&self.draft);
        self.errors.is_empty()
    }
}

fn failure_message(error: &CatalogError, transport: &str, fallback: &str) -> String {
    if error.is_transport() {
        transport.to_string()
    } else {
        error.user_message(fallback)
    }
}

// ===== CREATE =====

#[derive(Debug, Clone, Default)]
pub struct CreateWorkflow {
    phase: DialogPhase,
    editor: DraftEditor,
}

impl CreateWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != DialogPhase::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == DialogPhase::Submitting
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.editor.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.editor.errors
    }

    pub fn api_error(&self) -> Option<&str> {
        self.editor.api_error.as_deref()
    }

    pub fn open(&mut self) {
        if self.phase == DialogPhase::Closed {
            self.phase = DialogPhase::Open;
        }
    }

    /// Dismiss the dialog. The draft survives until a successful create.
    pub fn close(&mut self) {
        self.phase = DialogPhase::Closed;
    }

    pub fn set_text(&mut self, field: ProductField, value: impl Into<String>) {
        self.editor.set_text(field, value.into());
    }

    pub fn attach(&mut self, field: ProductField, upload: PendingUpload) -> Result<()> {
        self.editor.attach(field, upload)
    }

    /// Apply a form event; true means the user asked to submit.
    pub fn apply_event(&mut self, event: FormEvent) -> bool {
        self.editor.apply(event)
    }

    pub fn begin_submit(&mut self) -> std::result::Result<ProductDraft, SubmitOutcome> {
        if self.phase == DialogPhase::Submitting {
            return Err(SubmitOutcome::Ignored);
        }
        if !self.editor.validate() {
            debug!("create blocked: {} field(s) missing", self.editor.errors.len());
            return Err(SubmitOutcome::Invalid);
        }
        self.phase = DialogPhase::Submitting;
        self.editor.api_error = None;
        Ok(self.editor.draft.clone())
    }

    pub fn finish_submit(&mut self, result: Result<CreatedProduct>, store: &mut CatalogStore) -> SubmitOutcome {
        match result {
            Ok(created) => {
                let draft = std::mem::take(&mut self.editor.draft);
                let product = Product {
                    sds: created.sds,
                    tds: created.tds,
                    ..draft.into_product(created.id)
                };
                info!("product {} added to catalog", product.id);
                store.append(product);

                self.editor = DraftEditor::default();
                self.phase = DialogPhase::Closed;
                SubmitOutcome::Saved
            }
            Err(e) => {
                let message = failure_message(&e, "Error adding product. Please try again.", "Failed to add product");
                warn!("create failed: {e}");
                self.editor.api_error = Some(message.clone());
                if self.phase == DialogPhase::Submitting {
                    self.phase = DialogPhase::Open;
                }
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Validate, send, and apply the result; `on_refresh` runs once on success.
    pub async fn submit<F: FnOnce()>(
        &mut self,
        api: &dyn CatalogApi,
        store: &mut CatalogStore,
        on_refresh: F,
    ) -> SubmitOutcome {
        let draft = match self.begin_submit() {
            Ok(draft) => draft,
            Err(outcome) => return outcome,
        };
        let result = api.create_product(&draft).await;
        let outcome = self.finish_submit(result, store);
        if outcome == SubmitOutcome::Saved {
            on_refresh();
        }
        outcome
    }
}

// ===== UPDATE =====

#[derive(Debug, Clone, Default)]
pub struct UpdateWorkflow {
    phase: DialogPhase,
    selected: Option<Product>,
    editor: DraftEditor,
}

impl UpdateWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != DialogPhase::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == DialogPhase::Submitting
    }

    pub fn selected(&self) -> Option<&Product> {
        self.selected.as_ref()
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.editor.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.editor.errors
    }

    pub fn api_error(&self) -> Option<&str> {
        self.editor.api_error.as_deref()
    }

    /// Seed the draft from `product` if it differs from the current selection.
    /// Returns false, leaving the selection alone, while a save is in flight.
    pub fn select(&mut self, product: &Product) -> bool {
        if self.selected.as_ref() == Some(product) {
            return true;
        }
        if self.phase == DialogPhase::Submitting {
            debug!("update in flight; not switching to product {}", product.id);
            return false;
        }
        debug!("editing product {}", product.id);
        self.editor = DraftEditor {
            draft: ProductDraft::from_product(product),
            ..DraftEditor::default()
        };
        self.selected = Some(product.clone());
        true
    }

    pub fn open(&mut self) {
        if self.phase == DialogPhase::Closed {
            self.phase = DialogPhase::Open;
        }
    }

    pub fn close(&mut self) {
        self.phase = DialogPhase::Closed;
    }

    pub fn set_text(&mut self, field: ProductField, value: impl Into<String>) {
        self.editor.set_text(field, value.into());
    }

    pub fn attach(&mut self, field: ProductField, upload: PendingUpload) -> Result<()> {
        self.editor.attach(field, upload)
    }

    pub fn apply_event(&mut self, event: FormEvent) -> bool {
        self.editor.apply(event)
    }

    /// Returns the record id and draft to send.
    pub fn begin_submit(&mut self) -> std::result::Result<(String, ProductDraft), SubmitOutcome> {
        if self.phase == DialogPhase::Submitting {
            return Err(SubmitOutcome::Ignored);
        }
        let Some(id) = self.selected.as_ref().map(|p| p.id.clone()) else {
            self.editor.api_error = Some("No product selected".to_string());
            return Err(SubmitOutcome::Ignored);
        };
        if !self.editor.validate() {
            debug!("update of {id} blocked: {} field(s) missing", self.editor.errors.len());
            return Err(SubmitOutcome::Invalid);
        }
        self.phase = DialogPhase::Submitting;
        self.editor.api_error = None;
        Ok((id, self.editor.draft.clone()))
    }

    /// Apply the result of saving record `id`. Never touches the store; the
    /// caller refreshes from the service.
    ///
    /// A result for a record that is no longer selected leaves the dialog as
    /// it is.
    pub fn finish_submit(&mut self, id: &str, result: Result<()>) -> SubmitOutcome {
        let current = self.selected.as_ref().is_some_and(|p| p.id == id);
        match result {
            Ok(()) => {
                info!("product {id} updated");
                if current {
                    // Next selection reseeds from whatever the refresh brings back.
                    self.selected = None;
                    self.editor = DraftEditor::default();
                    self.phase = DialogPhase::Closed;
                }
                SubmitOutcome::Saved
            }
            Err(e) => {
                let message = e.user_message("Update failed");
                warn!("update of {id} failed: {e}");
                if current {
                    self.editor.api_error = Some(message.clone());
                    if self.phase == DialogPhase::Submitting {
                        self.phase = DialogPhase::Open;
                    }
                }
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub async fn submit<F: FnOnce()>(&mut self, api: &dyn CatalogApi, on_refresh: F) -> SubmitOutcome {
        let (id, draft) = match self.begin_submit() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        let result = api.update_product(&id, &draft).await;
        let outcome = self.finish_submit(&id, result);
        if outcome == SubmitOutcome::Saved {
            on_refresh();
        }
        outcome
    }
}
