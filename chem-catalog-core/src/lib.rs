//! Core of the chemical product catalog admin.
//!
//! Holds the product model, the add/edit workflows, the catalog list state,
//! and the client for the remote catalog service. Front-ends (the egui
//! dashboard, the CLI) render this state and feed user intent back in; they
//! never mutate the store directly.

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod http_client;
pub mod models;
pub mod session;
pub mod store;
pub mod validation;
pub mod view;
pub mod workflow;

pub use api::{ApiEnvelope, CatalogApi};
pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use form::{FormEvent, ProductFormState, SubCategoryRequest};
pub use http_client::CatalogHttpClient;
pub use models::{Attachment, Category, CreatedProduct, PendingUpload, Product, ProductDraft, ProductField, SubCategory};
pub use session::SessionStore;
pub use store::CatalogStore;
pub use validation::{validate_draft, FieldErrors};
pub use view::{CatalogView, ListStatus, LoadTicket, PendingDelete};
pub use workflow::{CreateWorkflow, DialogPhase, SubmitOutcome, UpdateWorkflow};
