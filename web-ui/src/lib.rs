//! egui dashboard over `chem-catalog-core`.

pub mod app;
pub mod header;
pub mod platform;
pub mod product_dialogs;
pub mod product_form;
pub mod product_table;
pub mod state_manager;

pub use app::CatalogApp;
pub use state_manager::{CatalogStateManager, FormTarget};
