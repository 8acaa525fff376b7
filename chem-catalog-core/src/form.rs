//! State behind the product form: reference lists and their loading flags.
//!
//! The form validates nothing. It owns the category and sub-category lists,
//! decides when the sub-category input is usable, and reports field edits
//! upward as [`FormEvent`]s for the enclosing workflow to apply.

use std::path::PathBuf;
use tracing::debug;

use crate::api::CatalogApi;
use crate::error::Result;
use crate::models::{Category, ProductDraft, ProductField, SubCategory};

/// User intent reported by a rendered form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Changed(ProductField, String),
    FileSelected(ProductField, PathBuf),
    Submit,
}

/// A sub-category fetch to run for the given category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCategoryRequest {
    pub seq: u64,
    pub category: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFormState {
    categories: Vec<Category>,
    sub_categories: Vec<SubCategory>,
    categories_loaded: bool,
    categories_loading: bool,
    /// Sequence number of the sub-category fetch in flight.
    sub_categories_loading: Option<u64>,
    /// Category the current sub-category list belongs to.
    selected_category: String,
    next_seq: u64,
    error: Option<String>,
}

impl ProductFormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget both lists, as when the form is mounted again.
    pub fn reset(&mut self) {
        let next_seq = self.next_seq + 1;
        *self = Self {
            next_seq,
            ..Self::default()
        };
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn sub_categories(&self) -> &[SubCategory] {
        &self.sub_categories
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.categories_loading || self.sub_categories_loading.is_some()
    }

    pub fn needs_categories(&self) -> bool {
        !self.categories_loaded && !self.categories_loading
    }

    pub fn sub_category_enabled(&self, draft: &ProductDraft) -> bool {
        !draft.category.trim().is_empty() && !self.is_loading()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading()
    }

    /// Known sub-category names containing what the user typed so far.
    pub fn sub_category_suggestions(&self, typed: &str) -> Vec<&str> {
        let needle = typed.trim().to_lowercase();
        self.sub_categories
            .iter()
            .map(|s| s.name.as_str())
            .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn begin_category_load(&mut self) {
        self.categories_loading = true;
        self.error = None;
    }

    pub fn finish_category_load(&mut self, result: Result<Vec<Category>>) {
        self.categories_loading = false;
        self.categories_loaded = true;
        match result {
            Ok(categories) => {
                debug!("form received {} categories", categories.len());
                self.categories = categories;
            }
            Err(e) => {
                debug!("category load failed: {e}");
                self.categories.clear();
                self.error = Some(
                    if e.is_transport() {
                        "Error fetching categories"
                    } else {
                        "Failed to load categories"
                    }
                    .to_string(),
                );
            }
        }
    }

    /// Track the draft's category; returns the fetch to run when it changed
    /// to a non-empty value. Clearing it empties the list.
    pub fn sync_category(&mut self, category: &str) -> Option<SubCategoryRequest> {
        let category = category.trim();
        if category == self.selected_category {
            return None;
        }

        self.selected_category = category.to_string();
        self.next_seq += 1;

        if category.is_empty() {
            self.sub_categories.clear();
            self.sub_categories_loading = None;
            return None;
        }

        self.sub_categories_loading = Some(self.next_seq);
        self.error = None;
        Some(SubCategoryRequest {
            seq: self.next_seq,
            category: category.to_string(),
        })
    }

    /// Apply a sub-category response. Returns false when it was stale.
    pub fn finish_sub_category_load(
        &mut self,
        request: &SubCategoryRequest,
        result: Result<Vec<SubCategory>>,
    ) -> bool {
        if self.sub_categories_loading != Some(request.seq) {
            debug!("discarding stale sub-categories for {:?}", request.category);
            return false;
        }
        self.sub_categories_loading = None;

        match result {
            Ok(sub_categories) => {
                // The service may ignore the filter; narrow client-side when records say where they belong.
                self.sub_categories = sub_categories
                    .into_iter()
                    .filter(|s| s.category.as_deref().map_or(true, |c| c == request.category))
                    .collect();
            }
            Err(e) => {
                debug!("sub-category load failed: {e}");
                self.sub_categories.clear();
                self.error = Some(
                    if e.is_transport() {
                        "Error fetching subcategories"
                    } else {
                        "Failed to load subcategories"
                    }
                    .to_string(),
                );
            }
        }
        true
    }

    pub async fn load_categories(&mut self, api: &dyn CatalogApi) {
        self.begin_category_load();
        let result = api.list_categories().await;
        self.finish_category_load(result);
    }

    /// Sync the category and, if that asks for it, fetch its sub-categories.
    pub async fn select_category(&mut self, category: &str, api: &dyn CatalogApi) {
        if let Some(request) = self.sync_category(category) {
            let result = api.list_sub_categories(&request.category).await;
            self.finish_sub_category_load(&request, result);
        }
    }
}
