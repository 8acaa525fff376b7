use std::collections::BTreeMap;

use crate::models::{ProductDraft, ProductField};

/// Per-field error messages owned by a workflow and rendered by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    messages: BTreeMap<ProductField, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: ProductField, message: impl Into<String>) {
        self.messages.insert(field, message.into());
    }

    pub fn get(&self, field: ProductField) -> Option<&str> {
        self.messages.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: ProductField) -> bool {
        self.messages.contains_key(&field)
    }

    /// Drop the message for a field the user just edited.
    pub fn clear_field(&mut self, field: ProductField) {
        self.messages.remove(&field);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = ProductField> + '_ {
        self.messages.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductField, &str)> {
        self.messages.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

pub fn required_message(field: ProductField) -> &'static str {
    match field {
        ProductField::Category => "Category is required",
        ProductField::SubCategory => "Sub Category is required",
        ProductField::Name => "Product name is required",
        ProductField::Cas => "CAS number is required",
        ProductField::Description => "Description is required",
        ProductField::Sds => "Safety data sheet is required",
        ProductField::Tds => "Technical data sheet is required",
    }
}

/// Required-value check shared by the create and update workflows.
pub fn validate_draft(draft: &ProductDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in ProductField::REQUIRED {
        if draft.text(field).trim().is_empty() {
            errors.insert(field, required_message(field));
        }
    }
    errors
}
