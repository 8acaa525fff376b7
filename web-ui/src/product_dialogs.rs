// Add / Edit / Delete dialogs - egui windows over the catalog table.

use eframe::egui;

use chem_catalog_core::FormEvent;

use crate::product_form::{FormContext, ProductFormUi};
use crate::state_manager::{CatalogStateManager, FormTarget};

pub struct ProductDialogs {
    create_form: ProductFormUi,
    edit_form: ProductFormUi,
}

impl ProductDialogs {
    pub fn new() -> Self {
        Self {
            create_form: ProductFormUi::new("create_product"),
            edit_form: ProductFormUi::new("edit_product"),
        }
    }

    pub fn render(&mut self, ctx: &egui::Context, state: &mut CatalogStateManager) {
        self.render_create(ctx, state);
        self.render_edit(ctx, state);
        render_delete_confirm(ctx, state);
    }

    fn render_create(&mut self, ctx: &egui::Context, state: &mut CatalogStateManager) {
        let workflow = state.view.create();
        if !workflow.is_open() {
            self.create_form.clear();
            return;
        }

        let mut open = true;
        let mut events: Vec<FormEvent> = Vec::new();
        egui::Window::new("➕ Add Product")
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(480.0)
            .show(ctx, |ui| {
                if let Some(message) = workflow.api_error() {
                    ui.colored_label(egui::Color32::RED, message);
                    ui.separator();
                }
                let form = FormContext {
                    draft: workflow.draft(),
                    errors: workflow.errors(),
                    state: &state.create_form,
                    submitting: workflow.is_submitting(),
                    submit_label: "Add Product",
                };
                events = self.create_form.render(ui, &form);
            });

        // Apply after the window so the workflow is not borrowed.
        for event in events {
            state.handle_form_event(FormTarget::Create, event);
        }
        if !open {
            state.close_dialog(FormTarget::Create);
        }
    }

    fn render_edit(&mut self, ctx: &egui::Context, state: &mut CatalogStateManager) {
        let workflow = state.view.update();
        if !workflow.is_open() {
            self.edit_form.clear();
            return;
        }

        let title = match workflow.selected() {
            Some(product) => format!("✏ Edit {}", product.name),
            None => "✏ Edit Product".to_string(),
        };

        let mut open = true;
        let mut events: Vec<FormEvent> = Vec::new();
        egui::Window::new(title)
            .id(egui::Id::new("edit_product_window"))
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(480.0)
            .show(ctx, |ui| {
                if let Some(message) = workflow.api_error() {
                    ui.colored_label(egui::Color32::RED, message);
                    ui.separator();
                }
                let form = FormContext {
                    draft: workflow.draft(),
                    errors: workflow.errors(),
                    state: &state.edit_form,
                    submitting: workflow.is_submitting(),
                    submit_label: "Update Product",
                };
                events = self.edit_form.render(ui, &form);
            });

        for event in events {
            state.handle_form_event(FormTarget::Edit, event);
        }
        if !open {
            state.close_dialog(FormTarget::Edit);
        }
    }
}

impl Default for ProductDialogs {
    fn default() -> Self {
        Self::new()
    }
}

fn render_delete_confirm(ctx: &egui::Context, state: &mut CatalogStateManager) {
    let Some(pending) = state.view.pending_delete().cloned() else {
        return;
    };

    let mut confirm = false;
    let mut cancel = false;
    egui::Window::new("🗑 Delete Product")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(format!("Delete {} permanently?", pending.name));
            if let Some(error) = &pending.error {
                ui.colored_label(egui::Color32::RED, error);
            }
            ui.separator();
            ui.horizontal(|ui| {
                if pending.in_flight {
                    ui.spinner();
                    ui.label("Deleting…");
                } else {
                    confirm = ui.button("Delete").clicked();
                    cancel = ui.button("Cancel").clicked();
                }
            });
        });

    if confirm {
        state.confirm_delete();
    } else if cancel {
        state.cancel_delete();
    }
}
