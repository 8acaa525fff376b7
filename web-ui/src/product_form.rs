// Product Form - pure UI component shared by the add and edit dialogs.
// Reads the draft, never writes it: every edit is reported as a FormEvent.

use eframe::egui;
use std::path::PathBuf;

use chem_catalog_core::{Attachment, FieldErrors, FormEvent, ProductDraft, ProductField, ProductFormState};

pub struct ProductFormUi {
    id_salt: &'static str,
    // File paths typed but not yet attached
    sds_path: String,
    tds_path: String,
}

/// What the dialog needs to draw the form.
pub struct FormContext<'a> {
    pub draft: &'a ProductDraft,
    pub errors: &'a FieldErrors,
    pub state: &'a ProductFormState,
    pub submitting: bool,
    pub submit_label: &'a str,
}

impl ProductFormUi {
    pub fn new(id_salt: &'static str) -> Self {
        Self {
            id_salt,
            sds_path: String::new(),
            tds_path: String::new(),
        }
    }

    pub fn clear(&mut self) {
        self.sds_path.clear();
        self.tds_path.clear();
    }

    pub fn render(&mut self, ui: &mut egui::Ui, ctx: &FormContext<'_>) -> Vec<FormEvent> {
        let mut events = Vec::new();

        if let Some(error) = ctx.state.error() {
            ui.colored_label(egui::Color32::from_rgb(200, 120, 0), error);
            ui.add_space(4.0);
        }

        egui::Grid::new((self.id_salt, "fields"))
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                self.category_row(ui, ctx, &mut events);
                self.sub_category_row(ui, ctx, &mut events);
                text_row(ui, ctx, ProductField::Name, false, &mut events);
                text_row(ui, ctx, ProductField::Cas, false, &mut events);
                text_row(ui, ctx, ProductField::Description, true, &mut events);
                self.attachment_row(ui, ctx, ProductField::Sds, &mut events);
                self.attachment_row(ui, ctx, ProductField::Tds, &mut events);
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let enabled = ctx.state.can_submit() && !ctx.submitting;
            if ui.add_enabled(enabled, egui::Button::new(ctx.submit_label)).clicked() {
                events.push(FormEvent::Submit);
            }
            if ctx.state.is_loading() {
                ui.spinner();
                ui.label("Loading…");
            } else if ctx.submitting {
                ui.spinner();
                ui.label("Saving…");
            }
        });

        events
    }

    fn category_row(&self, ui: &mut egui::Ui, ctx: &FormContext<'_>, events: &mut Vec<FormEvent>) {
        ui.label(ProductField::Category.label());
        ui.vertical(|ui| {
            let current = ctx.draft.category.as_str();
            let shown = if current.is_empty() { "Select a category" } else { current };

            egui::ComboBox::from_id_salt((self.id_salt, "category"))
                .selected_text(shown)
                .width(260.0)
                .show_ui(ui, |ui| {
                    if ui.selectable_label(current.is_empty(), "Select a category").clicked() && !current.is_empty() {
                        events.push(FormEvent::Changed(ProductField::Category, String::new()));
                    }
                    for category in ctx.state.categories() {
                        if ui.selectable_label(category.name == current, category.name.as_str()).clicked()
                            && category.name != current
                        {
                            events.push(FormEvent::Changed(ProductField::Category, category.name.clone()));
                        }
                    }
                });
            field_error(ui, ctx.errors, ProductField::Category);
        });
        ui.end_row();
    }

    fn sub_category_row(&self, ui: &mut egui::Ui, ctx: &FormContext<'_>, events: &mut Vec<FormEvent>) {
        ui.label(ProductField::SubCategory.label());
        ui.vertical(|ui| {
            let enabled = ctx.state.sub_category_enabled(ctx.draft);
            let current = ctx.draft.sub_category.as_str();
            let shown = if current.is_empty() { "Select a sub category" } else { current };

            ui.add_enabled_ui(enabled, |ui| {
                egui::ComboBox::from_id_salt((self.id_salt, "sub_category"))
                    .selected_text(shown)
                    .width(260.0)
                    .show_ui(ui, |ui| {
                        for sub in ctx.state.sub_categories() {
                            if ui.selectable_label(sub.name == current, sub.name.as_str()).clicked() && sub.name != current {
                                events.push(FormEvent::Changed(ProductField::SubCategory, sub.name.clone()));
                            }
                        }
                    });
            });
            field_error(ui, ctx.errors, ProductField::SubCategory);
        });
        ui.end_row();
    }

    fn attachment_row(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &FormContext<'_>,
        field: ProductField,
        events: &mut Vec<FormEvent>,
    ) {
        ui.label(field.label());
        ui.vertical(|ui| {
            match ctx.draft.attachment(field) {
                Some(Attachment::Stored(url)) => {
                    ui.horizontal(|ui| {
                        ui.label("Current:");
                        ui.hyperlink_to("View", url);
                    });
                }
                Some(pending @ Attachment::Pending(_)) => {
                    ui.label(pending.describe());
                }
                _ => {}
            }

            let path = match field {
                ProductField::Sds => &mut self.sds_path,
                _ => &mut self.tds_path,
            };
            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(path).hint_text("Path to PDF").desired_width(200.0));
                let has_path = !path.trim().is_empty();
                if ui.add_enabled(has_path, egui::Button::new("Attach")).clicked() {
                    events.push(FormEvent::FileSelected(field, PathBuf::from(path.trim())));
                    path.clear();
                }
            });
            field_error(ui, ctx.errors, field);
        });
        ui.end_row();
    }
}

fn text_row(
    ui: &mut egui::Ui,
    ctx: &FormContext<'_>,
    field: ProductField,
    multiline: bool,
    events: &mut Vec<FormEvent>,
) {
    ui.label(field.label());
    ui.vertical(|ui| {
        let mut value = ctx.draft.text(field).to_string();
        let response = if multiline {
            ui.add(egui::TextEdit::multiline(&mut value).desired_rows(3).desired_width(260.0))
        } else {
            ui.add(egui::TextEdit::singleline(&mut value).desired_width(260.0))
        };
        if response.changed() {
            events.push(FormEvent::Changed(field, value));
        }
        field_error(ui, ctx.errors, field);
    });
    ui.end_row();
}

fn field_error(ui: &mut egui::Ui, errors: &FieldErrors, field: ProductField) {
    if let Some(message) = errors.get(field) {
        ui.colored_label(egui::Color32::RED, message);
    }
}
