// Product Table - pure UI component for the catalog list.

use eframe::egui;
use egui_extras::{Column, TableBuilder};

use chem_catalog_core::{Attachment, ListStatus, Product};

use crate::state_manager::CatalogStateManager;

/// Row-level actions collected while drawing, applied after the table is done.
enum RowAction {
    Edit(String),
    Delete(String),
}

#[derive(Default)]
pub struct ProductTable {
    filter: String,
}

impl ProductTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, ui: &mut egui::Ui, state: &mut CatalogStateManager) {
        match state.view.status().clone() {
            ListStatus::Idle | ListStatus::Loading if state.store.is_empty() => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading products...");
                });
                return;
            }
            ListStatus::Failed(message) => {
                ui.horizontal(|ui| {
                    ui.colored_label(egui::Color32::RED, format!("❌ {message}"));
                    if ui.button("Retry").clicked() {
                        state.reload();
                    }
                });
                ui.separator();
            }
            _ => {}
        }

        if state.store.is_empty() {
            self.render_empty_state(ui, state);
            return;
        }

        ui.horizontal(|ui| {
            ui.label("🔍 Filter:");
            ui.text_edit_singleline(&mut self.filter);
            if ui.button("Clear").clicked() {
                self.filter.clear();
            }
        });
        ui.add_space(4.0);

        let needle = self.filter.trim().to_lowercase();
        let rows: Vec<&Product> = state
            .store
            .products()
            .iter()
            .filter(|p| needle.is_empty() || matches_filter(p, &needle))
            .collect();

        let mut action = None;
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(120.0))
            .column(Column::auto().at_least(100.0))
            .column(Column::auto().at_least(100.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::remainder().at_least(160.0))
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::auto())
            .header(22.0, |mut header| {
                for title in ["Product", "Category", "Sub Category", "CAS", "Description", "SDS", "TDS", ""] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for product in &rows {
                    body.row(26.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&product.name);
                        });
                        row.col(|ui| {
                            ui.label(&product.category);
                        });
                        row.col(|ui| {
                            ui.label(&product.sub_category);
                        });
                        row.col(|ui| {
                            ui.monospace(&product.cas);
                        });
                        row.col(|ui| {
                            ui.add(egui::Label::new(&product.description).truncate());
                        });
                        row.col(|ui| attachment_cell(ui, &product.sds));
                        row.col(|ui| attachment_cell(ui, &product.tds));
                        row.col(|ui| {
                            if ui.small_button("✏ Edit").clicked() {
                                action = Some(RowAction::Edit(product.id.clone()));
                            }
                            if ui.small_button("🗑 Delete").clicked() {
                                action = Some(RowAction::Delete(product.id.clone()));
                            }
                        });
                    });
                }
            });

        if rows.is_empty() {
            ui.label("No products match the filter");
        }

        // Apply after the table so the store is not borrowed while mutating.
        match action {
            Some(RowAction::Edit(id)) => state.open_edit(&id),
            Some(RowAction::Delete(id)) => state.request_delete(&id),
            None => {}
        }
    }

    fn render_empty_state(&self, ui: &mut egui::Ui, state: &mut CatalogStateManager) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading("No products yet");
            ui.add_space(10.0);
            ui.label("Add the first product to start the catalog.");
            ui.add_space(10.0);
            if ui.button("➕ Add Product").clicked() {
                state.open_create();
            }
        });
    }
}

fn matches_filter(product: &Product, needle: &str) -> bool {
    [&product.name, &product.cas, &product.category, &product.sub_category]
        .iter()
        .any(|value| value.to_lowercase().contains(needle))
}

fn attachment_cell(ui: &mut egui::Ui, attachment: &Attachment) {
    match attachment {
        Attachment::Stored(url) => {
            ui.hyperlink_to("View", url);
        }
        _ => {
            ui.weak("—");
        }
    }
}
