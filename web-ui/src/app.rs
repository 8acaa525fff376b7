use eframe::egui;
use std::sync::Arc;
use std::time::Duration;

use chem_catalog_core::CatalogApi;

use crate::header::render_header;
use crate::product_dialogs::ProductDialogs;
use crate::product_table::ProductTable;
use crate::state_manager::CatalogStateManager;

/// The desktop dashboard: header, table, dialogs and a status bar.
pub struct CatalogApp {
    // Single source of truth
    state: CatalogStateManager,

    // UI components - no business state
    table: ProductTable,
    dialogs: ProductDialogs,
}

impl CatalogApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, api: Arc<dyn CatalogApi>) -> Self {
        Self {
            state: CatalogStateManager::new(api),
            table: ProductTable::new(),
            dialogs: ProductDialogs::new(),
        }
    }
}

impl eframe::App for CatalogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.update_from_async();
        self.state.ensure_loaded();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Add Product").clicked() {
                        self.state.open_create();
                        ui.close();
                    }
                    if ui.button("Reload").clicked() {
                        self.state.reload();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Service:");
                ui.monospace(self.state.service());
                ui.separator();
                if self.state.has_pending() {
                    ui.spinner();
                    ui.label("Working…");
                } else {
                    ui.label("Idle");
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            render_header(ui, &mut self.state);
            ui.separator();
            self.table.render(ui, &mut self.state);
        });

        self.dialogs.render(ctx, &mut self.state);

        // Keep polling while background calls are outstanding.
        if self.state.has_pending() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
