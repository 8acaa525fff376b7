use eframe::egui;

use crate::state_manager::CatalogStateManager;

/// Title row above the table: product count, reload and add actions.
pub fn render_header(ui: &mut egui::Ui, state: &mut CatalogStateManager) {
    ui.horizontal(|ui| {
        ui.heading("🧪 Products");
        ui.separator();

        if state.view.is_loading() {
            ui.spinner();
            ui.label("Loading products...");
        } else {
            ui.label(format!("{} products", state.store.len()));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("➕ Add Product").clicked() {
                state.open_create();
            }
            if ui
                .add_enabled(!state.view.is_loading(), egui::Button::new("🔄 Reload"))
                .clicked()
            {
                state.reload();
            }
        });
    });

    if let Some(notice) = state.view.notice().map(str::to_string) {
        ui.horizontal(|ui| {
            ui.colored_label(egui::Color32::GREEN, format!("✅ {notice}"));
            if ui.small_button("✖").clicked() {
                state.view.clear_notice();
            }
        });
    }
}
