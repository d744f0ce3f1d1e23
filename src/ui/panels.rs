use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::{self, Encoding};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – load options and group controls
// ---------------------------------------------------------------------------

/// Render the left panel: load options, the group list, and the add-group
/// field.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Groups");
    ui.separator();

    // ---- Load options ----
    ui.strong("Load options");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Separator");
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.separator_input).desired_width(24.0),
        );
        if response.changed() {
            state.apply_separator_input();
        }
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Encoding");
        let current = state.options.encoding;
        egui::ComboBox::from_id_salt("encoding")
            .selected_text(current.label())
            .show_ui(ui, |ui: &mut Ui| {
                for encoding in Encoding::ALL {
                    if ui
                        .selectable_label(current == encoding, encoding.label())
                        .clicked()
                    {
                        state.options.encoding = encoding;
                    }
                }
            });
    });
    ui.separator();

    let Some(registry) = &state.registry else {
        ui.label("No log loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let labels: Vec<String> = registry.labels().map(str::to_string).collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for label in &labels {
                let selected = state.selected_group.as_deref() == Some(label.as_str());
                if ui.selectable_label(selected, label).clicked() {
                    state.selected_group = Some(label.clone());
                }
            }

            ui.separator();
            ui.strong("Add group");
            ui.add(
                egui::TextEdit::singleline(&mut state.group_input)
                    .hint_text("label,ltitle,lpattern[,rtitle,rpattern]"),
            );
            if ui.button("Register").clicked() {
                state.add_user_group();
            }

            // ---- Selected group summary ----
            if let Some(plan) = state.selected_plan() {
                ui.separator();
                ui.strong(plan.label.clone());
                let left_count = plan.left.visible.iter().filter(|v| **v).count();
                ui.label(format!(
                    "Left: {} · {} series · {} axis",
                    plan.left.title, left_count, plan.left.kind
                ));
                if plan.show_right {
                    let right_count = plan.right.visible.iter().filter(|v| **v).count();
                    ui.label(format!(
                        "Right: {} · {} series · {} axis",
                        plan.right.title, right_count, plan.right.kind
                    ));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!("{table}"));
        }

        if let Some(notice) = &state.drift_notice {
            ui.separator();
            ui.label(RichText::new(notice).color(Color32::YELLOW));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open HWiNFO log")
        .add_filter("CSV logs", &["csv", "txt", "log"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match loader::load_file(&path, &state.options) {
            Ok(outcome) => {
                log::info!(
                    "loaded '{}': {}{}",
                    path.display(),
                    outcome.table,
                    if outcome.drift.is_some() {
                        " (drift repaired)"
                    } else {
                        ""
                    }
                );
                state.set_table(outcome.table, outcome.drift);
            }
            Err(e) => {
                let err = anyhow::Error::new(e);
                log::error!("failed to load log: {err:#}");
                state.status_message = Some(format!("Error: {err:#}"));
                state.loading = false;
            }
        }
    }
}
