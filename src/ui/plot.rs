use std::collections::BTreeMap;

use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::data::model::{Column, Table};
use crate::groups::registry::{AxisKind, AxisPlan};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Telemetry plot (central panel)
// ---------------------------------------------------------------------------

/// Render the plot(s) for the currently selected group.
///
/// One line per axis-set column; plan-hidden series are simply not drawn, so
/// switching groups never rebuilds any series data structure.  When the plan
/// asks for the right axis, a second stacked plot carries those series.
pub fn telemetry_plot(ui: &mut Ui, state: &AppState) {
    let (Some(table), Some(registry)) = (&state.table, &state.registry) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a HWiNFO log to view sensors  (File → Open…)");
        });
        return;
    };
    let Some(plan) = state.selected_plan() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Select or register a group to plot");
        });
        return;
    };

    if let Some(date) = table.capture_date() {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(format!("HWiNFO measurements ({date})"));
        });
    }

    let x_axis = x_axis_values(table);

    let plot_height = if plan.show_right {
        (ui.available_height() - 8.0) / 2.0
    } else {
        ui.available_height()
    };

    axis_plot(
        ui,
        "left_axis",
        plot_height,
        table,
        registry.left_columns(),
        &plan.left,
        &x_axis,
        state,
    );

    if plan.show_right {
        axis_plot(
            ui,
            "right_axis",
            plot_height,
            table,
            registry.right_columns(),
            &plan.right,
            &x_axis,
            state,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn axis_plot(
    ui: &mut Ui,
    id: &str,
    height: f32,
    table: &Table,
    axis_columns: &[String],
    plan: &AxisPlan,
    x_axis: &[f64],
    state: &AppState,
) {
    let shown: Vec<&Column> = axis_columns
        .iter()
        .zip(plan.visible.iter())
        .filter(|(_, &visible)| visible)
        .filter_map(|(name, _)| table.column(name))
        .collect();

    // Categorical axes share one category space across the shown series.
    let categories = match plan.kind {
        AxisKind::Categorical => category_indices(&shown),
        AxisKind::Linear => BTreeMap::new(),
    };

    Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Time")
        .y_axis_label(plan.title.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for column in shown {
                let points: PlotPoints = series_points(column, plan.kind, &categories, x_axis)
                    .into_iter()
                    .collect();
                let line = Line::new(points)
                    .name(&column.name)
                    .color(state.colors.color_for(&column.name))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

/// X positions per sample: seconds-of-day parsed from the `Time` column when
/// every label parses, sample indices otherwise.
fn x_axis_values(table: &Table) -> Vec<f64> {
    if let Some(labels) = table.time_labels() {
        let parsed: Vec<Option<f64>> = labels.iter().map(|l| seconds_of_day(l)).collect();
        if parsed.iter().all(Option::is_some) {
            return parsed.into_iter().flatten().collect();
        }
    }
    (0..table.n_rows()).map(|i| i as f64).collect()
}

/// Parse `HH:MM:SS[.ms]` into seconds since midnight.
fn seconds_of_day(label: &str) -> Option<f64> {
    let mut parts = label.split(':');
    let hours: f64 = parts.next()?.trim().parse().ok()?;
    let minutes: f64 = parts.next()?.trim().parse().ok()?;
    let seconds: f64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Map every distinct display value of the shown columns to a y position.
fn category_indices(shown: &[&Column]) -> BTreeMap<String, f64> {
    let mut values: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
    for column in shown {
        match column.text_values() {
            Some(cells) => {
                values.extend(cells.iter().filter_map(|c| c.clone()));
            }
            None => {
                for row in 0..column.len() {
                    values.insert(column.display_cell(row));
                }
            }
        }
    }
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, i as f64))
        .collect()
}

/// Build the point list for one series, skipping null cells.
fn series_points(
    column: &Column,
    kind: AxisKind,
    categories: &BTreeMap<String, f64>,
    x_axis: &[f64],
) -> Vec<[f64; 2]> {
    match kind {
        AxisKind::Linear => match column.numeric_values() {
            Some(cells) => cells
                .iter()
                .enumerate()
                .filter_map(|(row, cell)| {
                    let y = (*cell)?;
                    let x = x_axis.get(row).copied()?;
                    Some([x, y])
                })
                .collect(),
            // A linear axis only ever shows numeric columns.
            None => Vec::new(),
        },
        AxisKind::Categorical => (0..column.len())
            .filter_map(|row| {
                let has_value = match &column.values {
                    crate::data::model::ColumnValues::Numeric(v) => {
                        v.get(row).copied().flatten().is_some()
                    }
                    crate::data::model::ColumnValues::Text(v) => {
                        v.get(row).and_then(|c| c.as_deref()).is_some()
                    }
                };
                if !has_value {
                    return None;
                }
                let y = categories.get(&column.display_cell(row)).copied()?;
                let x = x_axis.get(row).copied()?;
                Some([x, y])
            })
            .collect(),
    }
}
