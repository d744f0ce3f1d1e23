use crate::color::SeriesColors;
use crate::data::loader::{LoadOptions, SchemaDriftRepair};
use crate::data::model::Table;
use crate::groups::registry::{GroupRegistry, GroupSpec, VisibilityPlan};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Which group is currently displayed lives here, not in the grouping
/// engine: switching groups is a pure plan re-query against the registry.
pub struct AppState {
    /// Loaded telemetry table (None until a file is opened).
    pub table: Option<Table>,

    /// Group registry.  Created on the first load and re-applied on later
    /// loads, so user-added groups survive opening another file.
    pub registry: Option<GroupRegistry>,

    /// Label of the group currently shown.
    pub selected_group: Option<String>,

    /// Separator/encoding used for the next load.
    pub options: LoadOptions,

    /// Raw separator text backing the options UI.
    pub separator_input: String,

    /// Pending `label,ltitle,lpattern[,rtitle[,rpattern]]` user group spec.
    pub group_input: String,

    /// Stable per-column series colours across both axis sets.
    pub colors: SeriesColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Set when the last load had to repair schema drift.
    pub drift_notice: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            table: None,
            registry: None,
            selected_group: None,
            options: LoadOptions::default(),
            separator_input: ",".to_string(),
            group_input: String::new(),
            colors: SeriesColors::default(),
            status_message: None,
            drift_notice: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table: seed or re-apply the registry, refresh
    /// colours, and keep the selection valid.
    pub fn set_table(&mut self, table: Table, drift: Option<SchemaDriftRepair>) {
        self.status_message = None;
        match &mut self.registry {
            Some(registry) => registry.reapply(&table),
            None => match GroupRegistry::with_defaults(&table) {
                Ok(registry) => self.registry = Some(registry),
                Err(e) => {
                    log::error!("default groups failed to register: {e}");
                    self.status_message = Some(format!("Error: {e}"));
                }
            },
        }

        self.drift_notice = drift.map(|d| {
            log::warn!(
                "schema drift repaired: {} row(s) padded ({})",
                d.padded_rows,
                d.trigger
            );
            format!(
                "Schema drift repaired: {} row(s) padded with nulls",
                d.padded_rows
            )
        });

        self.table = Some(table);
        self.ensure_selection();
        self.rebuild_colors();
        self.loading = false;
    }

    /// Parse and register the pending user group spec.
    pub fn add_user_group(&mut self) {
        let raw = self.group_input.trim().to_string();
        if raw.is_empty() {
            return;
        }
        let (Some(table), Some(registry)) = (&self.table, &mut self.registry) else {
            self.status_message = Some("Open a log before adding groups".to_string());
            return;
        };

        let added = GroupSpec::parse(&raw)
            .and_then(|spec| {
                let label = spec.label.clone();
                registry.add_group(spec, table).map(|()| label)
            });
        match added {
            Ok(label) => {
                log::info!("registered user group '{label}'");
                self.selected_group = Some(label);
                self.group_input.clear();
                self.status_message = None;
                self.rebuild_colors();
            }
            Err(e) => {
                log::error!("rejected user group spec '{raw}': {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Sync `options.separator` from the UI text; single ASCII char only.
    pub fn apply_separator_input(&mut self) {
        let mut bytes = self.separator_input.bytes();
        match (bytes.next(), bytes.next()) {
            (Some(b), None) if b.is_ascii() => {
                self.options.separator = b;
                self.status_message = None;
            }
            _ => {
                self.status_message =
                    Some("Separator must be a single ASCII character".to_string());
            }
        }
    }

    /// The plan for the currently selected group, if any.
    pub fn selected_plan(&self) -> Option<VisibilityPlan> {
        let registry = self.registry.as_ref()?;
        let label = self.selected_group.as_deref()?;
        registry.build_visibility_plan(label)
    }

    fn ensure_selection(&mut self) {
        let Some(registry) = &self.registry else {
            self.selected_group = None;
            return;
        };
        let valid = self
            .selected_group
            .as_deref()
            .is_some_and(|label| registry.get(label).is_some());
        if !valid {
            self.selected_group = registry.labels().next().map(str::to_string);
        }
    }

    fn rebuild_colors(&mut self) {
        let Some(registry) = &self.registry else {
            self.colors = SeriesColors::default();
            return;
        };
        self.colors = SeriesColors::new(
            registry
                .left_columns()
                .iter()
                .chain(registry.right_columns().iter())
                .map(String::as_str),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn table() -> Table {
        let columns = vec![
            Column::from_cells("CPU [°C]".to_string(), vec![Some("45.0".to_string())]),
            Column::from_cells("CPU [RPM]".to_string(), vec![Some("900".to_string())]),
        ];
        Table::new(columns, 1)
    }

    #[test]
    fn first_load_seeds_defaults_and_selects_first_group() {
        let mut state = AppState::default();
        state.set_table(table(), None);
        assert!(state.registry.is_some());
        assert_eq!(state.selected_group.as_deref(), Some("Core perf"));
        assert!(state.selected_plan().is_some());
    }

    #[test]
    fn drift_notice_is_surfaced() {
        let mut state = AppState::default();
        state.set_table(
            table(),
            Some(SchemaDriftRepair {
                trigger: "row 3 has 4 fields".to_string(),
                padded_rows: 2,
            }),
        );
        assert!(state.drift_notice.as_deref().unwrap().contains("2 row(s)"));
    }

    #[test]
    fn user_groups_survive_reload() {
        let mut state = AppState::default();
        state.set_table(table(), None);
        state.group_input = "Fan speed,RPM,\\[RPM\\]".to_string();
        state.add_user_group();
        assert_eq!(state.selected_group.as_deref(), Some("Fan speed"));

        state.set_table(table(), None);
        assert!(state
            .registry
            .as_ref()
            .unwrap()
            .get("Fan speed")
            .is_some());
        assert_eq!(state.selected_group.as_deref(), Some("Fan speed"));
    }

    #[test]
    fn bad_group_spec_sets_status() {
        let mut state = AppState::default();
        state.set_table(table(), None);
        state.group_input = "just-a-label".to_string();
        state.add_user_group();
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
    }

    #[test]
    fn separator_input_is_validated() {
        let mut state = AppState::default();
        state.separator_input = ";".to_string();
        state.apply_separator_input();
        assert_eq!(state.options.separator, b';');

        state.separator_input = "ab".to_string();
        state.apply_separator_input();
        assert_eq!(state.options.separator, b';');
        assert!(state.status_message.is_some());
    }
}
