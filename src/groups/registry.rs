use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::data::model::Table;

use super::selector::ColumnSelector;

// ---------------------------------------------------------------------------
// Axis kind
// ---------------------------------------------------------------------------

/// Value-axis semantics of one side of a group.  Linear when every matched
/// column is numeric (or nothing matched), categorical otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Linear,
    Categorical,
}

impl AxisKind {
    fn infer(table: &Table, columns: &[String]) -> AxisKind {
        let all_numeric = columns.iter().all(|name| {
            table
                .column(name)
                .map(|c| c.is_numeric())
                .unwrap_or(false)
        });
        if all_numeric {
            AxisKind::Linear
        } else {
            AxisKind::Categorical
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKind::Linear => write!(f, "linear"),
            AxisKind::Categorical => write!(f, "category"),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors and group specs
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("group label must not be empty")]
    EmptyLabel,

    #[error("group '{label}' is already registered")]
    DuplicateLabel { label: String },

    #[error("invalid column pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("group spec '{spec}' needs at least a label, an axis title and a column pattern")]
    MalformedSpec { spec: String },

    #[error("group spec '{spec}' has more than five fields")]
    OversizedSpec { spec: String },
}

/// Unresolved definition of a display group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub label: String,
    pub left_title: String,
    pub left_pattern: String,
    pub right_title: String,
    pub right_pattern: Option<String>,
}

impl GroupSpec {
    pub fn new(label: &str, left_title: &str, left_pattern: &str) -> Self {
        GroupSpec {
            label: label.to_string(),
            left_title: left_title.to_string(),
            left_pattern: left_pattern.to_string(),
            right_title: String::new(),
            right_pattern: None,
        }
    }

    pub fn with_right(mut self, title: &str, pattern: &str) -> Self {
        self.right_title = title.to_string();
        self.right_pattern = Some(pattern.to_string());
        self
    }

    /// Parse the flat `label,ltitle,lpattern[,rtitle[,rpattern]]` form used
    /// for user-supplied groups.  The first three fields are mandatory.
    pub fn parse(spec: &str) -> Result<Self, GroupError> {
        let fields: Vec<&str> = spec.split(',').collect();
        if fields.len() > 5 {
            return Err(GroupError::OversizedSpec {
                spec: spec.to_string(),
            });
        }
        match fields.as_slice() {
            [label, left_title, left_pattern, rest @ ..]
                if !label.trim().is_empty()
                    && !left_title.trim().is_empty()
                    && !left_pattern.trim().is_empty() =>
            {
                Ok(GroupSpec {
                    label: label.trim().to_string(),
                    left_title: left_title.trim().to_string(),
                    left_pattern: left_pattern.to_string(),
                    right_title: rest.first().map(|t| t.trim().to_string()).unwrap_or_default(),
                    right_pattern: rest
                        .get(1)
                        .filter(|p| !p.trim().is_empty())
                        .map(|p| p.to_string()),
                })
            }
            _ => Err(GroupError::MalformedSpec {
                spec: spec.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Group – a resolved display unit
// ---------------------------------------------------------------------------

/// A registered group with its patterns resolved against a table.
#[derive(Debug, Clone)]
pub struct Group {
    pub label: String,
    pub left_title: String,
    pub right_title: String,
    pub left_columns: Vec<String>,
    pub right_columns: Vec<String>,
    pub left_kind: AxisKind,
    pub right_kind: AxisKind,
    left_selector: ColumnSelector,
    right_selector: Option<ColumnSelector>,
    builtin: bool,
}

impl Group {
    fn resolve(spec: &GroupSpec, table: &Table, builtin: bool) -> Result<Group, GroupError> {
        let compile = |pattern: &str| {
            ColumnSelector::new(pattern).map_err(|source| GroupError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        };
        let left_selector = compile(&spec.left_pattern)?;
        let right_selector = match &spec.right_pattern {
            Some(pattern) => Some(compile(pattern)?),
            None => None,
        };

        let left_columns = left_selector.select(table);
        let right_columns = right_selector
            .as_ref()
            .map(|s| s.select(table))
            .unwrap_or_default();

        Ok(Group {
            label: spec.label.clone(),
            left_title: spec.left_title.clone(),
            right_title: spec.right_title.clone(),
            left_kind: AxisKind::infer(table, &left_columns),
            right_kind: AxisKind::infer(table, &right_columns),
            left_columns,
            right_columns,
            left_selector,
            right_selector,
            builtin,
        })
    }

    /// Re-evaluate the stored selectors against a (new) table, recomputing
    /// matched columns and axis kinds.
    fn reapply(&mut self, table: &Table) {
        self.left_columns = self.left_selector.select(table);
        self.right_columns = self
            .right_selector
            .as_ref()
            .map(|s| s.select(table))
            .unwrap_or_default();
        self.left_kind = AxisKind::infer(table, &self.left_columns);
        self.right_kind = AxisKind::infer(table, &self.right_columns);
    }

    pub fn has_right(&self) -> bool {
        !self.right_columns.is_empty()
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }
}

// ---------------------------------------------------------------------------
// VisibilityPlan – the renderer contract
// ---------------------------------------------------------------------------

/// Axis half of a visibility plan.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisPlan {
    /// One entry per column of the registry's stable axis set for this side,
    /// true iff that column belongs to the selected group.
    pub visible: Vec<bool>,
    pub title: String,
    pub kind: AxisKind,
}

/// Declarative render update for one selected group: which of the stable
/// axis series to show, plus axis titles, kinds, and right-axis visibility.
/// Switching groups is a pure re-query; no render state lives here.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityPlan {
    pub label: String,
    pub left: AxisPlan,
    pub right: AxisPlan,
    pub show_right: bool,
}

// ---------------------------------------------------------------------------
// GroupRegistry – ordered label-keyed group registry
// ---------------------------------------------------------------------------

/// Registration-ordered group registry addressed by label.
///
/// Built-in groups register first; a user group may take over a built-in
/// label (keeping its position in the list), but colliding with another user
/// group is an error that leaves the registry untouched.  The left/right
/// axis sets accumulate every column any group's pattern has ever matched.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: Vec<Group>,
    left_set: BTreeSet<String>,
    right_set: BTreeSet<String>,
    left_columns: Vec<String>,
    right_columns: Vec<String>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        GroupRegistry::default()
    }

    /// Seed the built-in catalogue against `table`.  These are ordinary
    /// registrations through the same path user groups take.
    pub fn with_defaults(table: &Table) -> Result<Self, GroupError> {
        let mut registry = GroupRegistry::new();
        for spec in default_group_specs() {
            registry.insert(spec, table, true)?;
        }
        Ok(registry)
    }

    /// Register a user group, resolving its patterns against `table`.
    pub fn add_group(&mut self, spec: GroupSpec, table: &Table) -> Result<(), GroupError> {
        self.insert(spec, table, false)
    }

    fn insert(&mut self, spec: GroupSpec, table: &Table, builtin: bool) -> Result<(), GroupError> {
        if spec.label.is_empty() {
            return Err(GroupError::EmptyLabel);
        }
        let existing = self.groups.iter().position(|g| g.label == spec.label);
        if let Some(idx) = existing {
            if builtin || !self.groups[idx].builtin {
                return Err(GroupError::DuplicateLabel { label: spec.label });
            }
            log::info!(
                "user group '{}' overrides the built-in definition",
                spec.label
            );
        }

        let group = Group::resolve(&spec, table, builtin)?;
        self.left_set.extend(group.left_columns.iter().cloned());
        self.right_set.extend(group.right_columns.iter().cloned());
        match existing {
            Some(idx) => self.groups[idx] = group,
            None => self.groups.push(group),
        }
        self.rebuild_axis_columns(table);
        Ok(())
    }

    /// Re-evaluate every group against a newly loaded table.  The axis sets
    /// are rebuilt from scratch: "ever matched" restarts per table.
    pub fn reapply(&mut self, table: &Table) {
        self.left_set.clear();
        self.right_set.clear();
        for group in &mut self.groups {
            group.reapply(table);
            self.left_set.extend(group.left_columns.iter().cloned());
            self.right_set.extend(group.right_columns.iter().cloned());
        }
        self.rebuild_axis_columns(table);
    }

    /// The axis sets are plain name sets; their plan-facing order is the
    /// table's column order, independent of registration order.
    fn rebuild_axis_columns(&mut self, table: &Table) {
        self.left_columns = table
            .column_names()
            .filter(|n| self.left_set.contains(*n))
            .map(str::to_string)
            .collect();
        self.right_columns = table
            .column_names()
            .filter(|n| self.right_set.contains(*n))
            .map(str::to_string)
            .collect();
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.label.as_str())
    }

    pub fn get(&self, label: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.label == label)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Columns ever matched on the left axis, in table column order.
    pub fn left_columns(&self) -> &[String] {
        &self.left_columns
    }

    /// Columns ever matched on the right axis, in table column order.
    pub fn right_columns(&self) -> &[String] {
        &self.right_columns
    }

    /// Build the render update for the group registered under `label`.
    pub fn build_visibility_plan(&self, label: &str) -> Option<VisibilityPlan> {
        let group = self.get(label)?;
        Some(VisibilityPlan {
            label: group.label.clone(),
            left: AxisPlan {
                visible: self
                    .left_columns
                    .iter()
                    .map(|c| group.left_columns.contains(c))
                    .collect(),
                title: group.left_title.clone(),
                kind: group.left_kind,
            },
            right: AxisPlan {
                visible: self
                    .right_columns
                    .iter()
                    .map(|c| group.right_columns.contains(c))
                    .collect(),
                title: group.right_title.clone(),
                kind: group.right_kind,
            },
            show_right: group.has_right(),
        })
    }
}

/// The built-in catalogue from the original analysis workflow.
fn default_group_specs() -> Vec<GroupSpec> {
    vec![
        GroupSpec::new("Core perf", "Core perf", "perf"),
        GroupSpec::new(
            "Core Effective Clock",
            "Core Effective Clock",
            r"Core [\w\s]+ Effective Clock",
        ),
        GroupSpec::new("Core Usage", "Core Usage", r"Core [\w\s]+ Usage"),
        // The logger reports either Celsius or Fahrenheit.
        GroupSpec::new("Temperature", "Temperature", r"\[°[CF]\]"),
        GroupSpec::new("Throttling", "Throttling", "Throttling"),
        GroupSpec::new("Voltage", "Voltage", r"\[V\]"),
        GroupSpec::new("Current", "Current", r"\[A\]"),
        GroupSpec::new("Power", "Power", r"\[W\]"),
        GroupSpec::new("Fans", "Fans", r"\[RPM\]"),
        GroupSpec::new("CPU Fan/Power", "RPM", r"CPU \[RPM\]")
            .with_right("Power", r"CPU Package Power \(SMU\) \[W\]"),
    ]
}
