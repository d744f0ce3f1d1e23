use regex::Regex;

use crate::data::model::Table;

// ---------------------------------------------------------------------------
// ColumnSelector – compiled column-matching pattern
// ---------------------------------------------------------------------------

/// A compiled pattern selecting table columns by name.
///
/// Selection is a pure function of a table's column names: the pattern is
/// searched (not anchored) against each name, and matches come back in the
/// table's column order.  The logger's `Time` and `Date` reference columns
/// are never selected.
#[derive(Debug, Clone)]
pub struct ColumnSelector {
    pattern: Regex,
}

impl ColumnSelector {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(ColumnSelector {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Names of matching columns, in the table's column order.
    pub fn select(&self, table: &Table) -> Vec<String> {
        table
            .column_names()
            .filter(|name| !Table::is_reference(name))
            .filter(|name| self.pattern.is_match(name))
            .map(str::to_string)
            .collect()
    }
}
