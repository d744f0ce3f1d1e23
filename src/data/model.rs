use std::collections::BTreeSet;
use std::fmt;

/// Columns the logger writes to label samples.  They feed the x-axis and the
/// plot title and are exempt from group classification.
pub const TIME_COLUMN: &str = "Time";
pub const DATE_COLUMN: &str = "Date";

// ---------------------------------------------------------------------------
// ColumnValues – typed cell storage for one column
// ---------------------------------------------------------------------------

/// Cell storage for a single column.
///
/// The variant is decided once, after loading, by attempting a full-column
/// numeric parse: if every present cell parses as a number the column is
/// `Numeric`, otherwise all cells stay as text.  Cells that were never
/// written (drift padding, blank fields) are `None` in either variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Column – one named series of the table
// ---------------------------------------------------------------------------

/// A named column of equal length with every other column in its [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    /// Build a column from raw cells, coercing the whole column to numeric
    /// when every present cell parses as a number.
    pub fn from_cells(name: String, cells: Vec<Option<String>>) -> Self {
        let mut numeric = Vec::with_capacity(cells.len());
        let mut all_numeric = true;
        for cell in &cells {
            match cell {
                None => numeric.push(None),
                Some(text) => match text.trim().parse::<f64>() {
                    Ok(v) => numeric.push(Some(v)),
                    Err(_) => {
                        all_numeric = false;
                        break;
                    }
                },
            }
        }
        let values = if all_numeric {
            ColumnValues::Numeric(numeric)
        } else {
            ColumnValues::Text(cells)
        };
        Column { name, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the full-column numeric parse succeeded.
    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }

    pub fn numeric_values(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Text(_) => None,
        }
    }

    pub fn text_values(&self) -> Option<&[Option<String>]> {
        match &self.values {
            ColumnValues::Text(v) => Some(v),
            ColumnValues::Numeric(_) => None,
        }
    }

    /// Sorted distinct text cells.  Empty for numeric columns; used to build
    /// the category space of a categorical axis.
    pub fn unique_text_values(&self) -> BTreeSet<&str> {
        match &self.values {
            ColumnValues::Text(v) => v.iter().filter_map(|cell| cell.as_deref()).collect(),
            ColumnValues::Numeric(_) => BTreeSet::new(),
        }
    }

    /// Render the cell at `row` for labels and tooltips.
    pub fn display_cell(&self, row: usize) -> String {
        match &self.values {
            ColumnValues::Numeric(v) => match v.get(row).copied().flatten() {
                Some(x) => format!("{x}"),
                None => "<null>".to_string(),
            },
            ColumnValues::Text(v) => match v.get(row).and_then(|c| c.as_deref()) {
                Some(s) => s.to_string(),
                None => "<null>".to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete repaired log
// ---------------------------------------------------------------------------

/// The rectangular telemetry table: ordered named columns of one inferred
/// type each, all the same length, rows aligned by sample position.
///
/// The row count is stored explicitly so the degenerate zero-column table
/// (separator never present in the file) still reports how many samples it
/// covers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build from equally long columns.  The loader guarantees the length
    /// invariant.
    pub fn new(columns: Vec<Column>, rows: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == rows));
        Table { columns, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Whether `name` is one of the logger's sample-labeling columns.
    pub fn is_reference(name: &str) -> bool {
        name == TIME_COLUMN || name == DATE_COLUMN
    }

    /// Per-row time labels, if the log carries a `Time` column.
    pub fn time_labels(&self) -> Option<Vec<String>> {
        let time = self.column(TIME_COLUMN)?;
        Some((0..self.rows).map(|row| time.display_cell(row)).collect())
    }

    /// Date of the first sample, for the plot heading.
    pub fn capture_date(&self) -> Option<String> {
        let date = self.column(DATE_COLUMN)?;
        if self.rows == 0 {
            return None;
        }
        Some(date.display_cell(0))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} samples × {} sensors", self.rows, self.columns.len())
    }
}
