use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::{Column, Table};

// ---------------------------------------------------------------------------
// Options and errors
// ---------------------------------------------------------------------------

/// Text encoding of the log file.  HWiNFO writes Latin-1 by default; users
/// who re-save the file can pick UTF-8.  No sniffing: the caller decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Latin1,
    Utf8,
}

impl Encoding {
    pub const ALL: [Encoding; 2] = [Encoding::Latin1, Encoding::Utf8];

    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Latin1 => "latin-1",
            Encoding::Utf8 => "utf-8",
        }
    }

    /// Decode `bytes`, or report the offset of the first undecodable byte.
    /// Latin-1 maps every byte 1:1 onto a code point and cannot fail.
    fn decode(&self, bytes: &[u8]) -> Result<String, usize> {
        match self {
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Encoding::Utf8 => match std::str::from_utf8(bytes) {
                Ok(s) => Ok(s.to_string()),
                Err(e) => Err(e.valid_up_to()),
            },
        }
    }
}

/// Caller-supplied load configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub separator: u8,
    pub encoding: Encoding,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            separator: b',',
            encoding: Encoding::Latin1,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not valid {encoding}: undecodable byte at offset {position}")]
    Decoding {
        path: PathBuf,
        encoding: &'static str,
        position: usize,
    },

    #[error("parsing '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' contains no telemetry rows after trailer removal")]
    EmptyLog { path: PathBuf },

    #[error(
        "cannot repair '{path}': trailer header has {header_fields} fields \
         but the widest row has {widest_row}"
    )]
    TrailerMismatch {
        path: PathBuf,
        header_fields: usize,
        widest_row: usize,
    },
}

/// Non-fatal notice that the row-repair fallback engaged.  The load still
/// succeeds; early samples hold nulls for sensors that came online later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDriftRepair {
    /// The strict-parse failure that triggered the fallback.
    pub trigger: String,
    /// Rows that had to be padded with null cells.
    pub padded_rows: usize,
}

/// A successfully loaded table plus the drift notice, when repair ran.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: Table,
    pub drift: Option<SchemaDriftRepair>,
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Read, decode, and parse a log file.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<LoadOutcome, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = options
        .encoding
        .decode(&bytes)
        .map_err(|position| LoadError::Decoding {
            path: path.to_path_buf(),
            encoding: options.encoding.label(),
            position,
        })?;
    parse_log(&content, options.separator, path)
}

/// Parse decoded log text into a table.  `origin` appears in errors only.
///
/// The strict delimited parse handles the common case.  When it reports
/// inconsistent row widths — a sensor came online mid-session and widened
/// every subsequent row — the isolated repair path takes over.
pub fn parse_log(content: &str, separator: u8, origin: &Path) -> Result<LoadOutcome, LoadError> {
    match parse_strict(content, separator) {
        Ok((headers, rows)) => {
            let table = build_stable(headers, rows, origin)?;
            Ok(LoadOutcome { table, drift: None })
        }
        Err(err) if is_ragged(&err) => {
            log::warn!(
                "strict parse of '{}' failed ({err}); a sensor probably came \
                 online mid-session — repairing from the trailer header",
                origin.display()
            );
            let trigger = err.to_string();
            let (headers, rows, padded_rows) = repair_ragged(content, separator, origin)?;
            let table = build_table(headers, rows);
            Ok(LoadOutcome {
                table,
                drift: Some(SchemaDriftRepair {
                    trigger,
                    padded_rows,
                }),
            })
        }
        Err(source) => Err(LoadError::Csv {
            path: origin.to_path_buf(),
            source,
        }),
    }
}

// ---------------------------------------------------------------------------
// Strict path
// ---------------------------------------------------------------------------

fn parse_strict(
    content: &str,
    separator: u8,
) -> Result<(Vec<String>, Vec<Vec<Option<String>>>), csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .from_reader(content.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(blank_to_null).collect());
    }
    Ok((headers, rows))
}

fn is_ragged(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::UnequalLengths { .. })
}

fn blank_to_null(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Strip the trailer and the artifact column from a well-formed log.
///
/// HWiNFO appends two records after the samples — a rewrite of the header and
/// a summary row — and terminates every row with the separator, which yields
/// one final column with no header meaning.  Both go.
fn build_stable(
    headers: Vec<String>,
    mut rows: Vec<Vec<Option<String>>>,
    origin: &Path,
) -> Result<Table, LoadError> {
    if rows.len() <= 2 {
        return Err(LoadError::EmptyLog {
            path: origin.to_path_buf(),
        });
    }
    rows.truncate(rows.len() - 2);

    let width = headers.len().saturating_sub(1);
    let mut trimmed_headers = headers;
    trimmed_headers.truncate(width);
    Ok(build_table(trimmed_headers, rows))
}

// ---------------------------------------------------------------------------
// Repair path
// ---------------------------------------------------------------------------

/// Recover a table from a schema-drift log.
///
/// The first row's header only covers the sensors present at start of
/// capture; the complete header is the one the logger rewrites at end of
/// file, second-to-last in the raw row sequence.  That row is promoted to be
/// the header, the two trailer rows are dropped, and every short data row is
/// right-padded with nulls for the sensors it predates.
fn repair_ragged(
    content: &str,
    separator: u8,
    origin: &Path,
) -> Result<(Vec<String>, Vec<Vec<Option<String>>>, usize), LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .flexible(true)
        .has_headers(false)
        .from_reader(content.as_bytes());
    let mut raw: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv {
            path: origin.to_path_buf(),
            source,
        })?;
        raw.push(record.iter().map(str::to_string).collect());
    }

    // Original header + at least one sample + the two trailer rows.
    if raw.len() < 4 {
        return Err(LoadError::EmptyLog {
            path: origin.to_path_buf(),
        });
    }

    let trailer_header = raw[raw.len() - 2].clone();
    let widest_row = raw.iter().map(Vec::len).max().unwrap_or(0);
    if trailer_header.len() != widest_row {
        return Err(LoadError::TrailerMismatch {
            path: origin.to_path_buf(),
            header_fields: trailer_header.len(),
            widest_row,
        });
    }

    raw.truncate(raw.len() - 2);
    raw[0] = trailer_header;

    // Every raw row still carries the trailing artifact field; drop it
    // before padding, from the header as well.
    let width = raw[0].len().saturating_sub(1);
    let headers: Vec<String> = raw[0][..width].to_vec();

    let mut rows = Vec::with_capacity(raw.len() - 1);
    let mut padded_rows = 0usize;
    for row in raw.into_iter().skip(1) {
        let take = row.len().saturating_sub(1).min(width);
        let mut cells: Vec<Option<String>> = row
            .into_iter()
            .take(take)
            .map(|c| blank_to_null(&c))
            .collect();
        if cells.len() < width {
            padded_rows += 1;
            cells.resize(width, None);
        }
        rows.push(cells);
    }

    Ok((headers, rows, padded_rows))
}

// ---------------------------------------------------------------------------
// Table assembly
// ---------------------------------------------------------------------------

/// Transpose rows into typed columns.  Duplicate header names get a `.1`,
/// `.2`… suffix so columns stay addressable by name.
fn build_table(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Table {
    let n_rows = rows.len();
    let mut seen: Vec<String> = Vec::with_capacity(headers.len());
    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut unique = name.clone();
            let mut suffix = 0usize;
            while seen.contains(&unique) {
                suffix += 1;
                unique = format!("{name}.{suffix}");
            }
            seen.push(unique.clone());
            let cells = rows.iter().map(|row| row.get(idx).cloned().flatten()).collect();
            Column::from_cells(unique, cells)
        })
        .collect();
    Table::new(columns, n_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn origin() -> &'static Path {
        Path::new("test.csv")
    }

    fn parse(content: &str) -> Result<LoadOutcome, LoadError> {
        parse_log(content, b',', origin())
    }

    // A well-formed log: stable header, trailer header rewrite + summary row,
    // trailing separator on every line.
    const STABLE: &str = "\
Date,Time,CPU [°C],Vcore [V],Throttling,
6.8.2026,00:00:01,45.0,1.25,No,
6.8.2026,00:00:02,47.5,1.26,No,
6.8.2026,00:00:03,52.0,1.31,Yes,
Date,Time,CPU [°C],Vcore [V],Throttling,
Average,,48.1,1.27,,
";

    #[test]
    fn stable_log_drops_trailer_and_artifact_column() {
        let outcome = parse(STABLE).unwrap();
        assert!(outcome.drift.is_none());
        let table = outcome.table;
        // 5 parsed records − 2 trailer records; 6 header fields − 1 artifact.
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_columns(), 5);
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(
            names,
            vec!["Date", "Time", "CPU [°C]", "Vcore [V]", "Throttling"]
        );
    }

    #[test]
    fn stable_log_coerces_column_types() {
        let table = parse(STABLE).unwrap().table;
        assert!(table.column("CPU [°C]").unwrap().is_numeric());
        assert!(table.column("Vcore [V]").unwrap().is_numeric());
        assert!(!table.column("Time").unwrap().is_numeric());
        assert!(!table.column("Throttling").unwrap().is_numeric());
        assert_eq!(
            table.column("CPU [°C]").unwrap().numeric_values().unwrap(),
            &[Some(45.0), Some(47.5), Some(52.0)]
        );
    }

    #[test]
    fn log_with_only_trailer_is_empty() {
        let content = "\
Date,Time,CPU [°C],
Date,Time,CPU [°C],
Average,,48.1,
";
        match parse(content) {
            Err(LoadError::EmptyLog { .. }) => {}
            other => panic!("expected EmptyLog, got {other:?}"),
        }
    }

    const DRIFT: &str = "\
Time,Core 0 Clock [MHz],
00:00:01,3000,
00:00:02,3100,3200,
Time,Core 0 Clock [MHz],Core 1 Clock [MHz],
Average,3050,3200,
";

    #[test]
    fn drift_log_promotes_trailer_header_and_pads() {
        let outcome = parse(DRIFT).unwrap();
        let drift = outcome.drift.expect("repair should report itself");
        assert_eq!(drift.padded_rows, 1);
        assert!(!drift.trigger.is_empty());

        let table = outcome.table;
        assert_eq!(table.n_rows(), 2);
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(
            names,
            vec!["Time", "Core 0 Clock [MHz]", "Core 1 Clock [MHz]"]
        );
        // The sensor that came online late is null for the first sample.
        assert_eq!(
            table
                .column("Core 1 Clock [MHz]")
                .unwrap()
                .numeric_values()
                .unwrap(),
            &[None, Some(3200.0)]
        );
        assert_eq!(
            table
                .column("Core 0 Clock [MHz]")
                .unwrap()
                .numeric_values()
                .unwrap(),
            &[Some(3000.0), Some(3100.0)]
        );
    }

    #[test]
    fn repair_refuses_short_trailer_header() {
        // The widest row has four fields but the second-to-last row (where
        // the trailer header must be) only has three.
        let content = "\
Time,Core 0 Clock [MHz],
00:00:01,3000,
00:00:02,3100,3200,
Time,Core 0 Clock [MHz],
Average,3050,
";
        match parse(content) {
            Err(LoadError::TrailerMismatch {
                header_fields,
                widest_row,
                ..
            }) => {
                assert_eq!(header_fields, 3);
                assert_eq!(widest_row, 4);
            }
            other => panic!("expected TrailerMismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_separator_degenerates_to_zero_columns() {
        let content = "alpha\nbeta\ngamma\ndelta\nepsilon\n";
        let table = parse(content).unwrap().table;
        assert_eq!(table.n_columns(), 0);
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn custom_separator_is_honoured() {
        let content = "\
Time;CPU [W];
00:00:01;35.0;
00:00:02;36.5;
Time;CPU [W];
Average;35.7;
";
        let outcome = parse_log(content, b';', origin()).unwrap();
        assert!(outcome.drift.is_none());
        assert_eq!(outcome.table.n_columns(), 2);
        assert!(outcome.table.column("CPU [W]").unwrap().is_numeric());
    }

    #[test]
    fn latin1_decodes_any_byte_sequence() {
        // "CPU [°C]" with the degree sign as the Latin-1 byte 0xB0.
        let bytes = b"CPU [\xB0C]";
        let decoded = Encoding::Latin1.decode(bytes).unwrap();
        assert_eq!(decoded, "CPU [°C]");
    }

    #[test]
    fn strict_utf8_reports_first_bad_byte() {
        let bytes = b"Time,CPU [\xB0C],";
        match Encoding::Utf8.decode(bytes) {
            Err(position) => assert_eq!(position, 10),
            Ok(s) => panic!("expected decode failure, got '{s}'"),
        }
    }

    #[test]
    fn blank_cells_become_nulls() {
        let content = "\
Time,Fan [RPM],
00:00:01,,
00:00:02,1200,
Time,Fan [RPM],
Average,1200,
";
        let table = parse(content).unwrap().table;
        let fan = table.column("Fan [RPM]").unwrap();
        assert!(fan.is_numeric());
        assert_eq!(fan.numeric_values().unwrap(), &[None, Some(1200.0)]);
    }
}
