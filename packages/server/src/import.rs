//! Parser for results files exported by timing vendors.
//!
//! Input is CSV with a header line. Column names are matched
//! case-insensitively and a few vendor spellings are accepted for the same
//! column. Rows with problems are collected and reported together with their
//! row numbers, and a file with any bad row imports nothing.

use csv::{ReaderBuilder, StringRecord, Trim};

/// One parsed finisher row, not yet tied to an edition or category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResultRow {
    pub participant_name: String,
    pub bib_number: Option<i32>,
    pub finish_time: Option<String>,
    pub position: i32,
    pub gender: Option<String>,
    pub age_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based data row number, not counting the header line.
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("results file has no data rows")]
    Empty,
    #[error("missing required column: name")]
    MissingNameColumn,
    #[error("{}", format_row_errors(.0))]
    Rows(Vec<RowError>),
    #[error("unreadable results file: {0}")]
    Csv(#[from] csv::Error),
}

fn format_row_errors(errors: &[RowError]) -> String {
    let details: Vec<String> = errors
        .iter()
        .map(|e| format!("row {}: {}", e.row, e.reason))
        .collect();
    format!("{} invalid row(s): {}", errors.len(), details.join("; "))
}

const NAME_COLUMNS: [&str; 2] = ["name", "participantname"];
const BIB_COLUMNS: [&str; 2] = ["bib", "bibnumber"];
const TIME_COLUMNS: [&str; 2] = ["time", "finishtime"];
const POSITION_COLUMNS: [&str; 1] = ["position"];
const GENDER_COLUMNS: [&str; 1] = ["gender"];
const CATEGORY_COLUMNS: [&str; 2] = ["category", "agecategory"];

/// Parse a results file into finisher rows.
///
/// Rows without an explicit position get their 1-based row order, so a file
/// already sorted by finish order needs no position column at all.
pub fn parse_results(raw: &str) -> Result<Vec<ParsedResultRow>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();

    let name_col = find_column(&headers, &NAME_COLUMNS).ok_or_else(|| {
        if headers.iter().all(|h| h.is_empty()) {
            ImportError::Empty
        } else {
            ImportError::MissingNameColumn
        }
    })?;
    let bib_col = find_column(&headers, &BIB_COLUMNS);
    let time_col = find_column(&headers, &TIME_COLUMNS);
    let position_col = find_column(&headers, &POSITION_COLUMNS);
    let gender_col = find_column(&headers, &GENDER_COLUMNS);
    let category_col = find_column(&headers, &CATEGORY_COLUMNS);

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                errors.push(RowError {
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let Some(participant_name) = cell(&record, Some(name_col)) else {
            errors.push(RowError {
                row,
                reason: "participant name is empty".into(),
            });
            continue;
        };

        let bib_number = match int_cell(&record, bib_col, "bib number") {
            Ok(value) => value,
            Err(reason) => {
                errors.push(RowError { row, reason });
                continue;
            }
        };

        let position = match int_cell(&record, position_col, "position") {
            Ok(Some(position)) => position,
            Ok(None) => row as i32,
            Err(reason) => {
                errors.push(RowError { row, reason });
                continue;
            }
        };

        rows.push(ParsedResultRow {
            participant_name,
            bib_number,
            finish_time: cell(&record, time_col),
            position,
            gender: cell(&record, gender_col).map(|g| g.to_ascii_lowercase()),
            age_category: cell(&record, category_col),
        });
    }

    if !errors.is_empty() {
        return Err(ImportError::Rows(errors));
    }
    if rows.is_empty() {
        return Err(ImportError::Empty);
    }

    Ok(rows)
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.contains(&h.as_str()))
}

/// Trimmed, non-empty cell value. Short records just yield `None`.
fn cell(record: &StringRecord, col: Option<usize>) -> Option<String> {
    col.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn int_cell(record: &StringRecord, col: Option<usize>, what: &str) -> Result<Option<i32>, String> {
    match cell(record, col) {
        None => Ok(None),
        Some(value) => value
            .parse::<i32>()
            .map(Some)
            .map_err(|_| format!("{what} '{value}' is not a number")),
    }
}
