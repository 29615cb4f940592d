//! Lightweight workbook inspection for uploaded datasets.
//!
//! Only the parts of an Office Open XML workbook needed for the dataset
//! summary are read: sheet names, the header row of each sheet, the row
//! count, and whether any first-column cell mentions weights. The legacy
//! binary `.xls` format is not parsed; such uploads are stored with
//! metadata carrying an `error` string.

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::types::Timestamp;

/// Zero-based index of the header row within a sheet (the third row).
pub const HEADER_ROW_INDEX: usize = 2;

/// Largest column count a worksheet may address (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

/// Largest row number a worksheet may address.
pub const MAX_ROWS: u32 = 1_048_576;

/// Decompressed size cap for any single workbook part.
pub const MAX_PART_BYTES: u64 = 32 * 1024 * 1024;

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

#[derive(Debug, thiserror::Error)]
pub enum SpreadsheetError {
    #[error("Not a readable workbook archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to read workbook part: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed workbook XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Workbook is missing {0}")]
    MissingPart(String),

    #[error("Workbook part {name} is larger than {limit} bytes")]
    PartTooLarge { name: String, limit: u64 },

    #[error("Cell reference out of range: {0}")]
    CellReference(String),
}

/// Summary stored alongside an uploaded workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookMetadata {
    pub sheet_names: Vec<String>,
    /// Header cells per sheet, blanks removed.
    pub column_info: BTreeMap<String, Vec<Value>>,
    /// Largest row count across all sheets.
    pub row_count: u32,
    pub has_weights: bool,
    pub last_processed: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkbookMetadata {
    /// Metadata for a workbook that could not be read.
    pub fn unreadable(error: impl Into<String>) -> Self {
        Self {
            sheet_names: Vec::new(),
            column_info: BTreeMap::new(),
            row_count: 0,
            has_weights: false,
            last_processed: Utc::now(),
            error: Some(error.into()),
        }
    }
}

/// Inspect an uploaded workbook. Never fails: an unreadable file produces
/// empty metadata with `error` set.
pub fn inspect(bytes: &[u8]) -> WorkbookMetadata {
    match try_inspect(bytes) {
        Ok(metadata) => metadata,
        Err(e) => WorkbookMetadata::unreadable(e.to_string()),
    }
}

/// Inspect a workbook, surfacing the reason it could not be read.
pub fn try_inspect(bytes: &[u8]) -> Result<WorkbookMetadata, SpreadsheetError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let workbook_xml = read_part(&mut archive, "xl/workbook.xml", MAX_PART_BYTES)?
        .ok_or_else(|| SpreadsheetError::MissingPart("xl/workbook.xml".into()))?;
    let rels_xml =
        read_part(&mut archive, "xl/_rels/workbook.xml.rels", MAX_PART_BYTES)?.unwrap_or_default();
    let shared = match read_part(&mut archive, "xl/sharedStrings.xml", MAX_PART_BYTES)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let targets = parse_relationships(&rels_xml)?;
    let sheets = parse_sheet_list(&workbook_xml)?;

    let mut metadata = WorkbookMetadata {
        sheet_names: sheets.iter().map(|(name, _)| name.clone()).collect(),
        column_info: BTreeMap::new(),
        row_count: 0,
        has_weights: false,
        last_processed: Utc::now(),
        error: None,
    };

    for (position, (name, rel_id)) in sheets.iter().enumerate() {
        let path = rel_id
            .as_deref()
            .and_then(|id| targets.get(id))
            .map(|target| resolve_target(target))
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", position + 1));
        let Some(sheet_xml) = read_part(&mut archive, &path, MAX_PART_BYTES)? else {
            continue;
        };

        let cells = parse_sheet_cells(&sheet_xml, &shared)?;
        let span = cells.row_span();
        if span == 0 {
            continue;
        }

        let header_offset = (HEADER_ROW_INDEX as u32).min(span - 1);
        let header: Vec<Value> = cells.row(header_offset).cloned().collect();
        metadata.column_info.insert(name.clone(), header);
        metadata.row_count = metadata.row_count.max(span);

        let first_col = cells.first_column();
        let mentions_weight = cells.rows.values().any(|row| {
            first_col
                .and_then(|col| row.get(&col))
                .is_some_and(|cell| cell_text(cell).to_lowercase().contains("weight"))
        });
        metadata.has_weights |= mentions_weight;
    }

    Ok(metadata)
}

/// Read one part as text, refusing to inflate more than `limit` bytes.
fn read_part<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
    limit: u64,
) -> Result<Option<String>, SpreadsheetError> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::new();
    file.take(limit + 1).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limit {
        return Err(SpreadsheetError::PartTooLarge {
            name: name.to_string(),
            limit,
        });
    }
    let contents = String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(Some(contents))
}

/// `(sheet name, relationship id)` in workbook order.
fn parse_sheet_list(xml: &str) -> Result<Vec<(String, Option<String>)>, SpreadsheetError> {
    let doc = roxmltree::Document::parse(xml)?;
    Ok(doc
        .descendants()
        .filter(|n| n.has_tag_name("sheet"))
        .filter_map(|n| {
            let name = n.attribute("name")?.to_string();
            let rel_id = n.attribute((REL_NS, "id")).map(str::to_string);
            Some((name, rel_id))
        })
        .collect())
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, SpreadsheetError> {
    if xml.is_empty() {
        return Ok(HashMap::new());
    }
    let doc = roxmltree::Document::parse(xml)?;
    Ok(doc
        .descendants()
        .filter(|n| n.has_tag_name("Relationship"))
        .filter_map(|n| Some((n.attribute("Id")?.to_string(), n.attribute("Target")?.to_string())))
        .collect())
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, SpreadsheetError> {
    let doc = roxmltree::Document::parse(xml)?;
    Ok(doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("si"))
        .map(|si| {
            si.descendants()
                .filter(|n| n.has_tag_name("t"))
                .filter(|t| !t.ancestors().any(|a| a.has_tag_name("rPh")))
                .filter_map(|t| t.text())
                .collect::<String>()
        })
        .collect())
}

/// Cells of one sheet keyed by row number, then zero-based column. Only
/// rows that hold a value are stored.
#[derive(Debug, Default)]
struct SheetCells {
    rows: BTreeMap<u32, BTreeMap<u32, Value>>,
}

impl SheetCells {
    /// Rows from the first used row through the last, inclusive.
    fn row_span(&self) -> u32 {
        match (self.rows.keys().next(), self.rows.keys().next_back()) {
            (Some(first), Some(last)) => last - first + 1,
            _ => 0,
        }
    }

    /// Values of the row `offset` rows below the first used row, in
    /// column order. Blank cells are skipped.
    fn row(&self, offset: u32) -> impl Iterator<Item = &Value> {
        self.rows
            .keys()
            .next()
            .and_then(|first| self.rows.get(&(first + offset)))
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    /// Leftmost column holding a value in any row.
    fn first_column(&self) -> Option<u32> {
        self.rows
            .values()
            .filter_map(|row| row.keys().next().copied())
            .min()
    }
}

fn parse_sheet_cells(xml: &str, shared: &[String]) -> Result<SheetCells, SpreadsheetError> {
    let doc = roxmltree::Document::parse(xml)?;

    let mut cells = SheetCells::default();
    let mut next_row = 1u32;
    for row in doc.descendants().filter(|n| n.has_tag_name("row")) {
        let row_number = match row.attribute("r") {
            Some(r) => row_number(r)?,
            None => next_row,
        };
        if row_number > MAX_ROWS {
            return Err(SpreadsheetError::CellReference(format!("row {row_number}")));
        }
        next_row = row_number + 1;

        let mut next_col = 0u32;
        for cell in row.children().filter(|n| n.has_tag_name("c")) {
            let col = match cell.attribute("r") {
                Some(r) => column_index(r)?.unwrap_or(next_col),
                None => next_col,
            };
            if col >= MAX_COLUMNS {
                return Err(SpreadsheetError::CellReference(format!(
                    "column {} in row {row_number}",
                    col + 1
                )));
            }
            next_col = col + 1;
            if let Some(value) = cell_value(cell, shared) {
                cells.rows.entry(row_number).or_default().insert(col, value);
            }
        }
    }
    Ok(cells)
}

/// One-based row number from a `<row r="...">` attribute.
fn row_number(raw: &str) -> Result<u32, SpreadsheetError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if (1..=MAX_ROWS).contains(&n) => Ok(n),
        _ => Err(SpreadsheetError::CellReference(format!("row '{raw}'"))),
    }
}

/// Zero-based column index from an `A1`-style reference. `None` when the
/// reference carries no column letters.
fn column_index(reference: &str) -> Result<Option<u32>, SpreadsheetError> {
    let out_of_range = || SpreadsheetError::CellReference(reference.to_string());

    let mut index = 0u32;
    let mut letters = 0usize;
    for c in reference.chars().take_while(|c| c.is_ascii_alphabetic()) {
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .filter(|i| *i <= MAX_COLUMNS)
            .ok_or_else(out_of_range)?;
        letters += 1;
    }
    if letters == 0 {
        return Ok(None);
    }
    Ok(Some(index - 1))
}

fn cell_value(cell: roxmltree::Node, shared: &[String]) -> Option<Value> {
    let raw = cell
        .children()
        .find(|n| n.has_tag_name("v"))
        .and_then(|v| v.text());

    match cell.attribute("t") {
        Some("s") => {
            let index = raw?.trim().parse::<usize>().ok()?;
            shared.get(index).cloned().map(Value::String)
        }
        Some("inlineStr") => {
            let text: String = cell
                .descendants()
                .filter(|n| n.has_tag_name("t"))
                .filter_map(|t| t.text())
                .collect();
            Some(Value::String(text))
        }
        Some("b") => Some(Value::Bool(raw?.trim() == "1")),
        Some("str") | Some("e") => raw.map(|s| Value::String(s.to_string())),
        _ => {
            let raw = raw?.trim();
            Some(number_value(raw).unwrap_or_else(|| Value::String(raw.to_string())))
        }
    }
}

fn number_value(raw: &str) -> Option<Value> {
    let n: f64 = raw.parse().ok()?;
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(Value::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
