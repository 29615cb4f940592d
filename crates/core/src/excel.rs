//! Excel dataset categories and filename-based scenario classification.
//!
//! Dataset files follow a loose naming convention such as
//! `Scenario2_Regional_results.xlsx` or `BAU-national.xlsx`. The scenario
//! and geographic scope are read from the file name so the front end can
//! pick the right dataset for a chart.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::choice::define_choice_enum;

define_choice_enum! {
    /// Dataset category shown in the admin UI.
    ExcelCategory ("category") {
        Comparison => "comparison",
        Analysis => "analysis",
        Visualization => "visualization",
        Other => "other",
    }
}

impl Default for ExcelCategory {
    fn default() -> Self {
        Self::Analysis
    }
}

/// MIME types accepted for dataset uploads.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/vnd.ms-excel.sheet.macroEnabled.12",
];

/// File extensions accepted for dataset uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm"];

/// Remote storage folder for dataset files.
pub const STORAGE_FOLDER: &str = "entyre/excel-files";

static SCENARIO_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:scenario|scen|s)[\s_-]*(\d{1,3})(?:[^0-9]|$)")
        .expect("valid regex")
});

static BASELINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[^a-z])(?:baseline|bau)(?:[^a-z]|$)").expect("valid regex"));

static SCOPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(national|regional|local)(?:[^a-z]|$)").expect("valid regex")
});

/// Scenario and scope derived from a dataset file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInfo {
    /// `baseline` or `scenario-N`.
    pub scenario_type: Option<String>,
    /// `national`, `regional`, or `local`.
    pub scope_type: Option<String>,
}

impl ScenarioInfo {
    /// Combined identifier: `{scenario}_{scope}`, or the scenario alone.
    pub fn scenario_id(&self) -> Option<String> {
        match (&self.scenario_type, &self.scope_type) {
            (Some(scenario), Some(scope)) => Some(format!("{scenario}_{scope}")),
            (Some(scenario), None) => Some(scenario.clone()),
            _ => None,
        }
    }
}

/// Classify a dataset by its original file name.
pub fn classify_filename(file_name: &str) -> ScenarioInfo {
    let stem = file_stem(file_name);

    let scenario_type = if BASELINE.is_match(stem) {
        Some("baseline".to_string())
    } else {
        SCENARIO_NUMBER
            .captures(stem)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map(|n| format!("scenario-{n}"))
    };

    let scope_type = SCOPE
        .captures(stem)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase());

    ScenarioInfo {
        scenario_type,
        scope_type,
    }
}

/// File name without its directory or final extension.
pub fn file_stem(file_name: &str) -> &str {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    }
}

/// Lower-cased extension of a file name, if any.
pub fn file_extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < base.len() => Some(base[dot + 1..].to_lowercase()),
        _ => None,
    }
}

/// Whether an upload looks like a workbook, by MIME type or extension.
pub fn is_allowed_upload(file_name: &str, content_type: Option<&str>) -> bool {
    let by_mime = content_type.is_some_and(|ct| ALLOWED_MIME_TYPES.contains(&ct));
    let by_ext = file_extension(file_name)
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
    by_mime || by_ext
}
