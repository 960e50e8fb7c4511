//! Output formatting for search results.
//!
//! Supports a human-readable table for the terminal and JSON for scripting.

use console::{pad_str, style, Alignment};
use serde::Serialize;

use roster_lookup::core::roster::{SearchOutcome, StudentRecord};

const ID_WIDTH: usize = 14;
const NAME_WIDTH: usize = 10;
const CLASS_WIDTH: usize = 24;

#[derive(Serialize)]
struct JsonOutput<'a> {
    query: &'a str,
    grade: &'a str,
    strategy: Option<String>,
    total: usize,
    results: Vec<JsonStudent<'a>>,
}

#[derive(Serialize)]
struct JsonStudent<'a> {
    student_id: &'a str,
    name: &'a str,
    class_code: &'a str,
    class_name: &'a str,
    sex: &'static str,
}

impl<'a> From<&'a StudentRecord> for JsonStudent<'a> {
    fn from(record: &'a StudentRecord) -> Self {
        Self {
            student_id: &record.student_id,
            name: &record.name,
            class_code: &record.class_code,
            class_name: &record.class_name,
            sex: record.sex_label(),
        }
    }
}

/// Formats an outcome as pretty JSON.
pub fn format_json(outcome: &SearchOutcome) -> String {
    let output = JsonOutput {
        query: &outcome.query,
        grade: &outcome.restriction,
        strategy: outcome.strategy.map(|s| s.to_string()),
        total: outcome.len(),
        results: outcome.results.iter().map(JsonStudent::from).collect(),
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats an outcome as a terminal table.
pub fn format_human(outcome: &SearchOutcome) -> String {
    if outcome.query.is_empty() {
        return String::new();
    }
    if outcome.is_empty() {
        return format!("{}", style("未找到相关记录").dim());
    }

    let mut out = String::new();
    let strategy = outcome
        .strategy
        .map(|s| s.to_string())
        .unwrap_or_default();
    out.push_str(&format!(
        "找到 {} 条记录 {}\n\n",
        style(outcome.len()).bold(),
        style(format!("({strategy})")).dim()
    ));
    out.push_str(&format!(
        "{} {} {} {}\n",
        style(cell("学号", ID_WIDTH)).bold(),
        style(cell("姓名", NAME_WIDTH)).bold(),
        style(cell("班级", CLASS_WIDTH)).bold(),
        style("性别").bold()
    ));

    for record in outcome.results.iter() {
        let sex = if record.is_male() {
            style(record.sex_label()).blue()
        } else {
            style(record.sex_label()).magenta()
        };
        out.push_str(&format!(
            "{} {} {} {}\n",
            style(cell(&record.student_id, ID_WIDTH)).cyan(),
            cell(&record.name, NAME_WIDTH),
            style(cell(&record.class_name, CLASS_WIDTH)).dim(),
            sex
        ));
    }
    out
}

/// Pad or truncate to a display width (CJK chars count double).
fn cell(text: &str, width: usize) -> String {
    pad_str(text, width, Alignment::Left, Some("…")).into_owned()
}
