use crate::domain::model::{
    ClauseValidation, ContractField, ContractOutcome, CrmField, CrmOutcome, ModelDetection, ReviewStatus,
};
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

const BOX_WIDTH: usize = 43;
const TEXT_PREVIEW_CHARS: usize = 400;
pub const EXTRACT_PREVIEW_CHARS: usize = 500;

fn header(out: &mut String, title: &str) {
    let line = "─".repeat(BOX_WIDTH);
    let _ = writeln!(out, "\n┌{}┐", line);
    let _ = writeln!(out, "│{:^width$}│", title, width = BOX_WIDTH);
    let _ = writeln!(out, "└{}┘", line);
}

fn preview(text: &str, limit: usize) -> String {
    let mut head: String = text.chars().take(limit).collect();
    if text.chars().count() > limit {
        head.push_str("...");
    }
    head
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "—".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "—".to_string()
    } else {
        items.join(", ")
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_extract(text: &str) -> String {
    format!(
        "Extracted {} characters\n\n{}\n",
        text.chars().count(),
        preview(text, EXTRACT_PREVIEW_CHARS)
    )
}

pub fn render_crm_text(outcome: &CrmOutcome) -> String {
    let mut out = String::new();

    header(&mut out, "PROCESSED FILES");
    for path in &outcome.succeeded {
        let _ = writeln!(out, "  ✔  {}", path);
    }
    for failure in &outcome.failed {
        let _ = writeln!(out, "  ✘  {}  →  {}", failure.path, failure.reason);
    }

    header(&mut out, "CONSOLIDATED TEXT (preview)");
    let _ = writeln!(out, "  Total characters: {}\n", outcome.text.chars().count());
    let _ = writeln!(out, "  {}", preview(&outcome.text, TEXT_PREVIEW_CHARS).replace('\n', " "));

    header(&mut out, "EXTRACTED DATA");
    for field in CrmField::ALL {
        let _ = writeln!(out, "  {:<22} : {}", field.key(), value_text(outcome.data.get(field)));
    }

    header(&mut out, "VALIDATION RESULT");
    let status = outcome.validation.status;
    let _ = writeln!(out, "  Status : {}  {}", status.symbol(), status.label());
    if outcome.validation.errors.is_empty() {
        let _ = writeln!(out, "\n  No errors found. Data ready to use.");
    } else {
        let _ = writeln!(out, "\n  Errors found ({}):", outcome.validation.errors.len());
        for error in &outcome.validation.errors {
            let _ = writeln!(out, "    • {}", error);
        }
    }

    out
}

/// One header row with the CRM keys plus status and errors, one data row.
pub fn render_crm_csv(outcome: &CrmOutcome) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut headers: Vec<&str> = CrmField::ALL.iter().map(|field| field.key()).collect();
    headers.extend(["status", "erros"]);
    writer.write_record(&headers)?;

    let mut row: Vec<String> = CrmField::ALL
        .iter()
        .map(|field| match outcome.data.get(*field) {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        })
        .collect();
    row.push(outcome.validation.status.as_str().to_string());
    row.push(outcome.validation.errors.join("; "));
    writer.write_record(&row)?;

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn render_clause_lines(out: &mut String, clauses: &ClauseValidation) {
    let symbol = if clauses.valid { "✔" } else { "✘" };
    let _ = writeln!(out, "\n  ── Clause validation {}", symbol);
    if !clauses.missing_clauses.is_empty() {
        let _ = writeln!(out, "       Missing : {}", clauses.missing_clauses.join(", "));
    }
    if !clauses.extra_clauses.is_empty() {
        let _ = writeln!(out, "       Extra   : {}", clauses.extra_clauses.join(", "));
    }
    if !clauses.altered_clauses.is_empty() {
        let _ = writeln!(out, "       Altered : {}", clauses.altered_clauses.join(", "));
    }
    if clauses.missing_clauses.is_empty() && clauses.extra_clauses.is_empty() && clauses.altered_clauses.is_empty() {
        let _ = writeln!(out, "       No problems found.");
    }
}

pub fn render_contract_text(outcome: &ContractOutcome) -> String {
    let mut out = String::new();
    let rule = "═".repeat(50);

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "  CONTRACT VALIDATION RESULT");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "  Detected model : {}", outcome.model);
    let _ = writeln!(
        out,
        "  Final status   : {}  {}",
        outcome.final_status.symbol(),
        outcome.final_status.label()
    );
    let _ = writeln!(out, "  Risk level     : {}", outcome.risk_level.label());

    let _ = writeln!(out, "\n  ── Extracted data");
    for field in ContractField::ALL {
        let value = outcome
            .data
            .get(field)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "—".to_string());
        let _ = writeln!(out, "       {:<22} : {}", field.key(), value);
    }

    let fields = &outcome.fields_validation;
    let _ = writeln!(out, "\n  ── Field validation {}", if fields.valid { "✔" } else { "✘" });
    for error in &fields.critical_errors {
        let _ = writeln!(out, "       • {}", error);
    }
    for warning in &fields.warnings {
        let _ = writeln!(out, "       ⚠ {}", warning);
    }
    if fields.critical_errors.is_empty() && fields.warnings.is_empty() {
        let _ = writeln!(out, "       No problems found.");
    }

    render_clause_lines(&mut out, &outcome.clause_validation);
    let _ = writeln!(out, "{}", rule);

    out
}

pub fn render_detection(detection: &ModelDetection) -> String {
    format!(
        "Model      : {}\nConfidence : {:.2}\nMarkers    : {}\n",
        detection.model,
        detection.confidence,
        list_or_dash(&detection.markers_found)
    )
}

pub fn render_clauses(clauses: &ClauseValidation) -> String {
    let symbol = if clauses.valid {
        ReviewStatus::Valid.symbol()
    } else {
        ReviewStatus::Invalid.symbol()
    };
    format!(
        "Valid           : {} {}\nRisk level      : {}\nAltered clauses : {}\nMissing clauses : {}\nExtra clauses   : {}\n",
        symbol,
        clauses.valid,
        clauses.risk_level.label(),
        list_or_dash(&clauses.altered_clauses),
        list_or_dash(&clauses.missing_clauses),
        list_or_dash(&clauses.extra_clauses)
    )
}
