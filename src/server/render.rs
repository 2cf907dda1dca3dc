use crate::core::status_banner;
use crate::domain::model::{ContractField, CrmField, ReviewReport, ReviewStatus};
use crate::utils::error::ValidatorError;
use serde_json::Value;
use std::fmt::Write;

const TEXT_PREVIEW_CHARS: usize = 1200;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #0f0d1a; color: #f0eeff; margin: 0; padding: 2rem; }
main { max-width: 960px; margin: 0 auto; }
h1 span { color: #6339ff; }
.card { background: #1a1730; border-radius: 12px; padding: 1.25rem; margin: 1rem 0; }
.card-title { font-weight: 600; margin-bottom: .75rem; }
.status-banner { border-radius: 12px; padding: 1rem; font-weight: 700; margin: 1rem 0; }
.status-banner.valido { background: #12391f; }
.status-banner.invalido { background: #4a1320; }
.status-banner.revisao_manual { background: #4a3a10; }
.error-item { color: #ff8fa3; }
.warning-item { color: #ffd37a; }
table { border-collapse: collapse; width: 100%; }
td { padding: .25rem .5rem; border-bottom: 1px solid #2a2645; vertical-align: top; }
.file-name { color: #b8b4d8; margin-bottom: .5rem; }
.tag { display: inline-block; background: #2a2645; border-radius: 6px; padding: .1rem .5rem; margin: .1rem; }
pre { white-space: pre-wrap; font-size: .8rem; color: #b8b4d8; }
"#;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Gamefik deal validator</title>\n<style>{}</style>\n</head>\n<body>\n<main>\n\
         <h1>Gamefik <span>deal</span> validator</h1>\n{}\n</main>\n</body>\n</html>\n",
        STYLE, body
    )
}

fn upload_form() -> &'static str {
    r#"<form class="card" action="/validate" method="post" enctype="multipart/form-data">
<div class="card-title">Files</div>
<input type="file" name="files" multiple accept=".pdf,.jpg,.jpeg,.png">
<p>Images (JPG, PNG) go through the CRM check, the PDF through the contract check.<br>
Send at least 1 image and exactly 1 PDF.</p>
<button type="submit">Validate</button>
</form>"#
}

pub fn index_page() -> String {
    page(upload_form())
}

fn value_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "—".to_string(),
        Some(Value::String(s)) => escape_html(s),
        Some(other) => escape_html(&other.to_string()),
    }
}

fn tags(items: &[String]) -> String {
    if items.is_empty() {
        return "—".to_string();
    }
    items
        .iter()
        .map(|item| format!("<span class=\"tag\">{}</span>", escape_html(item)))
        .collect()
}

fn messages(out: &mut String, class: &str, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "<div class=\"{}\">● {}</div>", class, escape_html(item));
    }
}

pub fn result_page(report: &ReviewReport) -> String {
    let mut body = String::new();

    let _ = writeln!(
        body,
        "<div class=\"status-banner {}\">{} {}</div>",
        report.status.as_str(),
        report.status.symbol(),
        escape_html(status_banner(report.status))
    );

    // Files
    let _ = writeln!(body, "<div class=\"card\"><div class=\"card-title\">Processed files</div>");
    for file in &report.crm.succeeded {
        let _ = writeln!(body, "<div>✔ {}</div>", escape_html(file));
    }
    for failure in &report.crm.failed {
        let _ = writeln!(
            body,
            "<div class=\"error-item\">✘ {} → {}</div>",
            escape_html(&failure.path),
            escape_html(&failure.reason)
        );
    }
    let _ = writeln!(body, "</div>");

    let preview: String = report.crm.text.chars().take(TEXT_PREVIEW_CHARS).collect();
    let ellipsis = if report.crm.text.chars().count() > TEXT_PREVIEW_CHARS { "…" } else { "" };
    let _ = writeln!(
        body,
        "<details class=\"card\"><summary>Extracted CRM text</summary><pre>{}{}</pre></details>",
        escape_html(&preview),
        ellipsis
    );

    // CRM
    let crm_status = report.crm.validation.status;
    let _ = writeln!(
        body,
        "<div class=\"card\"><div class=\"card-title\">CRM data {} {}</div><table>",
        crm_status.symbol(),
        crm_status.label()
    );
    for field in CrmField::ALL {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td></tr>",
            field.label(),
            value_cell(report.crm.data.get(field))
        );
    }
    let _ = writeln!(body, "</table>");
    messages(&mut body, "error-item", &report.crm.validation.errors);
    let _ = writeln!(body, "</div>");

    // Contract
    let contract = &report.contract;
    let _ = writeln!(
        body,
        "<div class=\"card\"><div class=\"card-title\">Contract ({}) {} {} · risk {}</div>\n\
         <div class=\"file-name\">📄 {}</div><table>",
        contract.model,
        contract.final_status.symbol(),
        contract.final_status.label(),
        contract.risk_level.label(),
        escape_html(&report.contract_file)
    );
    for field in ContractField::ALL {
        let value = contract
            .data
            .get(field)
            .map(|v| escape_html(&v.to_string()))
            .unwrap_or_else(|| "—".to_string());
        let _ = writeln!(body, "<tr><td>{}</td><td>{}</td></tr>", field.key(), value);
    }
    let _ = writeln!(body, "</table>");
    messages(&mut body, "error-item", &contract.fields_validation.critical_errors);
    messages(&mut body, "warning-item", &contract.fields_validation.warnings);

    let clauses = &contract.clause_validation;
    let _ = writeln!(
        body,
        "<p>Altered clauses: {}<br>Missing clauses: {}<br>Extra clauses: {}</p>",
        tags(&clauses.altered_clauses),
        tags(&clauses.missing_clauses),
        tags(&clauses.extra_clauses)
    );
    let _ = writeln!(body, "</div>");

    body.push_str(upload_form());
    page(&body)
}

pub fn error_page(title: &str, err: &ValidatorError) -> String {
    let message = match err {
        ValidatorError::InputError { message, .. } => message.clone(),
        other => other.user_friendly_message(),
    };
    let body = format!(
        "<div class=\"status-banner {}\">⚠ {}</div>\n<div class=\"card\">\
         <div class=\"error-item\">● {}</div><p>{}</p></div>\n{}",
        ReviewStatus::Invalid.as_str(),
        escape_html(title),
        escape_html(&message),
        escape_html(err.recovery_suggestion()),
        upload_form()
    );
    page(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_index_page_has_upload_form() {
        let html = index_page();
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("accept=\".pdf,.jpg,.jpeg,.png\""));
    }

    fn report(contract_file: &str) -> ReviewReport {
        use crate::domain::model::{
            ClauseValidation, ContractFields, ContractModel, ContractOutcome, CrmData, CrmOutcome, CrmValidation,
            FieldsValidation, RiskLevel,
        };

        ReviewReport {
            status: ReviewStatus::ManualReview,
            summary: status_banner(ReviewStatus::ManualReview).to_string(),
            crm: CrmOutcome {
                succeeded: vec!["deal.png".to_string()],
                failed: Vec::new(),
                text: "Negociação".to_string(),
                data: CrmData::default(),
                validation: CrmValidation {
                    status: ReviewStatus::Valid,
                    errors: Vec::new(),
                },
            },
            contract_file: contract_file.to_string(),
            contract: ContractOutcome {
                model: ContractModel::New,
                data: ContractFields::default(),
                fields_validation: FieldsValidation {
                    valid: true,
                    critical_errors: Vec::new(),
                    warnings: Vec::new(),
                },
                clause_validation: ClauseValidation {
                    valid: true,
                    altered_clauses: vec!["2".to_string()],
                    missing_clauses: Vec::new(),
                    extra_clauses: Vec::new(),
                    risk_level: RiskLevel::High,
                },
                final_status: ReviewStatus::ManualReview,
                risk_level: RiskLevel::High,
            },
            generated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_result_page_names_the_contract() {
        let html = result_page(&report("contrato <final>.pdf"));

        assert!(html.contains("<div class=\"file-name\">📄 contrato &lt;final&gt;.pdf</div>"));
        assert!(html.contains("status-banner revisao_manual"));
        assert!(html.contains("MANUAL REVIEW · risk HIGH"));
        assert!(html.contains("<span class=\"tag\">2</span>"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let err = ValidatorError::input("Missing file", "Send <the> contract");
        let html = error_page("Missing file", &err);
        assert!(html.contains("Send &lt;the&gt; contract"));
        assert!(!html.contains("Send <the> contract"));
    }
}
