use crate::core::similarity::{normalize_text, similarity};
use crate::domain::model::{ClauseValidation, ContractModel, RiskLevel};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ValidatorError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::ErrorKind;

/// Words that make any change to a clause a high-risk change.
pub const CRITICAL_WORDS: &[&str] = &["multa", "prazo", "rescisão", "rescisao", "reajuste"];

// Roman numerals (III.), single capital letters (A.) or numbers (1. / 1.1 / 1.1.2)
// at the start of a line, followed by whitespace.
static CLAUSE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^|\n)((?:[IVXLCDM]+\.)|(?:[A-Z]\.)|(?:\d+(?:\.\d+)*\.?))\s").unwrap()
});

/// Clauses in document order, keyed by marker without trailing dots.
pub type Clauses = Vec<(String, String)>;

fn lookup<'a>(clauses: &'a Clauses, marker: &str) -> Option<&'a str> {
    clauses
        .iter()
        .find(|(key, _)| key == marker)
        .map(|(_, content)| content.as_str())
}

/// Splits a contract into numbered clauses with normalised content.
///
/// A clause runs from its marker to the next one. When a marker repeats,
/// it keeps its first position and takes the last content seen.
pub fn split_clauses(text: &str) -> Clauses {
    let markers: Vec<_> = CLAUSE_MARKER_RE.captures_iter(text).collect();
    let mut clauses: Clauses = Vec::new();

    for (idx, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(marker)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let key = marker.as_str().trim_end_matches('.').to_string();
        let end = markers
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |next| next.start());
        let content = normalize_text(&text[whole.end()..end]);

        match clauses.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = content,
            None => clauses.push((key, content)),
        }
    }

    clauses
}

fn mentions_critical_word(text: &str) -> bool {
    let lower = text.to_lowercase();
    CRITICAL_WORDS.iter().any(|word| lower.contains(word))
}

fn risk_level(
    altered: &[String],
    missing: &[String],
    extra: &[String],
    template: &Clauses,
    contract: &Clauses,
) -> RiskLevel {
    if !missing.is_empty() || !extra.is_empty() {
        return RiskLevel::High;
    }

    let critical_change = altered.iter().any(|marker| {
        let base = lookup(template, marker).unwrap_or_default();
        let received = lookup(contract, marker).unwrap_or_default();
        mentions_critical_word(&format!("{} {}", base, received))
    });

    if critical_change {
        RiskLevel::High
    } else if !altered.is_empty() {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Compares the clauses of a received contract with those of its template.
///
/// Missing and extra clauses invalidate the contract. Altered clauses only
/// raise the risk level.
pub fn compare_clauses(template_text: &str, contract_text: &str, threshold: f64) -> ClauseValidation {
    let template = split_clauses(template_text);
    let contract = split_clauses(contract_text);

    let mut altered = Vec::new();
    let mut missing = Vec::new();

    for (marker, base) in &template {
        match lookup(&contract, marker) {
            None => missing.push(marker.clone()),
            Some(received) => {
                let score = similarity(base, received);
                if score < threshold {
                    tracing::debug!("Clause {} altered (similarity {:.3})", marker, score);
                    altered.push(marker.clone());
                }
            }
        }
    }

    let extra: Vec<String> = contract
        .iter()
        .filter(|(marker, _)| lookup(&template, marker).is_none())
        .map(|(marker, _)| marker.clone())
        .collect();

    let risk = risk_level(&altered, &missing, &extra, &template, &contract);

    ClauseValidation {
        valid: missing.is_empty() && extra.is_empty(),
        altered_clauses: altered,
        missing_clauses: missing,
        extra_clauses: extra,
        risk_level: risk,
    }
}

/// Loads official templates from storage and checks contracts against them.
pub struct ClauseValidator<S: Storage> {
    templates: S,
    threshold: f64,
}

impl<S: Storage> ClauseValidator<S> {
    pub fn new(templates: S, threshold: f64) -> Self {
        Self {
            templates,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub async fn load_template(&self, model: ContractModel) -> Result<String> {
        let file = model
            .template_file()
            .ok_or_else(|| ValidatorError::UnknownContractModel { markers: Vec::new() })?;

        let bytes = match self.templates.read_file(file).await {
            Ok(bytes) => bytes,
            Err(ValidatorError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(ValidatorError::TemplateNotFound {
                    path: file.to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn validate(&self, model: ContractModel, contract_text: &str) -> Result<ClauseValidation> {
        let template = self.load_template(model).await?;
        let result = compare_clauses(&template, contract_text, self.threshold);

        tracing::info!(
            "Clause check against {}: {} altered, {} missing, {} extra, risk {}",
            model,
            result.altered_clauses.len(),
            result.missing_clauses.len(),
            result.extra_clauses.len(),
            result.risk_level
        );

        Ok(result)
    }
}
