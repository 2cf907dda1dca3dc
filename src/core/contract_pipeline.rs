use crate::core::clause_validator::ClauseValidator;
use crate::core::contract_parser::parse_contract;
use crate::core::fields_validator::validate_contract_fields;
use crate::core::model_detector::detect_model;
use crate::domain::model::{ClauseValidation, ContractOutcome, FieldsValidation, ReviewStatus, RiskLevel};
use crate::domain::ports::{LlmClient, Storage};
use crate::utils::error::{Result, ValidatorError};

/// Consolidated contract status. Field errors and missing or extra clauses
/// reject the contract; altered clauses send it to manual review.
pub fn final_status(fields: &FieldsValidation, clauses: &ClauseValidation) -> ReviewStatus {
    if !fields.valid {
        return ReviewStatus::Invalid;
    }
    if !clauses.missing_clauses.is_empty() || !clauses.extra_clauses.is_empty() {
        return ReviewStatus::Invalid;
    }
    match clauses.risk_level {
        RiskLevel::High | RiskLevel::Medium => ReviewStatus::ManualReview,
        RiskLevel::Low => ReviewStatus::Valid,
    }
}

/// Contract flow: detect the template, extract the fields, validate them and
/// compare every clause with the official template.
pub async fn run_contract<L, S>(llm: &L, clauses: &ClauseValidator<S>, contract_text: &str) -> Result<ContractOutcome>
where
    L: LlmClient + ?Sized,
    S: Storage,
{
    if contract_text.trim().is_empty() {
        return Err(ValidatorError::EmptyText {
            message: "The contract text is empty.".to_string(),
        });
    }

    tracing::info!("[1/4] Detecting contract model");
    let detection = detect_model(contract_text);
    if !detection.model.is_known() {
        return Err(ValidatorError::UnknownContractModel {
            markers: detection.markers_found,
        });
    }
    let model = detection.model;

    tracing::info!("[2/4] Extracting contract fields ({})", model);
    let parsed = parse_contract(llm, contract_text, model).await?;

    tracing::info!("[3/4] Validating contract fields");
    let fields_validation = validate_contract_fields(&parsed)?;

    tracing::info!("[4/4] Comparing clauses with the {} template", model);
    let clause_validation = clauses.validate(model, contract_text).await?;

    let status = final_status(&fields_validation, &clause_validation);
    let risk_level = clause_validation.risk_level;
    tracing::info!("Contract validation finished: {} (risk {})", status, risk_level);

    Ok(ContractOutcome {
        model,
        data: parsed.data,
        fields_validation,
        clause_validation,
        final_status: status,
        risk_level,
    })
}
