use crate::domain::model::{ContractField, ContractModel, FieldValue, FieldsValidation, ParsedContract};
use crate::utils::error::{Result, ValidatorError};

/// Unfilled template markers that must not survive into a signed contract.
pub const PLACEHOLDERS: &[&str] = &["{{", "}}", "____", "xxxxx"];

/// At or below this many students the total is flagged for a second look.
pub const LOW_STUDENT_THRESHOLD: f64 = 5.0;

const REQUIRED_FIELDS: [ContractField; 13] = [
    ContractField::SchoolName,
    ContractField::LegalName,
    ContractField::Cnpj,
    ContractField::LoginEmail,
    ContractField::BillingEmail,
    ContractField::Whatsapp,
    ContractField::TotalStudents,
    ContractField::GamifiedStudents,
    ContractField::SetupFee,
    ContractField::Subscription,
    ContractField::OnboardingStart,
    ContractField::BillingStart,
    ContractField::CardsSent,
];

/// Fields every contract of the given template must fill in.
pub fn required_fields(model: ContractModel) -> Option<&'static [ContractField]> {
    match model {
        // Both templates share the same commercial summary
        ContractModel::New | ContractModel::LegacyV13 => Some(&REQUIRED_FIELDS),
        ContractModel::Unknown => None,
    }
}

fn is_blank(value: &Option<FieldValue>) -> bool {
    match value {
        None => true,
        Some(FieldValue::Text(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

fn contains_placeholder(value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(text) => {
            let lower = text.to_lowercase();
            PLACEHOLDERS.iter().any(|ph| lower.contains(&ph.to_lowercase()))
        }
        _ => false,
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn check_presence(contract: &ParsedContract, required: &[ContractField], errors: &mut Vec<String>) {
    for field in required {
        let value = contract.data.get(*field);

        if is_blank(&value) {
            errors.push(format!("Required field missing or empty: '{}'.", field.key()));
            continue;
        }

        if let Some(value) = value.filter(contains_placeholder) {
            errors.push(format!(
                "Field '{}' contains an invalid placeholder: {:?}.",
                field.key(),
                value.to_string()
            ));
        }
    }
}

fn check_numbers(contract: &ParsedContract, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let mut usable = |field: ContractField| -> Option<f64> {
        let value = contract.data.number(field)?;
        if value < 0.0 {
            errors.push(format!(
                "Field '{}' cannot be negative (received: {}).",
                field.key(),
                format_number(value)
            ));
            return None;
        }
        Some(value)
    };

    let total = usable(ContractField::TotalStudents);
    let gamified = usable(ContractField::GamifiedStudents);
    let setup_fee = usable(ContractField::SetupFee);

    if let (Some(gamified), Some(total)) = (gamified, total) {
        if gamified > total {
            errors.push(format!(
                "'alunos_gamificados' ({}) cannot be greater than 'alunos_totais' ({}).",
                format_number(gamified),
                format_number(total)
            ));
        }
    }

    if let Some(total) = total.filter(|t| *t <= LOW_STUDENT_THRESHOLD) {
        warnings.push(format!(
            "'alunos_totais' is very low ({}). Check that the value is correct.",
            total.trunc() as i64
        ));
    }

    if setup_fee == Some(0.0) {
        warnings.push("'implantacao' is zero. Check that onboarding is really free of charge.".to_string());
    }
}

/// Deterministic checks on the extracted contract fields. Critical errors
/// invalidate the contract; warnings only ask for attention.
pub fn validate_contract_fields(contract: &ParsedContract) -> Result<FieldsValidation> {
    let required = required_fields(contract.model).ok_or_else(|| ValidatorError::UnknownContractModel {
        markers: Vec::new(),
    })?;

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_presence(contract, required, &mut errors);
    check_numbers(contract, &mut errors, &mut warnings);

    Ok(FieldsValidation {
        valid: errors.is_empty(),
        critical_errors: errors,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ContractFields;
    use serde_json::json;

    fn contract(model: ContractModel, data: serde_json::Value) -> ParsedContract {
        ParsedContract {
            model,
            data: serde_json::from_value::<ContractFields>(data).unwrap(),
        }
    }

    fn complete_data() -> serde_json::Value {
        json!({
            "nome_escola": "Colégio Inovação",
            "razao_social": "Instituto Educacional Ltda.",
            "cnpj": "12.345.678/0001-90",
            "email_login": "admin@colegio.com.br",
            "email_financeiro": "fin@colegio.com.br",
            "whatsapp": "(31) 99999-8888",
            "alunos_totais": 420,
            "alunos_gamificados": 210,
            "implantacao": 3500.0,
            "assinatura": "R$ 890,00/mês",
            "inicio_implantacao": "01/03/2025",
            "inicio_cobranca": "01/04/2025",
            "cards_enviados": "Sim",
            "desconto_primeiro_ano": "10%",
            "saldo_loja": null,
            "ia": "Sim"
        })
    }

    #[test]
    fn test_complete_contract_is_valid() {
        let result = validate_contract_fields(&contract(ContractModel::New, complete_data())).unwrap();
        assert!(result.valid);
        assert!(result.critical_errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_blank_and_placeholder_fields() {
        let mut data = complete_data();
        data["nome_escola"] = json!("");
        data["razao_social"] = json!("   ");
        data["cnpj"] = json!("{{cnpj}}");
        data["email_login"] = json!(null);
        data["cards_enviados"] = json!("____");
        data["whatsapp"] = json!("(31) XXXXX-0000");

        let result = validate_contract_fields(&contract(ContractModel::New, data)).unwrap();
        assert!(!result.valid);
        assert_eq!(
            result.critical_errors,
            vec![
                "Required field missing or empty: 'nome_escola'.".to_string(),
                "Required field missing or empty: 'razao_social'.".to_string(),
                "Field 'cnpj' contains an invalid placeholder: \"{{cnpj}}\".".to_string(),
                "Required field missing or empty: 'email_login'.".to_string(),
                "Field 'whatsapp' contains an invalid placeholder: \"(31) XXXXX-0000\".".to_string(),
                "Field 'cards_enviados' contains an invalid placeholder: \"____\".".to_string(),
            ]
        );
    }

    #[test]
    fn test_optional_fields_are_not_required() {
        let mut data = complete_data();
        data["desconto_primeiro_ano"] = json!(null);
        data["ia"] = json!("{{ia}}");

        let result = validate_contract_fields(&contract(ContractModel::LegacyV13, data)).unwrap();
        assert!(result.valid, "errors: {:?}", result.critical_errors);
    }

    #[test]
    fn test_negative_and_inconsistent_numbers() {
        let mut data = complete_data();
        data["alunos_totais"] = json!(100);
        data["alunos_gamificados"] = json!(150);
        data["implantacao"] = json!(-500.0);

        let result = validate_contract_fields(&contract(ContractModel::New, data)).unwrap();
        assert_eq!(
            result.critical_errors,
            vec![
                "Field 'implantacao' cannot be negative (received: -500.0).".to_string(),
                "'alunos_gamificados' (150.0) cannot be greater than 'alunos_totais' (100.0).".to_string(),
            ]
        );
    }

    #[test]
    fn test_negative_total_skips_comparison() {
        let mut data = complete_data();
        data["alunos_totais"] = json!(-1);
        data["alunos_gamificados"] = json!(10);

        let result = validate_contract_fields(&contract(ContractModel::New, data)).unwrap();
        assert_eq!(
            result.critical_errors,
            vec!["Field 'alunos_totais' cannot be negative (received: -1.0).".to_string()]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut data = complete_data();
        data["alunos_totais"] = json!(3);
        data["alunos_gamificados"] = json!(2);
        data["implantacao"] = json!(0);

        let result = validate_contract_fields(&contract(ContractModel::LegacyV13, data)).unwrap();
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![
                "'alunos_totais' is very low (3). Check that the value is correct.".to_string(),
                "'implantacao' is zero. Check that onboarding is really free of charge.".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let result = validate_contract_fields(&contract(ContractModel::Unknown, complete_data()));
        assert!(result.is_err());
    }
}
