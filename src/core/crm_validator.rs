use crate::domain::model::{CrmData, CrmField, CrmValidation, ReviewStatus};
use serde_json::Value;

/// Minimum number of digits accepted in a contact phone (area code + number).
pub const MIN_PHONE_DIGITS: usize = 10;

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric value of a JSON number or of a string holding a float.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn round10(value: f64) -> f64 {
    (value * 1e10).round() / 1e10
}

/// Priority group a deal belongs to given its monthly recurring revenue.
pub fn expected_priority_group(mrr: f64) -> &'static str {
    if mrr > 700.0 {
        "GRUPO A"
    } else if mrr >= 401.0 {
        "GRUPO B"
    } else if mrr >= 300.0 {
        "GRUPO C"
    } else if mrr >= 100.0 {
        "GRUPO D"
    } else {
        "GRUPO E"
    }
}

enum StudentCount {
    Whole(i64),
    Fractional(f64),
    Invalid,
}

fn read_student_count(value: &Value) -> StudentCount {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => StudentCount::Whole(i),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 => StudentCount::Whole(f as i64),
                Some(f) => StudentCount::Fractional(f),
                None => StudentCount::Invalid,
            },
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(StudentCount::Whole)
            .unwrap_or(StudentCount::Invalid),
        _ => StudentCount::Invalid,
    }
}

pub fn validate_crm(data: &CrmData) -> CrmValidation {
    let mut errors = Vec::new();

    for (field, value) in data.entries() {
        if is_blank(value) {
            errors.push(format!("Required field missing or empty: '{}'.", field.key()));
        }
    }

    if let Some(students) = data.get(CrmField::StudentCount).filter(|v| !is_blank(Some(v))) {
        match read_student_count(students) {
            StudentCount::Whole(n) if n <= 0 => {
                errors.push("'numero_alunos' must be an integer greater than zero.".to_string())
            }
            StudentCount::Whole(_) => {}
            // Truncation first, so 0.5 is reported as not positive
            StudentCount::Fractional(f) if f.trunc() <= 0.0 => {
                errors.push("'numero_alunos' must be an integer greater than zero.".to_string())
            }
            StudentCount::Fractional(_) => {
                errors.push("'numero_alunos' must be a whole number (no decimals).".to_string())
            }
            StudentCount::Invalid => {
                errors.push("'numero_alunos' must be a valid integer.".to_string())
            }
        }
    }

    let mut valid_mrr = None;
    if let Some(mrr) = data.get(CrmField::Mrr).filter(|v| !is_blank(Some(v))) {
        match as_number(mrr) {
            None => errors.push("'mrr' must be a numeric value.".to_string()),
            Some(value) if value <= 0.0 => errors.push("'mrr' must be greater than zero.".to_string()),
            Some(value) => valid_mrr = Some(value),
        }
    }

    if let (Some(mrr), Some(level)) = (
        valid_mrr,
        data.get(CrmField::PriorityLevel).filter(|v| !is_blank(Some(v))),
    ) {
        let group = expected_priority_group(mrr);
        if as_text(level).trim().to_uppercase() != group {
            errors.push(format!(
                "Priority level inconsistent with MRR. Expected: {}.",
                group
            ));
        }
    }

    if let Some(arr) = data.get(CrmField::Arr).filter(|v| !is_blank(Some(v))) {
        match as_number(arr) {
            None => errors.push("'arr' must be a numeric value.".to_string()),
            Some(arr) => {
                if let Some(mrr) = valid_mrr {
                    let expected = round10(mrr * 12.0);
                    if round10(arr) != expected {
                        errors.push(format!(
                            "'arr' must be exactly 12 × mrr (expected: {:.2}, received: {:.2}).",
                            expected, arr
                        ));
                    }
                }
            }
        }
    }

    if let Some(phone) = data.get(CrmField::ContactPhone).filter(|v| !is_blank(Some(v))) {
        let digits = as_text(phone).chars().filter(|c| c.is_ascii_digit()).count();
        if digits < MIN_PHONE_DIGITS {
            errors.push(format!(
                "'contato_telefone' must contain at least {} digits (found: {}).",
                MIN_PHONE_DIGITS, digits
            ));
        }
    }

    if let Some(email) = data.get(CrmField::ContactEmail).filter(|v| !is_blank(Some(v))) {
        if !as_text(email).contains('@') {
            errors.push("'contato_email' must contain '@'.".to_string());
        }
    }

    if let Some(link) = data.get(CrmField::ContractLink).filter(|v| !is_blank(Some(v))) {
        if !as_text(link).trim().to_lowercase().starts_with("http") {
            errors.push("'link_contrato' must start with 'http'.".to_string());
        }
    }

    CrmValidation {
        status: if errors.is_empty() {
            ReviewStatus::Valid
        } else {
            ReviewStatus::Invalid
        },
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_record() -> CrmData {
        serde_json::from_value(json!({
            "nome": "Colégio Modelo - Novo contrato",
            "nome_escola": "Escola Modelo",
            "vendedor": "Maria Costa",
            "perfil_escola": "Privada",
            "numero_alunos": 300,
            "nivel_prioridade": "GRUPO A",
            "mrr": 1500.00,
            "arr": 18000.00,
            "dor_escola": "Gestão financeira deficiente",
            "valor_implantacao": 5000,
            "link_contrato": "https://contratos.empresa.com/joao-silva",
            "forma_implantacao": "Remota",
            "contato_nome": "Ana Lima",
            "contato_telefone": "(31) 99999-8888",
            "contato_email": "ana.lima@escolamodelo.com.br"
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_record() {
        let result = validate_crm(&valid_record());
        assert_eq!(result.status, ReviewStatus::Valid, "errors: {:?}", result.errors);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_priority_groups() {
        assert_eq!(expected_priority_group(1500.0), "GRUPO A");
        assert_eq!(expected_priority_group(700.0), "GRUPO B");
        assert_eq!(expected_priority_group(401.0), "GRUPO B");
        assert_eq!(expected_priority_group(400.5), "GRUPO C");
        assert_eq!(expected_priority_group(300.0), "GRUPO C");
        assert_eq!(expected_priority_group(100.0), "GRUPO D");
        assert_eq!(expected_priority_group(99.99), "GRUPO E");
    }

    #[test]
    fn test_missing_fields_are_reported_by_key() {
        let mut data = valid_record();
        data.salesperson = None;
        data.contact_name = Some(json!("   "));

        let result = validate_crm(&data);
        assert_eq!(result.status, ReviewStatus::Invalid);
        assert!(result
            .errors
            .contains(&"Required field missing or empty: 'vendedor'.".to_string()));
        assert!(result
            .errors
            .contains(&"Required field missing or empty: 'contato_nome'.".to_string()));
    }

    #[test]
    fn test_priority_level_must_match_mrr() {
        let mut data = valid_record();
        data.mrr = Some(json!(650.0));
        data.arr = Some(json!(7800.0));
        data.priority_level = Some(json!(" grupo a "));

        let result = validate_crm(&data);
        assert_eq!(
            result.errors,
            vec!["Priority level inconsistent with MRR. Expected: GRUPO B.".to_string()]
        );

        data.priority_level = Some(json!("grupo b"));
        assert!(validate_crm(&data).errors.is_empty());
    }

    #[test]
    fn test_arr_must_be_twelve_times_mrr() {
        let mut data = valid_record();
        data.arr = Some(json!(15000));

        let result = validate_crm(&data);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("'arr' must be exactly 12 × mrr"));
        assert!(result.errors[0].contains("expected: 18000.00"));

        data.arr = Some(json!("18000.0"));
        assert!(validate_crm(&data).errors.is_empty());
    }

    #[test]
    fn test_arr_is_not_checked_against_invalid_mrr() {
        let mut data = valid_record();
        data.mrr = Some(json!("seiscentos"));
        data.arr = Some(json!(123));

        let result = validate_crm(&data);
        assert_eq!(result.errors, vec!["'mrr' must be a numeric value.".to_string()]);

        data.mrr = Some(json!(-10));
        let result = validate_crm(&data);
        assert_eq!(result.errors, vec!["'mrr' must be greater than zero.".to_string()]);
    }

    #[test]
    fn test_student_count_rules() {
        let mut data = valid_record();

        data.student_count = Some(json!(0));
        assert_eq!(
            validate_crm(&data).errors,
            vec!["'numero_alunos' must be an integer greater than zero.".to_string()]
        );

        data.student_count = Some(json!(2.5));
        assert_eq!(
            validate_crm(&data).errors,
            vec!["'numero_alunos' must be a whole number (no decimals).".to_string()]
        );

        data.student_count = Some(json!("duzentos"));
        assert_eq!(
            validate_crm(&data).errors,
            vec!["'numero_alunos' must be a valid integer.".to_string()]
        );

        data.student_count = Some(json!("450"));
        assert!(validate_crm(&data).errors.is_empty());
    }

    #[test]
    fn test_contact_and_link_formats() {
        let mut data = valid_record();
        data.contact_phone = Some(json!("9999-8888"));
        data.contact_email = Some(json!("ana.lima.escola.com"));
        data.contract_link = Some(json!("contratos.empresa.com/x"));

        let result = validate_crm(&data);
        assert_eq!(
            result.errors,
            vec![
                "'contato_telefone' must contain at least 10 digits (found: 8).".to_string(),
                "'contato_email' must contain '@'.".to_string(),
                "'link_contrato' must start with 'http'.".to_string(),
            ]
        );

        data.contact_phone = Some(json!(31999998888u64));
        data.contact_email = Some(json!("ana@escola.com"));
        data.contract_link = Some(json!("  HTTPS://contratos.empresa.com/x"));
        assert!(validate_crm(&data).errors.is_empty());
    }
}
