use crate::core::json_block::extract_json_object;
use crate::domain::model::{CompletionRequest, ContractField, ContractFields, ContractModel, ParsedContract};
use crate::domain::ports::LlmClient;
use crate::utils::error::{Result, ValidatorError};
use serde_json::{Map, Value};

pub const CONTRACT_MAX_TOKENS: u32 = 2048;

pub const CONTRACT_SYSTEM_PROMPT: &str = r#"Você é um assistente especializado em extração de dados de contratos escolares.

Sua única tarefa é analisar o texto do contrato fornecido e extrair os campos
solicitados, retornando EXCLUSIVAMENTE um objeto JSON válido.

Regras absolutas — sem exceções:
- Retorne apenas o objeto JSON, começando com { e terminando com }.
- Não use markdown, não use blocos de código, não adicione explicações.
- Nunca invente ou estime dados que não estejam literalmente no texto.
- Use null para qualquer campo ausente ou ambíguo.
- Números (implantacao, alunos_totais, alunos_gamificados) devem ser retornados
  como number, não como string. Ex: 1500.00 e não "1500.00".
- Datas, textos e identificadores devem ser retornados como string.
- Em caso de qualquer dúvida sobre um valor, prefira null.

Estrutura exigida:
{
  "dados": {
    "nome_escola": string | null,
    "razao_social": string | null,
    "cnpj": string | null,
    "email_login": string | null,
    "email_financeiro": string | null,
    "whatsapp": string | null,
    "alunos_totais": number | null,
    "alunos_gamificados": number | null,
    "implantacao": number | null,
    "assinatura": string | null,
    "inicio_implantacao": string | null,
    "inicio_cobranca": string | null,
    "cards_enviados": string | null,
    "desconto_primeiro_ano": string | null,
    "saldo_loja": string | null,
    "ia": string | null
  }
}

Não inclua o campo "modelo" — ele é gerenciado exclusivamente pelo backend.
"#;

fn build_user_message(raw_text: &str, model: ContractModel) -> String {
    format!(
        "Modelo de contrato identificado: {}\n\nExtraia os dados do seguinte contrato:\n\n{}",
        model, raw_text
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Checks the shape of the model reply before it is trusted: a `dados`
/// object holding every contract key, numbers where numbers are expected and
/// scalars everywhere else. All type violations are reported together.
pub fn check_structure(reply: &Value) -> Result<&Map<String, Value>> {
    let data = reply
        .get("dados")
        .ok_or_else(|| ValidatorError::ResponseStructureError {
            message: "model response lacks the required 'dados' key".to_string(),
        })?;

    let data = data
        .as_object()
        .ok_or_else(|| ValidatorError::ResponseStructureError {
            message: format!("'dados' must be an object, got {}", type_name(data)),
        })?;

    let missing: Vec<&str> = ContractField::ALL
        .iter()
        .map(|field| field.key())
        .filter(|key| !data.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ValidatorError::ResponseStructureError {
            message: format!("required key(s) missing from 'dados': {:?}", missing),
        });
    }

    let mut type_errors = Vec::new();
    for (key, value) in data {
        if value.is_null() {
            continue;
        }

        let numeric = ContractField::ALL
            .iter()
            .any(|field| field.is_numeric() && field.key() == key.as_str());

        if numeric {
            if !value.is_number() {
                type_errors.push(format!(
                    "'{}' must be numeric or null, got {}: {}",
                    key,
                    type_name(value),
                    value
                ));
            }
        } else if value.is_array() || value.is_object() {
            type_errors.push(format!(
                "'{}' cannot be a {}; only string, number or null are allowed",
                key,
                type_name(value)
            ));
        }
    }

    if !type_errors.is_empty() {
        return Err(ValidatorError::ResponseStructureError {
            message: format!(
                "invalid type(s) in model response:\n{}",
                type_errors
                    .iter()
                    .map(|e| format!("  • {}", e))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        });
    }

    Ok(data)
}

/// Extracts contract fields. The contract model must already be detected;
/// the parser never infers it and ignores any model the LLM might echo.
pub async fn parse_contract<L: LlmClient + ?Sized>(
    llm: &L,
    raw_text: &str,
    model: ContractModel,
) -> Result<ParsedContract> {
    if raw_text.trim().is_empty() {
        return Err(ValidatorError::EmptyText {
            message: "The contract text is empty.".to_string(),
        });
    }

    let request = CompletionRequest {
        system: CONTRACT_SYSTEM_PROMPT.to_string(),
        user: build_user_message(raw_text, model),
        max_tokens: CONTRACT_MAX_TOKENS,
    };

    let reply = llm.complete(&request).await?;
    let value = extract_json_object(&reply)?;
    let data = check_structure(&value)?;

    let data: ContractFields = serde_json::from_value(Value::Object(data.clone())).map_err(|e| {
        ValidatorError::ResponseStructureError {
            message: format!("contract fields could not be read: {}", e),
        }
    })?;

    Ok(ParsedContract { model, data })
}
