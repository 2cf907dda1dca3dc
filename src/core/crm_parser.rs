use crate::core::json_block::extract_json_object;
use crate::domain::model::{CompletionRequest, CrmData};
use crate::domain::ports::LlmClient;
use crate::utils::error::{Result, ValidatorError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const CRM_MAX_TOKENS: u32 = 1024;

static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

pub const CRM_SYSTEM_PROMPT: &str = r#"Você é um assistente especializado em extração de dados de CRM.

Sua única tarefa é analisar o texto fornecido pelo usuário e extrair as
informações solicitadas, retornando EXCLUSIVAMENTE um objeto JSON válido —
sem explicações, sem markdown, sem texto adicional.

Regras de formato:
- Retorne apenas o objeto JSON, começando com { e terminando com }.
- Números devem ser retornados como number (não string): ex. 1500.00, não "1500.00".
- Exceção: "numero_alunos" pode ser retornado como string se vier como faixa textual
  (ex: "Até 50 alunos", "51–100 alunos", "Mais de 1001 alunos"). Nesse caso, retorne
  a faixa exatamente como está no texto.

Regras de extração — leia com atenção:
- Extraia APENAS o que estiver claramente e literalmente presente no texto.
- Se houver qualquer dúvida sobre um valor, retorne null.
- Se um campo não estiver no texto, retorne null.
- Nunca estime valores.
- Nunca deduza valores implícitos.
- Nunca infira informações a partir de contexto ou conhecimento externo.
- Nunca calcule nada — nenhum campo deve ser resultado de operação matemática.
- Nunca derive "arr" a partir de "mrr" ou qualquer outro campo.
- Em caso de ambiguidade, prefira sempre null a arriscar um valor incorreto.

Mapeamento de seções — CRÍTICO, siga à risca:

O texto do CRM possui duas seções distintas. Você DEVE identificá-las e
extrair cada campo exclusivamente da seção correta.

SEÇÃO "Negociação" (ou equivalente — cabeçalho da oportunidade):
  → "nome"              = nome da negociação/oportunidade (NÃO é o nome de uma pessoa)
  → "nome_escola"       = nome da escola ou instituição
  → "vendedor"          = vendedor responsável pela negociação
  → "perfil_escola"     = perfil ou descrição da escola
  → "numero_alunos"     = número ou faixa de alunos
  → "nivel_prioridade"  = nível de prioridade (ex: "GRUPO A", "GRUPO B")
  → "mrr"               = MRR acordado
  → "arr"               = ARR (nunca derive de mrr)
  → "dor_escola"        = principais dores ou problemas da escola
  → "valor_implantacao" = valor de implantação
  → "link_contrato"     = link do contrato
  → "forma_implantacao" = forma de implantação (ex: "Remota", "Presencial")

SEÇÃO "Contatos" (ou equivalente — lista de contatos da negociação):
  → "contato_nome"      = nome do contato listado nesta seção
  → "contato_telefone"  = telefone do contato listado nesta seção
  → "contato_email"     = e-mail do contato listado nesta seção

Regras específicas para campos de contato:
- "contato_nome" deve vir EXCLUSIVAMENTE da seção "Contatos".
  Nunca use o nome da negociação nem qualquer nome da seção "Negociação".
- Se houver múltiplos contatos, extraia apenas o primeiro.
- Se a seção "Contatos" não existir ou estiver vazia, retorne null para
  contato_nome, contato_telefone e contato_email.

Estrutura esperada:
{
  "nome": string | null,
  "nome_escola": string | null,
  "vendedor": string | null,
  "perfil_escola": string | null,
  "numero_alunos": number | null,
  "nivel_prioridade": string | null,
  "mrr": number | null,
  "arr": number | null,
  "dor_escola": string | null,
  "valor_implantacao": number | null,
  "link_contrato": string | null,
  "forma_implantacao": string | null,
  "contato_nome": string | null,
  "contato_telefone": string | null,
  "contato_email": string | null
}
"#;

fn build_user_message(raw_text: &str) -> String {
    format!("Extraia os dados do seguinte texto de CRM:\n\n{}", raw_text)
}

/// Normalises the student count to an integer.
///
/// CRM screens show either a plain number or a bracket such as
/// "Até 50 alunos", "51–100 alunos" or "Mais de 1001 alunos". Brackets resolve
/// to their upper bound, except open-ended ones which keep their only number.
pub fn normalize_student_count(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let text = s.trim();
            if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                return text.parse().ok();
            }

            let numbers: Vec<i64> = DIGIT_RUN_RE
                .find_iter(text)
                .filter_map(|m| m.as_str().parse().ok())
                .collect();
            let first = *numbers.first()?;

            let lower = text.to_lowercase();
            if lower.starts_with("até") || lower.starts_with("ate") {
                return Some(first);
            }
            if lower.contains("mais de") {
                return Some(first);
            }
            Some(numbers.last().copied().unwrap_or(first))
        }
        _ => None,
    }
}

/// Extracts the CRM deal record from consolidated screenshot text.
pub async fn parse_crm<L: LlmClient + ?Sized>(llm: &L, raw_text: &str) -> Result<CrmData> {
    let request = CompletionRequest {
        system: CRM_SYSTEM_PROMPT.to_string(),
        user: build_user_message(raw_text),
        max_tokens: CRM_MAX_TOKENS,
    };

    let reply = llm.complete(&request).await?;
    let value = extract_json_object(&reply)?;

    if !value.is_object() {
        return Err(ValidatorError::ResponseStructureError {
            message: "CRM extraction must be a JSON object".to_string(),
        });
    }

    // Absent keys deserialize to None
    let mut data: CrmData = serde_json::from_value(value).map_err(|e| ValidatorError::ResponseStructureError {
        message: format!("CRM extraction has an unexpected shape: {}", e),
    })?;

    data.student_count = normalize_student_count(data.student_count.as_ref()).map(Value::from);

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CrmField;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct CannedLlm {
        reply: String,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl CannedLlm {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_student_count_ranges() {
        let cases = [
            (json!("Até 50 alunos"), Some(50)),
            (json!("ate 50 alunos"), Some(50)),
            (json!("51–100 alunos"), Some(100)),
            (json!("101-200 alunos"), Some(200)),
            (json!("501–1000 alunos"), Some(1000)),
            (json!("Mais de 1001 alunos"), Some(1001)),
            (json!("cerca de 300 alunos"), Some(300)),
            (json!("450"), Some(450)),
            (json!(450), Some(450)),
            (json!(450.9), Some(450)),
            (json!("muitos alunos"), None),
            (json!(true), None),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_student_count(Some(&input)), expected, "input: {}", input);
        }
        assert_eq!(normalize_student_count(None), None);
    }

    #[tokio::test]
    async fn test_parse_crm_fills_missing_fields_and_normalizes_students() {
        let llm = CannedLlm::new(
            r#"Claro! {"nome": "Colégio Modelo - Expansão", "nome_escola": "Colégio Modelo",
               "numero_alunos": "301–500 alunos", "mrr": 650.0, "contato_email": null}"#,
        );

        let data = parse_crm(&llm, "Escola: Colégio Modelo").await.unwrap();

        assert_eq!(data.get(CrmField::SchoolName), Some(&json!("Colégio Modelo")));
        assert_eq!(data.get(CrmField::StudentCount), Some(&json!(500)));
        assert_eq!(data.get(CrmField::Arr), None);
        assert_eq!(data.get(CrmField::ContactEmail), None);

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].max_tokens, CRM_MAX_TOKENS);
        assert!(seen[0].user.starts_with("Extraia os dados do seguinte texto de CRM:\n\n"));
        assert!(seen[0].user.ends_with("Escola: Colégio Modelo"));
    }

    #[tokio::test]
    async fn test_parse_crm_rejects_reply_without_json() {
        let llm = CannedLlm::new("Desculpe, não consegui ler o texto.");
        let result = parse_crm(&llm, "texto").await;
        assert!(matches!(result, Err(ValidatorError::LlmResponseError { .. })));
    }
}
