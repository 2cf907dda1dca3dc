#![allow(dead_code)]

use async_trait::async_trait;
use gamefik_validator::adapters::{AnthropicClient, LocalStorage};
use gamefik_validator::domain::ports::TextExtractor;
use gamefik_validator::{ClauseValidator, ReviewEngine, Result, ValidatorError};
use serde_json::{json, Value};
use std::path::Path;

pub const TEMPLATE_NOVO: &str = "\
1. OBJETO DO CONTRATO
O presente contrato tem por objeto a prestação de serviços de software educacional.

1.1 O serviço será prestado de forma contínua durante o prazo de vigência.

2. PRAZO DE VIGÊNCIA
O contrato terá duração de 12 meses, renovável automaticamente.

3. VALOR E REAJUSTE
O valor mensal é fixo, sujeito a reajuste anual pelo IPCA.

4. RESCISÃO
A rescisão antecipada implica multa de 30% sobre o valor restante.
";

pub const CONTRACT_HEADER: &str = "\
CONTRATO DE ASSINATURA DE SOFTWARE (SaaS)
ANEXO 1 - TABELA RESUMO COMERCIAL

Nome da Escola: Colégio Inovação
CNPJ: 12.345.678/0001-90
Total de Alunos: 420
Alunos Gamificados: 210
";

pub const CRM_DEAL_TEXT: &str = "Negociação\nColégio Modelo - Expansão\nMRR: R$ 1.500,00";
pub const CRM_CONTACTS_TEXT: &str = "Contatos\nAna Lima (31) 99999-8888";

/// Contract built from the official template, with an optional clause edit.
pub fn contract_text(replace: Option<(&str, &str)>) -> String {
    let body = match replace {
        Some((from, to)) => TEMPLATE_NOVO.replace(from, to),
        None => TEMPLATE_NOVO.to_string(),
    };
    format!("{}\n{}", CONTRACT_HEADER, body)
}

pub fn crm_reply() -> Value {
    json!({
        "nome": "Colégio Modelo - Expansão",
        "nome_escola": "Colégio Modelo",
        "vendedor": "Maria Costa",
        "perfil_escola": "Privada",
        "numero_alunos": "301–500 alunos",
        "nivel_prioridade": "GRUPO A",
        "mrr": 1500.0,
        "arr": 18000.0,
        "dor_escola": "Engajamento dos alunos",
        "valor_implantacao": 5000,
        "link_contrato": "https://contratos.example.com/colegio-modelo",
        "forma_implantacao": "Remota",
        "contato_nome": "Ana Lima",
        "contato_telefone": "(31) 99999-8888",
        "contato_email": "ana.lima@colegiomodelo.com.br"
    })
}

pub fn contract_reply() -> Value {
    json!({
        "modelo": "novo",
        "dados": {
            "nome_escola": "Colégio Inovação",
            "razao_social": "Instituto Educacional Inovação Ltda.",
            "cnpj": "12.345.678/0001-90",
            "email_login": "admin@colegioinovacao.com.br",
            "email_financeiro": "financeiro@colegioinovacao.com.br",
            "whatsapp": "(31) 98888-7777",
            "alunos_totais": 420,
            "alunos_gamificados": 210,
            "implantacao": 3500.0,
            "assinatura": "R$ 890,00",
            "inicio_implantacao": "01/03/2025",
            "inicio_cobranca": "01/04/2025",
            "cards_enviados": "Sim",
            "desconto_primeiro_ano": null,
            "saldo_loja": null,
            "ia": "Não"
        }
    })
}

/// Messages API response wrapping `text` in a single text block.
pub fn anthropic_message(text: &str) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "model": "claude-test",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    })
}

/// Treats every file as UTF-8 text, standing in for PDF parsing and OCR.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(ValidatorError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let text = tokio::fs::read_to_string(path).await?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ValidatorError::EmptyDocument {
                path: path.display().to_string(),
            });
        }
        Ok(text)
    }
}

pub type TestEngine = ReviewEngine<PlainTextExtractor, AnthropicClient, LocalStorage>;

pub fn engine(api_base_url: &str, templates_dir: &Path) -> TestEngine {
    let llm = AnthropicClient::new(api_base_url, Some("test-key".to_string()), "claude-test");
    let clauses = ClauseValidator::new(LocalStorage::new(templates_dir), 0.97);
    ReviewEngine::new(PlainTextExtractor, llm, clauses)
}

pub fn write_template(dir: &Path) {
    std::fs::write(dir.join("modelo_novo_base.txt"), TEMPLATE_NOVO).unwrap();
}
