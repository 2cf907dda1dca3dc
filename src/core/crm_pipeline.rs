use crate::core::crm_parser::parse_crm;
use crate::core::crm_validator::validate_crm;
use crate::domain::model::{CrmOutcome, FileFailure};
use crate::domain::ports::{LlmClient, TextExtractor};
use crate::utils::error::{Result, ValidatorError};
use std::path::{Path, PathBuf};

/// Text gathered from a batch of CRM files.
#[derive(Debug, Default)]
pub struct ExtractedBatch {
    pub text: String,
    pub succeeded: Vec<String>,
    pub failed: Vec<FileFailure>,
}

/// Extracts every file on its own; one unreadable screenshot does not stop
/// the others.
pub async fn extract_batch<E: TextExtractor + ?Sized>(extractor: &E, paths: &[PathBuf]) -> ExtractedBatch {
    let mut parts = Vec::new();
    let mut batch = ExtractedBatch::default();

    for path in paths {
        let file = path.display().to_string();
        match extractor.extract_text(path).await {
            Ok(text) => {
                tracing::info!("Extracted {} ({} chars)", file, text.chars().count());
                parts.push(text);
                batch.succeeded.push(file);
            }
            Err(e) => {
                let reason = match e {
                    ValidatorError::FileNotFound { .. } => "file not found".to_string(),
                    other => other.to_string(),
                };
                tracing::warn!("Skipped {}: {}", file, reason);
                batch.failed.push(FileFailure { path: file, reason });
            }
        }
    }

    batch.text = parts.join("\n\n");
    batch
}

/// CRM flow: extract each screenshot, consolidate the text, have the model
/// read the deal record and validate it.
pub async fn run_crm<E, L>(extractor: &E, llm: &L, paths: &[impl AsRef<Path>]) -> Result<CrmOutcome>
where
    E: TextExtractor + ?Sized,
    L: LlmClient + ?Sized,
{
    let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();

    tracing::info!("[1/3] Extracting text from {} file(s)", paths.len());
    let batch = extract_batch(extractor, &paths).await;

    if batch.succeeded.is_empty() {
        return Err(ValidatorError::NoUsableFiles);
    }
    if batch.text.trim().is_empty() {
        return Err(ValidatorError::EmptyText {
            message: "The consolidated CRM text is empty; no content was extracted.".to_string(),
        });
    }

    tracing::info!("[2/3] Extracting structured CRM data");
    let data = parse_crm(llm, &batch.text).await?;

    tracing::info!("[3/3] Validating CRM data");
    let validation = validate_crm(&data);
    tracing::info!(
        "CRM validation finished: {} ({} error(s))",
        validation.status,
        validation.errors.len()
    );

    Ok(CrmOutcome {
        succeeded: batch.succeeded,
        failed: batch.failed,
        text: batch.text,
        data,
        validation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CompletionRequest, ReviewStatus};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapExtractor(HashMap<String, std::result::Result<String, &'static str>>);

    #[async_trait]
    impl TextExtractor for MapExtractor {
        async fn extract_text(&self, path: &Path) -> Result<String> {
            let key = path.display().to_string();
            match self.0.get(&key) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(message)) => Err(ValidatorError::ExtractionError {
                    path: key,
                    message: message.to_string(),
                }),
                None => Err(ValidatorError::FileNotFound { path: key }),
            }
        }
    }

    struct FixedLlm(&'static str);

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            assert!(request.user.contains("Negociação: Colégio Modelo\n\nContatos: Ana"));
            Ok(self.0.to_string())
        }
    }

    const REPLY: &str = r#"{"nome": "Colégio Modelo - Novo", "nome_escola": "Colégio Modelo",
        "vendedor": "Maria", "perfil_escola": "Privada", "numero_alunos": 300,
        "nivel_prioridade": "GRUPO A", "mrr": 1500, "arr": 18000, "dor_escola": "Engajamento",
        "valor_implantacao": 5000, "link_contrato": "https://c.example/x",
        "forma_implantacao": "Remota", "contato_nome": "Ana", "contato_telefone": "(31) 99999-8888",
        "contato_email": "ana@escola.com"}"#;

    fn extractor() -> MapExtractor {
        let mut files = HashMap::new();
        files.insert("deal.png".to_string(), Ok("Negociação: Colégio Modelo".to_string()));
        files.insert("contacts.png".to_string(), Ok("Contatos: Ana".to_string()));
        files.insert("blurred.png".to_string(), Err("tesseract exited with status 1"));
        files.insert("blank.png".to_string(), Ok("   ".to_string()));
        MapExtractor(files)
    }

    #[tokio::test]
    async fn test_run_crm_collects_failures_and_joins_text() {
        let outcome = run_crm(
            &extractor(),
            &FixedLlm(REPLY),
            &["deal.png", "missing.png", "contacts.png", "blurred.png"],
        )
        .await
        .unwrap();

        assert_eq!(outcome.succeeded, vec!["deal.png".to_string(), "contacts.png".to_string()]);
        assert_eq!(outcome.failed.len(), 2);
        assert_eq!(outcome.failed[0].path, "missing.png");
        assert_eq!(outcome.failed[0].reason, "file not found");
        assert!(outcome.failed[1].reason.contains("tesseract exited"));
        assert_eq!(outcome.text, "Negociação: Colégio Modelo\n\nContatos: Ana");
        assert_eq!(outcome.validation.status, ReviewStatus::Valid, "{:?}", outcome.validation.errors);
    }

    #[tokio::test]
    async fn test_extract_batch_labels_files_by_path() {
        let paths = [PathBuf::from("blurred.png"), PathBuf::from("deal.png")];
        let batch = extract_batch(&extractor(), &paths).await;

        assert_eq!(batch.succeeded, vec!["deal.png".to_string()]);
        assert_eq!(batch.failed.len(), 1);
        assert_eq!(batch.failed[0].path, "blurred.png");
        assert_eq!(batch.text, "Negociação: Colégio Modelo");
    }

    #[tokio::test]
    async fn test_run_crm_without_usable_files() {
        let result = run_crm(&extractor(), &FixedLlm(REPLY), &["missing.png", "blurred.png"]).await;
        assert!(matches!(result, Err(ValidatorError::NoUsableFiles)));
    }

    #[tokio::test]
    async fn test_run_crm_with_blank_text() {
        let result = run_crm(&extractor(), &FixedLlm(REPLY), &["blank.png"]).await;
        assert!(matches!(result, Err(ValidatorError::EmptyText { .. })));
    }
}
