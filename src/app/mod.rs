pub mod report;

use crate::adapters::{AnthropicClient, FileTextExtractor, LocalStorage};
use crate::config::AppConfig;
use crate::core::{ClauseValidator, ReviewEngine};
use crate::utils::error::Result;

/// Engine wired to the local extractor, the Anthropic API and the template
/// directory from the configuration.
pub type DefaultEngine = ReviewEngine<FileTextExtractor, AnthropicClient, LocalStorage>;

pub fn build_engine(config: &AppConfig) -> Result<DefaultEngine> {
    let extractor = FileTextExtractor::from_config(&config.ocr);
    let llm = AnthropicClient::from_config(&config.llm)?;
    let templates = LocalStorage::new(&config.contract.templates_dir);
    let clauses = ClauseValidator::new(templates, config.contract.similarity_threshold);

    tracing::debug!(
        "Engine ready: model {}, templates {}, OCR '{} -l {}'",
        llm.model(),
        config.contract.templates_dir.display(),
        config.ocr.command,
        config.ocr.languages
    );

    Ok(ReviewEngine::new(extractor, llm, clauses))
}
