use crate::config::toml_config::OcrConfig;
use crate::domain::ports::TextExtractor;
use crate::utils::error::{Result, ValidatorError};
use async_trait::async_trait;
use std::path::Path;

pub const PDF_EXTENSIONS: &[&str] = &["pdf"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}

/// Classifies a file by its (case-insensitive) extension.
pub fn document_kind(path: &Path) -> Result<DocumentKind> {
    let extension = extension_of(path);

    if PDF_EXTENSIONS.contains(&extension.as_str()) {
        return Ok(DocumentKind::Pdf);
    }
    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Ok(DocumentKind::Image);
    }

    let mut accepted: Vec<String> = PDF_EXTENSIONS
        .iter()
        .chain(IMAGE_EXTENSIONS)
        .map(|ext| format!(".{}", ext))
        .collect();
    accepted.sort();

    Err(ValidatorError::UnsupportedFileType {
        extension: if extension.is_empty() {
            String::new()
        } else {
            format!(".{}", extension)
        },
        accepted: accepted.join(", "),
    })
}

/// Extracts text from PDFs in-process and from images through tesseract.
#[derive(Debug, Clone)]
pub struct FileTextExtractor {
    ocr_command: String,
    ocr_languages: String,
}

impl FileTextExtractor {
    pub fn new(ocr_command: impl Into<String>, ocr_languages: impl Into<String>) -> Self {
        Self {
            ocr_command: ocr_command.into(),
            ocr_languages: ocr_languages.into(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.command.clone(), config.languages.clone())
    }

    async fn extract_from_pdf(&self, path: &Path) -> Result<String> {
        let owned = path.to_path_buf();
        let display = path.display().to_string();

        let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
            .await
            .map_err(|e| ValidatorError::ExtractionError {
                path: display.clone(),
                message: format!("PDF extraction task failed: {}", e),
            })?;

        extracted.map_err(|e| ValidatorError::ExtractionError {
            path: display,
            message: e.to_string(),
        })
    }

    async fn extract_from_image(&self, path: &Path) -> Result<String> {
        tracing::debug!(
            "Running OCR '{}' on {} (languages: {})",
            self.ocr_command,
            path.display(),
            self.ocr_languages
        );

        let output = tokio::process::Command::new(&self.ocr_command)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.ocr_languages)
            .output()
            .await
            .map_err(|e| ValidatorError::ExtractionError {
                path: path.display().to_string(),
                message: format!("could not run OCR command '{}': {}", self.ocr_command, e),
            })?;

        if !output.status.success() {
            return Err(ValidatorError::ExtractionError {
                path: path.display().to_string(),
                message: format!(
                    "OCR exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TextExtractor for FileTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ValidatorError::FileNotFound {
                    path: path.display().to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Err(ValidatorError::NotAFile {
                path: path.display().to_string(),
            });
        }

        let text = match document_kind(path)? {
            DocumentKind::Pdf => self.extract_from_pdf(path).await?,
            DocumentKind::Image => self.extract_from_image(path).await?,
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(ValidatorError::EmptyDocument {
                path: path.display().to_string(),
            });
        }

        Ok(text.to_string())
    }
}
