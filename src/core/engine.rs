use crate::core::clause_validator::ClauseValidator;
use crate::core::contract_pipeline::run_contract;
use crate::core::crm_pipeline::run_crm;
use crate::core::model_detector::detect_model;
use crate::domain::model::{
    ClauseValidation, ContractModel, ContractOutcome, CrmOutcome, ModelDetection, ReviewReport, ReviewStatus,
};
use crate::domain::ports::{LlmClient, Storage, TextExtractor};
use crate::utils::error::{Result, ValidatorError};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Overall verdict for a deal: the CRM record and the contract must both pass.
pub fn overall_status(crm: ReviewStatus, contract: ReviewStatus) -> ReviewStatus {
    if crm == ReviewStatus::Invalid || contract == ReviewStatus::Invalid {
        ReviewStatus::Invalid
    } else if contract == ReviewStatus::ManualReview {
        ReviewStatus::ManualReview
    } else {
        ReviewStatus::Valid
    }
}

pub fn status_banner(status: ReviewStatus) -> &'static str {
    match status {
        ReviewStatus::Valid => "APPROVED — CRM and contract valid",
        ReviewStatus::Invalid => "REJECTED — critical errors found",
        ReviewStatus::ManualReview => "MANUAL REVIEW — altered clauses or elevated risk",
    }
}

fn is_pdf(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Splits uploaded file names into CRM screenshots and the contract PDF.
///
/// Anything that is not a PDF is treated as a screenshot; the extractor
/// rejects unsupported formats later, file by file.
pub fn split_uploads<T: AsRef<str>>(names: &[T]) -> Result<(Vec<&T>, &T)> {
    let (pdfs, images): (Vec<&T>, Vec<&T>) = names.iter().partition(|name| is_pdf(name.as_ref()));

    if images.is_empty() {
        return Err(ValidatorError::input(
            "Insufficient files",
            "Send at least one image (JPG or PNG) with the CRM screenshots.",
        ));
    }

    match pdfs.as_slice() {
        [] => Err(ValidatorError::input("Missing file", "Send the contract as a PDF.")),
        [pdf] => Ok((images, *pdf)),
        many => Err(ValidatorError::input(
            "Too many PDFs",
            format!("Only 1 PDF is allowed per validation. {} were sent.", many.len()),
        )),
    }
}

/// Runs the CRM and contract flows over one deal.
pub struct ReviewEngine<E: TextExtractor, L: LlmClient, S: Storage> {
    extractor: E,
    llm: L,
    clauses: ClauseValidator<S>,
}

impl<E: TextExtractor, L: LlmClient, S: Storage> ReviewEngine<E, L, S> {
    pub fn new(extractor: E, llm: L, clauses: ClauseValidator<S>) -> Self {
        Self {
            extractor,
            llm,
            clauses,
        }
    }

    pub async fn extract(&self, path: &Path) -> Result<String> {
        self.extractor.extract_text(path).await
    }

    pub async fn crm(&self, paths: &[PathBuf]) -> Result<CrmOutcome> {
        run_crm(&self.extractor, &self.llm, paths).await
    }

    pub async fn contract_text(&self, text: &str) -> Result<ContractOutcome> {
        run_contract(&self.llm, &self.clauses, text).await
    }

    pub async fn contract(&self, pdf: &Path) -> Result<ContractOutcome> {
        let text = self.extractor.extract_text(pdf).await?;
        self.contract_text(&text).await
    }

    pub async fn detect(&self, path: &Path) -> Result<ModelDetection> {
        let text = self.extractor.extract_text(path).await?;
        Ok(detect_model(&text))
    }

    pub async fn clauses(&self, model: ContractModel, path: &Path) -> Result<ClauseValidation> {
        let text = self.extractor.extract_text(path).await?;
        self.clauses.validate(model, &text).await
    }

    /// Full review of a deal: CRM screenshots first, then the contract.
    pub async fn review(&self, images: &[PathBuf], pdf: &Path) -> Result<ReviewReport> {
        tracing::info!(
            "Reviewing deal: {} screenshot(s), contract {}",
            images.len(),
            pdf.display()
        );

        let crm = self.crm(images).await?;
        let contract = self.contract(pdf).await?;

        let status = overall_status(crm.validation.status, contract.final_status);
        tracing::info!(
            "Deal review finished: {} (crm {}, contract {})",
            status,
            crm.validation.status,
            contract.final_status
        );

        Ok(ReviewReport {
            status,
            summary: status_banner(status).to_string(),
            crm,
            contract_file: pdf.display().to_string(),
            contract,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_status() {
        use ReviewStatus::*;
        assert_eq!(overall_status(Valid, Valid), Valid);
        assert_eq!(overall_status(Invalid, Valid), Invalid);
        assert_eq!(overall_status(Invalid, ManualReview), Invalid);
        assert_eq!(overall_status(Valid, Invalid), Invalid);
        assert_eq!(overall_status(Valid, ManualReview), ManualReview);
    }

    #[test]
    fn test_status_banner() {
        assert_eq!(status_banner(ReviewStatus::Valid), "APPROVED — CRM and contract valid");
        assert!(status_banner(ReviewStatus::ManualReview).starts_with("MANUAL REVIEW"));
    }

    #[test]
    fn test_split_uploads() {
        let names = ["deal.png", "contacts.JPG", "contrato.PDF"];
        let (images, pdf) = split_uploads(&names).unwrap();
        assert_eq!(images, vec![&"deal.png", &"contacts.JPG"]);
        assert_eq!(*pdf, "contrato.PDF");
    }

    #[test]
    fn test_split_uploads_rules() {
        let err = split_uploads(&["contrato.pdf"]).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient files: Send at least one image (JPG or PNG) with the CRM screenshots.");

        let err = split_uploads(&["deal.png"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing file: Send the contract as a PDF.");

        let err = split_uploads(&["deal.png", "a.pdf", "b.pdf"]).unwrap_err();
        assert_eq!(err.to_string(), "Too many PDFs: Only 1 PDF is allowed per validation. 2 were sent.");

        // No images is reported first, even with several PDFs
        let err = split_uploads(&["a.pdf", "b.pdf"]).unwrap_err();
        assert!(err.to_string().starts_with("Insufficient files"));
    }
}
