pub mod clause_validator;
pub mod contract_parser;
pub mod contract_pipeline;
pub mod crm_parser;
pub mod crm_pipeline;
pub mod crm_validator;
pub mod engine;
pub mod fields_validator;
pub mod json_block;
pub mod model_detector;
pub mod similarity;

pub use crate::domain::ports::{LlmClient, Storage, TextExtractor};
pub use crate::utils::error::Result;
pub use clause_validator::ClauseValidator;
pub use engine::{overall_status, split_uploads, status_banner, ReviewEngine};
