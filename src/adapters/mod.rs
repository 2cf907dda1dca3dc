// Adapters layer: concrete implementations of the domain ports
// (local filesystem, PDF/OCR text extraction, Anthropic HTTP API).

pub mod anthropic;
pub mod extractor;
pub mod storage;

pub use anthropic::AnthropicClient;
pub use extractor::FileTextExtractor;
pub use storage::LocalStorage;
