use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: '{field}'")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed on '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("File not found: '{path}'")]
    FileNotFound { path: String },

    #[error("Path is not a file: '{path}'")]
    NotAFile { path: String },

    #[error("Unsupported file type: '{extension}'. Accepted extensions: {accepted}")]
    UnsupportedFileType { extension: String, accepted: String },

    #[error("Failed to extract text from '{path}': {message}")]
    ExtractionError { path: String, message: String },

    #[error("No readable text found in '{path}'")]
    EmptyDocument { path: String },

    #[error("None of the files could be processed. Check the paths and formats provided.")]
    NoUsableFiles,

    #[error("{message}")]
    EmptyText { message: String },

    #[error("Model API returned {status}: {body}")]
    LlmApiError { status: u16, body: String },

    #[error("Invalid model response: {message}")]
    LlmResponseError { message: String },

    #[error("Unexpected response structure: {message}")]
    ResponseStructureError { message: String },

    #[error(
        "Contract model not identified. Markers found: {markers:?}. \
         Check that the document is a valid contract (antigo_v13 or novo)."
    )]
    UnknownContractModel { markers: Vec<String> },

    #[error("Base template not found: '{path}'")]
    TemplateNotFound { path: String },

    #[error("{title}: {message}")]
    InputError { title: String, message: String },

    #[error("Upload too large: {message}")]
    UploadTooLarge { message: String },
}

pub type Result<T> = std::result::Result<T, ValidatorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Document,
    Upstream,
    System,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Input => "input",
            ErrorCategory::Document => "document",
            ErrorCategory::Upstream => "upstream",
            ErrorCategory::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ValidatorError {
    pub fn category(&self) -> ErrorCategory {
        use ValidatorError::*;
        match self {
            ConfigError { .. }
            | MissingConfigError { .. }
            | InvalidConfigValueError { .. }
            | ConfigValidationError { .. }
            | TemplateNotFound { .. } => ErrorCategory::Configuration,
            FileNotFound { .. }
            | NotAFile { .. }
            | UnsupportedFileType { .. }
            | NoUsableFiles
            | InputError { .. }
            | UploadTooLarge { .. } => ErrorCategory::Input,
            ExtractionError { .. }
            | EmptyDocument { .. }
            | EmptyText { .. }
            | UnknownContractModel { .. } => ErrorCategory::Document,
            ApiError(_) | LlmApiError { .. } | LlmResponseError { .. } | ResponseStructureError { .. } => {
                ErrorCategory::Upstream
            }
            CsvError(_) | IoError(_) | SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Document => ErrorSeverity::High,
            ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        use ValidatorError::*;
        match self {
            MissingConfigError { .. } => {
                "Set the missing value in the config file or through its environment variable (e.g. ANTHROPIC_API_KEY)"
            }
            ConfigError { .. } | InvalidConfigValueError { .. } | ConfigValidationError { .. } => {
                "Check the TOML config file and the PORT / ANTHROPIC_API_KEY environment variables"
            }
            TemplateNotFound { .. } => {
                "Place modelo_novo_base.txt and modelo_antigo_base.txt in the configured templates directory"
            }
            FileNotFound { .. } | NotAFile { .. } => "Verify the file path and try again",
            UnsupportedFileType { .. } => "Send PDF, JPG, JPEG or PNG files only",
            UploadTooLarge { .. } => "Send smaller files or raise server.max_upload_mb",
            NoUsableFiles | InputError { .. } => {
                "Send at least one CRM screenshot (JPG/PNG) and exactly one contract PDF"
            }
            ExtractionError { .. } => {
                "Make sure the document is not corrupted and that tesseract (with the 'por' language pack) is installed"
            }
            EmptyDocument { .. } | EmptyText { .. } => {
                "The document has no readable text; scanned PDFs must be sent as images"
            }
            UnknownContractModel { .. } => "Send a contract based on the official 'novo' or 'antigo_v13' template",
            ApiError(_) | LlmApiError { .. } => "Check network connectivity and the Anthropic API key, then retry",
            LlmResponseError { .. } | ResponseStructureError { .. } => {
                "The model returned malformed data; retry the validation"
            }
            CsvError(_) | IoError(_) | SerializationError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::Document => format!("Document could not be processed: {}", self),
            ErrorCategory::Upstream => format!("Extraction service failure: {}", self),
            ErrorCategory::System => format!("Internal error: {}", self),
        }
    }

    pub fn input(title: impl Into<String>, message: impl Into<String>) -> Self {
        ValidatorError::InputError {
            title: title.into(),
            message: message.into(),
        }
    }
}
