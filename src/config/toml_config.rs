use crate::utils::error::{Result, ValidatorError};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-6";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.97;

static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub ocr: OcrConfig,
    pub contract: ContractConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable, looked up on PATH when not absolute
    pub command: String,
    pub languages: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub templates_dir: PathBuf,
    pub similarity_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// "compact" or "json"
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_mb: 25,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: 120,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            languages: "por+eng".to_string(),
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads a TOML file; `${VAR}` references are replaced from the environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ValidatorError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ValidatorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Reads the config file when given, otherwise starts from defaults,
    /// then applies the `PORT` and `ANTHROPIC_API_KEY` environment overlay.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(
            path,
            std::env::var("PORT").ok().as_deref(),
            std::env::var("ANTHROPIC_API_KEY").ok().as_deref(),
        )
    }

    pub fn load_with_env(path: Option<&Path>, port: Option<&str>, api_key: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(port, api_key)?;
        Ok(config)
    }

    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn apply_env_overrides(&mut self, port: Option<&str>, api_key: Option<&str>) -> Result<()> {
        if let Some(port) = port {
            self.server.port = parse_port(port)?;
        }

        if let Some(key) = api_key.map(str::trim).filter(|key| !key.is_empty()) {
            // An explicit key in the config file wins over the environment
            if self.llm.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                self.llm.api_key = Some(key.to_string());
            }
        }

        Ok(())
    }

    /// `serve --host/--port` flags; applied last so they beat file and environment.
    pub fn apply_cli_overrides(&mut self, host: Option<&str>, port: Option<u16>) {
        if let Some(host) = host {
            self.server.host = host.to_string();
        }
        if let Some(port) = port {
            self.server.port = port;
        }
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ValidatorError::InvalidConfigValueError {
                field: "server.host".to_string(),
                value: self.server.host.clone(),
                reason: "Host must be an IP address".to_string(),
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb * 1024 * 1024
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format.eq_ignore_ascii_case("json")
    }
}

pub fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port > 0)
        .ok_or_else(|| ValidatorError::InvalidConfigValueError {
            field: "PORT".to_string(),
            value: value.to_string(),
            reason: "Port must be an integer between 1 and 65535".to_string(),
        })
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        self.bind_address()?;
        validation::validate_positive_number("server.max_upload_mb", self.server.max_upload_mb, 1)?;

        validation::validate_url("llm.base_url", &self.llm.base_url)?;
        validation::validate_non_empty_string("llm.model", &self.llm.model)?;

        validation::validate_non_empty_string("ocr.command", &self.ocr.command)?;
        validation::validate_non_empty_string("ocr.languages", &self.ocr.languages)?;

        validation::validate_path(
            "contract.templates_dir",
            &self.contract.templates_dir.to_string_lossy(),
        )?;
        validation::validate_range(
            "contract.similarity_threshold",
            self.contract.similarity_threshold,
            0.0,
            1.0,
        )?;

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(ValidatorError::InvalidConfigValueError {
                field: "logging.format".to_string(),
                value: self.logging.format.clone(),
                reason: format!("Unsupported format. Valid formats: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}
