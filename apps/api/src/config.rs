use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_TEMPLATE_PATH: &str = "templates/internship_agreement.docx";
const DEFAULT_FILENAME_PREFIX: &str = "酷爱科技-实习协议";

/// Legal entity constants printed on every contract as the employing party.
#[derive(Debug, Clone, Default)]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub legal_representative: String,
    pub email: String,
}

/// Application configuration loaded from environment variables.
///
/// The model credential is optional at startup: without it the service still
/// generates contracts, and extraction answers with a configuration error.
#[derive(Clone)]
pub struct Config {
    pub llm_api_key: Option<String>,
    pub template_path: PathBuf,
    pub filename_prefix: String,
    pub company: CompanyProfile,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: optional_env("DEEPSEEK_API_KEY"),
            template_path: optional_env("TEMPLATE_PATH")
                .unwrap_or_else(|| DEFAULT_TEMPLATE_PATH.to_string())
                .into(),
            filename_prefix: optional_env("CONTRACT_FILENAME_PREFIX")
                .unwrap_or_else(|| DEFAULT_FILENAME_PREFIX.to_string()),
            company: CompanyProfile {
                name: optional_env("COMPANY_NAME").unwrap_or_default(),
                address: optional_env("COMPANY_ADDRESS").unwrap_or_default(),
                legal_representative: optional_env("COMPANY_LEGAL_REPRESENTATIVE")
                    .unwrap_or_default(),
                email: optional_env("COMPANY_EMAIL").unwrap_or_default(),
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<redacted>"))
            .field("template_path", &self.template_path)
            .field("filename_prefix", &self.filename_prefix)
            .field("company", &self.company)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

/// Blank values count as unset so an empty `DEEPSEEK_API_KEY=` line in `.env`
/// does not masquerade as a credential.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    /// Configuration for unit tests; never touches the process environment.
    pub fn for_tests(template_path: impl Into<PathBuf>) -> Self {
        Config {
            llm_api_key: None,
            template_path: template_path.into(),
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
            company: CompanyProfile {
                name: "示例科技有限公司".to_string(),
                address: "上海市徐汇区".to_string(),
                legal_representative: "李四".to_string(),
                email: "hr@example.com".to_string(),
            },
            port: 3000,
            rust_log: "info".to_string(),
        }
    }
}
