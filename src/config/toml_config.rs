use crate::core::ConfigProvider;
use crate::utils::error::{AdminError, Result};
use crate::utils::render::OutputFormat;
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_SESSION_PATH: &str = "~/.tomato-admin/session.json";
pub const DEFAULT_STALE_TIME_SECONDS: u64 = 0;
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub session: Option<SessionConfig>,
    pub cache: Option<CacheConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub stale_time_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    pub page_limit: Option<u32>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdminError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdminError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TOMATO_API_URL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdminError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_range("api.timeout_seconds", self.timeout_seconds(), 1, 600)?;
        validate_path("session.path", self.session_path())?;
        validate_range("output.page_limit", self.page_limit(), 1, 100)?;
        Ok(())
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output
            .as_ref()
            .and_then(|o| o.format)
            .unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn session_path(&self) -> &str {
        self.session
            .as_ref()
            .and_then(|s| s.path.as_deref())
            .unwrap_or(DEFAULT_SESSION_PATH)
    }

    fn stale_time_seconds(&self) -> u64 {
        self.cache
            .as_ref()
            .and_then(|c| c.stale_time_seconds)
            .unwrap_or(DEFAULT_STALE_TIME_SECONDS)
    }

    fn page_limit(&self) -> u32 {
        self.output
            .as_ref()
            .and_then(|o| o.page_limit)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[api]
base_url = "https://api.tomato.example.com/v1"
timeout_seconds = 15

[session]
path = "/tmp/tomato-session.json"

[cache]
stale_time_seconds = 30

[output]
format = "csv"
page_limit = 25
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_base_url(), "https://api.tomato.example.com/v1");
        assert_eq!(config.timeout_seconds(), 15);
        assert_eq!(config.session_path(), "/tmp/tomato-session.json");
        assert_eq!(config.stale_time_seconds(), 30);
        assert_eq!(config.page_limit(), 25);
        assert_eq!(config.output_format(), OutputFormat::Csv);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let config = TomlConfig::from_toml_str(
            r#"
[api]
base_url = "http://localhost:3000"
"#,
        )
        .unwrap();

        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.session_path(), DEFAULT_SESSION_PATH);
        assert_eq!(config.stale_time_seconds(), 0);
        assert_eq!(config.page_limit(), 10);
        assert_eq!(config.output_format(), OutputFormat::Table);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TOMATO_TEST_BASE_URL", "https://staging.tomato.example.com");

        let config = TomlConfig::from_toml_str(
            r#"
[api]
base_url = "${TOMATO_TEST_BASE_URL}"
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://staging.tomato.example.com");

        std::env::remove_var("TOMATO_TEST_BASE_URL");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[api]
base_url = "invalid-url"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            r#"
[api]
base_url = "http://localhost:3000"

[output]
page_limit = 0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_format_is_rejected() {
        let result = TomlConfig::from_toml_str(
            r#"
[api]
base_url = "http://localhost:3000"

[output]
format = "xml"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\nbase_url = \"http://127.0.0.1:4000/api\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.api_base_url(), "http://127.0.0.1:4000/api");
    }
}
