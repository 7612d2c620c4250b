use crate::core::ConfigProvider;
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENRICHMENT_HTTP: &str = "http";
pub const ENRICHMENT_SIMULATED: &str = "simulated";

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_DELAY_MS: u64 = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub catalog: CatalogConfig,
    pub store: StoreConfig,
    pub enrichment: EnrichmentConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// 未設定時以空的商品庫啟動
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    pub r#type: String,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CatalogError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ENRICHMENT_URL})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CatalogError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_non_empty_string("catalog.name", &self.catalog.name)?;

        if let Some(seed_file) = &self.store.seed_file {
            validate_path("store.seed_file", seed_file)?;
            validate_file_extension("store.seed_file", seed_file, &["json", "csv"])?;
        }

        match self.enrichment.r#type.as_str() {
            ENRICHMENT_HTTP => {
                let endpoint =
                    validate_required_field("enrichment.endpoint", &self.enrichment.endpoint)?;
                validate_url("enrichment.endpoint", endpoint)?;
            }
            ENRICHMENT_SIMULATED => {}
            other => {
                return Err(CatalogError::InvalidConfigValueError {
                    field: "enrichment.type".to_string(),
                    value: other.to_string(),
                    reason: format!(
                        "Unsupported enrichment type. Valid types: {}, {}",
                        ENRICHMENT_HTTP, ENRICHMENT_SIMULATED
                    ),
                });
            }
        }

        if let Some(timeout) = self.enrichment.timeout_seconds {
            validate_positive_number("enrichment.timeout_seconds", timeout, 1)?;
        }

        if let Some(format) = self.log_format() {
            let valid_formats = ["compact", "json"];
            if !valid_formats.contains(&format) {
                return Err(CatalogError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: format!("Valid formats: {}", valid_formats.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn log_format(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.format.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn seed_file(&self) -> Option<&str> {
        self.store.seed_file.as_deref()
    }

    fn enrichment_endpoint(&self) -> Option<&str> {
        if self.enrichment.r#type == ENRICHMENT_HTTP {
            self.enrichment.endpoint.as_deref()
        } else {
            None
        }
    }

    fn enrichment_timeout_seconds(&self) -> u64 {
        self.enrichment
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn simulated_delay_ms(&self) -> u64 {
        self.enrichment.delay_ms.unwrap_or(DEFAULT_DELAY_MS)
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
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[catalog]
name = "carved-rock"

[store]
seed_file = "data/products.json"

[enrichment]
type = "http"
endpoint = "https://extras.example.com/api"
timeout_seconds = 3

[logging]
level = "debug"
format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.catalog.name, "carved-rock");
        assert_eq!(config.seed_file(), Some("data/products.json"));
        assert_eq!(config.enrichment_endpoint(), Some("https://extras.example.com/api"));
        assert_eq!(config.enrichment_timeout_seconds(), 3);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_format(), Some("json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_simulated_defaults() {
        let toml_content = r#"
[catalog]
name = "demo"

[store]

[enrichment]
type = "simulated"
endpoint = "https://ignored.example.com"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.seed_file(), None);
        assert_eq!(config.enrichment_endpoint(), None);
        assert_eq!(config.simulated_delay_ms(), DEFAULT_DELAY_MS);
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.log_format(), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_CATALOG_ENRICHMENT_URL", "https://test.extras.com");

        let toml_content = r#"
[catalog]
name = "test"

[store]

[enrichment]
type = "http"
endpoint = "${TEST_CATALOG_ENRICHMENT_URL}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.enrichment_endpoint(), Some("https://test.extras.com"));

        std::env::remove_var("TEST_CATALOG_ENRICHMENT_URL");
    }

    #[test]
    fn test_http_requires_endpoint() {
        let toml_content = r#"
[catalog]
name = "test"

[store]

[enrichment]
type = "http"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CatalogError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let invalid = [
            ("[enrichment]\ntype = \"grpc\"", "enrichment.type"),
            (
                "[enrichment]\ntype = \"http\"\nendpoint = \"invalid-url\"",
                "enrichment.endpoint",
            ),
            (
                "[enrichment]\ntype = \"simulated\"\ntimeout_seconds = 0",
                "enrichment.timeout_seconds",
            ),
        ];

        for (enrichment, expected_field) in invalid {
            let toml_content = format!("[catalog]\nname = \"x\"\n\n[store]\n\n{}\n", enrichment);
            let config = TomlConfig::from_toml_str(&toml_content).unwrap();
            match config.validate() {
                Err(CatalogError::InvalidConfigValueError { field, .. }) => {
                    assert_eq!(field, expected_field)
                }
                other => panic!("expected invalid {}, got {:?}", expected_field, other),
            }
        }
    }

    #[test]
    fn test_seed_file_extension_validated() {
        let toml_content = r#"
[catalog]
name = "test"

[store]
seed_file = "products.xml"

[enrichment]
type = "simulated"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[catalog]
name = "file-test"

[store]

[enrichment]
type = "simulated"
delay_ms = 5
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.catalog.name, "file-test");
        assert_eq!(config.simulated_delay_ms(), 5);
    }

    #[test]
    fn test_invalid_toml() {
        let result = TomlConfig::from_toml_str("[catalog\nname = ");
        assert!(matches!(
            result,
            Err(CatalogError::ConfigValidationError { .. })
        ));
    }
}
