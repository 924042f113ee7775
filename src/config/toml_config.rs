use crate::adapters::ctt_client::DEFAULT_BASE_URL;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "postal-etl.toml";

const MAX_DELAY_SECONDS: f64 = 3600.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub input: InputConfig,
    pub store: StoreConfig,
    pub throttle: ThrottleConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: PathBuf,
    pub column: String,
    pub delimiter: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("codigos_postais.csv"),
            column: "cp7".to_string(),
            delimiter: ",".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("codigos_postais.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub request_delay_seconds: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            request_delay_seconds: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub skip_known: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CTT_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", var_name);
                format!("${{{}}}", var_name)
            })
        });

        Ok(result.to_string())
    }

    /// Settings both commands rely on.
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_positive_number("api.timeout_seconds", self.api.timeout_seconds, 1)?;

        validation::validate_path("input.path", &self.input.path.to_string_lossy())?;
        validation::validate_non_empty_string("input.column", &self.input.column)?;
        validation::validate_delimiter("input.delimiter", &self.input.delimiter)?;

        validation::validate_path("store.db_path", &self.store.db_path.to_string_lossy())?;

        validation::validate_range(
            "throttle.request_delay_seconds",
            self.throttle.request_delay_seconds,
            0.0,
            MAX_DELAY_SECONDS,
        )?;

        Ok(())
    }

    /// An enrichment pass additionally needs a usable API key.
    pub fn validate_for_enrichment(&self) -> Result<()> {
        self.validate()?;
        validation::validate_non_empty_string("api.api_key", &self.api.api_key)?;
        if self.api.api_key.starts_with("${") {
            return Err(EtlError::MissingConfigError {
                field: format!("api.api_key (unresolved {})", self.api.api_key),
            });
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn api_key(&self) -> &str {
        &self.api.api_key
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    fn input_path(&self) -> &Path {
        &self.input.path
    }

    fn input_column(&self) -> &str {
        &self.input.column
    }

    fn input_delimiter(&self) -> u8 {
        self.input.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }

    fn db_path(&self) -> &Path {
        &self.store.db_path
    }

    fn request_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.throttle.request_delay_seconds).unwrap_or(Duration::ZERO)
    }

    fn skip_known(&self) -> bool {
        self.pipeline.skip_known
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
