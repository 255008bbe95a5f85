use crate::core::generator::{
    DEFAULT_SEED, SAMPLE_CUSTOMERS_FILE, SAMPLE_PRODUCTS_FILE, SAMPLE_TRANSACTIONS_FILE,
};
use crate::core::inspector::RETAIL_FILES;
use crate::core::recommendation::RecommendationSettings;
use crate::utils::error::{RecsysError, Result};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

static ENV_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is a valid regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppInfo,
    pub data: DataConfig,
    pub recommendation: RecommendationSettings,
    pub server: ServerConfig,
    pub launcher: LauncherConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppInfo {
    pub title: String,
    pub description: String,
    pub version: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            title: "Customer Segment Recommender".to_string(),
            description: "Segment-aware personalized product recommendations".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// retail -> sample -> generated
    #[default]
    Auto,
    Sample,
    Retail,
    Generated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source: DataSourceKind,
    pub dir: String,
    pub seed: u64,
    pub inspect_files: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        let inspect_files = RETAIL_FILES
            .iter()
            .chain([SAMPLE_CUSTOMERS_FILE, SAMPLE_PRODUCTS_FILE, SAMPLE_TRANSACTIONS_FILE].iter())
            .map(|f| f.to_string())
            .collect();
        Self {
            source: DataSourceKind::Auto,
            dir: "data/raw".to_string(),
            seed: DEFAULT_SEED,
            inspect_files,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub working_dir: String,
    /// 依序檢查，第一個存在的目錄會被啟用
    pub env_dirs: Vec<String>,
    /// 空陣列表示略過安裝步驟
    pub install: Vec<String>,
    pub app: Vec<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            working_dir: ".".to_string(),
            env_dirs: vec!["venv".to_string()],
            install: ["pip", "install", "-r", "requirements.txt", "-q"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            app: ["streamlit", "run", "streamlit_app/main.py"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RecsysError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| RecsysError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定者保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("data.dir", &self.data.dir)?;
        validation::validate_file_extensions("data.inspect_files", &self.data.inspect_files, &["csv"])?;

        validation::validate_positive_number(
            "recommendation.n_recommendations",
            self.recommendation.n_recommendations,
            1,
        )?;
        validation::validate_positive_number(
            "recommendation.max_features",
            self.recommendation.max_features,
            1,
        )?;
        validation::validate_range(
            "recommendation.min_similarity",
            self.recommendation.min_similarity,
            0.0,
            1.0,
        )?;

        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_positive_number("server.port", self.server.port as usize, 1)?;

        validation::validate_path("launcher.working_dir", &self.launcher.working_dir)?;
        validation::validate_command("launcher.app", &self.launcher.app)?;
        if !self.launcher.install.is_empty() {
            validation::validate_command("launcher.install", &self.launcher.install)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.data.source, DataSourceKind::Auto);
        assert_eq!(config.data.dir, "data/raw");
        assert_eq!(config.recommendation.n_recommendations, 6);
        assert_eq!(config.recommendation.min_similarity, 0.1);
        assert_eq!(config.server.bind_address(), "127.0.0.1:8501");
        assert_eq!(config.launcher.env_dirs, vec!["venv"]);
        assert_eq!(config.launcher.app[0], "streamlit");
        assert!(config.data.inspect_files.contains(&"hh_demographic.csv".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[app]
title = "Segment Recs"

[data]
source = "sample"
dir = "./fixtures"
seed = 7

[recommendation]
n_recommendations = 10
min_similarity = 0.3

[server]
port = 9000

[launcher]
env_dirs = [".venv", "venv"]
install = []
app = ["customer-recsys", "serve"]

[logging]
json = true
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.app.title, "Segment Recs");
        assert_eq!(config.data.source, DataSourceKind::Sample);
        assert_eq!(config.data.seed, 7);
        assert_eq!(config.recommendation.n_recommendations, 10);
        assert_eq!(config.recommendation.max_features, 1000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert!(config.launcher.install.is_empty());
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RECSYS_TEST_DATA_DIR", "/srv/recsys/data");

        let config = AppConfig::from_toml_str(
            r#"
[data]
dir = "${RECSYS_TEST_DATA_DIR}"
"#,
        )
        .unwrap();
        assert_eq!(config.data.dir, "/srv/recsys/data");

        std::env::remove_var("RECSYS_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::from_toml_str(
            r#"
[recommendation]
min_similarity = 1.5
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str(
            r#"
[launcher]
app = []
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        assert!(AppConfig::from_toml_str("[data]\nsource = \"s3\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nhost = \"0.0.0.0\"\nport = 8080\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
    }
}
