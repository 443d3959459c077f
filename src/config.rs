use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::eval::ClassificationMode;
use crate::llm::RetryPolicy;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "SCHEMALIGN_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Input file and artifact directories
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// JSON array of {question_id, db_id, question, SQL}
    #[serde(default = "default_input")]
    pub input: PathBuf,
    /// Where output_sql.json / output_llm.json are written
    #[serde(default = "default_tables_dir")]
    pub tables_dir: PathBuf,
    /// Where metric JSON files and the chart are written
    #[serde(default = "default_metrics_dir")]
    pub metrics_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            tables_dir: default_tables_dir(),
            metrics_dir: default_metrics_dir(),
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("minidev/MINIDEV/mini_dev_mysql.json")
}

fn default_tables_dir() -> PathBuf {
    PathBuf::from("results/tables_extracted")
}

fn default_metrics_dir() -> PathBuf {
    PathBuf::from("results/metrics")
}

/// Chat-completion endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Model used to resolve question entities
    #[serde(default = "default_resolver_model")]
    pub resolver_model: String,
    /// Model used to cross-check the metric arithmetic
    #[serde(default = "default_validator_model")]
    pub validator_model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            resolver_model: default_resolver_model(),
            validator_model: default_validator_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_resolver_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_validator_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Batch-driver pause: sleep `pause_secs` before every `every`-th resolver call
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_pacing_every")]
    pub every: usize,
    #[serde(default = "default_pacing_pause_secs")]
    pub pause_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            every: default_pacing_every(),
            pause_secs: default_pacing_pause_secs(),
        }
    }
}

fn default_pacing_every() -> usize {
    30
}

fn default_pacing_pause_secs() -> u64 {
    60
}

/// Backoff for the metric cross-check call
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_secs: default_initial_delay_secs(),
        }
    }
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_secs() -> u64 {
    2
}

/// Metric classification settings
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub classification: ClassificationMode,
    /// Largest tolerated |local - llm| before a mismatch is reported
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            classification: ClassificationMode::default(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_tolerance() -> f64 {
    1e-3
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in SCHEMALIGN_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();
        Self::from_file(&Self::config_path())
    }

    /// Like [`Config::load`], but a missing config file yields the defaults.
    pub fn load_or_default() -> Result<Self> {
        let _ = dotenv::dotenv();
        let path = Self::config_path();
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }
        Self::from_file(&path)
    }

    fn config_path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }

    /// Read and validate a specific TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.pacing.every == 0 {
            anyhow::bail!("pacing.every must be greater than 0");
        }
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be greater than 0");
        }
        if self.llm.base_url.trim().is_empty() {
            anyhow::bail!("llm.base_url must not be empty");
        }
        if self.metrics.tolerance.is_nan() || self.metrics.tolerance < 0.0 {
            anyhow::bail!("metrics.tolerance must be a non-negative number");
        }
        Ok(())
    }

    /// Read the bearer token from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.llm.api_key_env).with_context(|| {
            format!(
                "Environment variable {} not set. Set it in your .env file or as an environment variable with your API key.",
                self.llm.api_key_env
            )
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_retries,
            Duration::from_secs(self.retry.initial_delay_secs),
        )
    }

    pub fn output_sql_path(&self) -> PathBuf {
        self.paths.tables_dir.join("output_sql.json")
    }

    pub fn output_llm_path(&self) -> PathBuf {
        self.paths.tables_dir.join("output_llm.json")
    }

    pub fn evaluation_results_path(&self) -> PathBuf {
        self.paths.metrics_dir.join("evaluation_results.json")
    }

    pub fn llm_evaluation_results_path(&self) -> PathBuf {
        self.paths.metrics_dir.join("llm_evaluation_results.json")
    }

    pub fn f1_per_db_path(&self) -> PathBuf {
        self.paths.metrics_dir.join("f1_per_db.json")
    }

    pub fn chart_path(&self) -> PathBuf {
        self.paths.metrics_dir.join("f1_final_comparison.svg")
    }
}
