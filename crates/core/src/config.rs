//! Configuration management for the Vidya engine.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.vidya/config.yaml` in the workspace, or an explicit path)
//! - Environment variables
//! - Command-line flags
//!
//! Relative paths in the config (corpus, index directory, prompts directory)
//! are resolved against the workspace root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// LLM providers that can serve generation requests.
pub const KNOWN_LLM_PROVIDERS: [&str; 3] = ["ollama", "groq", "openai"];

/// Embedding providers that can encode chunks and queries.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .vidya/ and data/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Explicit API key for the LLM provider (VIDYA_API_KEY)
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit logs as JSON lines instead of human-readable text
    pub json_logs: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Generation provider settings
    pub llm: LlmConfig,

    /// Embedding model settings
    pub embedding: EmbeddingConfig,

    /// Index location and retrieval gate
    pub retrieval: RetrievalConfig,

    /// Per-call-site sampling parameters
    pub generation: GenerationConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,
}

/// Generation provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    /// Provider name ("ollama", "groq", "openai")
    pub provider: String,

    /// Model identifier passed to the provider
    pub model: String,

    /// Custom endpoint (provider default when absent)
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "qwen/qwen3-32b".to_string(),
            endpoint: None,
            api_key_env: None,
            timeout_secs: 60,
        }
    }
}

/// Embedding model configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingConfig {
    /// Provider name ("trigram", "ollama")
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Custom endpoint for network providers
    pub endpoint: Option<String>,

    /// Request timeout in seconds for network providers
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

/// How a retrieval score is compared against the gate threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateComparison {
    /// Trust retrieval when `score <= threshold`
    AtMost,
    /// Trust retrieval when `score >= threshold`
    AtLeast,
}

impl GateComparison {
    /// Whether `score` satisfies this comparison against `threshold`.
    pub fn holds(self, score: f32, threshold: f32) -> bool {
        match self {
            Self::AtMost => score <= threshold,
            Self::AtLeast => score >= threshold,
        }
    }

    /// Operator symbol, for log lines.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::AtMost => "<=",
            Self::AtLeast => ">=",
        }
    }
}

/// Retrieval-confidence gate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GateConfig {
    pub threshold: f32,
    pub comparison: GateComparison,
}

impl GateConfig {
    /// The gate as first deployed: trust retrieval only when the top score is
    /// at or below -0.1.
    pub fn legacy() -> Self {
        Self {
            threshold: -0.1,
            comparison: GateComparison::AtMost,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: 0.20,
            comparison: GateComparison::AtLeast,
        }
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievalConfig {
    /// Ingestion output: JSON array of chunks
    pub corpus_path: PathBuf,

    /// Directory holding vectors.bin and chunks.json
    pub index_dir: PathBuf,

    /// Number of chunks to retrieve per query
    pub top_k: usize,

    /// Confidence gate
    pub gate: GateConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/processed/cleaned_chunks.json"),
            index_dir: PathBuf::from("data/vector_db/index"),
            top_k: 1,
            gate: GateConfig::default(),
        }
    }
}

/// Sampling parameters for one generation call site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationParams {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Generation configuration per call site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Answer generation backed by retrieved context
    pub grounded: GenerationParams,

    /// Answer generation without retrieved context
    pub ungrounded: GenerationParams,

    /// Translation of the final answer
    pub translation: GenerationParams,

    /// Cleaned answers shorter than this are replaced by the safety fallback
    pub min_answer_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            grounded: GenerationParams::new(0.3, 300),
            ungrounded: GenerationParams::new(0.4, 300),
            translation: GenerationParams::new(0.1, 500),
            min_answer_chars: 20,
        }
    }
}

/// Prompt template configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptsConfig {
    /// Directory of `<id>.yml` prompt overrides
    pub dir: Option<PathBuf>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    embedding: Option<EmbeddingConfig>,
    retrieval: Option<RetrievalConfig>,
    generation: Option<GenerationConfig>,
    prompts: Option<PromptsConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            api_key: None,
            log_level: None,
            json_logs: false,
            verbose: false,
            no_color: false,
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            generation: GenerationConfig::default(),
            prompts: PromptsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `VIDYA_WORKSPACE`: Override workspace path
    /// - `VIDYA_CONFIG`: Path to config file
    /// - `VIDYA_PROVIDER`: LLM provider
    /// - `VIDYA_MODEL`: Model identifier
    /// - `VIDYA_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use vidya_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Index: {:?}", config.index_dir());
    /// ```
    pub fn load() -> AppResult<Self> {
        let workspace = std::env::var("VIDYA_WORKSPACE").ok().map(PathBuf::from);
        let config_file = std::env::var("VIDYA_CONFIG").ok().map(PathBuf::from);
        Self::load_with(workspace, config_file)
    }

    /// Load configuration for an explicit workspace and config file.
    ///
    /// `None` falls back to the current directory and `.vidya/config.yaml`.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.vidya_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("VIDYA_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("VIDYA_MODEL") {
            config.llm.model = model;
        }

        config.api_key = std::env::var("VIDYA_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.json_logs = json;
            }
        }

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(generation) = config_file.generation {
            result.generation = generation;
        }
        if let Some(prompts) = config_file.prompts {
            result.prompts = prompts;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the environment and the file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .vidya directory.
    pub fn vidya_dir(&self) -> PathBuf {
        self.workspace.join(".vidya")
    }

    /// Resolved path of the ingestion corpus.
    pub fn corpus_path(&self) -> PathBuf {
        self.resolve(&self.retrieval.corpus_path)
    }

    /// Resolved index directory.
    pub fn index_dir(&self) -> PathBuf {
        self.resolve(&self.retrieval.index_dir)
    }

    /// Resolved prompt override directory, if configured.
    pub fn prompts_dir(&self) -> Option<PathBuf> {
        self.prompts.dir.as_ref().map(|dir| self.resolve(dir))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Resolve the API key for the active LLM provider.
    ///
    /// Order: `VIDYA_API_KEY`, the configured `apiKeyEnv`, then the
    /// provider's conventional variable (`GROQ_API_KEY`, `OPENAI_API_KEY`).
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = self
            .llm
            .api_key_env
            .clone()
            .or_else(|| default_api_key_env(&self.llm.provider).map(str::to_string))?;

        std::env::var(env_var).ok().filter(|key| !key.trim().is_empty())
    }

    /// Validate the configuration before building the engine.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.llm.provider.trim().to_lowercase();
        if !KNOWN_LLM_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if default_api_key_env(&provider).is_some() && self.resolve_api_key().is_none() {
            return Err(AppError::Config(format!(
                "Provider '{}' requires an API key (set VIDYA_API_KEY or {})",
                provider,
                self.llm
                    .api_key_env
                    .as_deref()
                    .or(default_api_key_env(&provider))
                    .unwrap_or("VIDYA_API_KEY")
            )));
        }

        self.validate_retrieval()
    }

    /// Validate the embedding and retrieval sections only.
    ///
    /// Index maintenance needs no generation provider, so it skips the LLM checks.
    pub fn validate_retrieval(&self) -> AppResult<()> {
        let embedding = self.embedding.provider.to_lowercase();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&embedding.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be at least 1".to_string(),
            ));
        }

        if !self.retrieval.gate.threshold.is_finite() {
            return Err(AppError::Config(format!(
                "retrieval.gate.threshold must be a finite number, got {}",
                self.retrieval.gate.threshold
            )));
        }

        Ok(())
    }
}

/// Conventional API key variable for providers that need one.
fn default_api_key_env(provider: &str) -> Option<&'static str> {
    match provider.trim().to_lowercase().as_str() {
        "groq" => Some("GROQ_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ollama_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.provider = "ollama".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.model, "qwen/qwen3-32b");
        assert_eq!(config.embedding.provider, "trigram");
        assert_eq!(config.retrieval.top_k, 1);
        assert_eq!(config.generation.min_answer_chars, 20);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_vidya_dir() {
        let config = AppConfig::default();
        assert!(config.vidya_dir().ends_with(".vidya"));
    }

    #[test]
    fn test_relative_paths_resolve_against_workspace() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/srv/vidya");
        assert_eq!(
            config.index_dir(),
            PathBuf::from("/srv/vidya/data/vector_db/index")
        );

        config.retrieval.corpus_path = PathBuf::from("/abs/chunks.json");
        assert_eq!(config.corpus_path(), PathBuf::from("/abs/chunks.json"));
        assert_eq!(config.prompts_dir(), None);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.llm.provider, "ollama");
        assert_eq!(overridden.llm.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_gate_comparison() {
        assert!(GateComparison::AtMost.holds(-0.5, -0.1));
        assert!(GateComparison::AtMost.holds(-0.1, -0.1));
        assert!(!GateComparison::AtMost.holds(0.8, -0.1));

        assert!(GateComparison::AtLeast.holds(0.8, 0.2));
        assert!(GateComparison::AtLeast.holds(0.2, 0.2));
        assert!(!GateComparison::AtLeast.holds(-0.5, 0.2));
    }

    #[test]
    fn test_legacy_gate() {
        let gate = GateConfig::legacy();
        assert_eq!(gate.threshold, -0.1);
        assert_eq!(gate.comparison, GateComparison::AtMost);
    }

    #[test]
    fn test_merge_yaml_sections() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  provider: ollama
  model: llama3.2
  endpoint: http://localhost:11434
retrieval:
  topK: 3
  gate:
    threshold: -0.1
    comparison: at_most
generation:
  grounded:
    temperature: 0.2
    maxTokens: 250
logging:
  level: debug
  color: false
"#,
        )
        .unwrap();

        let config = AppConfig::load_with(Some(temp.path().to_path_buf()), Some(path)).unwrap();

        assert_eq!(
            config.llm.endpoint.as_deref(),
            Some("http://localhost:11434")
        );
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.gate, GateConfig::legacy());
        // Unlisted fields keep their defaults
        assert_eq!(
            config.retrieval.index_dir,
            PathBuf::from("data/vector_db/index")
        );
        assert_eq!(config.generation.grounded, GenerationParams::new(0.2, 250));
        assert_eq!(config.generation.ungrounded, GenerationParams::new(0.4, 300));
        assert!(config.no_color);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_with(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("nope.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_workspace() {
        let result = AppConfig::load_with(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = ollama_config();
        config.llm.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        assert!(ollama_config().validate().is_ok());
    }

    #[test]
    fn test_validate_groq_with_explicit_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("gsk-test".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_api_key(), Some("gsk-test".to_string()));
    }

    #[test]
    fn test_validate_groq_without_key() {
        let mut config = AppConfig::default();
        config.llm.api_key_env = Some("VIDYA_TEST_UNSET_KEY_VAR".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let mut config = ollama_config();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_threshold() {
        let mut config = ollama_config();
        config.retrieval.gate.threshold = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_embedding_provider() {
        let mut config = ollama_config();
        config.embedding.provider = "word2vec".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_retrieval_ignores_llm_key() {
        let mut config = AppConfig::default();
        config.llm.api_key_env = Some("VIDYA_TEST_UNSET_KEY_VAR".to_string());
        assert!(config.validate_retrieval().is_ok());

        config.embedding.dimensions = 0;
        assert!(config.validate_retrieval().is_err());
    }

    #[test]
    fn test_api_key_env_ignores_provider_case() {
        assert_eq!(default_api_key_env("Groq"), Some("GROQ_API_KEY"));
        assert_eq!(default_api_key_env(" OPENAI "), Some("OPENAI_API_KEY"));
        assert_eq!(default_api_key_env("Ollama"), None);
    }

    #[test]
    fn test_validate_mixed_case_provider_with_env_key() {
        std::env::set_var("GROQ_API_KEY", "gsk-env");

        let mut config = AppConfig::default();
        config.llm.provider = "Groq".to_string();

        assert_eq!(config.resolve_api_key(), Some("gsk-env".to_string()));
        assert!(config.validate().is_ok());
    }
}
