use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable error: {0}")]
    EnvVar(#[from] env::VarError),
    #[error("failed to parse config value: {0}")]
    Parse(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub temperature: f64,
    pub request_timeout: Duration,
    pub log_dir: String,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub max_size: u64,
}

#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    pub rate_limit_per_min: u32,
    pub circuit_fail_threshold: u32,
    pub circuit_cooldown_seconds: u64,
    pub circuit_cooldown_max_seconds: u64,
    pub tool_handler_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub version: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
    pub resilience: ResilienceConfig,
    pub logging: LoggingConfig,
    pub database_url: Option<String>,
    pub corpus_snapshot_path: String,
    pub categories_path: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map_err(|_| ConfigError::Parse(format!("{}: could not parse '{}'", key, v))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            service_name: env_or("SERVICE_NAME", "startup-concierge"),
            version: env_or("SERVICE_VERSION", env!("CARGO_PKG_VERSION")),
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: parse_env("PORT", 8080u16)?,
                cors_origins: env_or("CORS_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                request_timeout_ms: parse_env("REQUEST_TIMEOUT_MS", 90_000u64)?,
            },
            llm: LlmConfig {
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env_or("LLM_BASE_URL", "https://api.openai.com/v1"),
                default_model: env_or("LLM_DEFAULT_MODEL", "gpt-4o-mini"),
                temperature: parse_env("LLM_TEMPERATURE", 0.7f64)?,
                request_timeout: Duration::from_millis(parse_env(
                    "LLM_REQUEST_TIMEOUT_MS",
                    60_000u64,
                )?),
                log_dir: env_or("LLM_LOG_DIR", "./llm_call_log"),
            },
            cache: CacheConfig {
                ttl_seconds: parse_env("CACHE_TTL_SECONDS", 86_400u64)?,
                max_size: parse_env("CACHE_MAX_SIZE", 1_000u64)?,
            },
            resilience: ResilienceConfig {
                rate_limit_per_min: parse_env("RATE_LIMIT_PER_MIN", 60u32)?,
                circuit_fail_threshold: parse_env("CIRCUIT_FAIL_THRESHOLD", 5u32)?,
                circuit_cooldown_seconds: parse_env("CIRCUIT_COOLDOWN_SECONDS", 60u64)?,
                circuit_cooldown_max_seconds: parse_env("CIRCUIT_COOLDOWN_MAX_SECONDS", 300u64)?,
                tool_handler_timeout_ms: parse_env("TOOL_HANDLER_TIMEOUT_MS", 2_000u64)?,
            },
            logging: LoggingConfig {
                level: env_or("LOG_LEVEL", "info"),
                format: env_or("LOG_FORMAT", "pretty"),
            },
            database_url: env::var("DATABASE_URL").ok(),
            corpus_snapshot_path: env_or("CORPUS_SNAPSHOT_PATH", "./data/corpus_snapshot.json"),
            categories_path: env_or("CATEGORIES_PATH", "./config/categories.yaml"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_absent() {
        env::remove_var("PORT");
        env::remove_var("LLM_TEMPERATURE");
        let config = Config::from_env().expect("config should build from defaults");
        assert_eq!(config.server.port, 8080);
        assert!((config.llm.temperature - 0.7).abs() < f64::EPSILON);
    }
}
