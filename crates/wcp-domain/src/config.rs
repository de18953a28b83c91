//! Layered environment-variable configuration (`§6`, `§4.8`).

use serde::{Deserialize, Serialize};
use std::fmt;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub pool_max: u32,
    pub idle_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub log_queries: bool,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_string("DB_HOST", "localhost"),
            port: env_or("DB_PORT", 5432u16),
            name: env_string("DB_NAME", "wcp"),
            user: env_string("DB_USER", "wcp"),
            password: env_string("DB_PASSWORD", ""),
            pool_max: env_or("DB_POOL_MAX", 10u32),
            idle_timeout_ms: env_or("DB_IDLE_TIMEOUT", 30_000u64),
            connect_timeout_ms: env_or("DB_CONNECT_TIMEOUT", 2_000u64),
            log_queries: env_or("LOG_QUERIES", false),
        }
    }

    /// This core ships a sqlite-backed persistence adapter: the DB_* host
    /// fields are honored for documentation/compat with `§6`'s contract but
    /// the connection string used at runtime is a single sqlite file
    /// derived from `name` unless `DATABASE_URL` is set explicitly.
    pub fn sqlite_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| format!("sqlite://{}.db", self.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransportKind {
    Stdio,
    Websocket,
}

impl fmt::Display for McpTransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McpTransportKind::Stdio => write!(f, "stdio"),
            McpTransportKind::Websocket => write!(f, "websocket"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    pub port: u16,
    pub transport: McpTransportKind,
}

impl McpConfig {
    pub fn from_env() -> Self {
        let transport = match env_string("MCP_TRANSPORT", "stdio").as_str() {
            "websocket" => McpTransportKind::Websocket,
            _ => McpTransportKind::Stdio,
        };
        Self {
            port: env_or("MCP_PORT", 3000u16),
            transport,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub cycle_interval_ms: u64,
    pub world_id: i64,
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            cycle_interval_ms: env_or("CYCLE_INTERVAL", 5_000u64),
            world_id: env_or("WORLD_ID", 1i64),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub gc_interval_secs: u64,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self {
            ttl_hours: env_or("SESSION_TTL_HOURS", 24i64),
            gc_interval_secs: env_or("SESSION_GC_INTERVAL_SECS", 3_600u64),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmTierConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub minor: LlmTierConfig,
    pub story: LlmTierConfig,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
    pub default_stop_strings: Vec<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            minor: LlmTierConfig {
                base_url: env_string("LLM_MINOR_BASE_URL", "http://localhost:11434/v1"),
                model: env_string("LLM_MINOR_MODEL", "minor-model"),
            },
            story: LlmTierConfig {
                base_url: env_string("LLM_STORY_BASE_URL", "http://localhost:11434/v1"),
                model: env_string("LLM_STORY_MODEL", "story-model"),
            },
            default_temperature: 0.3,
            default_max_tokens: 64,
            default_stop_strings: vec!["}".to_string(), "\n\n".to_string()],
        }
    }
}

/// Central configuration aggregator (`§4.8`). Mirrors the teacher's
/// env-var-name + nested-struct layering convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub mcp: McpConfig,
    pub scheduler: SchedulerConfig,
    pub session: SessionConfig,
    pub llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            mcp: McpConfig::from_env(),
            scheduler: SchedulerConfig::from_env(),
            session: SessionConfig::from_env(),
            llm: LlmConfig::from_env(),
        }
    }

    /// Validate cross-field invariants; returns zero or more issues. Errors
    /// should abort startup (see `wcp-server`'s `run_server`); warnings are
    /// logged and otherwise ignored.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.database.pool_max == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                message: "DB_POOL_MAX must be greater than zero".into(),
            });
        }
        if self.scheduler.cycle_interval_ms < 100 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                message: format!(
                    "CYCLE_INTERVAL={}ms is unusually small; cycles may never complete before the next is due",
                    self.scheduler.cycle_interval_ms
                ),
            });
        }
        if self.llm.minor.base_url.is_empty() || self.llm.story.base_url.is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                message: "one or more LLM tier base URLs are empty; the scheduler will fail to generate actions until configured".into(),
            });
        }
        issues
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validate_flags_zero_pool() {
        let mut cfg = Config::from_env();
        cfg.database.pool_max = 0;
        let issues = cfg.validate();
        assert!(issues
            .iter()
            .any(|i| i.severity == ConfigSeverity::Error));
    }

    #[test]
    fn default_llm_generation_options_match_spec() {
        let llm = LlmConfig::from_env();
        assert_eq!(llm.default_max_tokens, 64);
        assert!((llm.default_temperature - 0.3).abs() < 1e-6);
        assert_eq!(llm.default_stop_strings, vec!["}", "\n\n"]);
    }
}
