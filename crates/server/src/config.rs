use config::ConfigError;
use engine::{GatewayConfig, TriageConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const ENV_PREFIX: &str = "MODNUKE_";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub triage: TriageConfig,
    pub worker: WorkerSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct WorkerSettings {
    pub poll_interval_ms: u64,
    pub batch_size: i64,
}

impl WorkerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_map = collect_env_vars(std::env::vars());
        let env_json = serde_json::to_string(&env_map)
            .map_err(|e| ConfigError::Message(format!("Unreadable environment: {}", e)))?;

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "sqlite://data/modnuke.db")?
            .set_default("gateway.base_url", "http://127.0.0.1:8080")?
            .set_default("gateway.token", "")?
            .set_default("gateway.subreddit", "")?
            .set_default("worker.poll_interval_ms", 1000)?
            .set_default("worker.batch_size", 32)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(&env_json, config::FileFormat::Json))
            .build()?;

        s.try_deserialize()
    }
}

/// `MODNUKE_TRIAGE__RETRY_LIMIT=5` becomes `triage.retry_limit = "5"`.
fn collect_env_vars(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_vars_map_to_nested_keys() {
        let vars = vec![
            ("MODNUKE_TRIAGE__RETRY_LIMIT".to_string(), "5".to_string()),
            ("MODNUKE_GATEWAY__SUBREDDIT".to_string(), "pics".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ];
        let map = collect_env_vars(vars.into_iter());
        assert_eq!(map.len(), 2);
        assert_eq!(map["triage.retry_limit"], "5");
        assert_eq!(map["gateway.subreddit"], "pics");
    }
}
