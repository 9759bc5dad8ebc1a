use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            log_format: default_log_format(),
        }
    }
}

/// Which store backs the shopping list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process copy, mirrored to Redis when `redis_url` is set and `production` is on.
    #[default]
    Memory,
    /// A single JSON file on disk.
    File,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "redis" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(anyhow!("storage.backend 不支持: {other}（可选 memory / file）")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_redis_key")]
    pub redis_key: String,
    #[serde(default)]
    pub production: bool,
    #[serde(default = "default_file_path")]
    pub file_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            redis_url: None,
            redis_key: default_redis_key(),
            production: false,
            file_path: default_file_path(),
        }
    }
}

fn default_log_format() -> String { "compact".into() }
fn default_redis_key() -> String { "shopping-list".into() }
fn default_file_path() -> String { "data/shopping-list.json".into() }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `CONFIG_PATH` (default `config.toml`), overlay the process environment and validate.
    ///
    /// A missing file is not an error: defaults plus environment are used instead.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if Path::new(&path).exists() {
            load_from_file(&path).map_err(|e| anyhow!("读取配置 {path} 失败: {e}"))?
        } else {
            AppConfig::default()
        };
        cfg.normalize_and_validate(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn normalize_and_validate<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.normalize_from_env(&env)?;
        self.server.normalize()?;
        self.storage.normalize_from_env(&env)?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize_from_env<F>(&mut self, env: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = env("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = env("SERVER_PORT") {
            self.port = port
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT 无法解析为端口号: {port}"))?;
        }
        if let Some(w) = env("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
        if let Some(fmt) = env("LOG_FORMAT") {
            self.log_format = fmt;
        }
        Ok(())
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    fn normalize_from_env<F>(&mut self, env: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 若 TOML 中未提供 redis_url，则尝试从环境变量填充
        if self.redis_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            self.redis_url = env("REDIS_URL").filter(|u| !u.trim().is_empty());
        }
        if let Some(app_env) = env("APP_ENV") {
            self.production = app_env.eq_ignore_ascii_case("production");
        }
        if let Some(backend) = env("STORAGE_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(path) = env("STORAGE_FILE_PATH") {
            self.file_path = path;
        }
        if let Some(key) = env("REDIS_KEY") {
            self.redis_key = key;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::File && self.file_path.trim().is_empty() {
            return Err(anyhow!("storage.file_path 为空；file 后端需要数据文件路径"));
        }
        if let Some(url) = &self.redis_url {
            let lower = url.to_lowercase();
            if !(lower.starts_with("redis://") || lower.starts_with("rediss://")) {
                return Err(anyhow!("storage.redis_url 必须以 redis:// 或 rediss:// 开头"));
            }
        }
        if self.redis_key.trim().is_empty() {
            return Err(anyhow!("storage.redis_key 不能为空"));
        }
        Ok(())
    }

    /// Remote mirroring is on only when a Redis URL is configured and the process runs in production mode.
    pub fn remote_enabled(&self) -> bool {
        self.production && self.redis_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_run_purely_in_process() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate(env_of(&[])).unwrap();
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.storage.redis_key, "shopping-list");
        assert!(!cfg.storage.remote_enabled());
        assert_eq!(cfg.server.worker_threads, Some(4));
    }

    #[test]
    fn remote_requires_both_url_and_production() {
        let mut only_url = AppConfig::default();
        only_url
            .normalize_and_validate(env_of(&[("REDIS_URL", "redis://127.0.0.1:6379")]))
            .unwrap();
        assert!(!only_url.storage.remote_enabled());

        let mut only_prod = AppConfig::default();
        only_prod.normalize_and_validate(env_of(&[("APP_ENV", "production")])).unwrap();
        assert!(!only_prod.storage.remote_enabled());

        let mut both = AppConfig::default();
        both.normalize_and_validate(env_of(&[
            ("REDIS_URL", "redis://127.0.0.1:6379"),
            ("APP_ENV", "production"),
        ]))
        .unwrap();
        assert!(both.storage.remote_enabled());
    }

    #[test]
    fn toml_values_are_parsed() {
        let mut cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 3000

            [storage]
            backend = "file"
            file_path = "/tmp/list.json"
            "#,
        )
        .unwrap();
        cfg.normalize_and_validate(env_of(&[])).unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.storage.file_path, "/tmp/list.json");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut bad_url = AppConfig::default();
        assert!(bad_url
            .normalize_and_validate(env_of(&[("REDIS_URL", "http://example.com")]))
            .is_err());

        let mut bad_backend = AppConfig::default();
        assert!(bad_backend
            .normalize_and_validate(env_of(&[("STORAGE_BACKEND", "sqlite")]))
            .is_err());

        let mut bad_port = AppConfig::default();
        assert!(bad_port
            .normalize_and_validate(env_of(&[("SERVER_PORT", "0")]))
            .is_err());
    }
}
