use config::Config;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// 上游记账 API (NetSuite REST record API)
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub access_token: String,
    /// 每次调用在首次请求之外的重试次数
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub page_size: usize,
    /// 短页且无翻页信号时是否再请求一页确认结束
    pub confirm_short_page: bool,
    pub timeout_secs: u64,
}

// token 不进日志
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"***")
            .field("retries", &self.retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("page_size", &self.page_size)
            .field("confirm_short_page", &self.confirm_short_page)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000/services/rest/record/v1".to_string(),
            access_token: String::new(),
            retries: 3,
            retry_delay_ms: 200,
            page_size: 100,
            confirm_short_page: false,
            timeout_secs: 30,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/netsuite_sync".to_string(),
            },
            upstream: UpstreamConfig::default(),
        }
    }
}

/// 环境变量 -> 配置键
const ENV_KEYS: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("DATABASE_URL", "database.url"),
    ("UPSTREAM_BASE_URL", "upstream.base_url"),
    ("UPSTREAM_ACCESS_TOKEN", "upstream.access_token"),
    ("UPSTREAM_RETRIES", "upstream.retries"),
    ("UPSTREAM_RETRY_DELAY_MS", "upstream.retry_delay_ms"),
    ("UPSTREAM_PAGE_SIZE", "upstream.page_size"),
    ("UPSTREAM_CONFIRM_SHORT_PAGE", "upstream.confirm_short_page"),
    ("UPSTREAM_TIMEOUT_SECS", "upstream.timeout_secs"),
];

impl AppConfig {
    /// 从环境变量加载配置, 未设置的项使用默认值
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 按给定查找函数叠加覆盖项 (便于测试)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("database.url", defaults.database.url)?
            .set_default("upstream.base_url", defaults.upstream.base_url)?
            .set_default("upstream.access_token", defaults.upstream.access_token)?
            .set_default("upstream.retries", i64::from(defaults.upstream.retries))?
            .set_default("upstream.retry_delay_ms", defaults.upstream.retry_delay_ms as i64)?
            .set_default("upstream.page_size", defaults.upstream.page_size as i64)?
            .set_default(
                "upstream.confirm_short_page",
                defaults.upstream.confirm_short_page,
            )?
            .set_default("upstream.timeout_secs", defaults.upstream.timeout_secs as i64)?;

        for (env_key, config_key) in ENV_KEYS {
            builder = builder.set_override_option(*config_key, lookup(env_key))?;
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_overrides() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.retries, 3);
        assert_eq!(config.upstream.page_size, 100);
        assert!(!config.upstream.confirm_short_page);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SERVER_PORT", "9090"),
            ("UPSTREAM_RETRIES", "5"),
            ("UPSTREAM_CONFIRM_SHORT_PAGE", "true"),
            ("UPSTREAM_ACCESS_TOKEN", "secret-token"),
        ]);
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.upstream.retries, 5);
        assert!(config.upstream.confirm_short_page);
        assert_eq!(config.upstream.access_token, "secret-token");
        assert!(!format!("{:?}", config).contains("secret-token"));
    }
}
