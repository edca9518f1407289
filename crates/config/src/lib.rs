//! 统一配置中心
//!
//! 加载顺序：内置默认值 -> 可选配置文件（APP_CONFIG_FILE）-> 环境变量（APP_*，`__` 分隔层级）。
//! 日志过滤器另受 RUST_LOG 覆盖，由启动入口处理。

use std::time::Duration;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerConfig,
    #[serde(default)]
    #[validate(nested)]
    pub log: LogConfig,
    #[serde(default)]
    #[validate(nested)]
    pub presence: PresenceConfig,
    #[serde(default)]
    #[validate(nested)]
    pub heartbeat: HeartbeatConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    /// 允许的跨域来源，`*` 表示任意来源
    #[serde(default = "default_cors_origins")]
    #[validate(length(min = 1))]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogConfig {
    /// tracing EnvFilter 语法
    #[validate(length(min = 1))]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

/// WebSocket 心跳：服务端按间隔发 ping，超过 间隔 + 超时 未收到任何帧即判定连接已死
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HeartbeatConfig {
    #[validate(range(min = 1))]
    pub ping_interval_ms: u64,
    #[validate(range(min = 1))]
    pub timeout_ms: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            ping_interval_ms: 25_000,
            timeout_ms: 20_000,
        }
    }
}

impl HeartbeatConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    /// ping 发出后等待任意来帧的宽限
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// 启动时预置到用户存储的档案
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct PresenceConfig {
    #[serde(default)]
    #[validate(nested)]
    pub seed_users: Vec<SeedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeedUser {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Figment(#[from] Box<figment::Error>),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut fig = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Ok(path) = std::env::var("APP_CONFIG_FILE") {
            if path.ends_with(".yml") || path.ends_with(".yaml") {
                fig = fig.merge(Yaml::file(path));
            } else if path.ends_with(".json") {
                fig = fig.merge(Json::file(path));
            } else {
                fig = fig.merge(Toml::file(path));
            }
        }
        fig = fig.merge(Env::prefixed("APP_").split("__"));

        Self::extract(fig)
    }

    /// 从 TOML/YAML/JSON 文本解析，缺省字段取默认值
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let fig = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        let trimmed = s.trim_start();
        let fig = if trimmed.starts_with('{') {
            fig.merge(Json::string(s))
        } else if trimmed.starts_with('[') || s.contains('=') {
            fig.merge(Toml::string(s))
        } else {
            fig.merge(Yaml::string(s))
        };

        Self::extract(fig)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn extract(fig: Figment) -> Result<Self, ConfigError> {
        let cfg: AppConfig = fig.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }
}
