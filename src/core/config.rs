//! 配置管理系统 (Configuration Management)
//!
//! 负责 `config.toml` 与环境变量的反序列化，缺省字段回退到内置默认值。

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use bon::Builder;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::core::error::{Result, SourceError};

/// 全局应用配置
#[derive(Debug, Deserialize, Builder, Clone, Default)]
pub struct AppConfig {
    /// 网络层通用参数
    #[serde(default)]
    #[builder(default)]
    pub network: NetworkConfig,

    /// 站点特定配置覆盖映射
    #[serde(default)]
    #[builder(default)]
    pub sites: HashMap<String, SiteConfig>,
}

/// 网络参数
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct NetworkConfig {
    #[serde(default = "default_user_agent")]
    #[builder(default = default_user_agent(), into)]
    pub user_agent: String,
    /// 单次请求超时 (秒)
    #[serde(default = "default_timeout_secs")]
    #[builder(default = default_timeout_secs())]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    #[builder(default = default_connect_timeout_secs())]
    pub connect_timeout_secs: u64,
    /// 下载封面前的固定间隔 (毫秒)，用于避开站点的防刷机制
    #[serde(default = "default_pacing_ms")]
    #[builder(default = default_pacing_ms())]
    pub pacing_ms: u64,
}

/// 站点特定配置覆盖
#[derive(Debug, Deserialize, Builder, Clone, Default)]
pub struct SiteConfig {
    /// 自定义域名 (用于镜像站点或本地测试)
    #[builder(into)]
    pub base_url: Option<String>,
    /// 封面图片域名
    #[builder(into)]
    pub image_base_url: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_pacing_ms() -> u64 {
    1000
}

impl AppConfig {
    /// 从工作目录下的 `config.toml` 及 `JINJIANG__*` 环境变量加载配置
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let builder = Config::builder();

        let builder = if config_path.exists() {
            builder.add_source(File::from(config_path))
        } else {
            builder
        };

        let settings = builder
            .add_source(Environment::with_prefix("JINJIANG").separator("__"))
            .build()
            .map_err(SourceError::Config)?;
        settings.try_deserialize().map_err(SourceError::Config)
    }

    /// 取站点配置，未配置时使用默认值
    pub fn site(&self, id: &str) -> SiteConfig {
        self.sites.get(id).cloned().unwrap_or_default()
    }
}
