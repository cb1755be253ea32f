use std::collections::HashMap;
use std::sync::Arc;

use crate::core::config::{AppConfig, NetworkConfig, SiteConfig};
use crate::interfaces::{Fetcher, MetadataSource};

pub mod jinjiang;

// ============================================================================
// 元数据源注册表
// ============================================================================

type SourceFactory =
    Box<dyn Fn(SiteConfig, &NetworkConfig, Arc<dyn Fetcher>) -> Box<dyn MetadataSource> + Send + Sync>;

pub struct SourceRegistry {
    factories: HashMap<String, SourceFactory>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register(jinjiang::PROVIDER_ID, |cfg, net, fetcher| {
            Box::new(jinjiang::Jinjiang::new(cfg, net, fetcher))
        });
        registry
    }

    pub fn register<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(SiteConfig, &NetworkConfig, Arc<dyn Fetcher>) -> Box<dyn MetadataSource>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(id.to_string(), Box::new(factory));
    }

    /// 按标识创建元数据源，站点配置取自 `config.sites`
    pub fn create(
        &self,
        id: &str,
        config: &AppConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> Option<Box<dyn MetadataSource>> {
        self.factories
            .get(id)
            .map(|f| f(config.site(id), &config.network, fetcher))
    }

    pub fn list(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
