//! 配置模块，负责加载JSON配置文件

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::page::{PageGuard, PageRequest};
use crate::translator::{FieldMapping, FieldType};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    NotFound(String),

    #[error("无法读取配置文件 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("无法解析JSON配置文件 {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("无效的URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("未知实体: {0}")]
    UnknownEntity(String),
}

/// 分页策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    pub max_page_size: u64,
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_page_size: 200,
            default_page_size: 20,
        }
    }
}

impl PaginationConfig {
    pub fn guard(&self) -> PageGuard {
        PageGuard::new(self.max_page_size)
    }

    /// 补齐缺省的页码与页大小，再应用页大小上限
    pub fn request(&self, page: Option<u64>, size: Option<u64>) -> PageRequest {
        let request = PageRequest::new(page.unwrap_or(0), size.unwrap_or(self.default_page_size));
        self.guard().clamp(request)
    }
}

/// 单个实体：存储表、资源路径与可查询字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub table: String,
    pub path: String,
    pub fields: FieldMapping,
}

/// 服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub base_url: String,
    #[serde(default)]
    pub pagination: PaginationConfig,
    pub entities: HashMap<String, EntityConfig>,
}

impl ServiceConfig {
    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let display = path_ref.display().to_string();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(ConfigError::NotFound(display));
        }

        // 读取文件内容
        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        // 解析JSON
        let config: ServiceConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: display.clone(),
            source,
        })?;

        log::debug!(
            "loaded {} entities from {} (max page size {})",
            config.entities.len(),
            display,
            config.pagination.max_page_size
        );
        Ok(config)
    }

    pub fn entity(&self, name: &str) -> Result<&EntityConfig, ConfigError> {
        self.entities
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEntity(name.to_string()))
    }

    /// 实体列表接口的绝对地址，用作分页链接的基础URI
    pub fn entity_url(&self, name: &str) -> Result<Url, ConfigError> {
        let entity = self.entity(name)?;
        let invalid = |source: url::ParseError| ConfigError::InvalidUrl {
            url: format!("{}{}", self.base_url, entity.path),
            source,
        };
        Url::parse(&self.base_url)
            .and_then(|base| base.join(&entity.path))
            .map_err(invalid)
    }
}

impl Default for ServiceConfig {
    /// 默认配置：profile 实体（用于测试或fallback）
    fn default() -> Self {
        let profile = EntityConfig {
            table: "profiles".to_string(),
            path: "/api/v1/profiles".to_string(),
            fields: FieldMapping::new()
                .insert("id", "id", FieldType::String)
                .insert("mail", "mail", FieldType::String)
                .insert("firstName", "first_name", FieldType::String)
                .insert("lastName", "last_name", FieldType::String)
                .insert("age", "age", FieldType::Number)
                .insert("active", "active", FieldType::Bool)
                .insert("birthDate", "birth_date", FieldType::Date)
                .insert("address.city", "city", FieldType::String),
        };

        let mut entities = HashMap::new();
        entities.insert("profile".to_string(), profile);

        Self {
            base_url: "http://localhost:8080".to_string(),
            pagination: PaginationConfig::default(),
            entities,
        }
    }
}
