// src/resource/subdivision.rs

use once_cell::sync::OnceCell;
use std::collections::HashSet;

use crate::resource::adapters::SubdivisionData;

/// subdivision 定向资源：当前客户端所在国家/行政区。
/// 与 anti-targeting 资源一样只在启动时加载，只读共享。
#[derive(Debug, Default)]
pub struct SubdivisionTargetingResource {
    country: String,
    subdivision: Option<String>,
    supported: Vec<String>,
    // 支持列表延迟构建为查找集合（teacher 对大字段也采用同样的 lazy 模式）
    supported_set: OnceCell<HashSet<String>>,
}

impl SubdivisionTargetingResource {
    pub fn new(data: SubdivisionData) -> Self {
        Self {
            country: data.country,
            subdivision: data.subdivision,
            supported: data.supported_subdivisions,
            supported_set: OnceCell::new(),
        }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// 当前生效的细分行政区编码，如 "US-CA"；未启用或不受支持时为 None
    pub fn active_subdivision(&self) -> Option<&str> {
        let code = self.subdivision.as_deref()?;
        if self.supported.is_empty() || self.supported_lookup().contains(code) {
            Some(code)
        } else {
            None
        }
    }

    fn supported_lookup(&self) -> &HashSet<String> {
        self.supported_set
            .get_or_init(|| self.supported.iter().cloned().collect())
    }
}
