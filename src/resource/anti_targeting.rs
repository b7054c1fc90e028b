// src/resource/anti_targeting.rs

use std::collections::HashMap;

use crate::model::segment;
use crate::resource::adapters::AntiTargetingData;

/// anti-targeting 资源：分类 -> 与该分类反相关的站点 host 列表。
/// 进程启动时加载一次，之后以只读快照被所有并发 serving 共享，绝不就地更新。
#[derive(Debug, Clone, Default)]
pub struct AntiTargetingResource {
    sites_by_segment: HashMap<String, Vec<String>>,
}

impl AntiTargetingResource {
    pub fn new(data: AntiTargetingData) -> Self {
        Self {
            sites_by_segment: data.sites_by_segment,
        }
    }

    /// 给定广告分类，汇总所有命中条目（含顶层父分类）的站点列表
    pub fn sites_for_segment(&self, ad_segment: &str) -> Vec<&str> {
        let mut sites = Vec::new();
        for (entry_segment, entry_sites) in &self.sites_by_segment {
            if segment::segment_matches(ad_segment, entry_segment) {
                sites.extend(entry_sites.iter().map(String::as_str));
            }
        }
        sites
    }

    pub fn is_empty(&self) -> bool {
        self.sites_by_segment.is_empty()
    }
}
