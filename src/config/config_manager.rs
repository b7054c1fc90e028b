// src/config/config_manager.rs

use serde::{Serialize, Deserialize};
use std::collections::HashSet;

/// 管线版本（灰度期间多版本并存，差异只体现在候选获取与选优阶段）
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVersion {
    V1, // 三级分类回退，返回全部过滤结果，不做选优
    V2, // 三级分类回退 + predictor 单胜出
    V3, // 单级直查（child + parent 合并一次取数）+ predictor 单胜出
}

impl PipelineVersion {
    /// 是否启用 child -> parent -> untargeted 的三级回退
    pub fn uses_segment_fallback(&self) -> bool {
        matches!(self, PipelineVersion::V1 | PipelineVersion::V2)
    }

    /// 过滤之后是否调用 predictor 选出单一胜出广告
    pub fn predicts_winner(&self) -> bool {
        matches!(self, PipelineVersion::V2 | PipelineVersion::V3)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineVersion::V1 => "v1",
            PipelineVersion::V2 => "v2",
            PipelineVersion::V3 => "v3",
        }
    }
}

impl std::str::FromStr for PipelineVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(PipelineVersion::V1),
            "v2" => Ok(PipelineVersion::V2),
            "v3" => Ok(PipelineVersion::V3),
            _ => Err(format!("Invalid pipeline version: {}", s)),
        }
    }
}

/// serving 配置（feature-flag 等价物，进程启动时定型，之后只读共享）
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServingConfig {
    pub version: PipelineVersion,
    pub dismissed_window_hours: i64,    // 0 表示关闭 dismissed 排除规则
    pub transferred_window_hours: i64,  // 0 表示关闭 transferred 排除规则
    pub per_hour_cap: u32,              // 创意级每小时展示上限
    pub anti_targeting_site_cap: usize, // 浏览历史命中站点数超过该值才排除
    pub browsing_history_max_count: usize,
    pub browsing_history_max_age_days: u32,
    pub split_test_group: Option<String>, // 本客户端所属的分组实验
    pub flagged_campaign_ids: HashSet<String>, // 被用户标记为不当的 campaign
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            version: PipelineVersion::V2,
            dismissed_window_hours: 48,
            transferred_window_hours: 48,
            per_hour_cap: 1,
            anti_targeting_site_cap: 0,
            browsing_history_max_count: 5000,
            browsing_history_max_age_days: 180,
            split_test_group: None,
            flagged_campaign_ids: HashSet::new(),
        }
    }
}
