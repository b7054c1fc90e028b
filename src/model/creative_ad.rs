// src/model/creative_ad.rs

use serde::{Serialize, Deserialize};
use std::convert::TryFrom;

/// 广告位类型（每种类型对应一条独立的 serving 管线）
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum AdType {
    NotificationAd = 1,
    InlineContentAd = 2,
    NewTabPageAd = 3,
}

impl TryFrom<u8> for AdType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AdType::NotificationAd),
            2 => Ok(AdType::InlineContentAd),
            3 => Ok(AdType::NewTabPageAd),
            _ => Err(format!("Invalid value for AdType: {}", value)),
        }
    }
}

impl From<AdType> for u8 {
    fn from(ad_type: AdType) -> Self {
        ad_type as u8
    }
}

/// 投放时段（一周内允许展示的时间窗口，分钟精度）
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Daypart {
    pub days_of_week: Vec<u32>, // 0 = 周日, 1 = 周一, ... 6 = 周六
    pub start_minute: u32,      // 当天起始分钟（含）
    pub end_minute: u32,        // 当天结束分钟（含）
}

/// 创意广告（一次 serving 决策期间只读借用，归属外部广告目录）
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreativeAd {
    pub creative_instance_id: String, // 创意实例唯一标识
    pub campaign_id: String,          // 同一 campaign 共享频控计数
    pub segment: String,              // 定向分类，层级用 "-" 分隔，如 "technology-computing"
    pub split_test_group: String,     // 分组实验标识，空字符串表示不参与实验
    pub geo_targets: Vec<String>,     // 地域定向，如 "US" 或 "US-CA"，空表示不限
    pub dayparts: Vec<Daypart>,       // 投放时段，空表示全天可投
    pub daily_cap: u32,               // campaign 级单日展示上限，0 表示不限
    pub total_max: u32,               // campaign 级累计展示上限，0 表示不限
    pub per_day: u32,                 // 创意级单日上限，0 表示不限
    pub per_week: u32,                // 创意级单周上限，0 表示不限
    pub per_month: u32,               // 创意级单月上限，0 表示不限
}

/// 广告展示尺寸（inline-content 广告位请求时携带）
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdDimensions {
    pub width: u32,
    pub height: u32,
}

impl AdDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
