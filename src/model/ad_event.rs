// src/model/ad_event.rs

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::model::creative_ad::AdType;

/// 广告生命周期事件类型
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationType {
    Served,
    Viewed,
    Clicked,
    Dismissed,
    Transferred,
    Conversion,
}

/// 广告事件（append-only 日志中的一条记录，排除规则只读时间窗口内的切片）
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdEvent {
    pub ad_type: AdType,
    pub confirmation_type: ConfirmationType,
    pub campaign_id: String,
    pub creative_instance_id: String,
    pub created_at: DateTime<Utc>,
}

impl AdEvent {
    pub fn new(
        ad_type: AdType,
        confirmation_type: ConfirmationType,
        campaign_id: &str,
        creative_instance_id: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ad_type,
            confirmation_type,
            campaign_id: campaign_id.to_string(),
            creative_instance_id: creative_instance_id.to_string(),
            created_at,
        }
    }
}

/// 一次 serving 评估拿到的事件快照
pub type AdEventList = Vec<AdEvent>;

/// 浏览历史（最近访问的 URL 列表，由外部 provider 限制条数与时效）
pub type BrowsingHistoryList = Vec<String>;
