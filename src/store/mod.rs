// src/store/mod.rs
//
// 外部协作方的异步边界：事件日志、浏览历史、广告目录都不归本核心所有，
// 管线每个阶段向对应 store 发起一次异步请求，在回调点恢复执行。

use anyhow::Result;
use async_trait::async_trait;

use crate::model::ad_event::{AdEventList, BrowsingHistoryList};
use crate::model::creative_ad::{AdDimensions, AdType, CreativeAd};

/// 广告事件日志（append-only，外部归属，这里只拿快照）
#[async_trait]
pub trait AdEventStore: Send + Sync {
    async fn ad_events(&self, ad_type: AdType) -> Result<AdEventList>;
}

/// 浏览历史 provider（条数与时效上限由调用方给定）
#[async_trait]
pub trait BrowsingHistoryProvider: Send + Sync {
    async fn browsing_history(
        &self,
        max_count: usize,
        max_age_days: u32,
    ) -> Result<BrowsingHistoryList>;
}

/// 创意广告目录（按定向分类取候选；untargeted 为无分类兜底库存）
#[async_trait]
pub trait CreativeAdStore: Send + Sync {
    async fn creative_ads_for_segments(
        &self,
        ad_type: AdType,
        segments: &[String],
        dimensions: Option<AdDimensions>,
    ) -> Result<Vec<CreativeAd>>;

    async fn untargeted_creative_ads(
        &self,
        ad_type: AdType,
        dimensions: Option<AdDimensions>,
    ) -> Result<Vec<CreativeAd>>;
}
