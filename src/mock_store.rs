// src/mock_store.rs
//
// 演示用的内存协作方：事件日志、浏览历史、广告目录都在进程内模拟，
// 并带 5~20ms 随机延迟以贴近真实 store 的异步取数。

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use rand::Rng;
use std::sync::Mutex;
use tokio::time::sleep;
use uuid::Uuid;

use crate::model::ad_event::{AdEvent, AdEventList, BrowsingHistoryList, ConfirmationType};
use crate::model::creative_ad::{AdDimensions, AdType, CreativeAd};
use crate::store::{AdEventStore, BrowsingHistoryProvider, CreativeAdStore};

async fn simulate_store_latency() {
    let delay_ms = rand::thread_rng().gen_range(5..20);
    sleep(tokio::time::Duration::from_millis(delay_ms)).await;
}

/// 内存事件日志
pub struct InMemoryAdEventStore {
    events: Mutex<AdEventList>,
}

impl InMemoryAdEventStore {
    pub fn new(events: AdEventList) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }

    pub fn append(&self, event: AdEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl AdEventStore for InMemoryAdEventStore {
    async fn ad_events(&self, ad_type: AdType) -> Result<AdEventList> {
        simulate_store_latency().await;
        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .filter(|event| event.ad_type == ad_type)
            .cloned()
            .collect())
    }
}

/// 内存浏览历史
pub struct InMemoryBrowsingHistory {
    history: BrowsingHistoryList,
}

impl InMemoryBrowsingHistory {
    pub fn new(history: BrowsingHistoryList) -> Self {
        Self { history }
    }
}

#[async_trait]
impl BrowsingHistoryProvider for InMemoryBrowsingHistory {
    async fn browsing_history(
        &self,
        max_count: usize,
        _max_age_days: u32,
    ) -> Result<BrowsingHistoryList> {
        simulate_store_latency().await;
        Ok(self.history.iter().take(max_count).cloned().collect())
    }
}

/// 内存广告目录，untargeted 库存用空 segment 表示
pub struct InMemoryCreativeAdStore {
    catalog: Vec<CreativeAd>,
}

impl InMemoryCreativeAdStore {
    pub fn new(catalog: Vec<CreativeAd>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl CreativeAdStore for InMemoryCreativeAdStore {
    async fn creative_ads_for_segments(
        &self,
        _ad_type: AdType,
        segments: &[String],
        _dimensions: Option<AdDimensions>,
    ) -> Result<Vec<CreativeAd>> {
        simulate_store_latency().await;
        Ok(self
            .catalog
            .iter()
            .filter(|ad| segments.contains(&ad.segment))
            .cloned()
            .collect())
    }

    async fn untargeted_creative_ads(
        &self,
        _ad_type: AdType,
        _dimensions: Option<AdDimensions>,
    ) -> Result<Vec<CreativeAd>> {
        simulate_store_latency().await;
        Ok(self
            .catalog
            .iter()
            .filter(|ad| ad.segment.is_empty())
            .cloned()
            .collect())
    }
}

/// 使用 proptest 生成随机创意广告
/// 分类从固定池子里选（含空字符串代表 untargeted 库存）；
/// 各项频控上限在小范围内生成；id 用 UUID 占位，init 时统一换成 v4
fn generate_creative_ad() -> impl Strategy<Value = CreativeAd> {
    (
        prop::sample::select(vec![
            "technology-computing".to_string(),
            "technology-gaming".to_string(),
            "travel-europe".to_string(),
            "travel".to_string(),
            "food".to_string(),
            String::new(),
        ]),
        1..5u32,  // daily_cap
        5..20u32, // total_max
        1..4u32,  // per_day
    )
        .prop_map(|(segment, daily_cap, total_max, per_day)| CreativeAd {
            creative_instance_id: String::new(),
            campaign_id: String::new(),
            segment,
            split_test_group: String::new(),
            geo_targets: Vec::new(),
            dayparts: Vec::new(),
            daily_cap,
            total_max,
            per_day,
            per_week: per_day * 5,
            per_month: per_day * 20,
        })
}

/// 生成 8~16 条创意的随机目录，campaign 两两一组共享频控
fn generate_catalog() -> impl Strategy<Value = Vec<CreativeAd>> {
    prop::collection::vec(generate_creative_ad(), 8..16).prop_map(|mut ads| {
        for (i, ad) in ads.iter_mut().enumerate() {
            ad.creative_instance_id = Uuid::new_v4().to_string();
            ad.campaign_id = format!("campaign-{}", i / 2 + 1);
        }
        ads
    })
}

/// 初始化并打印随机目录（演示服务启动时调用）
pub fn init_catalog() -> Vec<CreativeAd> {
    let mut runner = proptest::test_runner::TestRunner::default();
    let catalog = generate_catalog()
        .new_tree(&mut runner)
        .unwrap()
        .current();

    println!("Generated mock catalog with {} creative ads", catalog.len());
    for ad in &catalog {
        println!(
            "creativeInstanceId: {}, campaignId: {}, segment: {:?}, dailyCap: {}",
            ad.creative_instance_id, ad.campaign_id, ad.segment, ad.daily_cap
        );
    }
    catalog
}

/// 给目录里前几条 campaign 造一点历史事件，让频控规则在演示里真正生效
pub fn seed_ad_events(catalog: &[CreativeAd]) -> AdEventList {
    let now = Utc::now();
    let mut events = Vec::new();
    for ad in catalog.iter().take(3) {
        events.push(AdEvent::new(
            AdType::NotificationAd,
            ConfirmationType::Viewed,
            &ad.campaign_id,
            &ad.creative_instance_id,
            now - Duration::hours(rand::thread_rng().gen_range(1..48)),
        ));
    }
    events
}
