// src/exclusion/dismissed.rs

use chrono::{DateTime, Duration, Utc};

use crate::exclusion::rule::ExclusionRule;
use crate::model::ad_event::{AdEvent, ConfirmationType};
use crate::model::creative_ad::{AdType, CreativeAd};

/// 在时间窗口内连续 dismiss 同一 campaign 两次（中间没有 click）则排除。
/// 窗口配置为 0 时规则整体停用（过滤结果恒为空集，永不排除）。
pub struct DismissedExclusionRule<'a> {
    ad_events: &'a [AdEvent],
    ad_type: AdType,
    window: Duration,
    now: DateTime<Utc>,
    last_message: String,
}

impl<'a> DismissedExclusionRule<'a> {
    pub fn new(
        ad_events: &'a [AdEvent],
        ad_type: AdType,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            ad_events,
            ad_type,
            window,
            now,
            last_message: String::new(),
        }
    }

    /// 按 campaign / 广告类型 / 时间窗口过滤后，按时间顺序统计 dismiss 连击
    fn dismiss_streak(&self, ad: &CreativeAd) -> u32 {
        let mut filtered: Vec<&AdEvent> = self
            .ad_events
            .iter()
            .filter(|event| {
                event.campaign_id == ad.campaign_id
                    && event.ad_type == self.ad_type
                    && self.now.signed_duration_since(event.created_at) <= self.window
                    && event.created_at <= self.now
            })
            .collect();
        filtered.sort_by_key(|event| event.created_at);

        let mut streak = 0;
        for event in filtered {
            match event.confirmation_type {
                ConfirmationType::Dismissed => streak += 1,
                ConfirmationType::Clicked => streak = 0,
                _ => {}
            }
        }
        streak
    }
}

impl ExclusionRule for DismissedExclusionRule<'_> {
    fn name(&self) -> &'static str {
        "dismissed"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.campaign_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        if self.window.is_zero() {
            return false;
        }

        if self.dismiss_streak(ad) >= 2 {
            self.last_message = format!(
                "campaignId {} has exceeded the dismissed frequency cap",
                ad.campaign_id
            );
            return true;
        }
        false
    }

    fn last_message(&self) -> &str {
        &self.last_message
    }
}
