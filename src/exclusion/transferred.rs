// src/exclusion/transferred.rs

use chrono::{DateTime, Duration, Utc};

use crate::exclusion::rule::ExclusionRule;
use crate::model::ad_event::{AdEvent, ConfirmationType};
use crate::model::creative_ad::{AdType, CreativeAd};

/// 窗口内该 campaign 已发生过 Transferred（用户已跳转落地页）则排除。
/// 窗口配置为 0 时规则停用。
pub struct TransferredExclusionRule<'a> {
    ad_events: &'a [AdEvent],
    ad_type: AdType,
    window: Duration,
    now: DateTime<Utc>,
    last_message: String,
}

impl<'a> TransferredExclusionRule<'a> {
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
}

impl ExclusionRule for TransferredExclusionRule<'_> {
    fn name(&self) -> &'static str {
        "transferred"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.campaign_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        if self.window.is_zero() {
            return false;
        }

        let transferred = self.ad_events.iter().any(|event| {
            event.ad_type == self.ad_type
                && event.confirmation_type == ConfirmationType::Transferred
                && event.campaign_id == ad.campaign_id
                && event.created_at <= self.now
                && self.now.signed_duration_since(event.created_at) <= self.window
        });

        if transferred {
            self.last_message = format!(
                "campaignId {} has exceeded the transferred frequency cap",
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
