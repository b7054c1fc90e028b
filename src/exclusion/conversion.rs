// src/exclusion/conversion.rs

use chrono::{DateTime, Utc};

use crate::exclusion::rule::ExclusionRule;
use crate::model::ad_event::{AdEvent, ConfirmationType};
use crate::model::creative_ad::{AdType, CreativeAd};

/// 已转化的 campaign 不再投放（终身窗口）
pub struct ConversionExclusionRule<'a> {
    ad_events: &'a [AdEvent],
    ad_type: AdType,
    now: DateTime<Utc>,
    last_message: String,
}

impl<'a> ConversionExclusionRule<'a> {
    pub fn new(ad_events: &'a [AdEvent], ad_type: AdType, now: DateTime<Utc>) -> Self {
        Self {
            ad_events,
            ad_type,
            now,
            last_message: String::new(),
        }
    }
}

impl ExclusionRule for ConversionExclusionRule<'_> {
    fn name(&self) -> &'static str {
        "conversion"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.campaign_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        let converted = self.ad_events.iter().any(|event| {
            event.ad_type == self.ad_type
                && event.confirmation_type == ConfirmationType::Conversion
                && event.campaign_id == ad.campaign_id
                && event.created_at <= self.now
        });

        if converted {
            self.last_message =
                format!("campaignId {} excluded as already converted", ad.campaign_id);
            return true;
        }
        false
    }

    fn last_message(&self) -> &str {
        &self.last_message
    }
}
