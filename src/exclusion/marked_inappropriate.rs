// src/exclusion/marked_inappropriate.rs

use std::collections::HashSet;

use crate::exclusion::rule::ExclusionRule;
use crate::model::creative_ad::CreativeAd;

/// 用户标记为"不当内容"的 campaign 一律排除
pub struct MarkedAsInappropriateExclusionRule {
    flagged_campaign_ids: HashSet<String>,
    last_message: String,
}

impl MarkedAsInappropriateExclusionRule {
    pub fn new(flagged_campaign_ids: HashSet<String>) -> Self {
        Self {
            flagged_campaign_ids,
            last_message: String::new(),
        }
    }
}

impl ExclusionRule for MarkedAsInappropriateExclusionRule {
    fn name(&self) -> &'static str {
        "marked_as_inappropriate"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.campaign_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        if self.flagged_campaign_ids.contains(&ad.campaign_id) {
            self.last_message = format!(
                "campaignId {} excluded as marked as inappropriate",
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
