// src/exclusion/split_test.rs

use crate::exclusion::rule::ExclusionRule;
use crate::model::creative_ad::CreativeAd;

/// 分组实验排除：未分组的广告对所有客户端可见，
/// 分了组的广告只对同组客户端可见。
pub struct SplitTestExclusionRule {
    group: Option<String>, // 本客户端所属实验分组
    last_message: String,
}

impl SplitTestExclusionRule {
    pub fn new(group: Option<String>) -> Self {
        Self {
            group,
            last_message: String::new(),
        }
    }
}

impl ExclusionRule for SplitTestExclusionRule {
    fn name(&self) -> &'static str {
        "split_test"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.creative_instance_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        if ad.split_test_group.is_empty() {
            return false;
        }

        let matched = self
            .group
            .as_deref()
            .map(|group| group == ad.split_test_group)
            .unwrap_or(false);

        if !matched {
            self.last_message = format!(
                "creativeInstanceId {} excluded as not within the split test group",
                ad.creative_instance_id
            );
            return true;
        }
        false
    }

    fn last_message(&self) -> &str {
        &self.last_message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad_in_group(group: &str) -> CreativeAd {
        CreativeAd {
            creative_instance_id: "a1".to_string(),
            campaign_id: "c1".to_string(),
            segment: "technology".to_string(),
            split_test_group: group.to_string(),
            geo_targets: Vec::new(),
            dayparts: Vec::new(),
            daily_cap: 0,
            total_max: 0,
            per_day: 0,
            per_week: 0,
            per_month: 0,
        }
    }

    #[test]
    fn ungrouped_ads_are_visible_to_everyone() {
        let mut rule = SplitTestExclusionRule::new(None);
        assert!(!rule.should_exclude(&ad_in_group("")));

        let mut rule = SplitTestExclusionRule::new(Some("GroupA".to_string()));
        assert!(!rule.should_exclude(&ad_in_group("")));
    }

    #[test]
    fn grouped_ads_require_a_matching_client_group() {
        let mut rule = SplitTestExclusionRule::new(Some("GroupA".to_string()));
        assert!(!rule.should_exclude(&ad_in_group("GroupA")));
        assert!(rule.should_exclude(&ad_in_group("GroupB")));

        let mut rule = SplitTestExclusionRule::new(None);
        assert!(rule.should_exclude(&ad_in_group("GroupA")));
    }
}
