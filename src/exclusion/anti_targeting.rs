// src/exclusion/anti_targeting.rs

use url::Url;

use crate::exclusion::rule::ExclusionRule;
use crate::model::ad_event::BrowsingHistoryList;
use crate::model::creative_ad::CreativeAd;
use crate::resource::AntiTargetingResource;

/// 浏览历史命中了该广告分类的反相关站点（超过配置上限）则排除：
/// 用户访问过与该分类反相关的站点，说明这类广告不应投给他。
pub struct AntiTargetingExclusionRule<'a> {
    resource: &'a AntiTargetingResource,
    browsing_history: &'a BrowsingHistoryList,
    site_cap: usize,
    last_message: String,
}

impl<'a> AntiTargetingExclusionRule<'a> {
    pub fn new(
        resource: &'a AntiTargetingResource,
        browsing_history: &'a BrowsingHistoryList,
        site_cap: usize,
    ) -> Self {
        Self {
            resource,
            browsing_history,
            site_cap,
            last_message: String::new(),
        }
    }

    fn history_hits(&self, sites: &[&str]) -> usize {
        self.browsing_history
            .iter()
            .filter(|visited| {
                let host = Url::parse(visited)
                    .ok()
                    .and_then(|url| url.host_str().map(str::to_string));
                match host {
                    Some(host) => sites
                        .iter()
                        .any(|site| host == *site || host.ends_with(&format!(".{}", site))),
                    None => false,
                }
            })
            .count()
    }
}

impl ExclusionRule for AntiTargetingExclusionRule<'_> {
    fn name(&self) -> &'static str {
        "anti_targeting"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.campaign_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        if self.resource.is_empty() || self.browsing_history.is_empty() {
            return false;
        }

        let sites = self.resource.sites_for_segment(&ad.segment);
        if sites.is_empty() {
            return false;
        }

        let hits = self.history_hits(&sites);
        if hits > self.site_cap {
            self.last_message = format!(
                "campaignId {} excluded due to anti-targeting ({} browsing history matches)",
                ad.campaign_id, hits
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
    use crate::resource::adapters::AntiTargetingData;
    use std::collections::HashMap;

    fn resource() -> AntiTargetingResource {
        let mut sites_by_segment = HashMap::new();
        sites_by_segment.insert(
            "technology".to_string(),
            vec!["rival-tech.example".to_string()],
        );
        AntiTargetingResource::new(AntiTargetingData { sites_by_segment })
    }

    fn test_ad(segment: &str) -> CreativeAd {
        CreativeAd {
            creative_instance_id: "a1".to_string(),
            campaign_id: "c1".to_string(),
            segment: segment.to_string(),
            split_test_group: String::new(),
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
    fn excludes_when_history_matches_anti_targeted_site() {
        let resource = resource();
        let history = vec![
            "https://www.rival-tech.example/reviews".to_string(),
            "https://unrelated.example/".to_string(),
        ];
        let mut rule = AntiTargetingExclusionRule::new(&resource, &history, 0);

        assert!(rule.should_exclude(&test_ad("technology-computing")));
    }

    #[test]
    fn allows_when_history_never_matches() {
        let resource = resource();
        let history = vec!["https://unrelated.example/".to_string()];
        let mut rule = AntiTargetingExclusionRule::new(&resource, &history, 0);

        assert!(!rule.should_exclude(&test_ad("technology-computing")));
    }

    #[test]
    fn cap_tolerates_hits_up_to_the_limit() {
        let resource = resource();
        let history = vec!["https://rival-tech.example/".to_string()];
        let mut rule = AntiTargetingExclusionRule::new(&resource, &history, 1);

        assert!(!rule.should_exclude(&test_ad("technology-computing")));
    }

    #[test]
    fn empty_history_excludes_nothing() {
        let resource = resource();
        let history = Vec::new();
        let mut rule = AntiTargetingExclusionRule::new(&resource, &history, 0);

        assert!(!rule.should_exclude(&test_ad("technology")));
    }
}
