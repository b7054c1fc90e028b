// src/exclusion/subdivision.rs

use crate::exclusion::rule::ExclusionRule;
use crate::model::creative_ad::CreativeAd;
use crate::resource::SubdivisionTargetingResource;

/// 地域定向排除：geo_targets 为空不限地域；命中国家码或完整行政区码放行；
/// 只定向到具体行政区而本地未启用行政区定向时排除。
pub struct SubdivisionTargetingExclusionRule<'a> {
    resource: &'a SubdivisionTargetingResource,
    last_message: String,
}

impl<'a> SubdivisionTargetingExclusionRule<'a> {
    pub fn new(resource: &'a SubdivisionTargetingResource) -> Self {
        Self {
            resource,
            last_message: String::new(),
        }
    }
}

impl ExclusionRule for SubdivisionTargetingExclusionRule<'_> {
    fn name(&self) -> &'static str {
        "subdivision_targeting"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.campaign_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        if ad.geo_targets.is_empty() {
            return false;
        }

        let country = self.resource.country();
        let subdivision = self.resource.active_subdivision();

        let matched = ad.geo_targets.iter().any(|target| {
            target == country || subdivision.map(|code| target == code).unwrap_or(false)
        });

        if !matched {
            self.last_message = format!(
                "campaignId {} excluded as not within the targeted subdivision",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::adapters::SubdivisionData;

    fn resource(subdivision: Option<&str>) -> SubdivisionTargetingResource {
        SubdivisionTargetingResource::new(SubdivisionData {
            country: "US".to_string(),
            subdivision: subdivision.map(str::to_string),
            supported_subdivisions: vec!["US-CA".to_string()],
        })
    }

    fn ad_targeting(geo_targets: Vec<&str>) -> CreativeAd {
        CreativeAd {
            creative_instance_id: "a1".to_string(),
            campaign_id: "c1".to_string(),
            segment: "technology".to_string(),
            split_test_group: String::new(),
            geo_targets: geo_targets.into_iter().map(str::to_string).collect(),
            dayparts: Vec::new(),
            daily_cap: 0,
            total_max: 0,
            per_day: 0,
            per_week: 0,
            per_month: 0,
        }
    }

    #[test]
    fn untargeted_ad_is_always_allowed() {
        let resource = resource(None);
        let mut rule = SubdivisionTargetingExclusionRule::new(&resource);
        assert!(!rule.should_exclude(&ad_targeting(Vec::new())));
    }

    #[test]
    fn country_level_target_matches_without_subdivision() {
        let resource = resource(None);
        let mut rule = SubdivisionTargetingExclusionRule::new(&resource);
        assert!(!rule.should_exclude(&ad_targeting(vec!["US"])));
    }

    #[test]
    fn subdivision_target_requires_active_subdivision() {
        let resource = resource(None);
        let mut rule = SubdivisionTargetingExclusionRule::new(&resource);
        assert!(rule.should_exclude(&ad_targeting(vec!["US-CA"])));

        let resource = resource_with_active();
        let mut rule = SubdivisionTargetingExclusionRule::new(&resource);
        assert!(!rule.should_exclude(&ad_targeting(vec!["US-CA"])));
    }

    fn resource_with_active() -> SubdivisionTargetingResource {
        resource(Some("US-CA"))
    }

    #[test]
    fn foreign_targets_are_excluded() {
        let resource = resource(Some("US-CA"));
        let mut rule = SubdivisionTargetingExclusionRule::new(&resource);
        assert!(rule.should_exclude(&ad_targeting(vec!["GB", "US-NY"])));
    }
}
