// src/exclusion/chain.rs

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::info;

use crate::config::ServingConfig;
use crate::exclusion::anti_targeting::AntiTargetingExclusionRule;
use crate::exclusion::caps::{
    CreativeCapExclusionRule, DailyCapExclusionRule, PerHourExclusionRule, TotalMaxExclusionRule,
};
use crate::exclusion::conversion::ConversionExclusionRule;
use crate::exclusion::daypart::DaypartExclusionRule;
use crate::exclusion::dismissed::DismissedExclusionRule;
use crate::exclusion::marked_inappropriate::MarkedAsInappropriateExclusionRule;
use crate::exclusion::rule::ExclusionRule;
use crate::exclusion::split_test::SplitTestExclusionRule;
use crate::exclusion::subdivision::SubdivisionTargetingExclusionRule;
use crate::exclusion::transferred::TransferredExclusionRule;
use crate::model::ad_event::{AdEventList, BrowsingHistoryList};
use crate::model::creative_ad::{AdType, CreativeAd};
use crate::resource::{AntiTargetingResource, SubdivisionTargetingResource};

/// 排除规则链：按固定顺序持有一条管线的全部规则，首个命中的规则短路返回。
///
/// 借用的事件快照 / 浏览历史 / 资源在链的整个生命周期内必须有效；
/// 链本身（连同缓存）只活一次过滤扫描，绝不跨 serving 复用——
/// 事件历史在两次 serving 之间会变化。
pub struct ExclusionRuleChain<'a> {
    rules: Vec<Box<dyn ExclusionRule + 'a>>,
    // 每条规则一份 per-sweep 备忘：uuid -> 上次决策。
    // 同一 campaign 下的多个创意共享 uuid，不必重复评估。
    cache: Vec<HashMap<String, bool>>,
}

impl<'a> ExclusionRuleChain<'a> {
    pub fn new(
        ad_type: AdType,
        config: &ServingConfig,
        ad_events: &'a AdEventList,
        browsing_history: &'a BrowsingHistoryList,
        anti_targeting: &'a AntiTargetingResource,
        subdivision: &'a SubdivisionTargetingResource,
        now: DateTime<Utc>,
    ) -> Self {
        let rules: Vec<Box<dyn ExclusionRule + 'a>> = vec![
            Box::new(SplitTestExclusionRule::new(config.split_test_group.clone())),
            Box::new(SubdivisionTargetingExclusionRule::new(subdivision)),
            Box::new(AntiTargetingExclusionRule::new(
                anti_targeting,
                browsing_history,
                config.anti_targeting_site_cap,
            )),
            Box::new(MarkedAsInappropriateExclusionRule::new(
                config.flagged_campaign_ids.clone(),
            )),
            Box::new(ConversionExclusionRule::new(ad_events, ad_type, now)),
            Box::new(TransferredExclusionRule::new(
                ad_events,
                ad_type,
                Duration::hours(config.transferred_window_hours),
                now,
            )),
            Box::new(DismissedExclusionRule::new(
                ad_events,
                ad_type,
                Duration::hours(config.dismissed_window_hours),
                now,
            )),
            Box::new(TotalMaxExclusionRule::new(ad_events, ad_type, now)),
            Box::new(DailyCapExclusionRule::new(ad_events, ad_type, now)),
            Box::new(PerHourExclusionRule::new(
                ad_events,
                ad_type,
                config.per_hour_cap,
                now,
            )),
            Box::new(CreativeCapExclusionRule::per_day(ad_events, ad_type, now)),
            Box::new(CreativeCapExclusionRule::per_week(ad_events, ad_type, now)),
            Box::new(CreativeCapExclusionRule::per_month(ad_events, ad_type, now)),
            Box::new(DaypartExclusionRule::new(now)),
        ];

        Self::with_rules(rules)
    }

    /// 测试与定制入口：直接给定规则列表
    pub fn with_rules(rules: Vec<Box<dyn ExclusionRule + 'a>>) -> Self {
        let cache = rules.iter().map(|_| HashMap::new()).collect();
        Self { rules, cache }
    }

    /// 按顺序评估所有规则，首个排除即返回 true 并记录该规则的诊断信息
    pub fn should_exclude_creative_ad(&mut self, ad: &CreativeAd) -> bool {
        for (index, rule) in self.rules.iter_mut().enumerate() {
            let uuid = rule.uuid(ad);

            // 本次扫描内同一 uuid 只评估一次，命中缓存直接复用
            let excluded = match self.cache[index].get(&uuid).copied() {
                Some(cached) => cached,
                None => {
                    let decision = rule.should_exclude(ad);
                    self.cache[index].insert(uuid, decision);
                    decision
                }
            };

            if excluded {
                info!(
                    rule = rule.name(),
                    creative_instance_id = %ad.creative_instance_id,
                    "{}",
                    rule.last_message()
                );
                return true;
            }
        }
        false
    }

    /// 过滤一批候选，保留未被任何规则排除的广告
    pub fn filter_creative_ads(&mut self, candidates: Vec<CreativeAd>) -> Vec<CreativeAd> {
        candidates
            .into_iter()
            .filter(|ad| !self.should_exclude_creative_ad(ad))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 带调用计数的测试替身规则
    struct CountingRule {
        name: &'static str,
        exclude: bool,
        invocations: std::rc::Rc<std::cell::Cell<u32>>,
    }

    impl ExclusionRule for CountingRule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn uuid(&self, ad: &CreativeAd) -> String {
            ad.campaign_id.clone()
        }

        fn should_exclude(&mut self, _ad: &CreativeAd) -> bool {
            self.invocations.set(self.invocations.get() + 1);
            self.exclude
        }

        fn last_message(&self) -> &str {
            "excluded by counting rule"
        }
    }

    fn test_ad(creative_instance_id: &str, campaign_id: &str) -> CreativeAd {
        CreativeAd {
            creative_instance_id: creative_instance_id.to_string(),
            campaign_id: campaign_id.to_string(),
            segment: "technology".to_string(),
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

    // P5：同一 campaign 的两个创意，同一规则在一次扫描内只被调用一次
    #[test]
    fn cache_prevents_reevaluation_within_one_sweep() {
        let invocations = std::rc::Rc::new(std::cell::Cell::new(0));
        let rule = CountingRule {
            name: "counting",
            exclude: false,
            invocations: invocations.clone(),
        };
        let mut chain = ExclusionRuleChain::with_rules(vec![Box::new(rule)]);

        assert!(!chain.should_exclude_creative_ad(&test_ad("a1", "c1")));
        assert!(!chain.should_exclude_creative_ad(&test_ad("a2", "c1")));
        assert_eq!(invocations.get(), 1);
    }

    #[test]
    fn cached_exclusion_applies_to_campaign_siblings() {
        let invocations = std::rc::Rc::new(std::cell::Cell::new(0));
        let rule = CountingRule {
            name: "counting",
            exclude: true,
            invocations: invocations.clone(),
        };
        let mut chain = ExclusionRuleChain::with_rules(vec![Box::new(rule)]);

        assert!(chain.should_exclude_creative_ad(&test_ad("a1", "c1")));
        assert!(chain.should_exclude_creative_ad(&test_ad("a2", "c1")));
        assert_eq!(invocations.get(), 1);
    }

    // 不同规则的缓存互不串扰：前一条规则的 false 不能挡住后一条规则
    #[test]
    fn cache_is_scoped_per_rule() {
        let first_invocations = std::rc::Rc::new(std::cell::Cell::new(0));
        let second_invocations = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut chain = ExclusionRuleChain::with_rules(vec![
            Box::new(CountingRule {
                name: "first",
                exclude: false,
                invocations: first_invocations.clone(),
            }),
            Box::new(CountingRule {
                name: "second",
                exclude: true,
                invocations: second_invocations.clone(),
            }),
        ]);

        assert!(chain.should_exclude_creative_ad(&test_ad("a1", "c1")));
        assert_eq!(first_invocations.get(), 1);
        assert_eq!(second_invocations.get(), 1);
    }

    // P6：固定规则顺序与输入下结果幂等
    #[test]
    fn chain_is_deterministic_under_repeated_calls() {
        let invocations = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut chain = ExclusionRuleChain::with_rules(vec![
            Box::new(CountingRule {
                name: "first",
                exclude: false,
                invocations: invocations.clone(),
            }),
            Box::new(CountingRule {
                name: "second",
                exclude: true,
                invocations: invocations.clone(),
            }),
        ]);

        let ad = test_ad("a1", "c1");
        let first = chain.should_exclude_creative_ad(&ad);
        let second = chain.should_exclude_creative_ad(&ad);
        let third = chain.should_exclude_creative_ad(&ad);
        assert!(first && second && third);
    }

    #[test]
    fn filter_keeps_only_surviving_ads() {
        struct ExcludeCampaign(&'static str);
        impl ExclusionRule for ExcludeCampaign {
            fn name(&self) -> &'static str {
                "exclude_campaign"
            }
            fn uuid(&self, ad: &CreativeAd) -> String {
                ad.campaign_id.clone()
            }
            fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
                ad.campaign_id == self.0
            }
            fn last_message(&self) -> &str {
                "campaign is blocked"
            }
        }

        let mut chain = ExclusionRuleChain::with_rules(vec![Box::new(ExcludeCampaign("c1"))]);
        let survivors = chain.filter_creative_ads(vec![
            test_ad("a1", "c1"),
            test_ad("a2", "c2"),
            test_ad("a3", "c1"),
        ]);

        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].campaign_id, "c2");
    }
}
