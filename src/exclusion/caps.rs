// src/exclusion/caps.rs
//
// 频控排除规则：campaign 级（daily_cap / total_max）与创意级
// （per_day / per_week / per_month / per_hour）都只统计 Viewed 事件。

use chrono::{DateTime, Duration, Utc};

use crate::exclusion::rule::ExclusionRule;
use crate::model::ad_event::{AdEvent, ConfirmationType};
use crate::model::creative_ad::{AdType, CreativeAd};

/// 统计窗口内某 campaign 的 Viewed 次数；window 为 None 表示不限窗口
fn viewed_count_for_campaign(
    ad_events: &[AdEvent],
    ad_type: AdType,
    campaign_id: &str,
    window: Option<Duration>,
    now: DateTime<Utc>,
) -> u32 {
    ad_events
        .iter()
        .filter(|event| {
            event.ad_type == ad_type
                && event.confirmation_type == ConfirmationType::Viewed
                && event.campaign_id == campaign_id
                && event.created_at <= now
                && window
                    .map(|w| now.signed_duration_since(event.created_at) <= w)
                    .unwrap_or(true)
        })
        .count() as u32
}

/// 统计窗口内某创意实例的 Viewed 次数
fn viewed_count_for_creative(
    ad_events: &[AdEvent],
    ad_type: AdType,
    creative_instance_id: &str,
    window: Duration,
    now: DateTime<Utc>,
) -> u32 {
    ad_events
        .iter()
        .filter(|event| {
            event.ad_type == ad_type
                && event.confirmation_type == ConfirmationType::Viewed
                && event.creative_instance_id == creative_instance_id
                && event.created_at <= now
                && now.signed_duration_since(event.created_at) <= window
        })
        .count() as u32
}

/// campaign 单日（滚动 24h）展示上限
pub struct DailyCapExclusionRule<'a> {
    ad_events: &'a [AdEvent],
    ad_type: AdType,
    now: DateTime<Utc>,
    last_message: String,
}

impl<'a> DailyCapExclusionRule<'a> {
    pub fn new(ad_events: &'a [AdEvent], ad_type: AdType, now: DateTime<Utc>) -> Self {
        Self {
            ad_events,
            ad_type,
            now,
            last_message: String::new(),
        }
    }
}

impl ExclusionRule for DailyCapExclusionRule<'_> {
    fn name(&self) -> &'static str {
        "daily_cap"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.campaign_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        if ad.daily_cap == 0 {
            return false;
        }
        let count = viewed_count_for_campaign(
            self.ad_events,
            self.ad_type,
            &ad.campaign_id,
            Some(Duration::hours(24)),
            self.now,
        );
        if count >= ad.daily_cap {
            self.last_message = format!(
                "campaignId {} has exceeded the dailyCap frequency cap",
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

/// campaign 累计展示上限（不限窗口）
pub struct TotalMaxExclusionRule<'a> {
    ad_events: &'a [AdEvent],
    ad_type: AdType,
    now: DateTime<Utc>,
    last_message: String,
}

impl<'a> TotalMaxExclusionRule<'a> {
    pub fn new(ad_events: &'a [AdEvent], ad_type: AdType, now: DateTime<Utc>) -> Self {
        Self {
            ad_events,
            ad_type,
            now,
            last_message: String::new(),
        }
    }
}

impl ExclusionRule for TotalMaxExclusionRule<'_> {
    fn name(&self) -> &'static str {
        "total_max"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.campaign_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        if ad.total_max == 0 {
            return false;
        }
        let count = viewed_count_for_campaign(
            self.ad_events,
            self.ad_type,
            &ad.campaign_id,
            None,
            self.now,
        );
        if count >= ad.total_max {
            self.last_message = format!(
                "campaignId {} has exceeded the totalMax frequency cap",
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

/// 创意级窗口上限，per_day / per_week / per_month / per 小时共用一个实现，
/// 用 cap 取值函数区分
pub struct CreativeCapExclusionRule<'a> {
    ad_events: &'a [AdEvent],
    ad_type: AdType,
    now: DateTime<Utc>,
    rule_name: &'static str,
    window: Duration,
    cap_of: fn(&CreativeAd) -> u32,
    last_message: String,
}

impl<'a> CreativeCapExclusionRule<'a> {
    pub fn per_day(ad_events: &'a [AdEvent], ad_type: AdType, now: DateTime<Utc>) -> Self {
        Self::new(ad_events, ad_type, now, "per_day", Duration::days(1), |ad| {
            ad.per_day
        })
    }

    pub fn per_week(ad_events: &'a [AdEvent], ad_type: AdType, now: DateTime<Utc>) -> Self {
        Self::new(ad_events, ad_type, now, "per_week", Duration::days(7), |ad| {
            ad.per_week
        })
    }

    pub fn per_month(ad_events: &'a [AdEvent], ad_type: AdType, now: DateTime<Utc>) -> Self {
        Self::new(
            ad_events,
            ad_type,
            now,
            "per_month",
            Duration::days(30),
            |ad| ad.per_month,
        )
    }

    fn new(
        ad_events: &'a [AdEvent],
        ad_type: AdType,
        now: DateTime<Utc>,
        rule_name: &'static str,
        window: Duration,
        cap_of: fn(&CreativeAd) -> u32,
    ) -> Self {
        Self {
            ad_events,
            ad_type,
            now,
            rule_name,
            window,
            cap_of,
            last_message: String::new(),
        }
    }
}

impl ExclusionRule for CreativeCapExclusionRule<'_> {
    fn name(&self) -> &'static str {
        self.rule_name
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.creative_instance_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        let cap = (self.cap_of)(ad);
        if cap == 0 {
            return false;
        }
        let count = viewed_count_for_creative(
            self.ad_events,
            self.ad_type,
            &ad.creative_instance_id,
            self.window,
            self.now,
        );
        if count >= cap {
            self.last_message = format!(
                "creativeInstanceId {} has exceeded the {} frequency cap",
                ad.creative_instance_id, self.rule_name
            );
            return true;
        }
        false
    }

    fn last_message(&self) -> &str {
        &self.last_message
    }
}

/// 创意级每小时上限，上限值来自配置而不是创意本身
pub struct PerHourExclusionRule<'a> {
    ad_events: &'a [AdEvent],
    ad_type: AdType,
    now: DateTime<Utc>,
    cap: u32,
    last_message: String,
}

impl<'a> PerHourExclusionRule<'a> {
    pub fn new(ad_events: &'a [AdEvent], ad_type: AdType, cap: u32, now: DateTime<Utc>) -> Self {
        Self {
            ad_events,
            ad_type,
            now,
            cap,
            last_message: String::new(),
        }
    }
}

impl ExclusionRule for PerHourExclusionRule<'_> {
    fn name(&self) -> &'static str {
        "per_hour"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.creative_instance_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        if self.cap == 0 {
            return false;
        }
        let count = viewed_count_for_creative(
            self.ad_events,
            self.ad_type,
            &ad.creative_instance_id,
            Duration::hours(1),
            self.now,
        );
        if count >= self.cap {
            self.last_message = format!(
                "creativeInstanceId {} has exceeded the perHour frequency cap",
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
    use crate::model::ad_event::AdEvent;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn test_ad() -> CreativeAd {
        CreativeAd {
            creative_instance_id: "a1".to_string(),
            campaign_id: "c1".to_string(),
            segment: "technology".to_string(),
            split_test_group: String::new(),
            geo_targets: Vec::new(),
            dayparts: Vec::new(),
            daily_cap: 2,
            total_max: 3,
            per_day: 1,
            per_week: 2,
            per_month: 3,
        }
    }

    fn viewed(hours_ago: i64) -> AdEvent {
        AdEvent::new(
            AdType::NotificationAd,
            ConfirmationType::Viewed,
            "c1",
            "a1",
            epoch() - Duration::hours(hours_ago),
        )
    }

    #[test]
    fn daily_cap_counts_only_the_last_24_hours() {
        let events = vec![viewed(1), viewed(2), viewed(30)];
        let mut rule = DailyCapExclusionRule::new(&events, AdType::NotificationAd, epoch());
        assert!(rule.should_exclude(&test_ad()));

        let events = vec![viewed(1), viewed(30)];
        let mut rule = DailyCapExclusionRule::new(&events, AdType::NotificationAd, epoch());
        assert!(!rule.should_exclude(&test_ad()));
    }

    #[test]
    fn total_max_counts_all_history() {
        let events = vec![viewed(1), viewed(30), viewed(24 * 40)];
        let mut rule = TotalMaxExclusionRule::new(&events, AdType::NotificationAd, epoch());
        assert!(rule.should_exclude(&test_ad()));
    }

    #[test]
    fn zero_caps_are_unlimited() {
        let mut ad = test_ad();
        ad.daily_cap = 0;
        ad.total_max = 0;
        let events = vec![viewed(1), viewed(2), viewed(3), viewed(4)];

        let mut daily = DailyCapExclusionRule::new(&events, AdType::NotificationAd, epoch());
        assert!(!daily.should_exclude(&ad));
        let mut total = TotalMaxExclusionRule::new(&events, AdType::NotificationAd, epoch());
        assert!(!total.should_exclude(&ad));
    }

    #[test]
    fn per_day_cap_applies_to_the_creative_instance() {
        let events = vec![viewed(2)];
        let mut rule = CreativeCapExclusionRule::per_day(&events, AdType::NotificationAd, epoch());
        assert!(rule.should_exclude(&test_ad()));

        // 不同创意实例不受影响
        let mut other = test_ad();
        other.creative_instance_id = "a2".to_string();
        let mut rule = CreativeCapExclusionRule::per_day(&events, AdType::NotificationAd, epoch());
        assert!(!rule.should_exclude(&other));
    }

    #[test]
    fn per_week_and_per_month_use_wider_windows() {
        let events = vec![viewed(24 * 2), viewed(24 * 6)];
        let mut week = CreativeCapExclusionRule::per_week(&events, AdType::NotificationAd, epoch());
        assert!(week.should_exclude(&test_ad()));

        let events = vec![viewed(24 * 2), viewed(24 * 10), viewed(24 * 25)];
        let mut month =
            CreativeCapExclusionRule::per_month(&events, AdType::NotificationAd, epoch());
        assert!(month.should_exclude(&test_ad()));
    }

    #[test]
    fn per_hour_cap_comes_from_config() {
        let events = vec![AdEvent::new(
            AdType::NotificationAd,
            ConfirmationType::Viewed,
            "c1",
            "a1",
            epoch() - Duration::minutes(30),
        )];
        let mut rule = PerHourExclusionRule::new(&events, AdType::NotificationAd, 1, epoch());
        assert!(rule.should_exclude(&test_ad()));

        let mut relaxed = PerHourExclusionRule::new(&events, AdType::NotificationAd, 2, epoch());
        assert!(!relaxed.should_exclude(&test_ad()));
    }
}
