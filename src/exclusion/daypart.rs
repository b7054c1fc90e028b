// src/exclusion/daypart.rs

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::exclusion::rule::ExclusionRule;
use crate::model::creative_ad::CreativeAd;

/// 当前时刻不在广告的任何投放时段内则排除；未配置时段表示全天可投
pub struct DaypartExclusionRule {
    now: DateTime<Utc>,
    last_message: String,
}

impl DaypartExclusionRule {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            last_message: String::new(),
        }
    }
}

impl ExclusionRule for DaypartExclusionRule {
    fn name(&self) -> &'static str {
        "daypart"
    }

    fn uuid(&self, ad: &CreativeAd) -> String {
        ad.campaign_id.clone()
    }

    fn should_exclude(&mut self, ad: &CreativeAd) -> bool {
        if ad.dayparts.is_empty() {
            return false;
        }

        let day_of_week = self.now.weekday().num_days_from_sunday();
        let minute_of_day = self.now.hour() * 60 + self.now.minute();

        let within_schedule = ad.dayparts.iter().any(|daypart| {
            daypart.days_of_week.contains(&day_of_week)
                && minute_of_day >= daypart.start_minute
                && minute_of_day <= daypart.end_minute
        });

        if !within_schedule {
            self.last_message = format!(
                "campaignId {} excluded as not within a scheduled daypart",
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
