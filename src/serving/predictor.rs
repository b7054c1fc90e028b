// src/serving/predictor.rs

use chrono::{DateTime, Utc};

use crate::model::ad_event::{AdEventList, ConfirmationType};
use crate::model::creative_ad::CreativeAd;
use crate::model::segment;
use crate::model::user_model::UserModel;

/// 选优接口：从过滤后的候选集中挑出单一胜出广告。
/// 对管线而言是黑盒，内部打分策略可插拔替换。
pub trait AdPredictor: Send + Sync {
    fn predict(
        &self,
        user_model: &UserModel,
        ad_events: &AdEventList,
        eligible_ads: &[CreativeAd],
    ) -> Option<CreativeAd>;
}

/// 默认实现：分类匹配打分 + 最近展示降权。
/// intent > interest > latent；父分类命中按半权计；并列取先到者，保证确定性。
pub struct SegmentMatchPredictor {
    now: DateTime<Utc>,
}

impl SegmentMatchPredictor {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    fn segment_score(&self, user_model: &UserModel, ad: &CreativeAd) -> f64 {
        let mut score = 0.0;
        for (weighted_segments, factor) in [
            (&user_model.intent_segments, 1.5),
            (&user_model.interest_segments, 1.0),
            (&user_model.latent_interest_segments, 0.5),
        ] {
            for ws in weighted_segments.iter() {
                if ws.segment == ad.segment {
                    score += factor * ws.weight;
                } else if segment::segment_matches(&ad.segment, &ws.segment)
                    || segment::segment_matches(&ws.segment, &ad.segment)
                {
                    // 只命中层级关系（父子任一方向），半权
                    score += factor * ws.weight * 0.5;
                }
            }
        }
        score
    }

    /// 最近 24h 内看过同一 campaign 的广告降权，避免重复轰炸
    fn recency_penalty(&self, ad_events: &AdEventList, ad: &CreativeAd) -> f64 {
        let recently_viewed = ad_events.iter().any(|event| {
            event.confirmation_type == ConfirmationType::Viewed
                && event.campaign_id == ad.campaign_id
                && self.now.signed_duration_since(event.created_at) <= chrono::Duration::hours(24)
        });
        if recently_viewed {
            0.5
        } else {
            1.0
        }
    }
}

impl AdPredictor for SegmentMatchPredictor {
    fn predict(
        &self,
        user_model: &UserModel,
        ad_events: &AdEventList,
        eligible_ads: &[CreativeAd],
    ) -> Option<CreativeAd> {
        let mut best: Option<(&CreativeAd, f64)> = None;
        for ad in eligible_ads {
            let score = self.segment_score(user_model, ad) * self.recency_penalty(ad_events, ad);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((ad, score)),
            }
        }
        best.map(|(ad, _)| ad.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ad_event::AdEvent;
    use crate::model::creative_ad::AdType;
    use crate::model::user_model::WeightedSegment;
    use chrono::TimeZone;

    fn test_ad(creative_instance_id: &str, campaign_id: &str, ad_segment: &str) -> CreativeAd {
        CreativeAd {
            creative_instance_id: creative_instance_id.to_string(),
            campaign_id: campaign_id.to_string(),
            segment: ad_segment.to_string(),
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

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_candidates_predict_nothing() {
        let predictor = SegmentMatchPredictor::new(now());
        assert_eq!(
            predictor.predict(&UserModel::default(), &Vec::new(), &[]),
            None
        );
    }

    #[test]
    fn exact_intent_match_beats_interest_match() {
        let user_model = UserModel {
            interest_segments: vec![WeightedSegment::new("travel", 1.0)],
            intent_segments: vec![WeightedSegment::new("technology-computing", 1.0)],
            latent_interest_segments: Vec::new(),
        };
        let ads = vec![
            test_ad("a1", "c1", "travel"),
            test_ad("a2", "c2", "technology-computing"),
        ];
        let predictor = SegmentMatchPredictor::new(now());
        let winner = predictor.predict(&user_model, &Vec::new(), &ads).unwrap();
        assert_eq!(winner.creative_instance_id, "a2");
    }

    #[test]
    fn recently_viewed_campaign_is_demoted() {
        let user_model = UserModel {
            interest_segments: vec![WeightedSegment::new("travel", 1.0)],
            ..Default::default()
        };
        let ads = vec![
            test_ad("a1", "c1", "travel"),
            test_ad("a2", "c2", "travel"),
        ];
        let ad_events = vec![AdEvent::new(
            AdType::NotificationAd,
            ConfirmationType::Viewed,
            "c1",
            "a1",
            now() - chrono::Duration::hours(2),
        )];
        let predictor = SegmentMatchPredictor::new(now());
        let winner = predictor.predict(&user_model, &ad_events, &ads).unwrap();
        assert_eq!(winner.creative_instance_id, "a2");
    }

    #[test]
    fn ties_resolve_to_the_first_candidate() {
        let user_model = UserModel {
            interest_segments: vec![WeightedSegment::new("travel", 1.0)],
            ..Default::default()
        };
        let ads = vec![
            test_ad("a1", "c1", "travel"),
            test_ad("a2", "c2", "travel"),
        ];
        let predictor = SegmentMatchPredictor::new(now());
        let winner = predictor.predict(&user_model, &Vec::new(), &ads).unwrap();
        assert_eq!(winner.creative_instance_id, "a1");
    }
}
