// src/serving/pipeline.rs

use std::sync::Arc;
use chrono::Utc;
use serde::{Serialize, Deserialize};
use tracing::info;
use uuid::Uuid;

use crate::config::ServingConfig;
use crate::exclusion::ExclusionRuleChain;
use crate::logging::{RuntimeLogger, ServingLog};
use crate::model::ad_event::{AdEventList, BrowsingHistoryList};
use crate::model::creative_ad::{AdDimensions, AdType, CreativeAd};
use crate::model::segment;
use crate::model::user_model::UserModel;
use crate::resource::{AntiTargetingResource, SubdivisionTargetingResource};
use crate::serving::predictor::AdPredictor;
use crate::store::{AdEventStore, BrowsingHistoryProvider, CreativeAdStore};

/// serving 结果：错误信息全部折叠进这两个字段，管线入口之外不抛错。
/// `had_opportunity=false` 表示无从计算或过滤前就没有库存；
/// `had_opportunity=true` 且列表为空表示有库存但全部被过滤/选优淘汰。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServingResult {
    pub had_opportunity: bool,
    pub ads: Vec<CreativeAd>,
}

impl ServingResult {
    fn no_opportunity() -> Self {
        Self {
            had_opportunity: false,
            ads: Vec::new(),
        }
    }

    fn opportunity(ads: Vec<CreativeAd>) -> Self {
        Self {
            had_opportunity: true,
            ads,
        }
    }
}

/// 可投放广告管线：每次 serving 尝试构造一个新实例，产出结果后即丢弃，
/// 除外部的事件日志 / 目录 / 资源快照外不保留任何跨次状态。
///
/// 五个阶段严格串行：取事件历史 -> 取浏览历史 -> 取候选创意 ->
/// 规则链过滤 -> （视版本）predictor 选优。取消即 drop 返回的 future。
pub struct EligibleAdsPipeline {
    ad_type: AdType,
    config: Arc<ServingConfig>,
    ad_event_store: Arc<dyn AdEventStore>,
    browsing_history_provider: Arc<dyn BrowsingHistoryProvider>,
    creative_ad_store: Arc<dyn CreativeAdStore>,
    anti_targeting: Arc<AntiTargetingResource>,
    subdivision: Arc<SubdivisionTargetingResource>,
    predictor: Arc<dyn AdPredictor>,
    runtime_logger: Arc<RuntimeLogger>,
}

impl EligibleAdsPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ad_type: AdType,
        config: Arc<ServingConfig>,
        ad_event_store: Arc<dyn AdEventStore>,
        browsing_history_provider: Arc<dyn BrowsingHistoryProvider>,
        creative_ad_store: Arc<dyn CreativeAdStore>,
        anti_targeting: Arc<AntiTargetingResource>,
        subdivision: Arc<SubdivisionTargetingResource>,
        predictor: Arc<dyn AdPredictor>,
        runtime_logger: Arc<RuntimeLogger>,
    ) -> Self {
        Self {
            ad_type,
            config,
            ad_event_store,
            browsing_history_provider,
            creative_ad_store,
            anti_targeting,
            subdivision,
            predictor,
            runtime_logger,
        }
    }

    /// 管线唯一入口：给定用户画像（inline-content 还带尺寸），返回可投放广告
    pub async fn get_for_user_model(
        &self,
        user_model: &UserModel,
        dimensions: Option<AdDimensions>,
    ) -> ServingResult {
        let request_id = Uuid::new_v4().to_string();
        let mut serving_log = ServingLog::new(
            &request_id,
            self.ad_type as u8,
            self.config.version.as_str(),
        );

        // 阶段 1：事件历史。取数失败对本次 serving 是致命的，立即结束，不重试。
        let ad_events = match self.ad_event_store.ad_events(self.ad_type).await {
            Ok(events) => {
                serving_log.add_stage("ad_events", "success", &format!("{} events", events.len()));
                events
            }
            Err(e) => {
                serving_log.add_stage("ad_events", "failed", &e.to_string());
                return self.complete(serving_log, ServingResult::no_opportunity()).await;
            }
        };

        // 阶段 2：浏览历史。失败降级为空历史，anti-targeting 规则随之不排除。
        let browsing_history = match self
            .browsing_history_provider
            .browsing_history(
                self.config.browsing_history_max_count,
                self.config.browsing_history_max_age_days,
            )
            .await
        {
            Ok(history) => {
                serving_log.add_stage(
                    "browsing_history",
                    "success",
                    &format!("{} entries", history.len()),
                );
                history
            }
            Err(e) => {
                serving_log.add_stage("browsing_history", "degraded", &e.to_string());
                Vec::new()
            }
        };

        // 阶段 3：候选创意
        let candidates = self
            .fetch_candidates(user_model, dimensions, &mut serving_log)
            .await;
        serving_log.candidate_count = candidates.len();
        if candidates.is_empty() {
            serving_log.add_stage("candidates", "empty", "no inventory for any segment tier");
            return self.complete(serving_log, ServingResult::no_opportunity()).await;
        }

        // 阶段 4：规则链过滤。链与缓存只活这一次扫描。
        let eligible_ads =
            self.filter_candidates(candidates, &ad_events, &browsing_history, &mut serving_log);
        if eligible_ads.is_empty() {
            // 有库存但全被排除，与"无库存"语义不同
            return self
                .complete(serving_log, ServingResult::opportunity(Vec::new()))
                .await;
        }

        // 阶段 5：选优（v1 直接返回全部过滤结果）
        let result = if self.config.version.predicts_winner() {
            match self
                .predictor
                .predict(user_model, &ad_events, &eligible_ads)
            {
                Some(winner) => {
                    serving_log.add_stage(
                        "prediction",
                        "success",
                        &format!("creativeInstanceId {}", winner.creative_instance_id),
                    );
                    ServingResult::opportunity(vec![winner])
                }
                None => {
                    serving_log.add_stage("prediction", "empty", "predictor returned no winner");
                    ServingResult::opportunity(Vec::new())
                }
            }
        } else {
            ServingResult::opportunity(eligible_ads)
        };

        self.complete(serving_log, result).await
    }

    /// 三级回退（v1/v2）：child 分类 -> parent 分类 -> untargeted；
    /// v3 为单级直查，child + parent 合并一次取数，不回退。
    async fn fetch_candidates(
        &self,
        user_model: &UserModel,
        dimensions: Option<AdDimensions>,
        serving_log: &mut ServingLog,
    ) -> Vec<CreativeAd> {
        let child_segments = user_model.all_segments();

        if !self.config.version.uses_segment_fallback() {
            let mut segments = child_segments.clone();
            for parent in segment::parent_segments(&child_segments) {
                if !segments.contains(&parent) {
                    segments.push(parent);
                }
            }
            if segments.is_empty() {
                return self
                    .fetch_tier("untargeted", None, dimensions, serving_log)
                    .await;
            }
            return self
                .fetch_tier("direct", Some(segments.as_slice()), dimensions, serving_log)
                .await;
        }

        if !child_segments.is_empty() {
            let ads = self
                .fetch_tier("child_segments", Some(child_segments.as_slice()), dimensions, serving_log)
                .await;
            if !ads.is_empty() {
                return ads;
            }

            let parent_segments = segment::parent_segments(&child_segments);
            let ads = self
                .fetch_tier(
                    "parent_segments",
                    Some(parent_segments.as_slice()),
                    dimensions,
                    serving_log,
                )
                .await;
            if !ads.is_empty() {
                return ads;
            }
        }

        self.fetch_tier("untargeted", None, dimensions, serving_log)
            .await
    }

    async fn fetch_tier(
        &self,
        tier: &str,
        segments: Option<&[String]>,
        dimensions: Option<AdDimensions>,
        serving_log: &mut ServingLog,
    ) -> Vec<CreativeAd> {
        let fetched = match segments {
            Some(segments) => {
                self.creative_ad_store
                    .creative_ads_for_segments(self.ad_type, segments, dimensions)
                    .await
            }
            None => {
                self.creative_ad_store
                    .untargeted_creative_ads(self.ad_type, dimensions)
                    .await
            }
        };

        match fetched {
            Ok(ads) => {
                serving_log.add_stage(tier, "success", &format!("{} candidates", ads.len()));
                ads
            }
            Err(e) => {
                // 目录取数失败视同该层无库存
                serving_log.add_stage(tier, "failed", &e.to_string());
                Vec::new()
            }
        }
    }

    fn filter_candidates(
        &self,
        candidates: Vec<CreativeAd>,
        ad_events: &AdEventList,
        browsing_history: &BrowsingHistoryList,
        serving_log: &mut ServingLog,
    ) -> Vec<CreativeAd> {
        let mut chain = ExclusionRuleChain::new(
            self.ad_type,
            &self.config,
            ad_events,
            browsing_history,
            &self.anti_targeting,
            &self.subdivision,
            Utc::now(),
        );
        let before = candidates.len();
        let eligible_ads = chain.filter_creative_ads(candidates);
        serving_log.add_stage(
            "exclusion_filter",
            "success",
            &format!("{} of {} candidates survived", eligible_ads.len(), before),
        );
        eligible_ads
    }

    /// 统一收口：所有出口都经过这里，保证每次尝试恰好落一条聚合日志
    async fn complete(&self, mut serving_log: ServingLog, result: ServingResult) -> ServingResult {
        serving_log.set_outcome(
            result.had_opportunity,
            result.ads.len(),
            result.ads.first().map(|ad| ad.creative_instance_id.as_str()),
        );
        let line = serde_json::to_string(&serving_log)
            .unwrap_or_else(|_| "{\"log_type\":\"ad_serving_attempt\"}".to_string());
        self.runtime_logger.log("INFO", &line).await;
        info!(
            request_id = %serving_log.request_id,
            had_opportunity = result.had_opportunity,
            ads = result.ads.len(),
            "ad serving attempt completed"
        );
        result
    }
}
