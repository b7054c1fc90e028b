use axum::{extract::State, http::StatusCode, Json};
use serde::{Serialize, Deserialize};
use std::sync::Arc;

use chrono::Utc;

use crate::model::creative_ad::{AdDimensions, AdType, CreativeAd};
use crate::model::user_model::UserModel;
use crate::serving::{EligibleAdsPipeline, SegmentMatchPredictor};
use crate::AppState;

/// serving 请求体
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServeRequest {
    pub ad_type: AdType,
    pub user_model: UserModel,
    pub dimensions: Option<AdDimensions>, // inline-content 广告位必带
}

/// serving 响应体；广告被抑制时对最终用户静默，这里只向调用方暴露语义标志
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServeResponse {
    pub had_opportunity: bool,
    pub ads: Vec<CreativeAd>,
}

/// **处理一次广告 serving 请求**
pub async fn handle_serve_request(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ServeRequest>,
) -> (StatusCode, Json<ServeResponse>) {
    // 管线按次构造，按次丢弃；只有外部 store / 资源快照跨请求存活
    let pipeline = EligibleAdsPipeline::new(
        request.ad_type,
        state.config.clone(),
        state.ad_event_store.clone(),
        state.browsing_history_provider.clone(),
        state.creative_ad_store.clone(),
        state.anti_targeting.clone(),
        state.subdivision.clone(),
        Arc::new(SegmentMatchPredictor::new(Utc::now())),
        state.runtime_logger.clone(),
    );

    let result = pipeline
        .get_for_user_model(&request.user_model, request.dimensions)
        .await;

    let response = ServeResponse {
        had_opportunity: result.had_opportunity,
        ads: result.ads,
    };

    if response.ads.is_empty() {
        // 无广告可投不是错误，调用方须自行检查 had_opportunity
        (StatusCode::NO_CONTENT, Json(response))
    } else {
        (StatusCode::OK, Json(response))
    }
}
