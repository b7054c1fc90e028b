// src/logging/serving_log.rs

use serde::{Serialize, Deserialize};
use chrono::Utc;

/// **一次 serving 尝试的聚合日志**
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServingLog {
    pub timestamp: String,        // 记录时间
    pub log_type: String,         // 日志类型，固定 "ad_serving_attempt"
    pub request_id: String,       // 本次 serving 请求标识
    pub ad_type: u8,              // 广告位类型
    pub pipeline_version: String, // 管线版本 v1/v2/v3
    pub had_opportunity: bool,    // 是否存在过滤前库存
    pub candidate_count: usize,   // 过滤前候选数
    pub eligible_count: usize,    // 过滤后存活数
    pub winning_creative: Option<String>, // 胜出创意（无选优阶段时为 None）
    pub stages: Vec<StageLog>,    // 各阶段执行情况
}

/// **单个管线阶段的日志**
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StageLog {
    pub stage: String,    // 阶段名
    pub status: String,   // "success" / "failed" / "degraded" / "empty"
    pub detail: String,   // 补充信息
}

impl ServingLog {
    /// **创建 serving 聚合日志**
    pub fn new(request_id: &str, ad_type: u8, pipeline_version: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            log_type: "ad_serving_attempt".to_string(),
            request_id: request_id.to_string(),
            ad_type,
            pipeline_version: pipeline_version.to_string(),
            had_opportunity: false,
            candidate_count: 0,
            eligible_count: 0,
            winning_creative: None,
            stages: Vec::new(),
        }
    }

    /// **追加一个阶段记录**
    pub fn add_stage(&mut self, stage: &str, status: &str, detail: &str) {
        self.stages.push(StageLog {
            stage: stage.to_string(),
            status: status.to_string(),
            detail: detail.to_string(),
        });
    }

    /// **记录最终结果**
    pub fn set_outcome(
        &mut self,
        had_opportunity: bool,
        eligible_count: usize,
        winning_creative: Option<&str>,
    ) {
        self.had_opportunity = had_opportunity;
        self.eligible_count = eligible_count;
        self.winning_creative = winning_creative.map(str::to_string);
    }
}
