// src/exclusion/rule.rs

use crate::model::creative_ad::CreativeAd;

/// 排除规则：针对单个创意广告 + 上下文状态的纯谓词。
///
/// `uuid` 返回该规则做缓存分组用的键（通常是 campaign_id，个别规则用
/// creative_instance_id）。`last_message` 保存最近一次排除决策的诊断信息，
/// 不可重入，须在 `should_exclude` 返回 true 后立即读取。
pub trait ExclusionRule {
    /// 规则名，用于日志与缓存定位
    fn name(&self) -> &'static str;

    /// 该广告在本规则下的缓存分组键
    fn uuid(&self, ad: &CreativeAd) -> String;

    /// 是否排除该广告；返回 true 时会更新 last_message
    fn should_exclude(&mut self, ad: &CreativeAd) -> bool;

    /// 最近一次排除决策的人读诊断，仅供日志，不影响控制流
    fn last_message(&self) -> &str;
}
