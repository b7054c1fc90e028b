// src/model/user_model.rs

use serde::{Serialize, Deserialize};

/// 带权重的定向分类
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeightedSegment {
    pub segment: String,
    pub weight: f64,
}

impl WeightedSegment {
    pub fn new(segment: &str, weight: f64) -> Self {
        Self {
            segment: segment.to_string(),
            weight,
        }
    }
}

/// 请求方的定向画像，整条管线按值传递
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserModel {
    pub interest_segments: Vec<WeightedSegment>,        // 兴趣分类
    pub intent_segments: Vec<WeightedSegment>,          // 购买意图分类
    pub latent_interest_segments: Vec<WeightedSegment>, // 潜在兴趣分类
}

impl UserModel {
    /// 汇总全部分类名（去重，保持首次出现顺序）
    pub fn all_segments(&self) -> Vec<String> {
        let mut segments = Vec::new();
        for ws in self
            .interest_segments
            .iter()
            .chain(self.intent_segments.iter())
            .chain(self.latent_interest_segments.iter())
        {
            if !segments.contains(&ws.segment) {
                segments.push(ws.segment.clone());
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_segments_dedupes_across_groups() {
        let user_model = UserModel {
            interest_segments: vec![
                WeightedSegment::new("technology-computing", 1.0),
                WeightedSegment::new("travel", 0.4),
            ],
            intent_segments: vec![WeightedSegment::new("technology-computing", 0.9)],
            latent_interest_segments: vec![WeightedSegment::new("food", 0.1)],
        };

        assert_eq!(
            user_model.all_segments(),
            vec!["technology-computing", "travel", "food"]
        );
    }
}
