// src/resource/adapters.rs

use serde::{Serialize, Deserialize};
use serde_json::Result as JsonResult;
use std::collections::HashMap;
use std::fs;

/// anti-targeting 资源文件的反序列化形态：分类 -> 反相关站点
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AntiTargetingData {
    pub sites_by_segment: HashMap<String, Vec<String>>,
}

/// subdivision 资源文件的反序列化形态
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SubdivisionData {
    pub country: String,
    pub subdivision: Option<String>, // 如 "US-CA"；None 表示未启用细分定向
    #[serde(default)]
    pub supported_subdivisions: Vec<String>,
}

pub trait ResourceAdapter: Send + Sync {
    fn get_anti_targeting(&self) -> AntiTargetingData;
    fn get_subdivision(&self) -> SubdivisionData;
}

/// 从 /static 目录读取资源文件的适配器，文件缺失或损坏时降级为空资源
pub struct FileResourceAdapter {
    pub anti_targeting_file: String,
    pub subdivision_file: String,
}

impl FileResourceAdapter {
    pub fn new(anti_targeting_file: &str, subdivision_file: &str) -> Self {
        Self {
            anti_targeting_file: anti_targeting_file.to_string(),
            subdivision_file: subdivision_file.to_string(),
        }
    }
}

impl ResourceAdapter for FileResourceAdapter {
    fn get_anti_targeting(&self) -> AntiTargetingData {
        let content = fs::read_to_string(&self.anti_targeting_file)
            .unwrap_or_else(|_| "{\"sites_by_segment\":{}}".to_string());
        let data: JsonResult<AntiTargetingData> = serde_json::from_str(&content);
        data.unwrap_or_default()
    }

    fn get_subdivision(&self) -> SubdivisionData {
        let content = fs::read_to_string(&self.subdivision_file)
            .unwrap_or_else(|_| "{\"country\":\"\",\"subdivision\":null}".to_string());
        let data: JsonResult<SubdivisionData> = serde_json::from_str(&content);
        data.unwrap_or_default()
    }
}
