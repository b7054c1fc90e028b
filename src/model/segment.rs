// src/model/segment.rs
//
// 定向分类为层级字符串，用 "-" 分隔，如 "technology-computing-software"。

/// 取最顶层的父分类；本身已是顶层时返回 None
pub fn parent_segment(segment: &str) -> Option<String> {
    let top = segment.split('-').next()?;
    if top == segment {
        None
    } else {
        Some(top.to_string())
    }
}

/// 把分类列表压缩成去重后的顶层父分类列表，保持首次出现顺序
pub fn parent_segments(segments: &[String]) -> Vec<String> {
    let mut parents = Vec::new();
    for segment in segments {
        let parent = parent_segment(segment).unwrap_or_else(|| segment.clone());
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }
    parents
}

/// 层级匹配：candidate 等于 target，或 candidate 位于 target 的子层级
pub fn segment_matches(candidate: &str, target: &str) -> bool {
    candidate == target
        || (candidate.len() > target.len()
            && candidate.starts_with(target)
            && candidate.as_bytes()[target.len()] == b'-')
}
