//! 评分结果规范化
//!
//! AI 返回的文本不可信：先解析为松散的 JSON，再逐字段校验、转换、截断，
//! 得到满足所有不变量的 `GradeResult`。任何输入都不会导致错误或 panic。

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{Grade, GradeResult, HighlightReference, SectionScore};

pub const INVALID_JSON_FEEDBACK: &str = "AI response was not valid JSON";
const DEFAULT_FEEDBACK: &str = "Feedback processing error.";
const DEFAULT_OUTLINE: &str = "Outline processing error.";

/// 外层 ```json 代码块
static RE_CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("代码块正则无效")
});
/// 字符串开头的整数部分
static RE_LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("整数正则无效"));

/// 评分结果规范化器
pub struct GradeNormalizer;

impl GradeNormalizer {
    /// 规范化 AI 返回的原始 JSON 文本
    ///
    /// `total_marks` 是调用方给出的权威总分，AI 回显的值只用于日志。
    pub fn normalize(raw_json_text: &str, total_marks: i64) -> GradeResult {
        let total_marks = total_marks.max(0);

        let parsed = match parse_object(raw_json_text) {
            Some(obj) => obj,
            None => {
                warn!("AI 返回内容不是合法的 JSON 对象");
                return GradeResult::zeroed(total_marks, INVALID_JSON_FEEDBACK, "");
            }
        };

        if let Some(echoed) = parsed.get("totalMarks").and_then(coerce_int) {
            if echoed != total_marks {
                debug!("AI 回显的总分 {} 与请求总分 {} 不一致，使用请求总分", echoed, total_marks);
            }
        }

        let score = parsed
            .get("score")
            .and_then(coerce_int)
            .unwrap_or(0)
            .clamp(0, total_marks);

        let grade = Grade::from_score(score, total_marks);
        if let Some(claimed) = parsed.get("grade").and_then(|v| v.as_str()) {
            if Grade::from_letter(claimed) != Some(grade) {
                warn!(
                    "AI 给出的等级 '{}' 与得分 {}/{} 不符，改为 {}",
                    claimed, score, total_marks, grade
                );
            }
        }

        GradeResult {
            score,
            total_marks,
            grade,
            feedback: coerce_text(parsed.get("feedback"), DEFAULT_FEEDBACK),
            outline: coerce_text(parsed.get("outline"), DEFAULT_OUTLINE),
            highlight_references: highlight_references(
                parsed
                    .get("highlightReferences")
                    .or_else(|| parsed.get("highlight_references")),
            ),
            section_scores: section_scores(
                parsed
                    .get("sectionScores")
                    .or_else(|| parsed.get("section_scores")),
            ),
        }
    }
}

/// 解析顶层 JSON 对象，允许外层包裹 ```json 代码块
fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    let body = strip_code_fence(raw);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

fn strip_code_fence(raw: &str) -> &str {
    match RE_CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => raw,
    }
}

/// 宽松的整数转换：数字截断，字符串取开头的整数部分（`"45/60"` → 45）
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let digits = RE_LEADING_INT.captures(s)?.get(1)?.as_str();
    match digits.parse::<i64>() {
        Ok(n) => Some(n),
        // 超出范围的数字按符号取极值，随后会被截断到总分范围
        Err(_) if digits.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

fn coerce_text(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => {
            let lines: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            if lines.is_empty() {
                default.to_string()
            } else {
                lines.join("\n")
            }
        }
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn optional_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| v.as_str())
        .map(String::from)
}

/// 不是数组时返回空列表；数组中非对象的元素被丢弃
fn highlight_references(value: Option<&Value>) -> Vec<HighlightReference> {
    let Some(Value::Array(items)) = value else {
        if value.is_some_and(|v| !v.is_null()) {
            warn!("highlightReferences 不是数组，已替换为空列表");
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| item.as_object())
        .map(|obj| HighlightReference {
            student_phrase: optional_text(obj, &["studentPhrase", "student_phrase"])
                .unwrap_or_default(),
            significance: optional_text(obj, &["significance"]).unwrap_or_default(),
            ms_match_level: optional_text(obj, &["msMatchLevel", "ms_match_level"])
                .filter(|s| !s.trim().is_empty()),
        })
        .collect()
}

/// 不是对象时返回空映射；分节 `max` 不小于 0，`score` 截断到 `[0, max]`
fn section_scores(value: Option<&Value>) -> BTreeMap<String, SectionScore> {
    let Some(Value::Object(map)) = value else {
        if value.is_some_and(|v| !v.is_null()) {
            warn!("sectionScores 不是对象，已替换为空映射");
        }
        return BTreeMap::new();
    };

    map.iter()
        .filter_map(|(key, v)| {
            let obj = v.as_object()?;
            let max = obj.get("max").and_then(coerce_int).unwrap_or(0).max(0);
            let score = obj
                .get("score")
                .and_then(coerce_int)
                .unwrap_or(0)
                .clamp(0, max);
            Some((key.clone(), SectionScore { score, max }))
        })
        .collect()
}
