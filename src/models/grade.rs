use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    U,
}

impl Grade {
    /// 百分比分档：A≥80, B≥70, C≥60, D≥50, E≥40，其余为 U
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Grade::A
        } else if percentage >= 70.0 {
            Grade::B
        } else if percentage >= 60.0 {
            Grade::C
        } else if percentage >= 50.0 {
            Grade::D
        } else if percentage >= 40.0 {
            Grade::E
        } else {
            Grade::U
        }
    }

    /// 由得分和总分计算等级，总分不大于 0 时为 U
    pub fn from_score(score: i64, total_marks: i64) -> Self {
        if total_marks <= 0 {
            return Grade::U;
        }
        Self::from_percentage(score as f64 * 100.0 / total_marks as f64)
    }

    /// 解析 AI 返回的等级字母
    pub fn from_letter(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "E" => Some(Grade::E),
            "U" => Some(Grade::U),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::U => "U",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 学生答案中值得关注的片段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightReference {
    pub student_phrase: String,
    pub significance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ms_match_level: Option<String>,
}

/// 分节得分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScore {
    pub score: i64,
    pub max: i64,
}

/// 评分结果
///
/// 不变量：`0 <= score <= total_marks`，集合字段始终存在。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub score: i64,
    pub total_marks: i64,
    pub grade: Grade,
    pub feedback: String,
    pub outline: String,
    pub highlight_references: Vec<HighlightReference>,
    pub section_scores: BTreeMap<String, SectionScore>,
}

impl GradeResult {
    /// 零分、U 等级、空集合的结果
    pub fn zeroed(
        total_marks: i64,
        feedback: impl Into<String>,
        outline: impl Into<String>,
    ) -> Self {
        Self {
            score: 0,
            total_marks: total_marks.max(0),
            grade: Grade::U,
            feedback: feedback.into(),
            outline: outline.into(),
            highlight_references: Vec::new(),
            section_scores: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::from_score(48, 60), Grade::A);
        assert_eq!(Grade::from_score(45, 60), Grade::B);
        assert_eq!(Grade::from_score(36, 60), Grade::C);
        assert_eq!(Grade::from_score(30, 60), Grade::D);
        assert_eq!(Grade::from_score(24, 60), Grade::E);
        assert_eq!(Grade::from_score(23, 60), Grade::U);
        assert_eq!(Grade::from_score(0, 0), Grade::U);
    }

    #[test]
    fn test_from_letter() {
        assert_eq!(Grade::from_letter(" b "), Some(Grade::B));
        assert_eq!(Grade::from_letter("A*"), None);
    }

    #[test]
    fn test_grade_result_serializes_camel_case() {
        let result = GradeResult::zeroed(60, "fb", "ol");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalMarks"], 60);
        assert_eq!(json["grade"], "U");
        assert!(json["highlightReferences"].as_array().unwrap().is_empty());
        assert!(json["sectionScores"].as_object().unwrap().is_empty());
    }
}
