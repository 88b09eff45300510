use serde::{Deserialize, Serialize};

use crate::error::BusinessError;
use crate::models::context::PaperContext;

/// 评分请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingRequest {
    pub paper_context: PaperContext,
    /// 学生答案文本
    #[serde(default, alias = "userAnswer", skip_serializing_if = "Option::is_none")]
    pub student_answer: Option<String>,
    /// 学生答案扫描件路径（图片 / PDF / 文本），没有答案文本时使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_file: Option<String>,
    #[serde(alias = "paperTotalMarks")]
    pub total_marks: i64,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl GradingRequest {
    pub fn new(paper_context: PaperContext, student_answer: impl Into<String>, total_marks: i64) -> Self {
        Self {
            paper_context,
            student_answer: Some(student_answer.into()),
            answer_file: None,
            total_marks,
            file_path: None,
        }
    }

    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }

    /// 校验必填字段
    pub fn validate(&self) -> Result<(), BusinessError> {
        if self.paper_context.id.trim().is_empty() {
            return Err(BusinessError::EmptyPaperId);
        }

        let has_text = self
            .student_answer
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        let has_file = self
            .answer_file
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if !has_text && !has_file {
            return Err(BusinessError::EmptyAnswer);
        }

        if self.total_marks < 0 {
            return Err(BusinessError::InvalidTotalMarks {
                value: self.total_marks,
            });
        }

        Ok(())
    }
}
