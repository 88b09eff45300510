//! 评分流程 - 流程层
//!
//! 核心职责：定义"一份答案"的完整评分流程
//!
//! 流程顺序：
//! 1. 补全试卷上下文
//! 2. 获取评分标准（失败时降级为兜底文本）
//! 3. 构建提示词 → AI 评分
//! 4. 规范化 AI 返回的 JSON
//!
//! 调用方总能拿到结构完整的 `GradeResult`，只有 `run_checked` 会把
//! "AI 未配置" 作为错误返回。

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::clients::{AiClient, OcrClient, OpenAiGradingClient};
use crate::config::Config;
use crate::error::AiError;
use crate::infrastructure::build_artifact_fetcher;
use crate::models::{GradeResult, PaperContext};
use crate::services::{FallbackReason, GradeNormalizer, MarkSchemeResolver, PromptBuilder};
use crate::utils::logging::truncate_text;

const AI_FAILURE_OUTLINE: &str = "Outline generation failed due to an AI processing error.";

/// 单次评分的结果及其降级信息
#[derive(Debug, Clone, PartialEq)]
pub struct GradingOutcome {
    pub result: GradeResult,
    /// 评分标准走了兜底文本
    pub mark_scheme_fallback: Option<FallbackReason>,
    /// AI 调用失败，`result` 是合成的零分结果
    pub ai_failure: Option<AiError>,
}

impl GradingOutcome {
    /// 结果是否在降级条件下产生
    pub fn is_degraded(&self) -> bool {
        self.mark_scheme_fallback.is_some() || self.ai_failure.is_some()
    }
}

/// 评分流程
///
/// - 不持有可变状态，可以在多个任务间共享
/// - 只依赖业务能力（services）和客户端 trait
pub struct GradingFlow {
    resolver: MarkSchemeResolver,
    ai_client: Arc<dyn AiClient>,
    verbose_logging: bool,
}

impl GradingFlow {
    pub fn new(resolver: MarkSchemeResolver, ai_client: Arc<dyn AiClient>) -> Self {
        Self {
            resolver,
            ai_client,
            verbose_logging: false,
        }
    }

    pub fn with_verbose_logging(mut self, verbose_logging: bool) -> Self {
        self.verbose_logging = verbose_logging;
        self
    }

    /// 按配置创建 AI 客户端和评分标准来源，OCR 客户端与其他服务共享
    pub fn from_config_with_ocr(config: &Config, ocr_client: Arc<dyn OcrClient>) -> Self {
        let resolver = MarkSchemeResolver::new(build_artifact_fetcher(config), ocr_client)
            .with_min_chars(config.min_mark_scheme_chars);
        let ai_client: Arc<dyn AiClient> = Arc::new(OpenAiGradingClient::new(config));

        Self::new(resolver, ai_client).with_verbose_logging(config.verbose_logging)
    }

    /// 评分并返回降级信息
    pub async fn evaluate(
        &self,
        paper_context: &PaperContext,
        student_answer: &str,
        total_marks: i64,
    ) -> GradingOutcome {
        let context = paper_context.completed();
        let total_marks = total_marks.max(0);
        let paper_id = context.id.as_str();

        // ========== 步骤 1: 评分标准 ==========
        let mark_scheme = self.resolver.resolve(paper_id).await;

        // ========== 步骤 2: 提示词 ==========
        let prompt = PromptBuilder::build(&context, &mark_scheme.text, student_answer, total_marks);
        debug!("[试卷 {}] 提示词长度: {} 字符", paper_id, prompt.chars().count());
        if self.verbose_logging {
            info!("[试卷 {}] 学生答案: {}", paper_id, truncate_text(student_answer, 80));
        }

        // ========== 步骤 3: AI 评分 ==========
        info!("[试卷 {}] 🤖 请求 AI 评分...", paper_id);
        let raw = match self.ai_client.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("[试卷 {}] ❌ AI 评分失败: {}", paper_id, e);
                return GradingOutcome {
                    result: GradeResult::zeroed(
                        total_marks,
                        format!("Error during AI processing: {}. Please try again.", e),
                        AI_FAILURE_OUTLINE,
                    ),
                    mark_scheme_fallback: mark_scheme.fallback_reason,
                    ai_failure: Some(e),
                };
            }
        };

        if self.verbose_logging {
            info!("[试卷 {}] AI 原始响应: {}", paper_id, truncate_text(&raw, 200));
        }

        // ========== 步骤 4: 规范化 ==========
        let result = GradeNormalizer::normalize(&raw, total_marks);
        info!(
            "[试卷 {}] ✓ 评分完成: {}/{} ({})",
            paper_id, result.score, result.total_marks, result.grade
        );

        GradingOutcome {
            result,
            mark_scheme_fallback: mark_scheme.fallback_reason,
            ai_failure: None,
        }
    }

    /// 评分，任何失败都编码在返回的结果中
    pub async fn run(
        &self,
        paper_context: &PaperContext,
        student_answer: &str,
        total_marks: i64,
    ) -> GradeResult {
        self.evaluate(paper_context, student_answer, total_marks)
            .await
            .result
    }

    /// 评分，AI 未配置时返回错误而不是合成结果
    pub async fn run_checked(
        &self,
        paper_context: &PaperContext,
        student_answer: &str,
        total_marks: i64,
    ) -> Result<GradeResult, AiError> {
        if !self.ai_client.is_configured() {
            return Err(AiError::NotConfigured);
        }

        let outcome = self
            .evaluate(paper_context, student_answer, total_marks)
            .await;
        match outcome.ai_failure {
            Some(AiError::NotConfigured) => Err(AiError::NotConfigured),
            _ => Ok(outcome.result),
        }
    }
}
