//! 单个评分请求处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **校验请求**：试卷ID、答案、总分
//! 2. **准备答案文本**：直接使用答案文本，或识别答案扫描件
//! 3. **流程调度**：委托 `GradingFlow` 评分
//! 4. **结果落盘**：写入 `<输出目录>/<请求文件名>.result.json`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{GradeResult, GradingRequest};
use crate::services::AnswerScanService;
use crate::workflow::{GradingCtx, GradingFlow};

/// 请求处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// 正常评分
    Graded,
    /// 已评分，但评分标准走了兜底或 AI 调用失败
    Degraded,
}

/// 处理单个评分请求
///
/// # 返回
/// 校验失败、答案文件无法识别、结果无法写入时返回错误
pub async fn process_request(
    flow: &GradingFlow,
    scanner: &AnswerScanService,
    request: GradingRequest,
    request_index: usize,
    config: &Config,
) -> Result<RequestStatus> {
    let ctx = GradingCtx::new(request_index, request.paper_context.id.trim());
    info!("{} 📝 开始评分 (总分 {})", ctx, request.total_marks);

    request
        .validate()
        .with_context(|| format!("{} 请求校验失败", ctx))?;

    let student_answer = answer_text(scanner, &request, &ctx).await?;

    let outcome = flow
        .evaluate(&request.paper_context, &student_answer, request.total_marks)
        .await;

    if let Some(reason) = outcome.mark_scheme_fallback {
        warn!("{} ⚠️ 评分标准使用兜底文本: {:?}", ctx, reason);
    }
    if let Some(e) = &outcome.ai_failure {
        warn!("{} ⚠️ AI 评分失败，已写入零分结果: {}", ctx, e);
    }

    let output_path = result_path(&config.output_folder, &request, request_index);
    write_result(&output_path, &outcome.result).await?;
    info!(
        "{} ✓ 结果已保存: {} ({}/{} {})",
        ctx,
        output_path.display(),
        outcome.result.score,
        outcome.result.total_marks,
        outcome.result.grade
    );

    Ok(if outcome.is_degraded() {
        RequestStatus::Degraded
    } else {
        RequestStatus::Graded
    })
}

/// 取得答案文本；没有文本时识别答案文件（相对路径以请求文件所在目录为基准）
async fn answer_text(
    scanner: &AnswerScanService,
    request: &GradingRequest,
    ctx: &GradingCtx,
) -> Result<String> {
    if let Some(text) = request
        .student_answer
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        return Ok(text.to_string());
    }

    let answer_file = request
        .answer_file
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .with_context(|| format!("{} 缺少答案", ctx))?;

    let mut path = PathBuf::from(answer_file);
    if path.is_relative() {
        if let Some(dir) = request
            .file_path
            .as_deref()
            .and_then(|p| Path::new(p).parent())
        {
            path = dir.join(path);
        }
    }

    info!("{} 📎 读取答案文件: {}", ctx, path.display());
    let text = scanner
        .extract_file(&path)
        .await
        .with_context(|| format!("{} 答案文件识别失败: {}", ctx, path.display()))?;

    if text.trim().is_empty() {
        anyhow::bail!("{} 答案文件中没有识别出文字: {}", ctx, path.display());
    }
    Ok(text)
}

fn result_path(output_folder: &str, request: &GradingRequest, request_index: usize) -> PathBuf {
    let stem = request
        .file_path
        .as_deref()
        .and_then(|p| Path::new(p).file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("request_{}", request_index));
    Path::new(output_folder).join(format!("{}.result.json", stem))
}

async fn write_result(path: &Path, result: &GradeResult) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("无法创建输出目录: {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(result)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("无法写入结果文件: {}", path.display()))
}
