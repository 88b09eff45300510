//! # Paper Grader
//!
//! A-Level 试卷答案的 AI 评分流水线
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `infrastructure/` - 评分标准文件的获取（本地目录 / HTTP）
//! - `clients/` - OCR 服务和 AI 服务，均以 trait 暴露
//!
//! ### ② 业务能力层（Services）
//! - `MarkSchemeResolver` - 试卷ID → 评分标准文本（失败时兜底）
//! - `PromptBuilder` - 构建评分提示词
//! - `GradeNormalizer` - 把 AI 返回的 JSON 规范化为 `GradeResult`
//! - `AnswerScanService` - 识别学生上传的答案扫描件
//!
//! ### ③ 流程层（Workflow）
//! - `GradingFlow` - 一份答案的完整评分流程
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量评分，管理并发
//! - `orchestrator/request_processor` - 单个请求的校验、评分、落盘
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{GradeResult, GradingRequest, PaperContext, PaperId};
pub use orchestrator::{App, ProcessingStats};
pub use workflow::{GradingFlow, GradingOutcome};
