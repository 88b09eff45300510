//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量评分处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载评分请求（Vec<GradingRequest>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `request_processor` - 单个请求处理器
//! - 校验请求、准备答案文本
//! - 委托 GradingFlow 评分
//! - 写出结果文件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<GradingRequest>)
//!     ↓
//! request_processor (处理单个 GradingRequest)
//!     ↓
//! workflow::GradingFlow (评分流程)
//!     ↓
//! services (能力层：评分标准 / 提示词 / 规范化 / 扫描件识别)
//!     ↓
//! clients + infrastructure (OCR / AI / 评分标准文件)
//! ```

pub mod batch_processor;
pub mod request_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use request_processor::{process_request, RequestStatus};
