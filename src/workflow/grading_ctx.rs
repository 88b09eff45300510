//! 评分请求上下文
//!
//! 封装"我正在处理第几个请求、哪张试卷"这一信息，只用于日志

use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct GradingCtx {
    /// 请求索引（仅用于日志显示，从1开始）
    pub request_index: usize,
    /// 试卷ID
    pub paper_id: String,
}

impl GradingCtx {
    pub fn new(request_index: usize, paper_id: impl Into<String>) -> Self {
        Self {
            request_index,
            paper_id: paper_id.into(),
        }
    }
}

impl Display for GradingCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[请求 #{} 试卷 {}]", self.request_index, self.paper_id)
    }
}
