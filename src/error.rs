use std::fmt;

use thiserror::Error;

// ========== 能力层错误（会在评分流程内部被吸收） ==========

/// 试卷ID解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaperIdError {
    /// 试卷ID段数不足
    #[error("试卷ID格式错误，至少需要 5 段: {paper_id}")]
    MalformedPaperId { paper_id: String },
    /// 考试季代码不在 fm / mj / on 之内
    #[error("未知的考试季代码: '{raw}'")]
    UnknownSessionCode { raw: String },
}

/// 评分标准文件获取错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 文件不存在
    #[error("评分标准文件不存在: {name}")]
    NotFound { name: String },
    /// 无法访问（IO / 网络）
    #[error("评分标准文件无法访问 ({name}): {reason}")]
    Unreachable { name: String, reason: String },
    /// 服务端返回非成功状态
    #[error("评分标准服务返回错误状态 ({name}): {status}")]
    ServerError { name: String, status: u16 },
}

/// OCR 服务错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcrError {
    /// API Key 或端点未配置
    #[error("OCR 服务未配置或 API Key 为占位符")]
    NotConfigured,
    /// 请求发送失败
    #[error("OCR 请求失败 ({filename}): {reason}")]
    RequestFailed { filename: String, reason: String },
    /// 服务返回错误响应
    #[error("OCR 服务返回错误 ({filename}): {status} - {message}")]
    BadResponse {
        filename: String,
        status: u16,
        message: String,
    },
    /// 响应体无法解析
    #[error("OCR 响应无法解析 ({filename}): {reason}")]
    InvalidBody { filename: String, reason: String },
}

/// AI 评分服务错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    /// API Key 未配置
    #[error("AI service is not configured")]
    NotConfigured,
    /// 返回内容为空
    #[error("AI response content is empty")]
    EmptyResponse,
    /// 网络或协议错误
    #[error("AI transport error: {0}")]
    TransportError(String),
    /// 请求频率限制
    #[error("AI rate limit reached: {0}")]
    RateLimited(String),
}

// ========== 应用层错误 ==========

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 文件操作错误
    File(FileError),
    /// OCR 错误
    Ocr(OcrError),
    /// 业务逻辑错误
    Business(BusinessError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Ocr(e) => write!(f, "OCR错误: {}", e),
            AppError::Business(e) => write!(f, "业务错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::File(e) => Some(e),
            AppError::Ocr(e) => Some(e),
            AppError::Business(e) => Some(e),
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 文件不存在
    NotFound { path: String },
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::NotFound { path } => write!(f, "文件不存在: {}", path),
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            FileError::NotFound { .. } => None,
        }
    }
}

/// 业务逻辑错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusinessError {
    /// 试卷ID为空
    EmptyPaperId,
    /// 既没有答案文本也没有答案文件
    EmptyAnswer,
    /// 总分非法
    InvalidTotalMarks { value: i64 },
    /// 上传的答案扫描件类型不支持
    UnsupportedMimeType { mimetype: String },
    /// 上传的答案扫描件过大
    FileTooLarge { size: usize, limit: usize },
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessError::EmptyPaperId => write!(f, "试卷ID不能为空"),
            BusinessError::EmptyAnswer => write!(f, "学生答案为空"),
            BusinessError::InvalidTotalMarks { value } => {
                write!(f, "总分非法: {}", value)
            }
            BusinessError::UnsupportedMimeType { mimetype } => {
                write!(f, "不支持的文件类型: {}", mimetype)
            }
            BusinessError::FileTooLarge { size, limit } => {
                write!(f, "文件过大: {} 字节 (上限 {} 字节)", size, limit)
            }
        }
    }
}

impl std::error::Error for BusinessError {}

// ========== 从常见错误类型转换 ==========

impl From<OcrError> for AppError {
    fn from(err: OcrError) -> Self {
        AppError::Ocr(err)
    }
}

impl From<BusinessError> for AppError {
    fn from(err: BusinessError) -> Self {
        AppError::Business(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件不存在错误
    pub fn file_not_found(path: impl Into<String>) -> Self {
        AppError::File(FileError::NotFound { path: path.into() })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
