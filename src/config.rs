use std::path::PathBuf;

/// 评分标准文件的来源
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkSchemeSource {
    /// 本地目录
    Local(PathBuf),
    /// 静态文件服务器（基础 URL，例如 `https://site/ms`）
    Remote(String),
}

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时评分的请求数量
    pub max_concurrent_requests: usize,
    /// 评分请求文件（TOML / JSON）存放目录
    pub request_folder: String,
    /// 评分结果输出目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 评分标准配置 ---
    pub mark_scheme_dir: String,
    /// 设置后从 HTTP 获取评分标准，优先于本地目录
    pub mark_scheme_base_url: Option<String>,
    /// OCR 结果少于该字符数时视为内容稀疏
    pub min_mark_scheme_chars: usize,
    pub http_timeout_secs: u64,
    // --- OCR 配置 ---
    pub ocr_api_key: String,
    pub ocr_endpoint_url: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 4,
            request_folder: "requests".to_string(),
            output_folder: "results".to_string(),
            verbose_logging: false,
            output_log_file: "grading_log.txt".to_string(),
            mark_scheme_dir: "ms".to_string(),
            mark_scheme_base_url: None,
            min_mark_scheme_chars: 50,
            http_timeout_secs: 60,
            ocr_api_key: String::new(),
            ocr_endpoint_url: String::new(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-3.5-turbo-0125".to_string(),
            llm_temperature: 0.5,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_requests: std::env::var("MAX_CONCURRENT_REQUESTS").ok().and_then(|v| v.parse().ok()).filter(|v| *v > 0).unwrap_or(default.max_concurrent_requests),
            request_folder: std::env::var("REQUEST_FOLDER").unwrap_or(default.request_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            mark_scheme_dir: std::env::var("MARK_SCHEME_DIR").unwrap_or(default.mark_scheme_dir),
            mark_scheme_base_url: std::env::var("MARK_SCHEME_BASE_URL").ok().filter(|v| !v.trim().is_empty()),
            min_mark_scheme_chars: std::env::var("MIN_MARK_SCHEME_CHARS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.min_mark_scheme_chars),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.http_timeout_secs),
            ocr_api_key: std::env::var("OCR_API_KEY").unwrap_or(default.ocr_api_key),
            ocr_endpoint_url: std::env::var("OCR_ENDPOINT_URL").unwrap_or(default.ocr_endpoint_url),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
        }
    }

    /// 根据配置选择评分标准来源
    pub fn mark_scheme_source(&self) -> MarkSchemeSource {
        match &self.mark_scheme_base_url {
            Some(url) => MarkSchemeSource::Remote(url.clone()),
            None => MarkSchemeSource::Local(PathBuf::from(&self.mark_scheme_dir)),
        }
    }
}
