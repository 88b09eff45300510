//! OCR 客户端
//!
//! 将 PDF / 图片字节发送到 OCR 服务，返回识别出的文本
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::OcrError;

const PLACEHOLDER_API_KEY: &str = "YOUR_COMPDFKIT_API_KEY_PLACEHOLDER";

/// OCR 能力
#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn extract_text(
        &self,
        bytes: &[u8],
        mimetype: &str,
        filename: &str,
    ) -> Result<String, OcrError>;
}

/// ComPDFKit OCR 客户端
pub struct ComPdfKitOcrClient {
    client: reqwest::Client,
    api_key: String,
    endpoint_url: String,
}

impl ComPdfKitOcrClient {
    /// 创建新的 OCR 客户端
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .unwrap_or_default();

        Self::with_client(client, &config.ocr_api_key, &config.ocr_endpoint_url)
    }

    pub fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        endpoint_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint_url: endpoint_url.into(),
        }
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
            && self.api_key != PLACEHOLDER_API_KEY
            && !self.endpoint_url.trim().is_empty()
    }
}

#[async_trait]
impl OcrClient for ComPdfKitOcrClient {
    async fn extract_text(
        &self,
        bytes: &[u8],
        mimetype: &str,
        filename: &str,
    ) -> Result<String, OcrError> {
        if !self.is_configured() {
            warn!("OCR 服务未配置，无法处理文件: {}", filename);
            return Err(OcrError::NotConfigured);
        }

        debug!(
            "调用 OCR 服务，文件: {}, 类型: {}, 大小: {} 字节",
            filename,
            mimetype,
            bytes.len()
        );

        let request_failed = |reason: String| OcrError::RequestFailed {
            filename: filename.to_string(),
            reason,
        };

        let part = Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(mimetype)
            .map_err(|e| request_failed(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint_url)
            .header(AUTHORIZATION, &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_failed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| request_failed(e.to_string()))?;

        if !status.is_success() {
            warn!("OCR 服务返回错误: {} - {}", status, body);
            return Err(OcrError::BadResponse {
                filename: filename.to_string(),
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| format!("OCR API Error: {}", status.as_u16())),
            });
        }

        parse_ocr_body(&body, filename)
    }
}

/// 从错误响应体中提取 `msg` / `message`
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("msg")
        .or_else(|| json.get("message"))
        .and_then(|v| v.as_str())
        .map(String::from)
}

/// 解析成功响应：优先 `data.content`，其次 `content`，都没有时返回空文本
fn parse_ocr_body(body: &str, filename: &str) -> Result<String, OcrError> {
    let json: Value = serde_json::from_str(body).map_err(|e| OcrError::InvalidBody {
        filename: filename.to_string(),
        reason: e.to_string(),
    })?;

    if let Some(content) = json
        .get("data")
        .and_then(|d| d.get("content"))
        .and_then(|v| v.as_str())
    {
        debug!("OCR 成功: {}", filename);
        return Ok(content.to_string());
    }

    if let Some(content) = json.get("content").and_then(|v| v.as_str()) {
        debug!("OCR 成功 (备用结构): {}", filename);
        return Ok(content.to_string());
    }

    warn!("OCR 响应中没有找到文本内容: {}", filename);
    Ok(String::new())
}
