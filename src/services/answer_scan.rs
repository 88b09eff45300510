//! 答案扫描件识别服务
//!
//! 学生上传的答案是图片 / PDF / Word 时，先校验类型和大小，再交给 OCR。
//! 纯文本文件直接读取，不经过 OCR。

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::OcrClient;
use crate::error::{AppError, AppResult, BusinessError};

/// 允许上传的文件类型
pub const ALLOWED_SCAN_MIMETYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// 单个文件大小上限：15 MB
pub const MAX_SCAN_BYTES: usize = 15 * 1024 * 1024;

/// 答案扫描件识别服务
pub struct AnswerScanService {
    ocr_client: Arc<dyn OcrClient>,
}

impl AnswerScanService {
    pub fn new(ocr_client: Arc<dyn OcrClient>) -> Self {
        Self { ocr_client }
    }

    /// 识别内存中的文件
    pub async fn extract(&self, bytes: &[u8], mimetype: &str, filename: &str) -> AppResult<String> {
        check_upload(bytes.len(), mimetype)?;

        if mimetype == "text/plain" {
            debug!("{} 是纯文本，直接读取", filename);
            return Ok(String::from_utf8_lossy(bytes).into_owned());
        }

        info!("🔎 识别答案扫描件: {} ({}, {} 字节)", filename, mimetype, bytes.len());
        let text = self
            .ocr_client
            .extract_text(bytes, mimetype, filename)
            .await?;
        Ok(text)
    }

    /// 识别磁盘上的文件，类型由扩展名推断
    pub async fn extract_file(&self, path: impl AsRef<Path>) -> AppResult<String> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let io_error = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::file_not_found(&path_str)
            } else {
                AppError::file_read_failed(&path_str, e)
            }
        };

        let mimetype = mime_guess::from_path(path).first_or_octet_stream();

        // 先看文件大小，超限的文件不读入内存
        let size = tokio::fs::metadata(path).await.map_err(io_error)?.len();
        check_upload(
            usize::try_from(size).unwrap_or(usize::MAX),
            mimetype.essence_str(),
        )?;

        let bytes = tokio::fs::read(path).await.map_err(io_error)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_str.clone());

        self.extract(&bytes, mimetype.essence_str(), &filename).await
    }
}

fn check_upload(size: usize, mimetype: &str) -> Result<(), BusinessError> {
    if !ALLOWED_SCAN_MIMETYPES.contains(&mimetype) {
        return Err(BusinessError::UnsupportedMimeType {
            mimetype: mimetype.to_string(),
        });
    }
    if size > MAX_SCAN_BYTES {
        return Err(BusinessError::FileTooLarge {
            size,
            limit: MAX_SCAN_BYTES,
        });
    }
    Ok(())
}
