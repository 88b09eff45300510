use crate::models::request::GradingRequest;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 支持的请求文件扩展名
const REQUEST_EXTENSIONS: [&str; 2] = ["toml", "json"];

fn is_request_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| REQUEST_EXTENSIONS.contains(&ext))
}

/// 从 TOML / JSON 文件加载评分请求
pub async fn load_request(request_file_path: &Path) -> Result<GradingRequest> {
    let content = fs::read_to_string(request_file_path)
        .await
        .with_context(|| format!("无法读取请求文件: {}", request_file_path.display()))?;

    let request: GradingRequest = match request_file_path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("无法解析JSON文件: {}", request_file_path.display()))?,
        _ => toml::from_str(&content)
            .with_context(|| format!("无法解析TOML文件: {}", request_file_path.display()))?,
    };

    Ok(request.with_file_path(request_file_path.to_string_lossy().to_string()))
}

/// 从文件夹中加载所有评分请求
///
/// 单个文件解析失败只记录警告，不影响其他文件。结果按文件名排序。
pub async fn load_all_requests(folder_path: &str) -> Result<Vec<GradingRequest>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_request_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut requests = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_request(&path).await {
            Ok(request) => {
                tracing::info!("成功加载请求，试卷: {}", request.paper_context.id);
                requests.push(request);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(requests)
}
