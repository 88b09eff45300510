//! 评分标准文件获取 - 基础设施层
//!
//! 只暴露"按文件名取字节"的能力，不认识试卷ID。

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::FetchError;

/// 评分标准文件获取能力
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// 获取指定文件的原始字节
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError>;

    /// 文件位置描述（仅用于日志）
    fn location(&self, name: &str) -> String;
}

/// 本地目录
pub struct LocalArtifactFetcher {
    root: PathBuf,
}

impl LocalArtifactFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactFetcher for LocalArtifactFetcher {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        // 只接受单个文件名，不能跳出评分标准目录
        if !is_plain_file_name(name) {
            warn!("拒绝读取评分标准目录之外的路径: {}", name);
            return Err(FetchError::NotFound {
                name: name.to_string(),
            });
        }

        let path = self.root.join(name);
        debug!("读取本地评分标准: {}", path.display());

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound {
                name: name.to_string(),
            },
            _ => FetchError::Unreachable {
                name: name.to_string(),
                reason: e.to_string(),
            },
        })
    }

    fn location(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// 静态文件服务器
pub struct RemoteArtifactFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteArtifactFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}

#[async_trait]
impl ArtifactFetcher for RemoteArtifactFetcher {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(name);
        debug!("下载评分标准: {}", url);

        let unreachable = |e: reqwest::Error| FetchError::Unreachable {
            name: name.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(unreachable)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(FetchError::NotFound {
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::ServerError {
                name: name.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(unreachable)?;
        debug!("下载完成: {} ({} 字节)", name, bytes.len());
        Ok(bytes.to_vec())
    }

    fn location(&self, name: &str) -> String {
        self.url_for(name)
    }
}
