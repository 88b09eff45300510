pub mod artifact_fetcher;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, MarkSchemeSource};

pub use artifact_fetcher::{ArtifactFetcher, LocalArtifactFetcher, RemoteArtifactFetcher};

/// 按配置构建评分标准获取器
pub fn build_artifact_fetcher(config: &Config) -> Arc<dyn ArtifactFetcher> {
    match config.mark_scheme_source() {
        MarkSchemeSource::Local(dir) => Arc::new(LocalArtifactFetcher::new(dir)),
        MarkSchemeSource::Remote(url) => Arc::new(RemoteArtifactFetcher::new(
            url,
            Duration::from_secs(config.http_timeout_secs),
        )),
    }
}
