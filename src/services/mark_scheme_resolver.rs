//! 评分标准解析服务 - 业务能力层
//!
//! 试卷ID → 文件名 → 获取字节 → OCR → 文本。
//! 任何一步失败都降级为带标签的兜底文本，从不向上返回错误。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::OcrClient;
use crate::error::FetchError;
use crate::infrastructure::ArtifactFetcher;
use crate::models::PaperId;

/// 评分标准文件的 MIME 类型
pub const MARK_SCHEME_MIMETYPE: &str = "application/pdf";

/// OCR 文本的最少字符数
pub const DEFAULT_MIN_MARK_SCHEME_CHARS: usize = 50;

/// 兜底原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// 试卷ID无法识别
    UnrecognizedPaperId,
    /// 文件不存在
    NotFound,
    /// 文件无法访问
    Inaccessible,
    /// OCR 失败
    ExtractionFailed,
    /// OCR 文本过少
    Sparse,
}

impl FallbackReason {
    /// 写入提示词的兜底文本
    fn sentence(self, filename: Option<&str>) -> String {
        let file = filename.unwrap_or("unknown file");
        match self {
            FallbackReason::UnrecognizedPaperId => "Mark scheme could not be loaded: paper id unrecognized. Grade based on general A-Level principles for the subject.".to_string(),
            FallbackReason::NotFound => format!("Mark scheme file ({}) not found. Grade based on general A-Level principles.", file),
            FallbackReason::Inaccessible => format!("Mark scheme inaccessible: {} could not be retrieved. Grade based on general A-Level principles.", file),
            FallbackReason::ExtractionFailed => format!("Mark scheme extraction failed for {}. Grade based on general A-Level principles.", file),
            FallbackReason::Sparse => format!("Mark scheme content sparse: too little text could be extracted from {}. Grade based on general A-Level principles.", file),
        }
    }
}

/// 评分标准文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSchemeText {
    pub text: String,
    pub is_fallback: bool,
    pub fallback_reason: Option<FallbackReason>,
}

impl MarkSchemeText {
    fn genuine(text: String) -> Self {
        Self {
            text,
            is_fallback: false,
            fallback_reason: None,
        }
    }

    fn fallback(reason: FallbackReason, filename: Option<&str>) -> Self {
        Self {
            text: reason.sentence(filename),
            is_fallback: true,
            fallback_reason: Some(reason),
        }
    }
}

/// 评分标准解析服务
pub struct MarkSchemeResolver {
    fetcher: Arc<dyn ArtifactFetcher>,
    ocr_client: Arc<dyn OcrClient>,
    min_chars: usize,
}

impl MarkSchemeResolver {
    pub fn new(fetcher: Arc<dyn ArtifactFetcher>, ocr_client: Arc<dyn OcrClient>) -> Self {
        Self {
            fetcher,
            ocr_client,
            min_chars: DEFAULT_MIN_MARK_SCHEME_CHARS,
        }
    }

    /// 设置最少字符数阈值
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// 获取评分标准文本
    pub async fn resolve(&self, paper_id: &str) -> MarkSchemeText {
        let parsed = match PaperId::parse(paper_id) {
            Ok(id) => id,
            Err(e) => {
                warn!("[试卷 {}] ⚠️ 无法确定评分标准文件名: {}", paper_id, e);
                return MarkSchemeText::fallback(FallbackReason::UnrecognizedPaperId, None);
            }
        };

        let filename = parsed.mark_scheme_filename();
        info!(
            "[试卷 {}] 📄 加载评分标准: {}",
            paper_id,
            self.fetcher.location(&filename)
        );

        let bytes = match self.fetcher.fetch(&filename).await {
            Ok(bytes) => bytes,
            Err(e @ FetchError::NotFound { .. }) => {
                warn!("[试卷 {}] ⚠️ {}", paper_id, e);
                return MarkSchemeText::fallback(FallbackReason::NotFound, Some(&filename));
            }
            Err(e) => {
                warn!("[试卷 {}] ⚠️ {}", paper_id, e);
                return MarkSchemeText::fallback(FallbackReason::Inaccessible, Some(&filename));
            }
        };

        debug!("[试卷 {}] 评分标准大小: {} 字节，开始 OCR", paper_id, bytes.len());

        let text = match self
            .ocr_client
            .extract_text(&bytes, MARK_SCHEME_MIMETYPE, &filename)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("[试卷 {}] ⚠️ 评分标准 OCR 失败: {}", paper_id, e);
                return MarkSchemeText::fallback(FallbackReason::ExtractionFailed, Some(&filename));
            }
        };

        let char_count = text.trim().chars().count();
        if char_count < self.min_chars {
            warn!(
                "[试卷 {}] ⚠️ 评分标准 OCR 文本过少 ({} < {})",
                paper_id, char_count, self.min_chars
            );
            return MarkSchemeText::fallback(FallbackReason::Sparse, Some(&filename));
        }

        info!("[试卷 {}] ✓ 评分标准加载成功 ({} 字符)", paper_id, char_count);
        MarkSchemeText::genuine(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubFetcher {
        result: Result<Vec<u8>, FetchError>,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(result: Result<Vec<u8>, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ArtifactFetcher for StubFetcher {
        async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
            self.requested.lock().unwrap().push(name.to_string());
            self.result.clone()
        }

        fn location(&self, name: &str) -> String {
            format!("stub://{}", name)
        }
    }

    struct StubOcr {
        result: Result<String, OcrError>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl StubOcr {
        fn new(result: Result<String, OcrError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl OcrClient for StubOcr {
        async fn extract_text(
            &self,
            _bytes: &[u8],
            mimetype: &str,
            filename: &str,
        ) -> Result<String, OcrError> {
            self.calls
                .lock()
                .unwrap()
                .push((mimetype.to_string(), filename.to_string()));
            self.result.clone()
        }
    }

    fn long_text() -> String {
        "1(a) Definition of opportunity cost: 2 marks. Award 1 mark for ... ".repeat(3)
    }

    #[tokio::test]
    async fn test_resolve_genuine_text() {
        let fetcher = StubFetcher::new(Ok(b"%PDF".to_vec()));
        let ocr = StubOcr::new(Ok(long_text()));
        let resolver = MarkSchemeResolver::new(fetcher.clone(), ocr.clone());

        let ms = resolver.resolve("econ-9708-22-fm-24").await;
        assert!(!ms.is_fallback);
        assert_eq!(ms.text, long_text());
        assert_eq!(
            fetcher.requested.lock().unwrap().as_slice(),
            ["9708_m24_ms_22.pdf".to_string()]
        );
        assert_eq!(
            ocr.calls.lock().unwrap().as_slice(),
            [(
                "application/pdf".to_string(),
                "9708_m24_ms_22.pdf".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_unrecognized_paper_id_skips_fetch() {
        let fetcher = StubFetcher::new(Ok(b"%PDF".to_vec()));
        let resolver = MarkSchemeResolver::new(fetcher.clone(), StubOcr::new(Ok(long_text())));

        for id in ["badid", "econ-9708-22-xx-24"] {
            let ms = resolver.resolve(id).await;
            assert!(ms.is_fallback);
            assert_eq!(ms.fallback_reason, Some(FallbackReason::UnrecognizedPaperId));
            assert!(ms.text.contains("paper id unrecognized"));
        }
        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failures() {
        let cases = [
            (
                FetchError::NotFound { name: "f".into() },
                FallbackReason::NotFound,
                "not found",
            ),
            (
                FetchError::Unreachable {
                    name: "f".into(),
                    reason: "timeout".into(),
                },
                FallbackReason::Inaccessible,
                "inaccessible",
            ),
            (
                FetchError::ServerError {
                    name: "f".into(),
                    status: 500,
                },
                FallbackReason::Inaccessible,
                "inaccessible",
            ),
        ];

        for (error, reason, phrase) in cases {
            let ocr = StubOcr::new(Ok(long_text()));
            let resolver = MarkSchemeResolver::new(StubFetcher::new(Err(error)), ocr.clone());
            let ms = resolver.resolve("econ-9708-22-mj-23").await;
            assert!(ms.is_fallback);
            assert_eq!(ms.fallback_reason, Some(reason));
            assert!(ms.text.contains(phrase), "{}", ms.text);
            assert!(ocr.calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_ocr_failure_and_sparse_text() {
        let resolver = MarkSchemeResolver::new(
            StubFetcher::new(Ok(b"%PDF".to_vec())),
            StubOcr::new(Err(OcrError::NotConfigured)),
        );
        let ms = resolver.resolve("econ-9708-22-mj-23").await;
        assert_eq!(ms.fallback_reason, Some(FallbackReason::ExtractionFailed));
        assert!(ms.text.contains("extraction failed"));

        let resolver = MarkSchemeResolver::new(
            StubFetcher::new(Ok(b"%PDF".to_vec())),
            StubOcr::new(Ok("   short text   ".to_string())),
        );
        let ms = resolver.resolve("econ-9708-22-mj-23").await;
        assert_eq!(ms.fallback_reason, Some(FallbackReason::Sparse));
        assert!(ms.text.contains("content sparse"));
    }

    #[tokio::test]
    async fn test_sparse_threshold_boundary() {
        let at_threshold = format!("  {}  ", "x".repeat(DEFAULT_MIN_MARK_SCHEME_CHARS));
        let resolver = MarkSchemeResolver::new(
            StubFetcher::new(Ok(b"%PDF".to_vec())),
            StubOcr::new(Ok(at_threshold)),
        );
        assert!(!resolver.resolve("econ-9708-22-mj-23").await.is_fallback);

        let below = "y".repeat(DEFAULT_MIN_MARK_SCHEME_CHARS - 1);
        let resolver = MarkSchemeResolver::new(
            StubFetcher::new(Ok(b"%PDF".to_vec())),
            StubOcr::new(Ok(below)),
        );
        let ms = resolver.resolve("econ-9708-22-mj-23").await;
        assert_eq!(ms.fallback_reason, Some(FallbackReason::Sparse));
    }

    #[tokio::test]
    async fn test_min_chars_is_configurable() {
        let resolver = MarkSchemeResolver::new(
            StubFetcher::new(Ok(b"%PDF".to_vec())),
            StubOcr::new(Ok("short but enough".to_string())),
        )
        .with_min_chars(10);
        let ms = resolver.resolve("econ-9708-22-mj-23").await;
        assert!(!ms.is_fallback);
    }
}
