use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use paper_grader::clients::{AiClient, OcrClient};
use paper_grader::error::{AiError, FetchError, OcrError};
use paper_grader::infrastructure::{ArtifactFetcher, LocalArtifactFetcher};
use paper_grader::models::{Grade, PaperContext};
use paper_grader::services::{FallbackReason, MarkSchemeResolver};
use paper_grader::GradingFlow;

struct NotFoundFetcher;

#[async_trait]
impl ArtifactFetcher for NotFoundFetcher {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::NotFound {
            name: name.to_string(),
        })
    }

    fn location(&self, name: &str) -> String {
        format!("ms/{}", name)
    }
}

struct ScriptedOcr(Result<String, OcrError>);

#[async_trait]
impl OcrClient for ScriptedOcr {
    async fn extract_text(&self, _: &[u8], _: &str, _: &str) -> Result<String, OcrError> {
        self.0.clone()
    }
}

/// 记录提示词并返回固定响应
struct CapturingAi {
    response: String,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl AiClient for CapturingAi {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.response.clone())
    }
}

#[tokio::test]
async fn test_grading_with_missing_mark_scheme() {
    let ai = Arc::new(CapturingAi {
        response: r#"{"score":45,"totalMarks":60,"grade":"B","feedback":"Well argued.","outline":"- Define\n- Analyse","highlightReferences":[],"sectionScores":{}}"#.to_string(),
        prompts: Mutex::new(Vec::new()),
    });
    let resolver = MarkSchemeResolver::new(
        Arc::new(NotFoundFetcher),
        Arc::new(ScriptedOcr(Err(OcrError::NotConfigured))),
    );
    let flow = GradingFlow::new(resolver, ai.clone());

    let outcome = flow
        .evaluate(
            &PaperContext::new("econ-9708-22-mj-23"),
            "A fall in the exchange rate makes exports cheaper...",
            60,
        )
        .await;

    assert_eq!(outcome.result.score, 45);
    assert_eq!(outcome.result.total_marks, 60);
    assert_eq!(outcome.result.grade, Grade::B);
    assert_eq!(outcome.mark_scheme_fallback, Some(FallbackReason::NotFound));

    let prompts = ai.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("not found"));
    assert!(prompts[0].contains("9708_s23_ms_22.pdf"));
    assert!(prompts[0].contains("A fall in the exchange rate makes exports cheaper..."));
}

#[tokio::test]
async fn test_resolver_outcomes_from_local_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("9708_s23_ms_22.pdf"), b"%PDF-1.7").unwrap();
    let fetcher: Arc<dyn ArtifactFetcher> = Arc::new(LocalArtifactFetcher::new(dir.path()));

    let mark_scheme = "Question 1(a): explain two causes of cost-push inflation. 2 marks each.";
    let resolver = MarkSchemeResolver::new(
        fetcher.clone(),
        Arc::new(ScriptedOcr(Ok(mark_scheme.to_string()))),
    );
    let found = resolver.resolve("econ-9708-22-mj-23").await;
    assert!(!found.is_fallback);
    assert_eq!(found.text, mark_scheme);

    let missing = resolver.resolve("econ-9708-22-on-23").await;
    assert!(missing.is_fallback);
    assert_eq!(missing.fallback_reason, Some(FallbackReason::NotFound));

    let failing = MarkSchemeResolver::new(
        fetcher,
        Arc::new(ScriptedOcr(Err(OcrError::InvalidBody {
            filename: "9708_s23_ms_22.pdf".to_string(),
            reason: "not json".to_string(),
        }))),
    );
    let extraction = failing.resolve("econ-9708-22-mj-23").await;
    assert!(extraction.is_fallback);
    assert!(extraction.text.contains("extraction failed"));
}

/// OCR 原样返回文件内容
struct EchoOcr;

#[async_trait]
impl OcrClient for EchoOcr {
    async fn extract_text(&self, bytes: &[u8], _: &str, _: &str) -> Result<String, OcrError> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[tokio::test]
async fn test_paper_id_cannot_read_outside_mark_scheme_dir() {
    let outside = tempfile::TempDir::new().unwrap();
    let secret = "TOP SECRET content that must never be sent to the grading model. ".repeat(2);
    std::fs::write(outside.path().join("secret_m24_ms_22.pdf"), &secret).unwrap();
    std::fs::write(outside.path().join("up_m24_ms_22.pdf"), &secret).unwrap();
    let ms_dir = outside.path().join("ms");
    std::fs::create_dir(&ms_dir).unwrap();

    let resolver = MarkSchemeResolver::new(
        Arc::new(LocalArtifactFetcher::new(&ms_dir)),
        Arc::new(EchoOcr),
    );

    let absolute = format!("x-{}/secret-22-fm-24", outside.path().display());
    for paper_id in [absolute.as_str(), "x-../up-22-fm-24"] {
        let ms = resolver.resolve(paper_id).await;
        assert!(ms.is_fallback, "{}", paper_id);
        assert_eq!(ms.fallback_reason, Some(FallbackReason::UnrecognizedPaperId));
        assert!(!ms.text.contains("TOP SECRET"));
    }
}
