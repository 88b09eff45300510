//! 批量评分处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量评分请求的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建共享的 OCR / AI 客户端
//! 2. **批量加载**：扫描并加载所有待评分的请求（`Vec<GradingRequest>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将请求分批次处理，每批完成后再开始下一批
//! 5. **全局统计**：汇总成功 / 降级 / 失败数量
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个请求的细节
//! - **资源所有者**：客户端只创建一次，通过 `Arc` 共享给所有任务
//! - **向下委托**：委托 request_processor 处理单个请求

use crate::clients::{ComPdfKitOcrClient, OcrClient};
use crate::config::{Config, MarkSchemeSource};
use crate::models::GradingRequest;
use crate::orchestrator::request_processor::{self, RequestStatus};
use crate::services::AnswerScanService;
use crate::utils::logging;
use crate::workflow::GradingFlow;
use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<GradingFlow>,
    scanner: Arc<AnswerScanService>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;

        let mark_scheme_location = match config.mark_scheme_source() {
            MarkSchemeSource::Local(dir) => dir.display().to_string(),
            MarkSchemeSource::Remote(url) => url,
        };
        logging::log_startup(config.max_concurrent_requests, &mark_scheme_location);

        let ocr_client: Arc<dyn OcrClient> = Arc::new(ComPdfKitOcrClient::new(&config));
        let flow = GradingFlow::from_config_with_ocr(&config, ocr_client.clone());
        let scanner = AnswerScanService::new(ocr_client);

        Ok(Self::with_services(config, flow, scanner))
    }

    /// 使用自定义的评分流程（测试或嵌入其他程序时使用）
    pub fn with_services(config: Config, flow: GradingFlow, scanner: AnswerScanService) -> Self {
        Self {
            config,
            flow: Arc::new(flow),
            scanner: Arc::new(scanner),
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let all_requests = self.load_requests().await?;

        if all_requests.is_empty() {
            warn!("⚠️ 没有找到待评分的请求文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_requests_loaded(all_requests.len(), self.batch_size());

        let stats = self.process_all_requests(all_requests).await?;

        logging::print_final_stats(
            stats.success,
            stats.degraded,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    async fn load_requests(&self) -> Result<Vec<GradingRequest>> {
        info!("\n📁 正在扫描待评分的请求...");
        crate::models::load_all_requests(&self.config.request_folder).await
    }

    fn batch_size(&self) -> usize {
        self.config.max_concurrent_requests.max(1)
    }

    /// 处理所有请求
    async fn process_all_requests(
        &self,
        all_requests: Vec<GradingRequest>,
    ) -> Result<ProcessingStats> {
        let batch_size = self.batch_size();
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_requests = all_requests.len();
        let total_batches = total_requests.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total: total_requests,
            ..Default::default()
        };

        for (batch_idx, batch) in all_requests.chunks(batch_size).enumerate() {
            let batch_start = batch_idx * batch_size;
            let batch_num = batch_idx + 1;

            logging::log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total_requests,
            );

            let batch_result = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.degraded += batch_result.degraded;
            stats.failed += batch_result.failed;

            logging::log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.degraded,
                batch.len(),
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: &[GradingRequest],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<ProcessingStats> {
        let mut batch_handles = Vec::new();

        for (idx, request) in batch.iter().enumerate() {
            let request_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let flow = self.flow.clone();
            let scanner = self.scanner.clone();
            let config = self.config.clone();
            let request = request.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                request_processor::process_request(&flow, &scanner, request, request_index, &config)
                    .await
            });
            batch_handles.push((request_index, handle));
        }

        let indices: Vec<usize> = batch_handles.iter().map(|(i, _)| *i).collect();
        let outcomes = join_all(batch_handles.into_iter().map(|(_, h)| h)).await;

        let mut result = ProcessingStats {
            total: batch.len(),
            ..Default::default()
        };
        for (request_index, outcome) in indices.into_iter().zip(outcomes) {
            match outcome {
                Ok(Ok(RequestStatus::Graded)) => result.success += 1,
                Ok(Ok(RequestStatus::Degraded)) => result.degraded += 1,
                Ok(Err(e)) => {
                    error!("[请求 #{}] ❌ 处理失败: {:#}", request_index, e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[请求 #{}] 任务执行失败: {}", request_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 评分统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    /// 正常评分
    pub success: usize,
    /// 已评分但结果降级
    pub degraded: usize,
    pub failed: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::AiClient;
    use crate::error::{AiError, FetchError, OcrError};
    use crate::infrastructure::ArtifactFetcher;
    use crate::services::MarkSchemeResolver;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct InMemoryFetcher;

    #[async_trait]
    impl ArtifactFetcher for InMemoryFetcher {
        async fn fetch(&self, name: &str) -> Result<Vec<u8>, FetchError> {
            if name.starts_with("9708") {
                Ok(b"%PDF".to_vec())
            } else {
                Err(FetchError::NotFound {
                    name: name.to_string(),
                })
            }
        }

        fn location(&self, name: &str) -> String {
            format!("memory://{}", name)
        }
    }

    struct LongTextOcr;

    #[async_trait]
    impl OcrClient for LongTextOcr {
        async fn extract_text(&self, _: &[u8], _: &str, _: &str) -> Result<String, OcrError> {
            Ok("Level 3 (9-12 marks): a well developed analysis of elasticity. ".repeat(3))
        }
    }

    struct FixedAi;

    #[async_trait]
    impl AiClient for FixedAi {
        async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(r#"{"score": 20, "feedback": "fine"}"#.to_string())
        }
    }

    fn write_request(dir: &std::path::Path, name: &str, paper_id: &str) {
        let content = format!(
            "totalMarks = 25\nstudentAnswer = \"An answer\"\n\n[paperContext]\nid = \"{}\"\n",
            paper_id
        );
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_run_counts_outcomes() {
        let dir = TempDir::new().unwrap();
        let requests = dir.path().join("requests");
        std::fs::create_dir_all(&requests).unwrap();
        write_request(&requests, "a.toml", "econ-9708-22-mj-23");
        write_request(&requests, "b.toml", "bus-9609-12-on-22");
        write_request(&requests, "c.toml", "econ-9708-32-fm-24");
        std::fs::write(
            requests.join("d.toml"),
            "totalMarks = 25\nstudentAnswer = \"\"\n\n[paperContext]\nid = \"x\"\n",
        )
        .unwrap();

        let config = Config {
            max_concurrent_requests: 2,
            request_folder: requests.to_string_lossy().to_string(),
            output_folder: dir.path().join("results").to_string_lossy().to_string(),
            ..Config::default()
        };
        let ocr: Arc<dyn OcrClient> = Arc::new(LongTextOcr);
        let flow = GradingFlow::new(
            MarkSchemeResolver::new(Arc::new(InMemoryFetcher), ocr.clone()),
            Arc::new(FixedAi),
        );
        let app = App::with_services(config, flow, AnswerScanService::new(ocr));

        let stats = app.run().await.unwrap();
        assert_eq!(
            stats,
            ProcessingStats {
                success: 2,
                degraded: 1,
                failed: 1,
                total: 4,
            }
        );
        assert!(dir.path().join("results/a.result.json").exists());
        assert!(dir.path().join("results/b.result.json").exists());
        assert!(!dir.path().join("results/d.result.json").exists());
    }

    #[tokio::test]
    async fn test_run_with_missing_folder_fails() {
        let config = Config {
            request_folder: "/definitely/not/here".to_string(),
            ..Config::default()
        };
        let ocr: Arc<dyn OcrClient> = Arc::new(LongTextOcr);
        let flow = GradingFlow::new(
            MarkSchemeResolver::new(Arc::new(InMemoryFetcher), ocr.clone()),
            Arc::new(FixedAi),
        );
        let app = App::with_services(config, flow, AnswerScanService::new(ocr));
        assert!(app.run().await.is_err());
    }
}
