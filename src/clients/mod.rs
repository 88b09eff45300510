pub mod llm_client;
pub mod ocr_client;

pub use llm_client::{AiClient, OpenAiGradingClient};
pub use ocr_client::{ComPdfKitOcrClient, OcrClient};
