//! LLM 客户端
//!
//! 只负责"发送评分提示词、拿回 JSON 文本"，不解析结果
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务，使用 JSON object 响应模式

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AiError;

const PLACEHOLDER_API_KEY: &str = "YOUR_CHATGPT_API_KEY_PLACEHOLDER";

/// AI 评分能力
///
/// 单次调用，不在内部重试。
#[async_trait]
pub trait AiClient: Send + Sync {
    /// 发送提示词，返回原始 JSON 文本
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;

    /// 是否已配置（API Key 等）
    fn is_configured(&self) -> bool {
        true
    }
}

/// OpenAI 兼容的评分客户端
pub struct OpenAiGradingClient {
    client: Client<OpenAIConfig>,
    api_key: String,
    model_name: String,
    temperature: f32,
}

impl OpenAiGradingClient {
    /// 创建新的评分客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            api_key: config.llm_api_key.clone(),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
        }
    }
}

#[async_trait]
impl AiClient for OpenAiGradingClient {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        if !self.is_configured() {
            warn!("LLM API Key 未配置或为占位符");
            return Err(AiError::NotConfigured);
        }

        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| AiError::TransportError(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .response_format(ResponseFormat::JsonObject)
            .temperature(self.temperature)
            .build()
            .map_err(|e| AiError::TransportError(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            classify_failure(&e.to_string())
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            warn!("LLM 返回内容为空");
            return Err(AiError::EmptyResponse);
        }

        Ok(content)
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && self.api_key != PLACEHOLDER_API_KEY
    }
}

/// 根据错误信息区分限流和其他传输错误
fn classify_failure(message: &str) -> AiError {
    let lower = message.to_lowercase();
    if lower.contains("rate limit") || lower.contains("rate_limit") || lower.contains("429") {
        AiError::RateLimited(message.to_string())
    } else {
        AiError::TransportError(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure("Rate limit reached for gpt-3.5-turbo"),
            AiError::RateLimited(_)
        ));
        assert!(matches!(
            classify_failure("http error: 429 Too Many Requests"),
            AiError::RateLimited(_)
        ));
        assert!(matches!(
            classify_failure("error sending request: connection refused"),
            AiError::TransportError(_)
        ));
    }

    #[tokio::test]
    async fn test_placeholder_key_is_not_configured() {
        let config = Config {
            llm_api_key: PLACEHOLDER_API_KEY.to_string(),
            ..Config::default()
        };
        let client = OpenAiGradingClient::new(&config);
        assert!(!client.is_configured());
        assert_eq!(client.complete("prompt").await, Err(AiError::NotConfigured));
    }

    /// 真实调用 LLM，需要设置 LLM_API_KEY
    ///
    /// 运行方式：
    /// ```bash
    /// cargo test test_live_completion -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_completion() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = OpenAiGradingClient::new(&Config::from_env());
        let response = client
            .complete(r#"Return the JSON object {"score": 1, "totalMarks": 2}."#)
            .await
            .expect("LLM 调用失败");
        println!("LLM 响应: {}", response);
        assert!(serde_json::from_str::<serde_json::Value>(&response).is_ok());
    }
}
