use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::config::Settings;
use crate::http::chat::{ChatCompletion, ChatRequest};
use crate::http::stream::ChatStream;
use crate::http::types::{BaseUrl, HealthStatus};
use crate::{ProbeError, Result};

const HEALTH_PATH: &str = "health";
const CHAT_COMPLETIONS_PATH: &str = "v1/chat/completions";

/// OpenAI 兼容代理的 HTTP 客户端
#[derive(Clone)]
pub struct ProxyClient {
    inner: reqwest::Client,
    base_url: BaseUrl,
    model: String,
    /// 非流式请求的总超时；流式请求只受连接超时和读空闲超时约束
    timeout: Duration,
}

impl ProxyClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &settings.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| ProbeError::Config(format!("invalid api key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let inner = reqwest::Client::builder()
            .connect_timeout(settings.timeout)
            .read_timeout(settings.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            timeout: settings.timeout,
        })
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// 请求中使用的模型名称
    pub fn model(&self) -> &str {
        &self.model
    }

    /// GET /health，2xx 且响应体为 JSON 即视为健康
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.base_url.endpoint(HEALTH_PATH)?;
        tracing::debug!(%url, "health check");

        let response = self.inner.get(url).timeout(self.timeout).send().await?;
        let response = Self::ensure_success(response).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let body = serde_json::from_str(&body)?;

        Ok(HealthStatus { status, body })
    }

    /// 非流式 chat 请求
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let url = self.base_url.endpoint(CHAT_COMPLETIONS_PATH)?;
        tracing::debug!(%url, model = %request.model, "chat completion");

        let response = self
            .inner
            .post(url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;

        Ok(serde_json::from_str(&body)?)
    }

    /// 流式 chat 请求，无论请求里的 `stream` 取值如何都会强制打开
    ///
    /// 不设总超时：只要片段持续到达，耗时再长也继续读取
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<ChatStream> {
        let url = self.base_url.endpoint(CHAT_COMPLETIONS_PATH)?;
        tracing::debug!(%url, model = %request.model, "streaming chat completion");

        let request = request.clone().with_stream(true);
        let response = self.inner.post(url).json(&request).send().await?;
        let response = Self::ensure_success(response).await?;

        Ok(ChatStream::from_bytes(response.bytes_stream()))
    }

    /// 非 2xx 响应转换为 `ProbeError::Status`，保留响应体用于诊断
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ProbeError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
