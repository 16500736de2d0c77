use futures::future::BoxFuture;

use crate::http::{ChatMessage, ChatRequest, ProxyClient};
use crate::runner::{Check, TestReporter};
use crate::{ProbeError, Result};

const SYSTEM_PROMPT: &str = "你是一个乐于助人的助手。";
const USER_PROMPT: &str = "你好，请用一句话介绍一下Google Gemini";

/// 非流式聊天
pub struct ChatCheck;

impl ChatCheck {
    pub fn request(model: &str) -> ChatRequest {
        ChatRequest::new(
            model,
            vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(USER_PROMPT),
            ],
        )
        .with_temperature(0.7)
    }
}

impl Check for ChatCheck {
    fn key(&self) -> &'static str {
        "chat"
    }

    fn name(&self) -> &'static str {
        "Non-streaming chat"
    }

    fn run<'a>(
        &'a self,
        client: &'a ProxyClient,
        reporter: &'a TestReporter,
    ) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let completion = client.chat(&Self::request(client.model())).await?;
            reporter.print_completion(&completion);

            if completion.choices.is_empty() {
                return Err(ProbeError::InvalidResponse(
                    "response contains no choices".to_string(),
                ));
            }
            Ok(true)
        })
    }
}
