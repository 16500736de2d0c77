use futures::future::BoxFuture;

use crate::http::{ChatMessage, ChatRequest, ContentPart, ProxyClient};
use crate::runner::{Check, TestReporter};
use crate::{ProbeError, Result};

pub const SAMPLE_IMAGE_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/d/dd/Gfp-wisconsin-madison-the-nature-boardwalk.jpg/1280px-Gfp-wisconsin-madison-the-nature-boardwalk.jpg";

/// 1x1 透明 PNG
pub const TINY_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChAGA4iQdJQAAAABJRU5ErkJggg==";

fn tiny_png_data_url() -> String {
    format!("data:image/png;base64,{}", TINY_PNG_BASE64)
}

/// 图片 + 文本的多模态请求，分段按给定顺序放在同一条用户消息里
pub struct MultimodalCheck {
    key: &'static str,
    name: &'static str,
    parts: Vec<ContentPart>,
    max_tokens: Option<u32>,
}

impl MultimodalCheck {
    /// 通过公网 URL 引用图片
    pub fn image_url() -> Self {
        Self {
            key: "multimodal",
            name: "Multimodal (image URL)",
            parts: vec![
                ContentPart::text("请描述这张图片中的内容，用中文回答。"),
                ContentPart::image_url(SAMPLE_IMAGE_URL),
            ],
            max_tokens: Some(300),
        }
    }

    /// 以 data URL 内联 base64 图片
    pub fn inline_base64() -> Self {
        Self {
            key: "image-base64",
            name: "Multimodal (base64 image)",
            parts: vec![
                ContentPart::text("请描述这张图片的内容。"),
                ContentPart::image_url(tiny_png_data_url()),
            ],
            max_tokens: None,
        }
    }

    /// 文本与两张内联图片交错
    pub fn mixed() -> Self {
        Self {
            key: "mixed",
            name: "Multimodal (mixed text and images)",
            parts: vec![
                ContentPart::text("我有两张图片要展示给你："),
                ContentPart::image_url(tiny_png_data_url()),
                ContentPart::text("第一张图片是上面的。现在是第二张："),
                ContentPart::image_url(tiny_png_data_url()),
                ContentPart::text("请分别描述这两张图片。"),
            ],
            max_tokens: None,
        }
    }

    pub fn request(&self, model: &str) -> ChatRequest {
        let request = ChatRequest::new(
            model,
            vec![ChatMessage::user_parts(self.parts.clone())],
        );
        match self.max_tokens {
            Some(max_tokens) => request.with_max_tokens(max_tokens),
            None => request,
        }
    }
}

impl Check for MultimodalCheck {
    fn key(&self) -> &'static str {
        self.key
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn run<'a>(
        &'a self,
        client: &'a ProxyClient,
        reporter: &'a TestReporter,
    ) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let completion = client.chat(&self.request(client.model())).await?;
            reporter.print_completion(&completion);

            if completion.choices.is_empty() {
                return Err(ProbeError::InvalidResponse(
                    "response contains no choices".to_string(),
                ));
            }
            if completion.first_content().is_none_or(|c| c.trim().is_empty()) {
                reporter.print_warning("assistant answer is empty");
            }
            Ok(true)
        })
    }
}
