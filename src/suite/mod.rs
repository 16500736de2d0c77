//! 内置的测试集合，按注册顺序执行

pub mod chat;
pub mod multimodal;
pub mod stream;

pub use chat::ChatCheck;
pub use multimodal::MultimodalCheck;
pub use stream::StreamCheck;

use crate::runner::Check;
use crate::{ProbeError, Result};

/// 全部内置测试，顺序即执行顺序
pub fn default_suite() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(ChatCheck),
        Box::new(StreamCheck),
        Box::new(MultimodalCheck::image_url()),
        Box::new(MultimodalCheck::inline_base64()),
        Box::new(MultimodalCheck::mixed()),
    ]
}

/// 按 key 过滤测试，保持注册顺序；`keys` 为空时返回全部
pub fn select(keys: &[String]) -> Result<Vec<Box<dyn Check>>> {
    let suite = default_suite();
    if keys.is_empty() {
        return Ok(suite);
    }

    if let Some(unknown) = keys
        .iter()
        .find(|key| !suite.iter().any(|check| check.key() == key.as_str()))
    {
        let known: Vec<&str> = suite.iter().map(|check| check.key()).collect();
        return Err(ProbeError::Config(format!(
            "unknown check '{}', expected one of: {}",
            unknown,
            known.join(", ")
        )));
    }

    Ok(suite
        .into_iter()
        .filter(|check| keys.iter().any(|key| key == check.key()))
        .collect())
}
