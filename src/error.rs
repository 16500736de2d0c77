use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("服务返回错误状态 {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL 解析错误: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("无效的响应: {0}")]
    InvalidResponse(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ProbeError {
    fn from(err: anyhow::Error) -> Self {
        ProbeError::Other(err.to_string())
    }
}

/// Result type for proxycheck crate
pub type Result<T> = std::result::Result<T, ProbeError>;
