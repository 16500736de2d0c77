use std::fmt;

use crate::{ProbeError, Result};

/// 代理服务的基础地址
///
/// 支持与 curl 类似的简写形式，统一规范化为完整 URL:
/// - ":8080" -> "http://localhost:8080"
/// - "localhost:8080" -> "http://localhost:8080"
/// - "https://:8443" -> "https://localhost:8443"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    inner: url::Url,
}

impl BaseUrl {
    /// 默认 host，当 URL 中未指定 host 时使用
    const DEFAULT_HOST: &'static str = "localhost";
    /// 默认 scheme，当 URL 中未指定 scheme 时使用
    const DEFAULT_SCHEME: &'static str = "http";

    pub fn parse(s: &str) -> Result<Self> {
        let input = s.trim();
        if input.is_empty() {
            return Err(ProbeError::InvalidUrl("empty base url".to_string()));
        }

        let normalized = if input.starts_with(':') {
            format!("{}://{}{}", Self::DEFAULT_SCHEME, Self::DEFAULT_HOST, input)
        } else if let Some(pos) = input.find("://") {
            let after_scheme = &input[pos + 3..];
            if after_scheme.starts_with(':') {
                format!("{}://{}{}", &input[..pos], Self::DEFAULT_HOST, after_scheme)
            } else {
                input.to_string()
            }
        } else {
            format!("{}://{}", Self::DEFAULT_SCHEME, input)
        };

        let inner = url::Url::parse(&normalized)?;
        match inner.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ProbeError::InvalidUrl(format!(
                    "unsupported scheme '{}' in {}",
                    other, input
                )));
            }
        }
        if inner.query().is_some() || inner.fragment().is_some() {
            return Err(ProbeError::InvalidUrl(format!(
                "base url must not carry a query or fragment: {}",
                input
            )));
        }

        Ok(Self { inner })
    }

    /// 在基础地址之后拼接接口路径，保留基础地址自带的路径前缀
    pub fn endpoint(&self, path: &str) -> Result<url::Url> {
        let joined = format!("{}/{}", self.as_str(), path.trim_start_matches('/'));
        Ok(url::Url::parse(&joined)?)
    }

    /// 不带结尾 '/' 的字符串形式
    pub fn as_str(&self) -> &str {
        self.inner.as_str().trim_end_matches('/')
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 健康检查结果
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub status: u16,
    pub body: serde_json::Value,
}
