use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::resolver::{resolve_env_vars, resolve_env_vars_strict};
use crate::http::BaseUrl;
use crate::{ProbeError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
/// 本地代理不校验 API Key，但 OpenAI 兼容客户端总会带上一个
pub const DEFAULT_API_KEY: &str = "not-needed";
pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// 一组可选的运行参数，配置文件顶层、每个环境、CLI 覆盖都使用这个结构
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Profile {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl Profile {
    /// 用 `other` 中已设置的字段覆盖自身
    pub fn merge(&mut self, other: &Profile) {
        if other.base_url.is_some() {
            self.base_url = other.base_url.clone();
        }
        if other.model.is_some() {
            self.model = other.model.clone();
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key.clone();
        }
        if other.delay_ms.is_some() {
            self.delay_ms = other.delay_ms;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

/// 完整的配置文件 (proxycheck.toml)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeConfig {
    /// 顶层默认值
    #[serde(flatten)]
    pub defaults: Profile,

    /// 所有环境配置
    #[serde(default)]
    pub environments: HashMap<String, Profile>,
}

impl ProbeConfig {
    /// 获取指定环境
    pub fn get_environment(&self, env_name: &str) -> Option<&Profile> {
        self.environments.get(env_name)
    }
}

/// 解析完成、可直接使用的运行参数
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: BaseUrl,
    pub model: String,
    pub api_key: Option<String>,
    /// 两个测试之间的等待时间
    pub delay: Duration,
    /// 非流式请求的总超时；流式请求用作两次数据到达之间的空闲超时
    pub timeout: Duration,
}

impl Settings {
    /// 合并优先级：CLI 覆盖 > 指定环境 > 配置文件顶层 > 内置默认值
    pub fn resolve(
        config: Option<&ProbeConfig>,
        env_name: Option<&str>,
        overrides: &Profile,
    ) -> Result<Self> {
        let mut profile = Profile::default();

        if let Some(config) = config {
            profile.merge(&config.defaults);
        }

        if let Some(name) = env_name {
            let env = config
                .and_then(|c| c.get_environment(name))
                .ok_or_else(|| ProbeError::Config(format!("unknown environment '{}'", name)))?;
            profile.merge(env);
        }

        profile.merge(overrides);
        Self::from_profile(&profile)
    }

    fn from_profile(profile: &Profile) -> Result<Self> {
        let base_url = profile
            .base_url
            .as_deref()
            .map(resolve_env_vars)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = profile
            .model
            .as_deref()
            .map(resolve_env_vars)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            return Err(ProbeError::Config("model name must not be empty".to_string()));
        }

        // 空字符串表示不发送 Authorization 头
        let api_key = match profile.api_key.as_deref() {
            Some(key) => Some(resolve_env_vars_strict("api_key", key)?).filter(|k| !k.is_empty()),
            None => Some(DEFAULT_API_KEY.to_string()),
        };

        let timeout_secs = profile.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ProbeError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            base_url: BaseUrl::parse(&base_url)?,
            model,
            api_key,
            delay: Duration::from_millis(profile.delay_ms.unwrap_or(DEFAULT_DELAY_MS)),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: BaseUrl::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            model: DEFAULT_MODEL.to_string(),
            api_key: Some(DEFAULT_API_KEY.to_string()),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
