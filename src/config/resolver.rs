use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::{ProbeError, Result};

fn env_regex() -> &'static Regex {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    ENV_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    })
}

/// 解析并替换系统环境变量 ${VAR}，未定义的变量保持原样
pub fn resolve_env_vars(text: &str) -> String {
    env_regex()
        .replace_all(text, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// 与 `resolve_env_vars` 相同，但任何未定义的变量都报错
///
/// 用于密钥类字段，避免把字面量 `${VAR}` 当作凭据发出去
pub fn resolve_env_vars_strict(field: &str, text: &str) -> Result<String> {
    if let Some(missing) = env_regex()
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .find(|name| std::env::var(name).is_err())
    {
        return Err(ProbeError::Config(format!(
            "{} references undefined environment variable ${{{}}}",
            field, missing
        )));
    }
    Ok(resolve_env_vars(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_env_vars() {
        unsafe {
            std::env::set_var("PROXYCHECK_TEST_KEY", "sk-test");
        }

        assert_eq!(resolve_env_vars("Bearer ${PROXYCHECK_TEST_KEY}"), "Bearer sk-test");

        unsafe {
            std::env::remove_var("PROXYCHECK_TEST_KEY");
        }
    }

    #[test]
    fn test_resolve_env_vars_missing() {
        let input = "${PROXYCHECK_NONEXISTENT_VAR}/v1";
        assert_eq!(resolve_env_vars(input), input);
    }

    #[test]
    fn test_strict_rejects_undefined_variable() {
        let err = resolve_env_vars_strict("api_key", "${PROXYCHECK_UNDEFINED_SECRET}").unwrap_err();
        assert!(matches!(err, ProbeError::Config(ref msg) if msg.contains("PROXYCHECK_UNDEFINED_SECRET")));
    }

    #[test]
    fn test_strict_resolves_defined_variable() {
        unsafe {
            std::env::set_var("PROXYCHECK_STRICT_KEY", "sk-strict");
        }

        assert_eq!(
            resolve_env_vars_strict("api_key", "${PROXYCHECK_STRICT_KEY}").unwrap(),
            "sk-strict"
        );
        assert_eq!(resolve_env_vars_strict("api_key", "plain").unwrap(), "plain");

        unsafe {
            std::env::remove_var("PROXYCHECK_STRICT_KEY");
        }
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(resolve_env_vars("http://localhost:8080"), "http://localhost:8080");
    }
}
