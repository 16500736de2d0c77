use std::fs;
use std::path::{Path, PathBuf};

use crate::config::types::ProbeConfig;
use crate::{ProbeError, Result};

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "proxycheck.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ProbeConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProbeError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            ProbeError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// 查找并加载配置文件，找不到时返回 None
    ///
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/proxycheck/
    pub fn find_and_load() -> Result<Option<ProbeConfig>> {
        match Self::find_config_path() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                Self::load_from_path(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    fn find_config_path() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok();
        cwd.and_then(|dir| Self::search_upwards(&dir))
            .or_else(Self::user_config_path)
    }

    /// 从 `start` 开始逐级向上查找
    pub fn search_upwards(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(Self::CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn user_config_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let path = home
            .join(".config")
            .join("proxycheck")
            .join(Self::CONFIG_FILE);
        path.is_file().then_some(path)
    }
}
