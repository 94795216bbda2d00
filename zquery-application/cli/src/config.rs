//! CLI 配置管理
//!
//! **数据存储方式**: TOML 文件 (~/.config/zquery/config.toml)，不存在时使用默认值

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use zquery_command::CommandConfig;

/// CLI 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// zfs / zpool 可执行文件
    #[serde(default)]
    pub command: CommandConfig,

    /// 默认输出格式 (table/json)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "table".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            command: CommandConfig::default(),
            format: default_format(),
        }
    }
}

impl CliConfig {
    /// 获取默认配置文件路径
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("无法获取用户主目录")?;
        Ok(home.join(".config").join("zquery").join("config.toml"))
    }

    /// 加载默认位置的配置，文件不存在时返回默认配置
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// 加载指定路径的配置
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("解析配置文件失败: {:?}", path))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
