//! 命令端口配置

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 进程调用实现所使用的主机工具路径
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// `zfs` 可执行文件（非绝对路径时从 `PATH` 查找）
    #[serde(default = "default_zfs_path")]
    pub zfs_path: PathBuf,
    /// `zpool` 可执行文件（非绝对路径时从 `PATH` 查找）
    #[serde(default = "default_zpool_path")]
    pub zpool_path: PathBuf,
}

fn default_zfs_path() -> PathBuf {
    PathBuf::from("zfs")
}

fn default_zpool_path() -> PathBuf {
    PathBuf::from("zpool")
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            zfs_path: default_zfs_path(),
            zpool_path: default_zpool_path(),
        }
    }
}

impl CommandConfig {
    /// 设置 `zfs` 可执行文件
    pub fn zfs_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.zfs_path = path.into();
        self
    }

    /// 设置 `zpool` 可执行文件
    pub fn zpool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.zpool_path = path.into();
        self
    }
}
