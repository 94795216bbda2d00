//! 命令端口接口

use std::fmt;
use std::sync::Arc;

use crate::config::CommandConfig;
use crate::error::Result;
use crate::system::{SystemZfsCmd, SystemZpoolCmd};

/// `zfs holds -H` 输出中时间列的格式（本地时区）
///
/// 星期缩写、月份缩写、空格填充的日、24 小时制 `HH:MM`、四位年份，
/// 例如 `Mon Jan  2 15:04 2006`。
pub const HOLD_TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M %Y";

/// `zfs list` 的数据集类型过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListType {
    Filesystem,
    Snapshot,
}

impl ListType {
    /// 传给 `zfs list -t` 的值
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Filesystem => "filesystem",
            ListType::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 端口的文件系统/快照能力
///
/// 所有方法返回工具的标准输出：每个实体一行，按请求顺序以制表符分隔各列，无表头。
pub trait ZfsCmd: Send + Sync {
    /// 列出 `target` 下类型为 `list_type` 的数据集
    ///
    /// # 参数
    /// * `target` - 存储池、文件系统或快照名称
    /// * `recursive` - 是否包含 `target` 的后代
    /// * `list_type` - 文件系统或快照
    /// * `cols` - 输出列，不能为空
    fn list(&self, target: &str, recursive: bool, list_type: ListType, cols: &[&str])
        -> Result<String>;

    /// 获取文件系统或快照的属性，每个属性一行
    fn get(&self, target: &str, props: &[&str], cols: &[&str]) -> Result<String>;

    /// 列出快照上的保留（`<快照>\t<标签>\t<时间>`）
    fn holds(&self, snapshot: &str) -> Result<String>;
}

/// 端口的存储池能力
pub trait ZpoolCmd: Send + Sync {
    /// 列出所有存储池，输出列不能为空
    fn list(&self, cols: &[&str]) -> Result<String>;

    /// 获取存储池的属性，每个属性一行
    fn get(&self, pool: &str, props: &[&str], cols: &[&str]) -> Result<String>;
}

/// 当前使用的端口实现
///
/// 构造时确定，之后只读共享。
#[derive(Clone)]
pub struct CommandInvoker {
    zfs: Arc<dyn ZfsCmd>,
    zpool: Arc<dyn ZpoolCmd>,
}

impl CommandInvoker {
    /// 组合文件系统能力与存储池能力
    pub fn new(zfs: Arc<dyn ZfsCmd>, zpool: Arc<dyn ZpoolCmd>) -> Self {
        Self { zfs, zpool }
    }

    /// 执行 `config` 指定的主机工具
    pub fn system(config: &CommandConfig) -> Self {
        Self::new(
            Arc::new(SystemZfsCmd::new(config.zfs_path.clone())),
            Arc::new(SystemZpoolCmd::new(config.zpool_path.clone())),
        )
    }

    /// 文件系统/快照能力
    pub fn zfs(&self) -> &dyn ZfsCmd {
        self.zfs.as_ref()
    }

    /// 存储池能力
    pub fn zpool(&self) -> &dyn ZpoolCmd {
        self.zpool.as_ref()
    }
}

impl fmt::Debug for CommandInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInvoker").finish_non_exhaustive()
    }
}
