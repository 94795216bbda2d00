//! ZFS 模型错误定义

use chrono::{DateTime, Local};
use thiserror::Error;
use zquery_command::CommandError;

use crate::parse::ParseError;

/// ZFS 模型结果类型
pub type Result<T> = std::result::Result<T, ZfsError>;

/// ZFS 模型错误类型
///
/// 任何错误都会中止整个加载，调用方不会得到部分结果。
#[derive(Error, Debug)]
pub enum ZfsError {
    /// 命令端口调用失败
    #[error("{context}, reason: {source}")]
    Command {
        context: String,
        #[source]
        source: CommandError,
    },

    /// 输出行的列数与预期不符
    #[error("expected {expected} columns per line in {entity}, but found {found}, line: {line:?}")]
    ColumnCount {
        entity: &'static str,
        expected: usize,
        found: usize,
        line: String,
    },

    /// 列值无法转换为目标类型
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// 必填列为空
    #[error("parsing {description:?}, invalid empty {field}: {value:?}")]
    EmptyField {
        description: &'static str,
        field: &'static str,
        value: String,
    },

    /// 单属性查询的输出不是恰好一行
    #[error("failed to parse property value {output:?}, reason: expected exactly 1 line, but found {found}")]
    PropertyValue { output: String, found: usize },

    /// 同一存储池中文件系统重名
    #[error("duplicate file system name {name:?} in pool {pool:?}")]
    DuplicateFileSystem { pool: String, name: String },

    /// 存储池的文件系统列表中没有根文件系统
    #[error("pool {pool:?} has no root file system")]
    MissingRootFileSystem { pool: String },

    /// 完整的快照组内创建时间不一致
    #[error("snapshot with the same name has different timestamps across file systems - {first} {other}")]
    SnapshotTimestampMismatch { first: String, other: String },

    /// 所有成员都有的保留标签创建时间不一致
    #[error("found same hold tag name {tag:?} but created at different timestamps, {first} {other}")]
    HoldTimestampMismatch {
        tag: String,
        first: DateTime<Local>,
        other: DateTime<Local>,
    },
}

impl ZfsError {
    pub(crate) fn command(context: impl Into<String>, source: CommandError) -> Self {
        ZfsError::Command {
            context: context.into(),
            source,
        }
    }
}
