//! 快照实体及加载

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info};
use zquery_command::ListType;

use crate::error::{Result, ZfsError};
use crate::file_system::{get_prop_for_fs_or_snap, FileSystem, DATASET_COLUMNS};
use crate::hold::{list_holds, HoldList};
use crate::parse::{parse_epoch_seconds, parse_u64, split_columns, split_lines};

const SNAPSHOT_INFO: &str = "snapshot info";

/// 文件系统的快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// `@` 之后的名称
    pub name: String,
    pub file_system: Arc<FileSystem>,
    pub guid: u64,
    pub creation: DateTime<Local>,
}

/// 按 `zfs list` 顺序排列
pub type SnapshotList = Vec<Arc<Snapshot>>;

impl Snapshot {
    /// `<filesystem full name>@<name>`
    pub fn full_name(&self) -> String {
        format!("{}@{}", self.file_system.full_name(), self.name)
    }

    pub fn verbose_string(&self) -> String {
        format!(
            "{{Snapshot Name: {:?}, FileSystem: {}, Guid: {}, Creation: {}}}",
            self.name, self.file_system, self.guid, self.creation,
        )
    }

    /// 快照上的保留
    pub fn holds(self: &Arc<Self>) -> Result<HoldList> {
        list_holds(self)
    }

    /// 查询单个快照属性
    pub fn get_prop(&self, prop: &str) -> Result<String> {
        get_prop_for_fs_or_snap(self.file_system.cmd(), &self.full_name(), prop)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Snapshot Name: {:?}, FileSystem: {}}}",
            self.name, self.file_system
        )
    }
}

fn parse_snapshot_info(line: &str, file_system: &Arc<FileSystem>) -> Result<Snapshot> {
    let cols = split_columns(line, DATASET_COLUMNS.len(), SNAPSHOT_INFO)?;

    let prefix = format!("{}@", file_system.full_name());
    let name = cols[0].strip_prefix(&prefix).unwrap_or(cols[0]);

    Ok(Snapshot {
        name: name.to_string(),
        file_system: Arc::clone(file_system),
        guid: parse_u64(cols[1], "snapshot guid")?,
        creation: parse_epoch_seconds(cols[2], "snapshot creation")?,
    })
}

pub(crate) fn list_snapshots(file_system: &Arc<FileSystem>) -> Result<SnapshotList> {
    let full_name = file_system.full_name();
    info!("正在列出文件系统 {} 的快照", full_name);

    let out = file_system
        .cmd()
        .zfs()
        .list(&full_name, false, ListType::Snapshot, &DATASET_COLUMNS)
        .map_err(|e| {
            ZfsError::command(
                format!("failed to list snapshots of file system {}", file_system),
                e,
            )
        })?;

    let snapshots = split_lines(&out)
        .iter()
        .map(|line| parse_snapshot_info(line, file_system).map(Arc::new))
        .collect::<Result<SnapshotList>>()?;

    debug!("文件系统 {} 共 {} 个快照", full_name, snapshots.len());
    Ok(snapshots)
}
