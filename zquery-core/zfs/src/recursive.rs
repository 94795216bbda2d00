//! 递归组重建
//!
//! `zfs snapshot -r` / `zfs hold -r` 以同一名称（标签）和时间在每个文件系统上各创建一个快照（保留），
//! 而列表只显示单个实体，因此在这里重建分组：
//!
//! 1. 按名称（标签）分桶
//! 2. 丢弃未覆盖存储池全部文件系统的桶（保留组则为快照组的全部快照）
//! 3. 完整的桶中出现不同创建时间时，整个加载失败
//! 4. 结果按创建时间倒序，时间相同按名称排序

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::{Result, ZfsError};
use crate::hold::Hold;
use crate::pool::Pool;
use crate::snapshot::SnapshotList;

/// 存储池所有文件系统上名称与创建时间相同的一组快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveSnapshotGroup {
    pub name: String,
    pub creation: DateTime<Local>,
    pub pool: Arc<Pool>,
    /// 每个文件系统一个快照，按文件系统列表顺序
    pub snapshots: SnapshotList,
}

/// 最新的在前
pub type RecursiveSnapshotGroupList = Vec<Arc<RecursiveSnapshotGroup>>;

impl RecursiveSnapshotGroup {
    /// 组内每个快照都有的保留标签，最新的在前
    pub fn holds(self: &Arc<Self>) -> Result<RecursiveHoldGroupList> {
        list_recursive_hold_groups(self)
    }
}

impl fmt::Display for RecursiveSnapshotGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{RecursiveSnapshotGroup Name: {:?}, Creation: {}, Pool: {}}}",
            self.name, self.creation, self.pool
        )
    }
}

/// 以同一创建时间施加到递归快照组每个快照上的保留标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveHoldGroup {
    pub tag: String,
    pub creation: DateTime<Local>,
    pub recursive_snapshot_group: Arc<RecursiveSnapshotGroup>,
}

/// 最新的在前
pub type RecursiveHoldGroupList = Vec<Arc<RecursiveHoldGroup>>;

impl fmt::Display for RecursiveHoldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{RecursiveHoldGroup Tag: {:?}, Creation: {}, RSG: {}}}",
            self.tag, self.creation, self.recursive_snapshot_group
        )
    }
}

/// 每个要求的文件系统恰好一个成员时桶才完整，成员以文件系统完整名称标识
fn covers_all(required: &BTreeSet<String>, members: impl ExactSizeIterator<Item = String>) -> bool {
    let count = members.len();
    let members: BTreeSet<String> = members.collect();
    count == required.len() && members == *required
}

pub(crate) fn list_recursive_snapshot_groups(pool: &Arc<Pool>) -> Result<RecursiveSnapshotGroupList> {
    info!("正在重建存储池 {} 的递归快照组", pool.name);

    let file_systems = pool.file_systems()?;
    let fs_names: BTreeSet<String> = file_systems.iter().map(|fs| fs.full_name()).collect();

    let mut buckets: BTreeMap<String, SnapshotList> = BTreeMap::new();
    for fs in &file_systems {
        for snapshot in fs.snapshots()? {
            buckets.entry(snapshot.name.clone()).or_default().push(snapshot);
        }
    }

    let mut groups = RecursiveSnapshotGroupList::new();
    for (name, snapshots) in buckets {
        let members = snapshots.iter().map(|s| s.file_system.full_name());
        if !covers_all(&fs_names, members) {
            debug!(
                "丢弃快照组 {:?}: 仅存在于 {}/{} 个文件系统",
                name,
                snapshots.len(),
                fs_names.len()
            );
            continue;
        }

        let first = &snapshots[0];
        if let Some(other) = snapshots.iter().find(|s| s.creation != first.creation) {
            return Err(ZfsError::SnapshotTimestampMismatch {
                first: first.full_name(),
                other: other.full_name(),
            });
        }

        groups.push(Arc::new(RecursiveSnapshotGroup {
            creation: first.creation,
            name,
            pool: Arc::clone(pool),
            snapshots,
        }));
    }

    // 稳定排序：时间相同保持桶（名称）顺序
    groups.sort_by(|a, b| b.creation.cmp(&a.creation));

    debug!("存储池 {} 共 {} 个递归快照组", pool.name, groups.len());
    Ok(groups)
}

fn list_recursive_hold_groups(group: &Arc<RecursiveSnapshotGroup>) -> Result<RecursiveHoldGroupList> {
    info!("正在重建快照组 {:?} 的递归保留组", group.name);

    let fs_names: BTreeSet<String> = group
        .snapshots
        .iter()
        .map(|s| s.file_system.full_name())
        .collect();

    let mut buckets: BTreeMap<String, Vec<Arc<Hold>>> = BTreeMap::new();
    for snapshot in &group.snapshots {
        for hold in snapshot.holds()? {
            buckets.entry(hold.tag.clone()).or_default().push(hold);
        }
    }

    let mut holds = RecursiveHoldGroupList::new();
    for (tag, bucket) in buckets {
        let members = bucket.iter().map(|h| h.snapshot.file_system.full_name());
        if !covers_all(&fs_names, members) {
            debug!(
                "丢弃保留组 {:?}: 仅存在于 {}/{} 个快照",
                tag,
                bucket.len(),
                fs_names.len()
            );
            continue;
        }

        let first = bucket[0].creation;
        if let Some(other) = bucket.iter().find(|h| h.creation != first) {
            return Err(ZfsError::HoldTimestampMismatch {
                tag,
                first,
                other: other.creation,
            });
        }

        holds.push(Arc::new(RecursiveHoldGroup {
            tag,
            creation: first,
            recursive_snapshot_group: Arc::clone(group),
        }));
    }

    holds.sort_by(|a, b| b.creation.cmp(&a.creation));

    Ok(holds)
}
