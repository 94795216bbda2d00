//! zquery ZFS 模型
//!
//! 将 `zpool`/`zfs` 的制表符分隔输出转换为可导航的对象图：
//! - `System` -> `Pool` -> `FileSystem` -> `Snapshot` -> `Hold`
//! - `RecursiveSnapshotGroup` / `RecursiveHoldGroup`: 在存储池所有文件系统上
//!   原子创建的同名快照（同标签保留）
//!
//! 子实体按需加载且不缓存，每次访问都会重新执行底层命令。
//! 子实体持有父实体的只读共享引用。
//!
//! # 示例
//!
//! ```ignore
//! use zquery_zfs::{System, SystemConfig};
//!
//! let system = System::new(SystemConfig::default());
//! for pool in system.list_pools()? {
//!     println!("{}", pool.verbose_string());
//!     for group in pool.recursive_snapshot_groups()? {
//!         println!("  {} ({} snapshots)", group.name, group.snapshots.len());
//!     }
//! }
//! ```

mod error;
mod file_system;
mod hold;
pub mod parse;
mod pool;
mod recursive;
mod snapshot;
mod system;

#[cfg(test)]
mod test_util;

pub use error::{Result, ZfsError};
pub use file_system::{FileSystem, FileSystemList};
pub use hold::{Hold, HoldList};
pub use parse::ParseError;
pub use pool::{Pool, PoolList};
pub use recursive::{
    RecursiveHoldGroup, RecursiveHoldGroupList, RecursiveSnapshotGroup,
    RecursiveSnapshotGroupList,
};
pub use snapshot::{Snapshot, SnapshotList};
pub use system::{System, SystemConfig};
