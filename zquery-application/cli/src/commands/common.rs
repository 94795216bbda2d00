//! 公共工具函数模块
//!
//! 按名称在实体图中查找存储池、文件系统和快照。每次查找都会重新执行底层命令。

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use zquery_zfs::{FileSystem, Pool, Snapshot, System};

/// 数据集完整名称中的存储池部分 (`tank/home@daily` -> `tank`)
pub fn pool_name_of(target: &str) -> &str {
    target
        .split(|c: char| c == '/' || c == '@')
        .next()
        .unwrap_or(target)
}

/// 拆分快照完整名称为 (文件系统完整名称, 快照名)
pub fn split_snapshot_name(full_name: &str) -> Result<(&str, &str)> {
    match full_name.split_once('@') {
        Some((fs, snap)) if !fs.is_empty() && !snap.is_empty() => Ok((fs, snap)),
        _ => bail!("无效的快照名称: {:?}，应为 <文件系统>@<快照>", full_name),
    }
}

/// 按名称查找存储池
pub fn find_pool(system: &System, name: &str) -> Result<Arc<Pool>> {
    let pools = system.list_pools().context("获取存储池列表失败")?;

    match pools.into_iter().find(|p| p.name == name) {
        Some(pool) => Ok(pool),
        None => bail!("存储池 {} 不存在", name),
    }
}

/// 按完整名称查找文件系统
pub fn find_file_system(system: &System, full_name: &str) -> Result<Arc<FileSystem>> {
    let pool = find_pool(system, pool_name_of(full_name))?;
    let file_systems = pool
        .file_systems()
        .with_context(|| format!("获取存储池 {} 的文件系统失败", pool.name))?;

    match file_systems.into_iter().find(|fs| fs.full_name() == full_name) {
        Some(fs) => Ok(fs),
        None => bail!("文件系统 {} 不存在", full_name),
    }
}

/// 按完整名称查找快照
pub fn find_snapshot(system: &System, full_name: &str) -> Result<Arc<Snapshot>> {
    let (fs_name, snap_name) = split_snapshot_name(full_name)?;
    let fs = find_file_system(system, fs_name)?;
    let snapshots = fs
        .snapshots()
        .with_context(|| format!("获取文件系统 {} 的快照失败", fs_name))?;

    match snapshots.into_iter().find(|s| s.name == snap_name) {
        Some(snapshot) => Ok(snapshot),
        None => bail!("快照 {} 不存在", full_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zquery_command::fake::{FakeCommands, FakeFileSystem, FakePool, FakePools, FakeSnapshot};
    use zquery_zfs::SystemConfig;

    fn fs(guid: &str) -> FakeFileSystem {
        FakeFileSystem::new().prop("guid", guid).prop("creation", "1700000000")
    }

    fn system() -> System {
        let pools = FakePools::from([(
            "tank".to_string(),
            FakePool::new()
                .props([
                    ("guid", "1"),
                    ("size", "100"),
                    ("allocated", "50"),
                    ("free", "50"),
                    ("fragmentation", "1"),
                    ("health", "ONLINE"),
                    ("altroot", "-"),
                ])
                .file_system("tank", fs("10"))
                .file_system(
                    "home",
                    fs("20").snapshot(
                        "daily",
                        FakeSnapshot::new().prop("guid", "21").prop("creation", "1700000000"),
                    ),
                ),
        )]);

        System::new(SystemConfig::default().with_invoker(FakeCommands::new(pools).invoker()))
    }

    #[test]
    fn test_pool_name_of() {
        assert_eq!(pool_name_of("tank"), "tank");
        assert_eq!(pool_name_of("tank/home/alice"), "tank");
        assert_eq!(pool_name_of("tank@daily"), "tank");
        assert_eq!(pool_name_of("tank/home@daily"), "tank");
    }

    #[test]
    fn test_split_snapshot_name() {
        assert_eq!(split_snapshot_name("tank/home@daily").unwrap(), ("tank/home", "daily"));
        assert!(split_snapshot_name("tank/home").is_err());
        assert!(split_snapshot_name("@daily").is_err());
        assert!(split_snapshot_name("tank@").is_err());
    }

    #[test]
    fn test_find_entities() {
        let system = system();

        assert_eq!(find_pool(&system, "tank").unwrap().guid, 1);
        assert!(find_pool(&system, "backup").is_err());

        let fs = find_file_system(&system, "tank/home").unwrap();
        assert_eq!(fs.guid, 20);
        assert!(find_file_system(&system, "tank").unwrap().is_root);
        assert!(find_file_system(&system, "tank/nope").is_err());

        let snap = find_snapshot(&system, "tank/home@daily").unwrap();
        assert_eq!(snap.guid, 21);
        assert!(find_snapshot(&system, "tank@daily").is_err());
    }
}
