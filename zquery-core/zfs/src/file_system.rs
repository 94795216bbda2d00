//! 文件系统实体及加载

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info};
use zquery_command::{CommandInvoker, ListType};

use crate::error::{Result, ZfsError};
use crate::parse::{parse_epoch_seconds, parse_u64, split_columns, split_lines, str_from_only_line};
use crate::pool::Pool;
use crate::snapshot::{list_snapshots, SnapshotList};

/// 文件系统与快照的 `zfs list` 请求列
pub(crate) const DATASET_COLUMNS: [&str; 3] = ["name", "guid", "creation"];

const FILE_SYSTEM_INFO: &str = "file system info";

/// 存储池中的文件系统
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystem {
    /// 相对存储池的名称，根文件系统为存储池名称
    pub name: String,
    /// 是否为存储池的顶层文件系统
    pub is_root: bool,
    pub pool: Arc<Pool>,
    pub guid: u64,
    pub creation: DateTime<Local>,
}

/// 按 `zfs list` 顺序排列
pub type FileSystemList = Vec<Arc<FileSystem>>;

impl FileSystem {
    /// 含存储池的完整路径，如 `tank/home`
    pub fn full_name(&self) -> String {
        if self.is_root {
            self.pool.name.clone()
        } else {
            format!("{}/{}", self.pool.name, self.name)
        }
    }

    pub fn verbose_string(&self) -> String {
        format!(
            "{{FileSystem Name: {:?}, IsRoot: {}, Pool: {}, GUID: {}, Creation: {}}}",
            self.name, self.is_root, self.pool, self.guid, self.creation,
        )
    }

    /// 仅本文件系统的快照，不含子文件系统
    pub fn snapshots(self: &Arc<Self>) -> Result<SnapshotList> {
        list_snapshots(self)
    }

    /// 查询单个文件系统属性
    pub fn get_prop(&self, prop: &str) -> Result<String> {
        get_prop_for_fs_or_snap(self.cmd(), &self.full_name(), prop)
    }

    pub(crate) fn cmd(&self) -> &CommandInvoker {
        self.pool.system().cmd()
    }
}

impl fmt::Display for FileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{FileSystem Name: {:?}, IsRoot: {}, Pool: {}}}",
            self.name, self.is_root, self.pool
        )
    }
}

/// 单属性 `zfs get`，文件系统与快照共用
pub(crate) fn get_prop_for_fs_or_snap(cmd: &CommandInvoker, target: &str, prop: &str) -> Result<String> {
    let out = cmd.zfs().get(target, &[prop], &["value"]).map_err(|e| {
        ZfsError::command(
            format!("failed to get property {:?} of filesystem/snapshot {:?}", prop, target),
            e,
        )
    })?;

    str_from_only_line(&out)
}

fn parse_file_system_info(line: &str, pool: &Arc<Pool>) -> Result<FileSystem> {
    let cols = split_columns(line, DATASET_COLUMNS.len(), FILE_SYSTEM_INFO)?;

    let raw_name = cols[0];
    let is_root = raw_name == pool.name;
    let pool_prefix = format!("{}/", pool.name);
    let name = raw_name.strip_prefix(&pool_prefix).unwrap_or(raw_name);

    Ok(FileSystem {
        name: name.to_string(),
        is_root,
        pool: Arc::clone(pool),
        guid: parse_u64(cols[1], "fs guid")?,
        creation: parse_epoch_seconds(cols[2], "fs creation")?,
    })
}

pub(crate) fn list_file_systems(pool: &Arc<Pool>) -> Result<FileSystemList> {
    info!("正在列出存储池 {} 的文件系统", pool.name);

    let out = pool
        .system()
        .cmd()
        .zfs()
        .list(&pool.name, true, ListType::Filesystem, &DATASET_COLUMNS)
        .map_err(|e| ZfsError::command(format!("failed to list file systems of {}", pool), e))?;

    let file_systems = split_lines(&out)
        .iter()
        .map(|line| parse_file_system_info(line, pool).map(Arc::new))
        .collect::<Result<FileSystemList>>()?;

    validate_file_systems(pool, &file_systems)?;

    debug!("存储池 {} 共 {} 个文件系统", pool.name, file_systems.len());
    Ok(file_systems)
}

/// 校验完整名称唯一且存在根文件系统
///
/// 根文件系统的 `name` 与存储池同名，子数据集 `tank/tank` 的 `name` 也是 `tank`，
/// 因此以完整名称区分。
fn validate_file_systems(pool: &Pool, file_systems: &[Arc<FileSystem>]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for fs in file_systems {
        let full_name = fs.full_name();
        if !seen.insert(full_name.clone()) {
            return Err(ZfsError::DuplicateFileSystem {
                pool: pool.name.clone(),
                name: full_name,
            });
        }
    }

    if !file_systems.iter().any(|fs| fs.is_root) {
        return Err(ZfsError::MissingRootFileSystem {
            pool: pool.name.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{fake_system, single_pool, tank};
    use zquery_command::fake::{FakeCommands, FakePools};

    #[test]
    fn test_parse_root_and_child() {
        let pool = tank();

        let root = parse_file_system_info("tank\t100\t1700000000", &pool).unwrap();
        assert!(root.is_root);
        assert_eq!(root.name, "tank");
        assert_eq!(root.full_name(), "tank");
        assert_eq!(root.guid, 100);
        assert_eq!(root.creation.timestamp(), 1_700_000_000);

        let child = parse_file_system_info("tank/home/alice\t101\t1700000001", &pool).unwrap();
        assert!(!child.is_root);
        assert_eq!(child.name, "home/alice");
        assert_eq!(child.full_name(), "tank/home/alice");
    }

    #[test]
    fn test_parse_errors() {
        let pool = tank();

        let err = parse_file_system_info("tank\t100", &pool).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"expected 3 columns per line in file system info, but found 2, line: "tank\t100""#
        );

        let err = parse_file_system_info("tank\tabc\t1", &pool).unwrap_err();
        assert!(err
            .to_string()
            .starts_with(r#"parsing "fs guid", unable to convert "abc" to uint64: "#));

        let err = parse_file_system_info("tank\t1\tyesterday", &pool).unwrap_err();
        assert!(err
            .to_string()
            .starts_with(r#"parsing "fs creation", unable to convert "yesterday" to uint64: "#));
    }

    #[test]
    fn test_display() {
        let pool = tank();
        let fs = parse_file_system_info("tank/home\t7\t0", &pool).unwrap();

        assert_eq!(
            fs.to_string(),
            r#"{FileSystem Name: "home", IsRoot: false, Pool: {Pool Name: "tank"}}"#
        );
        assert!(fs
            .verbose_string()
            .starts_with(r#"{FileSystem Name: "home", IsRoot: false, Pool: {Pool Name: "tank"}, GUID: 7, Creation: "#));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let fake = FakeCommands::new(FakePools::new()).with_zfs_list(|_, _, _, _| {
            Ok("tank\t1\t1\ntank/a\t2\t1\ntank/a\t3\t1\n".to_string())
        });
        let pool = single_pool(&fake_system(fake), "tank");

        let err = pool.file_systems().unwrap_err();
        assert_eq!(err.to_string(), r#"duplicate file system name "tank/a" in pool "tank""#);
    }

    #[test]
    fn test_duplicate_root_rejected() {
        let fake = FakeCommands::new(FakePools::new())
            .with_zfs_list(|_, _, _, _| Ok("tank	1	1
tank	2	1
".to_string()));
        let pool = single_pool(&fake_system(fake), "tank");

        let err = pool.file_systems().unwrap_err();
        assert!(matches!(err, ZfsError::DuplicateFileSystem { ref name, .. } if name == "tank"));
    }

    #[test]
    fn test_child_named_like_pool() {
        let fake = FakeCommands::new(FakePools::new())
            .with_zfs_list(|_, _, _, _| Ok("tank	1	100
tank/tank	2	100
".to_string()));
        let pool = single_pool(&fake_system(fake), "tank");

        let file_systems = pool.file_systems().unwrap();
        let full_names: Vec<_> = file_systems.iter().map(|fs| fs.full_name()).collect();
        assert_eq!(full_names, vec!["tank", "tank/tank"]);
        assert!(file_systems[0].is_root);
        assert!(!file_systems[1].is_root);
        assert_eq!(file_systems[1].name, "tank");
    }

    #[test]
    fn test_missing_root_rejected() {
        let fake = FakeCommands::new(FakePools::new())
            .with_zfs_list(|_, _, _, _| Ok("tank/a\t2\t1\n".to_string()));
        let pool = single_pool(&fake_system(fake), "tank");

        let err = pool.file_systems().unwrap_err();
        assert!(matches!(err, ZfsError::MissingRootFileSystem { .. }));
    }

    #[test]
    fn test_get_prop() {
        let fake = FakeCommands::new(FakePools::new()).with_zfs_get(|target, props, cols| {
            assert_eq!(target, "tank/a");
            assert_eq!(props, &["compression"]);
            assert_eq!(cols, &["value"]);
            Ok("lz4\n".to_string())
        });
        let fs = parse_file_system_info("tank/a\t2\t1", &single_pool(&fake_system(fake), "tank")).unwrap();

        assert_eq!(fs.get_prop("compression").unwrap(), "lz4");
    }
}
