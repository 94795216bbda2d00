//! 存储池实体及加载

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Result, ZfsError};
use crate::file_system::{list_file_systems, FileSystemList};
use crate::parse::{parse_u64, parse_u8, require_non_empty, split_columns, split_lines, str_from_only_line};
use crate::recursive::{list_recursive_snapshot_groups, RecursiveSnapshotGroupList};
use crate::system::System;

/// `zpool list` 请求的列，按解析顺序
const POOL_COLUMNS: [&str; 8] = [
    "name",
    "guid",
    "size",
    "allocated",
    "free",
    "fragmentation",
    "health",
    "altroot",
];

const POOL_INFO: &str = "pool info";

/// `zpool list` 报告的存储池
#[derive(Debug, Clone)]
pub struct Pool {
    /// 存储池名称，也是池内所有数据集路径的根
    pub name: String,
    pub guid: u64,
    /// 总容量（字节）
    pub size: u64,
    /// 已分配（字节）
    pub allocated: u64,
    /// 空闲（字节）
    pub free: u64,
    pub fragmentation_percent: u8,
    /// 如 `ONLINE`、`DEGRADED`
    pub health_status: String,
    /// 备用根目录，无则为 `-`
    pub alt_root: String,
    system: System,
}

/// 按 `zpool list` 顺序排列
pub type PoolList = Vec<Arc<Pool>>;

impl Pool {
    /// 包含全部字段的长格式
    pub fn verbose_string(&self) -> String {
        format!(
            "{{Pool Name: {:?}, GUID: {}, Size: {}, Allocated: {}, Free: {}, Fragmentation: {}%, HealthStatus: {:?}, AltRoot: {:?}}}",
            self.name,
            self.guid,
            self.size,
            self.allocated,
            self.free,
            self.fragmentation_percent,
            self.health_status,
            self.alt_root,
        )
    }

    /// 存储池的所有文件系统（含根文件系统）
    pub fn file_systems(self: &Arc<Self>) -> Result<FileSystemList> {
        list_file_systems(self)
    }

    /// 在所有文件系统上原子创建的快照组，最新的在前
    pub fn recursive_snapshot_groups(self: &Arc<Self>) -> Result<RecursiveSnapshotGroupList> {
        list_recursive_snapshot_groups(self)
    }

    /// 查询单个存储池属性
    pub fn get_prop(&self, prop: &str) -> Result<String> {
        let out = self
            .system
            .cmd()
            .zpool()
            .get(&self.name, &[prop], &["value"])
            .map_err(|e| {
                ZfsError::command(
                    format!("failed to get property {:?} of pool {:?}", prop, self.name),
                    e,
                )
            })?;

        str_from_only_line(&out)
    }

    pub(crate) fn system(&self) -> &System {
        &self.system
    }
}

impl PartialEq for Pool {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.guid == other.guid
            && self.size == other.size
            && self.allocated == other.allocated
            && self.free == other.free
            && self.fragmentation_percent == other.fragmentation_percent
            && self.health_status == other.health_status
            && self.alt_root == other.alt_root
    }
}

impl Eq for Pool {}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Pool Name: {:?}}}", self.name)
    }
}

pub(crate) fn parse_pool_info(line: &str, system: &System) -> Result<Pool> {
    let cols = split_columns(line, POOL_COLUMNS.len(), POOL_INFO)?;

    Ok(Pool {
        name: cols[0].to_string(),
        guid: parse_u64(cols[1], "pool info guid")?,
        size: parse_u64(cols[2], "pool info size")?,
        allocated: parse_u64(cols[3], "pool info allocated")?,
        free: parse_u64(cols[4], "pool info free")?,
        fragmentation_percent: parse_u8(cols[5], "pool info fragmentation")?,
        health_status: require_non_empty(cols[6], "pool info health", "health")?.to_string(),
        alt_root: require_non_empty(cols[7], "pool info altroot", "altroot")?.to_string(),
        system: system.clone(),
    })
}

pub(crate) fn list_pools(system: &System) -> Result<PoolList> {
    info!("正在列出存储池");

    let out = system
        .cmd()
        .zpool()
        .list(&POOL_COLUMNS)
        .map_err(|e| ZfsError::command("failed to list pools", e))?;

    let pools = split_lines(&out)
        .iter()
        .map(|line| parse_pool_info(line, system).map(Arc::new))
        .collect::<Result<PoolList>>()?;

    debug!("找到 {} 个存储池", pools.len());
    Ok(pools)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{fake_system, pool_props};
    use zquery_command::fake::{FakeCommands, FakePool, FakePools};
    use zquery_command::CommandError;

    fn system() -> System {
        fake_system(FakeCommands::new(FakePools::new()))
    }

    #[test]
    fn test_parse_pool_info() {
        let pool = parse_pool_info(
            "tank\t42\t16000000\t10000000\t6000000\t5\tONLINE\t-",
            &system(),
        )
        .unwrap();

        assert_eq!(pool.name, "tank");
        assert_eq!(pool.guid, 42);
        assert_eq!(pool.size, 16_000_000);
        assert_eq!(pool.allocated, 10_000_000);
        assert_eq!(pool.free, 6_000_000);
        assert_eq!(pool.fragmentation_percent, 5);
        assert_eq!(pool.health_status, "ONLINE");
        assert_eq!(pool.alt_root, "-");
    }

    #[test]
    fn test_parse_pool_info_max_values() {
        let line = format!("p\t{0}\t{0}\t{0}\t{0}\t255\tFAULTED\t/mnt", u64::MAX);
        let pool = parse_pool_info(&line, &system()).unwrap();
        assert_eq!(pool.guid, u64::MAX);
        assert_eq!(pool.free, u64::MAX);
        assert_eq!(pool.fragmentation_percent, 255);
        assert_eq!(pool.alt_root, "/mnt");
    }

    #[test]
    fn test_parse_pool_info_wrong_column_count() {
        let err = parse_pool_info("tank\t42", &system()).unwrap_err();
        assert!(matches!(
            err,
            ZfsError::ColumnCount {
                entity: "pool info",
                expected: 8,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_pool_info_field_errors() {
        let cases = [
            ("tank\tx\t1\t1\t1\t1\tONLINE\t-", "pool info guid"),
            ("tank\t1\t-1\t1\t1\t1\tONLINE\t-", "pool info size"),
            ("tank\t1\t1\t1.5\t1\t1\tONLINE\t-", "pool info allocated"),
            ("tank\t1\t1\t1\t\t1\tONLINE\t-", "pool info free"),
            ("tank\t1\t1\t1\t1\t256\tONLINE\t-", "pool info fragmentation"),
        ];

        for (line, description) in cases {
            match parse_pool_info(line, &system()) {
                Err(ZfsError::Parse(e)) => assert_eq!(e.description, description, "line {:?}", line),
                other => panic!("line {:?}: unexpected result {:?}", line, other),
            }
        }

        let err = parse_pool_info("tank\t1\t1\t1\t1\t1\t\t-", &system()).unwrap_err();
        assert!(matches!(err, ZfsError::EmptyField { field: "health", .. }));
        let err = parse_pool_info("tank\t1\t1\t1\t1\t1\tONLINE\t", &system()).unwrap_err();
        assert!(matches!(err, ZfsError::EmptyField { field: "altroot", .. }));
    }

    #[test]
    fn test_display() {
        let pool = parse_pool_info("MyTestPool\t123456789012345988\t123\t10\t113\t6\tONLINE\t/my-alt-root", &system())
            .unwrap();

        assert_eq!(pool.to_string(), r#"{Pool Name: "MyTestPool"}"#);
        assert_eq!(
            pool.verbose_string(),
            r#"{Pool Name: "MyTestPool", GUID: 123456789012345988, Size: 123, Allocated: 10, Free: 113, Fragmentation: 6%, HealthStatus: "ONLINE", AltRoot: "/my-alt-root"}"#
        );
    }

    #[test]
    fn test_list_pools_command_failure() {
        let fake = FakeCommands::new(FakePools::new())
            .with_zpool_list(|_| Err(CommandError::Message("zpool list command failed".into())));

        let err = fake_system(fake).list_pools().unwrap_err();
        assert_eq!(err.to_string(), "failed to list pools, reason: zpool list command failed");
    }

    #[test]
    fn test_list_pools_empty_altroot_on_last_line() {
        let fake = FakeCommands::new(FakePools::new())
            .with_zpool_list(|_| Ok("tank\t1\t1\t1\t1\t1\tONLINE\t\n".to_string()));

        let err = fake_system(fake).list_pools().unwrap_err();
        assert!(matches!(
            err,
            ZfsError::ColumnCount {
                entity: "pool info",
                expected: 8,
                found: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_list_pools_empty_altroot_before_last_line() {
        let fake = FakeCommands::new(FakePools::new()).with_zpool_list(|_| {
            Ok("tank\t1\t1\t1\t1\t1\tONLINE\t\nbackup\t2\t1\t1\t1\t1\tONLINE\t-\n".to_string())
        });

        let err = fake_system(fake).list_pools().unwrap_err();
        assert!(matches!(err, ZfsError::EmptyField { field: "altroot", .. }));
    }

    #[test]
    fn test_get_prop() {
        let pools = FakePools::from([(
            "tank".to_string(),
            FakePool::new().props(pool_props("1")).prop("somekey", "somevalue"),
        )]);
        let pools = fake_system(FakeCommands::new(pools)).list_pools().unwrap();

        assert_eq!(pools[0].get_prop("somekey").unwrap(), "somevalue");
        assert_eq!(pools[0].get_prop("missing").unwrap(), "-");
    }
}
