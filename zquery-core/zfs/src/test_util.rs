//! 单元测试共用的构造函数

use std::sync::Arc;

use chrono::{Local, TimeZone};
use zquery_command::fake::{FakeCommands, FakePools};

use crate::file_system::FileSystem;
use crate::pool::{parse_pool_info, Pool};
use crate::snapshot::Snapshot;
use crate::system::{System, SystemConfig};

pub(crate) fn fake_system(fake: FakeCommands) -> System {
    System::new(SystemConfig::default().with_invoker(fake.invoker()))
}

/// 除名称外的全部存储池列
pub(crate) fn pool_props(guid: &str) -> Vec<(&'static str, String)> {
    vec![
        ("guid", guid.to_string()),
        ("size", "16000000".to_string()),
        ("allocated", "10000000".to_string()),
        ("free", "6000000".to_string()),
        ("fragmentation", "5".to_string()),
        ("health", "ONLINE".to_string()),
        ("altroot", "-".to_string()),
    ]
}

/// 不经过 `zpool list`，直接构造绑定到 `system` 的存储池
pub(crate) fn single_pool(system: &System, name: &str) -> Arc<Pool> {
    let line = format!("{}\t1\t16000000\t10000000\t6000000\t5\tONLINE\t-", name);
    Arc::new(parse_pool_info(&line, system).unwrap())
}

/// 基于空 fake 后端的存储池 "tank"
pub(crate) fn tank() -> Arc<Pool> {
    single_pool(&fake_system(FakeCommands::new(FakePools::new())), "tank")
}

pub(crate) fn root_fs(pool: &Arc<Pool>) -> Arc<FileSystem> {
    Arc::new(FileSystem {
        name: pool.name.clone(),
        is_root: true,
        pool: Arc::clone(pool),
        guid: 1,
        creation: Local.timestamp_opt(0, 0).unwrap(),
    })
}

pub(crate) fn child_fs(pool: &Arc<Pool>, name: &str) -> Arc<FileSystem> {
    Arc::new(FileSystem {
        name: name.to_string(),
        is_root: false,
        pool: Arc::clone(pool),
        guid: 2,
        creation: Local.timestamp_opt(0, 0).unwrap(),
    })
}

pub(crate) fn snapshot_of(fs: &Arc<FileSystem>, name: &str, creation: i64) -> Arc<Snapshot> {
    Arc::new(Snapshot {
        name: name.to_string(),
        file_system: Arc::clone(fs),
        guid: 3,
        creation: Local.timestamp_opt(creation, 0).unwrap(),
    })
}
