//! 主机工具的内存替代实现
//!
//! 保存 存储池 -> 文件系统 -> 快照 -> 保留 的树，并以与 `zfs`/`zpool -H -p`
//! 完全一致的格式响应端口调用。每个操作都可替换为闭包，用于注入异常输出或失败。
//!
//! 文件系统以相对存储池的名称为键，存储池的根文件系统以存储池名称为键。
//!
//! # 示例
//!
//! ```ignore
//! use zquery_command::fake::{FakeCommands, FakeFileSystem, FakePool, FakePools};
//!
//! let pools = FakePools::from([(
//!     "tank".to_string(),
//!     FakePool::new()
//!         .prop("guid", "42")
//!         .file_system("tank", FakeFileSystem::new().prop("guid", "7")),
//! )]);
//! let invoker = FakeCommands::new(pools).invoker();
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::error::{CommandError, Result};
use crate::port::{CommandInvoker, ListType, ZfsCmd, ZpoolCmd, HOLD_TIMESTAMP_FORMAT};

/// 未设置属性的输出值
const UNSET: &str = "-";

/// 属性名 -> 原始值
pub type PropMap = BTreeMap<String, String>;

/// 存储池名称 -> 存储池
pub type FakePools = BTreeMap<String, FakePool>;

/// 替换 `zpool list`
pub type ZpoolListFn = Arc<dyn Fn(&[&str]) -> Result<String> + Send + Sync>;
/// 替换 `zpool get` / `zfs get`
pub type GetFn = Arc<dyn Fn(&str, &[&str], &[&str]) -> Result<String> + Send + Sync>;
/// 替换 `zfs list`
pub type ZfsListFn = Arc<dyn Fn(&str, bool, ListType, &[&str]) -> Result<String> + Send + Sync>;
/// 替换 `zfs holds`
pub type HoldsFn = Arc<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// fake 后端中的存储池
#[derive(Debug, Clone, Default)]
pub struct FakePool {
    pub props: PropMap,
    pub file_systems: BTreeMap<String, FakeFileSystem>,
}

impl FakePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置单个属性
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// 批量设置属性，后出现的覆盖前面的
    pub fn props<K, V>(mut self, props: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in props {
            self.props.insert(key.into(), value.into());
        }
        self
    }

    /// 添加文件系统（根文件系统使用存储池名称）
    pub fn file_system(mut self, name: impl Into<String>, fs: FakeFileSystem) -> Self {
        self.file_systems.insert(name.into(), fs);
        self
    }
}

/// fake 后端中的文件系统
#[derive(Debug, Clone, Default)]
pub struct FakeFileSystem {
    pub props: PropMap,
    pub snapshots: BTreeMap<String, FakeSnapshot>,
}

impl FakeFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn snapshot(mut self, name: impl Into<String>, snapshot: FakeSnapshot) -> Self {
        self.snapshots.insert(name.into(), snapshot);
        self
    }
}

/// fake 后端中的快照
#[derive(Debug, Clone, Default)]
pub struct FakeSnapshot {
    pub props: PropMap,
    pub holds: BTreeMap<String, FakeHold>,
}

impl FakeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// 添加保留，`creation` 为本地时间
    pub fn hold(mut self, tag: impl Into<String>, creation: NaiveDateTime) -> Self {
        self.holds.insert(tag.into(), FakeHold { creation });
        self
    }
}

/// fake 后端中的保留
#[derive(Debug, Clone)]
pub struct FakeHold {
    pub creation: NaiveDateTime,
}

/// fake `zpool`
#[derive(Clone)]
pub struct FakeZpoolCmd {
    pools: Arc<FakePools>,
    list_override: Option<ZpoolListFn>,
    get_override: Option<GetFn>,
}

impl ZpoolCmd for FakeZpoolCmd {
    fn list(&self, cols: &[&str]) -> Result<String> {
        if cols.is_empty() {
            return Err(CommandError::NoColumns {
                program: "zpool",
                action: "list",
            });
        }
        if let Some(list) = &self.list_override {
            return list(cols);
        }

        let mut out = ColumnWriter::default();
        for (name, pool) in self.pools.iter() {
            out.write_row(cols.iter().map(|col| lookup(name, &pool.props, col)));
        }

        Ok(out.finish())
    }

    fn get(&self, pool: &str, props: &[&str], cols: &[&str]) -> Result<String> {
        if cols.is_empty() {
            return Err(CommandError::NoColumns {
                program: "zpool",
                action: "get",
            });
        }
        if let Some(get) = &self.get_override {
            return get(pool, props, cols);
        }

        let found = self
            .pools
            .get(pool)
            .ok_or_else(|| CommandError::NotFound(format!("cannot open '{}': no such pool", pool)))?;

        Ok(render_get(pool, &found.props, props, cols))
    }
}

/// fake `zfs`
#[derive(Clone)]
pub struct FakeZfsCmd {
    pools: Arc<FakePools>,
    list_override: Option<ZfsListFn>,
    get_override: Option<GetFn>,
    holds_override: Option<HoldsFn>,
}

/// 单个文件系统或快照的扁平视图
struct Dataset<'a> {
    name: String,
    list_type: ListType,
    props: &'a PropMap,
    holds: Option<&'a BTreeMap<String, FakeHold>>,
}

impl FakeZfsCmd {
    /// 所有存储池的所有数据集，按完整名称排序
    fn datasets(&self) -> Vec<Dataset<'_>> {
        let mut result = Vec::new();

        for (pool_name, pool) in self.pools.iter() {
            for (fs_key, fs) in pool.file_systems.iter() {
                let fs_name = file_system_full_name(pool_name, fs_key);

                for (snap_name, snap) in fs.snapshots.iter() {
                    result.push(Dataset {
                        name: format!("{}@{}", fs_name, snap_name),
                        list_type: ListType::Snapshot,
                        props: &snap.props,
                        holds: Some(&snap.holds),
                    });
                }

                result.push(Dataset {
                    name: fs_name,
                    list_type: ListType::Filesystem,
                    props: &fs.props,
                    holds: None,
                });
            }
        }

        result.sort_by(|a, b| a.name.cmp(&b.name));
        result
    }

    fn find<'a>(datasets: &'a [Dataset<'a>], target: &str) -> Result<&'a Dataset<'a>> {
        datasets
            .iter()
            .find(|d| d.name == target)
            .ok_or_else(|| dataset_not_found(target))
    }
}

impl ZfsCmd for FakeZfsCmd {
    fn list(
        &self,
        target: &str,
        recursive: bool,
        list_type: ListType,
        cols: &[&str],
    ) -> Result<String> {
        if cols.is_empty() {
            return Err(CommandError::NoColumns {
                program: "zfs",
                action: "list",
            });
        }
        if let Some(list) = &self.list_override {
            return list(target, recursive, list_type, cols);
        }

        let datasets = self.datasets();
        Self::find(&datasets, target)?;

        let snapshot_prefix = format!("{}@", target);
        let child_prefix = format!("{}/", target);

        let mut out = ColumnWriter::default();
        for dataset in datasets.iter().filter(|d| d.list_type == list_type) {
            let selected = dataset.name == target
                || dataset.name.starts_with(&snapshot_prefix)
                || (recursive && dataset.name.starts_with(&child_prefix));
            if selected {
                out.write_row(cols.iter().map(|col| lookup(&dataset.name, dataset.props, col)));
            }
        }

        Ok(out.finish())
    }

    fn get(&self, target: &str, props: &[&str], cols: &[&str]) -> Result<String> {
        if cols.is_empty() {
            return Err(CommandError::NoColumns {
                program: "zfs",
                action: "get",
            });
        }
        if let Some(get) = &self.get_override {
            return get(target, props, cols);
        }

        let datasets = self.datasets();
        let dataset = Self::find(&datasets, target)?;

        Ok(render_get(&dataset.name, dataset.props, props, cols))
    }

    fn holds(&self, snapshot: &str) -> Result<String> {
        if let Some(holds) = &self.holds_override {
            return holds(snapshot);
        }

        let datasets = self.datasets();
        let holds = Self::find(&datasets, snapshot)?
            .holds
            .ok_or_else(|| dataset_not_found(snapshot))?;

        let mut out = ColumnWriter::default();
        for (tag, hold) in holds.iter() {
            out.write_row([
                snapshot.to_string(),
                tag.clone(),
                hold.creation.format(HOLD_TIMESTAMP_FORMAT).to_string(),
            ]);
        }

        Ok(out.finish())
    }
}

/// fake 端口的两部分及其替换钩子
#[derive(Clone)]
pub struct FakeCommands {
    zfs: FakeZfsCmd,
    zpool: FakeZpoolCmd,
}

impl FakeCommands {
    pub fn new(pools: FakePools) -> Self {
        let pools = Arc::new(pools);
        Self {
            zfs: FakeZfsCmd {
                pools: Arc::clone(&pools),
                list_override: None,
                get_override: None,
                holds_override: None,
            },
            zpool: FakeZpoolCmd {
                pools,
                list_override: None,
                get_override: None,
            },
        }
    }

    /// 替换 `zpool list`
    pub fn with_zpool_list<F>(mut self, f: F) -> Self
    where
        F: Fn(&[&str]) -> Result<String> + Send + Sync + 'static,
    {
        self.zpool.list_override = Some(Arc::new(f));
        self
    }

    /// 替换 `zpool get`
    pub fn with_zpool_get<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &[&str], &[&str]) -> Result<String> + Send + Sync + 'static,
    {
        self.zpool.get_override = Some(Arc::new(f));
        self
    }

    /// 替换 `zfs list`
    pub fn with_zfs_list<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, bool, ListType, &[&str]) -> Result<String> + Send + Sync + 'static,
    {
        self.zfs.list_override = Some(Arc::new(f));
        self
    }

    /// 替换 `zfs get`
    pub fn with_zfs_get<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &[&str], &[&str]) -> Result<String> + Send + Sync + 'static,
    {
        self.zfs.get_override = Some(Arc::new(f));
        self
    }

    /// 替换 `zfs holds`
    pub fn with_holds<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        self.zfs.holds_override = Some(Arc::new(f));
        self
    }

    /// 基于该后端的调用器
    pub fn invoker(&self) -> CommandInvoker {
        CommandInvoker::new(Arc::new(self.zfs.clone()), Arc::new(self.zpool.clone()))
    }
}

fn file_system_full_name(pool: &str, key: &str) -> String {
    if key.is_empty() || key == pool {
        pool.to_string()
    } else {
        format!("{}/{}", pool, key)
    }
}

fn dataset_not_found(target: &str) -> CommandError {
    CommandError::NotFound(format!("cannot open '{}': dataset does not exist", target))
}

fn lookup(name: &str, props: &PropMap, col: &str) -> String {
    if col == "name" {
        return name.to_string();
    }
    props.get(col).cloned().unwrap_or_else(|| UNSET.to_string())
}

/// 每个属性一行，列取自 name/property/value/source
fn render_get(name: &str, values: &PropMap, props: &[&str], cols: &[&str]) -> String {
    let mut out = ColumnWriter::default();

    for prop in props {
        let is_set = *prop == "name" || values.contains_key(*prop);
        out.write_row(cols.iter().map(|col| match *col {
            "name" => name.to_string(),
            "property" => prop.to_string(),
            "value" => lookup(name, values, prop),
            "source" if is_set => "local".to_string(),
            _ => UNSET.to_string(),
        }));
    }

    out.finish()
}

/// 制表符分隔、换行结尾的行
#[derive(Default)]
struct ColumnWriter {
    result: String,
}

impl ColumnWriter {
    fn write_row<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.result.push('\t');
            }
            self.result.push_str(value.as_ref());
        }
        self.result.push('\n');
    }

    fn finish(self) -> String {
        self.result
    }
}
