//! CLI 通用输出格式化模块
//!
//! 提供 table/json 两种输出格式，以及各实体对应的输出行

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;
use zquery_zfs::{FileSystem, Hold, Pool, RecursiveHoldGroupList, RecursiveSnapshotGroup, Snapshot};

/// 可输出为表格行的数据 trait
pub trait TableRow {
    /// 返回表格列标题
    fn headers() -> Vec<&'static str>;

    /// 返回该项的表格行数据
    fn row(&self) -> Vec<String>;
}

/// 渲染表格（表头 + 分隔线 + 数据行）
pub fn render_table<T: TableRow>(items: &[T]) -> String {
    let format_line = |cells: Vec<String>| {
        cells
            .iter()
            .map(|c| format!("{:<20}", c))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    };

    let header_line = format_line(T::headers().into_iter().map(String::from).collect());

    let mut lines = vec![header_line.clone(), "-".repeat(header_line.len())];
    lines.extend(items.iter().map(|item| format_line(item.row())));
    lines.join("\n")
}

/// 表格格式输出
pub fn print_table<T: TableRow>(items: &[T]) {
    println!("{}", render_table(items));
}

/// JSON 格式输出
pub fn print_json<T: Serialize>(items: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(items)?);
    Ok(())
}

/// 根据格式参数选择输出方式
pub fn output_formatted<T: TableRow + Serialize>(items: &[T], format: &str) -> Result<()> {
    match format {
        "json" => print_json(items)?,
        _ => print_table(items),
    }
    Ok(())
}

fn timestamp(t: &DateTime<Local>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 存储池输出行
#[derive(Debug, Serialize)]
pub struct PoolRow {
    pub name: String,
    pub guid: u64,
    pub size: u64,
    pub allocated: u64,
    pub free: u64,
    pub fragmentation: u8,
    pub health: String,
    pub altroot: String,
}

impl From<&Pool> for PoolRow {
    fn from(pool: &Pool) -> Self {
        Self {
            name: pool.name.clone(),
            guid: pool.guid,
            size: pool.size,
            allocated: pool.allocated,
            free: pool.free,
            fragmentation: pool.fragmentation_percent,
            health: pool.health_status.clone(),
            altroot: pool.alt_root.clone(),
        }
    }
}

impl TableRow for PoolRow {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "GUID", "SIZE", "ALLOC", "FREE", "FRAG", "HEALTH", "ALTROOT"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.guid.to_string(),
            self.size.to_string(),
            self.allocated.to_string(),
            self.free.to_string(),
            format!("{}%", self.fragmentation),
            self.health.clone(),
            self.altroot.clone(),
        ]
    }
}

/// 文件系统输出行
#[derive(Debug, Serialize)]
pub struct FileSystemRow {
    pub name: String,
    pub is_root: bool,
    pub guid: u64,
    pub creation: DateTime<Local>,
}

impl From<&FileSystem> for FileSystemRow {
    fn from(fs: &FileSystem) -> Self {
        Self {
            name: fs.full_name(),
            is_root: fs.is_root,
            guid: fs.guid,
            creation: fs.creation,
        }
    }
}

impl TableRow for FileSystemRow {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "ROOT", "GUID", "CREATION"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            if self.is_root { "yes" } else { "-" }.to_string(),
            self.guid.to_string(),
            timestamp(&self.creation),
        ]
    }
}

/// 快照输出行
#[derive(Debug, Serialize)]
pub struct SnapshotRow {
    pub name: String,
    pub guid: u64,
    pub creation: DateTime<Local>,
}

impl From<&Snapshot> for SnapshotRow {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            name: snapshot.full_name(),
            guid: snapshot.guid,
            creation: snapshot.creation,
        }
    }
}

impl TableRow for SnapshotRow {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "GUID", "CREATION"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.guid.to_string(), timestamp(&self.creation)]
    }
}

/// 保留输出行
#[derive(Debug, Serialize)]
pub struct HoldRow {
    pub snapshot: String,
    pub tag: String,
    pub creation: DateTime<Local>,
}

impl From<&Hold> for HoldRow {
    fn from(hold: &Hold) -> Self {
        Self {
            snapshot: hold.snapshot.full_name(),
            tag: hold.tag.clone(),
            creation: hold.creation,
        }
    }
}

impl TableRow for HoldRow {
    fn headers() -> Vec<&'static str> {
        vec!["SNAPSHOT", "TAG", "CREATION"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.snapshot.clone(), self.tag.clone(), timestamp(&self.creation)]
    }
}

/// 递归快照组输出行
#[derive(Debug, Serialize)]
pub struct GroupRow {
    pub name: String,
    pub creation: DateTime<Local>,
    pub snapshots: usize,
    /// 仅在 `--holds` 时填充
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holds: Option<Vec<String>>,
}

impl GroupRow {
    pub fn new(group: &RecursiveSnapshotGroup, holds: Option<&RecursiveHoldGroupList>) -> Self {
        Self {
            name: group.name.clone(),
            creation: group.creation,
            snapshots: group.snapshots.len(),
            holds: holds.map(|holds| holds.iter().map(|h| h.tag.clone()).collect()),
        }
    }
}

impl TableRow for GroupRow {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "CREATION", "SNAPSHOTS", "HOLDS"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            timestamp(&self.creation),
            self.snapshots.to_string(),
            match &self.holds {
                Some(holds) if !holds.is_empty() => holds.join(","),
                _ => "-".to_string(),
            },
        ]
    }
}
