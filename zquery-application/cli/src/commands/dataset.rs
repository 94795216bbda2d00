//! 文件系统 / 快照 / 保留命令

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::info;
use zquery_zfs::System;

use super::common::{find_file_system, find_pool, find_snapshot, pool_name_of};
use super::output::{output_formatted, FileSystemRow, HoldRow, SnapshotRow};

/// 列出存储池的所有文件系统
pub fn list_file_systems(system: &System, pool: &str, format: &str) -> Result<()> {
    let pool = find_pool(system, pool)?;
    let file_systems = pool
        .file_systems()
        .with_context(|| format!("获取存储池 {} 的文件系统失败", pool.name))?;

    let rows: Vec<FileSystemRow> = file_systems
        .iter()
        .map(|fs| FileSystemRow::from(fs.as_ref()))
        .collect();
    output_formatted(&rows, format)
}

/// 列出快照；未指定文件系统时列出存储池全部文件系统的快照
pub fn list_snapshots(system: &System, pool: &str, fs: Option<&str>, format: &str) -> Result<()> {
    let file_systems = match fs {
        Some(name) => {
            if pool_name_of(name) != pool {
                bail!("文件系统 {} 不属于存储池 {}", name, pool);
            }
            vec![find_file_system(system, name)?]
        }
        None => {
            let pool = find_pool(system, pool)?;
            pool.file_systems()
                .with_context(|| format!("获取存储池 {} 的文件系统失败", pool.name))?
        }
    };

    let mut rows = Vec::new();
    for fs in &file_systems {
        let snapshots = fs
            .snapshots()
            .with_context(|| format!("获取文件系统 {} 的快照失败", fs.full_name()))?;
        rows.extend(snapshots.iter().map(|s| SnapshotRow::from(s.as_ref())));
    }
    info!("共 {} 个快照", rows.len());

    if rows.is_empty() && format != "json" {
        println!("{}", "没有找到任何快照".yellow());
        return Ok(());
    }

    output_formatted(&rows, format)
}

/// 列出快照上的保留
pub fn list_holds(system: &System, snapshot: &str, format: &str) -> Result<()> {
    let snapshot = find_snapshot(system, snapshot)?;
    let holds = snapshot
        .holds()
        .with_context(|| format!("获取快照 {} 的保留失败", snapshot.full_name()))?;

    let rows: Vec<HoldRow> = holds.iter().map(|h| HoldRow::from(h.as_ref())).collect();
    output_formatted(&rows, format)
}

/// 查询文件系统或快照属性
pub fn get_prop(system: &System, target: &str, prop: &str) -> Result<()> {
    let value = if target.contains('@') {
        find_snapshot(system, target)?.get_prop(prop)
    } else {
        find_file_system(system, target)?.get_prop(prop)
    }
    .with_context(|| format!("获取 {} 的属性 {} 失败", target, prop))?;

    println!("{}", value);
    Ok(())
}
