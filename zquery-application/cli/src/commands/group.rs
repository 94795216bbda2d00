//! 递归快照组命令

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;
use zquery_zfs::System;

use super::common::find_pool;
use super::output::{output_formatted, GroupRow};

/// 列出存储池的递归快照组，`with_holds` 时附带每组的递归保留
pub fn list_groups(system: &System, pool: &str, with_holds: bool, format: &str) -> Result<()> {
    let pool = find_pool(system, pool)?;
    let groups = pool
        .recursive_snapshot_groups()
        .with_context(|| format!("获取存储池 {} 的递归快照组失败", pool.name))?;
    info!("共 {} 个递归快照组", groups.len());

    if groups.is_empty() && format != "json" {
        println!("{}", "没有找到任何递归快照组".yellow());
        return Ok(());
    }

    let mut rows = Vec::with_capacity(groups.len());
    for group in &groups {
        let holds = if with_holds {
            let holds = group
                .holds()
                .with_context(|| format!("获取递归快照组 {} 的保留失败", group.name))?;
            Some(holds)
        } else {
            None
        };
        rows.push(GroupRow::new(group, holds.as_ref()));
    }

    output_formatted(&rows, format)
}
