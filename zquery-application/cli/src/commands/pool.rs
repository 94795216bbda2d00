//! 存储池命令

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;
use zquery_zfs::System;

use super::common::find_pool;
use super::output::{output_formatted, PoolRow};

/// 列出所有存储池
pub fn list_pools(system: &System, format: &str) -> Result<()> {
    let pools = system.list_pools().context("获取存储池列表失败")?;
    info!("共 {} 个存储池", pools.len());

    if pools.is_empty() && format != "json" {
        println!("{}", "没有找到任何存储池".yellow());
        return Ok(());
    }

    let rows: Vec<PoolRow> = pools.iter().map(|p| PoolRow::from(p.as_ref())).collect();
    output_formatted(&rows, format)
}

/// 查询存储池属性
pub fn get_prop(system: &System, pool: &str, prop: &str) -> Result<()> {
    let pool = find_pool(system, pool)?;
    let value = pool
        .get_prop(prop)
        .with_context(|| format!("获取存储池 {} 的属性 {} 失败", pool.name, prop))?;

    println!("{}", value);
    Ok(())
}
