//! zquery CLI 应用

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use zquery_zfs::{System, SystemConfig};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "zquery")]
#[command(about = "zquery - ZFS 存储池/文件系统/快照只读查询工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// 配置文件路径 (默认 ~/.config/zquery/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 输出格式 (table/json)，覆盖配置文件
    #[arg(short, long)]
    format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出存储池
    Pools,

    /// 列出存储池的文件系统
    #[command(alias = "fs")]
    Filesystems {
        /// 存储池名称
        pool: String,
    },

    /// 列出快照
    Snapshots {
        /// 存储池名称
        pool: String,
        /// 只列出该文件系统的快照 (完整路径，如 tank/home)
        #[arg(long)]
        fs: Option<String>,
    },

    /// 列出快照上的保留
    Holds {
        /// 快照完整名称，如 tank/home@daily
        snapshot: String,
    },

    /// 列出递归快照组
    Groups {
        /// 存储池名称
        pool: String,
        /// 同时列出每个组的递归保留
        #[arg(long)]
        holds: bool,
    },

    /// 查询属性
    Get {
        #[command(subcommand)]
        action: GetAction,
    },
}

#[derive(Subcommand)]
enum GetAction {
    /// 存储池属性
    Pool {
        /// 存储池名称
        pool: String,
        /// 属性名
        prop: String,
    },
    /// 文件系统或快照属性
    Dataset {
        /// 文件系统或快照完整名称
        target: String,
        /// 属性名
        prop: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => CliConfig::load_from(path)?,
        None => CliConfig::load()?,
    };
    debug!("配置: {:?}", config);

    let format = cli.format.unwrap_or_else(|| config.format.clone());
    let system = System::new(SystemConfig::default().with_command(config.command));

    // 处理命令
    match cli.command {
        Commands::Pools => commands::pool::list_pools(&system, &format)?,
        Commands::Filesystems { pool } => commands::dataset::list_file_systems(&system, &pool, &format)?,
        Commands::Snapshots { pool, fs } => {
            commands::dataset::list_snapshots(&system, &pool, fs.as_deref(), &format)?
        }
        Commands::Holds { snapshot } => commands::dataset::list_holds(&system, &snapshot, &format)?,
        Commands::Groups { pool, holds } => commands::group::list_groups(&system, &pool, holds, &format)?,
        Commands::Get { action } => match action {
            GetAction::Pool { pool, prop } => commands::pool::get_prop(&system, &pool, &prop)?,
            GetAction::Dataset { target, prop } => commands::dataset::get_prop(&system, &target, &prop)?,
        },
    }

    Ok(())
}
