//! zquery 命令端口
//!
//! 执行主机上的 `zfs`/`zpool` 工具并返回原始的制表符分隔输出，不做任何解析（解析在 `zquery-zfs` 中）。
//!
//! - `ZfsCmd` / `ZpoolCmd`: 端口的两组能力
//! - `CommandInvoker`: 构造时选定的一组实现
//! - `SystemZfsCmd` / `SystemZpoolCmd`: 基于进程的实现
//! - `fake`: 满足相同约定的内存后端
//!
//! # 示例
//!
//! ```ignore
//! use zquery_command::{CommandConfig, CommandInvoker};
//!
//! let invoker = CommandInvoker::system(&CommandConfig::default());
//! let out = invoker.zpool().list(&["name", "health"])?;
//! for line in out.lines() {
//!     println!("{}", line);
//! }
//! ```

mod config;
mod error;
pub mod fake;
mod port;
mod system;

pub use config::CommandConfig;
pub use error::{CommandError, Result};
pub use port::{CommandInvoker, ListType, ZfsCmd, ZpoolCmd, HOLD_TIMESTAMP_FORMAT};
pub use system::{SystemZfsCmd, SystemZpoolCmd};
