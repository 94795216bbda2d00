//! 会话句柄
//!
//! `System` 在会话期间持有命令端口。通过它加载的每个实体都保存句柄的副本，
//! 调用方不再使用这些实体时会话即可释放。

use tracing::info;
use zquery_command::{CommandConfig, CommandInvoker};

use crate::error::Result;
use crate::pool::{list_pools, PoolList};

/// 会话配置
#[derive(Debug, Clone, Default)]
pub struct SystemConfig {
    /// 替代命令端口（如 fake 后端）。未设置时使用 `command` 指定的 `zfs`/`zpool`
    pub alternate_cmd: Option<CommandInvoker>,

    /// 真实命令端口使用的可执行文件
    pub command: CommandConfig,
}

impl SystemConfig {
    /// 使用 `invoker` 替代真实工具
    pub fn with_invoker(mut self, invoker: CommandInvoker) -> Self {
        self.alternate_cmd = Some(invoker);
        self
    }

    /// 设置真实命令端口的可执行文件
    pub fn with_command(mut self, command: CommandConfig) -> Self {
        self.command = command;
        self
    }
}

/// 实体图的根
#[derive(Debug, Clone)]
pub struct System {
    cmd: CommandInvoker,
}

impl System {
    /// 创建会话，命令端口在会话期间不变
    pub fn new(config: SystemConfig) -> Self {
        let cmd = match config.alternate_cmd {
            Some(invoker) => {
                info!("使用替代命令端口");
                invoker
            }
            None => CommandInvoker::system(&config.command),
        };

        Self { cmd }
    }

    /// 列出主机上的所有存储池
    pub fn list_pools(&self) -> Result<PoolList> {
        list_pools(self)
    }

    pub(crate) fn cmd(&self) -> &CommandInvoker {
        &self.cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zquery_command::fake::{FakeCommands, FakePools};

    #[test]
    fn test_default_config_uses_real_binaries() {
        let config = SystemConfig::default();
        assert!(config.alternate_cmd.is_none());
        assert_eq!(config.command.zfs_path.to_str(), Some("zfs"));
        assert_eq!(config.command.zpool_path.to_str(), Some("zpool"));
    }

    #[test]
    fn test_substitute_port_with_no_pools() {
        let invoker = FakeCommands::new(FakePools::new()).invoker();
        let system = System::new(SystemConfig::default().with_invoker(invoker));
        assert!(system.list_pools().unwrap().is_empty());
    }
}
