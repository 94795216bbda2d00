//! 基于进程的端口实现
//!
//! 每次调用启动一个 `zfs`/`zpool` 进程，读完输出并检查退出状态后返回，
//! 进程不会跨调用存活。

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{CommandError, Result};
use crate::port::{ListType, ZfsCmd, ZpoolCmd};

/// `zfs` 调用器
#[derive(Debug, Clone)]
pub struct SystemZfsCmd {
    binary: PathBuf,
}

impl SystemZfsCmd {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[String]) -> Result<String> {
        run_system_cmd(&self.binary, args)
    }
}

impl ZfsCmd for SystemZfsCmd {
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

        self.run(&zfs_list_args(target, recursive, list_type, cols))
    }

    fn get(&self, target: &str, props: &[&str], cols: &[&str]) -> Result<String> {
        if cols.is_empty() {
            return Err(CommandError::NoColumns {
                program: "zfs",
                action: "get",
            });
        }

        self.run(&get_args(target, props, cols))
    }

    fn holds(&self, snapshot: &str) -> Result<String> {
        self.run(&["holds".to_string(), "-H".to_string(), snapshot.to_string()])
    }
}

/// `zpool` 调用器
#[derive(Debug, Clone)]
pub struct SystemZpoolCmd {
    binary: PathBuf,
}

impl SystemZpoolCmd {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[String]) -> Result<String> {
        run_system_cmd(&self.binary, args)
    }
}

impl ZpoolCmd for SystemZpoolCmd {
    fn list(&self, cols: &[&str]) -> Result<String> {
        if cols.is_empty() {
            return Err(CommandError::NoColumns {
                program: "zpool",
                action: "list",
            });
        }

        self.run(&zpool_list_args(cols))
    }

    fn get(&self, pool: &str, props: &[&str], cols: &[&str]) -> Result<String> {
        if cols.is_empty() {
            return Err(CommandError::NoColumns {
                program: "zpool",
                action: "get",
            });
        }

        self.run(&get_args(pool, props, cols))
    }
}

/// `zfs list -H -p [-r] -t <type> -o <cols> <target>`
fn zfs_list_args(target: &str, recursive: bool, list_type: ListType, cols: &[&str]) -> Vec<String> {
    let mut args = vec!["list".to_string(), "-H".to_string(), "-p".to_string()];
    if recursive {
        args.push("-r".to_string());
    }
    args.extend([
        "-t".to_string(),
        list_type.as_str().to_string(),
        "-o".to_string(),
        cols.join(","),
        target.to_string(),
    ]);
    args
}

/// `zpool list -H -p -o <cols>`
fn zpool_list_args(cols: &[&str]) -> Vec<String> {
    vec![
        "list".to_string(),
        "-H".to_string(),
        "-p".to_string(),
        "-o".to_string(),
        cols.join(","),
    ]
}

/// `get -H -o <cols> <props> <target>`，两个工具参数形式相同
fn get_args(target: &str, props: &[&str], cols: &[&str]) -> Vec<String> {
    vec![
        "get".to_string(),
        "-H".to_string(),
        "-o".to_string(),
        cols.join(","),
        props.join(","),
        target.to_string(),
    ]
}

fn run_system_cmd(binary: &Path, args: &[String]) -> Result<String> {
    let program = binary.display().to_string();
    debug!("执行命令: {} {}", program, args.join(" "));

    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| CommandError::Spawn {
            program: program.clone(),
            args: args.to_vec(),
            source,
        })?;

    if !output.status.success() {
        return Err(CommandError::Failed {
            program,
            args: args.to_vec(),
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    debug!("{} 执行成功, 输出长度: {}", program, stdout.len());

    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zfs_list_args() {
        let args = zfs_list_args("tank", true, ListType::Filesystem, &["name", "guid", "creation"]);
        assert_eq!(
            args,
            vec!["list", "-H", "-p", "-r", "-t", "filesystem", "-o", "name,guid,creation", "tank"]
        );

        let args = zfs_list_args("tank/home", false, ListType::Snapshot, &["name"]);
        assert_eq!(
            args,
            vec!["list", "-H", "-p", "-t", "snapshot", "-o", "name", "tank/home"]
        );
    }

    #[test]
    fn test_get_args() {
        let args = get_args("tank@daily", &["used", "refer"], &["value"]);
        assert_eq!(args, vec!["get", "-H", "-o", "value", "used,refer", "tank@daily"]);
    }

    #[test]
    fn test_zpool_list_args() {
        assert_eq!(
            zpool_list_args(&["name", "health"]),
            vec!["list", "-H", "-p", "-o", "name,health"]
        );
    }

    #[test]
    fn test_empty_columns_rejected_before_spawn() {
        // 可执行文件不存在：若走到启动进程这一步会得到 Spawn 错误
        let zfs = SystemZfsCmd::new("/nonexistent/zfs");
        let err = zfs.list("tank", false, ListType::Snapshot, &[]).unwrap_err();
        assert!(matches!(err, CommandError::NoColumns { program: "zfs", action: "list" }));
        let err = zfs.get("tank", &["used"], &[]).unwrap_err();
        assert!(matches!(err, CommandError::NoColumns { program: "zfs", action: "get" }));

        let zpool = SystemZpoolCmd::new("/nonexistent/zpool");
        let err = zpool.list(&[]).unwrap_err();
        assert!(matches!(err, CommandError::NoColumns { program: "zpool", action: "list" }));
        let err = zpool.get("tank", &["size"], &[]).unwrap_err();
        assert!(matches!(err, CommandError::NoColumns { program: "zpool", action: "get" }));
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let zpool = SystemZpoolCmd::new("/nonexistent/zpool");
        let err = zpool.list(&["name"]).unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
        assert!(err.to_string().starts_with("command failed /nonexistent/zpool"));
    }
}
