//! 命令端口错误定义

use thiserror::Error;

/// 命令端口结果类型
pub type Result<T> = std::result::Result<T, CommandError>;

/// 命令端口错误类型
#[derive(Error, Debug)]
pub enum CommandError {
    /// 未指定任何输出列（调用方违约，不会启动进程）
    #[error("at least one column must be specified for '{program} {action}'")]
    NoColumns {
        program: &'static str,
        action: &'static str,
    },

    /// 进程无法启动
    #[error("command failed {program} {args:?}, reason: {source}")]
    Spawn {
        program: String,
        args: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    /// 进程以非零状态退出
    #[error("command failed {program} {args:?}, reason: {}, stderr: {stderr:?}", exit_reason(.status))]
    Failed {
        program: String,
        args: Vec<String>,
        status: Option<i32>,
        stderr: String,
    },

    /// 目标数据集或存储池不存在
    #[error("{0}")]
    NotFound(String),

    /// 自由格式错误，供替代实现注入
    #[error("{0}")]
    Message(String),
}

fn exit_reason(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_columns_message() {
        let err = CommandError::NoColumns {
            program: "zfs",
            action: "list",
        };
        assert_eq!(
            err.to_string(),
            "at least one column must be specified for 'zfs list'"
        );
    }

    #[test]
    fn test_failed_message_quotes_stderr() {
        let err = CommandError::Failed {
            program: "zpool".to_string(),
            args: vec!["list".to_string(), "-H".to_string()],
            status: Some(1),
            stderr: "no pools available\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"command failed zpool ["list", "-H"], reason: exit status 1, stderr: "no pools available\n""#
        );
    }

    #[test]
    fn test_failed_message_without_status() {
        let err = CommandError::Failed {
            program: "zfs".to_string(),
            args: vec![],
            status: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
