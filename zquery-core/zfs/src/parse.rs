//! `zfs`/`zpool` 输出的文本解析工具
//!
//! 每个函数都接收 `description` 参数描述正在解析的列
//! （如 `"pool info guid"`、`"hold info creation"`），便于从错误定位到具体字段。

use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Weekday};
use thiserror::Error;

use crate::error::{Result, ZfsError};

/// 列值无法转换为目标类型
#[derive(Error, Debug)]
#[error("parsing {description:?}, unable to convert {text:?} to {target}: {cause}")]
pub struct ParseError {
    /// 列的语义名称
    pub description: String,
    /// 原始文本
    pub text: String,
    /// 目标类型名
    pub target: &'static str,
    /// 底层错误
    pub cause: ParseCause,
}

/// `ParseError` 的底层原因
#[derive(Error, Debug)]
pub enum ParseCause {
    #[error(transparent)]
    Integer(#[from] ParseIntError),

    #[error(transparent)]
    Timestamp(#[from] chrono::ParseError),

    #[error("seconds since epoch out of range")]
    OutOfRange,

    #[error("time does not exist in the local time zone")]
    NonexistentLocalTime,

    #[error("expected an abbreviated weekday name")]
    Weekday,
}

impl ParseError {
    fn new(description: &str, text: &str, target: &'static str, cause: impl Into<ParseCause>) -> Self {
        Self {
            description: description.to_string(),
            text: text.to_string(),
            target,
            cause: cause.into(),
        }
    }
}

/// 将工具输出拆分为行
///
/// 去除首尾空白并将 `\r\n` 视为 `\n`。空白输出返回空列表，末尾不会有空行。
pub fn split_lines(input: &str) -> Vec<String> {
    let normalized = input.trim().replace("\r\n", "\n");
    if normalized.is_empty() {
        return Vec::new();
    }

    normalized.split('\n').map(str::to_string).collect()
}

/// 将一行按制表符拆分为恰好 `expected` 列
///
/// # 参数
/// * `line` - 工具输出的一行
/// * `expected` - 要求的列数
/// * `entity` - 该行描述的实体，如 `"pool info"`
pub fn split_columns<'a>(line: &'a str, expected: usize, entity: &'static str) -> Result<Vec<&'a str>> {
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() != expected {
        return Err(ZfsError::ColumnCount {
            entity,
            expected,
            found: cols.len(),
            line: line.to_string(),
        });
    }

    Ok(cols)
}

fn parse_unsigned<T>(text: &str, description: &str, target: &'static str) -> std::result::Result<T, ParseError>
where
    T: FromStr<Err = ParseIntError>,
{
    text.parse::<T>()
        .map_err(|e| ParseError::new(description, text, target, e))
}

/// 解析十进制 `u64`
pub fn parse_u64(text: &str, description: &str) -> std::result::Result<u64, ParseError> {
    parse_unsigned(text, description, "uint64")
}

/// 解析十进制 `u8`
pub fn parse_u8(text: &str, description: &str) -> std::result::Result<u8, ParseError> {
    parse_unsigned(text, description, "uint8")
}

/// 解析 Unix 纪元秒数（`zfs list -p` 的 creation 列）
pub fn parse_epoch_seconds(text: &str, description: &str) -> std::result::Result<DateTime<Local>, ParseError> {
    let secs = parse_u64(text, description)?;

    i64::try_from(secs)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .ok_or_else(|| ParseError::new(description, text, "timestamp", ParseCause::OutOfRange))
}

/// 按本地时区解析可读时间
///
/// # 参数
/// * `text` - 原始文本
/// * `format` - `chrono` 格式串，如 `HOLD_TIMESTAMP_FORMAT`
/// * `description` - 列的语义名称
///
/// 夏令时切换导致重复的本地时间取较早的时刻。
/// 格式以 `%a` 开头时只校验星期缩写的拼写，不要求与日期一致。
pub fn parse_local_timestamp(
    text: &str,
    format: &str,
    description: &str,
) -> std::result::Result<DateTime<Local>, ParseError> {
    let (text_without_weekday, format) = match format.strip_prefix("%a ") {
        Some(rest_format) => (strip_weekday(text, description)?, rest_format),
        None => (text, format),
    };

    let naive = NaiveDateTime::parse_from_str(text_without_weekday, format)
        .map_err(|e| ParseError::new(description, text, "timestamp", e))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ParseError::new(description, text, "timestamp", ParseCause::NonexistentLocalTime))
}

/// 去掉开头的星期缩写，返回其后的文本
fn strip_weekday<'a>(text: &'a str, description: &str) -> std::result::Result<&'a str, ParseError> {
    text.trim_start()
        .split_once(char::is_whitespace)
        .filter(|(weekday, _)| weekday.len() == 3 && weekday.parse::<Weekday>().is_ok())
        .map(|(_, rest)| rest.trim_start())
        .ok_or_else(|| ParseError::new(description, text, "timestamp", ParseCause::Weekday))
}

/// 拒绝空的必填列
pub fn require_non_empty<'a>(
    value: &'a str,
    description: &'static str,
    field: &'static str,
) -> Result<&'a str> {
    if value.is_empty() {
        return Err(ZfsError::EmptyField {
            description,
            field,
            value: value.to_string(),
        });
    }

    Ok(value)
}

/// 单属性查询输出的唯一一行
pub fn str_from_only_line(output: &str) -> Result<String> {
    let mut lines = split_lines(output);
    if lines.len() != 1 {
        return Err(ZfsError::PropertyValue {
            output: output.to_string(),
            found: lines.len(),
        });
    }

    Ok(lines.remove(0))
}
