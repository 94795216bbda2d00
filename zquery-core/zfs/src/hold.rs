//! 保留实体及加载

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info};
use zquery_command::HOLD_TIMESTAMP_FORMAT;

use crate::error::{Result, ZfsError};
use crate::parse::{parse_local_timestamp, split_columns, split_lines};
use crate::snapshot::Snapshot;

/// `zfs holds -H` 输出快照、标签、创建时间三列
const HOLD_COLUMN_COUNT: usize = 3;

const HOLD_INFO: &str = "hold info";

/// 快照上的用户保留
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hold {
    pub tag: String,
    /// 精确到分钟，本地时区
    pub creation: DateTime<Local>,
    pub snapshot: Arc<Snapshot>,
}

pub type HoldList = Vec<Arc<Hold>>;

impl Hold {
    pub fn verbose_string(&self) -> String {
        format!(
            "{{Hold Tag: {:?}, Creation: {}, Snapshot: {}}}",
            self.tag, self.creation, self.snapshot
        )
    }
}

impl fmt::Display for Hold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Hold Tag: {:?}, Snapshot: {}}}", self.tag, self.snapshot)
    }
}

fn parse_hold_info(line: &str, snapshot: &Arc<Snapshot>) -> Result<Hold> {
    let cols = split_columns(line, HOLD_COLUMN_COUNT, HOLD_INFO)?;

    Ok(Hold {
        tag: cols[1].to_string(),
        creation: parse_local_timestamp(cols[2], HOLD_TIMESTAMP_FORMAT, "hold info creation")?,
        snapshot: Arc::clone(snapshot),
    })
}

pub(crate) fn list_holds(snapshot: &Arc<Snapshot>) -> Result<HoldList> {
    let full_name = snapshot.full_name();
    info!("正在列出快照 {} 的保留", full_name);

    let out = snapshot
        .file_system
        .cmd()
        .zfs()
        .holds(&full_name)
        .map_err(|e| ZfsError::command(format!("failed to list holds of snapshot {}", snapshot), e))?;

    let holds = split_lines(&out)
        .iter()
        .map(|line| parse_hold_info(line, snapshot).map(Arc::new))
        .collect::<Result<HoldList>>()?;

    debug!("快照 {} 共 {} 个保留", full_name, holds.len());
    Ok(holds)
}
