//! CLI 命令处理模块

pub mod common; // 实体查找等公共函数
pub mod dataset;
pub mod group;
pub mod output;
pub mod pool;
