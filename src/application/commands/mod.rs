//! 应用层 - 命令
//!
//! 故事生成与朗读两个用例

mod story_commands;

pub mod handlers;

pub use story_commands::*;
