//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod library_commands;
mod refine_commands;

pub mod handlers;

pub use library_commands::*;
pub use refine_commands::*;
