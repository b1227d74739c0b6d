//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod batch_handlers;
mod library_handlers;
mod translation_handlers;

pub use batch_handlers::*;
pub use library_handlers::*;
pub use translation_handlers::*;
