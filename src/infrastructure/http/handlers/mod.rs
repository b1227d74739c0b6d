//! HTTP Handlers

mod batch;
mod chapter;
mod library;
mod ping;
mod queue;
mod settings;
mod story;
mod websocket;

pub use batch::*;
pub use chapter::*;
pub use library::*;
pub use ping::*;
pub use queue::*;
pub use settings::*;
pub use story::*;
pub use websocket::*;
