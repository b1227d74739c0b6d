//! Refiner Adapter - 译文润色客户端

mod echo_refiner;
mod gemini_client;

pub use echo_refiner::{EchoRefiner, DEV_MODE_BANNER};
pub use gemini_client::{GeminiRefiner, GeminiRefinerConfig, DEFAULT_SYSTEM_INSTRUCTION};
