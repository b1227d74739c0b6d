//! 同步层
//!
//! - gateway: 书库单元 + 远端订阅 + 乐观写入
//! - debounce: 滚动位置保存的防抖

mod debounce;
mod gateway;

pub use debounce::Debouncer;
pub use gateway::{GatewayConfig, SubscriptionHandle, SyncGateway, SyncStatus, WriteState};
