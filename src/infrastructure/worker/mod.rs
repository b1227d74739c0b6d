//! Worker Layer - Background Task Processing
//!
//! 实现 TranslationWorker，处理排队的润色任务

mod translation_worker;

pub use translation_worker::{TranslationWorker, TranslationWorkerConfig};
