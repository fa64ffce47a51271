//! Handlers 模块

pub mod health;
pub mod metrics;
pub mod notifications;

pub use health::*;
pub use metrics::*;
pub use notifications::*;
