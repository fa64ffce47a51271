//! 中间件

pub mod context;

pub use context::request_context;
