//! 基础设施层实现。
//!
//! 提供用户存储与消息存储的进程内适配器，实现应用层定义的存储接口。

pub mod builder;
pub mod repository;

pub use builder::{Infrastructure, InfrastructureConfig, InfrastructureError, SeedProfile};
pub use repository::{InMemoryMessageStore, InMemoryUserStore};
