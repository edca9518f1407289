//! 实时在线状态、消息中继与通话信令的核心领域模型
//!
//! 包含标识值对象、聊天消息、通知等实体，以及客户端与服务器之间的事件协议。

pub mod entities;
pub mod errors;
pub mod events;
pub mod value_objects;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use events::*;
pub use value_objects::*;
