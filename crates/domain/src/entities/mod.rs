//! 领域实体定义
//!
//! 包含聊天消息、用户概要与通知等实体。

pub mod message;
pub mod notification;
pub mod user;

// 重新导出核心实体
pub use message::{ChatMessage, MessageType, NewChatMessage, PopulatedMessage};
pub use notification::{Notification, NotificationType};
pub use user::{UserProfile, UserSummary, DEFAULT_PROFILE_IMAGE};
