//! 通知实体定义
//!
//! 通知由 REST 层创建并持久化，实时层只负责推送给在线用户。

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Message,
    SessionRequest,
    SessionAccepted,
    SessionRejected,
    SessionStarted,
    Achievement,
    Endorsement,
    Follow,
}

/// 通知实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// 通知ID
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// 接收者
    pub user: UserId,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_user: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_session: Option<String>,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: Timestamp,
}

impl Notification {
    /// 推送前的最低限度校验
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::invalid_argument("title", "cannot be empty"));
        }
        if self.message.trim().is_empty() {
            return Err(DomainError::invalid_argument("message", "cannot be empty"));
        }
        Ok(())
    }
}
