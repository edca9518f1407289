//! 聊天消息实体定义
//!
//! 消息一经持久化即视为不可变；中继层只负责转发其填充后的形态。

use crate::errors::{DomainError, DomainResult};
use crate::entities::user::UserSummary;
use crate::value_objects::{MessageId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 消息类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// 文本消息
    #[default]
    Text,
    /// 文件消息
    File,
}

/// 待持久化的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub message_type: MessageType,
    pub file_url: Option<String>,
}

impl NewChatMessage {
    /// 创建待发送消息
    ///
    /// 文本消息必须带内容；文件消息必须带文件地址，内容可为空。
    pub fn new(
        sender_id: UserId,
        receiver_id: UserId,
        content: String,
        message_type: MessageType,
        file_url: Option<String>,
    ) -> DomainResult<Self> {
        let file_url = file_url.filter(|url| !url.trim().is_empty());
        match message_type {
            MessageType::Text if content.trim().is_empty() => {
                return Err(DomainError::invalid_argument("content", "cannot be empty"));
            }
            MessageType::File if file_url.is_none() => {
                return Err(DomainError::invalid_argument(
                    "fileUrl",
                    "required for file messages",
                ));
            }
            _ => {}
        }

        Ok(Self {
            sender_id,
            receiver_id,
            content,
            message_type,
            file_url,
        })
    }
}

/// 已持久化的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub message_type: MessageType,
    pub file_url: Option<String>,
    pub is_read: bool,
    pub created_at: Timestamp,
}

impl ChatMessage {
    pub fn create(message: NewChatMessage, created_at: Timestamp) -> Self {
        Self {
            id: MessageId::from(Uuid::new_v4()),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            message_type: message.message_type,
            file_url: message.file_url,
            is_read: false,
            created_at,
        }
    }
}

/// 填充了收发双方展示信息的消息，直接下发给客户端
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedMessage {
    pub id: MessageId,
    /// 发送者已不存在时为 null
    pub sender: Option<UserSummary>,
    pub receiver: Option<UserSummary>,
    pub content: String,
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_url: Option<String>,
    pub is_read: bool,
    pub created_at: Timestamp,
}

impl PopulatedMessage {
    pub fn populate(
        message: ChatMessage,
        sender: Option<UserSummary>,
        receiver: Option<UserSummary>,
    ) -> Self {
        Self {
            id: message.id,
            sender,
            receiver,
            content: message.content,
            message_type: message.message_type,
            file_url: message.file_url,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}
