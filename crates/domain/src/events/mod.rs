//! 实时事件协议
//!
//! 每个 WebSocket 文本帧都是 `{"event": "<名称>", "data": <载荷>}`。
//! 信令载荷（offer / answer / candidate）与通知内容原样透传，服务端不解析。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::entities::message::{MessageType, PopulatedMessage};
use crate::value_objects::{RoomId, UserId};

/// 客户端发往服务器的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// 声明当前连接所属的用户
    UserOnline(UserId),
    SendMessage {
        sender_id: UserId,
        receiver_id: UserId,
        #[serde(default)]
        content: String,
        #[serde(default, deserialize_with = "falsy_message_type")]
        message_type: Option<MessageType>,
        #[serde(default)]
        file_url: Option<String>,
    },
    Typing {
        sender_id: UserId,
        receiver_id: UserId,
    },
    StopTyping {
        sender_id: UserId,
        receiver_id: UserId,
    },
    /// `user_id` 为被叫方
    CallUser {
        user_id: UserId,
        offer: JsonValue,
        room_id: RoomId,
    },
    /// `user_id` 为主叫方
    AnswerCall {
        user_id: UserId,
        answer: JsonValue,
    },
    IceCandidate {
        user_id: UserId,
        candidate: JsonValue,
    },
    EndCall {
        user_id: UserId,
    },
    JoinRoom(RoomId),
    LeaveRoom(RoomId),
    SendNotification {
        user_id: UserId,
        notification: JsonValue,
    },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserOnline(_) => "user-online",
            Self::SendMessage { .. } => "send-message",
            Self::Typing { .. } => "typing",
            Self::StopTyping { .. } => "stop-typing",
            Self::CallUser { .. } => "call-user",
            Self::AnswerCall { .. } => "answer-call",
            Self::IceCandidate { .. } => "ice-candidate",
            Self::EndCall { .. } => "end-call",
            Self::JoinRoom(_) => "join-room",
            Self::LeaveRoom(_) => "leave-room",
            Self::SendNotification { .. } => "send-notification",
        }
    }
}

/// `""`、`null`、`false`、`0` 都视为未指定，按文本消息处理
fn falsy_message_type<'de, D>(deserializer: D) -> Result<Option<MessageType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    let unspecified = match &value {
        JsonValue::Null => true,
        JsonValue::Bool(flag) => !flag,
        JsonValue::String(text) => text.is_empty(),
        JsonValue::Number(number) => number.as_f64() == Some(0.0),
        _ => false,
    };
    if unspecified {
        return Ok(None);
    }
    MessageType::deserialize(value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

/// 服务器推送给客户端的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    UserStatusChanged {
        user_id: UserId,
        is_online: bool,
    },
    ReceiveMessage(PopulatedMessage),
    /// 发送者自己的投递确认
    MessageSent(PopulatedMessage),
    MessageError {
        error: String,
    },
    UserTyping {
        user_id: UserId,
        is_typing: bool,
    },
    IncomingCall {
        from: UserId,
        offer: JsonValue,
        room_id: RoomId,
    },
    CallAnswered {
        from: UserId,
        answer: JsonValue,
    },
    IceCandidate {
        from: UserId,
        candidate: JsonValue,
    },
    CallEnded {
        from: UserId,
    },
    UserJoined(UserId),
    UserLeft(UserId),
    NewNotification(JsonValue),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserStatusChanged { .. } => "user-status-changed",
            Self::ReceiveMessage(_) => "receive-message",
            Self::MessageSent(_) => "message-sent",
            Self::MessageError { .. } => "message-error",
            Self::UserTyping { .. } => "user-typing",
            Self::IncomingCall { .. } => "incoming-call",
            Self::CallAnswered { .. } => "call-answered",
            Self::IceCandidate { .. } => "ice-candidate",
            Self::CallEnded { .. } => "call-ended",
            Self::UserJoined(_) => "user-joined",
            Self::UserLeft(_) => "user-left",
            Self::NewNotification(_) => "new-notification",
        }
    }

    /// 序列化为 JSON 文本帧
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
