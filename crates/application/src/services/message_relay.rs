//! 消息中继
//!
//! 先持久化再投递：持久化失败只通知发送者；成功后投递给在线的接收者，
//! 并无条件回显给发起连接作为发送确认。

use std::sync::Arc;

use domain::{ConnectionId, MessageType, NewChatMessage, PopulatedMessage, ServerEvent, UserId};

use crate::{
    delivery::{Delivery, UserRouter},
    error::ApplicationError,
    repository::MessageStore,
};

#[derive(Debug, Clone)]
pub struct RelayMessageRequest {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub message_type: MessageType,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    /// 已持久化；`receiver` 为接收者一侧的投递结果
    Persisted {
        message: PopulatedMessage,
        receiver: Delivery,
    },
    /// 未持久化，已向发送者发出 message-error
    Rejected { reason: String },
}

pub struct MessageRelay {
    store: Arc<dyn MessageStore>,
    router: UserRouter,
}

impl MessageRelay {
    pub fn new(store: Arc<dyn MessageStore>, router: UserRouter) -> Self {
        Self { store, router }
    }

    pub async fn relay(&self, origin: ConnectionId, request: RelayMessageRequest) -> MessageOutcome {
        let sender_id = request.sender_id.clone();
        let receiver_id = request.receiver_id.clone();

        let message = match self.persist(request).await {
            Ok(message) => message,
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(
                    error = %reason,
                    sender_id = %sender_id,
                    receiver_id = %receiver_id,
                    "Failed to persist message"
                );
                self.router
                    .hub()
                    .send(origin, ServerEvent::MessageError { error: reason.clone() })
                    .await;
                return MessageOutcome::Rejected { reason };
            }
        };

        // 持久化期间接收者可能已断开，查找落空即静默丢弃
        let receiver = self
            .router
            .route_to_user(&receiver_id, ServerEvent::ReceiveMessage(message.clone()))
            .await;

        self.router
            .hub()
            .send(origin, ServerEvent::MessageSent(message.clone()))
            .await;

        tracing::info!(
            message_id = %message.id,
            sender_id = %sender_id,
            receiver_id = %receiver_id,
            delivered = receiver.is_delivered(),
            "Message relayed"
        );

        MessageOutcome::Persisted { message, receiver }
    }

    async fn persist(&self, request: RelayMessageRequest) -> Result<PopulatedMessage, ApplicationError> {
        let message = NewChatMessage::new(
            request.sender_id,
            request.receiver_id,
            request.content,
            request.message_type,
            request.file_url,
        )?;
        Ok(self.store.create(message).await?)
    }
}
