//! 会话入口
//!
//! 每条连接在接入时创建一个 `SessionContext`，在连接生命周期内传入每个处理函数，
//! 断开时消费掉。`RealtimeService` 持有进程内唯一的注册表与连接中枢，
//! 并把客户端事件按种类分派到对应的中继。

use std::sync::Arc;

use domain::{ClientEvent, ConnectionId, UserId};

use crate::{
    clock::Clock,
    delivery::UserRouter,
    hub::{ConnectionHub, EventSender},
    presence::PresenceBroadcaster,
    registry::ConnectionRegistry,
    repository::{MessageStore, UserStore},
    services::{
        MessageRelay, NotificationRelay, RelayMessageRequest, SignalingBroker, TypingRelay,
    },
};

/// 单条连接的会话状态
#[derive(Debug)]
pub struct SessionContext {
    connection_id: ConnectionId,
    /// 客户端声明上线前为空
    user_id: Option<UserId>,
}

impl SessionContext {
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}

pub struct RealtimeServiceDependencies {
    pub message_store: Arc<dyn MessageStore>,
    pub user_store: Arc<dyn UserStore>,
    pub clock: Arc<dyn Clock>,
}

pub struct RealtimeService {
    router: UserRouter,
    presence: PresenceBroadcaster,
    messages: MessageRelay,
    typing: TypingRelay,
    signaling: SignalingBroker,
    notifications: NotificationRelay,
}

impl RealtimeService {
    pub fn new(deps: RealtimeServiceDependencies) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let hub = Arc::new(ConnectionHub::new());
        let router = UserRouter::new(registry, hub.clone());

        Self {
            presence: PresenceBroadcaster::new(deps.user_store, hub, deps.clock),
            messages: MessageRelay::new(deps.message_store, router.clone()),
            typing: TypingRelay::new(router.clone()),
            signaling: SignalingBroker::new(router.clone()),
            notifications: NotificationRelay::new(router.clone()),
            router,
        }
    }

    /// 供 REST 层在持久化通知后推送
    pub fn notifications(&self) -> &NotificationRelay {
        &self.notifications
    }

    pub async fn online_users(&self) -> Vec<UserId> {
        self.router.registry().online_users().await
    }

    pub async fn connection_count(&self) -> usize {
        self.router.hub().connection_count().await
    }

    /// 接入新连接；此时尚未绑定用户
    pub async fn connect(&self, sender: EventSender) -> SessionContext {
        let connection_id = ConnectionId::new();
        self.router.hub().attach(connection_id, sender).await;
        tracing::info!(connection_id = %connection_id, "connection opened");

        SessionContext {
            connection_id,
            user_id: None,
        }
    }

    pub async fn dispatch(&self, session: &mut SessionContext, event: ClientEvent) {
        tracing::debug!(connection_id = %session.connection_id, event = event.name(), "dispatching client event");

        match event {
            ClientEvent::UserOnline(user_id) => self.bind_user(session, user_id).await,
            ClientEvent::SendMessage {
                sender_id,
                receiver_id,
                content,
                message_type,
                file_url,
            } => {
                let request = RelayMessageRequest {
                    sender_id,
                    receiver_id,
                    content,
                    message_type: message_type.unwrap_or_default(),
                    file_url,
                };
                self.messages.relay(session.connection_id, request).await;
            }
            ClientEvent::Typing {
                sender_id,
                receiver_id,
            } => {
                self.typing.set_typing(sender_id, &receiver_id, true).await;
            }
            ClientEvent::StopTyping {
                sender_id,
                receiver_id,
            } => {
                self.typing.set_typing(sender_id, &receiver_id, false).await;
            }
            ClientEvent::CallUser {
                user_id,
                offer,
                room_id,
            } => {
                if let Some(caller) = Self::identity(session, "call-user") {
                    self.signaling.offer(caller, &user_id, offer, room_id).await;
                }
            }
            ClientEvent::AnswerCall { user_id, answer } => {
                if let Some(callee) = Self::identity(session, "answer-call") {
                    self.signaling.answer(callee, &user_id, answer).await;
                }
            }
            ClientEvent::IceCandidate { user_id, candidate } => {
                if let Some(from) = Self::identity(session, "ice-candidate") {
                    self.signaling.ice_candidate(from, &user_id, candidate).await;
                }
            }
            ClientEvent::EndCall { user_id } => {
                if let Some(from) = Self::identity(session, "end-call") {
                    self.signaling.end_call(from, &user_id).await;
                }
            }
            ClientEvent::JoinRoom(room_id) => {
                self.signaling
                    .join_room(session.connection_id, session.user_id.as_ref(), room_id)
                    .await;
            }
            ClientEvent::LeaveRoom(room_id) => {
                self.signaling
                    .leave_room(session.connection_id, session.user_id.as_ref(), &room_id)
                    .await;
            }
            ClientEvent::SendNotification {
                user_id,
                notification,
            } => {
                self.notifications.push(&user_id, notification).await;
            }
        }
    }

    /// 断开清理：退出中枢与房间，若已绑定用户则比较后注销并广播离线
    pub async fn disconnect(&self, session: SessionContext) {
        self.router.hub().detach(session.connection_id).await;

        match session.user_id {
            Some(user_id) => {
                self.release_user(session.connection_id, &user_id).await;
                tracing::info!(connection_id = %session.connection_id, user_id = %user_id, "connection closed");
            }
            None => {
                tracing::info!(connection_id = %session.connection_id, "anonymous connection closed");
            }
        }
    }

    async fn bind_user(&self, session: &mut SessionContext, user_id: UserId) {
        if let Some(previous) = session.user_id.take() {
            if previous != user_id {
                tracing::info!(
                    connection_id = %session.connection_id,
                    previous = %previous,
                    user_id = %user_id,
                    "connection rebound to another user"
                );
                self.release_user(session.connection_id, &previous).await;
            }
        }

        session.user_id = Some(user_id.clone());
        self.router
            .registry()
            .register(user_id.clone(), session.connection_id)
            .await;
        self.presence.announce(&user_id, true).await;
    }

    async fn release_user(&self, connection_id: ConnectionId, user_id: &UserId) {
        self.router.registry().unregister(user_id, connection_id).await;
        self.presence.announce(user_id, false).await;
    }

    fn identity(session: &SessionContext, event: &'static str) -> Option<UserId> {
        if session.user_id.is_none() {
            tracing::warn!(connection_id = %session.connection_id, event, "signaling before user-online, dropped");
        }
        session.user_id.clone()
    }
}
