//! 通话信令代理
//!
//! 在两个对端之间按用户标识转发 offer / answer / ICE candidate / 挂断信号，
//! 载荷原样透传。代理不跟踪通话状态，目标离线时静默丢弃，由主叫方界面自行超时。
//! 房间成员关系与定向信令相互独立，只用于会话范围内的广播。

use domain::{ConnectionId, RoomId, ServerEvent, UserId};
use serde_json::Value as JsonValue;

use crate::delivery::{Delivery, UserRouter};

pub struct SignalingBroker {
    router: UserRouter,
}

impl SignalingBroker {
    pub fn new(router: UserRouter) -> Self {
        Self { router }
    }

    pub async fn offer(
        &self,
        caller_id: UserId,
        callee_id: &UserId,
        offer: JsonValue,
        room_id: RoomId,
    ) -> Delivery {
        tracing::info!(from = %caller_id, to = %callee_id, room_id = %room_id, "relaying call offer");
        self.router
            .route_to_user(
                callee_id,
                ServerEvent::IncomingCall {
                    from: caller_id,
                    offer,
                    room_id,
                },
            )
            .await
    }

    pub async fn answer(&self, callee_id: UserId, caller_id: &UserId, answer: JsonValue) -> Delivery {
        tracing::info!(from = %callee_id, to = %caller_id, "relaying call answer");
        self.router
            .route_to_user(
                caller_id,
                ServerEvent::CallAnswered {
                    from: callee_id,
                    answer,
                },
            )
            .await
    }

    pub async fn ice_candidate(&self, from: UserId, target: &UserId, candidate: JsonValue) -> Delivery {
        self.router
            .route_to_user(target, ServerEvent::IceCandidate { from, candidate })
            .await
    }

    pub async fn end_call(&self, from: UserId, target: &UserId) -> Delivery {
        tracing::info!(from = %from, to = %target, "relaying call end");
        self.router
            .route_to_user(target, ServerEvent::CallEnded { from })
            .await
    }

    /// 加入房间并通知房间内其他成员，返回被通知的连接数
    ///
    /// 尚未声明身份的连接同样加入房间，但没有可通知的用户标识。
    pub async fn join_room(
        &self,
        connection_id: ConnectionId,
        user_id: Option<&UserId>,
        room_id: RoomId,
    ) -> usize {
        let others = self.router.hub().join_room(room_id.clone(), connection_id).await;
        tracing::info!(connection_id = %connection_id, room_id = %room_id, members = others.len() + 1, "joined room");

        match user_id {
            Some(user_id) if !others.is_empty() => {
                self.router
                    .hub()
                    .send_many(&others, ServerEvent::UserJoined(user_id.clone()))
                    .await
            }
            _ => 0,
        }
    }

    /// 离开房间并通知剩余成员；本就不在房间内时什么都不做
    pub async fn leave_room(
        &self,
        connection_id: ConnectionId,
        user_id: Option<&UserId>,
        room_id: &RoomId,
    ) -> usize {
        let Some(remaining) = self.router.hub().leave_room(room_id, connection_id).await else {
            tracing::debug!(connection_id = %connection_id, room_id = %room_id, "leave ignored, not a member");
            return 0;
        };
        tracing::info!(connection_id = %connection_id, room_id = %room_id, "left room");

        match user_id {
            Some(user_id) if !remaining.is_empty() => {
                self.router
                    .hub()
                    .send_many(&remaining, ServerEvent::UserLeft(user_id.clone()))
                    .await
            }
            _ => 0,
        }
    }
}
