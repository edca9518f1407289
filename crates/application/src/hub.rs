//! 连接中枢
//!
//! 传输层一侧的状态：每条存活连接的发送通道，以及房间成员关系。
//! 与注册表不同，这里按连接而非按用户索引，未声明身份的连接同样能收到广播。

use std::collections::{HashMap, HashSet};

use domain::{ConnectionId, RoomId, ServerEvent};
use tokio::sync::{mpsc, RwLock};

use crate::delivery::Delivery;

/// 单条连接的出站事件通道
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

#[derive(Debug, Default)]
pub struct ConnectionHub {
    /// 连接发送器映射
    senders: RwLock<HashMap<ConnectionId, EventSender>>,
    /// 房间到连接的映射
    rooms: RwLock<HashMap<RoomId, HashSet<ConnectionId>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn attach(&self, connection_id: ConnectionId, sender: EventSender) {
        self.senders.write().await.insert(connection_id, sender);
        tracing::debug!(connection_id = %connection_id, "connection attached");
    }

    /// 移除连接的发送器并退出其所在的全部房间，返回退出的房间
    pub async fn detach(&self, connection_id: ConnectionId) -> Vec<RoomId> {
        self.senders.write().await.remove(&connection_id);

        let mut left = Vec::new();
        let mut rooms = self.rooms.write().await;
        rooms.retain(|room_id, members| {
            if members.remove(&connection_id) {
                left.push(room_id.clone());
            }
            !members.is_empty()
        });

        tracing::debug!(connection_id = %connection_id, rooms = left.len(), "connection detached");
        left
    }

    pub async fn send(&self, connection_id: ConnectionId, event: ServerEvent) -> Delivery {
        let senders = self.senders.read().await;
        let Some(sender) = senders.get(&connection_id) else {
            return Delivery::Dropped;
        };

        // 接收端已关闭说明连接正在断开，按离线处理
        match sender.send(event) {
            Ok(()) => Delivery::Delivered,
            Err(_) => Delivery::Dropped,
        }
    }

    pub async fn send_many(&self, connection_ids: &[ConnectionId], event: ServerEvent) -> usize {
        let senders = self.senders.read().await;
        connection_ids
            .iter()
            .filter_map(|id| senders.get(id))
            .filter(|sender| sender.send(event.clone()).is_ok())
            .count()
    }

    /// 发给所有存活连接，返回成功入队的数量
    pub async fn broadcast(&self, event: ServerEvent) -> usize {
        let senders = self.senders.read().await;
        senders
            .values()
            .filter(|sender| sender.send(event.clone()).is_ok())
            .count()
    }

    /// 加入房间，返回房间内其他连接
    pub async fn join_room(&self, room_id: RoomId, connection_id: ConnectionId) -> Vec<ConnectionId> {
        let mut rooms = self.rooms.write().await;
        let members = rooms.entry(room_id).or_default();
        members.insert(connection_id);
        members
            .iter()
            .copied()
            .filter(|id| *id != connection_id)
            .collect()
    }

    /// 离开房间，返回剩余连接；不在房间内时返回 `None`
    pub async fn leave_room(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
    ) -> Option<Vec<ConnectionId>> {
        let mut rooms = self.rooms.write().await;
        let members = rooms.get_mut(room_id)?;
        if !members.remove(&connection_id) {
            return None;
        }

        let remaining: Vec<ConnectionId> = members.iter().copied().collect();
        if remaining.is_empty() {
            rooms.remove(room_id);
        }
        Some(remaining)
    }

    #[cfg(test)]
    pub async fn room_members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub async fn connection_count(&self) -> usize {
        self.senders.read().await.len()
    }
}
