//! 连接注册表
//!
//! 进程内 `UserId -> ConnectionId` 映射。同一用户最多一条记录，后注册者覆盖前者；
//! 注销采用比较后删除，迟到的旧连接断开不会清掉新连接的注册。

use std::collections::HashMap;

use domain::{ConnectionId, UserId};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: RwLock<HashMap<UserId, ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 无条件覆盖该用户已有的映射
    pub async fn register(&self, user_id: UserId, connection_id: ConnectionId) {
        let previous = self
            .entries
            .write()
            .await
            .insert(user_id.clone(), connection_id);

        match previous {
            Some(old) if old != connection_id => {
                tracing::debug!(
                    user_id = %user_id,
                    connection_id = %connection_id,
                    replaced = %old,
                    "registry entry replaced by newer connection"
                );
            }
            _ => {
                tracing::debug!(user_id = %user_id, connection_id = %connection_id, "registry entry added");
            }
        }
    }

    pub async fn lookup(&self, user_id: &UserId) -> Option<ConnectionId> {
        self.entries.read().await.get(user_id).copied()
    }

    /// 仅当当前映射仍指向该连接时才删除，返回是否删除
    pub async fn unregister(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(user_id) {
            Some(current) if *current == connection_id => {
                entries.remove(user_id);
                tracing::debug!(user_id = %user_id, connection_id = %connection_id, "registry entry removed");
                true
            }
            Some(current) => {
                tracing::debug!(
                    user_id = %user_id,
                    connection_id = %connection_id,
                    current = %current,
                    "stale disconnect ignored"
                );
                false
            }
            None => false,
        }
    }

    /// 当前在线的用户，按标识排序
    pub async fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.entries.read().await.keys().cloned().collect();
        users.sort();
        users
    }
}
