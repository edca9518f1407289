use std::sync::Arc;

use domain::{ServerEvent, UserId};

use crate::{clock::Clock, hub::ConnectionHub, repository::UserStore};

/// 在线状态广播器
///
/// 先把在线标记与最后活跃时间写入用户存储，再向所有存活连接（不限联系人）广播。
pub struct PresenceBroadcaster {
    user_store: Arc<dyn UserStore>,
    hub: Arc<ConnectionHub>,
    clock: Arc<dyn Clock>,
}

impl PresenceBroadcaster {
    pub fn new(user_store: Arc<dyn UserStore>, hub: Arc<ConnectionHub>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_store,
            hub,
            clock,
        }
    }

    /// 返回收到广播的连接数
    pub async fn announce(&self, user_id: &UserId, is_online: bool) -> usize {
        let now = self.clock.now();
        // 持久化失败不影响实时视图
        if let Err(err) = self
            .user_store
            .update_presence(user_id.clone(), is_online, now)
            .await
        {
            tracing::warn!(error = %err, user_id = %user_id, is_online, "Failed to persist presence");
        }

        let receivers = self
            .hub
            .broadcast(ServerEvent::UserStatusChanged {
                user_id: user_id.clone(),
                is_online,
            })
            .await;

        tracing::info!(user_id = %user_id, is_online, receivers, "用户在线状态已广播");
        receivers
    }
}
