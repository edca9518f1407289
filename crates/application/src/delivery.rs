//! 按用户投递
//!
//! 所有中继的目标查找都经过这里：注册表命中则入队，未命中即静默丢弃。

use std::sync::Arc;

use domain::{ServerEvent, UserId};

use crate::{hub::ConnectionHub, registry::ConnectionRegistry};

/// 一次投递的结果，仅用于日志与测试，不会回报给发送方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// 目标离线或连接正在关闭
    Dropped,
}

impl Delivery {
    pub fn is_delivered(self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

#[derive(Debug, Clone)]
pub struct UserRouter {
    registry: Arc<ConnectionRegistry>,
    hub: Arc<ConnectionHub>,
}

impl UserRouter {
    pub fn new(registry: Arc<ConnectionRegistry>, hub: Arc<ConnectionHub>) -> Self {
        Self { registry, hub }
    }

    pub fn hub(&self) -> &ConnectionHub {
        &self.hub
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub async fn route_to_user(&self, user_id: &UserId, event: ServerEvent) -> Delivery {
        let Some(connection_id) = self.registry.lookup(user_id).await else {
            tracing::debug!(user_id = %user_id, event = event.name(), "target offline, dropped");
            return Delivery::Dropped;
        };

        let name = event.name();
        let delivery = self.hub.send(connection_id, event).await;
        if !delivery.is_delivered() {
            tracing::debug!(
                user_id = %user_id,
                connection_id = %connection_id,
                event = name,
                "target connection closing, dropped"
            );
        }
        delivery
    }
}
