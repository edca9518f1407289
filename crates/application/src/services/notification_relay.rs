use domain::{Notification, ServerEvent, UserId};
use serde_json::Value as JsonValue;

use crate::{
    delivery::{Delivery, UserRouter},
    error::ApplicationError,
};

/// 通知推送
///
/// REST 层已完成持久化，这里只是给在线用户的低延迟推送，离线即丢弃。
#[derive(Clone)]
pub struct NotificationRelay {
    router: UserRouter,
}

impl NotificationRelay {
    pub fn new(router: UserRouter) -> Self {
        Self { router }
    }

    pub async fn push(&self, user_id: &UserId, notification: JsonValue) -> Delivery {
        let delivery = self
            .router
            .route_to_user(user_id, ServerEvent::NewNotification(notification))
            .await;
        tracing::debug!(user_id = %user_id, delivered = delivery.is_delivered(), "notification pushed");
        delivery
    }

    /// 推送一条已创建的通知记录，载荷为其 JSON 形态
    pub async fn push_notification(&self, notification: &Notification) -> Result<Delivery, ApplicationError> {
        notification.validate()?;
        let payload = serde_json::to_value(notification)?;
        Ok(self.push(&notification.user, payload).await)
    }
}
