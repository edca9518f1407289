use domain::{ServerEvent, UserId};

use crate::delivery::{Delivery, UserRouter};

/// 输入提示中继
///
/// 无状态透传，不持久化也不确认；超时清除由客户端自行处理。
pub struct TypingRelay {
    router: UserRouter,
}

impl TypingRelay {
    pub fn new(router: UserRouter) -> Self {
        Self { router }
    }

    pub async fn set_typing(&self, sender_id: UserId, receiver_id: &UserId, is_typing: bool) -> Delivery {
        self.router
            .route_to_user(
                receiver_id,
                ServerEvent::UserTyping {
                    user_id: sender_id,
                    is_typing,
                },
            )
            .await
    }
}
