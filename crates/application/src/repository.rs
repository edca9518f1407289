//! 外部协作方接口
//!
//! 实时层只依赖这两个窄接口，具体存储由上层装配。

use async_trait::async_trait;
use domain::{NewChatMessage, PopulatedMessage, RepositoryError, Timestamp, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// 持久化消息，返回填充了收发双方展示信息的形态
    async fn create(&self, message: NewChatMessage) -> Result<PopulatedMessage, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 更新在线标记与最后活跃时间
    async fn update_presence(
        &self,
        user_id: UserId,
        is_online: bool,
        at: Timestamp,
    ) -> Result<(), RepositoryError>;
}
