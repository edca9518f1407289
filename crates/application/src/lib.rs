//! 应用层实现。
//!
//! 进程内的连接注册表与事件中继：在线状态广播、点对点消息、输入提示、
//! 通话信令与通知推送，以及每条连接的会话入口。持久化通过
//! `MessageStore` / `UserStore` 两个外部协作方完成。

pub mod clock;
pub mod delivery;
pub mod error;
pub mod hub;
pub mod presence;
pub mod registry;
pub mod repository;
pub mod services;
pub mod session;

pub use clock::{Clock, SystemClock};
pub use delivery::{Delivery, UserRouter};
pub use error::ApplicationError;
pub use hub::{ConnectionHub, EventSender};
pub use presence::PresenceBroadcaster;
pub use registry::ConnectionRegistry;
pub use repository::{MessageStore, UserStore};
pub use services::{
    MessageOutcome, MessageRelay, NotificationRelay, RelayMessageRequest, SignalingBroker,
    TypingRelay,
};
pub use session::{RealtimeService, RealtimeServiceDependencies, SessionContext};
