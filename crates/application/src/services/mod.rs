mod message_relay;
mod notification_relay;
mod signaling;
mod typing_relay;

pub use message_relay::{MessageOutcome, MessageRelay, RelayMessageRequest};
pub use notification_relay::NotificationRelay;
pub use signaling::SignalingBroker;
pub use typing_relay::TypingRelay;
