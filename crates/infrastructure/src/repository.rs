use std::{collections::HashMap, sync::Arc};

use application::{Clock, MessageStore, UserStore};
use async_trait::async_trait;
use domain::{
    ChatMessage, NewChatMessage, PopulatedMessage, RepositoryError, Timestamp, UserId,
    UserProfile, UserSummary,
};
use tokio::sync::RwLock;

/// 进程内用户存储
///
/// 在线状态更新对未知用户执行插入，名称取用户标识、头像取默认值。
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, profiles: impl IntoIterator<Item = UserProfile>) -> usize {
        let mut users = self.users.write().await;
        let mut count = 0;
        for profile in profiles {
            users.insert(profile.id.clone(), profile);
            count += 1;
        }
        count
    }

    pub async fn find(&self, user_id: &UserId) -> Option<UserProfile> {
        self.users.read().await.get(user_id).cloned()
    }

    pub async fn summary(&self, user_id: &UserId) -> Option<UserSummary> {
        self.users.read().await.get(user_id).map(UserProfile::summary)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn update_presence(
        &self,
        user_id: UserId,
        is_online: bool,
        at: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        users
            .entry(user_id.clone())
            .or_insert_with(|| UserProfile::new(user_id.clone(), user_id.as_str(), None))
            .mark_presence(is_online, at);
        Ok(())
    }
}

/// 进程内消息存储
///
/// 写入后按用户存储中的档案填充收发双方，找不到的一方为空。
pub struct InMemoryMessageStore {
    users: Arc<InMemoryUserStore>,
    clock: Arc<dyn Clock>,
    messages: RwLock<Vec<ChatMessage>>,
}

impl InMemoryMessageStore {
    pub fn new(users: Arc<InMemoryUserStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            clock,
            messages: RwLock::new(Vec::new()),
        }
    }

    /// 两个用户之间的消息，按写入顺序
    pub async fn conversation(&self, a: &UserId, b: &UserId) -> Vec<ChatMessage> {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| {
                (&m.sender_id == a && &m.receiver_id == b)
                    || (&m.sender_id == b && &m.receiver_id == a)
            })
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(&self, message: NewChatMessage) -> Result<PopulatedMessage, RepositoryError> {
        let message = ChatMessage::create(message, self.clock.now());
        self.messages.write().await.push(message.clone());

        let sender = self.users.summary(&message.sender_id).await;
        let receiver = self.users.summary(&message.receiver_id).await;
        tracing::debug!(message_id = %message.id, "message stored");

        Ok(PopulatedMessage::populate(message, sender, receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use application::SystemClock;
    use chrono::Utc;
    use domain::{MessageType, DEFAULT_PROFILE_IMAGE};

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    fn text(from: &str, to: &str, content: &str) -> NewChatMessage {
        NewChatMessage::new(user(from), user(to), content.into(), MessageType::Text, None).unwrap()
    }

    #[tokio::test]
    async fn presence_update_marks_existing_profile() {
        let store = InMemoryUserStore::new();
        store
            .seed([UserProfile::new(user("alice"), "Alice", Some("https://img.example.com/a.png".into()))])
            .await;

        let at = Utc::now();
        store.update_presence(user("alice"), true, at).await.unwrap();

        let profile = store.find(&user("alice")).await.unwrap();
        assert!(profile.is_online);
        assert_eq!(profile.last_seen, Some(at));
        assert_eq!(profile.name, "Alice");
    }

    #[tokio::test]
    async fn presence_update_inserts_unknown_user() {
        let store = InMemoryUserStore::new();
        store.update_presence(user("ghost"), false, Utc::now()).await.unwrap();

        let profile = store.find(&user("ghost")).await.unwrap();
        assert!(!profile.is_online);
        assert_eq!(profile.name, "ghost");
        assert_eq!(profile.profile_image, DEFAULT_PROFILE_IMAGE);
    }

    #[tokio::test]
    async fn created_message_is_populated_from_profiles() {
        let users = Arc::new(InMemoryUserStore::new());
        users
            .seed([
                UserProfile::new(user("alice"), "Alice", None),
                UserProfile::new(user("bob"), "Bob", Some("https://img.example.com/b.png".into())),
            ])
            .await;
        let store = InMemoryMessageStore::new(users, Arc::new(SystemClock));

        let message = store.create(text("alice", "bob", "hi")).await.unwrap();

        assert_eq!(message.sender.unwrap().name, "Alice");
        assert_eq!(message.receiver.unwrap().profile_image, "https://img.example.com/b.png");
        assert!(!message.is_read);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_participant_populates_as_none() {
        let users = Arc::new(InMemoryUserStore::new());
        users.seed([UserProfile::new(user("alice"), "Alice", None)]).await;
        let store = InMemoryMessageStore::new(users, Arc::new(SystemClock));

        let message = store.create(text("alice", "nobody", "hello?")).await.unwrap();

        assert!(message.sender.is_some());
        assert!(message.receiver.is_none());
    }

    #[tokio::test]
    async fn conversation_includes_both_directions_in_order() {
        let users = Arc::new(InMemoryUserStore::new());
        let store = InMemoryMessageStore::new(users, Arc::new(SystemClock));

        store.create(text("alice", "bob", "one")).await.unwrap();
        store.create(text("carol", "bob", "other")).await.unwrap();
        store.create(text("bob", "alice", "two")).await.unwrap();

        let contents: Vec<_> = store
            .conversation(&user("bob"), &user("alice"))
            .await
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["one", "two"]);
    }
}
