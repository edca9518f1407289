use std::sync::Arc;

use application::{Clock, MessageStore, SystemClock, UserStore};
use domain::{DomainError, UserId, UserProfile};
use thiserror::Error;

use crate::repository::{InMemoryMessageStore, InMemoryUserStore};

/// 预置用户档案
#[derive(Debug, Clone)]
pub struct SeedProfile {
    pub id: String,
    pub name: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InfrastructureConfig {
    pub seed_users: Vec<SeedProfile>,
}

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("invalid seed user: {0}")]
    InvalidSeed(#[from] DomainError),
}

#[derive(Clone)]
pub struct Infrastructure {
    pub users: Arc<InMemoryUserStore>,
    pub messages: Arc<InMemoryMessageStore>,
    pub clock: Arc<dyn Clock>,
}

impl Infrastructure {
    pub async fn in_memory(config: InfrastructureConfig) -> Result<Self, InfrastructureError> {
        let profiles = config
            .seed_users
            .into_iter()
            .map(|seed| {
                let id = UserId::parse(seed.id)?;
                Ok(UserProfile::new(id, seed.name, seed.profile_image))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let users = Arc::new(InMemoryUserStore::new());
        let seeded = users.seed(profiles).await;
        let messages = Arc::new(InMemoryMessageStore::new(users.clone(), clock.clone()));

        tracing::info!(seeded, "in-memory stores ready");

        Ok(Self {
            users,
            messages,
            clock,
        })
    }

    pub fn user_store(&self) -> Arc<dyn UserStore> {
        self.users.clone()
    }

    pub fn message_store(&self) -> Arc<dyn MessageStore> {
        self.messages.clone()
    }
}
