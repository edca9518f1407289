//! 用户概要与在线状态记录

use crate::value_objects::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// 默认头像，与平台用户档案保持一致
pub const DEFAULT_PROFILE_IMAGE: &str = "https://via.placeholder.com/150";

/// 消息中携带的收发方展示信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub profile_image: String,
}

/// 用户存储中与实时层相关的那部分档案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub profile_image: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub last_seen: Option<Timestamp>,
}

impl UserProfile {
    pub fn new(id: UserId, name: impl Into<String>, profile_image: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            profile_image: profile_image.unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string()),
            is_online: false,
            last_seen: None,
        }
    }

    /// 记录在线状态变化及最后活跃时间
    pub fn mark_presence(&mut self, is_online: bool, at: Timestamp) {
        self.is_online = is_online;
        self.last_seen = Some(at);
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            profile_image: self.profile_image.clone(),
        }
    }
}
