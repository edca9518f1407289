use std::{sync::Arc, time::Duration};

use application::RealtimeService;

/// 连接心跳参数
///
/// 服务端每隔 `interval` 发一次 ping；连续 `interval + timeout` 没有读到任何帧（含 pong）即断开。
#[derive(Debug, Clone, Copy)]
pub struct Heartbeat {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Heartbeat {
    pub fn idle_deadline(&self) -> Duration {
        self.interval + self.timeout
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(25),
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub realtime: Arc<RealtimeService>,
    /// 允许的跨域来源，`*` 表示任意来源
    pub cors_origins: Vec<String>,
    pub heartbeat: Heartbeat,
}

impl AppState {
    pub fn new(realtime: Arc<RealtimeService>, cors_origins: Vec<String>) -> Self {
        Self {
            realtime,
            cors_origins,
            heartbeat: Heartbeat::default(),
        }
    }

    pub fn with_heartbeat(mut self, heartbeat: Heartbeat) -> Self {
        self.heartbeat = heartbeat;
        self
    }
}
