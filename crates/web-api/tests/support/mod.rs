#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use application::{RealtimeService, RealtimeServiceDependencies};
use axum::Router;
use config::{AppConfig, SeedUser};
use futures_util::{SinkExt, StreamExt};
use infrastructure::{Infrastructure, InfrastructureConfig, SeedProfile};
use serde_json::Value;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    time::{sleep, timeout},
};
use tokio_tungstenite::{
    connect_async, tungstenite::Message as TungsteniteMessage, MaybeTlsStream, WebSocketStream,
};
use web_api::{router as build_router_fn, AppState, Heartbeat};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 预置用户：Ada（导师）与 Linus（学员）
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.presence.seed_users = vec![
        SeedUser {
            id: "ada".into(),
            name: "Ada".into(),
            profile_image: Some("https://img.example.com/ada.png".into()),
        },
        SeedUser {
            id: "linus".into(),
            name: "Linus".into(),
            profile_image: None,
        },
    ];
    config
}

pub async fn build_router() -> (Router, Infrastructure) {
    build_router_with(test_config()).await
}

pub async fn build_router_with(config: AppConfig) -> (Router, Infrastructure) {
    let heartbeat = Heartbeat {
        interval: config.heartbeat.ping_interval(),
        timeout: config.heartbeat.timeout(),
    };
    let infra = Infrastructure::in_memory(InfrastructureConfig {
        seed_users: config
            .presence
            .seed_users
            .into_iter()
            .map(|seed| SeedProfile {
                id: seed.id,
                name: seed.name,
                profile_image: seed.profile_image,
            })
            .collect(),
    })
    .await
    .expect("infrastructure");

    let realtime = RealtimeService::new(RealtimeServiceDependencies {
        message_store: infra.message_store(),
        user_store: infra.user_store(),
        clock: infra.clock.clone(),
    });
    let state = AppState::new(Arc::new(realtime), config.server.cors_origins).with_heartbeat(heartbeat);

    (build_router_fn(state), infra)
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub infra: Infrastructure,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn http(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn connect(&self) -> WsClient {
        let (ws, _) = connect_async(format!("ws://{}/api/v1/ws", self.addr))
            .await
            .expect("websocket connect");
        ws
    }

    /// 建立连接并声明身份，吸收自己的上线广播
    pub async fn connect_as(&self, user_id: &str) -> WsClient {
        let mut ws = self.connect().await;
        send_event(&mut ws, "user-online", Value::from(user_id)).await;
        let event = next_event(&mut ws).await;
        assert_eq!(event["event"], "user-status-changed");
        assert_eq!(event["data"]["userId"], user_id);
        ws
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_server() -> TestServer {
    spawn_server_with(test_config()).await
}

pub async fn spawn_server_with(config: AppConfig) -> TestServer {
    let (router, infra) = build_router_with(config).await;
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    // 等待服务器启动
    sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        infra,
        shutdown: Some(shutdown_tx),
    }
}

pub async fn send_event(ws: &mut WsClient, event: &str, data: Value) {
    let frame = serde_json::json!({ "event": event, "data": data });
    ws.send(TungsteniteMessage::Text(frame.to_string().into()))
        .await
        .expect("send event");
}

/// 读取下一个 JSON 事件，跳过控制帧
pub async fn next_event(ws: &mut WsClient) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream closed")
            .expect("websocket error");
        if let TungsteniteMessage::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("event json");
        }
    }
}

/// 断言一段时间内没有任何事件到达
pub async fn expect_silence(ws: &mut WsClient) {
    match timeout(Duration::from_millis(200), ws.next()).await {
        Err(_) => {}
        Ok(Some(Ok(TungsteniteMessage::Text(text)))) => panic!("unexpected event {text}"),
        Ok(other) => panic!("unexpected frame {other:?}"),
    }
}
