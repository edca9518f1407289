use std::{ops::ControlFlow, sync::Arc};

use application::{RealtimeService, SessionContext};
use axum::{
    body::Bytes,
    extract::ws::{Message as WsMessage, WebSocket},
};
use domain::{ClientEvent, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::{
    sync::mpsc,
    time::{interval_at, timeout, Instant, MissedTickBehavior},
};

use crate::state::Heartbeat;

/// WebSocket 连接
///
/// 一条物理连接对应一个会话：
/// - 发送任务独占 socket 的写半部，串行写出服务端事件与 pong
/// - 发送任务按心跳间隔发 ping，接收循环超过空闲期限没读到帧即视为半开连接
/// - 接收循环按到达顺序逐条分派客户端事件
/// - 任一方结束即走断开清理
pub struct WebSocketConnection {
    socket: WebSocket,
    realtime: Arc<RealtimeService>,
    heartbeat: Heartbeat,
}

impl WebSocketConnection {
    pub fn new(socket: WebSocket, realtime: Arc<RealtimeService>, heartbeat: Heartbeat) -> Self {
        Self {
            socket,
            realtime,
            heartbeat,
        }
    }

    pub async fn run(self) {
        let Self {
            socket,
            realtime,
            heartbeat,
        } = self;

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
        let mut session = realtime.connect(event_tx).await;
        let connection_id = session.connection_id();

        let (mut sender, mut incoming) = socket.split();

        // 写命令通道，接收循环借此回 pong
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<WsCommand>(32);

        let mut send_task = tokio::spawn(async move {
            let mut ping = interval_at(Instant::now() + heartbeat.interval, heartbeat.interval);
            ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let frame = tokio::select! {
                    Some(cmd) = cmd_rx.recv() => match cmd {
                        WsCommand::SendPong(data) => WsMessage::Pong(data),
                    },
                    Some(event) = event_rx.recv() => match event.to_json() {
                        Ok(json) => WsMessage::Text(json.into()),
                        Err(err) => {
                            tracing::warn!(error = %err, event = event.name(), "failed to serialize server event");
                            continue;
                        }
                    },
                    _ = ping.tick() => WsMessage::Ping(Bytes::new()),
                };

                if sender.send(frame).await.is_err() {
                    tracing::warn!(connection_id = %connection_id, "WebSocket 写入失败");
                    break;
                }
            }
            tracing::debug!(connection_id = %connection_id, "WebSocket发送任务结束");
        });

        let idle_deadline = heartbeat.idle_deadline();
        let recv_loop = async {
            loop {
                let frame = match timeout(idle_deadline, incoming.next()).await {
                    Ok(Some(frame)) => frame,
                    Ok(None) => break,
                    Err(_) => {
                        tracing::warn!(
                            connection_id = %connection_id,
                            idle_ms = idle_deadline.as_millis() as u64,
                            "heartbeat timed out, closing connection"
                        );
                        break;
                    }
                };
                let message = match frame {
                    Ok(message) => message,
                    Err(err) => {
                        tracing::warn!(connection_id = %connection_id, error = %err, "WebSocket 读取失败");
                        break;
                    }
                };
                if Self::handle_incoming(&realtime, &mut session, message, &cmd_tx)
                    .await
                    .is_break()
                {
                    break;
                }
            }
        };

        tokio::select! {
            _ = &mut send_task => {
                tracing::debug!(connection_id = %connection_id, "WebSocket发送任务完成");
            }
            _ = recv_loop => {
                tracing::debug!(connection_id = %connection_id, "WebSocket接收循环完成");
            }
        }

        send_task.abort();
        realtime.disconnect(session).await;
    }

    async fn handle_incoming(
        realtime: &RealtimeService,
        session: &mut SessionContext,
        message: WsMessage,
        cmd_tx: &mpsc::Sender<WsCommand>,
    ) -> ControlFlow<()> {
        match message {
            WsMessage::Text(text) => match serde_json::from_str::<ClientEvent>(text.as_str()) {
                Ok(event) => realtime.dispatch(session, event).await,
                Err(err) => {
                    tracing::warn!(
                        connection_id = %session.connection_id(),
                        error = %err,
                        "malformed client event dropped"
                    );
                }
            },
            WsMessage::Ping(data) => {
                if cmd_tx.send(WsCommand::SendPong(data)).await.is_err() {
                    return ControlFlow::Break(());
                }
            }
            WsMessage::Pong(_) => {}
            WsMessage::Binary(_) => {
                tracing::debug!(connection_id = %session.connection_id(), "binary frame ignored");
            }
            WsMessage::Close(_) => {
                tracing::info!(connection_id = %session.connection_id(), "WebSocket收到关闭消息");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

#[derive(Debug)]
enum WsCommand {
    SendPong(Bytes),
}
