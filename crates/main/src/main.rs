//! 主应用程序入口
//!
//! 启动实时在线状态、消息中继与通话信令服务。

use std::sync::Arc;

use application::{RealtimeService, RealtimeServiceDependencies};
use config::AppConfig;
use infrastructure::{Infrastructure, InfrastructureConfig, SeedProfile};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, Heartbeat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // 初始化日志：RUST_LOG 优先于配置文件
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let infra = Infrastructure::in_memory(InfrastructureConfig {
        seed_users: config
            .presence
            .seed_users
            .iter()
            .map(|seed| SeedProfile {
                id: seed.id.clone(),
                name: seed.name.clone(),
                profile_image: seed.profile_image.clone(),
            })
            .collect(),
    })
    .await?;

    let realtime = RealtimeService::new(RealtimeServiceDependencies {
        message_store: infra.message_store(),
        user_store: infra.user_store(),
        clock: infra.clock.clone(),
    });

    let heartbeat = Heartbeat {
        interval: config.heartbeat.ping_interval(),
        timeout: config.heartbeat.timeout(),
    };
    let state = AppState::new(Arc::new(realtime), config.server.cors_origins.clone())
        .with_heartbeat(heartbeat);
    let app = router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("实时服务启动在 http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
