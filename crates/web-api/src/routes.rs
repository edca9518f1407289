use axum::{
    extract::{rejection::JsonRejection, ws::WebSocketUpgrade, State},
    http::{HeaderValue, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use domain::{Notification, UserId};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::ApiError, state::AppState, ws_connection::WebSocketConnection};

#[derive(Debug, Serialize)]
struct DeliveryResponse {
    delivered: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresenceResponse {
    online_users: Vec<UserId>,
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(websocket_upgrade))
        .route("/notifications", post(push_notification))
        .route("/presence", get(online_users))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "invalid CORS origin ignored");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn websocket_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let realtime = state.realtime.clone();
    let heartbeat = state.heartbeat;
    ws.on_upgrade(move |socket| WebSocketConnection::new(socket, realtime, heartbeat).run())
}

/// REST 层在持久化通知后调用，向在线接收者推送
async fn push_notification(
    State(state): State<AppState>,
    payload: Result<Json<Notification>, JsonRejection>,
) -> Result<(StatusCode, Json<DeliveryResponse>), ApiError> {
    let Json(notification) = payload?;
    let delivery = state
        .realtime
        .notifications()
        .push_notification(&notification)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DeliveryResponse {
            delivered: delivery.is_delivered(),
        }),
    ))
}

async fn online_users(State(state): State<AppState>) -> Json<PresenceResponse> {
    Json(PresenceResponse {
        online_users: state.realtime.online_users().await,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use application::{RealtimeService, RealtimeServiceDependencies};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use infrastructure::{Infrastructure, InfrastructureConfig};
    use tower::ServiceExt;

    async fn app() -> Router {
        let infra = Infrastructure::in_memory(InfrastructureConfig::default()).await.unwrap();
        let realtime = RealtimeService::new(RealtimeServiceDependencies {
            message_store: infra.message_store(),
            user_store: infra.user_store(),
            clock: infra.clock.clone(),
        });
        router(AppState::new(Arc::new(realtime), vec!["*".into()]))
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_notification(body: &str) -> Request<Body> {
        Request::post("/api/v1/notifications")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn presence_snapshot_starts_empty() {
        let response = app()
            .await
            .oneshot(Request::get("/api/v1/presence").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!({"onlineUsers": []}));
    }

    #[tokio::test]
    async fn notification_for_offline_user_is_accepted_undelivered() {
        let response = app()
            .await
            .oneshot(post_notification(
                r#"{"user": "u1", "type": "achievement", "title": "Badge", "message": "First session"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(json_body(response).await, serde_json::json!({"delivered": false}));
    }

    #[tokio::test]
    async fn malformed_notification_is_bad_request() {
        let response = app()
            .await
            .oneshot(post_notification(r#"{"user": "u1", "type": "unknown"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "BAD_REQUEST");

        let response = app()
            .await
            .oneshot(post_notification(
                r#"{"user": "u1", "type": "follow", "title": "", "message": "x"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_ARGUMENT");
    }
}
