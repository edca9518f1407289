mod support;

use domain::UserId;
use serde_json::json;

use support::{expect_silence, next_event, send_event, spawn_server};

#[tokio::test]
async fn message_is_persisted_delivered_and_echoed() {
    let server = spawn_server().await;
    let mut ada = server.connect_as("ada").await;
    let mut linus = server.connect_as("linus").await;
    // Ada 也收到 Linus 的上线广播
    assert_eq!(next_event(&mut ada).await["data"]["userId"], "linus");

    send_event(
        &mut ada,
        "send-message",
        json!({"senderId": "ada", "receiverId": "linus", "content": "Ready for the borrow checker session?"}),
    )
    .await;

    let received = next_event(&mut linus).await;
    assert_eq!(received["event"], "receive-message");
    let message = &received["data"];
    assert_eq!(message["content"], "Ready for the borrow checker session?");
    assert_eq!(message["messageType"], "text");
    assert_eq!(message["isRead"], false);
    assert_eq!(message["sender"]["name"], "Ada");
    assert_eq!(message["sender"]["profileImage"], "https://img.example.com/ada.png");
    assert_eq!(message["receiver"]["id"], "linus");

    let echo = next_event(&mut ada).await;
    assert_eq!(echo["event"], "message-sent");
    assert_eq!(echo["data"]["id"], message["id"]);

    let stored = server
        .infra
        .messages
        .conversation(&UserId::parse("ada").unwrap(), &UserId::parse("linus").unwrap())
        .await;
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn message_to_offline_user_is_stored_and_only_echoed() {
    let server = spawn_server().await;
    let mut ada = server.connect_as("ada").await;

    send_event(
        &mut ada,
        "send-message",
        json!({"senderId": "ada", "receiverId": "linus", "content": "See you tomorrow"}),
    )
    .await;

    let echo = next_event(&mut ada).await;
    assert_eq!(echo["event"], "message-sent");
    assert_eq!(echo["data"]["receiver"]["name"], "Linus");
    assert_eq!(server.infra.messages.len().await, 1);
}

#[tokio::test]
async fn message_after_receiver_disconnects_is_only_echoed() {
    let server = spawn_server().await;
    let mut ada = server.connect_as("ada").await;
    let mut linus = server.connect_as("linus").await;
    assert_eq!(next_event(&mut ada).await["data"]["userId"], "linus");

    linus.close(None).await.expect("close");
    drop(linus);
    assert_eq!(
        next_event(&mut ada).await,
        json!({"event": "user-status-changed", "data": {"userId": "linus", "isOnline": false}})
    );

    // 空字符串的 messageType 按文本处理
    send_event(
        &mut ada,
        "send-message",
        json!({"senderId": "ada", "receiverId": "linus", "content": "Catch up later?", "messageType": ""}),
    )
    .await;

    let echo = next_event(&mut ada).await;
    assert_eq!(echo["event"], "message-sent");
    assert_eq!(echo["data"]["messageType"], "text");
    assert_eq!(echo["data"]["content"], "Catch up later?");
    expect_silence(&mut ada).await;
    assert_eq!(server.infra.messages.len().await, 1);
}

#[tokio::test]
async fn rejected_message_reports_error_to_sender_only() {
    let server = spawn_server().await;
    let mut ada = server.connect_as("ada").await;
    let mut linus = server.connect_as("linus").await;
    next_event(&mut ada).await;

    send_event(
        &mut ada,
        "send-message",
        json!({"senderId": "ada", "receiverId": "linus", "messageType": "file"}),
    )
    .await;

    let error = next_event(&mut ada).await;
    assert_eq!(error["event"], "message-error");
    assert!(error["data"]["error"].as_str().unwrap().contains("fileUrl"));
    expect_silence(&mut linus).await;
    assert_eq!(server.infra.messages.len().await, 0);
}

#[tokio::test]
async fn typing_indicators_reach_only_the_receiver() {
    let server = spawn_server().await;
    let mut ada = server.connect_as("ada").await;
    let mut linus = server.connect_as("linus").await;
    next_event(&mut ada).await;

    send_event(&mut linus, "typing", json!({"senderId": "linus", "receiverId": "ada"})).await;
    assert_eq!(
        next_event(&mut ada).await,
        json!({"event": "user-typing", "data": {"userId": "linus", "isTyping": true}})
    );

    send_event(&mut linus, "stop-typing", json!({"senderId": "linus", "receiverId": "ada"})).await;
    assert_eq!(
        next_event(&mut ada).await,
        json!({"event": "user-typing", "data": {"userId": "linus", "isTyping": false}})
    );

    // 接收者离线时静默丢弃
    send_event(&mut ada, "typing", json!({"senderId": "ada", "receiverId": "grace"})).await;
    expect_silence(&mut ada).await;
    expect_silence(&mut linus).await;
}

#[tokio::test]
async fn malformed_frames_do_not_close_the_connection() {
    let server = spawn_server().await;
    let mut ada = server.connect_as("ada").await;
    let mut linus = server.connect_as("linus").await;
    next_event(&mut ada).await;

    send_event(&mut linus, "no-such-event", json!({})).await;
    send_event(&mut linus, "typing", json!({"senderId": "linus"})).await;

    send_event(&mut linus, "typing", json!({"senderId": "linus", "receiverId": "ada"})).await;
    assert_eq!(next_event(&mut ada).await["event"], "user-typing");
}
