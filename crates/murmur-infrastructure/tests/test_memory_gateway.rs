use murmur_core::conversation::ConversationRef;
use murmur_core::gateway::ChatGateway;
use murmur_core::message::OutgoingMessage;
use murmur_core::user::{Channel, Member};
use murmur_infrastructure::InMemoryGateway;

fn outgoing(text: &str) -> OutgoingMessage {
    OutgoingMessage::new(text, "u-ann", "Ann")
}

#[tokio::test]
async fn test_send_assigns_ids_and_ordered_timestamps() {
    let gateway = InMemoryGateway::new();
    let general = ConversationRef::channel("gen");

    let first = gateway.send_message(&general, outgoing("one")).await.unwrap();
    let second = gateway.send_message(&general, outgoing("two")).await.unwrap();

    assert_ne!(first.id, second.id);
    assert!(first.timestamp <= second.timestamp);
    let texts: Vec<_> = gateway
        .messages(&general)
        .await
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, vec!["one", "two"]);
}

#[tokio::test]
async fn test_send_rejects_invalid_payload() {
    let gateway = InMemoryGateway::new();
    let err = gateway
        .send_message(&ConversationRef::channel("gen"), outgoing("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, murmur_core::ChatError::InvalidPayload(_)));
}

#[tokio::test]
async fn test_stream_delivers_snapshots() {
    let gateway = InMemoryGateway::new();
    let general = ConversationRef::channel("gen");
    let mut stream = gateway.stream_messages(&general).await.unwrap();
    assert!(stream.borrow().is_empty());

    gateway.send_message(&general, outgoing("hello")).await.unwrap();
    stream.changed().await.unwrap();
    assert_eq!(stream.borrow_and_update().len(), 1);
}

#[tokio::test]
async fn test_reaction_round_trip_deletes_key() {
    let gateway = InMemoryGateway::new();
    let general = ConversationRef::channel("gen");
    let sent = gateway.send_message(&general, outgoing("react")).await.unwrap();

    gateway
        .react_to_message(&general, &sent.id, "👍", true, "u-bob")
        .await
        .unwrap();
    assert_eq!(gateway.messages(&general).await[0].reactions.count("👍"), 1);

    gateway
        .react_to_message(&general, &sent.id, "👍", false, "u-bob")
        .await
        .unwrap();
    assert!(gateway.messages(&general).await[0].reactions.is_empty());
}

#[tokio::test]
async fn test_react_to_unknown_message() {
    let gateway = InMemoryGateway::new();
    let general = ConversationRef::channel("gen");
    gateway.send_message(&general, outgoing("x")).await.unwrap();

    let err = gateway
        .react_to_message(&general, "missing", "👍", true, "u-bob")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_only_author_may_edit() {
    let gateway = InMemoryGateway::new();
    let general = ConversationRef::channel("gen");
    let sent = gateway.send_message(&general, outgoing("draft")).await.unwrap();

    let err = gateway
        .edit_message(&general, &sent.id, "u-bob", "hijacked")
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());

    gateway
        .edit_message(&general, &sent.id, "u-ann", "final")
        .await
        .unwrap();
    let stored = &gateway.messages(&general).await[0];
    assert_eq!(stored.text, "final");
    assert!(stored.edited);
}

#[tokio::test]
async fn test_thread_reply_bumps_parent_count() {
    let gateway = InMemoryGateway::new();
    let general = ConversationRef::channel("gen");
    let parent = gateway.send_message(&general, outgoing("topic")).await.unwrap();
    let thread = ConversationRef::thread(general.clone(), parent.id.clone());

    gateway.send_message(&thread, outgoing("reply")).await.unwrap();
    gateway.send_message(&thread, outgoing("reply 2")).await.unwrap();

    assert_eq!(gateway.messages(&general).await[0].thread_count, 2);
    assert_eq!(gateway.messages(&thread).await.len(), 2);
}

#[tokio::test]
async fn test_failing_writes() {
    let gateway = InMemoryGateway::new();
    gateway.set_fail_writes(true);
    let err = gateway
        .send_message(&ConversationRef::channel("gen"), outgoing("x"))
        .await
        .unwrap_err();
    assert!(err.is_gateway());

    gateway.set_fail_writes(false);
    assert!(
        gateway
            .send_message(&ConversationRef::channel("gen"), outgoing("x"))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_tagged() {
    let gateway = InMemoryGateway::new();
    let general = ConversationRef::channel("gen");
    let whisper = ConversationRef::whisper("u-ann", "u-bob");
    gateway.send_message(&general, outgoing("Deploy at noon")).await.unwrap();
    gateway.send_message(&general, outgoing("lunch?")).await.unwrap();
    gateway.send_message(&whisper, outgoing("deploy went fine")).await.unwrap();

    let local = gateway.search_conversation(&general, "DEPLOY").await.unwrap();
    assert_eq!(local.len(), 1);

    let hits = gateway
        .search_across_conversations(&[general.clone(), whisper.clone()], "deploy")
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().any(|h| h.conversation == whisper));

    let none = gateway
        .search_conversation(&ConversationRef::channel("empty"), "deploy")
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_directory_listing() {
    let gateway = InMemoryGateway::new()
        .with_members(vec![Member::new("u-ann", "Ann", "ann@example.com")])
        .with_channels(vec![Channel::new("gen", "general")]);
    assert_eq!(gateway.list_members().await.unwrap().len(), 1);
    assert_eq!(gateway.list_channels().await.unwrap()[0].name, "general");
}
