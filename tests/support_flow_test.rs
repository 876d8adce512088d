//! Scenario tests for the support session state machine, driven through core
//! events with a recording transport and ticket store.


use std::sync::Arc;

use mock_support::{
    callback_event, command_event, reply_event, text_event, FailingStore, MockTransport,
    RecordingStore,
};
use support_relay_bot::{ConversationState, SupportFlow, TicketStatus, TicketStore};

const STAFF_CHAT: i64 = -100500;
const USER_CHAT: i64 = 77;
const STAFF_USER: i64 = 999;

fn flow_with(
    store: Arc<RecordingStore>,
    transport: Arc<MockTransport>,
) -> SupportFlow {
    SupportFlow::new(store, transport, STAFF_CHAT, 64)
}

#[tokio::test]
async fn test_first_message_creates_exactly_one_ticket() {
    let store = Arc::new(RecordingStore::new());
    let transport = Arc::new(MockTransport::new());
    let flow = flow_with(store.clone(), transport.clone());

    flow.handle_event(&command_event(1, USER_CHAT, "support"))
        .await
        .unwrap();
    assert_eq!(
        flow.session_state(1).await,
        ConversationState::AwaitingUserMessage
    );
    // Prompt with a cancel button went to the user.
    let prompt = transport.last_to(USER_CHAT).await.unwrap();
    assert!(prompt.keyboard.is_some());

    flow.handle_event(&text_event(1, USER_CHAT, "5", "my bike broke"))
        .await
        .unwrap();

    assert_eq!(store.creates(), 1);
    assert_eq!(store.appends(), 0);
    assert_eq!(flow.session_state(1).await, ConversationState::Idle);

    // Staff notice carries the ticket id and the reply/resolve buttons.
    let notice = transport.last_to(STAFF_CHAT).await.unwrap();
    let ticket_id = store.last_created.lock().await.unwrap();
    assert!(notice.text.contains(&ticket_id.to_string()));
    assert!(notice.text.contains("my bike broke"));
    let keyboard = notice.keyboard.unwrap();
    assert_eq!(keyboard.rows[0][0].data, "reply:1");
    assert_eq!(keyboard.rows[1][0].data, "resolve:1");

    // User got an acknowledgement.
    let ack = transport.last_to(USER_CHAT).await.unwrap();
    assert!(ack.text.contains("sent to support"));
}

#[tokio::test]
async fn test_second_message_appends_never_creates_again() {
    let store = Arc::new(RecordingStore::new());
    let transport = Arc::new(MockTransport::new());
    let flow = flow_with(store.clone(), transport.clone());

    flow.handle_event(&command_event(1, USER_CHAT, "support"))
        .await
        .unwrap();
    flow.handle_event(&text_event(1, USER_CHAT, "5", "first"))
        .await
        .unwrap();
    flow.handle_event(&command_event(1, USER_CHAT, "support"))
        .await
        .unwrap();
    flow.handle_event(&text_event(1, USER_CHAT, "6", "second"))
        .await
        .unwrap();

    assert_eq!(store.creates(), 1);
    assert_eq!(store.appends(), 1);

    let ticket_id = store.last_created.lock().await.unwrap();
    let fetched = store.get_ticket(ticket_id).await.unwrap();
    assert_eq!(fetched.messages.len(), 2);
    assert_eq!(fetched.messages[1].text, "second");
}

#[tokio::test]
async fn test_create_failure_still_acknowledges_and_returns_to_idle() {
    let transport = Arc::new(MockTransport::new());
    let flow = SupportFlow::new(
        Arc::new(FailingStore),
        transport.clone(),
        STAFF_CHAT,
        64,
    );

    flow.handle_event(&command_event(1, USER_CHAT, "support"))
        .await
        .unwrap();
    flow.handle_event(&text_event(1, USER_CHAT, "5", "help me"))
        .await
        .unwrap();

    assert_eq!(flow.session_state(1).await, ConversationState::Idle);

    // Message is relayed live even though the store is down, marked unsaved.
    let notice = transport.last_to(STAFF_CHAT).await.unwrap();
    assert!(notice.text.contains("not saved"));
    assert!(notice.text.contains("help me"));

    let ack = transport.last_to(USER_CHAT).await.unwrap();
    assert!(ack.text.contains("could not be saved"));
}

#[tokio::test]
async fn test_cancel_clears_session_without_remote_calls() {
    let store = Arc::new(RecordingStore::new());
    let transport = Arc::new(MockTransport::new());
    let flow = flow_with(store.clone(), transport.clone());

    flow.handle_event(&command_event(1, USER_CHAT, "support"))
        .await
        .unwrap();
    flow.handle_event(&callback_event(1, USER_CHAT, "cancel"))
        .await
        .unwrap();

    assert_eq!(flow.session_state(1).await, ConversationState::Idle);
    assert_eq!(store.creates(), 0);
    assert_eq!(store.appends(), 0);
}

#[tokio::test]
async fn test_staff_reply_is_saved_as_staff_and_delivered() {
    let store = Arc::new(RecordingStore::new());
    let transport = Arc::new(MockTransport::new());
    let flow = flow_with(store.clone(), transport.clone());

    flow.handle_event(&command_event(1, USER_CHAT, "support"))
        .await
        .unwrap();
    flow.handle_event(&text_event(1, USER_CHAT, "5", "my bike broke"))
        .await
        .unwrap();

    flow.handle_event(&callback_event(STAFF_USER, STAFF_CHAT, "reply:1"))
        .await
        .unwrap();
    assert_eq!(
        flow.session_state(STAFF_USER).await,
        ConversationState::AwaitingStaffReply { target_user_id: 1 }
    );

    flow.handle_event(&text_event(STAFF_USER, STAFF_CHAT, "9", "hello"))
        .await
        .unwrap();

    assert_eq!(store.appends(), 1);
    assert_eq!(*store.last_append_is_staff.lock().await, Some(true));
    assert_eq!(flow.session_state(STAFF_USER).await, ConversationState::Idle);

    // "hello" reached the user's chat.
    let delivered = transport
        .sent_to(USER_CHAT)
        .await
        .into_iter()
        .find(|m| m.text.contains("hello"))
        .expect("staff reply delivered to user chat");
    assert!(delivered.text.contains("Reply from support"));

    let ticket_id = store.last_created.lock().await.unwrap();
    let fetched = store.get_ticket(ticket_id).await.unwrap();
    assert_eq!(fetched.messages.last().unwrap().text, "hello");
    assert!(fetched.messages.last().unwrap().is_staff);
}

#[tokio::test]
async fn test_staff_reply_without_correlation_reports_missing_chat() {
    let store = Arc::new(RecordingStore::new());
    let transport = Arc::new(MockTransport::new());
    let flow = flow_with(store.clone(), transport.clone());

    // No user message was ever relayed; there is nothing to correlate.
    flow.handle_event(&callback_event(STAFF_USER, STAFF_CHAT, "reply:1"))
        .await
        .unwrap();
    flow.handle_event(&text_event(STAFF_USER, STAFF_CHAT, "9", "hello"))
        .await
        .unwrap();

    let last = transport.last_to(STAFF_CHAT).await.unwrap();
    assert!(last.text.contains("Could not find the user's chat"));
    assert_eq!(flow.session_state(STAFF_USER).await, ConversationState::Idle);
}

#[tokio::test]
async fn test_user_reply_to_relayed_message_appends_without_support_command() {
    let store = Arc::new(RecordingStore::new());
    let transport = Arc::new(MockTransport::new());
    let flow = flow_with(store.clone(), transport.clone());

    flow.handle_event(&command_event(1, USER_CHAT, "support"))
        .await
        .unwrap();
    flow.handle_event(&text_event(1, USER_CHAT, "5", "my bike broke"))
        .await
        .unwrap();
    flow.handle_event(&callback_event(STAFF_USER, STAFF_CHAT, "reply:1"))
        .await
        .unwrap();
    flow.handle_event(&text_event(STAFF_USER, STAFF_CHAT, "9", "try the brakes"))
        .await
        .unwrap();

    // The user replies directly to the delivered staff message.
    let delivered = transport
        .sent_to(USER_CHAT)
        .await
        .into_iter()
        .find(|m| m.text.contains("try the brakes"))
        .unwrap();
    flow.handle_event(&reply_event(1, USER_CHAT, "6", "that worked", &delivered.id))
        .await
        .unwrap();

    // Appended to the same ticket: staff reply + user followup, one create total.
    assert_eq!(store.creates(), 1);
    assert_eq!(store.appends(), 2);
    let ticket_id = store.last_created.lock().await.unwrap();
    let fetched = store.get_ticket(ticket_id).await.unwrap();
    assert_eq!(fetched.messages.last().unwrap().text, "that worked");
    assert!(!fetched.messages.last().unwrap().is_staff);
}

#[tokio::test]
async fn test_unknown_command_is_ignored() {
    let store = Arc::new(RecordingStore::new());
    let transport = Arc::new(MockTransport::new());
    let flow = flow_with(store.clone(), transport.clone());

    flow.handle_event(&command_event(1, USER_CHAT, "start"))
        .await
        .unwrap();

    assert_eq!(flow.session_state(1).await, ConversationState::Idle);
    assert_eq!(store.creates(), 0);
    assert!(transport.sent().await.is_empty());
}

#[tokio::test]
async fn test_plain_text_from_idle_user_is_ignored() {
    let store = Arc::new(RecordingStore::new());
    let transport = Arc::new(MockTransport::new());
    let flow = flow_with(store.clone(), transport.clone());

    flow.handle_event(&text_event(1, USER_CHAT, "5", "random chatter"))
        .await
        .unwrap();

    assert_eq!(store.creates(), 0);
    assert_eq!(store.appends(), 0);
    assert!(transport.sent().await.is_empty());
}

#[tokio::test]
async fn test_resolve_closes_ticket_and_is_idempotent() {
    let store = Arc::new(RecordingStore::new());
    let transport = Arc::new(MockTransport::new());
    let flow = flow_with(store.clone(), transport.clone());

    flow.handle_event(&command_event(1, USER_CHAT, "support"))
        .await
        .unwrap();
    flow.handle_event(&text_event(1, USER_CHAT, "5", "broken"))
        .await
        .unwrap();

    flow.handle_event(&callback_event(STAFF_USER, STAFF_CHAT, "resolve:1"))
        .await
        .unwrap();
    flow.handle_event(&callback_event(STAFF_USER, STAFF_CHAT, "resolve:1"))
        .await
        .unwrap();

    assert_eq!(store.closes(), 2);
    let ticket_id = store.last_created.lock().await.unwrap();
    let fetched = store.get_ticket(ticket_id).await.unwrap();
    assert_eq!(fetched.ticket.status, TicketStatus::Closed);

    let confirmation = transport.last_to(STAFF_CHAT).await.unwrap();
    assert!(confirmation.text.contains("resolved"));
}

#[tokio::test]
async fn test_two_users_never_cross_contaminate() {
    let store = Arc::new(RecordingStore::new());
    let transport = Arc::new(MockTransport::new());
    let flow = flow_with(store.clone(), transport.clone());

    flow.handle_event(&command_event(1, 11, "support")).await.unwrap();
    flow.handle_event(&command_event(2, 22, "support")).await.unwrap();
    flow.handle_event(&text_event(1, 11, "5", "from one")).await.unwrap();
    flow.handle_event(&text_event(2, 22, "6", "from two")).await.unwrap();

    assert_eq!(store.creates(), 2);
    assert_eq!(store.appends(), 0);

    let one = store.inner.open_ticket_for(1).await.unwrap();
    let two = store.inner.open_ticket_for(2).await.unwrap();
    assert_ne!(one.id, two.id);
    assert_eq!(store.get_ticket(one.id).await.unwrap().messages[0].text, "from one");
    assert_eq!(store.get_ticket(two.id).await.unwrap().messages[0].text, "from two");

    // Each user's notice targets their own reply button.
    let notices = transport.sent_to(STAFF_CHAT).await;
    assert!(notices[0].keyboard.as_ref().unwrap().rows[0][0].data == "reply:1");
    assert!(notices[1].keyboard.as_ref().unwrap().rows[0][0].data == "reply:2");
}
