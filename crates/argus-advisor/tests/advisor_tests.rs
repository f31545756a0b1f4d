//! Tests for argus-advisor: chat types and the structured-output contract

use argus_advisor::*;
use std::sync::Mutex;

// ===========================================================================
// ChatMessage
// ===========================================================================

#[test]
fn chat_message_helpers() {
    assert_eq!(ChatMessage::system("s").role, Role::System);
    assert_eq!(ChatMessage::user("u").role, Role::User);
    assert_eq!(ChatMessage::assistant("a").role, Role::Assistant);
    assert_eq!(ChatMessage::user("hello").content, "hello");
}

#[test]
fn role_wire_values() {
    assert_eq!(serde_json::to_string(&Role::System).unwrap(), r#""system""#);
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
    assert_eq!(
        serde_json::to_string(&Role::Assistant).unwrap(),
        r#""assistant""#
    );
}

// ===========================================================================
// augment_for_schema message placement
// ===========================================================================

fn schema() -> serde_json::Value {
    serde_json::json!({"type": "object", "properties": {"title": {"type": "string"}}})
}

#[test]
fn augment_appends_to_trailing_user_message() {
    let messages = vec![
        ChatMessage::system("advisor"),
        ChatMessage::user("what about the battery?"),
    ];
    let augmented = augment_for_schema(&messages, &schema());

    // Count unchanged, instruction folded into the last message
    assert_eq!(augmented.len(), 2);
    assert_eq!(augmented[1].role, Role::User);
    assert!(augmented[1].content.starts_with("what about the battery?"));
    assert!(augmented[1].content.contains("valid JSON"));
    assert!(augmented[1].content.contains(r#""title""#));
}

#[test]
fn augment_appends_new_message_after_assistant() {
    let messages = vec![
        ChatMessage::user("hi"),
        ChatMessage::assistant("hello"),
    ];
    let augmented = augment_for_schema(&messages, &schema());

    // Grows by exactly one, never more
    assert_eq!(augmented.len(), 3);
    assert_eq!(augmented[2].role, Role::User);
    assert!(augmented[2].content.contains("valid JSON"));
}

#[test]
fn augment_appends_new_message_after_system() {
    let messages = vec![ChatMessage::system("advisor")];
    let augmented = augment_for_schema(&messages, &schema());
    assert_eq!(augmented.len(), 2);
    assert_eq!(augmented[1].role, Role::User);
}

#[test]
fn augment_empty_conversation() {
    let augmented = augment_for_schema(&[], &schema());
    assert_eq!(augmented.len(), 1);
    assert_eq!(augmented[0].role, Role::User);
}

#[test]
fn augment_does_not_mutate_input() {
    let messages = vec![ChatMessage::user("original")];
    let _ = augment_for_schema(&messages, &schema());
    assert_eq!(messages[0].content, "original");
}

// ===========================================================================
// Default complete_structured goes through augmentation
// ===========================================================================

struct RecordingProvider {
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

#[async_trait::async_trait]
impl AdvisorProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _temperature: f32,
        _max_tokens: u32,
    ) -> AdvisorResult<ChatResponse> {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(messages.to_vec());
        Ok(ChatResponse {
            content: "{}".into(),
            model: "test".into(),
            usage: Usage::default(),
        })
    }
}

#[tokio::test]
async fn complete_structured_uses_augmented_messages() {
    let provider = RecordingProvider {
        seen: Mutex::new(Vec::new()),
    };
    let messages = vec![ChatMessage::user("analyze this")];
    provider
        .complete_structured(&messages, &schema(), 0.1, 256)
        .await
        .unwrap();

    let seen = provider.seen.lock().unwrap_or_else(|e| e.into_inner());
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].len(), 1);
    assert!(seen[0][0].content.contains("valid JSON"));
    assert!(seen[0][0].content.starts_with("analyze this"));
}
