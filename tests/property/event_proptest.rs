//! Property-based tests for the client event decoder

use proptest::prelude::*;
use chatapp::shared::ClientEvent;

proptest! {
    #[test]
    fn test_parse_never_panics(text in ".*") {
        let _ = ClientEvent::parse(&text);
    }

    #[test]
    fn test_send_message_frames_parse(
        chat_id in 1i64..1_000_000,
        content in "[a-zA-Z0-9 ]{0,40}[a-zA-Z0-9][a-zA-Z0-9 ]{0,40}",
    ) {
        let frame = serde_json::json!({
            "type": "send_message",
            "chat_id": chat_id,
            "content": content,
        });
        let event = ClientEvent::parse(&frame.to_string()).unwrap();
        prop_assert_eq!(event.chat_id(), chat_id);
        prop_assert_eq!(event.kind(), "send_message");
    }

    #[test]
    fn test_unknown_types_are_invalid_event(kind in "[a-z_]{1,20}") {
        prop_assume!(!["send_message", "typing", "join_chat", "leave_chat", "message_read"]
            .contains(&kind.as_str()));
        let frame = serde_json::json!({"type": kind, "chat_id": 1});
        let err = ClientEvent::parse(&frame.to_string()).unwrap_err();
        prop_assert_eq!(err.code(), "invalid_event");
    }
}
