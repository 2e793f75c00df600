use serde_json::Value;

use super::message::ResponseMessage;
use super::response::Context;
use super::role::Role;

/// One event of a streamed answer, resolved from a raw NDJSON object.
///
/// The server does not tag its events; the shape is recognised by which
/// fields are present, in the order the variants are listed here.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// `{ context: { data_points, .. }, delta }`: the delta becomes the base message
    ContextAndDelta {
        context: Context,
        delta: ResponseMessage,
        session_state: Option<Value>,
    },
    /// `{ delta: { content, role } }` with non-empty content
    ContentDelta { content: String, role: Option<Role> },
    /// `{ context: { .. } }` without a usable delta
    ContextUpdate {
        context: Context,
        session_state: Option<Value>,
    },
    /// `{ error: "..." }`
    Error { message: String },
    /// Anything else, e.g. a delta with empty content
    Ignored,
}

impl StreamEvent {
    pub fn classify(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return StreamEvent::Ignored;
        };

        let session_state = fields.get("session_state").cloned();
        let context = match fields.remove("context") {
            Some(Value::Object(context)) => Some(context),
            _ => None,
        };
        let delta = fields.remove("delta").filter(|delta| delta.is_object());

        if let (Some(context), Some(delta)) = (&context, &delta) {
            if context.get("data_points").is_some_and(truthy) {
                return StreamEvent::ContextAndDelta {
                    context: context.clone(),
                    delta: parse_delta(delta),
                    session_state,
                };
            }
        }

        if let Some(Value::String(content)) = delta.as_ref().and_then(|d| d.get("content")) {
            if !content.is_empty() {
                let role = delta
                    .as_ref()
                    .and_then(|d| d.get("role"))
                    .and_then(|role| serde_json::from_value(role.clone()).ok());
                return StreamEvent::ContentDelta {
                    content: content.clone(),
                    role,
                };
            }
        }

        if let Some(context) = context {
            return StreamEvent::ContextUpdate {
                context,
                session_state,
            };
        }

        match fields.remove("error") {
            Some(Value::String(message)) if !message.is_empty() => StreamEvent::Error { message },
            Some(error) if truthy(&error) => StreamEvent::Error {
                message: error.to_string(),
            },
            _ => StreamEvent::Ignored,
        }
    }
}

impl From<Value> for StreamEvent {
    fn from(value: Value) -> Self {
        StreamEvent::classify(value)
    }
}

fn parse_delta(delta: &Value) -> ResponseMessage {
    let content = delta
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let role = delta
        .get("role")
        .and_then(|role| serde_json::from_value(role.clone()).ok())
        .unwrap_or_default();
    ResponseMessage::new(role, content)
}

// Presence check with the loose semantics the server's JSON was designed for
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_content_delta() {
        let event = StreamEvent::classify(json!({"delta": {"content": "Hel", "role": "assistant"}}));
        assert_eq!(
            event,
            StreamEvent::ContentDelta {
                content: "Hel".to_string(),
                role: Some(Role::Assistant),
            }
        );
    }

    #[test]
    fn test_unknown_delta_role_is_kept() {
        let event = StreamEvent::classify(json!({"delta": {"content": "Hel", "role": "tool"}}));
        assert_eq!(
            event,
            StreamEvent::ContentDelta {
                content: "Hel".to_string(),
                role: Some(Role::Other("tool".to_string())),
            }
        );

        match StreamEvent::classify(json!({"context": {"data_points": ["p1"]}, "delta": {"role": "tool"}})) {
            StreamEvent::ContextAndDelta { delta, .. } => {
                assert_eq!(delta.role, Role::Other("tool".to_string()))
            }
            other => panic!("Expected ContextAndDelta, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_context_and_delta() {
        let event = StreamEvent::classify(json!({
            "context": {"data_points": ["p1"], "thoughts": []},
            "delta": {"role": "assistant"},
            "session_state": "abc"
        }));
        match event {
            StreamEvent::ContextAndDelta {
                context,
                delta,
                session_state,
            } => {
                assert_eq!(context.get("data_points"), Some(&json!(["p1"])));
                assert_eq!(delta, ResponseMessage::assistant(""));
                assert_eq!(session_state, Some(json!("abc")));
            }
            other => panic!("Expected ContextAndDelta, got {:?}", other),
        }
    }

    #[test]
    fn test_data_points_without_delta_is_context_update() {
        let event = StreamEvent::classify(json!({"context": {"data_points": ["p1"]}}));
        assert!(matches!(event, StreamEvent::ContextUpdate { .. }));
    }

    #[test]
    fn test_content_wins_over_plain_context() {
        // Without data_points the delta takes precedence and the context is not read
        let event = StreamEvent::classify(json!({
            "context": {"followup_questions": ["x"]},
            "delta": {"content": "lo"}
        }));
        assert_eq!(
            event,
            StreamEvent::ContentDelta {
                content: "lo".to_string(),
                role: None,
            }
        );
    }

    #[test]
    fn test_classify_error() {
        let event = StreamEvent::classify(json!({"error": "upstream failure"}));
        assert_eq!(
            event,
            StreamEvent::Error {
                message: "upstream failure".to_string()
            }
        );
    }

    #[test]
    fn test_empty_delta_is_ignored() {
        assert_eq!(
            StreamEvent::classify(json!({"delta": {"content": "", "role": "assistant"}})),
            StreamEvent::Ignored
        );
        assert_eq!(StreamEvent::classify(json!([1, 2])), StreamEvent::Ignored);
        assert_eq!(StreamEvent::classify(json!({"error": ""})), StreamEvent::Ignored);
    }
}
