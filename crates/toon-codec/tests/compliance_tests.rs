/// End-to-end behaviour of the codec on realistic payloads, plus the
/// rejection paths a host integration relies on.
///
/// Roundtrip checks use the compact layout and a 4-space layout.
use serde::ser::{Serialize, Serializer};
use serde_json::{json, Value};
use toon_codec::{
    decode, decode_argument, decode_prompt, encode, encode_prompt, to_value, EncodeOptions,
    ParseErrorKind, SchemaErrorKind, ToonError, ToonValue,
};

fn assert_roundtrip(json: &Value) -> String {
    let value = to_value(json).expect("JSON values are always representable");
    for options in [EncodeOptions::default(), EncodeOptions::new().with_indent(4)] {
        let toon = encode(&value, &options);
        assert_toon_invariants(&toon);
        let decoded = decode(&toon).expect("decode failed");
        assert_eq!(value, decoded, "roundtrip failed:\n  JSON: {json}\n  TOON:\n{toon}");
    }
    encode(&value, &EncodeOptions::default())
}

/// No trailing newline, no trailing spaces, no NUL bytes.
fn assert_toon_invariants(toon: &str) {
    assert!(!toon.ends_with('\n'), "output ends with newline: {toon:?}");
    assert!(!toon.contains('\0'), "output contains NUL: {toon:?}");
    for (i, line) in toon.lines().enumerate() {
        assert!(!line.ends_with(' '), "line {i} has trailing space: {line:?}");
    }
}

// ============================================================================
// 1. CONCRETE SCENARIOS
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn nested_object_roundtrips_exactly() {
        let json = json!({"a": 1, "b": [1, 2, 3], "c": {"nested": true}});
        let toon = assert_roundtrip(&json);
        assert_eq!(toon, "a: 1\nb[3]: 1,2,3\nc:\n  nested: true");
    }

    #[test]
    fn uniform_messages_use_tabular_form() {
        let json = json!({
            "user": {"id": 42, "name": "Alice"},
            "messages": [
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": "Hello!"}
            ]
        });
        let toon = assert_roundtrip(&json);
        assert_eq!(
            toon,
            "user:\n  id: 42\n  name: Alice\n\
             messages[2]{role,content}:\n  system,You are a helpful assistant.\n  user,Hello!"
        );
    }

    #[test]
    fn multiline_prompt_with_leading_hyphens() {
        let prompt = "You are a careful assistant.\n- Respond concisely.\n- Use examples when relevant.";
        let toon = encode_prompt(prompt);
        assert_eq!(
            toon,
            r#"system_prompt: "You are a careful assistant.\n- Respond concisely.\n- Use examples when relevant.""#
        );
        assert_eq!(decode_prompt(&toon).unwrap(), prompt);
    }

    #[test]
    fn opaque_type_fails_with_serialization_error() {
        struct Handle;

        impl Serialize for Handle {
            fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("Handle is not JSON serializable"))
            }
        }

        #[derive(serde::Serialize)]
        struct Payload {
            name: &'static str,
            handle: Handle,
        }

        let err = to_value(&Payload { name: "x", handle: Handle }).unwrap_err();
        match err {
            ToonError::Serialization(message) => {
                assert!(message.contains("Handle is not JSON serializable"))
            }
            other => panic!("expected Serialization, got {other:?}"),
        }
    }

    #[test]
    fn integer_given_to_decode_fails_with_input_type_error() {
        let err = decode_argument(&json!(123)).unwrap_err();
        assert!(
            matches!(err, ToonError::InputType { found: "number", .. }),
            "got {err:?}"
        );
    }
}

// ============================================================================
// 2. REJECTIONS
// ============================================================================

mod rejections {
    use super::*;

    #[test]
    fn non_finite_floats() {
        for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                to_value(&json_map("x", f)),
                Err(ToonError::Serialization(_))
            ));
        }
    }

    fn json_map(key: &str, f: f64) -> std::collections::BTreeMap<String, f64> {
        std::iter::once((key.to_string(), f)).collect()
    }

    #[test]
    fn tabular_row_with_wrong_field_count() {
        let err = decode("rows[2]{a,b,c}:\n  1,2,3\n  4,5").unwrap_err();
        assert_eq!(err.parse_kind(), Some(ParseErrorKind::FieldCountMismatch));
    }

    #[test]
    fn prompt_envelope_not_an_object() {
        let err = decode_prompt("[2]: a,b").unwrap_err();
        assert_eq!(err.schema_kind(), Some(SchemaErrorKind::NotAnObject));
    }

    #[test]
    fn prompt_envelope_missing_field() {
        let err = decode_prompt("prompt: hi").unwrap_err();
        assert_eq!(err.schema_kind(), Some(SchemaErrorKind::MissingField));
    }

    #[test]
    fn prompt_envelope_wrong_field_type() {
        let err = decode_prompt("system_prompt: 42").unwrap_err();
        assert_eq!(err.schema_kind(), Some(SchemaErrorKind::WrongFieldType));
    }

    #[test]
    fn non_string_arguments_name_their_type() {
        for (arg, found) in [
            (json!(null), "null"),
            (json!(true), "boolean"),
            (json!(1.5), "number"),
            (json!([]), "array"),
            (json!({}), "object"),
        ] {
            match decode_argument(&arg) {
                Err(ToonError::InputType { found: f, .. }) => assert_eq!(f, found),
                other => panic!("expected InputType for {arg}, got {other:?}"),
            }
        }
    }
}

// ============================================================================
// 3. REALISTIC PAYLOADS
// ============================================================================

mod realistic_payloads {
    use super::*;

    #[test]
    fn chat_completion_request() {
        let toon = assert_roundtrip(&json!({
            "model": "gpt-4o",
            "temperature": 0.2,
            "max_tokens": 512,
            "stop": ["\n\n", "END"],
            "messages": [
                {"role": "system", "content": "Answer in JSON: {\"ok\": true}"},
                {"role": "user", "content": "List three colors, comma separated"}
            ]
        }));
        assert!(toon.contains("messages[2]{role,content}:"));
        assert!(toon.contains(r#"stop[2]: "\n\n",END"#));
    }

    #[test]
    fn tool_definitions() {
        assert_roundtrip(&json!({
            "tools": [
                {
                    "name": "get_weather",
                    "description": "Current weather for a city",
                    "parameters": {
                        "type": "object",
                        "properties": {"city": {"type": "string"}},
                        "required": ["city"]
                    }
                },
                {
                    "name": "noop",
                    "description": "Does nothing",
                    "parameters": {"type": "object", "properties": {}}
                }
            ]
        }));
    }

    #[test]
    fn calendar_events_tabular() {
        let toon = assert_roundtrip(&json!({
            "summary": "Engineering Sync",
            "timeZone": "America/Los_Angeles",
            "items": [
                {"id": "evt_1a2b", "status": "confirmed", "start": "2026-02-17T10:00:00-08:00"},
                {"id": "evt_9f8e", "status": "tentative", "start": "2026-02-18T13:00:00-08:00"}
            ]
        }));
        assert!(toon.contains(
            "items[2]{id,status,start}:\n  evt_1a2b,confirmed,2026-02-17T10:00:00-08:00"
        ));
    }

    #[test]
    fn nested_config() {
        assert_roundtrip(&json!({
            "database": {"host": "localhost", "port": 5432, "pool": {"min": 5, "max": 20}},
            "redis": {"host": "localhost", "port": 6379},
            "debug": false
        }));
    }

    #[test]
    fn github_issue_like() {
        assert_roundtrip(&json!({
            "id": 42,
            "title": "Bug in parser",
            "state": "open",
            "labels": [{"name": "bug", "color": "red"}, {"name": "priority", "color": "orange"}],
            "assignee": {"login": "alice", "id": 123}
        }));
    }

    #[test]
    fn toon_is_smaller_than_json() {
        let rows: Vec<Value> = (0..50)
            .map(|i| json!({"id": i, "name": format!("item{i}"), "active": i % 2 == 0}))
            .collect();
        let json = json!({ "items": rows });
        let toon = assert_roundtrip(&json);
        assert!(toon.len() < serde_json::to_string(&json).unwrap().len() / 2);
    }
}

// ============================================================================
// 4. STRESS
// ============================================================================

mod stress_tests {
    use super::*;

    #[test]
    fn wide_flat_object() {
        let value: ToonValue = (0..200)
            .map(|i| (format!("field_{i}"), ToonValue::from(i)))
            .collect();
        let decoded = decode(&encode(&value, &EncodeOptions::default())).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn deep_nesting() {
        let mut json = json!("leaf");
        for i in 0..64 {
            json = if i % 2 == 0 {
                json!({ "level": json })
            } else {
                json!([json, i])
            };
        }
        assert_roundtrip(&json);
    }

    #[test]
    fn many_mixed_items() {
        let items: Vec<Value> = (0..100)
            .map(|i| match i % 4 {
                0 => json!(i),
                1 => json!({"k": i, "nested": {"v": [i, i + 1]}}),
                2 => json!([format!("s{i}"), null]),
                _ => json!({}),
            })
            .collect();
        assert_roundtrip(&json!({ "items": items }));
    }
}
