use serde_json::{json, Value};
use toon_mcp::protocol::{error_codes, JsonRpcResponse};
use toon_mcp::{McpServer, ToolConfig, ToolRegistry};

fn server() -> McpServer {
    McpServer::new(ToolRegistry::new(ToolConfig::default()))
}

fn request(id: u64, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

fn call(server: &McpServer, tool: &str, arguments: Value) -> Value {
    let line = request(7, "tools/call", json!({"name": tool, "arguments": arguments}));
    let response = server.process_line(&line).expect("tools/call must respond");
    assert!(response.error.is_none(), "unexpected error: {:?}", response.error);
    response.result.expect("result")
}

fn tool_text(result: &Value) -> &str {
    result["content"][0]["text"].as_str().expect("text content")
}

fn error_code(response: &JsonRpcResponse) -> i32 {
    response.error.as_ref().expect("error response").code
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn initialize_reports_server_info() {
        let response = server()
            .process_line(&request(1, "initialize", json!({})))
            .unwrap();
        assert_eq!(response.id, json!(1));
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "toon-mcp-server");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
    }

    #[test]
    fn initialized_notification_is_silent() {
        let line = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server().process_line(line).is_none());
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert!(server().process_line("   \n").is_none());
    }

    #[test]
    fn ping_returns_empty_object() {
        let response = server().process_line(&request(3, "ping", json!(null))).unwrap();
        assert_eq!(response.result, Some(json!({})));
    }

    #[test]
    fn null_id_request_gets_a_reply() {
        let line = r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#;
        let response = server().process_line(line).expect("null id is not a notification");
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.result, Some(json!({})));
    }

    #[test]
    fn string_ids_are_echoed() {
        let line = r#"{"jsonrpc":"2.0","id":"abc","method":"ping"}"#;
        let response = server().process_line(line).unwrap();
        assert_eq!(response.id, json!("abc"));
    }
}

// ============================================================================
// tools/list
// ============================================================================

mod listing {
    use super::*;

    #[test]
    fn lists_three_tools_with_schemas() {
        let response = server()
            .process_line(&request(2, "tools/list", json!({})))
            .unwrap();
        let tools = response.result.unwrap()["tools"].clone();
        let tools = tools.as_array().unwrap();
        assert_eq!(tools.len(), 3);

        let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            [
                "convert_json_to_toon",
                "convert_toon_to_json",
                "convert_system_prompt_to_toon"
            ]
        );
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["payload"]));
        assert_eq!(tools[1]["inputSchema"]["required"], json!(["toon_text"]));
        assert_eq!(tools[2]["inputSchema"]["required"], json!(["prompt"]));
    }
}

// ============================================================================
// tools/call
// ============================================================================

mod tool_calls {
    use super::*;

    #[test]
    fn json_to_toon() {
        let result = call(
            &server(),
            "convert_json_to_toon",
            json!({"payload": {"user": {"id": 42, "name": "Alice"}, "tags": ["a", "b"]}}),
        );
        assert_eq!(result["isError"], false);
        assert_eq!(
            tool_text(&result),
            "user:\n  id: 42\n  name: Alice\ntags[2]: a,b"
        );
    }

    #[test]
    fn json_to_toon_with_indent() {
        let result = call(
            &server(),
            "convert_json_to_toon",
            json!({"payload": {"a": {"b": true}}, "indent": 4}),
        );
        assert_eq!(tool_text(&result), "a:\n    b: true");
    }

    #[test]
    fn json_to_toon_null_indent_means_default() {
        let result = call(
            &server(),
            "convert_json_to_toon",
            json!({"payload": {"a": {"b": true}}, "indent": null}),
        );
        assert_eq!(tool_text(&result), "a:\n  b: true");
    }

    #[test]
    fn json_to_toon_accepts_scalar_payload() {
        let result = call(&server(), "convert_json_to_toon", json!({"payload": "hello"}));
        assert_eq!(tool_text(&result), "hello");
    }

    #[test]
    fn toon_to_json() {
        let result = call(
            &server(),
            "convert_toon_to_json",
            json!({"toon_text": "items[2]{id,name}:\n  1,A\n  2,B"}),
        );
        assert_eq!(result["isError"], false);
        let decoded: Value = serde_json::from_str(tool_text(&result)).unwrap();
        assert_eq!(
            decoded,
            json!({"items": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]})
        );
    }

    #[test]
    fn system_prompt_to_toon() {
        let result = call(
            &server(),
            "convert_system_prompt_to_toon",
            json!({"prompt": "You are a helpful assistant."}),
        );
        assert_eq!(
            tool_text(&result),
            "system_prompt: You are a helpful assistant."
        );
    }

    #[test]
    fn prompt_output_roundtrips_through_toon_to_json() {
        let server = server();
        let prompt = "Line one\nLine two: with, punctuation";
        let encoded = call(&server, "convert_system_prompt_to_toon", json!({"prompt": prompt}));
        let decoded = call(
            &server,
            "convert_toon_to_json",
            json!({"toon_text": tool_text(&encoded)}),
        );
        let value: Value = serde_json::from_str(tool_text(&decoded)).unwrap();
        assert_eq!(value, json!({"system_prompt": prompt}));
    }
}

// ============================================================================
// Tool failures (isError results, not protocol errors)
// ============================================================================

mod tool_failures {
    use super::*;

    #[test]
    fn malformed_toon_is_a_tool_error() {
        let result = call(
            &server(),
            "convert_toon_to_json",
            json!({"toon_text": "items[3]: a,b"}),
        );
        assert_eq!(result["isError"], true);
        assert!(tool_text(&result).contains("line 1"));
    }

    #[test]
    fn non_string_toon_text() {
        let result = call(&server(), "convert_toon_to_json", json!({"toon_text": 123}));
        assert_eq!(result["isError"], true);
        assert!(tool_text(&result).contains("got number"));
    }

    #[test]
    fn non_string_prompt() {
        let result = call(
            &server(),
            "convert_system_prompt_to_toon",
            json!({"prompt": ["x"]}),
        );
        assert_eq!(result["isError"], true);
        assert!(tool_text(&result).contains("got array"));
    }

    #[test]
    fn missing_argument() {
        let result = call(&server(), "convert_json_to_toon", json!({}));
        assert_eq!(result["isError"], true);
        assert!(tool_text(&result).contains("payload"));
    }

    #[test]
    fn unknown_tool() {
        let result = call(&server(), "convert_yaml", json!({}));
        assert_eq!(result["isError"], true);
        assert!(tool_text(&result).contains("convert_yaml"));
    }
}

// ============================================================================
// Protocol errors
// ============================================================================

mod protocol_errors {
    use super::*;

    #[test]
    fn invalid_json_is_parse_error() {
        let response = server().process_line("{not json").unwrap();
        assert_eq!(response.id, Value::Null);
        assert_eq!(error_code(&response), error_codes::PARSE_ERROR);
    }

    #[test]
    fn missing_method_is_invalid_request() {
        let response = server().process_line(r#"{"jsonrpc":"2.0","id":5}"#).unwrap();
        assert_eq!(response.id, json!(5));
        assert_eq!(error_code(&response), error_codes::INVALID_REQUEST);
    }

    #[test]
    fn unknown_method() {
        let response = server()
            .process_line(&request(9, "resources/list", json!({})))
            .unwrap();
        assert_eq!(error_code(&response), error_codes::METHOD_NOT_FOUND);
        assert!(response.result.is_none());
    }

    #[test]
    fn tools_call_without_params() {
        let line = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call"}"#;
        let response = server().process_line(line).unwrap();
        assert_eq!(error_code(&response), error_codes::INVALID_PARAMS);
    }

    #[test]
    fn tools_call_without_name() {
        let response = server()
            .process_line(&request(4, "tools/call", json!({"arguments": {}})))
            .unwrap();
        assert_eq!(error_code(&response), error_codes::INVALID_PARAMS);
    }
}

// ============================================================================
// Stream loop
// ============================================================================

mod stream {
    use super::*;

    #[tokio::test]
    async fn responds_once_per_request_in_order() {
        let input = [
            request(1, "initialize", json!({})),
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#.to_string(),
            String::new(),
            request(2, "tools/list", json!({})),
            request(
                3,
                "tools/call",
                json!({"name": "convert_json_to_toon", "arguments": {"payload": [1, 2]}}),
            ),
        ]
        .join("\n");

        let mut output = Vec::new();
        server().run(input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(lines[2]["id"], 3);
        assert_eq!(lines[2]["result"]["content"][0]["text"], "[2]: 1,2");
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        let mut output = Vec::new();
        server().run(&b""[..], &mut output).await.unwrap();
        assert!(output.is_empty());
    }
}
