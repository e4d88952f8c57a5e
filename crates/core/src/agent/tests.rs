use std::future::ready;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use simple_agent_model::{
    ErrorKind, ModelMessage, ModelReply, ToolCallRequest, ToolCallResult,
};
use simple_agent_test_model::TestModelProvider;
use tokio::time::sleep;

use crate::agent::{AgentBuilder, ConfigError, RetryPolicy, RunError};
use crate::cancel::CancellationToken;
use crate::tool::{FunctionTool, Tool};

#[derive(Deserialize)]
struct WeatherInput {
    location: String,
}

fn weather_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "location": { "type": "string" }
        },
        "required": ["location"]
    })
}

fn weather_tool() -> impl Tool<Input = WeatherInput> {
    FunctionTool::new(
        "get_weather",
        "Get the current weather for a location.",
        weather_schema(),
        |input: WeatherInput| {
            ready(Ok(format!("It's sunny in {}.", input.location)))
        },
    )
}

fn weather_call(id: &str, location: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_owned(),
        name: "get_weather".to_owned(),
        arguments: json!({ "location": location }),
    }
}

fn builder(provider: TestModelProvider) -> AgentBuilder {
    AgentBuilder::with_model_provider(provider)
        .with_name("assistant")
        .with_instructions("You are a helpful assistant.")
}

#[tokio::test]
async fn test_final_answer_without_tools() {
    let mut provider = TestModelProvider::new();
    provider.push_reply(ModelReply::Message("Hello!".to_owned()));
    let calls = provider.call_log();

    let agent = builder(provider).build().unwrap();
    let result = agent.run("Hi").await.unwrap();

    assert_eq!(result.output(), "Hello!");
    assert_eq!(result.turns(), 1);
    assert_eq!(
        result.history(),
        &[
            ModelMessage::System("You are a helpful assistant.".to_owned()),
            ModelMessage::User("Hi".to_owned()),
            ModelMessage::Assistant("Hello!".to_owned()),
        ]
    );
    assert_eq!(calls.len(), 1);
}

#[tokio::test]
async fn test_weather_scenario() {
    let mut provider = TestModelProvider::new();
    provider.push_reply(ModelReply::ToolCalls(vec![weather_call(
        "call:1", "SF",
    )]));
    provider.push_reply(ModelReply::Message("It's sunny in SF.".to_owned()));
    let calls = provider.call_log();

    let agent = builder(provider).with_tool(weather_tool()).build().unwrap();
    let result = agent.run("What's the weather in SF?").await.unwrap();

    assert_eq!(result.output(), "It's sunny in SF.");
    assert_eq!(result.turns(), 2);
    assert_eq!(
        result.history(),
        &[
            ModelMessage::System("You are a helpful assistant.".to_owned()),
            ModelMessage::User("What's the weather in SF?".to_owned()),
            ModelMessage::ToolCalls(vec![weather_call("call:1", "SF")]),
            ModelMessage::Tool(ToolCallResult {
                id: "call:1".to_owned(),
                content: "It's sunny in SF.".to_owned(),
            }),
            ModelMessage::Assistant("It's sunny in SF.".to_owned()),
        ]
    );

    // The second request must carry the tool result back to the model,
    // along with the tool definitions.
    let requests = calls.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].tools.len(), 1);
    assert_eq!(requests[1].tools[0].name, "get_weather");
    assert!(requests[1].messages.contains(&ModelMessage::Tool(
        ToolCallResult {
            id: "call:1".to_owned(),
            content: "It's sunny in SF.".to_owned(),
        }
    )));
}

#[derive(Deserialize)]
struct EchoAfterInput {
    label: String,
    delay_ms: u64,
}

fn echo_after_tool() -> impl Tool<Input = EchoAfterInput> {
    FunctionTool::new(
        "echo_after",
        "Returns the label after a delay.",
        json!({
            "type": "object",
            "properties": {
                "label": { "type": "string" },
                "delay_ms": { "type": "integer" }
            },
            "required": ["label", "delay_ms"]
        }),
        |input: EchoAfterInput| async move {
            sleep(Duration::from_millis(input.delay_ms)).await;
            Ok(input.label)
        },
    )
}

#[tokio::test(start_paused = true)]
async fn test_tool_results_keep_request_order() {
    // The slowest call comes first; the results must still appear in
    // the order the model requested them.
    let requests: Vec<_> = [("call:1", "a", 300), ("call:2", "b", 10), ("call:3", "c", 100)]
        .into_iter()
        .map(|(id, label, delay_ms)| ToolCallRequest {
            id: id.to_owned(),
            name: "echo_after".to_owned(),
            arguments: json!({ "label": label, "delay_ms": delay_ms }),
        })
        .collect();

    let mut provider = TestModelProvider::new();
    provider.push_reply(ModelReply::ToolCalls(requests));
    provider.push_reply(ModelReply::Message("done".to_owned()));

    let agent = builder(provider)
        .with_tool(echo_after_tool())
        .build()
        .unwrap();
    let result = agent.run("run them").await.unwrap();

    let tool_results: Vec<_> = result
        .history()
        .iter()
        .filter_map(|msg| match msg {
            ModelMessage::Tool(result) => Some(result.content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(tool_results, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_turn_limit() {
    let mut provider = TestModelProvider::new();
    for i in 0..5 {
        provider.push_reply(ModelReply::ToolCalls(vec![weather_call(
            &format!("call:{i}"),
            "SF",
        )]));
    }
    let calls = provider.call_log();

    let agent = builder(provider)
        .with_tool(weather_tool())
        .with_max_turns(3)
        .build()
        .unwrap();
    let err = agent.run("loop forever").await.unwrap_err();

    assert_eq!(err, RunError::TurnLimitExceeded { limit: 3 });
    assert_eq!(calls.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() {
    let mut provider = TestModelProvider::new();
    provider.push_failure(ErrorKind::TransientNetwork, "connection reset");
    provider.push_failure(ErrorKind::RateLimited, "slow down");
    provider.push_reply(ModelReply::Message("finally".to_owned()));
    let calls = provider.call_log();

    let agent = builder(provider).build().unwrap();
    let result = agent.run("Hi").await.unwrap();

    assert_eq!(result.output(), "finally");
    assert_eq!(calls.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_attempts_are_bounded() {
    let mut provider = TestModelProvider::new();
    for _ in 0..5 {
        provider.push_failure(ErrorKind::TransientNetwork, "connection reset");
    }
    let calls = provider.call_log();

    let agent = builder(provider)
        .with_retry_policy(RetryPolicy::new().with_max_attempts(3))
        .build()
        .unwrap();
    let err = agent.run("Hi").await.unwrap_err();

    assert!(matches!(
        err,
        RunError::Model {
            kind: ErrorKind::TransientNetwork,
            ..
        }
    ));
    assert_eq!(calls.len(), 3);
}

#[tokio::test]
async fn test_non_retryable_failure_is_immediate() {
    let mut provider = TestModelProvider::new();
    provider.push_failure(ErrorKind::Auth, "invalid api key");
    provider.push_reply(ModelReply::Message("unreachable".to_owned()));
    let calls = provider.call_log();

    let agent = builder(provider).build().unwrap();
    let err = agent.run("Hi").await.unwrap_err();

    assert!(matches!(
        err,
        RunError::Model {
            kind: ErrorKind::Auth,
            ..
        }
    ));
    assert_eq!(calls.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout_counts_as_transient() {
    let mut provider = TestModelProvider::new();
    provider.set_delay(Duration::from_secs(120));
    provider.push_reply(ModelReply::Message("too late".to_owned()));
    let calls = provider.call_log();

    let agent = builder(provider)
        .with_retry_policy(
            RetryPolicy::new()
                .with_max_attempts(2)
                .with_request_timeout(Duration::from_secs(5)),
        )
        .build()
        .unwrap();
    let err = agent.run("Hi").await.unwrap_err();

    match err {
        RunError::Model { kind, message } => {
            assert_eq!(kind, ErrorKind::TransientNetwork);
            assert!(message.contains("timed out"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(calls.len(), 2);
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_the_tool_body() {
    let invoked = Arc::new(AtomicBool::new(false));
    let probe = {
        let invoked = Arc::clone(&invoked);
        FunctionTool::new(
            "get_weather",
            "Get the current weather for a location.",
            weather_schema(),
            move |input: WeatherInput| {
                invoked.store(true, Ordering::Relaxed);
                ready(Ok(format!("It's sunny in {}.", input.location)))
            },
        )
    };

    let mut provider = TestModelProvider::new();
    provider.push_reply(ModelReply::ToolCalls(vec![ToolCallRequest {
        id: "call:1".to_owned(),
        name: "get_weather".to_owned(),
        arguments: json!({ "location": 42 }),
    }]));
    provider.push_reply(ModelReply::Message("sorry".to_owned()));
    let calls = provider.call_log();

    let agent = builder(provider).with_tool(probe).build().unwrap();
    let result = agent.run("weather?").await.unwrap();

    assert_eq!(result.output(), "sorry");
    assert!(!invoked.load(Ordering::Relaxed));

    // The validation failure is reported to the model as the call's
    // result so it can retry with corrected arguments.
    let requests = calls.requests();
    let reported = requests[1]
        .messages
        .iter()
        .find_map(|msg| match msg {
            ModelMessage::Tool(result) if result.id == "call:1" => {
                Some(result.content.as_str())
            }
            _ => None,
        })
        .unwrap();
    assert!(reported.starts_with("Error:"));
    assert!(reported.contains("expected string"));
}

#[tokio::test]
async fn test_unknown_tool_is_reported_to_the_model() {
    let mut provider = TestModelProvider::new();
    provider.push_reply(ModelReply::ToolCalls(vec![ToolCallRequest {
        id: "call:1".to_owned(),
        name: "send_email".to_owned(),
        arguments: json!({}),
    }]));
    provider.push_reply(ModelReply::Message("my mistake".to_owned()));
    let calls = provider.call_log();

    let agent = builder(provider).with_tool(weather_tool()).build().unwrap();
    let result = agent.run("email someone").await.unwrap();

    assert_eq!(result.output(), "my mistake");
    let requests = calls.requests();
    assert!(requests[1].messages.iter().any(|msg| matches!(
        msg,
        ModelMessage::Tool(result)
            if result.content.contains("`send_email` is not available")
    )));
}

#[tokio::test]
async fn test_failing_tool_does_not_abort_the_turn() {
    #[derive(Deserialize)]
    struct Empty {}

    let failing = FunctionTool::new(
        "flaky",
        "Always fails.",
        json!({ "type": "object", "properties": {} }),
        |_: Empty| ready(Err(crate::tool::Error::execution_error()
            .with_reason("backend unavailable"))),
    );

    let mut provider = TestModelProvider::new();
    provider.push_reply(ModelReply::ToolCalls(vec![
        ToolCallRequest {
            id: "call:1".to_owned(),
            name: "flaky".to_owned(),
            arguments: json!({}),
        },
        weather_call("call:2", "SF"),
    ]));
    provider.push_reply(ModelReply::Message("recovered".to_owned()));

    let agent = builder(provider)
        .with_tool(failing)
        .with_tool(weather_tool())
        .build()
        .unwrap();
    let result = agent.run("do both").await.unwrap();

    assert_eq!(result.output(), "recovered");
    let tool_results: Vec<_> = result
        .history()
        .iter()
        .filter_map(|msg| match msg {
            ModelMessage::Tool(result) => Some(result.content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        tool_results,
        ["Error: backend unavailable", "It's sunny in SF."]
    );
}

#[tokio::test]
async fn test_cancellation_before_the_first_model_call() {
    let mut provider = TestModelProvider::new();
    provider.push_reply(ModelReply::Message("unreachable".to_owned()));
    let calls = provider.call_log();

    let agent = builder(provider).build().unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let err = agent.run_with_cancellation("Hi", token).await.unwrap_err();
    assert_eq!(err, RunError::Cancelled);
    assert!(calls.is_empty());
}

#[tokio::test]
async fn test_cancellation_lets_a_started_tool_finish() {
    #[derive(Deserialize)]
    struct Empty {}

    let token = CancellationToken::new();
    let finished = Arc::new(AtomicBool::new(false));
    let cancelling = {
        let token = token.clone();
        let finished = Arc::clone(&finished);
        FunctionTool::new(
            "stop_everything",
            "Cancels the current run.",
            json!({ "type": "object", "properties": {} }),
            move |_: Empty| {
                token.cancel();
                finished.store(true, Ordering::Relaxed);
                ready(Ok("stopping".to_owned()))
            },
        )
    };

    let mut provider = TestModelProvider::new();
    provider.push_reply(ModelReply::ToolCalls(vec![ToolCallRequest {
        id: "call:1".to_owned(),
        name: "stop_everything".to_owned(),
        arguments: json!({}),
    }]));
    provider.push_reply(ModelReply::Message("unreachable".to_owned()));
    let calls = provider.call_log();

    let agent = builder(provider).with_tool(cancelling).build().unwrap();
    let err = agent
        .run_with_cancellation("stop", token)
        .await
        .unwrap_err();

    assert_eq!(err, RunError::Cancelled);
    assert!(finished.load(Ordering::Relaxed));
    // The model is never called again after the cancellation point.
    assert_eq!(calls.len(), 1);
}

#[tokio::test]
async fn test_structured_final_answer() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Weather {
        location: String,
        temperature_f: i32,
    }

    let mut provider = TestModelProvider::new();
    provider.push_reply(ModelReply::Message(
        r#"{ "location": "SF", "temperature_f": 60 }"#.to_owned(),
    ));

    let agent = builder(provider).build().unwrap();
    let result = agent.run("weather as json").await.unwrap();

    let weather: Weather = result.parse_output().unwrap();
    assert_eq!(
        weather,
        Weather {
            location: "SF".to_owned(),
            temperature_f: 60,
        }
    );
}

#[test]
fn test_duplicate_tool_names_are_rejected() {
    let err = builder(TestModelProvider::new())
        .with_tool(weather_tool())
        .with_tool(weather_tool())
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::DuplicateTool("get_weather".to_owned()));
}

#[test]
fn test_empty_name_is_rejected() {
    let err = AgentBuilder::with_model_provider(TestModelProvider::new())
        .with_instructions("Be helpful.")
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::EmptyName);
}

#[test]
fn test_empty_instructions_are_rejected() {
    let err = AgentBuilder::with_model_provider(TestModelProvider::new())
        .with_name("assistant")
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::EmptyInstructions);
}

#[test]
fn test_non_object_tool_schema_is_rejected() {
    #[derive(Deserialize)]
    struct Raw(String);

    let tool = FunctionTool::new(
        "raw",
        "Takes a bare string.",
        json!({ "type": "string" }),
        |_: Raw| ready(Ok(String::new())),
    );
    let err = builder(TestModelProvider::new())
        .with_tool(tool)
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::ToolSchema { tool, .. } if tool == "raw"));
}
