use serde::{Deserialize, Serialize};
use serde_json::Value;
use simple_agent_model::{
    ModelMessage, ModelReply, ModelRequest, ModelTool, ToolCallRequest,
};

use crate::OpenAIConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub r#type: String,
    pub function: FunctionToolCall,
}

/// Tool call arguments travel as a JSON-encoded string on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionToolCall {
    pub name: String,
    pub arguments: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
    }
}

#[inline]
fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System(content) => Message::System {
            content: content.clone(),
        },
        ModelMessage::User(content) => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(content) => Message::Assistant {
            content: Some(content.clone()),
            tool_calls: None,
        },
        ModelMessage::ToolCalls(requests) => Message::Assistant {
            content: None,
            tool_calls: Some(
                requests.iter().map(create_history_tool_call).collect(),
            ),
        },
        ModelMessage::Tool(result) => Message::Tool {
            tool_call_id: result.id.clone(),
            content: result.content.clone(),
        },
    }
}

#[inline]
fn create_history_tool_call(req: &ToolCallRequest) -> ToolCall {
    ToolCall {
        id: req.id.clone(),
        r#type: "function".to_owned(),
        function: FunctionToolCall {
            name: req.name.clone(),
            // `Value` serializes to a string infallibly.
            arguments: req.arguments.to_string(),
        },
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

/// Classifies a completion into a reply for the run loop.
///
/// A choice with tool calls becomes [`ModelReply::ToolCalls`]; any text
/// beside them is dropped, because the next turn is decided by the tool
/// results. A choice without tool calls must carry content.
pub fn extract_reply(completion: ChatCompletion) -> Result<ModelReply, String> {
    let Some(choice) = completion.choices.into_iter().next() else {
        return Err("response contained no choices".to_owned());
    };

    match choice.message.tool_calls {
        Some(tool_calls) if !tool_calls.is_empty() => {
            let mut requests = Vec::with_capacity(tool_calls.len());
            for call in tool_calls {
                let arguments = serde_json::from_str(&call.function.arguments)
                    .map_err(|err| {
                        format!(
                            "malformed arguments for tool call {}: {err}",
                            call.id
                        )
                    })?;
                requests.push(ToolCallRequest {
                    id: call.id,
                    name: call.function.name,
                    arguments,
                });
            }
            return Ok(ModelReply::ToolCalls(requests));
        }
        _ => {}
    }

    match choice.message.content {
        Some(content) => Ok(ModelReply::Message(content)),
        None => {
            Err("response contained neither content nor tool calls".to_owned())
        }
    }
}
