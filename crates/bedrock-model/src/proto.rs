use serde::{Deserialize, Serialize};
use serde_json::Value;
use simple_agent_model::{
    ModelMessage, ModelReply, ModelRequest, ModelTool, ToolCallRequest,
};

use crate::BedrockConfig;

// --------------------------------------
// Converse API wire types, camelCase JSON
// --------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<SystemBlock>,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct SystemBlock {
    text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ContentBlock {
    Text(String),
    ToolUse(ToolUse),
    ToolResult(ToolResultBlock),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolUse {
    tool_use_id: String,
    name: String,
    input: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolResultBlock {
    tool_use_id: String,
    content: Vec<ToolResultContent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ToolResultContent {
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct ToolConfig {
    tools: Vec<ToolEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolEntry {
    tool_spec: ToolSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSpec {
    name: String,
    description: String,
    input_schema: InputSchema,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct InputSchema {
    json: Value,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseResponse {
    pub output: Output,
    pub stop_reason: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Output {
    pub message: OutputMessage,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OutputMessage {
    content: Vec<ContentBlock>,
}

// -----------
// Conversions
// -----------

/// Converts a request into the Converse body.
///
/// System messages go to the dedicated `system` field regardless of
/// their position in the history. Tool results are user-role content in
/// this API; consecutive results are merged into a single user message,
/// because the API rejects two user messages in a row.
pub fn create_request(req: &ModelRequest) -> ConverseRequest {
    let mut system = Vec::new();
    let mut messages: Vec<Message> = Vec::new();

    for msg in &req.messages {
        match msg {
            ModelMessage::System(text) => {
                system.push(SystemBlock { text: text.clone() });
            }
            ModelMessage::User(text) => {
                messages.push(Message {
                    role: "user",
                    content: vec![ContentBlock::Text(text.clone())],
                });
            }
            ModelMessage::Assistant(text) => {
                messages.push(Message {
                    role: "assistant",
                    content: vec![ContentBlock::Text(text.clone())],
                });
            }
            ModelMessage::ToolCalls(requests) => {
                messages.push(Message {
                    role: "assistant",
                    content: requests
                        .iter()
                        .map(|call| {
                            ContentBlock::ToolUse(ToolUse {
                                tool_use_id: call.id.clone(),
                                name: call.name.clone(),
                                input: call.arguments.clone(),
                            })
                        })
                        .collect(),
                });
            }
            ModelMessage::Tool(result) => {
                let block = ContentBlock::ToolResult(ToolResultBlock {
                    tool_use_id: result.id.clone(),
                    content: vec![ToolResultContent::Text(
                        result.content.clone(),
                    )],
                });
                match messages.last_mut() {
                    Some(last)
                        if last.role == "user"
                            && matches!(
                                last.content.last(),
                                Some(ContentBlock::ToolResult(_))
                            ) =>
                    {
                        last.content.push(block);
                    }
                    _ => messages.push(Message {
                        role: "user",
                        content: vec![block],
                    }),
                }
            }
        }
    }

    let tool_config = if req.tools.is_empty() {
        None
    } else {
        Some(ToolConfig {
            tools: req.tools.iter().map(create_tool).collect(),
        })
    };

    ConverseRequest {
        system,
        messages,
        tool_config,
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> ToolEntry {
    ToolEntry {
        tool_spec: ToolSpec {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: InputSchema {
                json: tool.parameters.clone(),
            },
        },
    }
}

/// Classifies a Converse response into a reply for the run loop.
///
/// `tool_use` stop reason yields the requested calls; any other stop
/// reason yields the concatenated text blocks.
pub fn extract_reply(resp: ConverseResponse) -> Result<ModelReply, String> {
    let content = resp.output.message.content;

    if resp.stop_reason == "tool_use" {
        let requests: Vec<_> = content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse(tool_use) => Some(ToolCallRequest {
                    id: tool_use.tool_use_id,
                    name: tool_use.name,
                    arguments: tool_use.input,
                }),
                _ => None,
            })
            .collect();
        if requests.is_empty() {
            return Err(
                "tool_use response contained no toolUse blocks".to_owned()
            );
        }
        return Ok(ModelReply::ToolCalls(requests));
    }

    let text: String = content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text(text) => Some(text),
            _ => None,
        })
        .collect();
    if text.is_empty() {
        return Err("response contained no text content".to_owned());
    }
    Ok(ModelReply::Message(text))
}
