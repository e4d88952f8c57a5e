use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes a tool call request from the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The argument payload to pass to the tool.
    pub arguments: Value,
}

/// A classified reply from the model provider.
///
/// A reply is either a final textual answer or one-or-more tool call
/// requests, never both. Adapters must classify the provider's raw
/// response into one of the two cases before returning it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelReply {
    /// A final textual answer. The turn is complete.
    Message(String),
    /// The model requested tool invocations, in the order it emitted
    /// them. The order must be preserved by the caller.
    ToolCalls(Vec<ToolCallRequest>),
}

impl ModelReply {
    /// Returns `true` if this reply requests tool invocations.
    #[inline]
    pub fn is_tool_calls(&self) -> bool {
        matches!(self, ModelReply::ToolCalls(_))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let reply = ModelReply::ToolCalls(vec![ToolCallRequest {
            id: "call:1".to_owned(),
            name: "get_weather".to_owned(),
            arguments: json!({ "location": "SF" }),
        }]);

        let serialized = serde_json::to_string(&reply).unwrap();
        let deserialized: ModelReply =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(reply, deserialized);
        assert!(deserialized.is_tool_calls());
    }
}
