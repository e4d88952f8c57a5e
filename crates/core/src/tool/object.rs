use async_trait::async_trait;
use serde_json::Value;

use super::{Error, Tool, ToolResult, schema};

/// Object-safe form of [`Tool`], so the registry can hold tools with
/// different input types behind one pointer type.
#[async_trait]
pub(crate) trait ToolObject: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameter_schema(&self) -> &Value;

    async fn execute(&self, arguments: Value) -> ToolResult;
}

pub(crate) struct ToolObjectImpl<T: Tool>(pub T);

#[async_trait]
impl<T: Tool> ToolObject for ToolObjectImpl<T> {
    #[inline]
    fn name(&self) -> &str {
        self.0.name()
    }

    #[inline]
    fn description(&self) -> &str {
        self.0.description()
    }

    #[inline]
    fn parameter_schema(&self) -> &Value {
        self.0.parameter_schema()
    }

    async fn execute(&self, arguments: Value) -> ToolResult {
        // Validate against the recorded schema first. The tool body must
        // not run for an invalid payload.
        if let Err(issues) =
            schema::validate_arguments(self.0.parameter_schema(), &arguments)
        {
            return Err(Error::invalid_input().with_reason(issues.join("; ")));
        }

        let input: T::Input = match serde_json::from_value(arguments) {
            Ok(input) => input,
            Err(err) => {
                return Err(
                    Error::invalid_input().with_reason(err.to_string())
                );
            }
        };
        self.0.execute(input).await
    }
}
