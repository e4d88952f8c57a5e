//! Tool call supports.
//!
//! A tool is declared through an explicit descriptor: its name,
//! description, and parameter schema are fixed when the tool is built,
//! and are never re-derived at call time. Arguments coming from the
//! model are checked against the recorded schema before the tool body
//! ever runs.

mod error;
mod object;
mod registry;
mod schema;

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{Error, ErrorKind};
pub(crate) use object::{ToolObject, ToolObjectImpl};
pub(crate) use registry::Registry;
pub(crate) use schema::ensure_object_schema;

/// The result of a tool call.
pub type ToolResult = Result<String, Error>;

/// A tool that can be called by the model.
///
/// Implementations of this trait should be stateless, and may not maintain
/// any internal state.
///
/// The tool can be context-aware, meaning it can access additional
/// information about the current execution context, such as the working
/// directory or the current user. To do this, make the context an immutable
/// state of the tool, which can be set during initialization, and copy it
/// when executing.
pub trait Tool: Send + Sync + 'static {
    /// The type of input that the tool accepts.
    type Input: DeserializeOwned;

    /// Returns the name of the tool.
    fn name(&self) -> &str;

    /// Returns the description of the tool.
    fn description(&self) -> &str;

    /// Returns the parameter schema of the tool.
    ///
    /// The schema must describe a JSON object; this is checked when the
    /// tool is attached to an agent.
    fn parameter_schema(&self) -> &Value;

    /// Executes the tool with the given input.
    ///
    /// This method must return a future that is fully independent of
    /// `self`, and the future should be cancellation safe.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static;
}

/// A [`Tool`] built from a plain function and an explicit descriptor.
///
/// This is the lightweight way to expose a closure as a tool without
/// writing a dedicated type:
///
/// ```
/// use std::future::ready;
///
/// use serde::Deserialize;
/// use serde_json::json;
/// use simple_agent_core::tool::{FunctionTool, ToolResult};
///
/// #[derive(Deserialize)]
/// struct Input {
///     location: String,
/// }
///
/// let tool: FunctionTool<Input, _> = FunctionTool::new(
///     "get_weather",
///     "Get the current weather for a location.",
///     json!({
///         "type": "object",
///         "properties": {
///             "location": { "type": "string" }
///         },
///         "required": ["location"]
///     }),
///     |input: Input| {
///         ready::<ToolResult>(Ok(format!("It's sunny in {}.", input.location)))
///     },
/// );
/// ```
pub struct FunctionTool<I, F> {
    name: String,
    description: String,
    parameter_schema: Value,
    function: F,
    _input: PhantomData<fn(I)>,
}

impl<I, F> FunctionTool<I, F> {
    /// Creates a tool from the descriptor parts and the function body.
    pub fn new<S1, S2>(
        name: S1,
        description: S2,
        parameter_schema: Value,
        function: F,
    ) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameter_schema,
            function,
            _input: PhantomData,
        }
    }
}

impl<I, F, Fut> Tool for FunctionTool<I, F>
where
    I: DeserializeOwned + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ToolResult> + Send + 'static,
{
    type Input = I;

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        (self.function)(input)
    }
}
