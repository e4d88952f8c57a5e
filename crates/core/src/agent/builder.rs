use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use simple_agent_model::ModelProvider;

use super::Agent;
use crate::model_client::ModelClient;
use crate::tool::{Tool, ToolObject, ToolObjectImpl, ensure_object_schema};

const DEFAULT_MAX_TURNS: u32 = 10;

/// An error in the agent configuration.
///
/// Configuration errors are fatal and reported at construction, before
/// any run is attempted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The agent name is empty.
    EmptyName,
    /// The agent instructions are empty.
    EmptyInstructions,
    /// Two tools declared the same name.
    DuplicateTool(String),
    /// A tool declared a malformed parameter schema.
    ToolSchema {
        /// The name of the offending tool.
        tool: String,
        /// What is wrong with the schema.
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyName => {
                write!(f, "agent name must not be empty")
            }
            ConfigError::EmptyInstructions => {
                write!(f, "agent instructions must not be empty")
            }
            ConfigError::DuplicateTool(name) => {
                write!(f, "duplicate tool name: {name}")
            }
            ConfigError::ToolSchema { tool, reason } => {
                write!(f, "invalid parameter schema for tool {tool}: {reason}")
            }
        }
    }
}

impl StdError for ConfigError {}

/// Controls how model failures are retried within one turn.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total number of attempts per model turn, including the
    /// first one. Clamped to at least 1.
    #[inline]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the delay before the first retry.
    #[inline]
    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    /// Sets the upper bound for the backoff delay.
    #[inline]
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Sets the timeout for a single model call. A call exceeding it is
    /// treated as a transient network failure, eligible for retry.
    #[inline]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    #[inline]
    pub(crate) fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[inline]
    pub(crate) fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    #[inline]
    pub(crate) fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Builds the delay schedule for one turn's retries.
    pub(crate) fn delays(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_max_interval(self.max_backoff)
            .with_max_elapsed_time(None)
            .build()
    }
}

/// [`Agent`] builder.
pub struct AgentBuilder {
    name: String,
    instructions: String,
    model_client: ModelClient,
    tools: Vec<Arc<dyn ToolObject>>,
    max_turns: u32,
    retry_policy: RetryPolicy,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            name: String::new(),
            instructions: String::new(),
            model_client: ModelClient::new(provider),
            tools: vec![],
            max_turns: DEFAULT_MAX_TURNS,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Sets the agent name.
    #[inline]
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the system instructions.
    #[inline]
    pub fn with_instructions<S: Into<String>>(mut self, instructions: S) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(ToolObjectImpl(tool)));
        self
    }

    /// Sets the maximum number of model turns per run.
    #[inline]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Sets the retry policy for model calls.
    #[inline]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Validates the configuration and builds the agent.
    pub fn build(self) -> Result<Agent, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.instructions.trim().is_empty() {
            return Err(ConfigError::EmptyInstructions);
        }
        for tool in &self.tools {
            if let Err(reason) = ensure_object_schema(tool.parameter_schema())
            {
                return Err(ConfigError::ToolSchema {
                    tool: tool.name().to_owned(),
                    reason,
                });
            }
        }
        let registry = crate::tool::Registry::with_tools(self.tools)
            .map_err(ConfigError::DuplicateTool)?;
        Ok(Agent {
            name: self.name,
            instructions: self.instructions,
            model_client: self.model_client,
            registry,
            max_turns: self.max_turns,
            retry_policy: self.retry_policy,
        })
    }
}
