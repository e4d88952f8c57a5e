use std::error::Error as StdError;
use std::fmt::{self, Display};

use backoff::backoff::Backoff;
use serde::de::DeserializeOwned;
use simple_agent_model::{
    ErrorKind, ModelMessage, ModelReply, ModelRequest, ToolCallRequest,
    ToolCallResult,
};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use super::RetryPolicy;
use crate::cancel::CancellationToken;
use crate::conversation::Conversation;
use crate::model_client::ModelClient;
use crate::tool::{Error as ToolError, Registry, ToolResult};

/// The outcome of a completed run. Immutable once returned.
#[derive(Clone, Debug)]
pub struct RunResult {
    output: String,
    history: Vec<ModelMessage>,
    turns: u32,
}

impl RunResult {
    /// Returns the final answer text.
    #[inline]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Returns the full message history of the run, ending with the
    /// final assistant answer.
    #[inline]
    pub fn history(&self) -> &[ModelMessage] {
        &self.history
    }

    /// Returns the number of model turns the run used.
    #[inline]
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Parses the final answer as JSON into a typed value.
    pub fn parse_output<T: DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.output.trim())
    }
}

/// The error type for a failed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunError {
    /// The model provider failed and the failure was not recovered by
    /// retrying.
    Model {
        /// The stable kind of the provider failure.
        kind: ErrorKind,
        /// The provider's error message.
        message: String,
    },
    /// The run did not finish within the configured number of model
    /// turns. This is the safety bound against a model that keeps
    /// requesting tools forever.
    TurnLimitExceeded {
        /// The configured turn limit.
        limit: u32,
    },
    /// The run was cancelled by the caller.
    Cancelled,
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Model { kind, message } => {
                write!(f, "model failure ({kind:?}): {message}")
            }
            RunError::TurnLimitExceeded { limit } => {
                write!(f, "run exceeded the limit of {limit} model turns")
            }
            RunError::Cancelled => write!(f, "run was cancelled"),
        }
    }
}

impl StdError for RunError {}

enum Stage {
    AwaitingModel,
    ExecutingTools(Vec<ToolCallRequest>),
    Done(String),
}

enum PendingResult {
    Spawned(JoinHandle<ToolResult>),
    Ready(ToolResult),
}

/// One run of the agent, owning the conversation from user input to
/// final answer.
pub(crate) struct RunLoop<'a> {
    client: &'a ModelClient,
    registry: &'a Registry,
    policy: &'a RetryPolicy,
    max_turns: u32,
    cancellation: CancellationToken,
    conversation: Conversation,
}

impl<'a> RunLoop<'a> {
    pub(crate) fn new(
        client: &'a ModelClient,
        registry: &'a Registry,
        policy: &'a RetryPolicy,
        max_turns: u32,
        cancellation: CancellationToken,
        conversation: Conversation,
    ) -> Self {
        Self {
            client,
            registry,
            policy,
            max_turns,
            cancellation,
            conversation,
        }
    }

    pub(crate) async fn run(mut self) -> Result<RunResult, RunError> {
        let mut stage = Stage::AwaitingModel;
        let mut turns = 0u32;
        loop {
            match stage {
                Stage::AwaitingModel => {
                    turns += 1;
                    if turns > self.max_turns {
                        warn!("turn limit of {} exceeded", self.max_turns);
                        return Err(RunError::TurnLimitExceeded {
                            limit: self.max_turns,
                        });
                    }
                    debug!("turn {turns}: awaiting model");

                    stage = match self.await_model().await? {
                        ModelReply::Message(text) => {
                            self.conversation
                                .push(ModelMessage::Assistant(text.clone()));
                            Stage::Done(text)
                        }
                        ModelReply::ToolCalls(requests) => {
                            self.conversation.push(ModelMessage::ToolCalls(
                                requests.clone(),
                            ));
                            Stage::ExecutingTools(requests)
                        }
                    };
                }
                Stage::ExecutingTools(requests) => {
                    debug!("executing {} tool call(s)", requests.len());
                    self.execute_tools(requests).await?;
                    stage = Stage::AwaitingModel;
                }
                Stage::Done(output) => {
                    debug!("run finished in {turns} turn(s)");
                    return Ok(RunResult {
                        output,
                        history: self.conversation.into_messages(),
                        turns,
                    });
                }
            }
        }
    }

    /// Calls the model, retrying transient failures with exponential
    /// backoff up to the configured attempt count.
    async fn await_model(&mut self) -> Result<ModelReply, RunError> {
        let request = ModelRequest {
            messages: self.conversation.messages().to_vec(),
            tools: self.registry.definitions(),
        };

        let mut delays = self.policy.delays();
        let max_attempts = self.policy.max_attempts();
        let request_timeout = self.policy.request_timeout();

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            if self.cancellation.is_cancelled() {
                return Err(RunError::Cancelled);
            }

            let failure = match timeout(
                request_timeout,
                self.client.complete(&request),
            )
            .await
            {
                Ok(Ok(reply)) => return Ok(reply),
                Ok(Err(err)) => RunError::Model {
                    kind: err.kind(),
                    message: err.to_string(),
                },
                Err(_) => RunError::Model {
                    kind: ErrorKind::TransientNetwork,
                    message: format!(
                        "model request timed out after {request_timeout:?}"
                    ),
                },
            };

            let retryable = matches!(
                &failure,
                RunError::Model { kind, .. } if kind.is_retryable()
            );
            if !retryable || attempt >= max_attempts {
                return Err(failure);
            }

            let delay = delays
                .next_backoff()
                .unwrap_or_else(|| self.policy.max_backoff());
            warn!(
                "model attempt {attempt}/{max_attempts} failed ({failure}), \
                 retrying in {delay:?}"
            );
            sleep(delay).await;
        }
    }

    /// Executes the requested tools and appends their results in the
    /// order the model requested them.
    ///
    /// Tools run as independent spawned tasks, so calls within one turn
    /// may execute concurrently; reassembling the results by request
    /// order keeps the history deterministic.
    async fn execute_tools(
        &mut self,
        requests: Vec<ToolCallRequest>,
    ) -> Result<(), RunError> {
        let mut cancelled = false;
        let mut pending = Vec::with_capacity(requests.len());

        for req in requests {
            if self.cancellation.is_cancelled() {
                cancelled = true;
                break;
            }
            let ToolCallRequest {
                id,
                name,
                arguments,
            } = req;
            match self.registry.get(&name) {
                Some(tool) => {
                    trace!("spawning tool {name} ({id}) with args: {arguments:?}");
                    let handle = tokio::spawn(async move {
                        tool.execute(arguments).await
                    });
                    pending.push((id, PendingResult::Spawned(handle)));
                }
                None => {
                    warn!("tool not found: {name}");
                    pending.push((
                        id,
                        PendingResult::Ready(Err(ToolError::execution_error()
                            .with_reason(format!(
                                "tool `{name}` is not available"
                            )))),
                    ));
                }
            }
        }

        // Results are appended in request order regardless of which tool
        // finishes first. Tools that already started run to completion
        // even when the run is being cancelled.
        for (id, pending_result) in pending {
            let result = match pending_result {
                PendingResult::Spawned(handle) => match handle.await {
                    Ok(result) => result,
                    Err(err) => Err(ToolError::execution_error().with_reason(
                        if err.is_panic() {
                            "tool panicked".to_owned()
                        } else {
                            "tool task was aborted".to_owned()
                        },
                    )),
                },
                PendingResult::Ready(result) => result,
            };
            let content = match result {
                Ok(text) => text,
                // Failures are reported back to the model as the call's
                // result, so it can correct itself on the next turn.
                Err(err) => format!("Error: {}", err.reason()),
            };
            trace!("tool result ({id}): {content}");
            self.conversation
                .push(ModelMessage::Tool(ToolCallResult { id, content }));
        }

        if cancelled {
            return Err(RunError::Cancelled);
        }
        Ok(())
    }
}
