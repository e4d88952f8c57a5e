mod builder;
mod run;
#[cfg(test)]
mod tests;

use std::fmt;

use tracing::Instrument;

use crate::cancel::CancellationToken;
use crate::conversation::Conversation;
use crate::model_client::ModelClient;
use crate::tool::Registry;
pub use builder::{AgentBuilder, ConfigError, RetryPolicy};
pub use run::{RunError, RunResult};
use run::RunLoop;

/// A configured pairing of instructions, a model provider, and a tool
/// set.
///
/// The configuration is immutable after construction; to change it,
/// build a new agent. Every [`run`](Self::run) call owns its own message
/// history, so one agent can serve concurrent runs without any shared
/// mutable state between them.
pub struct Agent {
    name: String,
    instructions: String,
    model_client: ModelClient,
    registry: Registry,
    max_turns: u32,
    retry_policy: RetryPolicy,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("instructions", &self.instructions)
            .field("max_turns", &self.max_turns)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Returns the name of this agent.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Processes one user input to completion.
    ///
    /// Drives the model/tool loop until the model produces a final
    /// answer, a non-retryable model failure occurs, or the turn limit
    /// trips.
    pub async fn run(&self, input: &str) -> Result<RunResult, RunError> {
        self.run_with_cancellation(input, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), with a caller-supplied cancellation
    /// token.
    ///
    /// Cancellation is observed before the next model call or tool
    /// execution; a tool that already started is allowed to finish
    /// before the run returns [`RunError::Cancelled`].
    pub async fn run_with_cancellation(
        &self,
        input: &str,
        cancellation: CancellationToken,
    ) -> Result<RunResult, RunError> {
        let conversation = Conversation::seeded(&self.instructions, input);
        let run_loop = RunLoop::new(
            &self.model_client,
            &self.registry,
            &self.retry_policy,
            self.max_turns,
            cancellation,
            conversation,
        );
        run_loop
            .run()
            .instrument(debug_span!("agent run", agent = %self.name))
            .await
    }
}
