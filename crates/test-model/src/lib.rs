//! A local fake model for testing purpose.

mod script;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use simple_agent_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelReply, ModelRequest,
};
use tokio::time::sleep;

pub use script::*;

/// The error type returned by [`TestModelProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to set up the conversation script,
/// which is how the model should respond to each request. Steps are
/// consumed in order, one per `complete` call. When the script runs out,
/// an error is returned.
///
/// Every received request is recorded in a [`CallLog`] that can be
/// obtained with [`call_log`](Self::call_log) before handing the provider
/// to an agent.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<VecDeque<ScriptStep>>>,
    calls: CallLog,
    delay: Option<Duration>,
}

impl TestModelProvider {
    /// Creates a provider with an empty script.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a reply step to the script.
    pub fn push_reply(&mut self, reply: ModelReply) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(ScriptStep::Reply(reply));
    }

    /// Appends a failure step to the script.
    pub fn push_failure<S: Into<String>>(
        &mut self,
        kind: ErrorKind,
        message: S,
    ) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(ScriptStep::Failure {
                kind,
                message: message.into(),
            });
    }

    /// Sets an artificial delay applied before each step resolves.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns a handle to the log of received requests.
    #[inline]
    pub fn call_log(&self) -> CallLog {
        self.calls.clone()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = Error;

    fn complete(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, Self::Error>> + Send + 'static
    {
        self.calls.record(req.clone());

        let script = Arc::clone(&self.script);
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            let step = script.lock().expect("script lock poisoned").pop_front();
            match step {
                Some(ScriptStep::Reply(reply)) => Ok(reply),
                Some(ScriptStep::Failure { kind, message }) => {
                    Err(Error { message, kind })
                }
                None => Err(Error {
                    message: "conversation script exhausted".to_owned(),
                    kind: ErrorKind::Other,
                }),
            }
        }
    }
}
