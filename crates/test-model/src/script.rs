use std::sync::{Arc, Mutex};

use simple_agent_model::{ErrorKind, ModelReply, ModelRequest};

/// One step of a conversation script.
#[derive(Clone, Debug)]
pub enum ScriptStep {
    /// Resolve the request with this reply.
    Reply(ModelReply),
    /// Fail the request.
    Failure {
        /// The kind the resulting error reports.
        kind: ErrorKind,
        /// The error message.
        message: String,
    },
}

/// A shared log of the requests a [`TestModelProvider`] received.
///
/// Cloning the log returns a handle to the same underlying storage, so a
/// test can keep one handle while the provider is moved into an agent.
///
/// [`TestModelProvider`]: crate::TestModelProvider
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<ModelRequest>>>);

impl CallLog {
    /// Returns the number of recorded requests.
    pub fn len(&self) -> usize {
        self.0.lock().expect("call log lock poisoned").len()
    }

    /// Returns `true` if no request has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the recorded requests.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.0.lock().expect("call log lock poisoned").clone()
    }

    pub(crate) fn record(&self, req: ModelRequest) {
        self.0.lock().expect("call log lock poisoned").push(req);
    }
}
