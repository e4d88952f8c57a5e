use std::error::Error;

use crate::error::ErrorKind;
use crate::reply::ModelReply;
use crate::request::ModelRequest;

/// The error type for a model provider.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a model provider, which is an entry for sending
/// completion requests to a concrete backend.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state (a connection pool, for example), but
/// callers should not rely on it, and the provider should be prepared for
/// being dropped anytime. Credentials are validated by the backend at the
/// first call, never at construction.
pub trait ModelProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Sends the request and resolves to a classified reply.
    ///
    /// The returned future must not borrow `self` or `req`, so that the
    /// in-flight call can outlive both borrows.
    fn complete(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, Self::Error>> + Send + 'static;
}
