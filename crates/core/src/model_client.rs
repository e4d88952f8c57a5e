use std::pin::Pin;
use std::sync::Arc;

use simple_agent_model::{
    ModelProvider, ModelProviderError, ModelReply, ModelRequest,
};

type CompleteResult = Result<ModelReply, Box<dyn ModelProviderError>>;
type BoxedCompleteFuture = Pin<Box<dyn Future<Output = CompleteResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(&ModelRequest) -> BoxedCompleteFuture + Send + Sync>;

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            trace!("got a request: {req:?}");
            let fut = provider.complete(req);
            Box::pin(async move {
                match fut.await {
                    Ok(reply) => Ok(reply),
                    Err(err) => {
                        error!("got an error: {err:?}");
                        Err(Box::new(err) as Box<dyn ModelProviderError>)
                    }
                }
            })
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the classified reply.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the returned future abandons
    /// the underlying provider call.
    #[inline]
    pub async fn complete(&self, req: &ModelRequest) -> CompleteResult {
        (self.handler_fn)(req).await
    }
}
