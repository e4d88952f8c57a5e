//! A model provider for OpenAI-compatible APIs.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use reqwest::{Client, StatusCode, header};
use simple_agent_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelReply, ModelRequest,
};

pub use config::{OpenAIConfig, OpenAIConfigBuilder};

/// Error type for [`OpenAIProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

fn status_error_kind(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Auth,
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
        status if status.is_server_error() => ErrorKind::TransientNetwork,
        _ => ErrorKind::Other,
    }
}

fn transport_error_kind(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() || err.is_connect() {
        ErrorKind::TransientNetwork
    } else {
        ErrorKind::Other
    }
}

/// OpenAI-compatible model provider.
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ModelProvider for OpenAIProvider {
    type Error = Error;

    fn complete(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, Self::Error>> + Send + 'static
    {
        let openai_req = proto::create_request(req, &self.config);
        let resp_fut = self
            .client
            .post(format!("{}{}", self.config.base_url, "/chat/completions"))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .json(&openai_req)
            .send();

        async move {
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(
                        format!("{err}"),
                        transport_error_kind(&err),
                    ));
                }
            };

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                warn!("server returned {status}: {body}");
                return Err(Error::new(
                    format!("server returned {status}: {body}"),
                    status_error_kind(status),
                ));
            }

            let completion: proto::ChatCompletion = match resp.json().await {
                Ok(completion) => completion,
                Err(err) => {
                    return Err(Error::new(
                        format!("undecodable response: {err}"),
                        ErrorKind::InvalidResponse,
                    ));
                }
            };
            trace!("received completion: {completion:?}");

            proto::extract_reply(completion)
                .map_err(|message| Error::new(message, ErrorKind::InvalidResponse))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_kinds() {
        assert_eq!(
            status_error_kind(StatusCode::UNAUTHORIZED),
            ErrorKind::Auth
        );
        assert_eq!(status_error_kind(StatusCode::FORBIDDEN), ErrorKind::Auth);
        assert_eq!(
            status_error_kind(StatusCode::TOO_MANY_REQUESTS),
            ErrorKind::RateLimited
        );
        assert_eq!(
            status_error_kind(StatusCode::BAD_GATEWAY),
            ErrorKind::TransientNetwork
        );
        assert_eq!(
            status_error_kind(StatusCode::BAD_REQUEST),
            ErrorKind::Other
        );
    }
}
