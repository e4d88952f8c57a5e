//! A model provider for the AWS Bedrock Converse API.
//!
//! Talks to the runtime endpoint directly over HTTP using a Bedrock API
//! key; SigV4 signing and credential resolution are out of scope.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use reqwest::{Client, Response, StatusCode, header};
use simple_agent_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelReply, ModelRequest,
};

pub use config::{BedrockConfig, BedrockConfigBuilder};

/// Error type for [`BedrockProvider`].
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

fn response_error_kind(resp: &Response) -> ErrorKind {
    // Bedrock reports the exception class in a response header; it is
    // more precise than the status code alone.
    let error_type = resp
        .headers()
        .get("x-amzn-errortype")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if error_type.starts_with("ThrottlingException") {
        return ErrorKind::RateLimited;
    }
    if error_type.starts_with("ServiceUnavailableException")
        || error_type.starts_with("ModelNotReadyException")
    {
        return ErrorKind::TransientNetwork;
    }

    match resp.status() {
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

/// AWS Bedrock model provider.
#[derive(Clone, Debug)]
pub struct BedrockProvider {
    client: Client,
    config: Arc<BedrockConfig>,
}

impl BedrockProvider {
    /// Creates a new `BedrockProvider` with the given configuration.
    #[inline]
    pub fn new(config: BedrockConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ModelProvider for BedrockProvider {
    type Error = Error;

    fn complete(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, Self::Error>> + Send + 'static
    {
        let converse_req = proto::create_request(req);
        let resp_fut = self
            .client
            .post(format!(
                "{}/model/{}/converse",
                self.config.endpoint, self.config.model_id
            ))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .json(&converse_req)
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

            if !resp.status().is_success() {
                let kind = response_error_kind(&resp);
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                warn!("server returned {status}: {body}");
                return Err(Error::new(
                    format!("server returned {status}: {body}"),
                    kind,
                ));
            }

            let converse_resp: proto::ConverseResponse = match resp
                .json()
                .await
            {
                Ok(converse_resp) => converse_resp,
                Err(err) => {
                    return Err(Error::new(
                        format!("undecodable response: {err}"),
                        ErrorKind::InvalidResponse,
                    ));
                }
            };
            trace!("received response: {converse_resp:?}");

            proto::extract_reply(converse_resp)
                .map_err(|message| Error::new(message, ErrorKind::InvalidResponse))
        }
    }
}
