use std::fmt::Debug;

/// Builder for [`BedrockConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BedrockConfigBuilder {
    api_key: String,
    model_id: Option<String>,
    region: Option<String>,
    endpoint: Option<String>,
}

impl BedrockConfigBuilder {
    /// Creates a builder with the given Bedrock API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            model_id: None,
            region: None,
            endpoint: None,
        }
    }

    /// Sets the Bedrock model identifier to invoke.
    #[inline]
    pub fn with_model_id<S: Into<String>>(mut self, model_id: S) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Sets the AWS region the runtime endpoint is derived from.
    #[inline]
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Overrides the runtime endpoint entirely, for local gateways.
    #[inline]
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> BedrockConfig {
        let region = self.region.unwrap_or_else(|| "us-east-1".to_string());
        let endpoint = self.endpoint.unwrap_or_else(|| {
            format!("https://bedrock-runtime.{region}.amazonaws.com")
        });
        BedrockConfig {
            api_key: self.api_key,
            model_id: self.model_id.unwrap_or_else(|| {
                "anthropic.claude-3-sonnet-20240229-v1:0".to_string()
            }),
            endpoint,
        }
    }
}

impl Debug for BedrockConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockConfigBuilder")
            .field("api_key", &"<redacted>")
            .field("model_id", &self.model_id)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Configuration for the Bedrock provider.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BedrockConfig {
    pub(crate) api_key: String,
    pub(crate) model_id: String,
    pub(crate) endpoint: String,
}

impl Debug for BedrockConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockConfig")
            .field("api_key", &"<redacted>")
            .field("model_id", &self.model_id)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_derived_from_region() {
        let config = BedrockConfigBuilder::with_api_key("xxx")
            .with_region("eu-west-1")
            .build();
        assert_eq!(
            config.endpoint,
            "https://bedrock-runtime.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn test_endpoint_override_wins() {
        let config = BedrockConfigBuilder::with_api_key("xxx")
            .with_region("eu-west-1")
            .with_endpoint("http://localhost:8008")
            .build();
        assert_eq!(config.endpoint, "http://localhost:8008");
    }
}
