use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use simple_agent_core::tool::{Tool, ToolResult};

#[derive(Deserialize, JsonSchema)]
pub struct WeatherToolParameters {
    #[schemars(description = "The city or location to get weather for.")]
    location: String,
}

/// A tool that reports the current weather for a location.
///
/// Uses a small set of canned observations; a real deployment would call
/// a weather API here.
pub struct WeatherTool {
    parameter_schema: Value,
}

impl WeatherTool {
    /// Creates a new weather tool.
    #[inline]
    pub fn new() -> Self {
        WeatherTool {
            parameter_schema: schema_for!(WeatherToolParameters).to_value(),
        }
    }
}

impl Default for WeatherTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WeatherTool {
    type Input = WeatherToolParameters;

    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather for a location."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: WeatherToolParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        async move {
            let report = match input.location.as_str() {
                "San Francisco" => "Foggy, 60°F".to_owned(),
                "New York" => "Partly cloudy, 72°F".to_owned(),
                "London" => "Rainy, 55°F".to_owned(),
                "Tokyo" => "Sunny, 80°F".to_owned(),
                other => {
                    format!("Weather data not available for {other}")
                }
            };
            Ok(report)
        }
    }
}
