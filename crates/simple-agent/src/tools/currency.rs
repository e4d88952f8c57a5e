use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use simple_agent_core::tool::{Error as ToolError, Tool, ToolResult};

#[derive(Deserialize, JsonSchema)]
pub struct ConvertCurrencyToolParameters {
    #[schemars(description = "The amount to convert.")]
    amount: f64,
    #[schemars(description = "The source currency code, e.g. `USD`.")]
    from_currency: String,
    #[schemars(description = "The target currency code, e.g. `EUR`.")]
    to_currency: String,
}

/// A tool that converts an amount between currencies.
///
/// Rates are fixed snapshots relative to USD.
pub struct ConvertCurrencyTool {
    parameter_schema: Value,
}

impl ConvertCurrencyTool {
    /// Creates a new currency conversion tool.
    #[inline]
    pub fn new() -> Self {
        ConvertCurrencyTool {
            parameter_schema: schema_for!(ConvertCurrencyToolParameters)
                .to_value(),
        }
    }
}

impl Default for ConvertCurrencyTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

fn usd_rate(code: &str) -> Option<f64> {
    match code {
        "USD" => Some(1.0),
        "EUR" => Some(0.92),
        "JPY" => Some(153.2),
        "GBP" => Some(0.79),
        _ => None,
    }
}

impl Tool for ConvertCurrencyTool {
    type Input = ConvertCurrencyToolParameters;

    fn name(&self) -> &str {
        "convert_currency"
    }

    fn description(&self) -> &str {
        "Convert an amount between currencies. Supports USD, EUR, JPY and GBP."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: ConvertCurrencyToolParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        async move {
            let from = input.from_currency.to_uppercase();
            let to = input.to_currency.to_uppercase();
            let (Some(from_rate), Some(to_rate)) =
                (usd_rate(&from), usd_rate(&to))
            else {
                return Err(ToolError::execution_error().with_reason(
                    format!("currency not supported: {from} or {to}"),
                ));
            };

            let result = input.amount / from_rate * to_rate;
            Ok(format!("{} {from} = {result:.2} {to}", input.amount))
        }
    }
}
