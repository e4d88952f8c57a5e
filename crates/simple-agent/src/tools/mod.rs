//! The demo tools exposed by the command line agent.

mod currency;
mod weather;

pub use currency::ConvertCurrencyTool;
pub use weather::WeatherTool;
