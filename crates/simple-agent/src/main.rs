//! A command line agent with a couple of demo tools.
//!
//! Set `OPENAI_API_KEY` or `BEDROCK_API_KEY` to select the model
//! provider, then chat with the agent line by line.

#[macro_use]
extern crate tracing;

mod tools;

use std::env;
use std::io::Write as _;

use owo_colors::OwoColorize;
use simple_agent_bedrock_model::{BedrockConfigBuilder, BedrockProvider};
use simple_agent_core::{Agent, AgentBuilder};
use simple_agent_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use tokio::io::{self, AsyncBufReadExt};

use tools::{ConvertCurrencyTool, WeatherTool};

const BAR_CHAR: &str = "▎";

const INSTRUCTIONS: &str = "\
You are a helpful assistant that can provide information and use tools.
When asked about weather or currency conversion, use the appropriate tools.
Be friendly and concise in your responses.";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let agent = match build_agent() {
        Ok(agent) => agent,
        Err(message) => {
            eprintln!("{message}");
            return;
        }
    };

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match agent.run(line).await {
            Ok(result) => {
                println!(
                    "{}🤖 {}",
                    BAR_CHAR.bright_cyan(),
                    result.output().bright_white()
                );
            }
            Err(err) => {
                eprintln!("{}", format!("run failed: {err}").bright_red());
            }
        }
    }
}

/// Builds the agent from environment variables.
///
/// `BEDROCK_API_KEY` takes precedence; `OPENAI_API_KEY` is the fallback.
fn build_agent() -> Result<Agent, String> {
    let builder = if let Ok(api_key) = env::var("BEDROCK_API_KEY") {
        info!("using the Bedrock model provider");
        let mut config = BedrockConfigBuilder::with_api_key(api_key);
        if let Ok(model_id) = env::var("BEDROCK_MODEL_ID") {
            config = config.with_model_id(model_id);
        }
        if let Ok(region) = env::var("AWS_REGION") {
            config = config.with_region(region);
        }
        AgentBuilder::with_model_provider(BedrockProvider::new(config.build()))
    } else if let Ok(api_key) = env::var("OPENAI_API_KEY") {
        info!("using the OpenAI model provider");
        let mut config = OpenAIConfigBuilder::with_api_key(api_key);
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(model) = env::var("OPENAI_MODEL") {
            config = config.with_model(model);
        }
        AgentBuilder::with_model_provider(OpenAIProvider::new(config.build()))
    } else {
        return Err(
            "set OPENAI_API_KEY or BEDROCK_API_KEY to select a model provider"
                .to_owned(),
        );
    };

    builder
        .with_name("HelperAssistant")
        .with_instructions(INSTRUCTIONS)
        .with_tool(WeatherTool::new())
        .with_tool(ConvertCurrencyTool::new())
        .build()
        .map_err(|err| format!("invalid agent configuration: {err}"))
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
