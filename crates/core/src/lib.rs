//! Core logic including the agent run loop, tool execution, and
//! configuration.
//!
//! The entry point is [`AgentBuilder`], which pairs a model provider with
//! a set of tools and produces an [`Agent`]. Each [`Agent::run`] call
//! drives one conversation from user input to a final answer: the model
//! is asked for the next action, requested tools are executed, their
//! results are appended to the history, and the loop repeats until the
//! model produces a final answer or a safety bound trips.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
mod cancel;
pub mod conversation;
mod model_client;
pub mod tool;

pub use agent::{
    Agent, AgentBuilder, ConfigError, RetryPolicy, RunError, RunResult,
};
pub use cancel::CancellationToken;
