//! An abstraction layer for different LLMs.
//!
//! This crate establishes an unified protocol for the agent to interact
//! with various supported LLMs, so that the agent can seamlessly switch
//! between them without modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to. An adapter crate
//! is responsible for translating these types to its provider's wire
//! format, classifying the provider's reply, and mapping its failures to
//! a uniform [`ErrorKind`] so no provider-specific error ever reaches
//! the agent.

#![deny(missing_docs)]

mod error;
mod provider;
mod reply;
mod request;

pub use error::*;
pub use provider::*;
pub use reply::*;
pub use request::*;
