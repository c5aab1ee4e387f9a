//! rehearse-providers: text-generation backends.
//!
//! Implements the `GenerationProvider` trait for Anthropic, OpenAI, and
//! Ollama, plus a scripted mock used by tests and offline demos.

pub mod anthropic;
pub mod config;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, ProviderConfig, RehearseConfig};
pub use rehearse_core::error::GenerationFailure;
