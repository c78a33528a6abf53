//! Language understanding for HomeLink.
//!
//! Free-text operator commands are turned into structured
//! [`Intent`](homelink_core::Intent)s by prompting an external
//! chat-completion service with the current device snapshot and a set of
//! worked examples. The service sits behind the narrow [`LlmBackend`] trait
//! so the translator is testable without network access, and every failure
//! of the external call collapses into a fixed fallback intent — callers
//! never see an error from translation.

pub mod backend;
pub mod backends;
pub mod translator;

pub use backend::{LlmBackend, LlmError};
pub use backends::openai::{OpenAiBackend, OpenAiConfig};
pub use translator::IntentTranslator;
