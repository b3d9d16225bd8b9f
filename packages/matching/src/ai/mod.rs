//! Chat backends for the matching library.
//!
//! Reference implementations of the `ChatModel` trait.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiChat;
