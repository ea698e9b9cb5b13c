//! Language-model implementations of the [`Ai`](crate::traits::Ai) trait.

mod openai;

pub use openai::OpenAiClient;
