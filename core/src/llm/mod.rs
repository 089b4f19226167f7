//! LLM module: Gemini configuration, HTTP client and wire types
//!
//! This module provides:
//! - `GeminiConfig` loaded from environment variables
//! - `GenerationBackend`, the seam between the invoker and the provider
//! - `GeminiClient`, the `generateContent` HTTP implementation
//! - serde types mirroring the provider's request/response JSON

mod client;
mod config;
mod wire;

pub use client::{GeminiClient, GenerationBackend};
pub use config::GeminiConfig;
pub use wire::{
    ApiError, ApiErrorBody, Candidate, CitationMetadata, CitationSource, Content,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, GroundingChunk,
    GroundingMetadata, InlineData, Part, PromptFeedback, WebChunk,
};
