//! AI provider integration for structured text generation
//!
//! Provides the boundary to Gemini's `generateContent` API: an instruction,
//! an optional system instruction and inline attachment, and a response
//! schema in; a single JSON text payload out.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiTextClient;
pub use mock::MockTextGenerationClient;

use crate::schema::Schema;
use crate::Result;
use async_trait::async_trait;

/// Binary payload sent inline next to the instruction text.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Provider-agnostic description of one schema-constrained generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub instruction: String,
    pub system_instruction: Option<String>,
    pub attachment: Option<Attachment>,
    pub response_schema: Schema,
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Returns the raw text the model produced, expected to be JSON
    /// conforming to `request.response_schema`.
    async fn generate_json(&self, request: &ModelRequest) -> Result<String>;
}
