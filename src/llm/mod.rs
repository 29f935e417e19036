pub mod gemini;
pub mod media;

pub use gemini::generate_video_prompt;

/// Failure of one generation attempt. Every variant is terminal: the attempt
/// is reported to the user as a single message and never retried.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerateError {
    #[error("GEMINI_API_KEY environment variable is not set.")]
    MissingApiKey,
    #[error("Failed to read image {path}: {detail}")]
    ImageRead { path: String, detail: String },
    #[error("Gemini request failed: {0}")]
    Request(String),
    #[error("Gemini request failed with status {status}: {detail}")]
    Api { status: String, detail: String },
    #[error("Gemini returned no text content.")]
    EmptyResponse,
    #[error("Gemini response is not a valid video prompt: {0}")]
    MalformedResponse(String),
}
