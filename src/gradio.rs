/// Gradio HTTP client module.
///
/// This module provides a blocking client for Gradio applications hosted on
/// Hugging Face Spaces, the `TaggingService` seam used by the batch runner, and
/// parsing of Gradio's event-stream responses.
mod client;
mod events;

pub use client::{
    GradioClient, GradioClientBuilder, GradioError, GradioSession, TaggingService, predict_payload,
};
pub use events::{ServerEvent, completion_data, first_string, parse_events};
