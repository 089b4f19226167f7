use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::llm::{GenerateContentResponse, GenerationBackend};
use crate::progress::{ProgressSink, ProgressStage};
use crate::prompt::PromptPayload;
use crate::{Result, VerityError};

/// Primary text of a model response plus the response it came from
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub raw: GenerateContentResponse,
}

/// Dispatches a built prompt to the backend and narrates progress
#[derive(Clone)]
pub struct ModelInvoker {
    backend: Arc<dyn GenerationBackend>,
}

impl ModelInvoker {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// One backend call, no retry.
    /// Contract:
    /// - Emits `Initializing`, then `CrossReferencing` right before dispatch,
    ///   then `Synthesizing` once a response arrived
    /// - Output: the first candidate's text
    /// - Error: whatever the backend raised, or a request error when the
    ///   response carries no text
    pub async fn invoke(
        &self,
        payload: &PromptPayload,
        progress: &dyn ProgressSink,
    ) -> Result<ModelReply> {
        progress.emit(ProgressStage::Initializing);
        let request = payload.to_request();

        progress.emit(ProgressStage::CrossReferencing);
        let started = Instant::now();
        let raw = self.backend.generate_content(&request).await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        progress.emit(ProgressStage::Synthesizing);
        debug!(
            target = "verity::invoker",
            latency_ms,
            candidates = raw.candidates.len(),
            model_version = ?raw.model_version,
            "Model responded"
        );

        match raw.text() {
            Some(text) => {
                info!(
                    target = "verity::invoker",
                    latency_ms,
                    chars = text.chars().count(),
                    "Model reply received"
                );
                Ok(ModelReply { text, raw })
            }
            None => {
                let err = match raw.block_reason() {
                    Some(reason) => VerityError::request(format!(
                        "The model refused to analyze this content (blocked: {reason})"
                    )),
                    None => {
                        let finish = raw
                            .first_candidate()
                            .and_then(|c| c.finish_reason.clone())
                            .unwrap_or_else(|| "no candidates".to_string());
                        VerityError::request(format!(
                            "The model returned no text (finish reason: {finish})"
                        ))
                    }
                };
                warn!(target = "verity::invoker", error = %err, "Empty model reply");
                Err(err)
            }
        }
    }
}
