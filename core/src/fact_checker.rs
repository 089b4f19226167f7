use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::{AnalysisRequest, AnalysisResult};
use crate::invoker::ModelInvoker;
use crate::llm::{GeminiClient, GenerationBackend};
use crate::parser::parse_reply;
use crate::progress::ProgressSink;
use crate::prompt::build_prompt;
use crate::Result;

/// Public entry point: build → invoke → parse.
///
/// Holds only the shared backend handle, so one instance can serve
/// concurrent calls. There is no timeout or cancellation here; wrap
/// `analyze` in `tokio::time::timeout` when latency must be bounded.
#[derive(Clone)]
pub struct FactChecker {
    invoker: ModelInvoker,
}

impl FactChecker {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            invoker: ModelInvoker::new(backend),
        }
    }

    /// Gemini-backed checker configured from the environment
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Arc::new(GeminiClient::from_env()?)))
    }

    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        progress: &dyn ProgressSink,
    ) -> Result<AnalysisResult> {
        let outcome: Result<AnalysisResult> = async {
            let payload = build_prompt(request)?;
            let reply = self.invoker.invoke(&payload, progress).await?;
            parse_reply(&reply)
        }
        .await;

        match &outcome {
            Ok(result) => info!(
                target = "verity::fact_checker",
                verdict = %result.verdict,
                confidence = result.confidence_score,
                sources = result.sources.len(),
                "Analysis complete"
            ),
            Err(e) => warn!(target = "verity::fact_checker", error = %e, "Analysis failed"),
        }
        outcome
    }
}
