//! Progress narration for a single analysis.
//!
//! Every invocation walks the same three stages in order. The stages are a
//! display aid layered over one request/response exchange; they do not track
//! network milestones.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    /// Language identification and translation setup
    Initializing,
    /// Request dispatched; cross-referencing sources
    CrossReferencing,
    /// Response received; synthesizing findings
    Synthesizing,
}

impl ProgressStage {
    /// Emission order
    pub const ALL: [ProgressStage; 3] = [
        ProgressStage::Initializing,
        ProgressStage::CrossReferencing,
        ProgressStage::Synthesizing,
    ];

    /// Default English label
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStage::Initializing => "Identifying language and translating...",
            ProgressStage::CrossReferencing => "Connecting to the global knowledge graph...",
            ProgressStage::Synthesizing => "Synthesizing findings...",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives stages synchronously from the invoker
pub trait ProgressSink: Send + Sync {
    fn emit(&self, stage: ProgressStage);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressStage) + Send + Sync,
{
    fn emit(&self, stage: ProgressStage) {
        self(stage)
    }
}

/// Forwards stages into an unbounded channel; a dropped receiver is ignored
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: mpsc::UnboundedSender<ProgressStage>,
}

impl ChannelProgress {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressStage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn emit(&self, stage: ProgressStage) {
        let _ = self.tx.send(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_progress_survives_dropped_receiver() {
        let (sink, rx) = ChannelProgress::new();
        drop(rx);
        sink.emit(ProgressStage::Initializing);
    }

    #[test]
    fn channel_progress_preserves_order() {
        let (sink, mut rx) = ChannelProgress::new();
        for stage in ProgressStage::ALL {
            sink.emit(stage);
        }
        let got: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(got, ProgressStage::ALL.to_vec());
    }
}
