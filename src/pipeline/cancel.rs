//! Cooperative cancellation for streaming passes
//!
//! A pass checks the token before pulling each batch. Cancellation is
//! coarse: the pass stops and its partial aggregation is dropped, there is
//! no checkpoint to resume from.

use super::error::{PipelineError, PipelineResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stop signal shared between a running pipeline and whoever supervises it.
///
/// Clones share state, so a token handed to a pipeline can be cancelled
/// from another thread (a signal handler, a supervising task).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that running passes stop at their next batch boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Batch boundary check for the pass named `stage`.
    pub fn checkpoint(&self, stage: &str) -> PipelineResult<()> {
        if self.is_cancelled() {
            Err(PipelineError::Cancelled {
                stage: stage.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_passes_until_cancelled() {
        let token = CancellationToken::new();
        assert!(token.checkpoint("discovery").is_ok());

        token.clone().cancel();
        match token.checkpoint("weighting") {
            Err(PipelineError::Cancelled { stage }) => assert_eq!(stage, "weighting"),
            other => panic!("expected cancellation, got {:?}", other),
        }
    }
}
