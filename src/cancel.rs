//! A watchable, one-shot cancellation token: an atomic flag plus a deadline.
//!
//! Replaces the source's promise/future cancellation pattern per `SPEC_FULL.md` §12.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    #[must_use]
    pub fn new(deadline: Option<Instant>) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline,
        }
    }

    /// Never-cancels token with no deadline, for tests and the `any`/single-slot bypass path.
    #[must_use]
    pub fn never() -> Self {
        Self::new(None)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.is_past_deadline()
    }

    #[must_use]
    pub fn is_past_deadline(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    #[must_use]
    pub fn remaining(&self) -> Option<std::time::Duration> {
        self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// A child token sharing this one's cancellation flag but with its own (tighter) deadline.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let merged = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            flag: Arc::clone(&self.flag),
            deadline: Some(merged),
        }
    }
}
