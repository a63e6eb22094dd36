//! Sequence tokens for task families

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic token source for one family of async tasks.
///
/// Every issued task gets a token strictly greater than all earlier ones, so
/// a completion can tell whether it still belongs to the latest request.
#[derive(Debug, Default)]
pub struct TaskSequence {
    latest: AtomicU64,
}

impl TaskSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next token. The first token is 1.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Most recently issued token, 0 before the first issue.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let sequence = TaskSequence::new();
        assert_eq!(sequence.latest(), 0);
        let first = sequence.issue();
        let second = sequence.issue();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert!(sequence.is_latest(second));
        assert!(!sequence.is_latest(first));
    }
}
