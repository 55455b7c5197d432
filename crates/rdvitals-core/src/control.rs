//! Cooperative cancellation for in-flight downloads.
//!
//! A download loop holding an `AbortFlag` checks it on every body chunk;
//! when set, the transfer stops, the partial file is removed, and the
//! caller sees `DownloadError::Aborted`. Cleanup happens before the abort
//! is observed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort token. Clone it and hand one side to the download call,
/// keep the other to request cancellation from any thread or task.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the associated download stop at the next chunk boundary.
    pub fn request_abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once an abort has been requested.
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_is_visible_across_clones() {
        let flag = AbortFlag::new();
        let other = flag.clone();
        assert!(!other.is_aborted());
        flag.request_abort();
        assert!(other.is_aborted());
    }
}
