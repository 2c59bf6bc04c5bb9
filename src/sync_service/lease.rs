use std::sync::Arc;

use dashmap::DashSet;

///
/// Process-local registry of terms with a synchronization in flight
///
#[derive(Clone, Default)]
pub struct SyncLeases {
    held: Arc<DashSet<String>>,
}

impl SyncLeases {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Takes the lease for `term_code`, or returns `None` if another
    /// synchronization of the same term currently holds it
    ///
    pub fn acquire(&self, term_code: &str) -> Option<SyncLease> {
        if !self.held.insert(term_code.to_string()) {
            return None;
        }
        Some(SyncLease { term_code: term_code.to_string(), held: Arc::clone(&self.held) })
    }

    pub fn is_held(&self, term_code: &str) -> bool {
        self.held.contains(term_code)
    }
}

/// Releases its term when dropped, whether the run finished, failed or was aborted
pub struct SyncLease {
    term_code: String,
    held: Arc<DashSet<String>>,
}

impl SyncLease {
    pub fn term_code(&self) -> &str {
        &self.term_code
    }
}

impl Drop for SyncLease {
    fn drop(&mut self) {
        self.held.remove(&self.term_code);
    }
}
