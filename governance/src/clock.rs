//! Ledger height source

use civitas_core::Height;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Read-only view of the hosting ledger's current height.
pub trait Clock: Send + Sync {
    fn height(&self) -> Height;
}

/// Height that only moves when told to. Clones share the same counter, so a
/// test (or the scenario runner) can keep a handle and advance the engine's
/// view of time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    height: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Height) -> Self {
        Self {
            height: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Mine `blocks` empty heights. Returns the new height.
    pub fn advance(&self, blocks: u64) -> Height {
        self.height.fetch_add(blocks, Ordering::SeqCst) + blocks
    }

    /// Jump forward to `height`. Never moves backwards.
    pub fn advance_to(&self, height: Height) -> Height {
        self.height.fetch_max(height, Ordering::SeqCst).max(height)
    }
}

impl Clock for ManualClock {
    fn height(&self) -> Height {
        self.height.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_height() {
        let clock = ManualClock::new(5);
        let handle = clock.clone();
        assert_eq!(handle.advance(10), 15);
        assert_eq!(clock.height(), 15);
    }

    #[test]
    fn test_advance_to_is_monotonic() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.advance_to(50), 100);
        assert_eq!(clock.advance_to(150), 150);
        assert_eq!(clock.height(), 150);
    }
}
