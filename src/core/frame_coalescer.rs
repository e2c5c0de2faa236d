//! Frame coalescer - at most one commit per repaint.
//!
//! Pointer moves can arrive many times per frame. Instead of committing each:
//! 1. `schedule()` keeps only the latest value (later calls overwrite)
//! 2. `take_frame()` hands it out once per frame, from the update loop
//!
//! `cancel()` drops the pending value so nothing stale is applied; the
//! gesture's pointer-up commit bypasses the coalescer entirely.

/// Latest-value slot drained once per frame.
#[derive(Debug, Clone)]
pub struct FrameCoalescer<T> {
    pending: Option<T>,
    /// Values overwritten before reaching a frame (diagnostics)
    coalesced: u64,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self {
            pending: None,
            coalesced: 0,
        }
    }
}

impl<T> FrameCoalescer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for the next frame, replacing any earlier one.
    pub fn schedule(&mut self, value: T) {
        if self.pending.replace(value).is_some() {
            self.coalesced += 1;
            log::trace!("FrameCoalescer: coalesced update ({} total)", self.coalesced);
        }
    }

    /// Called once per frame: returns the pending value, if any.
    pub fn take_frame(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Drop any pending value.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            log::trace!("FrameCoalescer: cancelled pending update");
        }
    }

    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_value_wins() {
        let mut c = FrameCoalescer::new();
        c.schedule(1);
        c.schedule(2);
        c.schedule(3);
        assert_eq!(c.coalesced_count(), 2);
        assert_eq!(c.take_frame(), Some(3));
        // only one commit per frame
        assert_eq!(c.take_frame(), None);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut c = FrameCoalescer::new();
        c.schedule("a");
        c.cancel();
        assert_eq!(c.take_frame(), None);
        // counter keeps running across cancels
        c.schedule("b");
        c.schedule("c");
        assert_eq!(c.coalesced_count(), 1);
        assert_eq!(c.take_frame(), Some("c"));
    }
}
