//! Timer-based coalescing of bursty updates.

/// Coalesces a burst of values into one, emitted once the burst settles.
///
/// Every [`queue`](Self::queue) replaces the pending value and restarts the
/// window (cancel-and-reschedule). Times are caller-supplied milliseconds so
/// the debouncer stays deterministic under test.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: u64,
    pending: Option<(T, u64)>,
}

impl<T> Debouncer<T> {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn queue(&mut self, value: T, now_ms: u64) {
        self.pending = Some((value, now_ms));
    }

    /// Take the pending value if its window has elapsed.
    pub fn take_ready(&mut self, now_ms: u64) -> Option<T> {
        let queued_at = self.pending.as_ref()?.1;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// Take the pending value immediately, bypassing the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Milliseconds until the pending value becomes ready.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        let (_, queued_at) = self.pending.as_ref()?;
        Some(
            self.delay_ms
                .saturating_sub(now_ms.saturating_sub(*queued_at)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_within_window_yields_last_value_once() {
        let mut debouncer = Debouncer::new(300);
        let mut renders = Vec::new();
        for (i, t) in [0_u64, 50, 100, 150, 200].into_iter().enumerate() {
            debouncer.queue(i, t);
            if let Some(v) = debouncer.take_ready(t) {
                renders.push(v);
            }
        }
        for t in (200..=600).step_by(10) {
            if let Some(v) = debouncer.take_ready(t) {
                renders.push(v);
            }
        }
        assert_eq!(renders, vec![4]);
    }

    #[test]
    fn test_spaced_edits_each_render() {
        let mut debouncer = Debouncer::new(300);
        let mut renders = Vec::new();
        for i in 0..4_u64 {
            let t = i * 1000;
            debouncer.queue(i, t);
            if let Some(v) = debouncer.take_ready(t + 300) {
                renders.push(v);
            }
        }
        assert_eq!(renders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_requeue_restarts_window() {
        let mut debouncer = Debouncer::new(100);
        debouncer.queue("a", 0);
        debouncer.queue("b", 90);
        assert_eq!(debouncer.take_ready(150), None);
        assert_eq!(debouncer.take_ready(190), Some("b"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_flush_bypasses_window() {
        let mut debouncer = Debouncer::new(300);
        debouncer.queue(7, 0);
        assert_eq!(debouncer.flush(), Some(7));
        assert_eq!(debouncer.take_ready(1000), None);
    }

    #[test]
    fn test_remaining_ms() {
        let mut debouncer = Debouncer::new(300);
        assert_eq!(debouncer.remaining_ms(0), None);
        debouncer.queue((), 100);
        assert_eq!(debouncer.remaining_ms(250), Some(150));
        assert_eq!(debouncer.remaining_ms(900), Some(0));
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut debouncer = Debouncer::new(10);
        debouncer.queue(1, 0);
        debouncer.cancel();
        assert_eq!(debouncer.take_ready(100), None);
    }
}
