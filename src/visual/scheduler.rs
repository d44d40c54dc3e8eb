//! Frame requests and delayed reversions.
//!
//! [`FrameScheduler`] hands out handles for "run on the next display tick",
//! which the front end drains once per tick. A canceled handle is never
//! returned. [`Timers`] holds the short-lived visual reversions scheduled by
//! beat reactors; they cannot be canceled and run once their deadline passes.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    pub fn cancel(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// Handles due on this tick. Requests made while handling them wait for the next tick.
    pub fn take_ready(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Undo step for a transient beat effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reversion {
    CoverPop,
    Marker(usize),
    Circle(usize),
}

#[derive(Debug, Default)]
pub struct Timers {
    queue: Vec<(f64, Reversion)>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, reversion: Reversion) {
        self.queue.push((now_ms + delay_ms, reversion));
    }

    /// Remove and return every reversion whose deadline is at or before `now_ms`, earliest first.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<Reversion> {
        let mut due: Vec<(f64, Reversion)> = Vec::new();
        self.queue.retain(|&(deadline, reversion)| {
            if deadline <= now_ms {
                due.push((deadline, reversion));
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, r)| r).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_take() {
        let mut scheduler = FrameScheduler::new();
        let a = scheduler.request();
        let b = scheduler.request();
        assert_ne!(a, b);
        assert_eq!(scheduler.take_ready(), vec![a, b]);
        assert!(scheduler.take_ready().is_empty());
    }

    #[test]
    fn test_canceled_handle_never_runs() {
        let mut scheduler = FrameScheduler::new();
        let a = scheduler.request();
        scheduler.cancel(a);
        assert!(!scheduler.is_pending(a));
        assert!(scheduler.take_ready().is_empty());
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let mut timers = Timers::new();
        timers.schedule(0.0, 300.0, Reversion::Circle(2));
        timers.schedule(0.0, 140.0, Reversion::CoverPop);
        timers.schedule(10.0, 160.0, Reversion::Marker(0));

        assert!(timers.take_due(100.0).is_empty());
        assert_eq!(
            timers.take_due(200.0),
            vec![Reversion::CoverPop, Reversion::Marker(0)]
        );
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.take_due(300.0), vec![Reversion::Circle(2)]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_duplicate_reversions_are_kept() {
        let mut timers = Timers::new();
        timers.schedule(0.0, 140.0, Reversion::CoverPop);
        timers.schedule(50.0, 140.0, Reversion::CoverPop);
        assert_eq!(timers.take_due(150.0), vec![Reversion::CoverPop]);
        assert_eq!(timers.take_due(200.0), vec![Reversion::CoverPop]);
    }
}
