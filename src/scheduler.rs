use std::time::{Duration, Instant};

/// Fixed-interval tick scheduler. The host loop sleeps (polls input) for
/// `until_next()` and steps the game when `tick_due()` fires. Speeding up
/// goes through `reschedule`, which drops the pending deadline and arms a
/// fresh one at the new interval.
pub struct TickScheduler {
    interval: Duration,
    next_tick: Instant,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        TickScheduler { interval, next_tick: Instant::now() + interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Cancel the pending tick and arm the next one `interval` from now.
    pub fn reschedule(&mut self, interval: Duration) {
        self.interval = interval;
        self.next_tick = Instant::now() + interval;
    }

    /// Time left until the pending tick, zero if it is already due.
    pub fn until_next(&self) -> Duration {
        self.next_tick.saturating_duration_since(Instant::now())
    }

    /// True when the pending tick has come due; advances the deadline by
    /// one interval. After a stall the deadline re-arms from now instead of
    /// queueing a burst of catch-up ticks.
    pub fn tick_due(&mut self) -> bool {
        let now = Instant::now();
        if now < self.next_tick {
            return false;
        }
        self.next_tick += self.interval;
        if self.next_tick <= now {
            self.next_tick = now + self.interval;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn not_due_before_the_interval_elapses() {
        let mut sched = TickScheduler::new(Duration::from_millis(50));
        assert!(!sched.tick_due());
        assert!(sched.until_next() <= Duration::from_millis(50));
    }

    #[test]
    fn due_after_the_interval_then_rearms() {
        let mut sched = TickScheduler::new(Duration::from_millis(5));
        sleep(Duration::from_millis(10));
        assert!(sched.tick_due());
        // The deadline re-armed; an immediate second poll is not due yet
        // unless another full interval has passed.
        assert!(sched.until_next() <= Duration::from_millis(5));
    }

    #[test]
    fn reschedule_replaces_the_pending_deadline() {
        let mut sched = TickScheduler::new(Duration::from_millis(1));
        sleep(Duration::from_millis(3));
        sched.reschedule(Duration::from_millis(60));
        assert_eq!(sched.interval(), Duration::from_millis(60));
        // The old overdue deadline is gone.
        assert!(!sched.tick_due());
        assert!(sched.until_next() > Duration::from_millis(30));
    }
}
