// actimon — Time source and periodic pacing
//
// Every sleep in the firmware goes through a `Clock`, so sample pacing and
// task periods can be driven by virtual time under test.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic time since boot.
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration);

    fn now_ms(&self) -> u64 {
        self.now().as_millis() as u64
    }

    fn sleep_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            self.sleep(deadline - now);
        }
    }
}

/// Wall-clock time measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    boot: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { boot: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.boot.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Virtual time: `sleep` advances the clock instantly. Clones share time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.micros.fetch_add(duration.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Fixed-period deadline grid.
///
/// If the caller is still busy when a deadline passes, the next `wait` returns
/// immediately (the tick is deferred, never run alongside the previous one)
/// and any further grid points already in the past are dropped.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Duration,
}

impl Ticker {
    /// First tick fires at `start`.
    pub fn new(period: Duration, start: Duration) -> Self {
        assert!(!period.is_zero(), "ticker period must be non-zero");
        Self { period, next: start }
    }

    pub fn next_deadline(&self) -> Duration {
        self.next
    }

    /// Block until the next tick. Returns how many ticks were dropped because
    /// the caller overran them.
    pub fn wait<C: Clock>(&mut self, clock: &C) -> u32 {
        clock.sleep_until(self.next);
        let fired_at = clock.now().max(self.next);

        self.next += self.period;
        let mut skipped = 0;
        while self.next <= fired_at {
            self.next += self.period;
            skipped += 1;
        }
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn test_manual_clock_sleep_advances_shared_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.sleep(Duration::from_millis(250));
        assert_eq!(other.now_ms(), 250);
    }

    #[test]
    fn test_ticker_keeps_grid_when_on_time() {
        let clock = ManualClock::new();
        let mut ticker = Ticker::new(5 * SEC, Duration::ZERO);

        assert_eq!(ticker.wait(&clock), 0);
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance(Duration::from_millis(1200)); // work inside the period
        assert_eq!(ticker.wait(&clock), 0);
        assert_eq!(clock.now(), 5 * SEC);

        assert_eq!(ticker.wait(&clock), 0);
        assert_eq!(clock.now(), 10 * SEC);
    }

    #[test]
    fn test_overrun_defers_next_tick_and_drops_the_rest() {
        let clock = ManualClock::new();
        let mut ticker = Ticker::new(5 * SEC, Duration::ZERO);
        ticker.wait(&clock);

        // A 12 s cycle overruns the ticks at 5 s and 10 s.
        clock.advance(12 * SEC);
        let skipped = ticker.wait(&clock);

        // The deferred tick fires immediately; the one at 10 s is dropped.
        assert_eq!(clock.now(), 12 * SEC);
        assert_eq!(skipped, 1);
        assert_eq!(ticker.next_deadline(), 15 * SEC);

        assert_eq!(ticker.wait(&clock), 0);
        assert_eq!(clock.now(), 15 * SEC);
    }

    #[test]
    fn test_monotonic_clock_moves_forward() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        clock.sleep(Duration::from_millis(2));
        assert!(clock.now() > a);
    }
}
