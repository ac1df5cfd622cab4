//! Idle timer
//!
//! The host owns the clock. It implements [`Scheduler`] and calls back into
//! the session when a scheduled timer fires. [`IdleTimer`] keeps track of
//! the one repeating timer the transient highlighter needs, making sure a
//! re-arm never leaves two timers running.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Scheduling collaborator
pub trait Scheduler {
    /// Fire every `delay` until cancelled.
    ///
    /// Hosts that cannot start a timer return [`HighlightError::Schedule`].
    ///
    /// [`HighlightError::Schedule`]: crate::error::HighlightError::Schedule
    fn schedule_repeating(&mut self, delay: Duration) -> Result<TimerHandle>;

    fn cancel(&mut self, handle: TimerHandle);
}

/// The transient highlighter's repeating timer
#[derive(Debug, Default)]
pub struct IdleTimer {
    handle: Option<TimerHandle>,
}

impl IdleTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<TimerHandle> {
        self.handle
    }

    /// Cancel any running timer, then schedule a new one.
    ///
    /// A zero delay leaves the timer disarmed.
    pub fn rearm<S: Scheduler>(&mut self, delay: Duration, scheduler: &mut S) -> Result<()> {
        self.disarm(scheduler);
        if delay.is_zero() {
            return Ok(());
        }
        let handle = scheduler.schedule_repeating(delay)?;
        debug!(?delay, handle = handle.0, "idle timer armed");
        self.handle = Some(handle);
        Ok(())
    }

    /// Arm the timer unless it already runs
    pub fn ensure_armed<S: Scheduler>(&mut self, delay: Duration, scheduler: &mut S) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        self.rearm(delay, scheduler)
    }

    pub fn disarm<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.handle.take() {
            debug!(handle = handle.0, "idle timer cancelled");
            scheduler.cancel(handle);
        }
    }
}

/// A scheduler polled by the host's event loop.
///
/// This is a pure data structure with no I/O: the loop passes in the
/// current time and gets back the timers that are due.
#[derive(Debug, Default)]
pub struct PolledScheduler {
    /// (handle, period, next deadline)
    timers: Vec<(TimerHandle, Duration, Instant)>,
    next_id: u64,
    now: Option<Instant>,
}

impl PolledScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `now` as the base for timers scheduled from here on
    pub fn set_now(&mut self, now: Instant) {
        self.now = Some(now);
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Timers due at `now`, each rescheduled one period later
    pub fn poll(&mut self, now: Instant) -> Vec<TimerHandle> {
        self.now = Some(now);
        let mut due = Vec::new();
        for (handle, period, deadline) in &mut self.timers {
            if now >= *deadline {
                due.push(*handle);
                *deadline = now + *period;
            }
        }
        due
    }

    /// Time until the earliest deadline, for the host's blocking wait
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.timers
            .iter()
            .map(|(_, _, deadline)| deadline.saturating_duration_since(now))
            .min()
    }
}

impl Scheduler for PolledScheduler {
    fn schedule_repeating(&mut self, delay: Duration) -> Result<TimerHandle> {
        let now = *self.now.get_or_insert_with(Instant::now);
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push((handle, delay, now + delay));
        Ok(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|(h, _, _)| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every schedule/cancel call
    #[derive(Default)]
    struct Recording {
        scheduled: Vec<Duration>,
        cancelled: Vec<TimerHandle>,
    }

    impl Scheduler for Recording {
        fn schedule_repeating(&mut self, delay: Duration) -> Result<TimerHandle> {
            self.scheduled.push(delay);
            Ok(TimerHandle(self.scheduled.len() as u64))
        }

        fn cancel(&mut self, handle: TimerHandle) {
            self.cancelled.push(handle);
        }
    }

    /// Has no timers to give out
    struct Exhausted;

    impl Scheduler for Exhausted {
        fn schedule_repeating(&mut self, _delay: Duration) -> Result<TimerHandle> {
            Err(crate::error::HighlightError::Schedule("no timers left".to_string()))
        }

        fn cancel(&mut self, _handle: TimerHandle) {}
    }

    #[test]
    fn test_schedule_failure_leaves_timer_disarmed() {
        let mut timer = IdleTimer::new();
        let result = timer.rearm(Duration::from_secs(1), &mut Exhausted);
        assert!(matches!(
            result,
            Err(crate::error::HighlightError::Schedule(ref msg)) if msg == "no timers left"
        ));
        assert!(!timer.is_armed());
        assert!(timer.ensure_armed(Duration::from_secs(1), &mut Exhausted).is_err());
    }

    #[test]
    fn test_rearm_cancels_once() {
        let mut scheduler = Recording::default();
        let mut timer = IdleTimer::new();

        timer.rearm(Duration::from_millis(1500), &mut scheduler).unwrap();
        assert_eq!(timer.handle(), Some(TimerHandle(1)));

        timer.rearm(Duration::from_millis(500), &mut scheduler).unwrap();
        assert_eq!(scheduler.cancelled, vec![TimerHandle(1)]);
        assert_eq!(timer.handle(), Some(TimerHandle(2)));
        assert_eq!(
            scheduler.scheduled,
            vec![Duration::from_millis(1500), Duration::from_millis(500)]
        );
    }

    #[test]
    fn test_zero_delay_disarms() {
        let mut scheduler = Recording::default();
        let mut timer = IdleTimer::new();

        timer.rearm(Duration::from_secs(1), &mut scheduler).unwrap();
        timer.rearm(Duration::ZERO, &mut scheduler).unwrap();
        assert!(!timer.is_armed());
        assert_eq!(scheduler.cancelled, vec![TimerHandle(1)]);

        timer.disarm(&mut scheduler);
        assert_eq!(scheduler.cancelled.len(), 1);
    }

    #[test]
    fn test_ensure_armed_keeps_running_timer() {
        let mut scheduler = Recording::default();
        let mut timer = IdleTimer::new();

        timer.ensure_armed(Duration::from_secs(1), &mut scheduler).unwrap();
        timer.ensure_armed(Duration::from_secs(1), &mut scheduler).unwrap();
        assert_eq!(scheduler.scheduled.len(), 1);
        assert!(scheduler.cancelled.is_empty());
    }

    #[test]
    fn test_polled_scheduler() {
        let start = Instant::now();
        let mut scheduler = PolledScheduler::new();
        scheduler.set_now(start);

        let handle = scheduler.schedule_repeating(Duration::from_millis(100)).unwrap();
        assert!(scheduler.poll(start + Duration::from_millis(50)).is_empty());
        assert_eq!(
            scheduler.time_until_next(start + Duration::from_millis(50)),
            Some(Duration::from_millis(50))
        );
        assert_eq!(scheduler.poll(start + Duration::from_millis(100)), vec![handle]);
        assert!(scheduler.poll(start + Duration::from_millis(150)).is_empty());
        assert_eq!(scheduler.poll(start + Duration::from_millis(200)), vec![handle]);

        scheduler.cancel(handle);
        assert_eq!(scheduler.active_count(), 0);
        assert!(scheduler.poll(start + Duration::from_secs(10)).is_empty());
    }
}
