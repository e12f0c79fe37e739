//! Delay-coalescing for rapid repeated triggers.
//!
//! A [`Debouncer`] wraps an action so that a burst of invocations collapses
//! into a single call: each `invoke` replaces the pending arguments and
//! pushes the deadline out by the wait interval, and the action fires once
//! the caller's loop polls past the deadline. There is no internal thread or
//! timer; the handle is driven cooperatively from one scheduling timeline,
//! and teardown must call [`Debouncer::cancel`] explicitly.

use std::time::{Duration, Instant};

struct Pending<T> {
    args: T,
    deadline: Instant,
}

/// A debounced wrapper around an action.
///
/// Holds at most one pending call at a time. Superseded arguments are
/// discarded, never queued or merged.
pub struct Debouncer<T, F: FnMut(T)> {
    action: F,
    wait: Duration,
    pending: Option<Pending<T>>,
}

impl<T, F: FnMut(T)> Debouncer<T, F> {
    pub fn new(action: F, wait: Duration) -> Self {
        Self {
            action,
            wait,
            pending: None,
        }
    }

    /// Record an invocation: discard any pending call and schedule this one
    /// for `wait` from now.
    pub fn invoke(&mut self, args: T) {
        self.invoke_at(args, Instant::now());
    }

    /// Fire the pending call if its deadline has passed. Returns whether the
    /// action ran.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Drop the pending call without firing it. Returns whether one was
    /// dropped.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Deadline of the pending call, if any. Lets a driving loop pick its
    /// sleep interval.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// `invoke` against an explicit clock.
    pub fn invoke_at(&mut self, args: T, now: Instant) {
        self.pending = Some(Pending {
            args,
            deadline: now + self.wait,
        });
    }

    /// `poll` against an explicit clock. The slot is cleared before the
    /// action runs.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        let due = matches!(&self.pending, Some(p) if now >= p.deadline);
        if !due {
            return false;
        }
        if let Some(p) = self.pending.take() {
            (self.action)(p.args);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (RefCell<Vec<String>>, Duration) {
        (RefCell::new(Vec::new()), Duration::from_millis(100))
    }

    #[test]
    fn burst_fires_once_with_last_arguments() {
        let (fired, wait) = recorder();
        let mut d = Debouncer::new(|q: String| fired.borrow_mut().push(q), wait);

        let t0 = Instant::now();
        let step = Duration::from_millis(30); // < wait
        d.invoke_at("a".to_string(), t0);
        d.invoke_at("ab".to_string(), t0 + step);
        d.invoke_at("abc".to_string(), t0 + step * 2);

        // quiet period not yet elapsed from the last call
        assert!(!d.poll_at(t0 + step * 2 + wait - Duration::from_millis(1)));
        assert!(d.deadline().is_some());

        assert!(d.poll_at(t0 + step * 2 + wait));
        assert_eq!(*fired.borrow(), vec!["abc".to_string()]);
        assert!(d.deadline().is_none());
    }

    #[test]
    fn fires_exactly_once_per_burst() {
        let (fired, wait) = recorder();
        let mut d = Debouncer::new(|q: String| fired.borrow_mut().push(q), wait);

        let t0 = Instant::now();
        d.invoke_at("x".to_string(), t0);
        assert!(d.poll_at(t0 + wait));
        assert!(!d.poll_at(t0 + wait * 2));
        assert!(!d.poll_at(t0 + wait * 3));
        assert_eq!(fired.borrow().len(), 1);
    }

    #[test]
    fn cancel_drops_the_pending_call() {
        let (fired, wait) = recorder();
        let mut d = Debouncer::new(|q: String| fired.borrow_mut().push(q), wait);

        let t0 = Instant::now();
        d.invoke_at("doomed".to_string(), t0);
        assert!(d.cancel());
        assert!(!d.poll_at(t0 + wait * 10));
        assert!(fired.borrow().is_empty());

        // nothing pending, nothing to cancel
        assert!(!d.cancel());
    }

    #[test]
    fn invocation_after_fire_schedules_a_new_call() {
        let (fired, wait) = recorder();
        let mut d = Debouncer::new(|q: String| fired.borrow_mut().push(q), wait);

        let t0 = Instant::now();
        d.invoke_at("first".to_string(), t0);
        assert!(d.poll_at(t0 + wait));
        d.invoke_at("second".to_string(), t0 + wait * 2);
        assert!(d.poll_at(t0 + wait * 3));
        assert_eq!(
            *fired.borrow(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn deadline_tracks_the_latest_invocation() {
        let mut d = Debouncer::new(|_: ()| {}, Duration::from_millis(100));
        assert!(d.deadline().is_none());

        let t0 = Instant::now();
        d.invoke_at((), t0);
        assert_eq!(d.deadline(), Some(t0 + Duration::from_millis(100)));

        d.invoke_at((), t0 + Duration::from_millis(50));
        assert_eq!(d.deadline(), Some(t0 + Duration::from_millis(150)));
    }

    #[test]
    fn zero_wait_fires_on_the_next_poll() {
        let (fired, _) = recorder();
        let mut d = Debouncer::new(|q: String| fired.borrow_mut().push(q), Duration::ZERO);

        let t0 = Instant::now();
        d.invoke_at("now".to_string(), t0);
        assert!(d.poll_at(t0));
        assert_eq!(*fired.borrow(), vec!["now".to_string()]);
    }
}
