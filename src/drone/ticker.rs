// Copyright (c) 2024 Mike Tsao

use crate::{
    traits::SchedulesTicks,
    types::{Seconds, TickHandle, UidFactory},
};

#[derive(Debug)]
struct Subscription {
    handle: TickHandle,
    interval: Seconds,
    anchor: Seconds,
    fired: usize,
}
impl Subscription {
    // Computed from the anchor each time so that rounding never accumulates.
    fn next_due(&self) -> Seconds {
        self.anchor + self.interval * (self.fired + 1) as f64
    }
}

/// A [SchedulesTicks] facility driven by whatever clock its owner follows,
/// rather than the wall clock. Offline renders and tests poll it with the
/// audio clock, which makes every firing land on a predictable frame.
#[derive(Debug, Default)]
pub struct ManualTicker {
    uid_factory: UidFactory<TickHandle>,
    now: Seconds,
    subscriptions: Vec<Subscription>,
}
impl ManualTicker {
    /// Moves the ticker's clock forward. New subscriptions are anchored here.
    /// The clock never moves backward.
    pub fn advance_to(&mut self, now: Seconds) {
        if now > self.now {
            self.now = now;
        }
    }

    #[allow(missing_docs)]
    pub fn now(&self) -> Seconds {
        self.now
    }

    /// Advances to `now` and returns a subscription that's due to fire, if
    /// any. Call repeatedly until it returns `None`; a subscription that's
    /// fallen several intervals behind fires once per call.
    pub fn poll(&mut self, now: Seconds) -> Option<TickHandle> {
        self.advance_to(now);
        let now = self.now;
        let subscription = self
            .subscriptions
            .iter_mut()
            .filter(|s| s.next_due() <= now)
            .min_by(|a, b| a.next_due().0.total_cmp(&b.next_due().0))?;
        subscription.fired += 1;
        Some(subscription.handle)
    }

    /// The interval of a live subscription.
    pub fn interval(&self, handle: TickHandle) -> Option<Seconds> {
        self.subscriptions
            .iter()
            .find(|s| s.handle == handle)
            .map(|s| s.interval)
    }

    #[allow(missing_docs)]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}
impl SchedulesTicks for ManualTicker {
    fn schedule_repeating(&mut self, interval: Seconds) -> TickHandle {
        let handle = self.uid_factory.mint_next();
        self.subscriptions.push(Subscription {
            handle,
            interval,
            anchor: self.now,
            fired: 0,
        });
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.subscriptions.retain(|s| s.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let mut ticker = ManualTicker::default();
        let handle = ticker.schedule_repeating(Seconds(4.0));
        assert_eq!(ticker.poll(Seconds(3.999)), None);
        assert_eq!(ticker.poll(Seconds(4.0)), Some(handle));
        assert_eq!(ticker.poll(Seconds(4.0)), None);
        assert_eq!(ticker.poll(Seconds(7.0)), None);
        assert_eq!(ticker.poll(Seconds(8.0)), Some(handle));
    }

    #[test]
    fn catches_up_one_firing_at_a_time() {
        let mut ticker = ManualTicker::default();
        let handle = ticker.schedule_repeating(Seconds(1.0));
        let mut count = 0;
        while ticker.poll(Seconds(5.5)).is_some() {
            count += 1;
        }
        assert_eq!(count, 5);
        assert_eq!(ticker.poll(Seconds(6.0)), Some(handle));
    }

    #[test]
    fn anchors_at_subscription_time() {
        let mut ticker = ManualTicker::default();
        ticker.advance_to(Seconds(10.0));
        let handle = ticker.schedule_repeating(Seconds(2.0));
        assert_eq!(ticker.poll(Seconds(11.0)), None);
        assert_eq!(ticker.poll(Seconds(12.0)), Some(handle));
    }

    #[test]
    fn no_drift_over_many_firings() {
        let mut ticker = ManualTicker::default();
        let interval = Seconds(32.0) / 7;
        ticker.schedule_repeating(interval);
        let mut fired = 0;
        while ticker.poll(Seconds(32.0 * 100.0 + 0.001)).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 700);
    }

    #[test]
    fn cancelled_subscriptions_stop_firing() {
        let mut ticker = ManualTicker::default();
        let a = ticker.schedule_repeating(Seconds(1.0));
        let b = ticker.schedule_repeating(Seconds(1.0));
        assert_ne!(a, b);
        ticker.cancel(a);
        ticker.cancel(TickHandle(12345));
        assert_eq!(ticker.subscription_count(), 1);
        assert_eq!(ticker.poll(Seconds(1.0)), Some(b));
        assert_eq!(ticker.interval(a), None);
    }
}
