// Copyright (c) 2024 Mike Tsao

//! [TimerService] fires periodic ticks from the wall clock and delivers them
//! over a crossbeam channel.

use crate::{CrossbeamChannel, ProvidesService};
use crossbeam::channel::{Receiver, Select, Sender, TrySendError};
use harmonic_drone::{
    traits::SchedulesTicks,
    types::{Seconds, TickHandle, UidFactory},
};
use std::time::{Duration, Instant};

/// A [TimerServiceInput] tells [TimerService] what to do. Most clients use the
/// [SchedulesTicks] methods instead of sending these directly.
#[derive(Debug)]
pub enum TimerServiceInput {
    /// Begins firing the given handle at the given interval.
    Schedule(TickHandle, Duration),
    /// Stops firing the given handle.
    Cancel(TickHandle),
    /// Asks the service to exit.
    Quit,
}

/// A [TimerServiceEvent] informs clients what's going on.
#[derive(Debug, PartialEq)]
pub enum TimerServiceEvent {
    /// A subscription's interval has elapsed.
    Tick(TickHandle),
}

/// A [SchedulesTicks] facility backed by a service thread. Firings for all
/// subscriptions arrive, in order, as [TimerServiceEvent::Tick] on
/// [ProvidesService::receiver()].
#[derive(Debug)]
pub struct TimerService {
    inputs: CrossbeamChannel<TimerServiceInput>,
    events: CrossbeamChannel<TimerServiceEvent>,
    uid_factory: UidFactory<TickHandle>,
}
impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}
impl ProvidesService<TimerServiceInput, TimerServiceEvent> for TimerService {
    fn sender(&self) -> &Sender<TimerServiceInput> {
        &self.inputs.sender
    }

    fn receiver(&self) -> &Receiver<TimerServiceEvent> {
        &self.events.receiver
    }
}
impl SchedulesTicks for TimerService {
    fn schedule_repeating(&mut self, interval: Seconds) -> TickHandle {
        let handle = self.uid_factory.mint_next();
        let interval = Duration::try_from_secs_f64(interval.0)
            .unwrap_or(Duration::from_secs(u64::from(u32::MAX)));
        self.send_input(TimerServiceInput::Schedule(handle, interval));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.send_input(TimerServiceInput::Cancel(handle));
    }
}
impl Drop for TimerService {
    fn drop(&mut self) {
        let _ = self.inputs.sender.send(TimerServiceInput::Quit);
    }
}
impl TimerService {
    /// How many undelivered ticks can pile up before new ones are dropped.
    const EVENT_BACKLOG: usize = 64;

    /// Creates the service and starts its thread.
    pub fn new() -> Self {
        let r = Self {
            inputs: Default::default(),
            events: CrossbeamChannel::new_bounded(Self::EVENT_BACKLOG),
            uid_factory: Default::default(),
        };
        let receiver = r.inputs.receiver.clone();
        let sender = r.events.sender.clone();
        std::thread::spawn(move || Self::run(receiver, sender));
        r
    }

    fn run(inputs: Receiver<TimerServiceInput>, events: Sender<TimerServiceEvent>) {
        enum Action {
            Input(Option<TimerServiceInput>),
            Tick(TickHandle),
        }

        let mut subscriptions: Vec<(TickHandle, Receiver<Instant>)> = Vec::default();
        loop {
            let action = {
                let mut select = Select::new();
                let input_index = select.recv(&inputs);
                for (_, ticker) in subscriptions.iter() {
                    select.recv(ticker);
                }
                let oper = select.select();
                match oper.index() {
                    i if i == input_index => Action::Input(oper.recv(&inputs).ok()),
                    i => {
                        let (handle, ticker) = &subscriptions[i - 1];
                        let _ = oper.recv(ticker);
                        Action::Tick(*handle)
                    }
                }
            };
            match action {
                Action::Input(Some(TimerServiceInput::Schedule(handle, interval))) => {
                    subscriptions.push((handle, crossbeam::channel::tick(interval)));
                }
                Action::Input(Some(TimerServiceInput::Cancel(handle))) => {
                    subscriptions.retain(|(h, _)| *h != handle);
                }
                Action::Input(Some(TimerServiceInput::Quit)) | Action::Input(None) => break,
                Action::Tick(handle) => match events.try_send(TimerServiceEvent::Tick(handle)) {
                    Ok(_) => {}
                    Err(TrySendError::Full(_)) => {
                        log::warn!("timer client isn't keeping up; dropped tick {handle}");
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use more_asserts::assert_ge;

    #[test]
    fn delivers_ticks_for_live_subscriptions() {
        let mut service = TimerService::new();
        let started = Instant::now();
        let handle = service.schedule_repeating(Seconds(0.01));
        for _ in 0..3 {
            assert_eq!(
                service.receiver().recv_timeout(Duration::from_secs(5)),
                Ok(TimerServiceEvent::Tick(handle))
            );
        }
        assert_ge!(started.elapsed(), Duration::from_millis(30));
    }

    #[test]
    fn cancelled_subscription_goes_quiet() {
        let mut service = TimerService::new();
        let cancelled = service.schedule_repeating(Seconds(0.005));
        let kept = service.schedule_repeating(Seconds(0.02));
        service.cancel(cancelled);

        // Drain anything that fired before the cancel arrived.
        let deadline = Instant::now() + Duration::from_millis(200);
        let mut saw_kept = false;
        while Instant::now() < deadline {
            if let Ok(TimerServiceEvent::Tick(handle)) =
                service.receiver().recv_timeout(Duration::from_millis(50))
            {
                saw_kept |= handle == kept;
            }
        }
        assert!(saw_kept);

        for _ in 0..5 {
            assert_eq!(
                service.receiver().recv_timeout(Duration::from_secs(5)),
                Ok(TimerServiceEvent::Tick(kept)),
                "cancelled handle fired after the cancel"
            );
        }
    }
}
