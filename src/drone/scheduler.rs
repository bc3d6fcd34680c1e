// Copyright (c) 2024 Mike Tsao

use super::{DroneProfile, VoicePool, VoiceProgram};
use crate::{
    error::{DroneError, Result},
    traits::{SchedulesTicks, ToneBackend},
    types::{NodeUid, TickHandle},
};
use strum_macros::Display;

/// Whether a [HarmonicScheduler] is arming voices.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum SchedulerState {
    #[allow(missing_docs)]
    #[default]
    Stopped,
    #[allow(missing_docs)]
    Running,
}

#[derive(Debug, Default)]
struct HarmonicSchedulerEphemerals {
    state: SchedulerState,
    cursor: usize,
    tick_handle: Option<TickHandle>,
}

/// Cycles through a [VoicePool], arming one voice per tick so that up to
/// `slot_count` voices overlap at different points in their sweeps.
///
/// The scheduler doesn't own a clock. [HarmonicScheduler::start()] subscribes
/// to a host [SchedulesTicks] facility, and the host then calls
/// [HarmonicScheduler::handle_tick()] with the subscription's handle each time
/// it fires.
#[derive(Debug)]
pub struct HarmonicScheduler<B: ToneBackend> {
    profile: DroneProfile,
    backend: B,
    pool: VoicePool,

    e: HarmonicSchedulerEphemerals,
}
impl<B: ToneBackend> HarmonicScheduler<B> {
    /// Creates a stopped scheduler whose output is already routed to the
    /// backend's destination.
    pub fn new_with(profile: DroneProfile, mut backend: B) -> Result<Self> {
        profile.validate().map_err(DroneError::InvalidProfile)?;
        let pool = VoicePool::new_with(&mut backend, profile.slot_count())?;
        Ok(Self {
            profile,
            backend,
            pool,
            e: Default::default(),
        })
    }

    /// Begins cycling. The first voice is armed right away, and the rest
    /// follow at each tick. Does nothing if already running.
    pub fn start(&mut self, ticks: &mut impl SchedulesTicks) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        log::info!(
            "{}: starting drone with {} voices over {}",
            self.backend.now(),
            self.profile.slot_count(),
            self.profile.duration()
        );
        self.e.cursor = 0;
        self.e.tick_handle = Some(ticks.schedule_repeating(self.profile.tick_interval()));
        self.e.state = SchedulerState::Running;
        if let Err(e) = self.schedule_next() {
            if let Err(teardown) = self.stop(ticks) {
                log::warn!("couldn't clean up after failed start: {teardown}");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Halts every voice for good and cancels the tick subscription. Voices
    /// are cut off wherever they are in their envelopes. Does nothing if
    /// already stopped.
    pub fn stop(&mut self, ticks: &mut impl SchedulesTicks) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }
        log::info!("{}: stopping drone", self.backend.now());
        if let Some(handle) = self.e.tick_handle.take() {
            ticks.cancel(handle);
        }
        self.e.state = SchedulerState::Stopped;
        self.pool.teardown(&mut self.backend)
    }

    /// Responds to one firing of the tick subscription. Firings of anything
    /// other than the current subscription are ignored.
    pub fn handle_tick(&mut self, handle: TickHandle) -> Result<()> {
        if self.e.tick_handle != Some(handle) {
            log::trace!("ignoring tick {handle} from a stale subscription");
            return Ok(());
        }
        self.schedule_next().map(|_| ())
    }

    /// Arms the slot under the cursor with a program starting now, then moves
    /// the cursor along. Returns the armed slot, or `None` if stopped.
    pub fn schedule_next(&mut self) -> Result<Option<usize>> {
        if !self.is_running() {
            return Ok(None);
        }
        let index = self.e.cursor;
        let program = VoiceProgram::new_with(&self.profile, self.backend.now());
        self.pool.arm(&mut self.backend, index, &program)?;
        self.e.cursor = (index + 1) % self.profile.slot_count();
        Ok(Some(index))
    }

    #[allow(missing_docs)]
    pub fn is_running(&self) -> bool {
        self.e.state == SchedulerState::Running
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> SchedulerState {
        self.e.state
    }

    /// The slot that the next tick arms.
    pub fn cursor(&self) -> usize {
        self.e.cursor
    }

    /// The current tick subscription, present only while running.
    pub fn tick_handle(&self) -> Option<TickHandle> {
        self.e.tick_handle
    }

    /// The bus that carries the whole drone.
    pub fn output(&self) -> NodeUid {
        self.pool.output()
    }

    #[allow(missing_docs)]
    pub fn profile(&self) -> &DroneProfile {
        &self.profile
    }

    #[allow(missing_docs)]
    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    #[allow(missing_docs)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend, for rendering or further routing.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::SoftwareBackend,
        drone::ManualTicker,
        types::{SampleRate, Seconds},
    };

    fn scheduler() -> HarmonicScheduler<SoftwareBackend> {
        HarmonicScheduler::new_with(
            DroneProfile::quartet(),
            SoftwareBackend::new_with(SampleRate::new(1000)).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn starts_stopped() {
        let s = scheduler();
        assert_eq!(s.state(), SchedulerState::Stopped);
        assert_eq!(s.cursor(), 0);
        assert!(s.tick_handle().is_none());
        assert_eq!(s.pool().occupied(), 0);
    }

    #[test]
    fn invalid_profile_is_refused() {
        let profile: DroneProfile = serde_json::from_str(
            r#"{"duration": 16.0, "slot-count": 0, "start-frequency": 110.0, "end-frequency": 1760.0}"#,
        )
        .unwrap();
        assert!(matches!(
            HarmonicScheduler::new_with(
                profile,
                SoftwareBackend::new_with(SampleRate::new(1000)).unwrap()
            ),
            Err(DroneError::InvalidProfile(_))
        ));
    }

    #[test]
    fn start_arms_first_slot_immediately() {
        let mut s = scheduler();
        let mut ticker = ManualTicker::default();
        s.start(&mut ticker).unwrap();
        assert!(s.is_running());
        assert!(s.tick_handle().is_some());
        assert_eq!(s.cursor(), 1);
        assert!(s.pool().slot(0).is_some());
        assert_eq!(ticker.interval(s.tick_handle().unwrap()), Some(Seconds(4.0)));
    }

    #[test]
    fn ticks_rotate_through_slots() {
        let mut s = scheduler();
        let mut ticker = ManualTicker::default();
        s.start(&mut ticker).unwrap();
        let handle = s.tick_handle().unwrap();
        for k in 1..=9 {
            assert_eq!(s.cursor(), k % 4);
            s.handle_tick(handle).unwrap();
        }
        assert_eq!(s.cursor(), 10 % 4);
        assert_eq!(s.pool().occupied(), 4);
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let mut s = scheduler();
        let mut ticker = ManualTicker::default();
        s.start(&mut ticker).unwrap();
        let cursor = s.cursor();
        s.handle_tick(TickHandle(9999)).unwrap();
        assert_eq!(s.cursor(), cursor);

        let old = s.tick_handle().unwrap();
        s.stop(&mut ticker).unwrap();
        s.handle_tick(old).unwrap();
        assert_eq!(s.pool().occupied(), 0);
        assert_eq!(s.schedule_next(), Ok(None));
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut s = scheduler();
        let mut ticker = ManualTicker::default();
        s.start(&mut ticker).unwrap();
        let handle = s.tick_handle();
        let nodes = s.pool().slot(0).map(|slot| slot.nodes());
        s.start(&mut ticker).unwrap();
        assert_eq!(s.tick_handle(), handle);
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.pool().slot(0).map(|slot| slot.nodes()), nodes);
        assert_eq!(ticker.subscription_count(), 1);

        s.stop(&mut ticker).unwrap();
        s.stop(&mut ticker).unwrap();
        assert!(!s.is_running());
        assert_eq!(ticker.subscription_count(), 0);
    }
}
