// Copyright (c) 2024 Mike Tsao

use super::VoiceProgram;
use crate::{
    elements::Waveform,
    error::{DroneError, Result},
    traits::{ToneBackend, VoiceNodes},
    types::NodeUid,
};

/// One occupied slot in a [VoicePool].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceSlot {
    nodes: VoiceNodes,
    program: VoiceProgram,
}
impl VoiceSlot {
    /// The generator and controller that make up this voice.
    pub fn nodes(&self) -> VoiceNodes {
        self.nodes
    }

    /// The most recent program applied to this voice.
    pub fn program(&self) -> &VoiceProgram {
        &self.program
    }
}

/// A fixed number of voice slots, each filled the first time it's armed and
/// reused after that. Every voice feeds a shared output bus.
#[derive(Debug)]
pub struct VoicePool {
    slots: Vec<Option<VoiceSlot>>,
    output: NodeUid,
}
impl VoicePool {
    /// The waveform every voice uses.
    pub const WAVEFORM: Waveform = Waveform::Triangle;

    /// Creates an empty pool of `capacity` slots whose output bus is routed to
    /// the backend's destination.
    pub fn new_with<B: ToneBackend>(backend: &mut B, capacity: usize) -> Result<Self> {
        let output = backend.create_bus()?;
        backend.connect(output, backend.destination())?;
        Ok(Self {
            slots: Self::empty_slots(capacity),
            output,
        })
    }

    fn empty_slots(capacity: usize) -> Vec<Option<VoiceSlot>> {
        (0..capacity).map(|_| None).collect()
    }

    /// The bus that every voice feeds. Callers can route it further.
    pub fn output(&self) -> NodeUid {
        self.output
    }

    /// How many slots the pool has, occupied or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// How many slots hold a voice.
    pub fn occupied(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// The voice in the given slot, if it's been armed since the last
    /// teardown.
    pub fn slot(&self, index: usize) -> Option<&VoiceSlot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Prepares slot `index` to play `program`. An empty slot gets a new voice,
    /// wired generator to controller to output and started. An occupied slot
    /// keeps its voice, and whatever it had scheduled from the program's start
    /// onward is replaced.
    pub fn arm<B: ToneBackend>(
        &mut self,
        backend: &mut B,
        index: usize,
        program: &VoiceProgram,
    ) -> Result<VoiceNodes> {
        let capacity = self.capacity();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(DroneError::SlotOutOfRange { index, capacity })?;
        let nodes = match slot {
            Some(existing) => existing.nodes,
            None => {
                let nodes = backend.create_voice()?;
                if let Err(e) = Self::wire(backend, nodes, self.output) {
                    Self::discard(backend, nodes);
                    return Err(e);
                }
                nodes
            }
        };

        // Owned before it's programmed, so teardown can always reach it.
        *slot = Some(VoiceSlot {
            nodes,
            program: *program,
        });
        log::debug!("{}: arming voice {index}", program.start());
        program.apply_sweep(backend.frequency_mut(nodes.generator)?)?;
        program.apply_envelope(backend.gain_mut(nodes.controller)?)?;
        Ok(nodes)
    }

    fn wire<B: ToneBackend>(backend: &mut B, nodes: VoiceNodes, output: NodeUid) -> Result<()> {
        backend.connect(nodes.generator, nodes.controller)?;
        backend.connect(nodes.controller, output)?;
        backend.set_waveform(nodes.generator, Self::WAVEFORM)?;
        backend.activate(nodes.generator)
    }

    /// Gets rid of a voice that never made it into a slot. Failures are only
    /// logged.
    fn discard<B: ToneBackend>(backend: &mut B, nodes: VoiceNodes) {
        if let Err(e) = backend.deactivate(nodes.generator) {
            log::trace!("discarding voice: {e}");
        }
        for node in [nodes.generator, nodes.controller] {
            if let Err(e) = backend.release(node) {
                log::warn!("couldn't release {node}: {e}");
            }
        }
    }

    /// Stops and releases every voice. The pool keeps its capacity and its
    /// output bus, so it can be armed again with all-new voices. A failure
    /// doesn't stop the rest of the voices from being torn down; the first
    /// one is returned.
    pub fn teardown<B: ToneBackend>(&mut self, backend: &mut B) -> Result<()> {
        let capacity = self.capacity();
        let slots = core::mem::replace(&mut self.slots, Self::empty_slots(capacity));
        let mut first_error = None;
        for slot in slots.into_iter().flatten() {
            let VoiceNodes {
                generator,
                controller,
            } = slot.nodes;
            for result in [
                backend.deactivate(generator),
                backend.release(generator),
                backend.release(controller),
            ] {
                if let Err(e) = result {
                    log::warn!("tearing down voice {generator}: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{GeneratorState, SoftwareBackend},
        drone::DroneProfile,
        traits::Automatable,
        types::{FrequencyHz, Sample, SampleRate, Seconds, StereoSample},
    };
    use float_cmp::approx_eq;

    fn setup(capacity: usize) -> (SoftwareBackend, VoicePool) {
        let mut backend = SoftwareBackend::new_with(SampleRate::new(1000)).unwrap();
        let pool = VoicePool::new_with(&mut backend, capacity).unwrap();
        (backend, pool)
    }

    fn program_at(start: f64) -> VoiceProgram {
        VoiceProgram::new_with(&DroneProfile::quartet(), Seconds(start))
    }

    #[test]
    fn new_pool_is_empty_and_routed() {
        let (backend, pool) = setup(4);
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.occupied(), 0);
        assert_eq!(
            backend.inputs(backend.destination()).unwrap(),
            &[pool.output()]
        );
    }

    #[test]
    fn first_arm_builds_wired_running_voice() {
        let (mut backend, mut pool) = setup(4);
        let nodes = pool.arm(&mut backend, 0, &program_at(0.0)).unwrap();
        assert_eq!(pool.occupied(), 1);
        assert_eq!(pool.slot(0).unwrap().nodes(), nodes);
        assert_eq!(
            backend.generator_state(nodes.generator).unwrap(),
            GeneratorState::Running
        );
        assert_eq!(backend.inputs(nodes.controller).unwrap(), &[nodes.generator]);
        assert_eq!(backend.inputs(pool.output()).unwrap(), &[nodes.controller]);
        assert_eq!(backend.frequency(nodes.generator).unwrap().points().len(), 2);
        assert_eq!(backend.gain(nodes.controller).unwrap().points().len(), 4);
    }

    #[test]
    fn rearm_reuses_voice_without_rewiring() {
        let (mut backend, mut pool) = setup(4);
        let first = pool.arm(&mut backend, 1, &program_at(0.0)).unwrap();
        let node_count = backend.node_count();
        let second = pool.arm(&mut backend, 1, &program_at(4.0)).unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.node_count(), node_count);
        assert_eq!(backend.inputs(pool.output()).unwrap(), &[first.controller]);
        assert_eq!(pool.slot(1).unwrap().program().start(), Seconds(4.0));
    }

    #[test]
    fn slot_beyond_capacity_is_refused() {
        let (mut backend, mut pool) = setup(2);
        assert_eq!(
            pool.arm(&mut backend, 2, &program_at(0.0)),
            Err(DroneError::SlotOutOfRange {
                index: 2,
                capacity: 2
            })
        );
        assert_eq!(pool.occupied(), 0);
    }

    #[test]
    fn cancelling_mid_envelope_keeps_audible_value() {
        let (mut backend, mut pool) = setup(1);
        let nodes = pool.arm(&mut backend, 0, &program_at(0.0)).unwrap();
        let mut buffer = vec![StereoSample::SILENCE; 6000];
        backend.render(&mut buffer);

        let now = backend.now();
        let gain = backend.gain_mut(nodes.controller).unwrap();
        let before = gain.value_at(now);
        gain.cancel_after(now);
        assert!(approx_eq!(f64, gain.value_at(now), before, epsilon = 1e-12));

        let frequency = backend.frequency_mut(nodes.generator).unwrap();
        let before = frequency.value_at(now);
        frequency.cancel_after(now);
        assert!(approx_eq!(f64, frequency.value_at(now), before, epsilon = 1e-9));
    }

    #[test]
    fn teardown_stops_and_releases_everything() {
        let (mut backend, mut pool) = setup(3);
        let a = pool.arm(&mut backend, 0, &program_at(0.0)).unwrap();
        let b = pool.arm(&mut backend, 1, &program_at(0.0)).unwrap();
        pool.teardown(&mut backend).unwrap();

        assert_eq!(pool.occupied(), 0);
        assert_eq!(pool.capacity(), 3);
        for uid in [a.generator, a.controller, b.generator, b.controller] {
            assert!(!backend.contains(uid));
        }
        assert!(backend.contains(pool.output()));
        assert!(backend.inputs(pool.output()).unwrap().is_empty());

        let c = pool.arm(&mut backend, 0, &program_at(1.0)).unwrap();
        assert_ne!(c, a, "a rebuilt slot gets a new voice");
    }

    #[test]
    fn voice_that_fails_programming_is_still_torn_down() {
        let (mut backend, mut pool) = setup(2);
        let unreachable = VoiceProgram::new(
            Seconds::zero(),
            Seconds(16.0),
            FrequencyHz(110.0),
            FrequencyHz(0.0),
        );
        assert!(matches!(
            pool.arm(&mut backend, 0, &unreachable),
            Err(DroneError::InvalidAutomation { .. })
        ));
        let nodes = pool.slot(0).unwrap().nodes();
        assert_eq!(
            backend.generator_state(nodes.generator).unwrap(),
            GeneratorState::Running
        );

        pool.teardown(&mut backend).unwrap();
        assert!(!backend.contains(nodes.generator));
        assert!(!backend.contains(nodes.controller));
        let mut buffer = vec![StereoSample(Sample(1.0), Sample(1.0)); 10];
        backend.render(&mut buffer);
        assert!(buffer.iter().all(|f| *f == StereoSample::SILENCE));
    }
}
