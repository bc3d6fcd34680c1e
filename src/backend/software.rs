// Copyright (c) 2024 Mike Tsao

use crate::{
    automation::ParamTimeline,
    elements::{Oscillator, Waveform},
    error::{DroneError, Result},
    traits::{Configurable, Generates, ToneBackend, VoiceNodes},
    types::{FrequencyHz, NodeUid, Sample, SampleRate, Seconds, StereoSample, UidFactory},
};
use delegate::delegate;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// A generator's one-way lifecycle.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorState {
    /// Created but not yet started. Silent.
    #[default]
    Idle,
    /// Producing signal.
    Running,
    /// Permanently halted. Silent.
    Stopped,
}

#[derive(Debug)]
struct GeneratorNode {
    oscillator: Oscillator,
    frequency: ParamTimeline,
    state: GeneratorState,
    current: Sample,
}

#[derive(Debug)]
enum NodeKind {
    Generator(Box<GeneratorNode>),
    Gain(ParamTimeline),
    Bus,
    Destination,
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    inputs: Vec<NodeUid>,
}
impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            inputs: Default::default(),
        }
    }
}

/// An in-process [ToneBackend] that renders the signal graph one frame at a
/// time. Its clock is the number of frames rendered so far, so it runs exactly
/// as fast as someone asks it for audio.
#[derive(Debug)]
pub struct SoftwareBackend {
    uid_factory: UidFactory<NodeUid>,
    nodes: FxHashMap<NodeUid, Node>,
    destination: NodeUid,
    sample_rate: SampleRate,
    frames_rendered: usize,
}
impl SoftwareBackend {
    /// The frequency of a generator that hasn't been automated yet.
    pub const DEFAULT_FREQUENCY: f64 = 440.0;
    /// The gain of a controller that hasn't been automated yet.
    pub const DEFAULT_GAIN: f64 = 1.0;

    /// Creates a backend with nothing but a destination.
    pub fn new_with(sample_rate: SampleRate) -> Result<Self> {
        if sample_rate.0 == 0 {
            return Err(DroneError::BackendUnavailable(
                "sample rate must be positive".to_string(),
            ));
        }
        let uid_factory = UidFactory::<NodeUid>::default();
        let destination = uid_factory.mint_next();
        let mut nodes = FxHashMap::default();
        nodes.insert(destination, Node::new(NodeKind::Destination));
        Ok(Self {
            uid_factory,
            nodes,
            destination,
            sample_rate,
            frames_rendered: 0,
        })
    }

    delegate! {
        to self.uid_factory {
            #[call(mint_next)]
            fn mint_node_uid(&self) -> NodeUid;
        }
    }

    /// How many frames have been rendered since creation.
    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }

    /// Whether the handle names a live node.
    pub fn contains(&self, uid: NodeUid) -> bool {
        self.nodes.contains_key(&uid)
    }

    /// The number of live nodes, including the destination.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The nodes feeding the given node.
    pub fn inputs(&self, uid: NodeUid) -> Result<&[NodeUid]> {
        Ok(&self.node(uid)?.inputs)
    }

    /// Where the generator is in its lifecycle.
    pub fn generator_state(&self, generator: NodeUid) -> Result<GeneratorState> {
        Ok(self.generator(generator)?.state)
    }

    /// A read-only view of a generator's frequency automation, stopped or not.
    pub fn frequency(&self, generator: NodeUid) -> Result<&ParamTimeline> {
        Ok(&self.generator(generator)?.frequency)
    }

    /// A read-only view of a controller's gain automation.
    pub fn gain(&self, controller: NodeUid) -> Result<&ParamTimeline> {
        match &self.node(controller)?.kind {
            NodeKind::Gain(gain) => Ok(gain),
            _ => Err(DroneError::WrongNodeKind {
                uid: controller,
                expected: "amplitude controller",
            }),
        }
    }

    /// Renders the next frame and advances the clock by one frame.
    pub fn render_frame(&mut self) -> StereoSample {
        let now = self.now();
        for node in self.nodes.values_mut() {
            if let NodeKind::Generator(generator) = &mut node.kind {
                generator.current = if generator.state == GeneratorState::Running {
                    let frequency = generator.frequency.value_at(now);
                    generator.oscillator.set_frequency(FrequencyHz(frequency));
                    let mut value = [Sample::SILENCE];
                    generator.oscillator.generate(&mut value);
                    value[0]
                } else {
                    Sample::SILENCE
                };
            }
        }
        let mono = self.evaluate(self.destination, now);
        self.frames_rendered += 1;
        StereoSample::from(mono)
    }

    /// Fills the buffer with the next frames.
    pub fn render(&mut self, frames: &mut [StereoSample]) {
        for frame in frames {
            *frame = self.render_frame();
        }
    }

    fn evaluate(&self, uid: NodeUid, now: Seconds) -> Sample {
        let Some(node) = self.nodes.get(&uid) else {
            return Sample::SILENCE;
        };
        let sum_inputs = || {
            node.inputs
                .iter()
                .fold(Sample::SILENCE, |acc, input| acc + self.evaluate(*input, now))
        };
        match &node.kind {
            NodeKind::Generator(generator) => generator.current,
            NodeKind::Gain(gain) => sum_inputs() * gain.value_at(now),
            NodeKind::Bus | NodeKind::Destination => sum_inputs(),
        }
    }

    fn node(&self, uid: NodeUid) -> Result<&Node> {
        self.nodes.get(&uid).ok_or(DroneError::UnknownNode(uid))
    }

    fn generator(&self, uid: NodeUid) -> Result<&GeneratorNode> {
        match &self.node(uid)?.kind {
            NodeKind::Generator(generator) => Ok(generator),
            _ => Err(DroneError::WrongNodeKind {
                uid,
                expected: "generator",
            }),
        }
    }

    fn generator_mut(&mut self, uid: NodeUid) -> Result<&mut GeneratorNode> {
        match self.nodes.get_mut(&uid) {
            Some(Node {
                kind: NodeKind::Generator(generator),
                ..
            }) => Ok(generator),
            Some(_) => Err(DroneError::WrongNodeKind {
                uid,
                expected: "generator",
            }),
            None => Err(DroneError::UnknownNode(uid)),
        }
    }

    // Whether signal from `upstream` already reaches `downstream`.
    fn feeds(&self, upstream: NodeUid, downstream: NodeUid) -> bool {
        let mut pending = vec![downstream];
        let mut visited = Vec::default();
        while let Some(uid) = pending.pop() {
            if uid == upstream {
                return true;
            }
            if visited.contains(&uid) {
                continue;
            }
            visited.push(uid);
            if let Some(node) = self.nodes.get(&uid) {
                pending.extend(node.inputs.iter().copied());
            }
        }
        false
    }
}
impl Configurable for SoftwareBackend {
    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    fn update_sample_rate(&mut self, sample_rate: SampleRate) {
        self.sample_rate = sample_rate;
        for node in self.nodes.values_mut() {
            if let NodeKind::Generator(generator) = &mut node.kind {
                generator.oscillator.update_sample_rate(sample_rate);
            }
        }
    }
}
impl ToneBackend for SoftwareBackend {
    type Param = ParamTimeline;

    fn now(&self) -> Seconds {
        Seconds::from_frames(self.frames_rendered, self.sample_rate)
    }

    fn destination(&self) -> NodeUid {
        self.destination
    }

    fn create_bus(&mut self) -> Result<NodeUid> {
        let uid = self.mint_node_uid();
        self.nodes.insert(uid, Node::new(NodeKind::Bus));
        Ok(uid)
    }

    fn create_voice(&mut self) -> Result<VoiceNodes> {
        let generator = self.mint_node_uid();
        let controller = self.mint_node_uid();
        self.nodes.insert(
            generator,
            Node::new(NodeKind::Generator(Box::new(GeneratorNode {
                oscillator: Oscillator::new_with(
                    Waveform::default(),
                    FrequencyHz(Self::DEFAULT_FREQUENCY),
                    self.sample_rate,
                ),
                frequency: ParamTimeline::new_with(Self::DEFAULT_FREQUENCY),
                state: GeneratorState::default(),
                current: Sample::SILENCE,
            }))),
        );
        self.nodes.insert(
            controller,
            Node::new(NodeKind::Gain(ParamTimeline::new_with(Self::DEFAULT_GAIN))),
        );
        Ok(VoiceNodes {
            generator,
            controller,
        })
    }

    fn connect(&mut self, source: NodeUid, sink: NodeUid) -> Result<()> {
        let invalid = |reason| DroneError::InvalidConnection {
            from: source,
            to: sink,
            reason,
        };
        if matches!(self.node(source)?.kind, NodeKind::Destination) {
            return Err(invalid("the destination has no output"));
        }
        let sink_node = self.node(sink)?;
        if matches!(sink_node.kind, NodeKind::Generator(_)) {
            return Err(invalid("generators don't take input"));
        }
        if source == sink {
            return Err(invalid("a node can't feed itself"));
        }
        if sink_node.inputs.contains(&source) {
            return Ok(());
        }
        if self.feeds(sink, source) {
            return Err(invalid("the connection would form a cycle"));
        }
        if let Some(node) = self.nodes.get_mut(&sink) {
            node.inputs.push(source);
        }
        Ok(())
    }

    fn release(&mut self, node: NodeUid) -> Result<()> {
        if node == self.destination {
            return Err(DroneError::WrongNodeKind {
                uid: node,
                expected: "releasable node",
            });
        }
        if self.nodes.remove(&node).is_none() {
            return Err(DroneError::UnknownNode(node));
        }
        for remaining in self.nodes.values_mut() {
            remaining.inputs.retain(|input| *input != node);
        }
        Ok(())
    }

    fn set_waveform(&mut self, generator: NodeUid, waveform: Waveform) -> Result<()> {
        self.generator_mut(generator)?
            .oscillator
            .set_waveform(waveform);
        Ok(())
    }

    fn activate(&mut self, generator: NodeUid) -> Result<()> {
        let node = self.generator_mut(generator)?;
        match node.state {
            GeneratorState::Idle => {
                node.oscillator.reset();
                node.state = GeneratorState::Running;
                Ok(())
            }
            GeneratorState::Running => Ok(()),
            GeneratorState::Stopped => Err(DroneError::GeneratorStopped(generator)),
        }
    }

    fn deactivate(&mut self, generator: NodeUid) -> Result<()> {
        let node = self.generator_mut(generator)?;
        match node.state {
            GeneratorState::Idle => Err(DroneError::GeneratorNotActivated(generator)),
            GeneratorState::Running | GeneratorState::Stopped => {
                node.state = GeneratorState::Stopped;
                Ok(())
            }
        }
    }

    fn frequency_mut(&mut self, generator: NodeUid) -> Result<&mut ParamTimeline> {
        let node = self.generator_mut(generator)?;
        if node.state == GeneratorState::Stopped {
            return Err(DroneError::GeneratorStopped(generator));
        }
        Ok(&mut node.frequency)
    }

    fn gain_mut(&mut self, controller: NodeUid) -> Result<&mut ParamTimeline> {
        match self.nodes.get_mut(&controller) {
            Some(Node {
                kind: NodeKind::Gain(gain),
                ..
            }) => Ok(gain),
            Some(_) => Err(DroneError::WrongNodeKind {
                uid: controller,
                expected: "amplitude controller",
            }),
            None => Err(DroneError::UnknownNode(controller)),
        }
    }
}
