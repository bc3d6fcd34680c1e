// Copyright (c) 2024 Mike Tsao

//! [CpalAudioService] plays audio through the default output device using
//! [cpal](https://crates.io/crates/cpal), asking its client for frames over a
//! crossbeam channel.

use crate::{CrossbeamChannel, ProvidesService};
use anyhow::anyhow;
use core::fmt::Debug;
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, FromSample, Sample as CpalSample, SizedSample, Stream, StreamConfig,
    SupportedStreamConfig,
};
use crossbeam::{
    channel::{Receiver, Sender},
    queue::ArrayQueue,
};
use delegate::delegate;
use harmonic_drone::types::StereoSample;
use std::sync::Arc;

/// The fundamental type of an audio sample.
pub type AudioSampleType = f32;
/// (left channel, right channel)
pub type AudioStereoSampleType = (AudioSampleType, AudioSampleType);

/// A ring buffer of stereo samples that the audio stream consumes.
#[derive(Clone)]
struct AudioQueue(Arc<ArrayQueue<AudioStereoSampleType>>);
impl AudioQueue {
    fn new(buffer_size: usize) -> Self {
        Self(Arc::new(ArrayQueue::new(buffer_size)))
    }

    delegate! {
        to self.0 {
            fn len(&self) -> usize;
            fn capacity(&self) -> usize;
            fn pop(&self) -> Option<AudioStereoSampleType>;
            fn force_push(&self, frame: AudioStereoSampleType) -> Option<AudioStereoSampleType>;
        }
    }
}

/// A [CpalAudioServiceInput] tells [CpalAudioService] what to do.
#[derive(Debug)]
pub enum CpalAudioServiceInput {
    /// Asks the service to exit.
    Quit,
    /// Audio for the output device, appended to the service's ring buffer.
    Frames(Arc<Vec<AudioStereoSampleType>>),
    /// Resumes the output stream. A new service plays without being asked.
    Play,
    /// Pauses the output stream.
    Pause,
}
impl CpalAudioServiceInput {
    /// Converts rendered frames to the service's sample format.
    pub fn frames_from(frames: &[StereoSample]) -> Self {
        Self::Frames(Arc::new(
            frames
                .iter()
                .map(|f| (f.0 .0 as AudioSampleType, f.1 .0 as AudioSampleType))
                .collect(),
        ))
    }
}

/// A [CpalAudioServiceEvent] informs clients what's going on.
#[derive(Debug)]
pub enum CpalAudioServiceEvent {
    /// The output stream is ready. Provides its sample rate and channel count.
    Reset(usize, u8),
    /// The output device will soon need this many frames. Send them with
    /// [CpalAudioServiceInput::Frames].
    FramesNeeded(usize),
    /// The output device asked for more frames than the ring buffer had.
    Underrun,
}

/// Owns the ring buffer and the thread that owns the cpal stream, since cpal
/// streams aren't `Send`. See <https://github.com/RustAudio/cpal/issues/818>.
struct StreamHandle {
    queue: AudioQueue,
    sample_rate: usize,
    channel_count: u8,
}
impl Debug for StreamHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("queue_len", &self.queue.len())
            .field("sample_rate", &self.sample_rate)
            .field("channel_count", &self.channel_count)
            .finish()
    }
}
impl StreamHandle {
    /// `period_size` is the number of frames the device reads at once
    /// <https://www.alsa-project.org/wiki/FramesPeriods>. The ring buffer holds
    /// three periods, so there's room to produce one while another drains.
    fn new_with(
        period_size: usize,
        sender: &Sender<CpalAudioServiceEvent>,
        receiver: &Receiver<CpalAudioServiceInput>,
    ) -> anyhow::Result<Self> {
        let (device, config) = Self::default_output()?;
        let queue = AudioQueue::new(period_size * 3);

        let receiver = receiver.clone();
        let sender = sender.clone();
        let thread_queue = queue.clone();
        let thread_config = config.clone();
        std::thread::spawn(move || {
            match Self::build_stream(&device, thread_config, period_size, thread_queue.clone(), sender)
            {
                Ok(stream) => Self::serve(&stream, &thread_queue, &receiver),
                Err(e) => log::error!("failed to set up audio stream: {e:?}"),
            }
        });
        Ok(Self {
            queue,
            sample_rate: config.sample_rate().0 as usize,
            channel_count: config.channels() as u8,
        })
    }

    fn serve(stream: &Stream, queue: &AudioQueue, receiver: &Receiver<CpalAudioServiceInput>) {
        while let Ok(input) = receiver.recv() {
            match input {
                CpalAudioServiceInput::Frames(frames) => {
                    let overrun = frames
                        .iter()
                        .filter(|frame| queue.force_push(**frame).is_some())
                        .count();
                    if overrun > 0 {
                        log::warn!("audio buffer overrun; dropped {overrun} frames");
                    }
                }
                CpalAudioServiceInput::Play => {
                    if let Err(e) = stream.play() {
                        log::warn!("couldn't play audio stream: {e}");
                    }
                }
                CpalAudioServiceInput::Pause => {
                    if let Err(e) = stream.pause() {
                        log::warn!("couldn't pause audio stream: {e}");
                    }
                }
                CpalAudioServiceInput::Quit => break,
            }
        }
    }

    fn default_output() -> anyhow::Result<(cpal::Device, SupportedStreamConfig)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("default output device is not available"))?;
        let config = device.default_output_config()?;
        Ok((device, config))
    }

    fn build_stream(
        device: &cpal::Device,
        config: SupportedStreamConfig,
        period_size: usize,
        queue: AudioQueue,
        sender: Sender<CpalAudioServiceEvent>,
    ) -> anyhow::Result<Stream> {
        let sample_format = config.sample_format();
        let mut config: StreamConfig = config.into();
        config.buffer_size = BufferSize::Fixed(period_size as u32);

        match sample_format {
            cpal::SampleFormat::I8 => Self::build::<i8>(&config, device, period_size, queue, sender),
            cpal::SampleFormat::I16 => {
                Self::build::<i16>(&config, device, period_size, queue, sender)
            }
            cpal::SampleFormat::I32 => {
                Self::build::<i32>(&config, device, period_size, queue, sender)
            }
            cpal::SampleFormat::U8 => Self::build::<u8>(&config, device, period_size, queue, sender),
            cpal::SampleFormat::U16 => {
                Self::build::<u16>(&config, device, period_size, queue, sender)
            }
            cpal::SampleFormat::U32 => {
                Self::build::<u32>(&config, device, period_size, queue, sender)
            }
            cpal::SampleFormat::F32 => {
                Self::build::<f32>(&config, device, period_size, queue, sender)
            }
            cpal::SampleFormat::F64 => {
                Self::build::<f64>(&config, device, period_size, queue, sender)
            }
            _ => Err(anyhow!("unsupported sample format {sample_format:?}")),
        }
    }

    fn build<T>(
        config: &StreamConfig,
        device: &cpal::Device,
        period_size: usize,
        queue: AudioQueue,
        sender: Sender<CpalAudioServiceEvent>,
    ) -> anyhow::Result<Stream>
    where
        T: SizedSample + FromSample<AudioSampleType>,
    {
        let channel_count = config.channels as usize;
        let stream = device.build_output_stream(
            config,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                Self::fill(output, channel_count, period_size, &queue, &sender)
            },
            |e| log::error!("audio stream error: {e}"),
            None,
        )?;
        Ok(stream)
    }

    /// The cpal callback. Drains the ring buffer into the device's buffer and
    /// asks the client for enough frames to keep up.
    fn fill<T>(
        output: &mut [T],
        channel_count: usize,
        period_size: usize,
        queue: &AudioQueue,
        sender: &Sender<CpalAudioServiceEvent>,
    ) where
        T: CpalSample + FromSample<AudioSampleType>,
    {
        let have = queue.len();
        let need = output.len() / channel_count.max(1);

        // Ask for extra when falling behind, and less when far ahead.
        let request = if have < need {
            need * 2
        } else if have > need * 2 {
            need / 2
        } else {
            need
        }
        .min(period_size);

        for frame in output.chunks_exact_mut(channel_count) {
            match queue.pop() {
                Some((left, right)) => {
                    frame[0] = T::from_sample(left);
                    if channel_count > 1 {
                        frame[1] = T::from_sample(right);
                    }
                }
                None => {
                    frame.fill(T::EQUILIBRIUM);
                    let _ = sender.try_send(CpalAudioServiceEvent::Underrun);
                }
            }
        }

        let request = (queue.capacity() - queue.len()).min(request);
        if request > 0 {
            let _ = sender.send(CpalAudioServiceEvent::FramesNeeded(request));
        }
    }
}

/// [CpalAudioService] provides channel-based communication with the cpal audio
/// interface.
#[derive(Debug)]
pub struct CpalAudioService {
    inputs: CrossbeamChannel<CpalAudioServiceInput>,
    events: CrossbeamChannel<CpalAudioServiceEvent>,

    #[allow(dead_code)]
    stream: StreamHandle,
}
impl ProvidesService<CpalAudioServiceInput, CpalAudioServiceEvent> for CpalAudioService {
    fn sender(&self) -> &Sender<CpalAudioServiceInput> {
        &self.inputs.sender
    }

    fn receiver(&self) -> &Receiver<CpalAudioServiceEvent> {
        &self.events.receiver
    }
}
impl Drop for CpalAudioService {
    fn drop(&mut self) {
        let _ = self.inputs.sender.send(CpalAudioServiceInput::Quit);
    }
}
impl CpalAudioService {
    /// A reasonable period size. At 44.1KHz, 512 frames is 11.6 milliseconds,
    /// which is about the edge of perceptible latency.
    const SUGGESTED_PERIOD_SIZE: usize = 512;

    /// Opens the default output device and starts playing. The first event is
    /// always [CpalAudioServiceEvent::Reset]. Fails if there's no usable
    /// output device.
    pub fn new_with(period_size: Option<usize>) -> anyhow::Result<Self> {
        let inputs: CrossbeamChannel<CpalAudioServiceInput> = Default::default();
        let events: CrossbeamChannel<CpalAudioServiceEvent> = Default::default();
        let period_size = period_size.unwrap_or(Self::SUGGESTED_PERIOD_SIZE);
        let stream = StreamHandle::new_with(period_size, &events.sender, &inputs.receiver)?;
        let _ = events.sender.send(CpalAudioServiceEvent::Reset(
            stream.sample_rate,
            stream.channel_count,
        ));
        log::info!(
            "audio output at {}Hz, {} channels",
            stream.sample_rate,
            stream.channel_count
        );
        Ok(Self {
            inputs,
            events,
            stream,
        })
    }
}
