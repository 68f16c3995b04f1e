//! Audio Stream Module
//!
//! This module handles CPAL audio stream management including:
//! - Stream initialization and configuration
//! - Audio callback setup
//! - Real-time message processing
//! - Error handling for audio stream operations

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Sample, Stream, StreamConfig};
use env_logger::{Builder, Env};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::audio_engine::constants::{
    BUBBLE_BUTTON_PIN, LOOP_BUTTON_PIN, MESSAGE_QUEUE_CAPACITY, NUM_DIGITAL_PINS, SENSOR_PIN,
};
use crate::audio_engine::errors::StreamError;
use crate::audio_engine::mixer::RtMixer;
use crate::audio_engine::platform_io::{Level, PlatformIo, SimulatedPins};
use crate::audio_engine::sample_bank::SampleBank;
use crate::config::EngineConfig;
use crate::messages::{AudioMessage, ControlMessage};

/// Handle to the audio stream with associated message channels
pub struct AudioStreamHandle {
    pub stream: Stream,
    pub producer: Producer<ControlMessage>,
    pub consumer: Consumer<AudioMessage>,
    pub output_sample_rate: u32,
}

/// Setup and configure the logger for audio operations
pub fn setup_logger() {
    // Users can override via `RUST_LOG`, e.g. `RUST_LOG=debug` to see every voice.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init()
        .unwrap_or(()); // Ignore initialization errors
}

/// Resting levels of the simulated pins: buttons released, sensor clear.
pub fn idle_pins(config: &EngineConfig) -> SimulatedPins {
    let mut rest = [Level::Low; NUM_DIGITAL_PINS];
    rest[LOOP_BUTTON_PIN] = config.button_idle_level();
    rest[BUBBLE_BUTTON_PIN] = config.button_idle_level();
    rest[SENSOR_PIN] = config.sensor_idle_level();
    SimulatedPins::new(rest)
}

/// One interleaved cpal output block plus the simulated digital pins.
pub struct CpalIo<'a> {
    data: &'a mut [f32],
    channels: usize,
    pins: &'a mut SimulatedPins,
}

impl<'a> CpalIo<'a> {
    /// Wraps `data`, silencing it first so channels the mixer doesn't write
    /// stay quiet.
    pub fn new(data: &'a mut [f32], channels: usize, pins: &'a mut SimulatedPins) -> Self {
        data.fill(Sample::EQUILIBRIUM);
        Self {
            data,
            channels,
            pins,
        }
    }
}

impl PlatformIo for CpalIo<'_> {
    fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.data.len() / self.channels
    }

    fn digital_read(&self, _frame: usize, pin: usize) -> Level {
        self.pins.level(pin)
    }

    // No GPIO outputs on a plain sound card; the indicator is dropped.
    fn digital_write(&mut self, _frame: usize, _pin: usize, _level: Level) {}

    fn audio_write(&mut self, frame: usize, channel: usize, value: f32) {
        if channel >= self.channels {
            return;
        }
        if let Some(sample) = self.data.get_mut(frame * self.channels + channel) {
            *sample = value;
        }
    }

    fn frame_done(&mut self, _frame: usize) {
        self.pins.advance();
    }
}

/// Applies one control message inside the audio callback.
pub fn apply_control_message<R: rand::Rng>(
    message: ControlMessage,
    mixer: &mut RtMixer<R>,
    pins: &mut SimulatedPins,
    producer_out: &mut Producer<AudioMessage>,
) {
    match message {
        ControlMessage::Ping => {
            let _ = producer_out.push(AudioMessage::Pong);
        }
        ControlMessage::SetInput { pin, level } => {
            pins.set(pin, level);
        }
        ControlMessage::Pulse { pin, level, frames } => {
            pins.pulse(pin, level, frames);
        }
        ControlMessage::ResetVoices => {
            mixer.reset_voices();
        }
    }
}

/// Create and configure the audio stream
///
/// This function:
/// 1. Sets up the default audio device
/// 2. Configures the stream with appropriate parameters
/// 3. Creates ring buffers for message passing
/// 4. Moves the mixer and the sample bank into the callback
/// 5. Builds and returns the audio stream
pub fn create_audio_stream(
    config: &EngineConfig,
    bank: SampleBank,
) -> Result<AudioStreamHandle, StreamError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(StreamError::NoDevice)?;

    let default_config = device.default_output_config()?;
    let sample_rate = default_config.sample_rate();
    let channels = default_config.channels();

    log::info!(
        "Starting AudioEngine... ({} ch@{} Hz, {} frames per block)",
        channels,
        sample_rate,
        config.block_size
    );

    for (id, buffer) in bank.iter().enumerate() {
        if let Some(rate) = buffer.sample_rate.filter(|&rate| rate != sample_rate) {
            log::warn!(
                "Sound {id} is {rate} Hz but the device runs at {sample_rate} Hz; \
                 it will play at the wrong pitch"
            );
        }
    }

    // Control thread -> audio thread
    let (producer_in, mut consumer_in) = RingBuffer::new(MESSAGE_QUEUE_CAPACITY);

    // Audio thread -> control thread
    let (mut producer_out, consumer_out) = RingBuffer::new(MESSAGE_QUEUE_CAPACITY);

    let mut mixer = RtMixer::from_config(config, bank);
    let mut pins = idle_pins(config);
    let output_channels = channels as usize;

    let stream_config = StreamConfig {
        channels,
        sample_rate,
        buffer_size: BufferSize::Fixed(config.block_size),
    };

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            while let Ok(message) = consumer_in.pop() {
                apply_control_message(message, &mut mixer, &mut pins, &mut producer_out);
            }

            let mut io = CpalIo::new(data, output_channels, &mut pins);
            mixer.render(&mut io, |message| {
                let _ = producer_out.push(message);
            });
        },
        |err| {
            log::error!("Audio stream error: {}", err);
        },
        None,
    )?;

    Ok(AudioStreamHandle {
        stream,
        producer: producer_in,
        consumer: consumer_out,
        output_sample_rate: sample_rate,
    })
}

/// Start playing the audio stream
pub fn start_stream(stream: &Stream) -> Result<(), StreamError> {
    stream.play()?;
    Ok(())
}
