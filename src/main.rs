use std::io::BufRead;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use magic_bubbles::EngineConfig;
use magic_bubbles::audio_engine::constants::{BUBBLE_BUTTON_PIN, LOOP_BUTTON_PIN, SENSOR_PIN};
use magic_bubbles::audio_engine::{
    AudioStreamHandle, Level, create_audio_stream, load_sample_bank, setup_logger, start_stream,
};
use magic_bubbles::config::parse_sound_range;
use magic_bubbles::messages::{AudioMessage, ControlMessage};

/// How often the control loop wakes up.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a simulated button press is held.
const BUTTON_PRESS: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[clap(
    version,
    about = "Plays a looping backing sound and triggers magic sounds when bubbles pass a sensor."
)]
struct Cli {
    /// Directory containing magic0.wav, magic1.wav, ...
    #[arg(short, long, default_value = ".")]
    samples: PathBuf,

    /// Number of sounds to load.
    #[arg(long)]
    sounds: Option<usize>,

    /// Maximum number of bubble sounds playing at once.
    #[arg(long)]
    voices: Option<usize>,

    /// Sound played by the loop button.
    #[arg(long)]
    loop_sound: Option<usize>,

    /// Sounds picked from on a sensor hit, as A-B.
    #[arg(long, value_parser = parse_sound_range)]
    bubble_sounds: Option<RangeInclusive<usize>>,

    /// Consecutive sensor frames needed for a hit.
    #[arg(long)]
    dwell: Option<u32>,

    /// Seed for sound selection.
    #[arg(long)]
    seed: Option<u64>,

    /// Frames per audio block.
    #[arg(long)]
    block_size: Option<u32>,

    /// Buttons read high while pressed.
    #[arg(long)]
    buttons_active_high: bool,

    /// The sensor reads high while it detects a bubble.
    #[arg(long)]
    sensor_active_high: bool,
}

impl Cli {
    fn into_config(self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            sample_dir: self.samples,
            sound_count: self.sounds.unwrap_or(defaults.sound_count),
            max_voices: self.voices.unwrap_or(defaults.max_voices),
            loop_selection: self.loop_sound.unwrap_or(defaults.loop_selection),
            bubble_sounds: self.bubble_sounds.unwrap_or(defaults.bubble_sounds),
            dwell_threshold: self.dwell.unwrap_or(defaults.dwell_threshold),
            button_active_level: Level::from(self.buttons_active_high),
            sensor_active_level: Level::from(self.sensor_active_high),
            seed: self.seed,
            block_size: self.block_size.unwrap_or(defaults.block_size),
        }
    }
}

/// Keyboard commands read from stdin.
enum Command {
    Send(ControlMessage),
    Quit,
}

fn parse_command(line: &str, config: &EngineConfig, sample_rate: u32) -> Option<Command> {
    let press_frames = (u128::from(sample_rate) * BUTTON_PRESS.as_millis() / 1000) as usize;
    let press = |pin| {
        Command::Send(ControlMessage::Pulse {
            pin,
            level: config.button_active_level,
            frames: press_frames,
        })
    };

    match line.trim() {
        "l" => Some(press(LOOP_BUTTON_PIN)),
        "b" => Some(press(BUBBLE_BUTTON_PIN)),
        "w" => Some(Command::Send(ControlMessage::Pulse {
            pin: SENSOR_PIN,
            level: config.sensor_active_level,
            frames: config.dwell_threshold as usize,
        })),
        "r" => Some(Command::Send(ControlMessage::ResetVoices)),
        "p" => Some(Command::Send(ControlMessage::Ping)),
        "q" => Some(Command::Quit),
        _ => None,
    }
}

fn log_audio_message(message: AudioMessage) {
    match message {
        AudioMessage::Pong => log::info!("Pong"),
        AudioMessage::LoopToggled(enabled) => log::info!("Loop {}", on_off(enabled)),
        AudioMessage::BubbleModeToggled(enabled) => {
            log::info!("Bubble mode {}", on_off(enabled))
        }
        AudioMessage::VoiceStarted { slot, sound } => {
            log::debug!("Found a free slot with slot index {slot} for sound {sound}")
        }
        AudioMessage::VoiceDropped { sound } => {
            log::debug!("All slots taken, dropping sound {sound}")
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Sets `should_stop` on SIGINT, SIGTERM or SIGHUP instead of exiting, so the
/// stream is dropped cleanly.
fn install_stop_handler(should_stop: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || should_stop.store(true, Ordering::Relaxed))
}

fn run(handle: &mut AudioStreamHandle, config: &EngineConfig, should_stop: &AtomicBool) {
    let lines = spawn_stdin_reader();

    while !should_stop.load(Ordering::Relaxed) {
        while let Ok(line) = lines.try_recv() {
            match parse_command(&line, config, handle.output_sample_rate) {
                Some(Command::Send(message)) => {
                    if handle.producer.push(message).is_err() {
                        log::warn!("Control queue full, dropping {message:?}");
                    }
                }
                Some(Command::Quit) => should_stop.store(true, Ordering::Relaxed),
                None => log::warn!("Unknown command '{}' (l, b, w, r, p, q)", line.trim()),
            }
        }

        while let Ok(message) = handle.consumer.pop() {
            log_audio_message(message);
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn main() -> ExitCode {
    let config = Cli::parse().into_config();
    setup_logger();

    if let Err(err) = config.validate() {
        log::error!("Invalid configuration: {err}");
        return ExitCode::FAILURE;
    }

    let bank = match load_sample_bank(&config.sample_dir, config.sound_count) {
        Ok(bank) => bank,
        Err(err) => {
            log::error!("{err}");
            log::error!("Unable to load magic sounds. Check that you have all the WAV files!");
            return ExitCode::FAILURE;
        }
    };

    let mut handle = match create_audio_stream(&config, bank) {
        Ok(handle) => handle,
        Err(err) => {
            log::error!("Unable to initialise audio: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = start_stream(&handle.stream) {
        log::error!("Unable to start real-time audio: {err}");
        return ExitCode::FAILURE;
    }

    let should_stop = Arc::new(AtomicBool::new(false));
    if let Err(err) = install_stop_handler(should_stop.clone()) {
        log::warn!("Couldn't install stop handler: {err}");
    }

    log::info!("Running. Keys: l = loop, b = bubble mode, w = wand/sensor, r = reset, q = quit");
    run(&mut handle, &config, &should_stop);

    log::info!("Stopping audio");
    drop(handle);
    ExitCode::SUCCESS
}
