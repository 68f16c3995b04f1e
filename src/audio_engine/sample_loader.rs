//! Audio file loading and decoding functionality.
//!
//! This module decodes the bank's mono sound files into [`SampleBuffer`]s before
//! the real-time stream is started. Any failure aborts the whole bank.

use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::{
    audio::SampleBuffer as SymphoniaSampleBuffer,
    codecs::{
        CODEC_TYPE_PCM_F32BE, CODEC_TYPE_PCM_F32LE, CODEC_TYPE_PCM_F64BE, CODEC_TYPE_PCM_F64LE,
        CodecType, DecoderOptions,
    },
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};

use crate::audio_engine::constants::{NORMALIZE_CEILING, SILENCE_THRESHOLD};
use crate::audio_engine::errors::{SampleBankError, SampleLoadError};
use crate::audio_engine::sample_bank::{SampleBank, SampleBuffer};

/// Path of sound `index` inside `dir`, following the `magic<i>.wav` convention.
pub fn sample_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("magic{index}.wav"))
}

/// Loads `count` sounds from `dir` into a [`SampleBank`].
///
/// Stops at the first file that fails; no partially populated bank is ever
/// returned.
pub fn load_sample_bank(dir: &Path, count: usize) -> Result<SampleBank, SampleBankError> {
    let mut buffers = Vec::with_capacity(count);

    for index in 0..count {
        let path = sample_path(dir, index);
        let buffer = decode_mono_file(&path)
            .map_err(|source| SampleBankError::Load { path, source })?;
        buffers.push(buffer);
    }

    SampleBank::new(buffers)
}

/// Decodes a mono audio file into a sample buffer.
///
/// The declared frame count of the file is authoritative: a short read is
/// zero-padded and surplus decoded frames are cropped. Float-encoded files are
/// rescaled so their peak sits at [`NORMALIZE_CEILING`].
///
/// # Errors
///
/// - File not found or cannot be opened
/// - Audio format not recognized or corrupted
/// - More than one channel
/// - No frames at all
pub fn decode_mono_file(path: &Path) -> Result<SampleBuffer, SampleLoadError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or(SampleLoadError::NoDefaultTrack)?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let channels = codec_params
        .channels
        .ok_or(SampleLoadError::MissingChannels)?
        .count();
    if channels != 1 {
        return Err(SampleLoadError::NotMono { channels });
    }

    let mut decoder = get_codecs().make(&codec_params, &DecoderOptions::default())?;

    let mut decoded: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(SampleLoadError::Decode(err)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let audio_buf = decoder.decode(&packet)?;
        let spec = *audio_buf.spec();
        let duration = audio_buf.capacity() as u64;

        let mut sample_buf = SymphoniaSampleBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(audio_buf);
        decoded.extend_from_slice(sample_buf.samples());
    }

    let read_count = decoded.len();
    let frames = fit_to_declared_frames(&mut decoded, codec_params.n_frames)?;

    let gain = if is_float_codec(codec_params.codec) {
        normalize_peak(&mut decoded)
    } else {
        1.0
    };

    log::info!(
        "Loaded {} ({} frames, {} read, gain {:.4})",
        path.display(),
        frames,
        read_count.min(frames),
        gain
    );

    Ok(SampleBuffer::new(decoded, codec_params.sample_rate))
}

/// Pads with zeros or crops `decoded` to the `declared` frame count and
/// returns the resulting length. Without a declaration the decoded length is
/// kept.
fn fit_to_declared_frames(
    decoded: &mut Vec<f32>,
    declared: Option<u64>,
) -> Result<usize, SampleLoadError> {
    let frames = declared
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(decoded.len());
    if frames == 0 {
        return Err(SampleLoadError::Empty);
    }

    decoded.resize(frames, 0.0);
    Ok(frames)
}

fn is_float_codec(codec: CodecType) -> bool {
    [
        CODEC_TYPE_PCM_F32LE,
        CODEC_TYPE_PCM_F32BE,
        CODEC_TYPE_PCM_F64LE,
        CODEC_TYPE_PCM_F64BE,
    ]
    .contains(&codec)
}

/// Rescales `samples` in place so the peak magnitude equals
/// [`NORMALIZE_CEILING`] and returns the applied gain.
///
/// Buffers whose peak is below [`SILENCE_THRESHOLD`] are left untouched.
pub fn normalize_peak(samples: &mut [f32]) -> f32 {
    let peak = samples
        .iter()
        .fold(0.0f64, |peak, s| peak.max(f64::from(s.abs())));

    if peak < SILENCE_THRESHOLD {
        return 1.0;
    }

    let gain = (f64::from(NORMALIZE_CEILING) / peak) as f32;
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
    gain
}
