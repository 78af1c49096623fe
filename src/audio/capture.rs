//! Microphone capture using CPAL (Cross-Platform Audio Library).
//!
//! The hardware callback pushes normalized f32 samples into a shared
//! backlog; `next_chunk` assembles fixed-size windows from it according to
//! the configured capture mode.

use crate::audio::chunk::{AudioChunk, samples_per_chunk};
use crate::audio::source::CaptureSource;
use crate::config::{AudioConfig, CaptureMode};
use crate::defaults;
use crate::error::{LivecapError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Preferred device names for GNOME/PipeWire environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for voice input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List all available audio input devices with filtering and recommendations.
///
/// Preferred devices are marked with "\[recommended\]". Obviously unusable
/// devices (surround channels, HDMI, etc.) are filtered out.
///
/// # Errors
/// Returns `LivecapError::AudioCapture` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| LivecapError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }
            if is_preferred_device(&name) {
                device_names.push(format!("{} [recommended]", name));
            } else {
                device_names.push(name);
            }
        }
    }

    Ok(device_names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio.
///
/// This respects the desktop's audio device selection rather than raw ALSA
/// defaults.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name()
                    && is_preferred_device(&name)
                {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| LivecapError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is owned by the capture source and only accessed from
/// the thread driving `next_chunk`/`stop`; its methods never cross thread
/// boundaries unsafely.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Shared state between the hardware callback and the consumer.
struct Backlog {
    samples: VecDeque<f32>,
    /// Sample bound for asynchronous mode; unbounded (usize::MAX) otherwise.
    max_samples: usize,
    dropped: u64,
}

/// Microphone capture source backed by CPAL.
///
/// Captures 16kHz mono f32; falls back to an i16 stream with software
/// conversion for devices that only expose integer formats.
///
/// The two capture modes share this one type:
/// - `Synchronous`: `next_chunk` clears the backlog and accumulates fresh
///   samples, so audio recorded during processing of the previous chunk is
///   discarded (implicit back-pressure).
/// - `Asynchronous`: the backlog is bounded at a few chunks' worth; on
///   overflow the callback drops the oldest samples and the drop is reported
///   on the next chunk boundary.
pub struct CpalCaptureSource {
    device: cpal::Device,
    stream: Option<SendableStream>,
    backlog: Arc<Mutex<Backlog>>,
    stream_error: Arc<Mutex<Option<String>>>,
    mode: CaptureMode,
    sample_rate: u32,
    chunk_samples: usize,
    reported_drops: u64,
}

impl CpalCaptureSource {
    /// Create a capture source for the configured device and chunk geometry.
    ///
    /// # Errors
    /// `AudioDeviceNotFound` if the named device (or any default input
    /// device) is missing; `AudioCapture` if enumeration fails.
    pub fn new(config: &AudioConfig) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = config.device.as_deref() {
                let devices = host
                    .input_devices()
                    .map_err(|e| LivecapError::AudioCapture {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                let mut found_device = None;
                for dev in devices {
                    if let Ok(dev_name) = dev.name()
                        && dev_name == name
                    {
                        found_device = Some(dev);
                        break;
                    }
                }

                found_device.ok_or_else(|| LivecapError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })?;

        let chunk_samples = samples_per_chunk(config.chunk_duration_secs, config.sample_rate);
        let max_samples = match config.capture_mode {
            CaptureMode::Synchronous => usize::MAX,
            CaptureMode::Asynchronous => chunk_samples * defaults::ASYNC_BACKLOG_CHUNKS,
        };

        Ok(Self {
            device,
            stream: None,
            backlog: Arc::new(Mutex::new(Backlog {
                samples: VecDeque::new(),
                max_samples,
                dropped: 0,
            })),
            stream_error: Arc::new(Mutex::new(None)),
            mode: config.capture_mode,
            sample_rate: config.sample_rate,
            chunk_samples,
            reported_drops: 0,
        })
    }

    /// Build the input stream, trying f32 mono at the target rate first,
    /// then i16 mono with software conversion.
    fn build_stream(&self) -> Result<cpal::Stream> {
        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let error_slot = Arc::clone(&self.stream_error);
        let err_callback = move |err: cpal::StreamError| {
            if let Ok(mut slot) = error_slot.lock() {
                *slot = Some(err.to_string());
            }
        };

        // f32/16kHz/mono — PipeWire/PulseAudio convert transparently
        let backlog = Arc::clone(&self.backlog);
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                push_samples(&backlog, data.iter().copied());
            },
            err_callback.clone(),
            None,
        ) {
            return Ok(stream);
        }

        // i16/16kHz/mono — for devices that only expose integer formats
        let backlog = Arc::clone(&self.backlog);
        self.device
            .build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    push_samples(
                        &backlog,
                        data.iter().map(|&s| s as f32 / i16::MAX as f32),
                    );
                },
                err_callback,
                None,
            )
            .map_err(|e| LivecapError::AudioCapture {
                message: format!("Failed to build input stream: {}", e),
            })
    }

    fn take_stream_error(&self) -> Option<String> {
        self.stream_error.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Append samples to the backlog, evicting the oldest on overflow.
fn push_samples(backlog: &Arc<Mutex<Backlog>>, samples: impl Iterator<Item = f32>) {
    if let Ok(mut state) = backlog.lock() {
        state.samples.extend(samples);
        let max = state.max_samples;
        while state.samples.len() > max {
            state.samples.pop_front();
            state.dropped += 1;
        }
    }
}

impl CaptureSource for CpalCaptureSource {
    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(()); // Already started
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| LivecapError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;
        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    fn next_chunk(&mut self, running: &AtomicBool) -> Result<Option<AudioChunk>> {
        if self.stream.is_none() {
            return Err(LivecapError::AudioCapture {
                message: "capture source not started".to_string(),
            });
        }

        // Synchronous mode records from now: drop whatever accumulated while
        // the previous chunk was being processed.
        if self.mode == CaptureMode::Synchronous
            && let Ok(mut state) = self.backlog.lock()
        {
            state.samples.clear();
        }

        let poll_interval = Duration::from_millis(defaults::CAPTURE_POLL_INTERVAL_MS);
        let mut samples: Vec<f32> = Vec::with_capacity(self.chunk_samples);

        loop {
            if !running.load(Ordering::SeqCst) {
                return Ok(None);
            }
            if let Some(message) = self.take_stream_error() {
                return Err(LivecapError::AudioCapture { message });
            }

            {
                let mut state = self.backlog.lock().map_err(|e| LivecapError::AudioCapture {
                    message: format!("Failed to lock capture backlog: {}", e),
                })?;
                let needed = self.chunk_samples - samples.len();
                let take = needed.min(state.samples.len());
                samples.extend(state.samples.drain(..take));

                if state.dropped > self.reported_drops {
                    let new_drops = state.dropped - self.reported_drops;
                    self.reported_drops = state.dropped;
                    eprintln!(
                        "livecap: capture backlog overflow, dropped {} oldest sample(s)",
                        new_drops
                    );
                }
            }

            if samples.len() == self.chunk_samples {
                break;
            }
            std::thread::sleep(poll_interval);
        }

        Ok(Some(AudioChunk::new(samples, self.sample_rate)))
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            stream.0.pause().map_err(|e| LivecapError::AudioCapture {
                message: format!("Failed to stop audio stream: {}", e),
            })?;
        }
        Ok(())
    }
}
