//! Audio capture and gating: chunk assembly, silence detection, devices.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod chunk;
pub mod gate;
pub mod source;

pub use chunk::AudioChunk;
pub use source::CaptureSource;
