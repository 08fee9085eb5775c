//! Mapping of decoded packets to a path blocked / path open signal.
//!
//! The device does not report obstruction directly beyond zero-length packets, so
//! a low mean payload intensity is taken as a blocked path. Each read is judged on
//! its own; there is no smoothing across frames.

use crate::config::Config;
use crate::frame::{decode, Decoded};

/// Operational state derived from one read.
///
/// A typical actuator lights solid red and plays a 1024 Hz tone for
/// `BlockedNoData`, lights purple with a 512 Hz tone for `BlockedLowIntensity`,
/// and turns the LEDs off for `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The device sent a zero-length packet.
    BlockedNoData,
    /// Mean payload intensity is below the configured threshold.
    BlockedLowIntensity,
    /// Mean payload intensity is at or above the threshold.
    Open,
}

impl Signal {
    pub fn is_blocked(self) -> bool {
        !matches!(self, Signal::Open)
    }
}

/// Arithmetic mean of the payload bytes, `None` for an empty payload.
pub fn mean_intensity(payload: &[u8]) -> Option<f32> {
    if payload.is_empty() {
        return None;
    }
    Some(intensity_sum(payload) as f32 / payload.len() as f32)
}

/// Classifies a payload against `threshold`.
///
/// The comparison is `mean < threshold`, evaluated on the integer sum so that a
/// mean of exactly `threshold` is always `Open`.
pub fn classify(payload: &[u8], threshold: u8) -> Option<Signal> {
    if payload.is_empty() {
        return None;
    }
    let limit = u64::from(threshold) * payload.len() as u64;
    if intensity_sum(payload) < limit {
        Some(Signal::BlockedLowIntensity)
    } else {
        Some(Signal::Open)
    }
}

/// Decodes and classifies one read. `None` means nothing should be actuated.
pub fn process(chunk: &[u8], config: &Config) -> Option<Signal> {
    match decode(chunk) {
        Decoded::Blocked { .. } => Some(Signal::BlockedNoData),
        Decoded::Frame(frame) => classify(frame.payload, config.avg_warning_threshold),
        Decoded::Skipped(_) => None,
    }
}

fn intensity_sum(payload: &[u8]) -> u64 {
    payload.iter().map(|&b| u64::from(b)).sum()
}
