//! # Errors
//!
//! The engines themselves never fail while processing: parameters are
//! trusted, and every buffer they own was sized at construction. The only
//! things that can go wrong are at the edges, when a caller hands us
//! buffers that don't line up or asks for a sample rate the ring buffers
//! were not sized for. Every failing call is rejected *before* any sample
//! is processed, so an error never leaves an engine half-advanced.

use thiserror::Error;

/// Result type for the library API.
pub type FxResult<T> = Result<T, FxError>;

/// Errors returned by the block-processing and construction API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    /// The input buffer holds more samples than the output can take.
    #[error("input buffer ({input} samples) is longer than output buffer ({output} samples)")]
    BufferTooShort {
        /// Length of the input buffer, in samples.
        input: usize,
        /// Length of the output buffer, in samples.
        output: usize,
    },

    /// An interleaved buffer does not contain a whole number of frames.
    #[error("buffer of {len} samples is not a whole number of {channels}-channel frames")]
    PartialFrame {
        /// Length of the offending buffer, in samples.
        len: usize,
        /// Channels per frame.
        channels: usize,
    },

    /// Two per-channel buffers handed in together differ in length.
    #[error("channel buffers differ in length: left has {left} samples, right has {right}")]
    ChannelMismatch {
        /// Length of the left channel.
        left: usize,
        /// Length of the right channel.
        right: usize,
    },

    /// The requested sample rate is outside the supported range.
    #[error("unsupported sample rate: {rate} Hz")]
    UnsupportedSampleRate {
        /// The rejected rate, in Hz.
        rate: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_too_short_message() {
        let err = FxError::BufferTooShort {
            input: 2048,
            output: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("2048"), "message should name input length: {msg}");
        assert!(msg.contains("1024"), "message should name output length: {msg}");
    }

    #[test]
    fn test_sample_rate_message() {
        let err = FxError::UnsupportedSampleRate { rate: 0.0 };
        assert!(err.to_string().contains("0 Hz"));
    }
}
