//! # Block Slicer
//!
//! Both engines derive their filter coefficients once per processing call
//! and hold them for the rest of that call. Handing an engine a whole file
//! in one call would therefore freeze its parameters for the whole file.
//! The slicer splits a long buffer into fixed-size chunks and runs the
//! engine once per chunk, so parameters written between chunks take
//! effect at the next chunk boundary.
//!
//! ```text
//! input:  |--- chunk ---|--- chunk ---|--- chunk ---|-- rest --|
//!               ▼             ▼             ▼            ▼
//!          block(...)    block(...)    block(...)   block(...)
//! ```
//!
//! Buffers are interleaved: a chunk of `N` frames of a 2-channel signal is
//! `2N` samples long.

use std::num::NonZeroUsize;

use crate::error::{FxError, FxResult};

/// Splits interleaved buffers into chunks of a fixed number of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSlicer {
    channels: NonZeroUsize,
    chunk_frames: NonZeroUsize,
}

impl BlockSlicer {
    /// Default chunk length, in frames.
    pub const DEFAULT_CHUNK_FRAMES: NonZeroUsize = match NonZeroUsize::new(1024) {
        Some(n) => n,
        None => unreachable!(),
    };

    pub const fn new(channels: NonZeroUsize, chunk_frames: NonZeroUsize) -> Self {
        Self {
            channels,
            chunk_frames,
        }
    }

    /// Chunk length in samples (frames × channels).
    pub fn chunk_samples(&self) -> usize {
        self.chunk_frames.get() * self.channels.get()
    }

    /// Check a buffer pair without touching it.
    ///
    /// The input must fit in the output and hold whole frames. Output
    /// samples past the input length are left untouched.
    pub fn check(&self, input_len: usize, output_len: usize) -> FxResult<()> {
        if input_len > output_len {
            return Err(FxError::BufferTooShort {
                input: input_len,
                output: output_len,
            });
        }
        self.check_frames(input_len)
    }

    fn check_frames(&self, len: usize) -> FxResult<()> {
        let channels = self.channels.get();
        if len % channels != 0 {
            return Err(FxError::PartialFrame { len, channels });
        }
        Ok(())
    }

    /// Run `block` over matching chunks of `input` and `output`.
    ///
    /// Fails before calling `block` at all if the buffers don't line up.
    pub fn run(
        &self,
        input: &[f32],
        output: &mut [f32],
        mut block: impl FnMut(&[f32], &mut [f32]),
    ) -> FxResult<()> {
        self.check(input.len(), output.len())?;

        let chunk = self.chunk_samples();
        let output = &mut output[..input.len()];
        for (input_chunk, output_chunk) in input.chunks(chunk).zip(output.chunks_mut(chunk)) {
            block(input_chunk, output_chunk);
        }

        Ok(())
    }

    /// Run `block` over consecutive chunks of a buffer processed in place.
    pub fn run_in_place(
        &self,
        buffer: &mut [f32],
        mut block: impl FnMut(&mut [f32]),
    ) -> FxResult<()> {
        self.check_frames(buffer.len())?;

        for chunk in buffer.chunks_mut(self.chunk_samples()) {
            block(chunk);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_chunks_cover_input_in_order() {
        let slicer = BlockSlicer::new(nz(1), nz(4));
        let input: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let mut output = vec![0.0; 10];
        let mut sizes = Vec::new();

        slicer
            .run(&input, &mut output, |i, o| {
                sizes.push(i.len());
                o.copy_from_slice(i);
            })
            .unwrap();

        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(output, input);
    }

    #[test]
    fn test_stereo_chunks_are_whole_frames() {
        let slicer = BlockSlicer::new(nz(2), nz(3));
        let input = vec![0.0; 14];
        let mut output = vec![0.0; 14];
        let mut sizes = Vec::new();

        slicer.run(&input, &mut output, |i, _| sizes.push(i.len())).unwrap();

        assert_eq!(sizes, vec![6, 6, 2]);
    }

    /// An input longer than the output fails without processing anything.
    #[test]
    fn test_rejects_short_output_without_processing() {
        let slicer = BlockSlicer::new(nz(1), nz(4));
        let input = vec![1.0; 8];
        let mut output = vec![0.0; 7];
        let mut calls = 0;

        let err = slicer.run(&input, &mut output, |_, _| calls += 1).unwrap_err();

        assert_eq!(err, FxError::BufferTooShort { input: 8, output: 7 });
        assert_eq!(calls, 0);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    /// A longer output is fine; the tail past the input stays untouched.
    #[test]
    fn test_longer_output_keeps_tail() {
        let slicer = BlockSlicer::new(nz(1), nz(2));
        let input = vec![1.0; 3];
        let mut output = vec![-1.0; 5];

        slicer.run(&input, &mut output, |i, o| o.copy_from_slice(i)).unwrap();

        assert_eq!(output, vec![1.0, 1.0, 1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_rejects_partial_frames() {
        let slicer = BlockSlicer::new(nz(2), nz(8));
        let mut buffer = vec![0.0; 5];

        let err = slicer.run_in_place(&mut buffer, |_| {}).unwrap_err();
        assert_eq!(err, FxError::PartialFrame { len: 5, channels: 2 });
    }

    #[test]
    fn test_empty_input_is_a_no_op() {
        let slicer = BlockSlicer::new(nz(2), BlockSlicer::DEFAULT_CHUNK_FRAMES);
        let mut calls = 0;
        slicer.run(&[], &mut [], |_, _| calls += 1).unwrap();
        assert_eq!(calls, 0);
    }
}
