//! JSON frame extraction from a noisy byte stream
//!
//! [`FrameFilter`] accumulates raw stdout bytes and emits every complete JSON
//! object or array it can find. Anything else (banners, log lines, partial
//! output) is held until it can be resolved, or dropped once it is clearly
//! noise.
//!
//! Frames are normally newline-delimited. A frame without a trailing newline is
//! still emitted as soon as the buffered text parses as a whole.

use serde::de::IgnoredAny;

/// Default size past which a buffer holding no JSON start is discarded
pub const DEFAULT_NOISE_THRESHOLD: usize = 1000;

/// Default hard cap on buffered bytes
pub const DEFAULT_MAX_BUFFER: usize = 100_000;

/// Buffer bounds for a [`FrameFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterLimits {
    /// A buffer with no `{` or `[` larger than this is cleared
    pub noise_threshold: usize,
    /// A buffer larger than this after extraction is cleared
    pub max_buffer: usize,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self {
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            max_buffer: DEFAULT_MAX_BUFFER,
        }
    }
}

/// Whether the filter is holding any bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Empty,
    Accumulating,
}

/// Incremental JSON frame extractor
#[derive(Debug, Default)]
pub struct FrameFilter {
    buffer: Vec<u8>,
    limits: FilterLimits,
}

impl FrameFilter {
    pub fn new(limits: FilterLimits) -> Self {
        Self {
            buffer: Vec::new(),
            limits,
        }
    }

    pub fn state(&self) -> BufferState {
        if self.buffer.is_empty() {
            BufferState::Empty
        } else {
            BufferState::Accumulating
        }
    }

    /// Bytes currently held
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append `chunk` and return every frame that became complete
    ///
    /// Newline-delimited frames are returned with a trailing `\n`. A frame
    /// recognized without one is returned as-is.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let frames = self.extract();

        if self.buffer.len() > self.limits.max_buffer {
            tracing::warn!(
                bytes = self.buffer.len(),
                limit = self.limits.max_buffer,
                "Stream buffer overflow, discarding"
            );
            self.buffer.clear();
        }
        frames
    }

    /// Final attempt on whatever is left once the stream has ended
    pub fn finish(&mut self) -> Option<String> {
        let text = decode(&self.buffer);
        self.buffer.clear();

        let text = text.trim();
        (starts_frame(text) && is_json(text)).then(|| text.to_string())
    }

    fn extract(&mut self) -> Vec<String> {
        let mut frames = Vec::new();

        loop {
            let Some(start) = frame_start(&self.buffer) else {
                if self.buffer.len() > self.limits.noise_threshold {
                    tracing::debug!(bytes = self.buffer.len(), "Discarding non-JSON output");
                    self.buffer.clear();
                }
                return frames;
            };

            // Preamble before the first frame is never needed again
            self.buffer.drain(..start);

            if let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
                let line = decode(&self.buffer[..newline]);
                let line = line.trim();
                if is_json(line) {
                    frames.push(format!("{line}\n"));
                    self.buffer.drain(..=newline);
                    continue;
                }
            }

            let rest = decode(&self.buffer);
            let rest = rest.trim();
            if is_json(rest) {
                frames.push(rest.to_string());
                self.buffer.clear();
            }
            return frames;
        }
    }
}

/// Where the next frame starts
///
/// Objects win: a `[` only starts a frame when no `{` is buffered.
fn frame_start(buffer: &[u8]) -> Option<usize> {
    buffer
        .iter()
        .position(|&b| b == b'{')
        .or_else(|| buffer.iter().position(|&b| b == b'['))
}

/// Decode UTF-8, dropping invalid byte sequences
fn decode(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

fn starts_frame(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[')
}

/// Whether `text` is exactly one JSON value
fn is_json(text: &str) -> bool {
    serde_json::from_str::<IgnoredAny>(text).is_ok()
}
