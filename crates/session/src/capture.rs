//! Capture buffer
//!
//! Audio chunks arrive from the capture side at its own cadence and are
//! drained by the transcription pump. `swap` takes the whole batch in one
//! step, so a chunk appended while a flush is in flight simply lands in the
//! fresh buffer and rides the next flush.

use parking_lot::Mutex;

/// Concurrent chunk buffer with atomic swap semantics
#[derive(Default)]
pub struct CaptureBuffer {
    chunks: Mutex<Vec<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one captured chunk.
    pub fn append(&self, chunk: impl Into<Vec<u8>>) {
        let chunk = chunk.into();
        if chunk.is_empty() {
            return;
        }
        self.chunks.lock().push(chunk);
    }

    /// Take all accumulated chunks, leaving the buffer empty.
    pub fn swap(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.chunks.lock())
    }

    /// Total bytes currently buffered.
    pub fn len_bytes(&self) -> usize {
        self.chunks.lock().iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_swap() {
        let buffer = CaptureBuffer::new();
        buffer.append(vec![1u8; 100]);
        buffer.append(vec![2u8; 50]);
        assert_eq!(buffer.len_bytes(), 150);

        let chunks = buffer.swap();
        assert_eq!(chunks.len(), 2);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_bytes(), 0);
    }

    #[test]
    fn test_empty_chunks_ignored() {
        let buffer = CaptureBuffer::new();
        buffer.append(Vec::new());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_append_after_swap_lands_in_fresh_buffer() {
        let buffer = CaptureBuffer::new();
        buffer.append(vec![1u8; 10]);
        let first = buffer.swap();
        buffer.append(vec![2u8; 20]);

        assert_eq!(first.len(), 1);
        assert_eq!(buffer.len_bytes(), 20);
    }
}
