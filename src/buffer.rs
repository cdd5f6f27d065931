use std::fmt;
use std::io;

use parking_lot::Mutex;

/// Growable, append-only byte buffer that an encoder renders into.
///
/// A `Buffer` is owned by exactly one encoder at a time. When an entry is
/// rendered the buffer moves to the caller, who writes it to a sink and hands
/// it back to the [`BufferPool`] it came from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    /// Creates an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn append_byte(&mut self, b: u8) {
        self.bytes.push(b);
    }

    #[inline]
    pub fn append_bytes(&mut self, b: &[u8]) {
        self.bytes.extend_from_slice(b);
    }

    #[inline]
    pub fn append_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    /// Appends the decimal form of `n`.
    pub fn append_int(&mut self, n: i64) {
        self.append_str(&n.to_string());
    }

    /// The byte written last, used by the separator rule.
    #[inline]
    pub fn last_byte(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lossy UTF-8 view; byte-string fields may carry arbitrary bytes.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Resets the length to zero, keeping the allocation.
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s);
        Ok(())
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Thread-safe free list of [`Buffer`]s.
///
/// `acquire` never fails: when the free list is empty a fresh buffer is
/// allocated. `release` truncates the buffer and keeps it for reuse unless the
/// free list already holds `max_idle` buffers.
pub struct BufferPool {
    idle: Mutex<Vec<Buffer>>,
    capacity: usize,
    max_idle: usize,
}

impl BufferPool {
    pub fn new(capacity: usize, max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            capacity,
            max_idle,
        }
    }

    /// Hands out an empty buffer.
    pub fn acquire(&self) -> Buffer {
        if let Some(buf) = self.idle.lock().pop() {
            return buf;
        }
        tracing::trace!(capacity = self.capacity, "allocating buffer");
        Buffer::with_capacity(self.capacity)
    }

    /// Returns a buffer for reuse. Its length is reset; contents are not wiped.
    pub fn release(&self, mut buf: Buffer) {
        buf.reset();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(buf);
        } else {
            tracing::trace!(max_idle = self.max_idle, "buffer pool full, dropping buffer");
        }
    }

    /// Number of buffers waiting in the free list.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("idle", &self.idle())
            .field("capacity", &self.capacity)
            .field("max_idle", &self.max_idle)
            .finish()
    }
}
