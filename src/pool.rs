use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;

use crate::buffer::{Buffer, BufferPool};
use crate::clock::StartClock;

/// Pool sizing.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Initial capacity of freshly allocated buffers.
    pub buffer_capacity: usize,
    /// Upper bound on buffers kept for reuse.
    pub max_idle_buffers: usize,
    /// Upper bound on encoder shells kept for reuse.
    pub max_idle_encoders: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1024,
            max_idle_buffers: 256,
            max_idle_encoders: 256,
        }
    }
}

/// The recyclable part of an encoder: its clock and the buffer it writes to.
///
/// A shell coming out of [`EncoderPool::acquire`] has no buffer attached
/// (an empty, unallocated `Buffer`).
#[derive(Debug, Default)]
pub struct EncoderShell {
    pub(crate) clock: StartClock,
    pub(crate) buf: Buffer,
}

/// Thread-safe free list of boxed encoder shells.
pub struct EncoderPool {
    idle: Mutex<Vec<Box<EncoderShell>>>,
    max_idle: usize,
}

impl EncoderPool {
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    /// Hands out a recycled shell, or a fresh one if none is idle.
    pub fn acquire(&self) -> Box<EncoderShell> {
        if let Some(shell) = self.idle.lock().pop() {
            return shell;
        }
        tracing::trace!("allocating encoder shell");
        Box::default()
    }

    /// Detaches the shell's buffer and keeps the shell for reuse.
    ///
    /// The buffer is not returned to any pool here; whoever took it out of
    /// the shell owns it.
    pub fn release(&self, mut shell: Box<EncoderShell>) {
        shell.buf = Buffer::default();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(shell);
        }
    }

    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }
}

impl fmt::Debug for EncoderPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderPool")
            .field("idle", &self.idle())
            .field("max_idle", &self.max_idle)
            .finish()
    }
}

/// Buffer and encoder pools used together by one logging setup.
///
/// Shared across threads behind an `Arc`; every encoder keeps a handle to the
/// bundle it was built from so clones and recycling go back to the same pools.
#[derive(Debug)]
pub struct EncoderPools {
    buffers: BufferPool,
    encoders: EncoderPool,
}

impl EncoderPools {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            buffers: BufferPool::new(config.buffer_capacity, config.max_idle_buffers),
            encoders: EncoderPool::new(config.max_idle_encoders),
        }
    }

    /// Process-wide pools with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pretty_log::EncoderPools;
    /// # use std::sync::Arc;
    /// let a = EncoderPools::shared();
    /// let b = EncoderPools::shared();
    /// assert!(Arc::ptr_eq(&a, &b));
    /// ```
    pub fn shared() -> Arc<EncoderPools> {
        Arc::clone(&SHARED_POOLS)
    }

    pub fn buffers(&self) -> &BufferPool {
        &self.buffers
    }

    pub fn encoders(&self) -> &EncoderPool {
        &self.encoders
    }

    pub fn acquire_buffer(&self) -> Buffer {
        self.buffers.acquire()
    }

    /// Returns a buffer produced by entry rendering once it has been written.
    pub fn release_buffer(&self, buf: Buffer) {
        self.buffers.release(buf)
    }
}

impl Default for EncoderPools {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

lazy_static! {
    /// Pools used by encoders that were not given an explicit bundle.
    static ref SHARED_POOLS: Arc<EncoderPools> = Arc::new(EncoderPools::default());
}
