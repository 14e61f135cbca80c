//! Shared text-buffer pool for statement builders.
//!
//! A builder checks out one buffer when it is created and gives it back when
//! it renders or is dropped. The pool also counts open builders and logs a
//! soft leak warning when the count crosses the configured high-water mark.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Buffer pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Buffers kept for reuse; extra returned buffers are dropped.
    pub max_pooled_buffers: usize,
    /// Capacity of freshly allocated buffers.
    pub initial_buffer_capacity: usize,
    /// Open builders above which a leak warning is logged.
    pub open_builder_warn_threshold: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pooled_buffers: 64,
            initial_buffer_capacity: 256,
            open_builder_warn_threshold: 1024,
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_pooled_buffers(mut self, n: usize) -> Self {
        self.max_pooled_buffers = n;
        self
    }

    pub fn with_initial_buffer_capacity(mut self, n: usize) -> Self {
        self.initial_buffer_capacity = n;
        self
    }

    pub fn with_open_builder_warn_threshold(mut self, n: usize) -> Self {
        self.open_builder_warn_threshold = n;
        self
    }
}

/// Lock-protected free list of `String` buffers.
#[derive(Debug)]
pub struct BufferPool {
    config: PoolConfig,
    free: Mutex<Vec<String>>,
    open: AtomicUsize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl BufferPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(config.max_pooled_buffers)),
            config,
            open: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Check out a cleared buffer. It returns to the pool when dropped.
    pub fn acquire(self: &Arc<Self>) -> PooledBuffer {
        let buf = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_else(|| String::with_capacity(self.config.initial_buffer_capacity));

        let open = self.open.fetch_add(1, Ordering::Relaxed) + 1;
        if open == self.config.open_builder_warn_threshold + 1 {
            warn!(
                target: "cqlorm.pool",
                open,
                threshold = self.config.open_builder_warn_threshold,
                "open statement builders exceed threshold; builders may be leaking without render"
            );
        }

        PooledBuffer {
            buf,
            pool: Arc::clone(self),
        }
    }

    fn release(&self, mut buf: String) {
        self.open.fetch_sub(1, Ordering::Relaxed);
        buf.clear();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.config.max_pooled_buffers {
            free.push(buf);
        } else {
            debug!(target: "cqlorm.pool", pooled = free.len(), "pool full, dropping buffer");
        }
    }

    /// Builders holding a buffer right now.
    pub fn open_builders(&self) -> usize {
        self.open.load(Ordering::Relaxed)
    }

    /// Buffers waiting for reuse.
    pub fn pooled(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// A checked-out buffer. Dropping it returns the buffer to its pool.
#[derive(Debug)]
pub struct PooledBuffer {
    buf: String,
    pool: Arc<BufferPool>,
}

impl Deref for PooledBuffer {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
