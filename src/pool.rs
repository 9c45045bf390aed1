//! Writer pool.
//!
//! Writers carry preallocated object and table stacks; pooling them keeps
//! typical messages allocation-free. A released writer is reset: its
//! stacks stay with it, logically empty, while the output buffer of a
//! finished write has already been handed to the caller by `end`.

use std::ops::{Deref, DerefMut};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::writer::Writer;

/// Writers retained per pool; acquisitions beyond this allocate fresh
/// instances and releases beyond it drop them.
const POOL_CAPACITY: usize = 32;

static GLOBAL: Lazy<WriterPool> = Lazy::new(WriterPool::new);

/// The process-global writer pool.
pub fn pool() -> &'static WriterPool {
    &GLOBAL
}

/// Acquires a writer from the global pool.
///
/// ```
/// let mut w = tailwire::writer();
/// w.begin_message()?;
/// w.end_message()?;
/// let bytes = w.end()?;
/// # assert_eq!(bytes.len(), 3);
/// # Ok::<(), tailwire::Error>(())
/// ```
pub fn writer() -> PooledWriter<'static> {
    GLOBAL.get()
}

/// A pool of reusable [`Writer`] instances.
#[derive(Debug, Default)]
pub struct WriterPool {
    writers: Mutex<Vec<Writer>>,
}

impl WriterPool {
    pub const fn new() -> Self {
        WriterPool {
            writers: Mutex::new(Vec::new()),
        }
    }

    /// Acquires a writer, reusing a pooled instance when available. The
    /// writer returns to the pool when the guard is dropped.
    pub fn get(&self) -> PooledWriter<'_> {
        let writer = self.writers.lock().pop().unwrap_or_default();
        PooledWriter {
            pool: self,
            writer: Some(writer),
        }
    }

    fn put(&self, mut writer: Writer) {
        writer.reset();
        let mut writers = self.writers.lock();
        if writers.len() < POOL_CAPACITY {
            writers.push(writer);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.writers.lock().len()
    }
}

/// RAII guard around a pooled [`Writer`].
#[derive(Debug)]
pub struct PooledWriter<'a> {
    pool: &'a WriterPool,
    writer: Option<Writer>,
}

impl PooledWriter<'_> {
    /// Detaches the writer from the pool; it will not be returned on drop.
    pub fn detach(mut self) -> Writer {
        match self.writer.take() {
            Some(writer) => writer,
            None => Writer::new(),
        }
    }
}

impl Deref for PooledWriter<'_> {
    type Target = Writer;

    fn deref(&self) -> &Writer {
        match &self.writer {
            Some(writer) => writer,
            None => unreachable!("writer already detached"),
        }
    }
}

impl DerefMut for PooledWriter<'_> {
    fn deref_mut(&mut self) -> &mut Writer {
        match &mut self.writer {
            Some(writer) => writer,
            None => unreachable!("writer already detached"),
        }
    }
}

impl Drop for PooledWriter<'_> {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            self.pool.put(writer);
        }
    }
}
