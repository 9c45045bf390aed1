//! # tailwire
//!
//! A zero-copy binary interchange format with reverse-parsed trailing
//! metadata, and its in-memory codec.
//!
//! Messages (tag→value maps), lists (ordered sequences) and structs
//! (fixed-layout tuples) are encoded alongside scalar primitives. Every composite writes its metadata *after* the
//! payload: entry table, body size, table size, type byte. Readers parse
//! from the tail inward, so nested values are addressable directly inside
//! the parent's buffer without copying and without consuming forward
//! length prefixes.
//!
//! - [`Writer`] is a single-pass append-only encoder with a nested-object
//!   stack; it never produces partially-valid output (the first error
//!   poisons it).
//! - [`Message`], [`List`] and [`Struct`] are borrowed views with O(log n)
//!   field lookup and O(1) element lookup. Typed getters are tolerant:
//!   absent or ill-typed fields read as zero values, which keeps old
//!   binaries readable after a schema gains fields. [`validate_value`]
//!   and the views' `validate` methods are the strict path.
//! - Message field tables come in two widths; the writer picks the
//!   narrowest that fits all tags and offsets, and readers handle both.
//!
//! ## Example
//!
//! ```rust
//! use tailwire::{Message, Writer};
//!
//! let mut w = Writer::new();
//! w.begin_message()?;
//! w.string("hello")?;
//! w.field(1)?;
//! w.begin_list()?;
//! w.int64(1)?;
//! w.element()?;
//! w.int64(2)?;
//! w.element()?;
//! w.end_list()?;
//! w.field(2)?;
//! w.end_message()?;
//! let bytes = w.end()?;
//!
//! let msg = Message::new(&bytes)?;
//! assert_eq!(msg.get_str(1), "hello");
//! assert_eq!(msg.get_list(2).get_i64(1), 2);
//! assert_eq!(msg.get_u64(99), 0); // absent fields read as zero
//! # Ok::<(), tailwire::Error>(())
//! ```
//!
//! The codec is a buffer codec, not a stream codec: trailers sit at the
//! tail, so input must be complete and addressable by index. Writers are
//! single-threaded; views are immutable and freely shared across threads.

pub mod decode;
pub mod encode;

mod format;
mod list;
mod message;
mod pool;
mod structs;
mod types;
mod walker;
mod writer;

pub use list::{List, ListIter};
pub use message::{Message, MessageIter};
pub use pool::{pool, writer, PooledWriter, WriterPool};
pub use structs::Struct;
pub use types::*;
pub use walker::{size_distribution, validate_value, SizeDistribution};
pub use writer::{Writer, BUFFER_SIZE};

use thiserror::Error as ThisError;

/// Error type for all encoding and decoding operations in this crate.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// The input bytes do not form a valid value: unexpected type byte,
    /// truncated varuint, size exceeding the buffer, misaligned table,
    /// non-monotonic tags, or a missing string terminator.
    #[error("malformed data: {0}")]
    Malformed(String),

    /// A writer operation violated the composite protocol, e.g. `element`
    /// outside a list or an uncommitted value at `end`.
    #[error("invalid writer state: {0}")]
    State(String),

    /// A message carried the same tag twice.
    #[error("duplicate message tag {0}")]
    DuplicateTag(u16),

    /// A value or body length exceeds the 2^32-1 wire limit.
    #[error("value size {0} exceeds wire limit")]
    Overflow(usize),
}

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
