//! Recursive value walker.
//!
//! One routine drives both strict validation and the size-distribution
//! diagnostic: it parses the value at the tail of a slice, dispatches on
//! the type byte, recurses into list elements and message fields, and
//! accounts every byte to a category. It fails on the first malformed
//! value.

use crate::decode::*;
use crate::list::List;
use crate::message::Message;
use crate::structs::Struct;
use crate::types::*;
use crate::{Error, Result};

/// Per-category byte counts of an encoded value.
///
/// `types` + `sizes` + `tables` + `values` + `bytes_payload` +
/// `string_payload` equals `total`: string payloads include their NUL
/// terminators, struct bodies count as opaque value bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeDistribution {
    /// Total size in bytes.
    pub total: usize,
    /// Type bytes.
    pub types: usize,
    /// Size varuints (body sizes, table sizes, bytes/string lengths).
    pub sizes: usize,
    /// List and message table bytes.
    pub tables: usize,
    /// Primitive value bytes, including opaque struct bodies.
    pub values: usize,
    /// Raw bytes payloads.
    pub bytes_payload: usize,
    /// String payloads, NUL terminators included.
    pub string_payload: usize,
}

impl SizeDistribution {
    /// Metadata bytes: type bytes plus size varuints.
    pub fn meta(&self) -> usize {
        self.types + self.sizes
    }

    /// Data bytes: primitive values plus raw bytes and string payloads.
    pub fn data(&self) -> usize {
        self.values + self.bytes_payload + self.string_payload
    }
}

/// Recursively validates the value at the tail of `b`. Empty input is
/// valid (the zero value).
pub fn validate_value(b: &[u8]) -> Result<()> {
    let mut dist = SizeDistribution::default();
    walk(b, &mut dist).map(|_| ())
}

/// Walks the value at the tail of `b` and returns its byte distribution.
pub fn size_distribution(b: &[u8]) -> Result<SizeDistribution> {
    let mut dist = SizeDistribution::default();
    let total = walk(b, &mut dist)?;
    dist.total = total;
    Ok(dist)
}

/// Returns the consumed size of the value at the tail of `b`.
fn walk(b: &[u8], d: &mut SizeDistribution) -> Result<usize> {
    let type_byte = match b.last() {
        Some(t) => *t,
        None => return Ok(0),
    };

    match type_byte {
        TYPE_NIL | TYPE_TRUE | TYPE_FALSE => {
            d.types += 1;
            Ok(1)
        }

        TYPE_BYTE => {
            let (_, n) = decode_byte(b)?;
            d.types += 1;
            d.values += n - 1;
            Ok(n)
        }

        TYPE_INT32 | TYPE_INT64 => {
            let (_, n) = decode_i64(b)?;
            d.types += 1;
            d.values += n - 1;
            Ok(n)
        }

        TYPE_UINT32 | TYPE_UINT64 => {
            let (_, n) = decode_u64(b)?;
            d.types += 1;
            d.values += n - 1;
            Ok(n)
        }

        TYPE_FLOAT32 | TYPE_FLOAT64 => {
            let (_, n) = decode_f64(b)?;
            d.types += 1;
            d.values += n - 1;
            Ok(n)
        }

        TYPE_U128 => {
            let (_, n) = decode_u128(b)?;
            d.types += 1;
            d.values += n - 1;
            Ok(n)
        }

        TYPE_U256 => {
            let (_, n) = decode_u256(b)?;
            d.types += 1;
            d.values += n - 1;
            Ok(n)
        }

        TYPE_BYTES => {
            let (data, n) = decode_bytes(b)?;
            d.types += 1;
            d.sizes += n - 1 - data.len();
            d.bytes_payload += data.len();
            Ok(n)
        }

        TYPE_STRING => {
            let (s, n) = decode_str(b)?;
            // the NUL terminator stays with the string payload
            d.types += 1;
            d.sizes += n - 2 - s.len();
            d.string_payload += s.len() + 1;
            Ok(n)
        }

        TYPE_LIST | TYPE_LIST_BIG => walk_list(b, d),

        TYPE_MESSAGE | TYPE_MESSAGE_BIG => walk_message(b, d),

        TYPE_STRUCT => {
            let s = Struct::new(b)?;
            let total = s.as_bytes().len();
            d.types += 1;
            d.sizes += total - 1 - s.body().len();
            d.values += s.body().len();
            Ok(total)
        }

        t => Err(Error::Malformed(format!("unsupported type 0x{t:02x}"))),
    }
}

fn walk_list(b: &[u8], d: &mut SizeDistribution) -> Result<usize> {
    let (table_size, tn) = read_rvarint(&b[..b.len() - 1])?;
    let (_, bn) = read_rvarint(&b[..b.len() - 1 - tn])?;

    let list = List::new(b)?;
    d.types += 1;
    d.sizes += tn + bn;
    d.tables += table_size as usize;

    // elements partition the payload: ends are non-decreasing and every
    // element's value must consume its slice exactly
    let mut prev = 0usize;
    for i in 0..list.len() {
        let end = match list.table.end_offset(i) {
            Some(end) => end as usize,
            None => break,
        };
        if end < prev {
            return Err(Error::Malformed("non-monotonic list offsets".into()));
        }
        if end > list.data.len() {
            return Err(Error::Malformed("list element exceeds body".into()));
        }

        let elem = &list.data[prev..end];
        if !elem.is_empty() {
            let consumed = walk(elem, d)?;
            if consumed != elem.len() {
                return Err(Error::Malformed("list element has unreachable bytes".into()));
            }
        }
        prev = end;
    }

    Ok(list.as_bytes().len())
}

fn walk_message(b: &[u8], d: &mut SizeDistribution) -> Result<usize> {
    let (table_size, tn) = read_rvarint(&b[..b.len() - 1])?;
    let (_, bn) = read_rvarint(&b[..b.len() - 1 - tn])?;

    let msg = Message::new(b)?;
    d.types += 1;
    d.sizes += tn + bn;
    d.tables += table_size as usize;

    let mut prev_tag: Option<u16> = None;
    for i in 0..msg.len() {
        let (tag, end) = match msg.table.field(i) {
            Some(f) => f,
            None => break,
        };
        if let Some(prev) = prev_tag {
            if tag <= prev {
                return Err(Error::Malformed("non-monotonic message tags".into()));
            }
        }
        prev_tag = Some(tag);

        if end as usize > msg.data.len() {
            return Err(Error::Malformed("message field exceeds body".into()));
        }
        let field = &msg.data[..end as usize];
        if !field.is_empty() {
            walk(field, d)?;
        }
    }

    Ok(msg.as_bytes().len())
}
