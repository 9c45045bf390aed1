//! Struct view.
//!
//! A struct is a fixed-layout tuple: opaque payload bytes followed by a
//! body-size rvarint and the struct type byte. There is no field table;
//! field boundaries are defined by the caller's schema, which decodes the
//! body with the primitive decoders in declared order.

use crate::decode::read_rvarint;
use crate::types::TYPE_STRUCT;
use crate::{Error, Result};

/// A decoded struct over a borrowed buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Struct<'a> {
    buffer: &'a [u8],
    body: &'a [u8],
}

impl<'a> Struct<'a> {
    /// Parses a struct from the tail of `bytes`. Empty input yields an
    /// empty struct.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Struct::default());
        }

        let type_byte = bytes[bytes.len() - 1];
        if type_byte != TYPE_STRUCT {
            return Err(Error::Malformed(format!(
                "expected struct, got type 0x{type_byte:02x}"
            )));
        }

        let (body_size, bn) = read_rvarint(&bytes[..bytes.len() - 1])?;
        let total = body_size as u128 + (bn + 1) as u128;
        if total > bytes.len() as u128 {
            return Err(Error::Malformed("struct size exceeds buffer".into()));
        }

        let body_end = bytes.len() - 1 - bn;
        let body_start = body_end - body_size as usize;
        Ok(Struct {
            buffer: &bytes[body_start..],
            body: &bytes[body_start..body_end],
        })
    }

    /// The exact struct bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buffer
    }

    /// The opaque payload. Schema decoders consume it field by field.
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
