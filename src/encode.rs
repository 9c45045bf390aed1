//! Primitive encoders.
//!
//! Every encoder appends a value to a `BytesMut` so that it can be parsed
//! back from the *tail*: fixed-width payloads and varuints come first, the
//! type byte last. Multi-byte scalars are big-endian.

use bytes::{BufMut, BytesMut};

use crate::types::*;
use crate::{Error, Result};

/// Maximum encoded length of a 64-bit reverse varuint.
pub const MAX_RVARINT_LEN: usize = 10;

/// Appends a reverse varuint: little-endian base-128 laid out so it can be
/// consumed from the tail. The most significant byte comes first in memory
/// and is the only one without the continuation bit.
pub fn write_rvarint(buf: &mut BytesMut, mut v: u64) {
    let mut tmp = [0u8; MAX_RVARINT_LEN];
    let mut n = 0;
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            tmp[n] = byte;
            n += 1;
            break;
        }
        tmp[n] = byte | 0x80;
        n += 1;
    }
    for i in (0..n).rev() {
        buf.put_u8(tmp[i]);
    }
}

#[inline]
pub fn zigzag32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

#[inline]
pub fn zigzag64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

pub fn encode_nil(buf: &mut BytesMut) {
    buf.put_u8(TYPE_NIL);
}

pub fn encode_bool(buf: &mut BytesMut, v: bool) {
    buf.put_u8(if v { TYPE_TRUE } else { TYPE_FALSE });
}

pub fn encode_byte(buf: &mut BytesMut, v: u8) {
    buf.put_u8(v);
    buf.put_u8(TYPE_BYTE);
}

pub fn encode_int32(buf: &mut BytesMut, v: i32) {
    write_rvarint(buf, zigzag32(v) as u64);
    buf.put_u8(TYPE_INT32);
}

pub fn encode_int64(buf: &mut BytesMut, v: i64) {
    write_rvarint(buf, zigzag64(v));
    buf.put_u8(TYPE_INT64);
}

pub fn encode_uint32(buf: &mut BytesMut, v: u32) {
    write_rvarint(buf, v as u64);
    buf.put_u8(TYPE_UINT32);
}

pub fn encode_uint64(buf: &mut BytesMut, v: u64) {
    write_rvarint(buf, v);
    buf.put_u8(TYPE_UINT64);
}

pub fn encode_float32(buf: &mut BytesMut, v: f32) {
    buf.put_f32(v);
    buf.put_u8(TYPE_FLOAT32);
}

pub fn encode_float64(buf: &mut BytesMut, v: f64) {
    buf.put_f64(v);
    buf.put_u8(TYPE_FLOAT64);
}

pub fn encode_u128(buf: &mut BytesMut, v: u128) {
    buf.put_u128(v);
    buf.put_u8(TYPE_U128);
}

pub fn encode_u256(buf: &mut BytesMut, v: U256) {
    buf.put_slice(&v.0);
    buf.put_u8(TYPE_U256);
}

/// Appends `[v.., size rvarint, TYPE_BYTES]`.
pub fn encode_bytes(buf: &mut BytesMut, v: &[u8]) -> Result<()> {
    if v.len() > u32::MAX as usize {
        return Err(Error::Overflow(v.len()));
    }
    buf.put_slice(v);
    write_rvarint(buf, v.len() as u64);
    buf.put_u8(TYPE_BYTES);
    Ok(())
}

/// Appends `[v.., 0x00, size rvarint, TYPE_STRING]`. The size is the
/// logical string length; the NUL terminator is extra.
pub fn encode_string(buf: &mut BytesMut, v: &str) -> Result<()> {
    if v.len() > u32::MAX as usize {
        return Err(Error::Overflow(v.len()));
    }
    buf.put_slice(v.as_bytes());
    buf.put_u8(0);
    write_rvarint(buf, v.len() as u64);
    buf.put_u8(TYPE_STRING);
    Ok(())
}
