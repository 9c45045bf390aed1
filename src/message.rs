//! Message view.

use crate::decode::*;
use crate::format::{
    read_table_trailer, MessageTable, MESSAGE_FIELD_BIG_SIZE, MESSAGE_FIELD_SMALL_SIZE,
};
use crate::list::List;
use crate::structs::Struct;
use crate::types::*;
use crate::walker::validate_value;
use crate::{Error, Result};

/// A decoded message over a borrowed buffer.
///
/// Field lookup by tag is a binary search over the trailing table; the
/// bytes of a field are the payload up to the field's end-offset, and the
/// value is decoded from the tail of that slice. Absent fields, unknown
/// tags and decode failures all read as the type's zero value through the
/// tolerant getters, which is what keeps old binaries readable after new
/// fields are added.
#[derive(Debug, Clone, Copy, Default)]
pub struct Message<'a> {
    pub(crate) buffer: &'a [u8],
    pub(crate) data: &'a [u8],
    pub(crate) table: MessageTable<'a>,
}

impl<'a> Message<'a> {
    /// Parses a message from the tail of `bytes` without validating the
    /// fields. Empty input yields an empty message.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Message::default());
        }

        let t = read_table_trailer(bytes, TYPE_MESSAGE, TYPE_MESSAGE_BIG)?;
        let entry_size = if t.big {
            MESSAGE_FIELD_BIG_SIZE
        } else {
            MESSAGE_FIELD_SMALL_SIZE
        };
        let table_bytes = &bytes[t.table_start..t.table_end];
        if table_bytes.len() % entry_size != 0 {
            return Err(Error::Malformed(
                "message table length not a multiple of entry width".into(),
            ));
        }

        Ok(Message {
            buffer: &bytes[t.payload_start..],
            data: &bytes[t.payload_start..t.payload_end],
            table: MessageTable::new(table_bytes, t.big),
        })
    }

    /// Parses and recursively validates a message.
    pub fn read(bytes: &'a [u8]) -> Result<Self> {
        let msg = Message::new(bytes)?;
        msg.validate()?;
        Ok(msg)
    }

    /// Recursively validates every field, including tag ordering.
    pub fn validate(&self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        validate_value(self.buffer)
    }

    /// The exact message bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buffer
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.table.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bytes of the field with the given tag, or an empty slice when
    /// absent. The value sits at the tail of the returned slice.
    pub fn field(&self, tag: u16) -> &'a [u8] {
        match self.table.offset(tag) {
            Some(end) if end as usize <= self.data.len() => &self.data[..end as usize],
            _ => &[],
        }
    }

    /// Field `(tag, bytes)` by table index, in ascending tag order.
    pub fn field_by_index(&self, i: usize) -> Option<(u16, &'a [u8])> {
        let (tag, end) = self.table.field(i)?;
        if end as usize > self.data.len() {
            return Some((tag, &[]));
        }
        Some((tag, &self.data[..end as usize]))
    }

    pub fn iter(&self) -> MessageIter<'a> {
        MessageIter {
            message: *self,
            index: 0,
        }
    }

    /// True when the message carries the tag.
    pub fn contains(&self, tag: u16) -> bool {
        self.table.offset(tag).is_some()
    }

    // Tolerant getters: zero value on absence or malformed data.

    pub fn get_bool(&self, tag: u16) -> bool {
        decode_bool(self.field(tag)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_byte(&self, tag: u16) -> u8 {
        decode_byte(self.field(tag)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_i8(&self, tag: u16) -> i8 {
        self.get_i64(tag) as i8
    }

    pub fn get_i16(&self, tag: u16) -> i16 {
        self.get_i64(tag) as i16
    }

    pub fn get_i32(&self, tag: u16) -> i32 {
        decode_i32(self.field(tag)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_i64(&self, tag: u16) -> i64 {
        decode_i64(self.field(tag)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_u8(&self, tag: u16) -> u8 {
        self.get_u64(tag) as u8
    }

    pub fn get_u16(&self, tag: u16) -> u16 {
        self.get_u64(tag) as u16
    }

    pub fn get_u32(&self, tag: u16) -> u32 {
        decode_u32(self.field(tag)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_u64(&self, tag: u16) -> u64 {
        decode_u64(self.field(tag)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_f32(&self, tag: u16) -> f32 {
        decode_f32(self.field(tag)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_f64(&self, tag: u16) -> f64 {
        decode_f64(self.field(tag)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_u128(&self, tag: u16) -> u128 {
        decode_u128(self.field(tag)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_u256(&self, tag: u16) -> U256 {
        decode_u256(self.field(tag)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_bytes(&self, tag: u16) -> &'a [u8] {
        decode_bytes(self.field(tag)).map(|(v, _)| v).unwrap_or(&[])
    }

    pub fn get_str(&self, tag: u16) -> &'a str {
        decode_str(self.field(tag)).map(|(v, _)| v).unwrap_or("")
    }

    pub fn get_list(&self, tag: u16) -> List<'a> {
        List::new(self.field(tag)).unwrap_or_default()
    }

    pub fn get_message(&self, tag: u16) -> Message<'a> {
        Message::new(self.field(tag)).unwrap_or_default()
    }

    pub fn get_struct(&self, tag: u16) -> Struct<'a> {
        Struct::new(self.field(tag)).unwrap_or_default()
    }

    // Strict getters: zero value when absent, error when malformed.

    pub fn try_get_bool(&self, tag: u16) -> Result<bool> {
        decode_bool(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_byte(&self, tag: u16) -> Result<u8> {
        decode_byte(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_i32(&self, tag: u16) -> Result<i32> {
        decode_i32(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_i64(&self, tag: u16) -> Result<i64> {
        decode_i64(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_u32(&self, tag: u16) -> Result<u32> {
        decode_u32(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_u64(&self, tag: u16) -> Result<u64> {
        decode_u64(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_f32(&self, tag: u16) -> Result<f32> {
        decode_f32(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_f64(&self, tag: u16) -> Result<f64> {
        decode_f64(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_u128(&self, tag: u16) -> Result<u128> {
        decode_u128(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_u256(&self, tag: u16) -> Result<U256> {
        decode_u256(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_bytes(&self, tag: u16) -> Result<&'a [u8]> {
        decode_bytes(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_str(&self, tag: u16) -> Result<&'a str> {
        decode_str(self.field(tag)).map(|(v, _)| v)
    }

    pub fn try_get_list(&self, tag: u16) -> Result<List<'a>> {
        List::new(self.field(tag))
    }

    pub fn try_get_message(&self, tag: u16) -> Result<Message<'a>> {
        Message::new(self.field(tag))
    }

    pub fn try_get_struct(&self, tag: u16) -> Result<Struct<'a>> {
        Struct::new(self.field(tag))
    }
}

impl<'a, 'b> IntoIterator for &'b Message<'a> {
    type Item = (u16, &'a [u8]);
    type IntoIter = MessageIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(tag, field bytes)` pairs in ascending tag order.
#[derive(Debug)]
pub struct MessageIter<'a> {
    message: Message<'a>,
    index: usize,
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = (u16, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.message.field_by_index(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.message.len() - self.index;
        (n, Some(n))
    }
}

impl<'a> ExactSizeIterator for MessageIter<'a> {}
