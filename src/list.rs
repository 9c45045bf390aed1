//! List view.

use crate::decode::*;
use crate::format::{read_table_trailer, ListTable, LIST_ELEMENT_SIZE};
use crate::message::Message;
use crate::structs::Struct;
use crate::types::*;
use crate::walker::validate_value;
use crate::{Error, Result};

/// A decoded list over a borrowed buffer.
///
/// Construction parses only the trailer; element access is O(1) table
/// arithmetic. Typed getters are tolerant: any absence or decode failure
/// yields the type's zero value. Use [`List::validate`] or the `try_get_*`
/// family for strict reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct List<'a> {
    pub(crate) buffer: &'a [u8],
    pub(crate) data: &'a [u8],
    pub(crate) table: ListTable<'a>,
}

impl<'a> List<'a> {
    /// Parses a list from the tail of `bytes` without validating the
    /// elements. Empty input yields an empty list.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(List::default());
        }

        let t = read_table_trailer(bytes, TYPE_LIST, TYPE_LIST_BIG)?;
        let table_bytes = &bytes[t.table_start..t.table_end];
        if table_bytes.len() % LIST_ELEMENT_SIZE != 0 {
            return Err(Error::Malformed(
                "list table length not a multiple of entry width".into(),
            ));
        }

        Ok(List {
            buffer: &bytes[t.payload_start..],
            data: &bytes[t.payload_start..t.payload_end],
            table: ListTable::new(table_bytes),
        })
    }

    /// Parses and recursively validates a list.
    pub fn read(bytes: &'a [u8]) -> Result<Self> {
        let list = List::new(bytes)?;
        list.validate()?;
        Ok(list)
    }

    /// Recursively validates every element.
    pub fn validate(&self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        validate_value(self.buffer)
    }

    /// The exact list bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buffer
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.table.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bytes of element `i`, or an empty slice when out of range or
    /// when the table entry points outside the body.
    pub fn element_bytes(&self, i: usize) -> &'a [u8] {
        match self.table.range(i) {
            Some((start, end)) if start <= end && end <= self.data.len() => {
                &self.data[start..end]
            }
            _ => &[],
        }
    }

    pub fn iter(&self) -> ListIter<'a> {
        ListIter {
            list: *self,
            index: 0,
        }
    }

    // Tolerant getters: zero value on absence or malformed data.

    pub fn get_bool(&self, i: usize) -> bool {
        decode_bool(self.element_bytes(i)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_byte(&self, i: usize) -> u8 {
        decode_byte(self.element_bytes(i)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_i8(&self, i: usize) -> i8 {
        self.get_i64(i) as i8
    }

    pub fn get_i16(&self, i: usize) -> i16 {
        self.get_i64(i) as i16
    }

    pub fn get_i32(&self, i: usize) -> i32 {
        decode_i32(self.element_bytes(i)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_i64(&self, i: usize) -> i64 {
        decode_i64(self.element_bytes(i)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_u8(&self, i: usize) -> u8 {
        self.get_u64(i) as u8
    }

    pub fn get_u16(&self, i: usize) -> u16 {
        self.get_u64(i) as u16
    }

    pub fn get_u32(&self, i: usize) -> u32 {
        decode_u32(self.element_bytes(i)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_u64(&self, i: usize) -> u64 {
        decode_u64(self.element_bytes(i)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_f32(&self, i: usize) -> f32 {
        decode_f32(self.element_bytes(i)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_f64(&self, i: usize) -> f64 {
        decode_f64(self.element_bytes(i)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_u128(&self, i: usize) -> u128 {
        decode_u128(self.element_bytes(i)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_u256(&self, i: usize) -> U256 {
        decode_u256(self.element_bytes(i)).map(|(v, _)| v).unwrap_or_default()
    }

    pub fn get_bytes(&self, i: usize) -> &'a [u8] {
        decode_bytes(self.element_bytes(i)).map(|(v, _)| v).unwrap_or(&[])
    }

    pub fn get_str(&self, i: usize) -> &'a str {
        decode_str(self.element_bytes(i)).map(|(v, _)| v).unwrap_or("")
    }

    pub fn get_list(&self, i: usize) -> List<'a> {
        List::new(self.element_bytes(i)).unwrap_or_default()
    }

    pub fn get_message(&self, i: usize) -> Message<'a> {
        Message::new(self.element_bytes(i)).unwrap_or_default()
    }

    pub fn get_struct(&self, i: usize) -> Struct<'a> {
        Struct::new(self.element_bytes(i)).unwrap_or_default()
    }

    // Strict getters: zero value when absent, error when malformed.

    pub fn try_get_bool(&self, i: usize) -> Result<bool> {
        decode_bool(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_byte(&self, i: usize) -> Result<u8> {
        decode_byte(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_i32(&self, i: usize) -> Result<i32> {
        decode_i32(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_i64(&self, i: usize) -> Result<i64> {
        decode_i64(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_u32(&self, i: usize) -> Result<u32> {
        decode_u32(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_u64(&self, i: usize) -> Result<u64> {
        decode_u64(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_f32(&self, i: usize) -> Result<f32> {
        decode_f32(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_f64(&self, i: usize) -> Result<f64> {
        decode_f64(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_u128(&self, i: usize) -> Result<u128> {
        decode_u128(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_u256(&self, i: usize) -> Result<U256> {
        decode_u256(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_bytes(&self, i: usize) -> Result<&'a [u8]> {
        decode_bytes(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_str(&self, i: usize) -> Result<&'a str> {
        decode_str(self.element_bytes(i)).map(|(v, _)| v)
    }

    pub fn try_get_list(&self, i: usize) -> Result<List<'a>> {
        List::new(self.element_bytes(i))
    }

    pub fn try_get_message(&self, i: usize) -> Result<Message<'a>> {
        Message::new(self.element_bytes(i))
    }

    pub fn try_get_struct(&self, i: usize) -> Result<Struct<'a>> {
        Struct::new(self.element_bytes(i))
    }
}

impl<'a, 'b> IntoIterator for &'b List<'a> {
    type Item = &'a [u8];
    type IntoIter = ListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over element byte slices in index order.
#[derive(Debug)]
pub struct ListIter<'a> {
    list: List<'a>,
    index: usize,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.list.len() {
            return None;
        }
        let item = self.list.element_bytes(self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.list.len() - self.index;
        (n, Some(n))
    }
}

impl<'a> ExactSizeIterator for ListIter<'a> {}
