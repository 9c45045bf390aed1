//! Streaming writer.
//!
//! The writer appends encoded values to a single growing buffer. Nested
//! composites are tracked on an object stack; their in-progress tables
//! live in shared arenas and are serialized when the composite ends.
//! Exactly one "last value" cursor exists at a time: every primitive or
//! finished composite sets it, and `element`/`field`/`struct_field`
//! consume it.
//!
//! The first error poisons the writer: every subsequent call returns the
//! stored error and the output can never be partially valid.

use bytes::{Bytes, BytesMut};

use crate::encode::*;
use crate::format::{
    encode_list_meta, encode_message_meta, encode_struct_meta, ListElement, ListStack,
    MessageField, MessageStack,
};
use crate::types::U256;
use crate::{Error, Result};

/// Default output buffer capacity for a fresh writer.
pub const BUFFER_SIZE: usize = 4096;

const OBJECTS_CAPACITY: usize = 16;
const ELEMENTS_CAPACITY: usize = 128;
const FIELDS_CAPACITY: usize = 128;

/// An in-progress composite on the object stack.
#[derive(Debug, Clone, Copy)]
enum Object {
    List { buf_start: usize, table_start: usize },
    Message { buf_start: usize, table_start: usize },
    Struct { buf_start: usize },
}

/// Single-pass append-only encoder for the wire format.
///
/// ```
/// use tailwire::Writer;
///
/// let mut w = Writer::new();
/// w.begin_message()?;
/// w.string("hello")?;
/// w.field(1)?;
/// w.int64(42)?;
/// w.field(2)?;
/// w.end_message()?;
/// let bytes = w.end()?;
/// # assert!(!bytes.is_empty());
/// # Ok::<(), tailwire::Error>(())
/// ```
#[derive(Debug)]
pub struct Writer {
    buf: BytesMut,
    err: Option<Error>,
    /// Last written complete value, must be consumed before the next one.
    last: Option<(usize, usize)>,

    objects: Vec<Object>,
    elements: ListStack,
    fields: MessageStack,
}

impl Writer {
    /// Returns a writer with a default buffer and preallocated stacks.
    pub fn new() -> Self {
        Writer::with_buffer(BytesMut::with_capacity(BUFFER_SIZE))
    }

    /// Returns a writer that appends into the given buffer. The buffer is
    /// cleared first.
    pub fn with_buffer(mut buf: BytesMut) -> Self {
        buf.clear();
        Writer {
            buf,
            err: None,
            last: None,
            objects: Vec::with_capacity(OBJECTS_CAPACITY),
            elements: ListStack::with_capacity(ELEMENTS_CAPACITY),
            fields: MessageStack::with_capacity(FIELDS_CAPACITY),
        }
    }

    /// Ends writing, returns the value bytes, and resets the writer.
    ///
    /// Fails with the stored error when the writer is poisoned, and with a
    /// state error when composites are still open or nothing was written.
    pub fn end(&mut self) -> Result<Bytes> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if !self.objects.is_empty() {
            return Err(Error::State(format!(
                "end: incomplete object, nested stack size={}",
                self.objects.len()
            )));
        }
        let (start, end) = match self.last.take() {
            Some(d) => d,
            None => return Err(Error::State("end: no value written".into())),
        };

        let mut out = self.buf.split_off(start);
        out.truncate(end - start);
        let bytes = out.freeze();
        self.reset();
        Ok(bytes)
    }

    /// Clears all state. Stack and buffer capacity is retained.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.err = None;
        self.last = None;
        self.objects.clear();
        self.elements.reset();
        self.fields.reset();
    }

    /// The error the writer is poisoned with, if any.
    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    // Primitives

    pub fn nil(&mut self) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_nil(&mut self.buf);
        self.set_last(start)
    }

    pub fn bool(&mut self, v: bool) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_bool(&mut self.buf, v);
        self.set_last(start)
    }

    pub fn byte(&mut self, v: u8) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_byte(&mut self.buf, v);
        self.set_last(start)
    }

    pub fn int8(&mut self, v: i8) -> Result<()> {
        self.int32(v as i32)
    }

    pub fn int16(&mut self, v: i16) -> Result<()> {
        self.int32(v as i32)
    }

    pub fn int32(&mut self, v: i32) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_int32(&mut self.buf, v);
        self.set_last(start)
    }

    pub fn int64(&mut self, v: i64) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_int64(&mut self.buf, v);
        self.set_last(start)
    }

    pub fn uint8(&mut self, v: u8) -> Result<()> {
        self.uint32(v as u32)
    }

    pub fn uint16(&mut self, v: u16) -> Result<()> {
        self.uint32(v as u32)
    }

    pub fn uint32(&mut self, v: u32) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_uint32(&mut self.buf, v);
        self.set_last(start)
    }

    pub fn uint64(&mut self, v: u64) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_uint64(&mut self.buf, v);
        self.set_last(start)
    }

    pub fn float32(&mut self, v: f32) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_float32(&mut self.buf, v);
        self.set_last(start)
    }

    pub fn float64(&mut self, v: f64) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_float64(&mut self.buf, v);
        self.set_last(start)
    }

    pub fn u128(&mut self, v: u128) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_u128(&mut self.buf, v);
        self.set_last(start)
    }

    pub fn u256(&mut self, v: U256) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        encode_u256(&mut self.buf, v);
        self.set_last(start)
    }

    pub fn bytes(&mut self, v: &[u8]) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        if let Err(err) = encode_bytes(&mut self.buf, v) {
            return Err(self.fail(err));
        }
        self.set_last(start)
    }

    pub fn string(&mut self, v: &str) -> Result<()> {
        self.check()?;
        let start = self.buf.len();
        if let Err(err) = encode_string(&mut self.buf, v) {
            return Err(self.fail(err));
        }
        self.set_last(start)
    }

    // List

    /// Opens a list. Elements are written as value + [`element`] pairs.
    ///
    /// [`element`]: Writer::element
    pub fn begin_list(&mut self) -> Result<()> {
        self.check()?;
        if self.last.is_some() {
            return Err(self.fail(Error::State(
                "begin list: previous value not committed".into(),
            )));
        }
        let buf_start = self.buf.len();
        let table_start = self.elements.offset();
        self.objects.push(Object::List {
            buf_start,
            table_start,
        });
        Ok(())
    }

    /// Commits the last written value as the next list element.
    pub fn element(&mut self) -> Result<()> {
        self.check()?;
        let buf_start = match self.objects.last() {
            Some(Object::List { buf_start, .. }) => *buf_start,
            _ => return Err(self.fail(Error::State("element: not inside a list".into()))),
        };
        let (_, end) = match self.last.take() {
            Some(d) => d,
            None => return Err(self.fail(Error::State("element: no value to commit".into()))),
        };

        let off = end - buf_start;
        if off > u32::MAX as usize {
            return Err(self.fail(Error::Overflow(off)));
        }
        self.elements.push(ListElement { end: off as u32 });
        Ok(())
    }

    /// Closes the innermost list and makes it the last written value.
    pub fn end_list(&mut self) -> Result<()> {
        self.check()?;
        let (buf_start, table_start) = match self.objects.last() {
            Some(Object::List {
                buf_start,
                table_start,
            }) => (*buf_start, *table_start),
            _ => return Err(self.fail(Error::State("end list: not inside a list".into()))),
        };
        if self.last.is_some() {
            return Err(self.fail(Error::State(
                "end list: value not committed with element".into(),
            )));
        }
        self.objects.pop();

        let body_size = self.buf.len() - buf_start;
        let result = encode_list_meta(&mut self.buf, body_size, self.elements.table(table_start));
        self.elements.truncate(table_start);
        if let Err(err) = result {
            return Err(self.fail(err));
        }
        self.set_last(buf_start)
    }

    // Message

    /// Opens a message. Fields are written as value + [`field`] pairs in
    /// any tag order.
    ///
    /// [`field`]: Writer::field
    pub fn begin_message(&mut self) -> Result<()> {
        self.check()?;
        if self.last.is_some() {
            return Err(self.fail(Error::State(
                "begin message: previous value not committed".into(),
            )));
        }
        let buf_start = self.buf.len();
        let table_start = self.fields.offset();
        self.objects.push(Object::Message {
            buf_start,
            table_start,
        });
        Ok(())
    }

    /// Commits the last written value as the field with the given tag.
    /// Fails when the tag was already written in this message.
    pub fn field(&mut self, tag: u16) -> Result<()> {
        self.check()?;
        let (buf_start, table_start) = match self.objects.last() {
            Some(Object::Message {
                buf_start,
                table_start,
            }) => (*buf_start, *table_start),
            _ => return Err(self.fail(Error::State("field: not inside a message".into()))),
        };
        let (_, end) = match self.last.take() {
            Some(d) => d,
            None => return Err(self.fail(Error::State("field: no value to commit".into()))),
        };

        let off = end - buf_start;
        if off > u32::MAX as usize {
            return Err(self.fail(Error::Overflow(off)));
        }
        let field = MessageField {
            tag,
            end: off as u32,
        };
        if let Err(err) = self.fields.insert(table_start, field) {
            return Err(self.fail(err));
        }
        Ok(())
    }

    /// Closes the innermost message and makes it the last written value.
    pub fn end_message(&mut self) -> Result<()> {
        self.check()?;
        let (buf_start, table_start) = match self.objects.last() {
            Some(Object::Message {
                buf_start,
                table_start,
            }) => (*buf_start, *table_start),
            _ => return Err(self.fail(Error::State("end message: not inside a message".into()))),
        };
        if self.last.is_some() {
            return Err(self.fail(Error::State(
                "end message: value not committed with field".into(),
            )));
        }
        self.objects.pop();

        let body_size = self.buf.len() - buf_start;
        let result = encode_message_meta(&mut self.buf, body_size, self.fields.table(table_start));
        self.fields.truncate(table_start);
        if let Err(err) = result {
            return Err(self.fail(err));
        }
        self.set_last(buf_start)
    }

    // Struct

    /// Opens a struct: a fixed-layout tuple with no field table. Field
    /// order and meaning are defined by the caller's schema.
    pub fn begin_struct(&mut self) -> Result<()> {
        self.check()?;
        if self.last.is_some() {
            return Err(self.fail(Error::State(
                "begin struct: previous value not committed".into(),
            )));
        }
        let buf_start = self.buf.len();
        self.objects.push(Object::Struct { buf_start });
        Ok(())
    }

    /// Commits the last written value as the next struct field.
    pub fn struct_field(&mut self) -> Result<()> {
        self.check()?;
        match self.objects.last() {
            Some(Object::Struct { .. }) => {}
            _ => {
                return Err(self.fail(Error::State("struct field: not inside a struct".into())));
            }
        }
        if self.last.take().is_none() {
            return Err(self.fail(Error::State("struct field: no value to commit".into())));
        }
        Ok(())
    }

    /// Closes the innermost struct and makes it the last written value.
    pub fn end_struct(&mut self) -> Result<()> {
        self.check()?;
        let buf_start = match self.objects.last() {
            Some(Object::Struct { buf_start }) => *buf_start,
            _ => return Err(self.fail(Error::State("end struct: not inside a struct".into()))),
        };
        if self.last.is_some() {
            return Err(self.fail(Error::State(
                "end struct: value not committed with struct_field".into(),
            )));
        }
        self.objects.pop();

        let body_size = self.buf.len() - buf_start;
        if let Err(err) = encode_struct_meta(&mut self.buf, body_size) {
            return Err(self.fail(err));
        }
        self.set_last(buf_start)
    }

    // private

    fn check(&self) -> Result<()> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        if self.err.is_none() {
            self.err = Some(err.clone());
        }
        err
    }

    fn set_last(&mut self, start: usize) -> Result<()> {
        if self.last.is_some() {
            return Err(self.fail(Error::State(
                "cannot write value, previous value not committed".into(),
            )));
        }
        self.last = Some((start, self.buf.len()));
        Ok(())
    }
}

impl Default for Writer {
    fn default() -> Self {
        Writer::new()
    }
}
