use tailwire::{Error, List, Message, Writer, TYPE_BYTE, TYPE_MESSAGE, TYPE_MESSAGE_BIG, TYPE_TRUE};

#[test]
fn test_empty_message_layout() {
    let mut w = Writer::new();
    w.begin_message().unwrap();
    w.end_message().unwrap();
    let bytes = w.end().unwrap();

    // body size 0, table size 0, type byte
    assert_eq!(&bytes[..], &[0x00, 0x00, TYPE_MESSAGE]);

    let msg = Message::new(&bytes).unwrap();
    assert_eq!(msg.len(), 0);
    assert!(msg.is_empty());
}

#[test]
fn test_single_bool_field_layout() {
    let mut w = Writer::new();
    w.begin_message().unwrap();
    w.bool(true).unwrap();
    w.field(1).unwrap();
    w.end_message().unwrap();
    let bytes = w.end().unwrap();

    // payload [true], small table (tag=1, end=1), body=1, table=3, type
    assert_eq!(
        &bytes[..],
        &[TYPE_TRUE, 0x01, 0x00, 0x01, 0x01, 0x03, TYPE_MESSAGE]
    );

    let msg = Message::new(&bytes).unwrap();
    assert_eq!(msg.field(1), &[TYPE_TRUE]);
    assert!(msg.field(2).is_empty());
    assert!(msg.get_bool(1));
}

#[test]
fn test_big_tag_promotes_table() {
    let mut w = Writer::new();
    w.begin_message().unwrap();
    w.byte(0x07).unwrap();
    w.field(300).unwrap();
    w.end_message().unwrap();
    let bytes = w.end().unwrap();

    // payload [0x07, TYPE_BYTE], big table (tag=300, end=2), body=2, table=6
    assert_eq!(
        &bytes[..],
        &[
            0x07,
            TYPE_BYTE,
            0x01,
            0x2c,
            0x00,
            0x00,
            0x00,
            0x02,
            0x02,
            0x06,
            TYPE_MESSAGE_BIG
        ]
    );

    let msg = Message::new(&bytes).unwrap();
    assert_eq!(msg.get_byte(300), 0x07);
}

#[test]
fn test_big_offset_promotes_table() {
    let blob = vec![0xabu8; 70_000];

    let mut w = Writer::new();
    w.begin_message().unwrap();
    w.bytes(&blob).unwrap();
    w.field(1).unwrap();
    w.end_message().unwrap();
    let bytes = w.end().unwrap();

    assert_eq!(bytes[bytes.len() - 1], TYPE_MESSAGE_BIG);
    let msg = Message::new(&bytes).unwrap();
    assert_eq!(msg.get_bytes(1), &blob[..]);
}

#[test]
fn test_small_table_at_limits() {
    // tag 255 with offsets under 65536 stays small
    let mut w = Writer::new();
    w.begin_message().unwrap();
    w.uint64(9).unwrap();
    w.field(255).unwrap();
    w.end_message().unwrap();
    let bytes = w.end().unwrap();

    assert_eq!(bytes[bytes.len() - 1], TYPE_MESSAGE);
    assert_eq!(Message::new(&bytes).unwrap().get_u64(255), 9);
}

#[test]
fn test_element_outside_list_fails() {
    let mut w = Writer::new();
    w.begin_message().unwrap();
    w.bool(true).unwrap();
    let err = w.element().unwrap_err();
    assert!(matches!(err, Error::State(_)));
}

#[test]
fn test_field_outside_message_fails() {
    let mut w = Writer::new();
    w.begin_list().unwrap();
    w.bool(true).unwrap();
    let err = w.field(1).unwrap_err();
    assert!(matches!(err, Error::State(_)));
}

#[test]
fn test_field_without_value_fails() {
    let mut w = Writer::new();
    w.begin_message().unwrap();
    let err = w.field(1).unwrap_err();
    assert!(matches!(err, Error::State(_)));
}

#[test]
fn test_uncommitted_value_at_end_fails() {
    let mut w = Writer::new();
    w.begin_message().unwrap();
    w.bool(true).unwrap();
    let err = w.end_message().unwrap_err();
    assert!(matches!(err, Error::State(_)));
}

#[test]
fn test_two_values_without_commit_fails() {
    let mut w = Writer::new();
    w.begin_list().unwrap();
    w.bool(true).unwrap();
    let err = w.int64(1).unwrap_err();
    assert!(matches!(err, Error::State(_)));
}

#[test]
fn test_mismatched_end_fails() {
    let mut w = Writer::new();
    w.begin_list().unwrap();
    let err = w.end_message().unwrap_err();
    assert!(matches!(err, Error::State(_)));
}

#[test]
fn test_duplicate_tag_fails() {
    let mut w = Writer::new();
    w.begin_message().unwrap();
    w.bool(true).unwrap();
    w.field(7).unwrap();
    w.bool(false).unwrap();
    let err = w.field(7).unwrap_err();
    assert_eq!(err, Error::DuplicateTag(7));
}

#[test]
fn test_poisoned_writer_repeats_first_error() {
    let mut w = Writer::new();
    let first = w.element().unwrap_err();
    assert!(matches!(first, Error::State(_)));

    // every call after the first error returns it unchanged
    assert_eq!(w.bool(true).unwrap_err(), first);
    assert_eq!(w.begin_message().unwrap_err(), first);
    assert_eq!(w.string("x").unwrap_err(), first);
    assert_eq!(w.end().unwrap_err(), first);
    assert_eq!(w.error(), Some(&first));
}

#[test]
fn test_end_with_open_object_is_recoverable() {
    let mut w = Writer::new();
    w.begin_message().unwrap();
    let err = w.end().unwrap_err();
    assert!(matches!(err, Error::State(_)));

    // an incomplete end does not poison the writer
    w.end_message().unwrap();
    let bytes = w.end().unwrap();
    assert_eq!(&bytes[..], &[0x00, 0x00, TYPE_MESSAGE]);
}

#[test]
fn test_end_without_value_fails() {
    let mut w = Writer::new();
    assert!(matches!(w.end().unwrap_err(), Error::State(_)));
}

#[test]
fn test_writer_reuse_after_end() {
    let mut w = Writer::new();
    w.uint64(1).unwrap();
    let first = w.end().unwrap();

    w.uint64(2).unwrap();
    let second = w.end().unwrap();

    assert_ne!(first, second);
    assert_eq!(tailwire::decode::decode_u64(&second).unwrap().0, 2);
}

#[test]
fn test_deeply_nested_composites() {
    // interleaved lists and messages share the interior arenas:
    // outer.field(1) = [0, msg], msg.field(1) = [1, msg], ...
    let mut w = Writer::new();
    w.begin_message().unwrap();
    for depth in 0..8i64 {
        w.begin_list().unwrap();
        w.int64(depth).unwrap();
        w.element().unwrap();
        w.begin_message().unwrap();
    }
    for _ in 0..8 {
        w.end_message().unwrap();
        w.element().unwrap();
        w.end_list().unwrap();
        w.field(1).unwrap();
    }
    w.end_message().unwrap();
    let bytes = w.end().unwrap();

    let msg = Message::read(&bytes).unwrap();
    let mut list = msg.get_list(1);
    for depth in 0..8i64 {
        assert_eq!(list.len(), 2);
        assert_eq!(list.get_i64(0), depth);
        let inner = list.get_message(1);
        if depth < 7 {
            list = inner.get_list(1);
        } else {
            assert!(inner.is_empty());
        }
    }
}

#[test]
fn test_struct_write_and_read_back() {
    let mut w = Writer::new();
    w.begin_struct().unwrap();
    w.int64(-5).unwrap();
    w.struct_field().unwrap();
    w.string("id").unwrap();
    w.struct_field().unwrap();
    w.end_struct().unwrap();
    let bytes = w.end().unwrap();

    let s = tailwire::Struct::new(&bytes).unwrap();
    // fields decode from the tail inward in reverse declaration order
    let body = s.body();
    let (text, n) = tailwire::decode::decode_str(body).unwrap();
    assert_eq!(text, "id");
    let (num, _) = tailwire::decode::decode_i64(&body[..body.len() - n]).unwrap();
    assert_eq!(num, -5);
}

#[test]
fn test_struct_field_outside_struct_fails() {
    let mut w = Writer::new();
    w.begin_list().unwrap();
    w.bool(true).unwrap();
    let err = w.struct_field().unwrap_err();
    assert!(matches!(err, Error::State(_)));
}

#[test]
fn test_empty_list_layout() {
    let mut w = Writer::new();
    w.begin_list().unwrap();
    w.end_list().unwrap();
    let bytes = w.end().unwrap();

    assert_eq!(&bytes[..], &[0x00, 0x00, tailwire::TYPE_LIST]);
    assert_eq!(List::new(&bytes).unwrap().len(), 0);
}

#[test]
fn test_begin_with_uncommitted_value_fails() {
    let mut w = Writer::new();
    w.begin_list().unwrap();
    w.bool(true).unwrap();
    let err = w.begin_message().unwrap_err();
    assert!(matches!(err, Error::State(_)));
}
