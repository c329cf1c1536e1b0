//! Forward-only input cursor tests.

use std::io::Read;

use framegrab::InputBuffer;

#[test]
fn short_read_returns_remaining_bytes() {
    let data = [1u8, 2, 3, 4, 5];
    let mut input = InputBuffer::new(&data);
    let mut out = [0u8; 3];

    assert_eq!(input.read(&mut out), 3);
    assert_eq!(out, [1, 2, 3]);
    assert_eq!(input.position(), 3);
    assert_eq!(input.remaining(), 2);

    assert_eq!(input.read(&mut out), 2);
    assert_eq!(&out[..2], &[4, 5]);
    assert!(input.is_exhausted());
}

#[test]
fn exhausted_cursor_keeps_returning_zero() {
    let mut input = InputBuffer::new(b"xy");
    let mut out = [0u8; 8];
    assert_eq!(input.read(&mut out), 2);
    for _ in 0..3 {
        assert_eq!(input.read(&mut out), 0);
    }
    assert_eq!(input.position(), 2);
}

#[test]
fn empty_input_reads_nothing() {
    let mut input = InputBuffer::new(&[]);
    let mut out = [0u8; 4];
    assert!(input.is_empty());
    assert!(input.is_exhausted());
    assert_eq!(input.read(&mut out), 0);
}

#[test]
fn zero_length_request_does_not_advance() {
    let mut input = InputBuffer::new(b"abc");
    let mut out = [0u8; 0];
    assert_eq!(input.read(&mut out), 0);
    assert_eq!(input.position(), 0);
    assert_eq!(input.remaining(), 3);
}

#[test]
fn chunked_reads_reassemble_the_buffer() {
    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let mut input = InputBuffer::new(&data);
    let mut collected = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let count = input.read(&mut chunk);
        if count == 0 {
            break;
        }
        collected.extend_from_slice(&chunk[..count]);
    }
    assert_eq!(collected, data);
    assert_eq!(input.len(), 10_000);
}

#[test]
fn io_read_matches_cursor_semantics() {
    let mut input = InputBuffer::new(b"hello world");
    let mut text = String::new();
    Read::read_to_string(&mut input, &mut text).unwrap();
    assert_eq!(text, "hello world");
    assert!(input.is_exhausted());
}
