mod common;

use common::*;
use heifmeta::parser::{ParseError, read_box_header, read_full_box_header};
use heifmeta::{ByteArrayReader, RandomAccessReader};

#[test]
fn compact_header() {
    let data = bx(b"free", &[0; 4]);
    let mut r = ByteArrayReader::new(&data);
    let h = read_box_header(&mut r).unwrap();
    assert_eq!(h.box_type, b"free");
    assert_eq!(h.size(), 12);
    assert_eq!(h.header_len, 8);
    assert_eq!(h.end(), Some(12));
    assert_eq!(r.position(), 8);
    assert_eq!(h.bytes_unread(r.position()), 4);
}

#[test]
fn large_size_header() {
    let data = large_bx(b"mdat", &[1, 2, 3]);
    let mut r = ByteArrayReader::new(&data);
    let h = read_box_header(&mut r).unwrap();
    assert_eq!(h.declared_size, 1);
    assert_eq!(h.large_size, Some(19));
    assert_eq!(h.size(), 19);
    assert_eq!(h.header_len, 16);
    assert!(!h.is_last_box());
    assert_eq!(h.bytes_unread(r.position()), 3);
}

#[test]
fn uuid_header() {
    let data = uuid_bx([0xAB; 16], &[0; 4]);
    let mut r = ByteArrayReader::new(&data);
    let h = read_box_header(&mut r).unwrap();
    assert_eq!(h.box_type, b"uuid");
    assert_eq!(h.header_len, 24);
    assert_eq!(h.user_type, Some([0xAB; 16]));
    assert_eq!(h.user_type_hex().as_deref(), Some("abababababababababababababababab"));
    assert_eq!(r.position(), 24);
}

#[test]
fn large_size_uuid_header() {
    let mut data = Vec::new();
    data.extend_from_slice(&1u32.to_be_bytes());
    data.extend_from_slice(b"uuid");
    data.extend_from_slice(&34u64.to_be_bytes());
    data.extend_from_slice(&[0x11; 16]);
    data.extend_from_slice(&[0; 2]);

    let mut r = ByteArrayReader::new(&data);
    let h = read_box_header(&mut r).unwrap();
    assert_eq!(h.header_len, 32);
    assert_eq!(h.size(), 34);
    assert_eq!(h.user_type, Some([0x11; 16]));
    assert_eq!(h.bytes_unread(r.position()), 2);
}

#[test]
fn size_zero_is_last_box() {
    let data = last_bx(b"mdat", &[0; 10]);
    let mut r = ByteArrayReader::new(&data);
    let h = read_box_header(&mut r).unwrap();
    assert!(h.is_last_box());
    assert_eq!(h.end(), None);
}

#[test]
fn size_smaller_than_header_is_rejected() {
    let mut data = 4u32.to_be_bytes().to_vec();
    data.extend_from_slice(b"free");
    let err = read_box_header(&mut ByteArrayReader::new(&data)).unwrap_err();
    assert!(matches!(err, ParseError::InvalidSize { size: 4, header_len: 8, .. }));
}

#[test]
fn zero_large_size_is_rejected() {
    let mut data = 1u32.to_be_bytes().to_vec();
    data.extend_from_slice(b"ftyp");
    data.extend_from_slice(&0u64.to_be_bytes());
    data.extend_from_slice(b"heic");
    let err = read_box_header(&mut ByteArrayReader::new(&data)).unwrap_err();
    assert!(matches!(err, ParseError::InvalidSize { size: 0, header_len: 16, .. }));
}

#[test]
fn large_size_below_header_is_rejected() {
    let mut data = 1u32.to_be_bytes().to_vec();
    data.extend_from_slice(b"free");
    data.extend_from_slice(&12u64.to_be_bytes());
    let err = read_box_header(&mut ByteArrayReader::new(&data)).unwrap_err();
    assert!(matches!(err, ParseError::InvalidSize { size: 12, header_len: 16, .. }));
}

#[test]
fn truncated_header_is_bounds_error() {
    let err = read_box_header(&mut ByteArrayReader::new(&[0, 0, 0])).unwrap_err();
    assert!(err.is_bounds_exceeded());
}

#[test]
fn full_box_version_and_flags() {
    let data = full_bx(b"iloc", 2, 0x00_0102, &[]);
    let mut r = ByteArrayReader::new(&data);
    let h = read_box_header(&mut r).unwrap();
    let full = read_full_box_header(&mut r, &h).unwrap();
    assert_eq!(full.version, 2);
    assert_eq!(full.flags, 0x0102);
    assert_eq!(r.position(), 12);
}
