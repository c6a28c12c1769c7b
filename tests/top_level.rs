mod common;

use common::*;
use heifmeta::metadata::tags;
use heifmeta::{ByteArrayReader, StreamReader, TagValue, get_boxes, read_metadata, read_metadata_from_bytes};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::num::NonZeroUsize;

#[test]
fn brands_and_handler_are_published() {
    let data = concat(&[ftyp(b"heic", 0, &[b"mif1", b"heic"]), meta(b"pict", &[])]);
    let metadata = read_metadata_from_bytes(&data);
    let heif = metadata.heif().unwrap();
    assert_eq!(heif.get(tags::MAJOR_BRAND), Some(&TagValue::Text("heic".into())));
    assert_eq!(heif.get(tags::MINOR_VERSION), Some(&TagValue::UInt(0)));
    assert_eq!(
        heif.get(tags::COMPATIBLE_BRANDS),
        Some(&TagValue::TextList(vec!["mif1".into(), "heic".into()]))
    );
    assert_eq!(heif.get(tags::HANDLER_TYPE), Some(&TagValue::Text("pict".into())));
    assert!(heif.warnings.is_empty());
}

#[test]
fn missing_mif1_warns_once_and_continues() {
    let data = concat(&[ftyp(b"heic", 0, &[b"heic", b"msf1"]), meta(b"pict", &[ispe(640, 480)])]);
    let metadata = read_metadata_from_bytes(&data);
    let heif = metadata.heif().unwrap();
    assert_eq!(heif.warnings, ["File Type Box does not contain required brand, mif1"]);
    assert_eq!(heif.get(tags::IMAGE_WIDTH), Some(&TagValue::UInt(640)));
}

#[test]
fn first_rotation_wins() {
    let data = concat(&[
        ftyp(b"heic", 0, &[b"mif1"]),
        meta(b"pict", &[irot(0b1111_1101), irot(2)]),
    ]);
    let metadata = read_metadata_from_bytes(&data);
    assert_eq!(metadata.heif().unwrap().get(tags::IMAGE_ROTATION), Some(&TagValue::UInt(1)));
}

#[test]
fn unknown_role_is_walked_inertly() {
    let data = concat(&[ftyp(b"heic", 0, &[b"mif1"]), meta(b"mdir", &[ispe(640, 480)]), ispe(1, 1)]);
    let metadata = read_metadata_from_bytes(&data);
    let heif = metadata.heif().unwrap();
    assert_eq!(heif.get(tags::HANDLER_TYPE), Some(&TagValue::Text("mdir".into())));
    assert!(!heif.contains(tags::IMAGE_WIDTH));
}

#[test]
fn meta_without_handler_box() {
    let data = concat(&[
        ftyp(b"heic", 0, &[b"mif1"]),
        full_bx(b"meta", 0, 0, &concat(&[ispe(640, 480), irot(1)])),
    ]);
    let metadata = read_metadata_from_bytes(&data);
    let heif = metadata.heif().unwrap();
    assert_eq!(heif.warnings, ["Meta box has no handler box, found ispe"]);
    assert!(!heif.contains(tags::IMAGE_ROTATION));
}

#[test]
fn boxes_around_meta_are_skipped() {
    let data = concat(&[
        ftyp(b"heic", 0, &[b"mif1"]),
        uuid_bx([7; 16], &[0; 12]),
        large_bx(b"free", &[0; 3]),
        meta(b"pict", &[ispe(8, 6)]),
        last_bx(b"mdat", &[0; 32]),
    ]);
    let metadata = read_metadata_from_bytes(&data);
    let heif = metadata.heif().unwrap();
    assert_eq!(heif.get(tags::IMAGE_HEIGHT), Some(&TagValue::UInt(6)));
    assert!(heif.warnings.is_empty());
}

#[test]
fn truncated_file_keeps_partial_results() {
    let data = concat(&[
        ftyp(b"heic", 0, &[b"mif1"]),
        meta(b"pict", &[ispe(640, 480), pixi(&[8, 8, 8]), irot(3)]),
    ]);
    // cut inside pixi
    let cut = data.len() - 12;
    let metadata = read_metadata_from_bytes(&data[..cut]);
    let heif = metadata.heif().unwrap();
    assert_eq!(heif.get(tags::MAJOR_BRAND), Some(&TagValue::Text("heic".into())));
    assert_eq!(heif.get(tags::IMAGE_WIDTH), Some(&TagValue::UInt(640)));
    assert!(!heif.contains(tags::BITS_PER_CHANNEL));
    assert!(!heif.contains(tags::IMAGE_ROTATION));
}

#[test]
fn last_ftyp_reads_brands_to_end_of_data() {
    let data = last_bx(b"ftyp", b"heic\0\0\0\0mif1heic");
    let metadata = read_metadata_from_bytes(&data);
    let heif = metadata.heif().unwrap();
    assert_eq!(
        heif.get(tags::COMPATIBLE_BRANDS),
        Some(&TagValue::TextList(vec!["mif1".into(), "heic".into()]))
    );
    assert!(heif.warnings.is_empty(), "{:?}", heif.warnings);
}

#[test]
fn zero_large_size_ftyp_ends_extraction() {
    let mut data = 1u32.to_be_bytes().to_vec();
    data.extend_from_slice(b"ftyp");
    data.extend_from_slice(&0u64.to_be_bytes());
    data.extend_from_slice(b"heic\0\0\0\0mif1");
    data.extend_from_slice(&meta(b"pict", &[ispe(640, 480)]));

    let metadata = read_metadata_from_bytes(&data);
    assert!(metadata.directories.is_empty());
    assert!(get_boxes(&mut ByteArrayReader::new(&data)).is_empty());
}

#[test]
fn empty_input_gives_empty_result() {
    let metadata = read_metadata_from_bytes(&[]);
    assert!(metadata.directories.is_empty());
}

#[test]
fn stream_with_tiny_chunks() {
    let data = concat(&[
        ftyp(b"heic", 0, &[b"mif1"]),
        meta(b"pict", &[ispe(640, 480), irot(3)]),
        bx(b"mdat", &[0; 100]),
    ]);
    let mut reader = StreamReader::with_chunk_length(Cursor::new(data.clone()), NonZeroUsize::new(3).unwrap());
    assert_eq!(read_metadata(&mut reader), read_metadata_from_bytes(&data));
}
