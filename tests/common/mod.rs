#![allow(dead_code)]

//! Builders for synthetic HEIF box trees.

pub fn bx(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(8 + payload.len());
    v.extend_from_slice(&((8 + payload.len()) as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

/// Box with the 64-bit size form (`size == 1`).
pub fn large_bx(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&1u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(&((16 + payload.len()) as u64).to_be_bytes());
    v.extend_from_slice(payload);
    v
}

pub fn uuid_bx(user_type: [u8; 16], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&((24 + payload.len()) as u32).to_be_bytes());
    v.extend_from_slice(b"uuid");
    v.extend_from_slice(&user_type);
    v.extend_from_slice(payload);
    v
}

/// Box declaring size 0 (runs to the end of the data).
pub fn last_bx(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&0u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

pub fn full_bx(typ: &[u8; 4], version: u8, flags: u32, payload: &[u8]) -> Vec<u8> {
    let mut p = Vec::with_capacity(4 + payload.len());
    p.extend_from_slice(&(((version as u32) << 24) | (flags & 0x00FF_FFFF)).to_be_bytes());
    p.extend_from_slice(payload);
    bx(typ, &p)
}

pub fn ftyp(major: &[u8; 4], minor: u32, compatible: &[&[u8; 4]]) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(major);
    p.extend_from_slice(&minor.to_be_bytes());
    for b in compatible {
        p.extend_from_slice(*b);
    }
    bx(b"ftyp", &p)
}

pub fn hdlr(handler_type: &[u8; 4]) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&[0; 4]); // pre_defined
    p.extend_from_slice(handler_type);
    p.extend_from_slice(&[0; 12]);
    p.extend_from_slice(b"handler\0");
    full_bx(b"hdlr", 0, 0, &p)
}

/// `meta` holding `hdlr` for `role` followed by `children`.
pub fn meta(role: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    let mut p = hdlr(role);
    for c in children {
        p.extend_from_slice(c);
    }
    full_bx(b"meta", 0, 0, &p)
}

/// Version 2 `infe` with an item type and a name.
pub fn infe_v2(item_id: u16, item_type: &[u8; 4], name: &str) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&item_id.to_be_bytes());
    p.extend_from_slice(&0u16.to_be_bytes());
    p.extend_from_slice(item_type);
    p.extend_from_slice(name.as_bytes());
    p.push(0);
    full_bx(b"infe", 2, 0, &p)
}

pub fn infe_v3(item_id: u32, item_type: &[u8; 4], name: &str) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&item_id.to_be_bytes());
    p.extend_from_slice(&0u16.to_be_bytes());
    p.extend_from_slice(item_type);
    p.extend_from_slice(name.as_bytes());
    p.push(0);
    full_bx(b"infe", 3, 0, &p)
}

pub fn iinf(version: u8, entries: &[Vec<u8>]) -> Vec<u8> {
    let mut p = Vec::new();
    if version == 0 {
        p.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    } else {
        p.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    }
    for e in entries {
        p.extend_from_slice(e);
    }
    full_bx(b"iinf", version, 0, &p)
}

/// Version 1 `iloc` with 4-byte offsets and lengths, no base offset and no
/// extent index. Each item is `(id, construction_method, extents)`.
pub fn iloc_v1(items: &[(u16, u8, Vec<(u32, u32)>)]) -> Vec<u8> {
    let mut p = vec![0x44, 0x00];
    p.extend_from_slice(&(items.len() as u16).to_be_bytes());
    for (id, method, extents) in items {
        p.extend_from_slice(&id.to_be_bytes());
        p.extend_from_slice(&(*method as u16).to_be_bytes());
        p.extend_from_slice(&0u16.to_be_bytes()); // data_reference_index
        p.extend_from_slice(&(extents.len() as u16).to_be_bytes());
        for (offset, length) in extents {
            p.extend_from_slice(&offset.to_be_bytes());
            p.extend_from_slice(&length.to_be_bytes());
        }
    }
    full_bx(b"iloc", 1, 0, &p)
}

pub fn pitm(item_id: u16) -> Vec<u8> {
    full_bx(b"pitm", 0, 0, &item_id.to_be_bytes())
}

pub fn ispe(width: u32, height: u32) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&width.to_be_bytes());
    p.extend_from_slice(&height.to_be_bytes());
    full_bx(b"ispe", 0, 0, &p)
}

pub fn irot(byte: u8) -> Vec<u8> {
    bx(b"irot", &[byte])
}

pub fn pixi(bits: &[u8]) -> Vec<u8> {
    let mut p = vec![bits.len() as u8];
    p.extend_from_slice(bits);
    full_bx(b"pixi", 0, 0, &p)
}

pub fn colr_nclx(primaries: u16, transfer: u16, matrix: u16, full_range: bool) -> Vec<u8> {
    let mut p = b"nclx".to_vec();
    p.extend_from_slice(&primaries.to_be_bytes());
    p.extend_from_slice(&transfer.to_be_bytes());
    p.extend_from_slice(&matrix.to_be_bytes());
    p.push(if full_range { 0x80 } else { 0 });
    bx(b"colr", &p)
}

/// Minimal big-endian TIFF header with an empty IFD0.
pub fn tiff() -> Vec<u8> {
    vec![b'M', b'M', 0x00, 0x2A, 0, 0, 0, 8, 0, 0]
}

/// EXIF item payload: 4-byte TIFF header offset, `Exif\0\0`, then `tiff`.
pub fn exif_item(tiff: &[u8]) -> Vec<u8> {
    let mut v = vec![0, 0, 0, 6];
    v.extend_from_slice(b"Exif\0\0");
    v.extend_from_slice(tiff);
    v
}

pub fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}
