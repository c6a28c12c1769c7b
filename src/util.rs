/// Classic 16-bytes-per-line hex dump with an ASCII column. Offsets start at
/// `start_offset`.
pub fn hex_dump(bytes: &[u8], start_offset: u64) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let offs = start_offset + (i as u64) * 16;
        let hexs: String = chunk.iter().map(|b| format!("{:02x} ", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect();
        out.push_str(&format!("{:08x}  {:<48}  |{}|\n", offs, hexs, ascii));
    }
    out
}

/// Hex dump of at most `limit` bytes, noting how many were left out.
pub fn hex_preview(bytes: &[u8], limit: usize) -> String {
    let shown = &bytes[..bytes.len().min(limit)];
    let mut out = hex_dump(shown, 0);
    if bytes.len() > shown.len() {
        out.push_str(&format!("... {} more bytes\n", bytes.len() - shown.len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_line_layout() {
        let dump = hex_dump(b"Exif\0\0MM", 0x10);
        assert_eq!(
            dump,
            format!("00000010  {:<48}  |Exif..MM|\n", "45 78 69 66 00 00 4d 4d ")
        );
    }

    #[test]
    fn preview_truncates() {
        let preview = hex_preview(&[0u8; 40], 16);
        assert_eq!(preview.lines().count(), 2);
        assert!(preview.ends_with("... 24 more bytes\n"));
    }
}
