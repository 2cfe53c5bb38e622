//! Assertion helpers for tests.

use blit_engine::{CodecVariant, VideoHeader};
use pretty_assertions::assert_eq;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Assert bytes are a PNG image
pub fn assert_png(bytes: &[u8]) {
    assert!(
        bytes.starts_with(&PNG_SIGNATURE),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
}

/// Assert a non-compact table has `rows` rows of three strings each
pub fn assert_table_rows(bytes: &[u8], rows: usize) {
    assert!(bytes.starts_with(b"{\n"), "table should open with a brace");
    assert!(bytes.ends_with(b"}"), "table should close with a brace");
    let text = String::from_utf8_lossy(bytes);
    let row_count = text.matches("\n    {\n").count();
    assert_eq!(row_count, rows, "Table:\n{text}");
}

/// Assert paint output is a `width`×`height` grid of hex digits
pub fn assert_paint_grid(text: &str, width: usize, height: usize) {
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), height, "Paint:\n{text}");
    for line in lines {
        assert_eq!(line.len(), width, "Line {line:?}");
        assert!(
            line.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()),
            "Non-hex character in {line:?}"
        );
    }
}

/// Assert a video container header and return it
pub fn assert_video_header(
    bytes: &[u8],
    variant: CodecVariant,
    size: (usize, usize),
    frames: usize,
) -> VideoHeader {
    assert!(bytes.starts_with(b"BPVD"), "Missing video magic");
    let header = VideoHeader::parse(bytes).unwrap();
    assert_eq!(header.variant, variant);
    assert_eq!((header.width, header.height), size);
    assert_eq!(header.frame_count, frames);
    header
}
