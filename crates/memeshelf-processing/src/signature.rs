//! Magic-byte signatures for the accepted upload formats.

use std::io::{self, Read, Seek, SeekFrom};

/// Bytes of file header the signature table needs.
pub const HEADER_LEN: usize = 16;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Whether `header` starts like a file of type `extension` (with or without the dot).
///
/// Short or garbage buffers simply don't match; unknown extensions never match.
pub fn signature_matches(header: &[u8], extension: &str) -> bool {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => header.starts_with(&[0xFF, 0xD8]),
        "png" => header.starts_with(&PNG_MAGIC),
        "gif" => header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a"),
        "webp" => header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP",
        // ISO base media: size box then "ftyp"
        "mp4" => header.len() >= 12 && &header[4..8] == b"ftyp",
        "webm" => header.starts_with(&EBML_MAGIC),
        _ => false,
    }
}

/// Reads up to [`HEADER_LEN`] bytes and puts the reader back where it was.
pub fn read_header<R: Read + Seek>(reader: &mut R) -> io::Result<Vec<u8>> {
    let start = reader.stream_position()?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    let read = reader.by_ref().take(HEADER_LEN as u64).read_to_end(&mut header);
    reader.seek(SeekFrom::Start(start))?;
    read?;
    Ok(header)
}
