//! Parser for the project's 32bpp uncompressed bitmap variant.
//!
//! This is NOT a general bitmap reader: the 4-byte field at offset 0x1E
//! must equal 3, a private sentinel for 32bpp written by the companion
//! exporter. Pixel data is BGRA, stored in file order with no row
//! padding (the 32bpp stride is already a multiple of 4).

use std::fs;
use std::path::Path;

use crate::error::{ViewerError, ViewerResult};

const HEADER_LEN: usize = 54;
const DEPTH_SENTINEL: u32 = 3;

/// A decoded image: `width * height * 4` bytes of BGRA pixels.
#[derive(Debug)]
pub struct BmpImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

fn read_u32_le(header: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        header[offset],
        header[offset + 1],
        header[offset + 2],
        header[offset + 3],
    ])
}

/// Parse a complete bitmap file already read into memory.
pub fn parse_bmp(data: &[u8]) -> ViewerResult<BmpImage> {
    if data.len() < HEADER_LEN {
        return Err(ViewerError::format(
            "truncated bitmap: fewer than 54 header bytes",
        ));
    }
    if data[0] != b'B' || data[1] != b'M' {
        return Err(ViewerError::format("bad magic, expected BM"));
    }
    if read_u32_le(data, 0x1E) != DEPTH_SENTINEL {
        return Err(ViewerError::format(
            "unsupported bit depth, expected the 32bpp sentinel",
        ));
    }

    let mut data_pos = read_u32_le(data, 0x0A) as usize;
    let mut image_size = read_u32_le(data, 0x22) as usize;
    let width = read_u32_le(data, 0x12);
    let height = read_u32_le(data, 0x16);

    // Some files leave these fields zeroed; derive them.
    if image_size == 0 {
        image_size = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ViewerError::format("image dimensions overflow"))?;
    }
    if data_pos == 0 {
        data_pos = HEADER_LEN;
    }

    let end = data_pos
        .checked_add(image_size)
        .ok_or_else(|| ViewerError::format("image size overflow"))?;
    if end > data.len() {
        return Err(ViewerError::format(format!(
            "truncated bitmap: {} pixel bytes declared, {} available",
            image_size,
            data.len().saturating_sub(data_pos)
        )));
    }

    Ok(BmpImage {
        width,
        height,
        data: data[data_pos..end].to_vec(),
    })
}

/// Read and parse a bitmap file from disk.
pub fn load_bmp(path: &Path) -> ViewerResult<BmpImage> {
    log::info!("reading image {}", path.display());
    let bytes = fs::read(path).map_err(|source| ViewerError::io(path, source))?;
    parse_bmp(&bytes).map_err(|err| err.with_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_file(width: u32, height: u32, image_size: u32, data_pos: u32, pixels: &[u8]) -> Vec<u8> {
        let mut file = vec![0u8; HEADER_LEN];
        file[0] = b'B';
        file[1] = b'M';
        file[0x0A..0x0E].copy_from_slice(&data_pos.to_le_bytes());
        file[0x12..0x16].copy_from_slice(&width.to_le_bytes());
        file[0x16..0x1A].copy_from_slice(&height.to_le_bytes());
        file[0x1E..0x22].copy_from_slice(&DEPTH_SENTINEL.to_le_bytes());
        file[0x22..0x26].copy_from_slice(&image_size.to_le_bytes());
        file.extend_from_slice(pixels);
        file
    }

    #[test]
    fn zero_image_size_is_derived_from_dimensions() {
        let pixels = vec![0xAB; 2 * 2 * 4];
        let file = make_file(2, 2, 0, 0, &pixels);
        let image = parse_bmp(&file).unwrap();
        assert_eq!(image.width, 2);
        assert_eq!(image.height, 2);
        assert_eq!(image.data.len(), 16);
        assert_eq!(image.data, pixels);
    }

    #[test]
    fn explicit_offset_skips_extra_header_bytes() {
        let pixels = [1u8, 2, 3, 4];
        let mut file = make_file(1, 1, 4, 58, &[0xEE; 4]);
        file.extend_from_slice(&pixels);
        let image = parse_bmp(&file).unwrap();
        assert_eq!(image.data, pixels);
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut file = make_file(1, 1, 0, 0, &[0u8; 4]);
        file[0] = b'X';
        let err = parse_bmp(&file).unwrap_err();
        assert!(format!("{}", err).contains("magic"));
    }

    #[test]
    fn wrong_depth_sentinel_is_rejected() {
        let mut file = make_file(1, 1, 0, 0, &[0u8; 4]);
        // A standards-conforming 32bpp header would not carry the
        // private sentinel; reject it.
        file[0x1E..0x22].copy_from_slice(&32u32.to_le_bytes());
        let err = parse_bmp(&file).unwrap_err();
        assert!(format!("{}", err).contains("depth"));
    }

    #[test]
    fn short_header_is_rejected() {
        assert!(parse_bmp(b"BM").is_err());
    }

    #[test]
    fn truncated_pixel_data_is_rejected() {
        let file = make_file(4, 4, 0, 0, &[0u8; 8]);
        let err = parse_bmp(&file).unwrap_err();
        assert!(format!("{}", err).contains("truncated"));
    }
}
