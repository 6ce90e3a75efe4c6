//! Binary format signatures
//!
//! Fixed magic bytes at a known offset.

use super::{Detector, window};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];
pub const GIF87A: &[u8; 6] = b"GIF87a";
pub const GIF89A: &[u8; 6] = b"GIF89a";
pub const PDF_HEADER: &[u8; 5] = b"%PDF-";
pub const ZIP_LOCAL_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
pub const ZIP_EMPTY_ARCHIVE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
pub const ZIP_SPANNED: [u8; 4] = [0x50, 0x4B, 0x07, 0x08];
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Magic bytes at a fixed offset.
///
/// The generic building block for formats identified purely by a prefix.
/// Useful for ad-hoc extensions:
///
/// ```
/// use mimetree::signatures::{Detector, Magic};
///
/// let wasm = Magic::new(b"\0asm");
/// assert!(wasm.detect(b"\0asm\x01\0\0\0", 3072));
/// ```
#[derive(Debug, Clone)]
pub struct Magic {
    signature: Vec<u8>,
    offset: usize,
}

impl Magic {
    pub fn new(signature: &[u8]) -> Self {
        Self {
            signature: signature.to_vec(),
            offset: 0,
        }
    }

    /// Expects the signature `offset` bytes into the input.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

impl Detector for Magic {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        has_prefix_at(window(raw, limit), &self.signature, self.offset)
    }
}

#[inline]
fn has_prefix_at(data: &[u8], signature: &[u8], offset: usize) -> bool {
    data.get(offset..)
        .is_some_and(|rest| rest.starts_with(signature))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Png;

impl Detector for Png {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        window(raw, limit).starts_with(&PNG_SIGNATURE)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Jpeg;

impl Detector for Jpeg {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        window(raw, limit).starts_with(&JPEG_SOI)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Gif;

impl Detector for Gif {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        let data = window(raw, limit);
        data.starts_with(GIF87A) || data.starts_with(GIF89A)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Pdf;

impl Detector for Pdf {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        window(raw, limit).starts_with(PDF_HEADER)
    }
}

/// ZIP archives, including empty and spanned ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zip;

impl Detector for Zip {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        let data = window(raw, limit);
        [ZIP_LOCAL_HEADER, ZIP_EMPTY_ARCHIVE, ZIP_SPANNED]
            .iter()
            .any(|sig| data.starts_with(sig))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Gzip;

impl Detector for Gzip {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        window(raw, limit).starts_with(&GZIP_MAGIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_matches_full_signature_only() {
        assert!(Png.detect(&PNG_SIGNATURE, 3072));
        assert!(!Png.detect(&PNG_SIGNATURE[..7], 3072));
        assert!(!Png.detect(&PNG_SIGNATURE, 4));
    }

    #[test]
    fn jpeg_matches_soi() {
        assert!(Jpeg.detect(&[0xFF, 0xD8, 0xFF, 0xE0], 3072));
        assert!(!Jpeg.detect(&[0xFF, 0xD8], 3072));
    }

    #[test]
    fn gif_matches_both_versions() {
        assert!(Gif.detect(b"GIF87a....", 3072));
        assert!(Gif.detect(b"GIF89a....", 3072));
        assert!(!Gif.detect(b"GIF88a....", 3072));
    }

    #[test]
    fn zip_variants() {
        assert!(Zip.detect(b"PK\x03\x04rest", 3072));
        assert!(Zip.detect(b"PK\x05\x06", 3072));
        assert!(!Zip.detect(b"PK", 3072));
    }

    #[test]
    fn magic_with_offset() {
        let tar = Magic::new(b"ustar").with_offset(257);
        let mut data = vec![0u8; 300];
        data[257..262].copy_from_slice(b"ustar");
        assert!(tar.detect(&data, 0));
        assert!(!tar.detect(&data, 260));
        assert!(!tar.detect(&data[..100], 0));
    }

    #[test]
    fn empty_input_never_matches() {
        assert!(!Png.detect(&[], 3072));
        assert!(!Pdf.detect(&[], 3072));
        assert!(!Gzip.detect(&[], 3072));
        assert!(!Magic::new(b"x").detect(&[], 3072));
    }
}
