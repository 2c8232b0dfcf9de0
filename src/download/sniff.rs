//! Magic-byte image format detection
//!
//! Identifies the real format of a downloaded buffer from its leading bytes,
//! independent of whatever the server claimed in Content-Type. Callers that get
//! `None` back must decide whether to reject or fall back.

/// A detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedFormat {
    /// Canonical file extension, without the dot
    pub extension: &'static str,
    /// MIME type
    pub mime_type: &'static str,
}

/// PNG magic bytes
const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// How far into the buffer to look for an `<svg` root element
const SVG_SCAN_WINDOW: usize = 1000;

/// Detect the image format of `data` from its signature
///
/// Signatures are checked in priority order; binary formats first, then a
/// text-based SVG fallback over the first kilobyte.
pub fn detect(data: &[u8]) -> Option<DetectedFormat> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(DetectedFormat {
            extension: "jpg",
            mime_type: "image/jpeg",
        });
    }
    if data.starts_with(&PNG_HEADER) {
        return Some(DetectedFormat {
            extension: "png",
            mime_type: "image/png",
        });
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some(DetectedFormat {
            extension: "gif",
            mime_type: "image/gif",
        });
    }
    // RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some(DetectedFormat {
            extension: "webp",
            mime_type: "image/webp",
        });
    }
    if data.starts_with(&[0x42, 0x4D]) {
        return Some(DetectedFormat {
            extension: "bmp",
            mime_type: "image/bmp",
        });
    }
    if data.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        return Some(DetectedFormat {
            extension: "ico",
            mime_type: "image/x-icon",
        });
    }
    // TIFF, little-endian "II*\0" or big-endian "MM\0*"
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Some(DetectedFormat {
            extension: "tiff",
            mime_type: "image/tiff",
        });
    }
    if looks_like_svg(data) {
        return Some(DetectedFormat {
            extension: "svg",
            mime_type: "image/svg+xml",
        });
    }
    None
}

/// Text-based SVG check: an `<svg` element plus the SVG namespace declaration
/// within the scan window
fn looks_like_svg(data: &[u8]) -> bool {
    let window = &data[..data.len().min(SVG_SCAN_WINDOW)];
    let Ok(text) = std::str::from_utf8(window) else {
        return false;
    };
    let lower = text.to_lowercase();
    lower.contains("<svg") && lower.contains("http://www.w3.org/2000/svg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_jpeg_from_three_byte_prefix() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let format = detect(&data).unwrap();
        assert_eq!(format.extension, "jpg");
        assert_eq!(format.mime_type, "image/jpeg");
    }

    #[test]
    fn detects_png_from_eight_byte_signature() {
        let format = detect(&PNG_HEADER).unwrap();
        assert_eq!(format.extension, "png");
        assert_eq!(format.mime_type, "image/png");
    }

    #[test]
    fn detects_both_gif_variants() {
        assert_eq!(detect(b"GIF87a....").unwrap().extension, "gif");
        assert_eq!(detect(b"GIF89a....").unwrap().extension, "gif");
    }

    #[test]
    fn webp_requires_both_riff_and_webp_markers() {
        let mut data = Vec::from(*b"RIFF");
        data.extend_from_slice(&[0x10, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"WEBP");
        assert_eq!(detect(&data).unwrap().extension, "webp");
        // RIFF alone is not enough (could be WAV/AVI)
        assert_eq!(detect(b"RIFF\x10\x00\x00\x00WAVE"), None);
    }

    #[test]
    fn detects_bmp_ico_and_tiff() {
        assert_eq!(detect(&[0x42, 0x4D, 0x00]).unwrap().extension, "bmp");
        assert_eq!(detect(&[0x00, 0x00, 0x01, 0x00]).unwrap().extension, "ico");
        assert_eq!(detect(&[0x49, 0x49, 0x2A, 0x00]).unwrap().extension, "tiff");
        assert_eq!(detect(&[0x4D, 0x4D, 0x00, 0x2A]).unwrap().extension, "tiff");
    }

    #[test]
    fn detects_svg_with_namespace() {
        let svg = br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg"></svg>"#;
        assert_eq!(detect(svg).unwrap().extension, "svg");
    }

    #[test]
    fn svg_without_namespace_is_not_detected() {
        assert_eq!(detect(b"<svg></svg>"), None);
    }

    #[test]
    fn arbitrary_bytes_yield_none() {
        assert_eq!(detect(b"hello world"), None);
        assert_eq!(detect(&[]), None);
        assert_eq!(detect(&[0x01, 0x02, 0x03, 0x04]), None);
    }
}
