//! Content-type detection from leading bytes. Avatar names carry no reliable extension, so
//! the stored bytes decide what the browser is told.

const OCTET_STREAM: &str = "application/octet-stream";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"BM", "image/bmp"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"%PDF-", "application/pdf"),
];

/// Best-effort MIME type for `data`, falling back to `application/octet-stream`.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    if let Some((_, mime)) = SIGNATURES.iter().find(|(magic, _)| data.starts_with(magic)) {
        return *mime;
    }
    if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return "image/webp";
    }
    if data.len() >= 12 && &data[4..8] == b"ftyp" && &data[8..12] == b"avif" {
        return "image/avif";
    }
    match std::str::from_utf8(data) {
        Ok(text) if !text.contains('\0') => {
            let head = text.trim_start();
            if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
                "image/svg+xml"
            } else {
                TEXT_PLAIN
            }
        }
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_image_signatures() {
        assert_eq!(sniff_content_type(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), "image/png");
        assert_eq!(sniff_content_type(b"\xff\xd8\xff\xe0\0\x10JFIF"), "image/jpeg");
        assert_eq!(sniff_content_type(b"GIF89a\x01\0"), "image/gif");
        assert_eq!(sniff_content_type(b"RIFF\x24\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(
            sniff_content_type(b"\0\0\0\x1cftypavif\0\0\0\0"),
            "image/avif"
        );
    }

    #[test]
    fn svg_and_text_fall_through_to_utf8_checks() {
        assert_eq!(
            sniff_content_type(b"  <svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
            "image/svg+xml"
        );
        assert_eq!(
            sniff_content_type(b"<?xml version=\"1.0\"?>\n<svg/>"),
            "image/svg+xml"
        );
        assert_eq!(sniff_content_type(b"hello"), TEXT_PLAIN);
        assert_eq!(sniff_content_type(b"\xfe\x00\x10"), OCTET_STREAM);
        assert_eq!(sniff_content_type(b""), TEXT_PLAIN);
    }
}
