//! Content-type detection: extension lookup first, magic-byte sniffing as
//! the fallback for files without a recognized extension.

use std::path::Path;

/// Look up a Content-Type from the file extension alone.
///
/// Returns `None` for unknown extensions so the caller can fall back to
/// sniffing the file content.
pub fn from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let value = match ext.as_str() {
        // Video formats
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "flv" => "video/x-flv",
        "wmv" => "video/x-ms-wmv",
        "m4v" => "video/x-m4v",

        // Image formats
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",

        // Audio formats
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" => "audio/mp4",

        // Document formats
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",

        // Text formats
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "yaml" | "yml" => "application/yaml",
        "toml" => "text/plain",

        // Archive formats
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        "bz2" => "application/x-bzip2",
        "7z" => "application/x-7z-compressed",
        "rar" => "application/vnd.rar",

        // Binary/executable
        "exe" => "application/x-msdownload",
        "dmg" => "application/x-apple-diskimage",
        "iso" => "application/x-iso9660-image",
        "wasm" => "application/wasm",

        _ => return None,
    };
    Some(value)
}

/// Sniff a Content-Type from the first bytes of a file (at most 512).
///
/// Checks well-known magic numbers, then falls back to a text heuristic.
/// Unrecognized binary data maps to `application/octet-stream`.
pub fn sniff(prefix: &[u8]) -> &'static str {
    const MAGICS: &[(&[u8], &str)] = &[
        (b"%PDF-", "application/pdf"),
        (&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], "image/png"),
        (&[0xFF, 0xD8, 0xFF], "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
        (b"PK\x03\x04", "application/zip"),
        (&[0x1F, 0x8B], "application/gzip"),
        (b"BZh", "application/x-bzip2"),
        (b"7z\xBC\xAF\x27\x1C", "application/x-7z-compressed"),
        (b"Rar!\x1A\x07", "application/vnd.rar"),
        (b"OggS", "application/ogg"),
        (b"ID3", "audio/mpeg"),
        (b"fLaC", "audio/flac"),
        (b"\0asm", "application/wasm"),
    ];

    for (magic, value) in MAGICS {
        if prefix.starts_with(magic) {
            return value;
        }
    }

    // RIFF containers carry the real format at offset 8.
    if prefix.starts_with(b"RIFF") && prefix.len() >= 12 {
        return match &prefix[8..12] {
            b"WEBP" => "image/webp",
            b"WAVE" => "audio/wav",
            b"AVI " => "video/x-msvideo",
            _ => "application/octet-stream",
        };
    }

    let trimmed = prefix.trim_ascii_start();
    if starts_with_ignore_case(trimmed, b"<!doctype html")
        || starts_with_ignore_case(trimmed, b"<html")
    {
        return "text/html; charset=utf-8";
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    if looks_like_text(prefix) {
        return "text/plain; charset=utf-8";
    }

    "application/octet-stream"
}

fn starts_with_ignore_case(data: &[u8], pattern: &[u8]) -> bool {
    data.len() >= pattern.len()
        && data
            .iter()
            .zip(pattern)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

fn looks_like_text(data: &[u8]) -> bool {
    if data.contains(&0) {
        return false;
    }
    // The final bytes of the sample may cut a UTF-8 sequence short; tolerate
    // an incomplete tail but nothing else.
    match std::str::from_utf8(data) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_from_extension_known() {
        assert_eq!(from_extension(&PathBuf::from("note.txt")), Some("text/plain"));
        assert_eq!(from_extension(&PathBuf::from("photo.JPG")), Some("image/jpeg"));
        assert_eq!(from_extension(&PathBuf::from("video.mp4")), Some("video/mp4"));
        assert_eq!(
            from_extension(&PathBuf::from("archive.tar")),
            Some("application/x-tar")
        );
    }

    #[test]
    fn test_from_extension_unknown() {
        assert_eq!(from_extension(&PathBuf::from("file.zzz")), None);
        assert_eq!(from_extension(&PathBuf::from("no_extension")), None);
    }

    #[test]
    fn test_sniff_magic_numbers() {
        assert_eq!(sniff(b"%PDF-1.7 rest"), "application/pdf");
        assert_eq!(
            sniff(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            "image/png"
        );
        assert_eq!(sniff(b"PK\x03\x04payload"), "application/zip");
        assert_eq!(sniff(b"RIFFxxxxWEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_sniff_html_and_xml() {
        assert_eq!(sniff(b"  <!DOCTYPE HTML><head>"), "text/html; charset=utf-8");
        assert_eq!(sniff(b"<?xml version=\"1.0\"?>"), "text/xml; charset=utf-8");
    }

    #[test]
    fn test_sniff_text_fallback() {
        assert_eq!(sniff(b"plain readable content\n"), "text/plain; charset=utf-8");
        assert_eq!(sniff(b""), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_sniff_truncated_utf8_tail_is_still_text() {
        // "é" is 0xC3 0xA9; cut the sample mid-sequence.
        let mut data = b"caf".to_vec();
        data.push(0xC3);
        assert_eq!(sniff(&data), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_sniff_binary_fallback() {
        assert_eq!(sniff(&[0x00, 0x01, 0x02, 0xFE]), "application/octet-stream");
    }
}
