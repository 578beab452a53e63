use std::path::Path;

/// Allowed target formats per input extension, in dropdown order.
pub const FORMAT_MAP: &[(&str, &[&str])] = &[
    (".png", &["jpg", "jpeg", "webp", "bmp", "tiff"]),
    (".jpg", &["png", "jpeg", "webp", "bmp", "tiff"]),
    (".jpeg", &["png", "jpg", "webp", "bmp", "tiff"]),
    (".webp", &["png", "jpg", "jpeg", "bmp", "tiff"]),
    (".bmp", &["png", "jpg", "jpeg", "webp", "tiff"]),
    (".tiff", &["png", "jpg", "jpeg", "webp", "bmp"]),
    (".mp4", &["mp3", "gif"]),
    (".pdf", &["docx"]),
    (".docx", &["pdf"]),
];

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tiff"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx"];

/// Lowercase an extension and make sure it carries a leading dot.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Normalized extension of `path`, or `None` if it has none.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| normalize_extension(&ext.to_string_lossy()))
}

/// Valid target formats for an extension. `None` means unsupported.
pub fn valid_formats(extension: &str) -> Option<&'static [&'static str]> {
    let ext = normalize_extension(extension);
    FORMAT_MAP
        .iter()
        .find(|(input, _)| *input == ext)
        .map(|(_, formats)| *formats)
}

pub fn is_valid(extension: &str, format: &str) -> bool {
    let format = format.trim().to_lowercase();
    valid_formats(extension)
        .map(|formats| formats.contains(&format.as_str()))
        .unwrap_or(false)
}

/// Every supported input extension, without the leading dot.
pub fn supported_extensions() -> Vec<&'static str> {
    FORMAT_MAP
        .iter()
        .map(|(input, _)| input.trim_start_matches('.'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_has_targets_other_than_itself() {
        for (input, _) in FORMAT_MAP {
            let formats = valid_formats(input).unwrap();
            assert!(!formats.is_empty(), "{} has no targets", input);
            assert!(
                !formats.contains(&input.trim_start_matches('.')),
                "{} converts to itself",
                input
            );
        }
    }

    #[test]
    fn test_symmetric_image_conversions() {
        assert!(is_valid(".jpg", "png"));
        assert!(is_valid(".png", "jpg"));
    }

    #[test]
    fn test_case_insensitive_matching() {
        assert_eq!(valid_formats(".MP4"), Some(&["mp3", "gif"][..]));
        assert_eq!(valid_formats("PDF"), Some(&["docx"][..]));
        assert!(is_valid(".PNG", "WEBP"));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(valid_formats(".mkv").is_none());
        assert!(valid_formats("").is_none());
        assert!(!is_valid(".mkv", "mp4"));
    }

    #[test]
    fn test_invalid_choice_for_supported_extension() {
        assert!(!is_valid(".mp4", "png"));
        assert!(!is_valid(".pdf", "pdf"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("/tmp/Photo.JPG")), Some(".jpg".to_string()));
        assert_eq!(extension_of(Path::new("archive.tar.gz")), Some(".gz".to_string()));
        assert_eq!(extension_of(Path::new("README")), None);
    }

    #[test]
    fn test_supported_extensions_order() {
        let exts = supported_extensions();
        assert_eq!(exts.len(), 9);
        assert_eq!(exts[0], "png");
        assert_eq!(exts[8], "docx");
    }
}
