//! Shared file dialog helpers for widget UI.

use std::path::Path;

/// Extensions the decoder accepts.
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg"];

/// Create configured file dialog for artwork selection.
pub fn create_image_dialog(title: &str) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("Images (PNG, JPEG)", IMAGE_EXTS)
        .set_title(title)
}

/// Check a dropped or picked path by extension (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_image(Path::new("logo.PNG")));
        assert!(is_supported_image(Path::new("/tmp/photo.jpeg")));
        assert!(!is_supported_image(Path::new("vector.svg")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }
}
