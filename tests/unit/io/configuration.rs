//! Tests for conversion defaults

#[cfg(test)]
mod tests {
    use dzconvert::io::configuration::{
        DEFAULT_JPEG_QUALITY, DEFAULT_TILE_OVERLAP, DEFAULT_TILE_QUALITY, DEFAULT_TILE_SIZE,
        LOG_FILE_PREFIX, SUPPORTED_EXTENSIONS, TILES_DIR_SUFFIX,
    };

    // Defaults reproduce the established conversion settings
    #[test]
    fn test_deepzoom_defaults() {
        assert_eq!(DEFAULT_TILE_SIZE, 256);
        assert_eq!(DEFAULT_TILE_OVERLAP, 1);
        assert_eq!(DEFAULT_TILE_QUALITY, 90);
        assert!(DEFAULT_TILE_OVERLAP < DEFAULT_TILE_SIZE);
        assert_eq!(TILES_DIR_SUFFIX, "_files");
    }

    #[test]
    fn test_jpeg_and_log_defaults() {
        assert_eq!(DEFAULT_JPEG_QUALITY, 95);
        assert_eq!(LOG_FILE_PREFIX, "converter_log_");
    }

    #[test]
    fn test_supported_extensions_are_lowercase() {
        for extension in SUPPORTED_EXTENSIONS {
            assert_eq!(extension, extension.to_ascii_lowercase());
        }
        assert!(SUPPORTED_EXTENSIONS.contains(&"tif"));
        assert!(SUPPORTED_EXTENSIONS.contains(&"jpeg"));
    }
}
