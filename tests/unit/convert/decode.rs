//! Tests for source image decoding

#[cfg(test)]
mod tests {
    use dzconvert::convert::decode::open_image;
    use dzconvert::io::error::ConvertError;
    use image::{ImageFormat, Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_open_tiff() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.tif");
        RgbImage::from_pixel(12, 9, Rgb([1, 2, 3]))
            .save_with_format(&path, ImageFormat::Tiff)
            .unwrap();

        let image = open_image(&path).unwrap();
        assert_eq!((image.width(), image.height()), (12, 9));
    }

    // Format comes from the content, not the extension
    #[test]
    fn test_open_ignores_misleading_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("actually_png.jpg");
        RgbImage::from_pixel(5, 4, Rgb([9, 9, 9]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let image = open_image(&path).unwrap();
        assert_eq!((image.width(), image.height()), (5, 4));
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = open_image(&temp_dir.path().join("missing.png"));

        assert!(matches!(
            result,
            Err(ConvertError::FileSystem {
                operation: "open image",
                ..
            })
        ));
    }

    #[test]
    fn test_open_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("noise.png");
        std::fs::write(&path, [0_u8, 1, 2, 3, 4, 5, 6, 7]).unwrap();

        assert!(matches!(
            open_image(&path),
            Err(ConvertError::ImageLoad { .. })
        ));
    }
}
