//! Tests for RGB flattening and JPEG export

#[cfg(test)]
mod tests {
    use dzconvert::convert::jpeg::{
        JpegExporter, JpegSettings, flatten_to_rgb, validate_quality, write_jpeg,
    };
    use dzconvert::io::error::ConvertError;
    use image::{ColorType, DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    // Fully transparent pixels become white, opaque pixels keep their colour
    #[test]
    fn test_flatten_composites_onto_white() {
        let mut image = RgbaImage::new(3, 1);
        image.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        image.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        image.put_pixel(2, 0, Rgba([0, 0, 0, 128]));

        let rgb = flatten_to_rgb(&DynamicImage::ImageRgba8(image));

        assert_eq!(*rgb.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*rgb.get_pixel(1, 0), Rgb([10, 20, 30]));
        assert_eq!(*rgb.get_pixel(2, 0), Rgb([127, 127, 127]));
    }

    #[test]
    fn test_flatten_grey_and_sixteen_bit() {
        let grey = GrayImage::from_pixel(2, 2, Luma([77]));
        assert_eq!(
            *flatten_to_rgb(&DynamicImage::ImageLuma8(grey)).get_pixel(1, 1),
            Rgb([77, 77, 77])
        );

        let deep: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(2, 2, Rgb([65535, 0, 32896]));
        let flattened = flatten_to_rgb(&DynamicImage::ImageRgb16(deep));
        assert_eq!(*flattened.get_pixel(0, 0), Rgb([255, 0, 128]));
    }

    #[test]
    fn test_quality_range() {
        assert!(validate_quality(1).is_ok());
        assert!(validate_quality(100).is_ok());
        assert!(matches!(
            validate_quality(0),
            Err(ConvertError::InvalidParameter {
                parameter: "quality",
                ..
            })
        ));
        assert!(validate_quality(101).is_err());
        assert!(JpegSettings { quality: 0 }.validate().is_err());
        assert_eq!(JpegSettings::default().quality, 95);
    }

    #[test]
    fn test_write_jpeg_round_trip_dimensions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.jpg");

        write_jpeg(&RgbImage::from_pixel(33, 17, Rgb([200, 100, 50])), &path, 95).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (33, 17));
        assert_eq!(decoded.color(), ColorType::Rgb8);
    }

    // Output names are sanitized and land in the output directory
    #[test]
    fn test_export_sanitizes_name() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("thin#section .png");
        RgbaImage::from_pixel(20, 10, Rgba([0, 0, 255, 255]))
            .save(&source)
            .unwrap();
        let out_dir = temp_dir.path().join("jpeg");

        let exporter = JpegExporter::new(JpegSettings::default());
        let output = exporter.export(&source, &out_dir).unwrap();

        assert_eq!(output, out_dir.join("thin_section.jpg"));
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
        assert_eq!(exporter.settings().quality, 95);
    }

    #[test]
    fn test_export_corrupt_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("broken.tif");
        std::fs::write(&source, b"II*\0not really a tiff").unwrap();

        let result = JpegExporter::default().export(&source, temp_dir.path());

        assert!(matches!(result, Err(ConvertError::ImageLoad { .. })));
        assert!(!temp_dir.path().join("broken.jpg").exists());
    }
}
