//! Image preparation for multimodal queries.

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, imageops::FilterType};

use nova_common::{RelayError, constants::MAX_IMAGE_DIMENSION};

/// Decode a client-supplied base64 image and re-encode it as RGB PNG.
///
/// Accepts bare base64 or a `data:` URL. Images wider or taller than
/// `MAX_IMAGE_DIMENSION` are downscaled, keeping the aspect ratio.
pub fn prepare_image(encoded: &str) -> Result<Vec<u8>, RelayError> {
    let payload = match encoded.split_once(',') {
        Some((header, data)) if header.starts_with("data:") => data,
        _ => encoded,
    };
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| RelayError::Validation("Error processing image".to_string()))?;

    let mut img = image::load_from_memory(&bytes)
        .map_err(|_| RelayError::Validation("Error processing image".to_string()))?;

    if img.width() > MAX_IMAGE_DIMENSION || img.height() > MAX_IMAGE_DIMENSION {
        img = img.resize(MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION, FilterType::Lanczos3);
        tracing::info!(width = img.width(), height = img.height(), "Resized image");
    }

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut png = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| RelayError::Internal(format!("PNG encoding failed: {}", e)))?;

    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn encoded_png(width: u32, height: u32) -> String {
        let img = ImageBuffer::from_pixel(width, height, Rgba([200u8, 10, 10, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_small_image_keeps_size_and_drops_alpha() {
        let png = prepare_image(&encoded_png(40, 20)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (40, 20));
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let png = prepare_image(&encoded_png(1500, 300)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();

        assert_eq!(decoded.width(), MAX_IMAGE_DIMENSION);
        assert!((204..=205).contains(&decoded.height()));
    }

    #[test]
    fn test_data_url_prefix_is_accepted() {
        let url = format!("data:image/png;base64,{}", encoded_png(8, 8));
        assert!(prepare_image(&url).is_ok());
    }

    #[test]
    fn test_garbage_is_validation_error() {
        let err = prepare_image("not base64 at all!").unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));

        // valid base64, not an image
        let err = prepare_image(&STANDARD.encode(b"hello world")).unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
    }
}
