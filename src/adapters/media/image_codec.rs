use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

use crate::application::ports::ImageCodecPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::media::ImageEncoding;

const JPEG_QUALITY: u8 = 90;

/// png/jpeg codec; annotated output is written in the upload's own encoding.
pub struct ImageCodec;

impl ImageCodec {
    pub fn new() -> Self { Self }
}

impl Default for ImageCodec {
    fn default() -> Self { Self::new() }
}

fn format_of(encoding: ImageEncoding) -> ImageFormat {
    match encoding {
        ImageEncoding::Png => ImageFormat::Png,
        ImageEncoding::Jpeg => ImageFormat::Jpeg,
    }
}

impl ImageCodecPort for ImageCodec {
    fn decode(&self, bytes: &[u8], encoding: ImageEncoding) -> DomainResult<RgbImage> {
        let img = image::load_from_memory_with_format(bytes, format_of(encoding))
            .map_err(|e| DomainError::Decode(e.to_string()))?;
        Ok(img.to_rgb8())
    }

    fn encode(&self, image: &RgbImage, encoding: ImageEncoding) -> DomainResult<Vec<u8>> {
        let mut out = Vec::new();
        let res = match encoding {
            ImageEncoding::Jpeg => {
                let mut enc = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
                enc.encode(image.as_raw(), image.width(), image.height(), image::ExtendedColorType::Rgb8)
            }
            ImageEncoding::Png => image.write_to(&mut Cursor::new(&mut out), ImageFormat::Png),
        };
        res.map_err(|e| DomainError::OperationFailed(format!("encoding image: {e}")))?;
        Ok(out)
    }
}
