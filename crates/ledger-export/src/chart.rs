//! Chart rasters embedded in PDF exports.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("could not decode chart image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image data truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("chart has no pixels")]
    Empty,

    #[error("chart unavailable: {0}")]
    Unavailable(String),
}

/// An 8-bit RGB raster, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ChartError> {
        if width == 0 || height == 0 {
            return Err(ChartError::Empty);
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() < expected {
            return Err(ChartError::Truncated {
                expected,
                found: pixels.len(),
            });
        }
        let mut pixels = pixels;
        pixels.truncate(expected);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode an encoded image (PNG, JPEG or PNM), flattening any alpha
    /// channel away.
    pub fn decode(bytes: &[u8]) -> Result<Self, ChartError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self::new(width, height, rgb.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Something that can be rasterized into the PDF.
pub trait ChartSource {
    fn rasterize(&self) -> Result<RasterImage, ChartError>;
}

impl ChartSource for RasterImage {
    fn rasterize(&self) -> Result<RasterImage, ChartError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    #[test]
    fn decodes_ppm_with_comments() {
        let mut bytes = b"P6\n# sales chart\n2 1\n255\n".to_vec();
        bytes.extend_from_slice(&[255, 0, 0, 0, 0, 255]);
        let image = RasterImage::decode(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (2, 1));
        assert_eq!(image.pixels(), &[255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn decodes_png_and_drops_alpha() {
        let mut canvas = RgbaImage::new(3, 2);
        canvas.put_pixel(2, 1, Rgba([10, 20, 30, 128]));
        let mut png = Cursor::new(Vec::new());
        canvas.write_to(&mut png, ImageFormat::Png).unwrap();

        let image = RasterImage::decode(png.get_ref()).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.pixels().len(), 3 * 2 * 3);
        assert_eq!(&image.pixels()[15..], &[10, 20, 30]);
    }

    #[test]
    fn rejects_unreadable_bytes() {
        let err = RasterImage::decode(b"not an image").unwrap_err();
        assert!(matches!(err, ChartError::Decode(_)));
        assert!(err.to_string().starts_with("could not decode chart image"));
    }

    #[test]
    fn rejects_short_rasters() {
        assert!(matches!(
            RasterImage::new(2, 2, vec![0; 6]),
            Err(ChartError::Truncated {
                expected: 12,
                found: 6
            })
        ));
        assert!(matches!(RasterImage::new(0, 4, Vec::new()), Err(ChartError::Empty)));
    }
}
