// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoding images embedded in fonts.

use core::fmt;

use crate::paint::{ImageFormat, ImagePaint};

/// A decoded image with premultiplied RGBA8 pixels, stored row by row from the top.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Image {
    /// Creates an image from straight (not premultiplied) RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if width == 0 || height == 0 || expected != Some(data.len()) {
            return Err(ImageError::InvalidSize { width, height });
        }
        for pixel in data.chunks_exact_mut(4) {
            let alpha = u16::from(pixel[3]);
            for channel in &mut pixel[..3] {
                *channel = premultiply(*channel, alpha);
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The premultiplied RGBA8 pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The premultiplied RGBA8 value of a pixel, if it is in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let ix = (y as usize * self.width as usize + x as usize) * 4;
        self.data
            .get(ix..ix + 4)
            .and_then(|p| <[u8; 4]>::try_from(p).ok())
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "the product of two bytes divided by 255 fits in a byte"
)]
fn premultiply(channel: u8, alpha: u16) -> u8 {
    ((u16::from(channel) * alpha + 127) / 255) as u8
}

/// Decodes the image of an image paint.
///
/// Only PNG is supported, and only with the `png` feature enabled.
pub fn decode_image(paint: &ImagePaint<'_>) -> Result<Image, ImageError> {
    match paint.format {
        #[cfg(feature = "png")]
        ImageFormat::Png => decode_png(paint.data),
        format => Err(ImageError::Unsupported(format)),
    }
}

#[cfg(feature = "png")]
fn decode_png(data: &[u8]) -> Result<Image, ImageError> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        // `EXPAND` turns palette images into RGB(A).
        png::ColorType::Indexed => return Err(ImageError::Unsupported(ImageFormat::Png)),
    };

    Image::from_rgba8(info.width, info.height, rgba)
}

/// Reads the pixel dimensions from a PNG header without decoding the image.
#[cfg(feature = "png")]
pub(crate) fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let reader = png::Decoder::new(data).read_info().ok()?;
    let info = reader.info();
    Some((info.width, info.height))
}

#[cfg(not(feature = "png"))]
pub(crate) fn png_dimensions(_data: &[u8]) -> Option<(u32, u32)> {
    None
}

/// An error that occurred while decoding an image paint.
#[derive(Debug)]
#[non_exhaustive]
pub enum ImageError {
    /// The image encoding is not supported.
    Unsupported(ImageFormat),
    /// The pixel data doesn't match the image dimensions.
    InvalidSize {
        /// The declared width.
        width: u32,
        /// The declared height.
        height: u32,
    },
    /// The PNG decoder rejected the data.
    #[cfg(feature = "png")]
    Png(png::DecodingError),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(format) => write!(f, "unsupported image format {format:?}"),
            Self::InvalidSize { width, height } => {
                write!(f, "pixel data doesn't match a {width}x{height} image")
            }
            #[cfg(feature = "png")]
            Self::Png(err) => write!(f, "invalid PNG data: {err}"),
        }
    }
}

impl core::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            #[cfg(feature = "png")]
            Self::Png(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(feature = "png")]
impl From<png::DecodingError> for ImageError {
    fn from(err: png::DecodingError) -> Self {
        Self::Png(err)
    }
}
