// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rasterized snapshots of the host surface, used for pixel color readouts.

use core::fmt;

use image::{ImageFormat, RgbaImage};
use kurbo::{Point, Size};
use peniko::Color;

/// Why a snapshot could not be used.
#[derive(Debug)]
pub enum SnapshotError {
    /// The host failed to capture the surface.
    Capture(String),
    /// The encoded image could not be decoded.
    Decode(image::ImageError),
    /// Raw pixel data did not match the stated dimensions.
    SizeMismatch {
        /// Bytes required for the stated dimensions.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture(reason) => write!(f, "snapshot capture failed: {reason}"),
            Self::Decode(err) => write!(f, "snapshot decode failed: {err}"),
            Self::SizeMismatch { expected, actual } => write!(
                f,
                "snapshot pixel buffer has {actual} bytes, expected {expected}"
            ),
        }
    }
}

impl core::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

/// A decoded RGBA8 raster of the host surface.
#[derive(Clone, Debug)]
pub struct Snapshot {
    image: RgbaImage,
}

impl Snapshot {
    /// Decode a PNG.
    pub fn decode_png(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(SnapshotError::Decode)?
            .to_rgba8();
        Ok(Self { image })
    }

    /// Wrap unpremultiplied RGBA8 rows, `width * height * 4` bytes.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SnapshotError> {
        let expected = width as usize * height as usize * 4;
        let actual = pixels.len();
        RgbaImage::from_raw(width, height, pixels)
            .map(|image| Self { image })
            .ok_or(SnapshotError::SizeMismatch { expected, actual })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The pixel at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let [r, g, b, a] = self.image.get_pixel_checked(x, y)?.0;
        Some(Color::from_rgba8(r, g, b, a))
    }

    /// The pixel under `pt`, given in surface coordinates of a surface sized
    /// `surface`. The snapshot may have a different resolution than the
    /// surface (for example on high-DPI displays).
    #[must_use]
    pub fn sample(&self, pt: Point, surface: Size) -> Option<Color> {
        if !(surface.width > 0.0 && surface.height > 0.0) {
            return None;
        }
        let x = (pt.x * f64::from(self.width()) / surface.width).floor();
        let y = (pt.y * f64::from(self.height()) / surface.height).floor();
        let (x, y) = (to_index(x, self.width())?, to_index(y, self.height())?);
        self.pixel(x, y)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "range is checked against the pixel extent before casting"
)]
fn to_index(v: f64, extent: u32) -> Option<u32> {
    (v >= 0.0 && v < f64::from(extent)).then(|| v as u32)
}

/// Format a color as `#rrggbbaa`.
#[must_use]
pub fn color_hex(color: Color) -> String {
    let c = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn two_by_one() -> RgbaImage {
        RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 128]).unwrap()
    }

    #[test]
    fn decodes_png_and_samples() {
        let mut png = Cursor::new(Vec::new());
        two_by_one()
            .write_to(&mut png, image::ImageOutputFormat::Png)
            .unwrap();
        let snapshot = Snapshot::decode_png(png.get_ref()).unwrap();
        assert_eq!((snapshot.width(), snapshot.height()), (2, 1));

        let surface = Size::new(20.0, 10.0);
        let left = snapshot.sample(Point::new(5.0, 5.0), surface).unwrap();
        let right = snapshot.sample(Point::new(15.0, 5.0), surface).unwrap();
        assert_eq!(color_hex(left), "#ff0000ff");
        assert_eq!(color_hex(right), "#0000ff80");
        assert!(snapshot.sample(Point::new(20.0, 5.0), surface).is_none());
        assert!(snapshot.sample(Point::new(-1.0, 5.0), surface).is_none());
        assert!(snapshot.sample(Point::new(5.0, 5.0), Size::ZERO).is_none());
    }

    #[test]
    fn rejects_garbage_and_short_buffers() {
        assert!(matches!(
            Snapshot::decode_png(b"not a png"),
            Err(SnapshotError::Decode(_))
        ));
        assert!(matches!(
            Snapshot::from_rgba8(2, 2, vec![0; 4]),
            Err(SnapshotError::SizeMismatch {
                expected: 16,
                actual: 4
            })
        ));
    }
}
