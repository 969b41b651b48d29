// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for capture providers

use image::{DynamicImage, RgbaImage};
use std::sync::Arc;
use std::time::Instant;

/// A camera as reported by the GStreamer device monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Human readable name
    pub name: String,
    /// Device class reported by the provider (e.g. "Video/Source")
    pub device_class: String,
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.device_class)
    }
}

/// An in-memory RGBA still image
///
/// Pixel data is tightly packed (stride = width * 4) and shared through an
/// `Arc` so the view and the classifier can hold the same capture.
#[derive(Clone)]
pub struct CapturedImage {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub captured_at: Instant,
}

impl std::fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for CapturedImage {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.data == other.data
    }
}

impl CapturedImage {
    /// Wrap tightly packed RGBA bytes. Returns `None` if the length does not match.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            data: Arc::from(data),
            captured_at: Instant::now(),
        })
    }

    /// Fill a `width`×`height` image with one color
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Option<Self> {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::from_rgba(width, height, data)
    }

    pub fn from_dynamic(image: &DynamicImage) -> Option<Self> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    pub fn to_dynamic(&self) -> Option<DynamicImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
            .map(DynamicImage::ImageRgba8)
    }

    /// Downscale so the longer side is at most `max_dimension`
    ///
    /// Images already within bounds are returned unchanged.
    pub fn into_preview(self, max_dimension: u32) -> Self {
        if max_dimension == 0 || (self.width <= max_dimension && self.height <= max_dimension) {
            return self;
        }
        let Some(image) = self.to_dynamic() else {
            return self;
        };
        let thumbnail = image.thumbnail(max_dimension, max_dimension);
        let captured_at = self.captured_at;
        match Self::from_dynamic(&thumbnail) {
            Some(preview) => Self {
                captured_at,
                ..preview
            },
            None => self,
        }
    }
}

/// What a capture provider hands back once its UI closes
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The capture finished with a success code. The image may still be missing.
    Completed(Option<CapturedImage>),
    /// The user dismissed the capture
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_rejects_mismatched_length() {
        assert!(CapturedImage::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(CapturedImage::from_rgba(0, 2, Vec::new()).is_none());
        assert!(CapturedImage::from_rgba(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn preview_keeps_aspect_ratio() {
        let image = CapturedImage::solid(640, 480, [255, 0, 0, 255]).unwrap();
        let preview = image.into_preview(320);
        assert_eq!((preview.width, preview.height), (320, 240));
        assert_eq!(&preview.data[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let image = CapturedImage::solid(100, 100, [0, 0, 255, 255]).unwrap();
        let preview = image.clone().into_preview(320);
        assert_eq!(preview, image);
    }
}
