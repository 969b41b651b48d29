// SPDX-License-Identifier: GPL-3.0-only

//! Still capture from the default camera through GStreamer
//!
//! The pipeline is built per capture and torn down right after:
//!
//! ```text
//! <device source> ! videoconvert ! videoscale ! video/x-raw,format=RGBA ! appsink
//! ```
//!
//! Frames arriving during the warm-up window are discarded while auto exposure
//! settles; the last frame seen afterwards becomes the still.

use super::types::{CameraDevice, CaptureOutcome, CapturedImage};
use super::CaptureProvider;
use crate::constants::capture;
use crate::errors::CaptureError;
use futures::FutureExt;
use futures::future::BoxFuture;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Number of cameras seen by the last device scan
///
/// Clones share the count. Scans run on blocking threads and record their
/// result here, so availability checks never touch the device monitor.
#[derive(Debug, Clone, Default)]
pub struct CameraInventory(Arc<AtomicUsize>);

impl CameraInventory {
    pub fn with_count(count: usize) -> Self {
        Self(Arc::new(AtomicUsize::new(count)))
    }

    pub fn record(&self, count: usize) {
        self.0.store(count, Ordering::Relaxed);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Capture provider backed by a camera device
pub struct StillCameraProvider {
    camera_index: usize,
    max_dimension: u32,
    inventory: CameraInventory,
}

impl StillCameraProvider {
    pub fn new(camera_index: usize, max_dimension: u32, inventory: CameraInventory) -> Self {
        Self {
            camera_index,
            max_dimension,
            inventory,
        }
    }
}

impl CaptureProvider for StillCameraProvider {
    fn is_available(&self) -> bool {
        self.inventory.count() > 0
    }

    fn capture(&self) -> BoxFuture<'static, Result<CaptureOutcome, CaptureError>> {
        let camera_index = self.camera_index;
        let max_dimension = self.max_dimension;
        let inventory = self.inventory.clone();
        async move {
            tokio::task::spawn_blocking(move || {
                capture_still(camera_index, max_dimension, &inventory)
            })
            .await
            .map_err(|e| CaptureError::PipelineFailed(format!("capture task failed: {}", e)))?
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "camera"
    }
}

/// List cameras visible to GStreamer
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    match video_sources() {
        Ok(devices) => devices
            .iter()
            .map(|device| CameraDevice {
                name: device.display_name().to_string(),
                device_class: device.device_class().to_string(),
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "Camera enumeration failed");
            Vec::new()
        }
    }
}

fn video_sources() -> Result<Vec<gstreamer::Device>, CaptureError> {
    gstreamer::init()?;

    let monitor = gstreamer::DeviceMonitor::new();
    let _filter = monitor.add_filter(Some(capture::DEVICE_CLASS), None);
    monitor.start()?;
    let devices: Vec<gstreamer::Device> = monitor.devices().into_iter().collect();
    monitor.stop();

    Ok(devices)
}

/// Blocking still capture. Runs on a tokio blocking thread.
fn capture_still(
    camera_index: usize,
    max_dimension: u32,
    inventory: &CameraInventory,
) -> Result<CaptureOutcome, CaptureError> {
    let devices = video_sources()?;
    inventory.record(devices.len());
    if devices.is_empty() {
        return Err(CaptureError::NoCameraFound);
    }
    let device = devices
        .get(camera_index)
        .ok_or(CaptureError::CameraIndexOutOfRange {
            index: camera_index,
            count: devices.len(),
        })?;

    info!(camera = %device.display_name(), camera_index, "Starting still capture");

    let pipeline = StillPipeline::new(device)?;
    let still = pipeline.pull_still()?;

    let image = still.map(|image| image.into_preview(max_dimension));
    match &image {
        Some(image) => info!(width = image.width, height = image.height, "Still captured"),
        None => warn!("Camera produced no frame before timeout"),
    }

    Ok(CaptureOutcome::Completed(image))
}

/// Running pipeline; set back to NULL when dropped
struct StillPipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
}

impl StillPipeline {
    fn new(device: &gstreamer::Device) -> Result<Self, CaptureError> {
        let source = device.create_element(None)?;
        let convert = gstreamer::ElementFactory::make("videoconvert").build()?;
        let scale = gstreamer::ElementFactory::make("videoscale").build()?;

        let caps = gstreamer::Caps::builder("video/x-raw")
            .field("format", capture::OUTPUT_FORMAT)
            .build();
        let appsink = AppSink::builder()
            .caps(&caps)
            .max_buffers(1)
            .drop(true)
            .sync(false)
            .build();

        let pipeline = gstreamer::Pipeline::new();
        pipeline.add_many([&source, &convert, &scale, appsink.upcast_ref()])?;
        gstreamer::Element::link_many([&source, &convert, &scale, appsink.upcast_ref()])?;

        let still = Self { pipeline, appsink };
        still.pipeline.set_state(gstreamer::State::Playing)?;
        debug!("Still pipeline playing");
        Ok(still)
    }

    /// Pull frames until the warm-up has passed, keeping the latest one
    fn pull_still(&self) -> Result<Option<CapturedImage>, CaptureError> {
        let start = Instant::now();
        let mut latest: Option<CapturedImage> = None;

        while start.elapsed() < capture::TIMEOUT {
            self.check_bus()?;

            let Some(sample) = self
                .appsink
                .try_pull_sample(gstreamer::ClockTime::from_mseconds(capture::PULL_TIMEOUT_MS))
            else {
                continue;
            };

            match sample_to_image(&sample) {
                Some(image) => latest = Some(image),
                None => debug!("Skipping unreadable sample"),
            }

            if latest.is_some() && start.elapsed() >= capture::WARMUP {
                break;
            }
        }

        Ok(latest)
    }

    fn check_bus(&self) -> Result<(), CaptureError> {
        let Some(bus) = self.pipeline.bus() else {
            return Ok(());
        };
        if let Some(message) = bus.pop_filtered(&[gstreamer::MessageType::Error])
            && let gstreamer::MessageView::Error(err) = message.view()
        {
            return Err(CaptureError::PipelineFailed(err.error().to_string()));
        }
        Ok(())
    }
}

impl Drop for StillPipeline {
    fn drop(&mut self) {
        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            warn!(error = %e, "Failed to stop still pipeline");
        }
    }
}

fn sample_to_image(sample: &gstreamer::Sample) -> Option<CapturedImage> {
    let buffer = sample.buffer()?;
    let info = VideoInfo::from_caps(sample.caps()?).ok()?;
    let map = buffer.map_readable().ok()?;

    let stride = info.stride()[0].max(0) as usize;
    let data = copy_rows_without_stride(map.as_slice(), info.width(), info.height(), stride);
    CapturedImage::from_rgba(info.width(), info.height(), data)
}

/// Copy RGBA rows, dropping any per-row padding
fn copy_rows_without_stride(data: &[u8], width: u32, height: u32, stride: usize) -> Vec<u8> {
    let row_len = width as usize * 4;
    let mut packed = Vec::with_capacity(row_len * height as usize);

    for y in 0..height as usize {
        let row_start = y * stride;
        let row_end = row_start + row_len;
        if row_end <= data.len() {
            packed.extend_from_slice(&data[row_start..row_end]);
        }
    }

    packed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_padding_is_removed() {
        let data: Vec<u8> = vec![
            255, 0, 0, 255, 0, 255, 0, 255, 9, 9, // row 0 + padding
            0, 0, 255, 255, 255, 255, 255, 255, 9, 9, // row 1 + padding
        ];

        let packed = copy_rows_without_stride(&data, 2, 2, 10);

        assert_eq!(packed.len(), 16);
        assert_eq!(&packed[0..4], &[255, 0, 0, 255]);
        assert_eq!(&packed[12..16], &[255, 255, 255, 255]);
        assert!(!packed.contains(&9));
    }

    #[test]
    fn availability_follows_recorded_scan() {
        let inventory = CameraInventory::default();
        let provider = StillCameraProvider::new(0, 320, inventory.clone());
        assert!(!provider.is_available());

        inventory.record(2);
        assert!(provider.is_available());

        inventory.record(0);
        assert!(!provider.is_available());
    }

    #[test]
    fn truncated_buffers_yield_short_output() {
        let packed = copy_rows_without_stride(&[0u8; 12], 2, 2, 8);
        // Second row is incomplete and skipped, which from_rgba then rejects
        assert_eq!(packed.len(), 8);
        assert!(CapturedImage::from_rgba(2, 2, packed).is_none());
    }
}
