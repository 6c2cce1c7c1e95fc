//! Device loss recovery - Pure DOP functions
//!
//! Each frame the device is tested before anything is drawn. A lost device
//! releases unmanaged resources once and skips frames; once the device can be
//! reset it is reset, resources are restored and rendering resumes. A failed
//! reset or restore just skips the frame and tries again on the next one.

use crate::error::EngineResult;

/// Outcome of the per-frame device test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Ready,
    /// Lost and not resettable yet
    Lost,
    /// Lost but ready to be reset
    NotReset,
}

/// What the frame loop should do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDisposition {
    Render,
    Skip,
}

pub trait RecoverableDevice {
    fn test_status(&mut self) -> DeviceStatus;

    fn reset(&mut self) -> EngineResult<()>;
}

/// Resources that do not survive a device reset
pub trait DeviceResources {
    fn release_unmanaged(&mut self);

    fn restore(&mut self) -> EngineResult<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRecoveryData {
    /// Unmanaged resources are released and must be restored before rendering
    pub lost: bool,
    /// Set by `mark_device_lost` (e.g. a failed present)
    pub present_failed: bool,
    pub recoveries: u32,
    pub skipped_frames: u64,
}

pub fn create_device_recovery() -> DeviceRecoveryData {
    DeviceRecoveryData::default()
}

/// Record that presenting the last frame failed
pub fn mark_device_lost(recovery: &mut DeviceRecoveryData) {
    recovery.present_failed = true;
}

fn release_once<R: DeviceResources>(recovery: &mut DeviceRecoveryData, resources: &mut R) {
    if !recovery.lost {
        log::warn!("[device_recovery::begin_frame] Device lost; releasing unmanaged resources");
        resources.release_unmanaged();
        recovery.lost = true;
    }
}

fn skip(recovery: &mut DeviceRecoveryData) -> FrameDisposition {
    recovery.skipped_frames += 1;
    FrameDisposition::Skip
}

/// Test the device and recover it if needed
pub fn begin_frame<D, R>(recovery: &mut DeviceRecoveryData, device: &mut D, resources: &mut R) -> FrameDisposition
where
    D: RecoverableDevice,
    R: DeviceResources,
{
    match device.test_status() {
        DeviceStatus::Ready if !recovery.lost => {
            recovery.present_failed = false;
            return FrameDisposition::Render;
        }
        DeviceStatus::Ready => {}
        DeviceStatus::Lost => {
            release_once(recovery, resources);
            return skip(recovery);
        }
        DeviceStatus::NotReset => {
            release_once(recovery, resources);
            if let Err(e) = device.reset() {
                log::warn!("[device_recovery::begin_frame] Device reset failed, retrying next frame: {}", e);
                return skip(recovery);
            }
        }
    }

    if let Err(e) = resources.restore() {
        log::warn!("[device_recovery::begin_frame] Resource restore failed, retrying next frame: {}", e);
        return skip(recovery);
    }

    recovery.lost = false;
    recovery.present_failed = false;
    recovery.recoveries += 1;
    log::info!(
        "[device_recovery::begin_frame] Device recovered ({} recoveries, {} frames skipped)",
        recovery.recoveries,
        recovery.skipped_frames
    );
    FrameDisposition::Render
}

/// Device monitor for `wgpu`, driven by uncaptured device errors
///
/// `wgpu` devices cannot be reset in place, so `reset` always fails and the
/// application is expected to recreate the device once it sees the skips.
#[cfg(feature = "gpu")]
pub struct WgpuDeviceMonitor {
    lost: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(feature = "gpu")]
pub fn create_wgpu_device_monitor(device: &wgpu::Device) -> WgpuDeviceMonitor {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let lost = Arc::new(AtomicBool::new(false));
    let flag = lost.clone();
    device.on_uncaptured_error(Box::new(move |error| match error {
        wgpu::Error::OutOfMemory { .. } => {
            log::error!("[device_recovery::WgpuDeviceMonitor] GPU out of memory; treating device as lost");
            flag.store(true, Ordering::Relaxed);
        }
        wgpu::Error::Validation { description, .. } => {
            log::error!("[device_recovery::WgpuDeviceMonitor] GPU validation error: {}", description);
        }
    }));

    WgpuDeviceMonitor { lost }
}

#[cfg(feature = "gpu")]
impl RecoverableDevice for WgpuDeviceMonitor {
    fn test_status(&mut self) -> DeviceStatus {
        if self.lost.load(std::sync::atomic::Ordering::Relaxed) {
            DeviceStatus::Lost
        } else {
            DeviceStatus::Ready
        }
    }

    fn reset(&mut self) -> EngineResult<()> {
        Err(crate::error::EngineError::DeviceResetFailed {
            error: "wgpu devices must be recreated".to_string(),
        })
    }
}
