/// GPU Module
///
/// Device loss detection and the per-frame recovery loop.
pub mod device_recovery;

pub use device_recovery::{
    begin_frame, create_device_recovery, mark_device_lost, DeviceRecoveryData, DeviceResources, DeviceStatus,
    FrameDisposition, RecoverableDevice,
};
#[cfg(feature = "gpu")]
pub use device_recovery::{create_wgpu_device_monitor, WgpuDeviceMonitor};
