use crate::dx12::{HoistDeviceContextDx12, HoistDeviceContextDx12Inner};
use crate::HoistResult;
use std::sync::Arc;

/// Configuration for the D3D12 device
#[derive(Default, Clone, Debug)]
pub struct HoistApiDefDx12 {
    /// Turns on the D3D12 debug layer. Requires the Graphics Tools optional feature.
    pub enable_validation: bool,

    /// GPU-based validation catches resource state errors the debug layer can't see on the CPU.
    /// Only used when `enable_validation` is set.
    pub enable_gpu_based_validation: bool,

    /// Create the device on the WARP software adapter instead of a hardware adapter
    pub use_warp_device: bool,
}

/// Owns the D3D12 device. Every device context, queue and resource must be dropped before this.
pub struct HoistApiDx12 {
    device_context: Option<HoistDeviceContextDx12>,
}

impl HoistApiDx12 {
    pub fn device_context(&self) -> &HoistDeviceContextDx12 {
        self.device_context.as_ref().unwrap()
    }

    /// # Safety
    ///
    /// Creates a D3D12 device. The returned object must outlive everything created through it.
    pub unsafe fn new(api_def: &HoistApiDefDx12) -> HoistResult<Self> {
        log::info!(
            "Creating D3D12 device (validation: {}, gpu validation: {}, warp: {})",
            api_def.enable_validation,
            api_def.enable_gpu_based_validation,
            api_def.use_warp_device
        );

        let inner = HoistDeviceContextDx12Inner::new(api_def)?;
        Ok(HoistApiDx12 {
            device_context: Some(HoistDeviceContextDx12::new(Arc::new(inner))),
        })
    }

    /// Releases the device. Fails if any clone of the device context is still alive, the device
    /// is leaked in that case rather than released under live objects.
    pub fn destroy(&mut self) -> HoistResult<()> {
        let device_context = match self.device_context.take() {
            Some(device_context) => device_context,
            None => return Ok(()),
        };

        let outstanding = Arc::strong_count(&device_context.inner) - 1;
        if outstanding > 0 {
            std::mem::forget(device_context);
            return Err(format!(
                "D3D12 device destroyed while {} device context handles are alive",
                outstanding
            ))?;
        }

        log::debug!("Releasing D3D12 device");
        Ok(())
    }
}

impl Drop for HoistApiDx12 {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            log::error!("{}", e);
        }
    }
}
