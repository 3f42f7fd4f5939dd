use crate::dx12::HoistDeviceContextDx12;
use crate::HoistResult;
use std::sync::Mutex;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Threading::{CreateEventW, WaitForSingleObject, INFINITE};

use super::d3d12;

pub struct HoistFenceDx12 {
    _device_context: HoistDeviceContextDx12,
    fence: d3d12::ID3D12Fence,
    // Auto-reset event used for blocking CPU waits. Waits on the same fence are serialized since
    // they share it.
    wait_event: Mutex<HANDLE>,
}

// The event handle is only used under the lock
unsafe impl Send for HoistFenceDx12 {}
unsafe impl Sync for HoistFenceDx12 {}

impl std::fmt::Debug for HoistFenceDx12 {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HoistFenceDx12")
            .field("fence", &self.fence)
            .finish()
    }
}

impl Drop for HoistFenceDx12 {
    fn drop(&mut self) {
        if let Ok(wait_event) = self.wait_event.lock() {
            if let Err(e) = unsafe { CloseHandle(*wait_event) } {
                log::warn!("Failed to close fence event: {}", e);
            }
        }
    }
}

impl HoistFenceDx12 {
    pub fn new(device_context: &HoistDeviceContextDx12) -> HoistResult<HoistFenceDx12> {
        let fence = unsafe {
            device_context
                .d3d12_device()
                .CreateFence(0, d3d12::D3D12_FENCE_FLAG_NONE)
        }?;

        let wait_event = unsafe { CreateEventW(None, false, false, None) }?;

        Ok(HoistFenceDx12 {
            _device_context: device_context.clone(),
            fence,
            wait_event: Mutex::new(wait_event),
        })
    }

    pub fn dx12_fence(&self) -> &d3d12::ID3D12Fence {
        &self.fence
    }

    pub fn completed_value(&self) -> u64 {
        unsafe { self.fence.GetCompletedValue() }
    }

    pub fn wait_for_value(
        &self,
        value: u64,
    ) -> HoistResult<()> {
        profiling::scope!("HoistFenceDx12::wait_for_value");
        if self.completed_value() >= value {
            return Ok(());
        }

        let wait_event = self.wait_event.lock().unwrap();
        unsafe {
            self.fence.SetEventOnCompletion(value, *wait_event)?;
            WaitForSingleObject(*wait_event, INFINITE);
        }

        Ok(())
    }
}
