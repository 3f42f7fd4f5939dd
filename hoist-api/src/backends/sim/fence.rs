use super::{HoistDeviceContextSim, HoistSimEvent};
use crate::HoistResult;
use std::sync::{Arc, Condvar, Mutex};

struct HoistFenceSimInner {
    device_context: HoistDeviceContextSim,
    fence_id: u32,
    value: Mutex<u64>,
    value_changed: Condvar,
}

/// A monotonic timeline value that queues signal and that the CPU or other queues wait on
#[derive(Clone)]
pub struct HoistFenceSim {
    inner: Arc<HoistFenceSimInner>,
}

impl std::fmt::Debug for HoistFenceSim {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HoistFenceSim")
            .field("fence_id", &self.inner.fence_id)
            .field("completed_value", &self.completed_value())
            .finish()
    }
}

impl HoistFenceSim {
    pub fn fence_id(&self) -> u32 {
        self.inner.fence_id
    }

    pub fn completed_value(&self) -> u64 {
        *self.inner.value.lock().unwrap()
    }

    /// Blocks the calling thread until the fence reaches `value`. There is no timeout.
    pub fn wait_for_value(
        &self,
        value: u64,
    ) -> HoistResult<()> {
        profiling::scope!("HoistFenceSim::wait_for_value");
        let fence_id = self.inner.fence_id;
        self.inner
            .device_context
            .trace(HoistSimEvent::CpuWaitBegin {
                fence: fence_id,
                value,
            });

        self.block_until(value);

        self.inner
            .device_context
            .trace(HoistSimEvent::CpuWaitEnd {
                fence: fence_id,
                value,
            });
        Ok(())
    }

    pub(super) fn block_until(
        &self,
        value: u64,
    ) {
        let mut completed = self.inner.value.lock().unwrap();
        while *completed < value {
            completed = self.inner.value_changed.wait(completed).unwrap();
        }
    }

    /// Sets the fence to `value`, the same way ID3D12Fence::Signal does
    pub(super) fn set_value(
        &self,
        value: u64,
    ) {
        let mut completed = self.inner.value.lock().unwrap();
        *completed = value;
        self.inner.value_changed.notify_all();
    }

    pub(super) fn new(
        device_context: &HoistDeviceContextSim,
        fence_id: u32,
    ) -> Self {
        let inner = HoistFenceSimInner {
            device_context: device_context.clone(),
            fence_id,
            value: Mutex::new(0),
            value_changed: Condvar::new(),
        };

        HoistFenceSim {
            inner: Arc::new(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::HoistApiDefSim;

    #[test]
    fn cpu_wait_unblocks_on_signal() {
        let device_context = HoistDeviceContextSim::new(HoistApiDefSim::default());
        let fence = device_context.create_fence().unwrap();
        assert_eq!(fence.completed_value(), 0);

        let signaller = fence.clone();
        let thread = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            signaller.set_value(3);
        });

        fence.wait_for_value(2).unwrap();
        assert_eq!(fence.completed_value(), 3);
        thread.join().unwrap();

        // Already reached values return immediately
        fence.wait_for_value(1).unwrap();
    }
}
