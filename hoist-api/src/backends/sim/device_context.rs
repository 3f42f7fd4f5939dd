use super::trace::HoistSimTrace;
use super::*;
use crate::internal_shared;
use crate::{
    HoistBufferDef, HoistDeviceInfo, HoistQueueType, HoistResult, HoistSubresourceFootprint,
    HoistTextureDef,
};
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

// Same requirements as D3D12_TEXTURE_DATA_PLACEMENT_ALIGNMENT and D3D12_TEXTURE_DATA_PITCH_ALIGNMENT
const SIM_TEXTURE_PLACEMENT_ALIGNMENT: u32 = 512;
const SIM_TEXTURE_PITCH_ALIGNMENT: u32 = 256;

pub(super) struct HoistDeviceContextSimInner {
    api_def: HoistApiDefSim,
    device_info: HoistDeviceInfo,
    trace: HoistSimTrace,
    allocated_bytes: AtomicU64,
    live_resource_count: AtomicUsize,
    next_queue_id: AtomicU32,
    next_fence_id: AtomicU32,
}

#[derive(Clone)]
pub struct HoistDeviceContextSim {
    pub(super) inner: Arc<HoistDeviceContextSimInner>,
}

impl HoistDeviceContextSim {
    pub(super) fn new(api_def: HoistApiDefSim) -> Self {
        let device_info = HoistDeviceInfo {
            upload_texture_alignment: SIM_TEXTURE_PLACEMENT_ALIGNMENT,
            upload_texture_row_alignment: SIM_TEXTURE_PITCH_ALIGNMENT,
        };

        let inner = HoistDeviceContextSimInner {
            trace: HoistSimTrace::new(api_def.record_trace),
            api_def,
            device_info,
            allocated_bytes: AtomicU64::new(0),
            live_resource_count: AtomicUsize::new(0),
            next_queue_id: AtomicU32::new(0),
            next_fence_id: AtomicU32::new(0),
        };

        HoistDeviceContextSim {
            inner: Arc::new(inner),
        }
    }

    pub fn device_info(&self) -> &HoistDeviceInfo {
        &self.inner.device_info
    }

    pub fn api_def(&self) -> &HoistApiDefSim {
        &self.inner.api_def
    }

    /// Everything the device has done so far, in the order it happened
    pub fn trace_events(&self) -> Vec<HoistSimEvent> {
        self.inner.trace.snapshot()
    }

    pub fn clear_trace(&self) {
        self.inner.trace.clear();
    }

    /// Counted even when trace recording is disabled
    pub fn validation_error_count(&self) -> usize {
        self.inner.trace.validation_error_count()
    }

    pub fn allocated_bytes(&self) -> u64 {
        self.inner.allocated_bytes.load(Ordering::Acquire)
    }

    pub fn live_resource_count(&self) -> usize {
        self.inner.live_resource_count.load(Ordering::Acquire)
    }

    pub fn create_queue(
        &self,
        queue_type: HoistQueueType,
    ) -> HoistResult<HoistQueueSim> {
        if self.inner.api_def.fault_injection.fail_queue_creation == Some(queue_type) {
            return Err(format!(
                "Simulated failure creating {} queue",
                queue_type.name()
            ))?;
        }

        let queue_id = self.inner.next_queue_id.fetch_add(1, Ordering::Relaxed);
        HoistQueueSim::new(self, queue_type, queue_id)
    }

    pub fn create_fence(&self) -> HoistResult<HoistFenceSim> {
        if self.inner.api_def.fault_injection.fail_fence_creation {
            return Err("Simulated failure creating fence")?;
        }

        let fence_id = self.inner.next_fence_id.fetch_add(1, Ordering::Relaxed);
        Ok(HoistFenceSim::new(self, fence_id))
    }

    pub fn create_buffer(
        &self,
        buffer_def: &HoistBufferDef,
    ) -> HoistResult<HoistBufferSim> {
        HoistBufferSim::new(self, buffer_def)
    }

    pub fn create_texture(
        &self,
        texture_def: &HoistTextureDef,
    ) -> HoistResult<HoistTextureSim> {
        HoistTextureSim::new(self, texture_def)
    }

    /// Layout of a subresource in an upload buffer. The sim device uses the same alignment rules
    /// as D3D12.
    pub fn copyable_footprint(
        &self,
        texture_def: &HoistTextureDef,
        mip_level: u8,
        base_offset: u64,
    ) -> HoistSubresourceFootprint {
        internal_shared::copyable_footprint(
            texture_def,
            mip_level,
            base_offset,
            self.inner.device_info.upload_texture_alignment as u64,
            self.inner.device_info.upload_texture_row_alignment as u64,
        )
    }

    pub(super) fn trace(
        &self,
        event: HoistSimEvent,
    ) {
        self.inner.trace.record(event);
    }

    pub(super) fn allocate_memory(
        &self,
        size: u64,
    ) -> HoistResult<()> {
        let budget = self.inner.api_def.memory_budget.unwrap_or(u64::MAX);
        let mut allocated = self.inner.allocated_bytes.load(Ordering::Acquire);
        loop {
            let available = budget.saturating_sub(allocated);
            if size > available {
                return Err(crate::HoistError::OutOfMemory {
                    requested: size,
                    available,
                });
            }

            match self.inner.allocated_bytes.compare_exchange_weak(
                allocated,
                allocated + size,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => allocated = actual,
            }
        }

        self.inner
            .live_resource_count
            .fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    pub(super) fn free_memory(
        &self,
        size: u64,
    ) {
        self.inner.allocated_bytes.fetch_sub(size, Ordering::AcqRel);
        self.inner
            .live_resource_count
            .fetch_sub(1, Ordering::AcqRel);
    }
}
