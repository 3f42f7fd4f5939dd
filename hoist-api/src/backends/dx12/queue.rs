use crate::dx12::{
    HoistCommandBufferDx12, HoistCommandPoolDx12, HoistDeviceContextDx12, HoistFenceDx12,
};
use crate::{HoistCommandPoolDef, HoistError, HoistQueueType, HoistResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::d3d12;

pub struct HoistQueueDx12Inner {
    device_context: HoistDeviceContextDx12,
    queue_type: HoistQueueType,
    queue: d3d12::ID3D12CommandQueue,
    queue_id: u32,
    idle_fence: HoistFenceDx12,
    idle_fence_value: AtomicU64,
}

unsafe impl Send for HoistQueueDx12Inner {}
unsafe impl Sync for HoistQueueDx12Inner {}

impl std::fmt::Debug for HoistQueueDx12Inner {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("HoistQueueDx12Inner")
            .field("queue_type", &self.queue_type)
            .field("queue_id", &self.queue_id)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct HoistQueueDx12 {
    inner: Arc<HoistQueueDx12Inner>,
}

impl HoistQueueDx12 {
    pub fn queue_id(&self) -> u32 {
        self.inner.queue_id
    }

    pub fn dx12_queue(&self) -> &d3d12::ID3D12CommandQueue {
        &self.inner.queue
    }

    pub fn queue_type(&self) -> HoistQueueType {
        self.inner.queue_type
    }

    pub fn device_context(&self) -> &HoistDeviceContextDx12 {
        &self.inner.device_context
    }

    pub(crate) fn command_list_type(&self) -> d3d12::D3D12_COMMAND_LIST_TYPE {
        super::internal::queue_type_to_command_list_type(self.inner.queue_type)
    }

    pub fn create_command_pool(
        &self,
        command_pool_def: &HoistCommandPoolDef,
    ) -> HoistResult<HoistCommandPoolDx12> {
        HoistCommandPoolDx12::new(self, command_pool_def)
    }

    pub fn new(
        device_context: &HoistDeviceContextDx12,
        queue_type: HoistQueueType,
        queue_id: u32,
    ) -> HoistResult<HoistQueueDx12> {
        let queue_desc = d3d12::D3D12_COMMAND_QUEUE_DESC {
            Type: super::internal::queue_type_to_command_list_type(queue_type),
            Priority: d3d12::D3D12_COMMAND_QUEUE_PRIORITY_NORMAL.0,
            Flags: d3d12::D3D12_COMMAND_QUEUE_FLAG_NONE,
            NodeMask: 0,
        };

        let queue = unsafe {
            let queue: d3d12::ID3D12CommandQueue = device_context
                .d3d12_device()
                .CreateCommandQueue(&queue_desc)?;

            queue.SetName(match queue_type {
                HoistQueueType::Direct => windows::core::w!("Direct"),
                HoistQueueType::Copy => windows::core::w!("Copy"),
            })?;

            queue
        };

        let idle_fence = HoistFenceDx12::new(device_context)?;

        log::debug!("Created dx12 {} queue {}", queue_type.name(), queue_id);

        let inner = HoistQueueDx12Inner {
            device_context: device_context.clone(),
            queue_type,
            queue,
            queue_id,
            idle_fence,
            idle_fence_value: AtomicU64::new(0),
        };

        Ok(HoistQueueDx12 {
            inner: Arc::new(inner),
        })
    }

    pub fn wait_for_queue_idle(&self) -> HoistResult<()> {
        let value = self.inner.idle_fence_value.fetch_add(1, Ordering::Relaxed) + 1;
        self.signal(&self.inner.idle_fence, value)?;
        self.inner.idle_fence.wait_for_value(value)
    }

    pub fn submit(
        &self,
        command_buffers: &[&HoistCommandBufferDx12],
    ) -> HoistResult<()> {
        profiling::scope!("HoistQueueDx12::submit");
        let command_lists = command_buffers
            .iter()
            .map(|x| x.closed_command_list().map(Some))
            .collect::<HoistResult<Vec<_>>>()?;

        if command_lists.is_empty() {
            return Ok(());
        }

        unsafe {
            self.inner.queue.ExecuteCommandLists(&command_lists);
        }

        if let Err(reason) = unsafe { self.device_context().d3d12_device().GetDeviceRemovedReason() } {
            log::error!(
                "Device removed after submit to {} queue: {}",
                self.inner.queue_type.name(),
                reason
            );
            return Err(HoistError::DeviceLost);
        }

        Ok(())
    }

    pub fn signal(
        &self,
        fence: &HoistFenceDx12,
        value: u64,
    ) -> HoistResult<()> {
        unsafe {
            self.inner.queue.Signal(fence.dx12_fence(), value)?;
        }
        Ok(())
    }

    pub fn wait(
        &self,
        fence: &HoistFenceDx12,
        value: u64,
    ) -> HoistResult<()> {
        unsafe {
            self.inner.queue.Wait(fence.dx12_fence(), value)?;
        }
        Ok(())
    }
}
