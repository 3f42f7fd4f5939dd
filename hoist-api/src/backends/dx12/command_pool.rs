use super::d3d12;
use crate::dx12::{HoistCommandBufferDx12, HoistQueueDx12};
use crate::{HoistCommandBufferDef, HoistCommandPoolDef, HoistResult};

/// Wraps an ID3D12CommandAllocator. Command lists created from the pool record into its memory
/// until the pool is reset.
pub struct HoistCommandPoolDx12 {
    queue: HoistQueueDx12,
    command_allocator: d3d12::ID3D12CommandAllocator,
    transient: bool,
}

// ID3D12CommandAllocator is free-threaded, external synchronization is done by the caller
unsafe impl Send for HoistCommandPoolDx12 {}
unsafe impl Sync for HoistCommandPoolDx12 {}

impl HoistCommandPoolDx12 {
    pub fn queue(&self) -> &HoistQueueDx12 {
        &self.queue
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }

    pub(crate) fn command_allocator(&self) -> &d3d12::ID3D12CommandAllocator {
        &self.command_allocator
    }

    pub fn create_command_buffer(
        &self,
        command_buffer_def: &HoistCommandBufferDef,
    ) -> HoistResult<HoistCommandBufferDx12> {
        HoistCommandBufferDx12::new(self, command_buffer_def)
    }

    /// Reclaims the memory of every command list recorded from this pool. The lists must have
    /// finished executing.
    pub fn reset_command_pool(&self) -> HoistResult<()> {
        unsafe { self.command_allocator.Reset()? };
        Ok(())
    }

    pub(crate) fn new(
        queue: &HoistQueueDx12,
        command_pool_def: &HoistCommandPoolDef,
    ) -> HoistResult<Self> {
        let command_allocator: d3d12::ID3D12CommandAllocator = unsafe {
            queue
                .device_context()
                .d3d12_device()
                .CreateCommandAllocator(queue.command_list_type())?
        };

        Ok(HoistCommandPoolDx12 {
            queue: queue.clone(),
            command_allocator,
            transient: command_pool_def.transient,
        })
    }
}
