use super::memory::SimResource;
use super::{HoistDeviceContextSim, HoistSimResourceKind};
use crate::internal_shared::allocate_resource_id;
use crate::{HoistBufferDef, HoistMemoryUsage, HoistResourceId, HoistResourceState, HoistResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct HoistBufferSim {
    buffer_def: HoistBufferDef,
    resource: Arc<SimResource>,
}

impl std::fmt::Debug for HoistBufferSim {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HoistBufferSim")
            .field("resource_id", &self.resource.id())
            .field("buffer_def", &self.buffer_def)
            .finish()
    }
}

impl HoistBufferSim {
    pub fn buffer_def(&self) -> &HoistBufferDef {
        &self.buffer_def
    }

    pub fn resource_id(&self) -> HoistResourceId {
        self.resource.id()
    }

    /// The state the device last left the buffer in
    pub fn state(&self) -> HoistResourceState {
        self.resource.state()
    }

    /// Copies out the full contents of the buffer as the device sees them. Only meaningful after
    /// the work that writes the buffer has completed.
    pub fn read_back(&self) -> Vec<u8> {
        self.resource.read(0, self.resource.size())
    }

    pub fn write_mapped<R, F: FnOnce(&mut [u8]) -> R>(
        &self,
        f: F,
    ) -> HoistResult<R> {
        if self.buffer_def.memory_usage != HoistMemoryUsage::CpuToGpu {
            return Err(format!(
                "Buffer {:?} is not host visible and can't be mapped",
                self.resource.id()
            ))?;
        }

        Ok(self.resource.with_memory(f))
    }

    pub fn copy_to_host_visible_buffer<T: Copy>(
        &self,
        data: &[T],
    ) -> HoistResult<()> {
        self.copy_to_host_visible_buffer_with_offset(data, 0)
    }

    pub fn copy_to_host_visible_buffer_with_offset<T: Copy>(
        &self,
        data: &[T],
        buffer_byte_offset: u64,
    ) -> HoistResult<()> {
        let data_size_in_bytes = std::mem::size_of_val(data) as u64;
        if buffer_byte_offset + data_size_in_bytes > self.buffer_def.size {
            return Err(format!(
                "Writing {} bytes at offset {} overflows buffer of size {}",
                data_size_in_bytes, buffer_byte_offset, self.buffer_def.size
            ))?;
        }

        let src = unsafe {
            std::slice::from_raw_parts(data.as_ptr() as *const u8, data_size_in_bytes as usize)
        };

        self.write_mapped(|dst| {
            let begin = buffer_byte_offset as usize;
            dst[begin..begin + src.len()].copy_from_slice(src);
        })
    }

    pub(super) fn resource(&self) -> &Arc<SimResource> {
        &self.resource
    }

    pub(super) fn new(
        device_context: &HoistDeviceContextSim,
        buffer_def: &HoistBufferDef,
    ) -> HoistResult<Self> {
        buffer_def.verify()?;
        device_context.allocate_memory(buffer_def.size)?;

        let resource = SimResource::new(
            device_context,
            allocate_resource_id(),
            HoistSimResourceKind::Buffer(buffer_def.memory_usage),
            buffer_def.size,
            buffer_def.initial_state,
        );

        log::trace!(
            "Created sim buffer {:?} ({} bytes, {:?})",
            resource.id(),
            buffer_def.size,
            buffer_def.memory_usage
        );

        Ok(HoistBufferSim {
            buffer_def: buffer_def.clone(),
            resource: Arc::new(resource),
        })
    }
}
