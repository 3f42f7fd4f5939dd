#[cfg(feature = "hoist-dx12")]
use crate::dx12::HoistBufferDx12;
use crate::sim::HoistBufferSim;
use crate::{HoistBufferDef, HoistResourceId, HoistResult};

/// A buffer is a piece of memory that can be accessed by the GPU. It may reside in CPU or GPU
/// memory depending on how it is created.
///
/// Cloning a buffer produces another handle to the same resource. The resource is released when
/// the last handle is dropped, which must not happen while the GPU is still using it.
#[derive(Debug, Clone)]
pub enum HoistBuffer {
    Sim(HoistBufferSim),
    #[cfg(feature = "hoist-dx12")]
    Dx12(HoistBufferDx12),
}

impl HoistBuffer {
    pub fn buffer_def(&self) -> &HoistBufferDef {
        match self {
            HoistBuffer::Sim(inner) => inner.buffer_def(),
            #[cfg(feature = "hoist-dx12")]
            HoistBuffer::Dx12(inner) => inner.buffer_def(),
        }
    }

    pub fn resource_id(&self) -> HoistResourceId {
        match self {
            HoistBuffer::Sim(inner) => inner.resource_id(),
            #[cfg(feature = "hoist-dx12")]
            HoistBuffer::Dx12(inner) => inner.resource_id(),
        }
    }

    /// Maps the buffer for the duration of the callback. Only valid for host-visible buffers.
    pub fn write_mapped<R, F: FnOnce(&mut [u8]) -> R>(
        &self,
        f: F,
    ) -> HoistResult<R> {
        match self {
            HoistBuffer::Sim(inner) => inner.write_mapped(f),
            #[cfg(feature = "hoist-dx12")]
            HoistBuffer::Dx12(inner) => inner.write_mapped(f),
        }
    }

    pub fn copy_to_host_visible_buffer<T: Copy>(
        &self,
        data: &[T],
    ) -> HoistResult<()> {
        match self {
            HoistBuffer::Sim(inner) => inner.copy_to_host_visible_buffer(data),
            #[cfg(feature = "hoist-dx12")]
            HoistBuffer::Dx12(inner) => inner.copy_to_host_visible_buffer(data),
        }
    }

    pub fn copy_to_host_visible_buffer_with_offset<T: Copy>(
        &self,
        data: &[T],
        buffer_byte_offset: u64,
    ) -> HoistResult<()> {
        match self {
            HoistBuffer::Sim(inner) => {
                inner.copy_to_host_visible_buffer_with_offset(data, buffer_byte_offset)
            }
            #[cfg(feature = "hoist-dx12")]
            HoistBuffer::Dx12(inner) => {
                inner.copy_to_host_visible_buffer_with_offset(data, buffer_byte_offset)
            }
        }
    }

    pub fn sim_buffer(&self) -> Option<&HoistBufferSim> {
        match self {
            HoistBuffer::Sim(inner) => Some(inner),
            #[cfg(feature = "hoist-dx12")]
            HoistBuffer::Dx12(_) => None,
        }
    }

    #[cfg(feature = "hoist-dx12")]
    pub fn dx12_buffer(&self) -> Option<&HoistBufferDx12> {
        match self {
            HoistBuffer::Sim(_) => None,
            HoistBuffer::Dx12(inner) => Some(inner),
        }
    }
}
