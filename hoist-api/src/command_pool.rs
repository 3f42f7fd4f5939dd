#[cfg(feature = "hoist-dx12")]
use crate::dx12::HoistCommandPoolDx12;
use crate::sim::HoistCommandPoolSim;
use crate::{HoistCommandBuffer, HoistCommandBufferDef, HoistResult};

/// A pool of memory that command buffers record into, the equivalent of a D3D12 command
/// allocator.
///
/// Resetting the pool invalidates everything recorded by its command buffers, so it must only be
/// done once the GPU has finished executing them.
pub enum HoistCommandPool {
    Sim(HoistCommandPoolSim),
    #[cfg(feature = "hoist-dx12")]
    Dx12(HoistCommandPoolDx12),
}

impl HoistCommandPool {
    pub fn create_command_buffer(
        &self,
        command_buffer_def: &HoistCommandBufferDef,
    ) -> HoistResult<HoistCommandBuffer> {
        Ok(match self {
            HoistCommandPool::Sim(inner) => {
                HoistCommandBuffer::Sim(inner.create_command_buffer(command_buffer_def)?)
            }
            #[cfg(feature = "hoist-dx12")]
            HoistCommandPool::Dx12(inner) => {
                HoistCommandBuffer::Dx12(inner.create_command_buffer(command_buffer_def)?)
            }
        })
    }

    pub fn reset_command_pool(&self) -> HoistResult<()> {
        match self {
            HoistCommandPool::Sim(inner) => inner.reset_command_pool(),
            #[cfg(feature = "hoist-dx12")]
            HoistCommandPool::Dx12(inner) => inner.reset_command_pool(),
        }
    }

    pub fn sim_command_pool(&self) -> Option<&HoistCommandPoolSim> {
        match self {
            HoistCommandPool::Sim(inner) => Some(inner),
            #[cfg(feature = "hoist-dx12")]
            HoistCommandPool::Dx12(_) => None,
        }
    }

    #[cfg(feature = "hoist-dx12")]
    pub fn dx12_command_pool(&self) -> Option<&HoistCommandPoolDx12> {
        match self {
            HoistCommandPool::Sim(_) => None,
            HoistCommandPool::Dx12(inner) => Some(inner),
        }
    }
}
