#[cfg(feature = "hoist-dx12")]
use crate::dx12::HoistCommandBufferDx12;
use crate::sim::HoistCommandBufferSim;
use crate::{
    HoistBuffer, HoistBufferBarrier, HoistCmdCopyBufferToBufferParams,
    HoistCmdCopyBufferToTextureParams, HoistResult, HoistTexture, HoistTextureBarrier,
};

const MIXED_BACKENDS: &str = "Command buffer and resources belong to different backends";

/// A list of commands recorded by the CPU and submitted to a queue. Recording happens between
/// `begin()` and `end()`.
///
/// Command buffers are allocated from a command pool and may only be submitted to the queue that
/// created that pool.
pub enum HoistCommandBuffer {
    Sim(HoistCommandBufferSim),
    #[cfg(feature = "hoist-dx12")]
    Dx12(HoistCommandBufferDx12),
}

impl HoistCommandBuffer {
    pub fn begin(&self) -> HoistResult<()> {
        match self {
            HoistCommandBuffer::Sim(inner) => inner.begin(),
            #[cfg(feature = "hoist-dx12")]
            HoistCommandBuffer::Dx12(inner) => inner.begin(),
        }
    }

    pub fn end(&self) -> HoistResult<()> {
        match self {
            HoistCommandBuffer::Sim(inner) => inner.end(),
            #[cfg(feature = "hoist-dx12")]
            HoistCommandBuffer::Dx12(inner) => inner.end(),
        }
    }

    pub fn is_recording(&self) -> bool {
        match self {
            HoistCommandBuffer::Sim(inner) => inner.is_recording(),
            #[cfg(feature = "hoist-dx12")]
            HoistCommandBuffer::Dx12(inner) => inner.is_recording(),
        }
    }

    /// Records state transitions. All barriers are issued as a single batch. Barriers recorded
    /// on a copy queue may only use the COMMON and COPY_* states.
    pub fn cmd_resource_barrier(
        &self,
        buffer_barriers: &[HoistBufferBarrier],
        texture_barriers: &[HoistTextureBarrier],
    ) -> HoistResult<()> {
        match self {
            HoistCommandBuffer::Sim(inner) => {
                inner.cmd_resource_barrier(buffer_barriers, texture_barriers)
            }
            #[cfg(feature = "hoist-dx12")]
            HoistCommandBuffer::Dx12(inner) => {
                inner.cmd_resource_barrier(buffer_barriers, texture_barriers)
            }
        }
    }

    pub fn cmd_copy_buffer_to_buffer(
        &self,
        src_buffer: &HoistBuffer,
        dst_buffer: &HoistBuffer,
        params: &HoistCmdCopyBufferToBufferParams,
    ) -> HoistResult<()> {
        match self {
            HoistCommandBuffer::Sim(inner) => inner.cmd_copy_buffer_to_buffer(
                src_buffer.sim_buffer().ok_or(MIXED_BACKENDS)?,
                dst_buffer.sim_buffer().ok_or(MIXED_BACKENDS)?,
                params,
            ),
            #[cfg(feature = "hoist-dx12")]
            HoistCommandBuffer::Dx12(inner) => inner.cmd_copy_buffer_to_buffer(
                src_buffer.dx12_buffer().ok_or(MIXED_BACKENDS)?,
                dst_buffer.dx12_buffer().ok_or(MIXED_BACKENDS)?,
                params,
            ),
        }
    }

    /// Copies one subresource. The source data must follow the device's copyable footprint for
    /// that subresource.
    pub fn cmd_copy_buffer_to_texture(
        &self,
        src_buffer: &HoistBuffer,
        dst_texture: &HoistTexture,
        params: &HoistCmdCopyBufferToTextureParams,
    ) -> HoistResult<()> {
        match self {
            HoistCommandBuffer::Sim(inner) => inner.cmd_copy_buffer_to_texture(
                src_buffer.sim_buffer().ok_or(MIXED_BACKENDS)?,
                dst_texture.sim_texture().ok_or(MIXED_BACKENDS)?,
                params,
            ),
            #[cfg(feature = "hoist-dx12")]
            HoistCommandBuffer::Dx12(inner) => inner.cmd_copy_buffer_to_texture(
                src_buffer.dx12_buffer().ok_or(MIXED_BACKENDS)?,
                dst_texture.dx12_texture().ok_or(MIXED_BACKENDS)?,
                params,
            ),
        }
    }

    pub fn sim_command_buffer(&self) -> Option<&HoistCommandBufferSim> {
        match self {
            HoistCommandBuffer::Sim(inner) => Some(inner),
            #[cfg(feature = "hoist-dx12")]
            HoistCommandBuffer::Dx12(_) => None,
        }
    }

    #[cfg(feature = "hoist-dx12")]
    pub fn dx12_command_buffer(&self) -> Option<&HoistCommandBufferDx12> {
        match self {
            HoistCommandBuffer::Sim(_) => None,
            HoistCommandBuffer::Dx12(inner) => Some(inner),
        }
    }
}
