#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::{HoistBuffer, HoistTexture};

/// Information about the device, mostly alignment requirements for uploads
#[derive(Clone, Debug)]
pub struct HoistDeviceInfo {
    /// Required alignment for the start of a texture's data within a staging buffer
    pub upload_texture_alignment: u32,
    /// Required alignment for each row of a texture's data within a staging buffer
    pub upload_texture_row_alignment: u32,
}

/// Used to indicate which type of queue to use. The upload engine always owns exactly one of
/// each.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum HoistQueueType {
    /// Direct queues support all operations, including all resource state transitions
    Direct,

    /// Copy queues are limited to copying data between buffers and textures. Barriers recorded
    /// on them may only involve the COMMON and COPY_* states.
    Copy,
}

impl HoistQueueType {
    pub fn name(self) -> &'static str {
        match self {
            HoistQueueType::Direct => "Direct",
            HoistQueueType::Copy => "Copy",
        }
    }
}

bitflags::bitflags! {
    /// The current state of a resource. When an operation is performed that references a resource,
    /// it must be in the correct state. Resources are moved between state using barriers.
    ///
    /// Bit layout matches D3D12_RESOURCE_STATES for the states that exist here.
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct HoistResourceState: u32 {
        const UNDEFINED = 0;
        const VERTEX_AND_CONSTANT_BUFFER = 0x1;
        const INDEX_BUFFER = 0x2;
        const NON_PIXEL_SHADER_RESOURCE = 0x40;
        const PIXEL_SHADER_RESOURCE = 0x80;
        const SHADER_RESOURCE = 0x40 | 0x80;
        const INDIRECT_ARGUMENT = 0x200;
        const COPY_DST = 0x400;
        const COPY_SRC = 0x800;
        const GENERIC_READ = (((((0x1 | 0x2) | 0x40) | 0x80) | 0x200) | 0x800);
        /// Resources in this state may be used on a copy queue through implicit promotion
        const COMMON = 0x2000;
    }
}

impl Default for HoistResourceState {
    fn default() -> Self {
        HoistResourceState::UNDEFINED
    }
}

impl HoistResourceState {
    /// True if a barrier between these states may be recorded on a copy queue
    pub fn is_copy_queue_compatible(self) -> bool {
        (HoistResourceState::COPY_DST | HoistResourceState::COPY_SRC | HoistResourceState::COMMON)
            .contains(self)
    }
}

/// A 3d size for textures
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct HoistExtents3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl HoistExtents3D {
    /// Extents of the given mip level. Each dimension is halved per level and clamped to 1.
    pub fn mip_extents(
        &self,
        mip_level: u8,
    ) -> HoistExtents3D {
        HoistExtents3D {
            width: (self.width >> mip_level).max(1),
            height: (self.height >> mip_level).max(1),
            depth: (self.depth >> mip_level).max(1),
        }
    }
}

/// Indicates how the memory will be accessed and affects where in memory it needs to be allocated.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum HoistMemoryUsage {
    /// The memory is only accessed by the GPU
    GpuOnly,

    /// The memory is written by the CPU and read by the GPU
    CpuToGpu,
}

/// Uncompressed formats that may be uploaded through a staging buffer
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[allow(non_camel_case_types)]
pub enum HoistFormat {
    R8_UNORM,
    R8G8_UNORM,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    R16G16B16A16_SFLOAT,
    R32_SFLOAT,
    R32G32B32A32_SFLOAT,
}

impl HoistFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            HoistFormat::R8_UNORM => 1,
            HoistFormat::R8G8_UNORM => 2,
            HoistFormat::R8G8B8A8_UNORM
            | HoistFormat::R8G8B8A8_SRGB
            | HoistFormat::B8G8R8A8_UNORM
            | HoistFormat::R32_SFLOAT => 4,
            HoistFormat::R16G16B16A16_SFLOAT => 8,
            HoistFormat::R32G32B32A32_SFLOAT => 16,
        }
    }
}

impl Default for HoistFormat {
    fn default() -> Self {
        HoistFormat::R8G8B8A8_UNORM
    }
}

/// Stable identity of a buffer or texture. Every created resource gets a new id, clones of a
/// handle share it. Two handles to different resources never compare equal, even if they were
/// created with identical definitions.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct HoistResourceId(pub u64);

/// A memory barrier for buffers. This is used to transition buffers between resource states.
pub struct HoistBufferBarrier<'a> {
    pub buffer: &'a HoistBuffer,
    pub src_state: HoistResourceState,
    pub dst_state: HoistResourceState,
}

impl<'a> HoistBufferBarrier<'a> {
    pub fn state_transition(
        buffer: &'a HoistBuffer,
        src_state: HoistResourceState,
        dst_state: HoistResourceState,
    ) -> HoistBufferBarrier<'a> {
        HoistBufferBarrier {
            buffer,
            src_state,
            dst_state,
        }
    }
}

/// A memory barrier for textures. This is used to transition textures between resource states.
/// The barrier always covers all subresources.
pub struct HoistTextureBarrier<'a> {
    pub texture: &'a HoistTexture,
    pub src_state: HoistResourceState,
    pub dst_state: HoistResourceState,
}

impl<'a> HoistTextureBarrier<'a> {
    pub fn state_transition(
        texture: &'a HoistTexture,
        src_state: HoistResourceState,
        dst_state: HoistResourceState,
    ) -> HoistTextureBarrier<'a> {
        HoistTextureBarrier {
            texture,
            src_state,
            dst_state,
        }
    }
}

/// Parameters for copying a region of one buffer into another
#[derive(Default, Clone, Copy, Debug)]
pub struct HoistCmdCopyBufferToBufferParams {
    pub src_byte_offset: u64,
    pub dst_byte_offset: u64,
    pub size: u64,
}

/// Parameters for copying a buffer to a single texture subresource. The buffer data at
/// `buffer_offset` must be laid out as described by the device's copyable footprint for that
/// subresource.
#[derive(Default, Clone, Copy, Debug)]
pub struct HoistCmdCopyBufferToTextureParams {
    pub buffer_offset: u64,
    pub array_layer: u16,
    pub mip_level: u8,
}

/// Layout of one texture subresource inside a buffer, as required for a buffer to texture copy.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct HoistSubresourceFootprint {
    /// Offset of the subresource within the buffer
    pub offset: u64,
    /// Distance in bytes between rows in the buffer. Padded to the device's row alignment
    pub row_pitch: u64,
    /// Number of rows in a single depth slice
    pub num_rows: u32,
    pub depth: u32,
    /// Size of a row without padding. This is the pitch of tightly packed CPU data.
    pub row_size_in_bytes: u64,
    /// Total bytes the buffer must hold, measured from `offset`
    pub total_bytes: u64,
}

/// Linear index of a subresource, matching D3D12CalcSubresource. Mips of one array slice are
/// contiguous, array slices of one plane are contiguous.
pub fn subresource_index(
    mip_slice: u8,
    array_slice: u16,
    plane_slice: u32,
    mip_count: u32,
    array_length: u32,
) -> u32 {
    mip_slice as u32 + (array_slice as u32 * mip_count) + (plane_slice * mip_count * array_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subresource_index_linearization() {
        assert_eq!(subresource_index(0, 0, 0, 1, 1), 0);
        assert_eq!(subresource_index(1, 0, 0, 4, 1), 1);
        assert_eq!(subresource_index(2, 3, 0, 4, 6), 14);
        assert_eq!(subresource_index(0, 0, 1, 4, 6), 24);
    }

    #[test]
    fn generic_read_is_a_read_state() {
        assert!(HoistResourceState::GENERIC_READ.contains(HoistResourceState::SHADER_RESOURCE));
        assert!(HoistResourceState::GENERIC_READ.contains(HoistResourceState::COPY_SRC));
        assert!(!HoistResourceState::GENERIC_READ.contains(HoistResourceState::COPY_DST));
    }

    #[test]
    fn copy_queue_states() {
        assert!(HoistResourceState::COPY_DST.is_copy_queue_compatible());
        assert!(HoistResourceState::COMMON.is_copy_queue_compatible());
        assert!(!HoistResourceState::GENERIC_READ.is_copy_queue_compatible());
    }

    #[test]
    fn mip_extents_clamp_to_one() {
        let extents = HoistExtents3D {
            width: 8,
            height: 2,
            depth: 1,
        };
        assert_eq!(
            extents.mip_extents(2),
            HoistExtents3D {
                width: 2,
                height: 1,
                depth: 1
            }
        );
    }
}
