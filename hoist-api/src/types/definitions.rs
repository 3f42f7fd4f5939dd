#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::{
    HoistExtents3D, HoistFormat, HoistMemoryUsage, HoistQueueType, HoistResourceState,
    HoistResult,
};

/// Used to create a `HoistBuffer`
#[derive(Clone, Debug)]
pub struct HoistBufferDef {
    pub size: u64,
    pub memory_usage: HoistMemoryUsage,
    /// The queue the buffer is first used on
    pub queue_type: HoistQueueType,
    pub initial_state: HoistResourceState,
}

impl Default for HoistBufferDef {
    fn default() -> Self {
        HoistBufferDef {
            size: 0,
            memory_usage: HoistMemoryUsage::GpuOnly,
            queue_type: HoistQueueType::Copy,
            initial_state: HoistResourceState::COPY_DST,
        }
    }
}

impl HoistBufferDef {
    /// A CPU-writable buffer that is read by copy commands
    pub fn for_staging_buffer(size: u64) -> HoistBufferDef {
        HoistBufferDef {
            size,
            memory_usage: HoistMemoryUsage::CpuToGpu,
            queue_type: HoistQueueType::Copy,
            initial_state: HoistResourceState::GENERIC_READ,
        }
    }

    /// A GPU-only buffer that will receive uploaded data
    pub fn for_upload_destination(size: u64) -> HoistBufferDef {
        HoistBufferDef {
            size,
            ..Default::default()
        }
    }

    pub fn verify(&self) -> HoistResult<()> {
        if self.size == 0 {
            return Err("Buffer size must be greater than zero")?;
        }

        Ok(())
    }
}

/// Largest supported texture array, the D3D12 limit for 2D texture arrays
pub const MAX_TEXTURE_ARRAY_LENGTH: u32 = 2048;

/// Used to create a `HoistTexture`
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct HoistTextureDef {
    pub extents: HoistExtents3D,
    pub array_length: u32,
    pub mip_count: u32,
    pub format: HoistFormat,
    pub initial_state: HoistResourceState,
}

impl Default for HoistTextureDef {
    fn default() -> Self {
        HoistTextureDef {
            extents: HoistExtents3D {
                width: 0,
                height: 0,
                depth: 1,
            },
            array_length: 1,
            mip_count: 1,
            format: HoistFormat::R8G8B8A8_UNORM,
            initial_state: HoistResourceState::COPY_DST,
        }
    }
}

impl HoistTextureDef {
    /// Number of mips needed to go from the full size down to 1x1
    pub fn full_mip_count(extents: HoistExtents3D) -> u32 {
        let max_dimension = extents.width.max(extents.height).max(extents.depth).max(1);
        32 - max_dimension.leading_zeros()
    }

    pub fn subresource_count(&self) -> u32 {
        self.mip_count * self.array_length
    }

    pub fn verify(&self) -> HoistResult<()> {
        if self.extents.width == 0 || self.extents.height == 0 || self.extents.depth == 0 {
            return Err(format!(
                "Texture extents must be non-zero, got {:?}",
                self.extents
            ))?;
        }

        if self.extents.depth != 1 {
            return Err("Only 2D textures (depth of 1) are supported")?;
        }

        if self.array_length == 0 || self.array_length > MAX_TEXTURE_ARRAY_LENGTH {
            return Err(format!(
                "Texture array_length must be between 1 and {}, got {}",
                MAX_TEXTURE_ARRAY_LENGTH, self.array_length
            ))?;
        }

        let max_mip_count = Self::full_mip_count(self.extents);
        if self.mip_count == 0 || self.mip_count > max_mip_count {
            return Err(format!(
                "Texture mip_count must be between 1 and {}, got {}",
                max_mip_count, self.mip_count
            ))?;
        }

        Ok(())
    }
}

/// Used to create a `HoistCommandPool`
#[derive(Default, Clone, Debug)]
pub struct HoistCommandPoolDef {
    /// Set to true if the command buffers allocated from the pool are expected to have very short
    /// lifetimes
    pub transient: bool,
}

/// Used to create a `HoistCommandBuffer`
#[derive(Default, Clone, Debug)]
pub struct HoistCommandBufferDef {
    /// Leave the command buffer open for recording after creation, the way D3D12 command lists are
    /// created
    pub begin_immediately: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mip_count() {
        let extents = |width, height| HoistExtents3D {
            width,
            height,
            depth: 1,
        };
        assert_eq!(HoistTextureDef::full_mip_count(extents(1, 1)), 1);
        assert_eq!(HoistTextureDef::full_mip_count(extents(2, 1)), 2);
        assert_eq!(HoistTextureDef::full_mip_count(extents(256, 256)), 9);
        assert_eq!(HoistTextureDef::full_mip_count(extents(300, 20)), 9);
    }

    #[test]
    fn texture_def_verify() {
        let mut def = HoistTextureDef {
            extents: HoistExtents3D {
                width: 16,
                height: 16,
                depth: 1,
            },
            mip_count: 5,
            ..Default::default()
        };
        assert!(def.verify().is_ok());

        def.mip_count = 6;
        assert!(def.verify().is_err());

        def.mip_count = 1;
        def.array_length = 0;
        assert!(def.verify().is_err());

        def.array_length = MAX_TEXTURE_ARRAY_LENGTH;
        assert!(def.verify().is_ok());

        // Would wrap around to 0 in a 16 bit array size
        def.array_length = u16::MAX as u32 + 1;
        assert!(def.verify().is_err());
    }

    #[test]
    fn zero_sized_buffer_is_rejected() {
        assert!(HoistBufferDef::for_staging_buffer(0).verify().is_err());
        assert!(HoistBufferDef::for_staging_buffer(1).verify().is_ok());
    }
}
