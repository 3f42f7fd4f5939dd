#[cfg(feature = "hoist-dx12")]
use crate::dx12::HoistDeviceContextDx12;
use crate::sim::HoistDeviceContextSim;
use crate::{
    HoistBuffer, HoistBufferDef, HoistDeviceInfo, HoistFence, HoistQueue, HoistQueueType,
    HoistResult, HoistSubresourceFootprint, HoistTexture, HoistTextureDef,
};

/// A cloneable, thread-safe handle used to create graphics resources.
///
/// All device contexts, and other objects created from them, must be dropped before the
/// `HoistApi` object that created them is dropped or destroyed.
#[derive(Clone)]
pub enum HoistDeviceContext {
    Sim(HoistDeviceContextSim),
    #[cfg(feature = "hoist-dx12")]
    Dx12(HoistDeviceContextDx12),
}

impl HoistDeviceContext {
    pub fn device_info(&self) -> &HoistDeviceInfo {
        match self {
            HoistDeviceContext::Sim(inner) => inner.device_info(),
            #[cfg(feature = "hoist-dx12")]
            HoistDeviceContext::Dx12(inner) => inner.device_info(),
        }
    }

    pub fn create_queue(
        &self,
        queue_type: HoistQueueType,
    ) -> HoistResult<HoistQueue> {
        Ok(match self {
            HoistDeviceContext::Sim(inner) => HoistQueue::Sim(inner.create_queue(queue_type)?),
            #[cfg(feature = "hoist-dx12")]
            HoistDeviceContext::Dx12(inner) => HoistQueue::Dx12(inner.create_queue(queue_type)?),
        })
    }

    /// Creates a timeline fence with an initial value of 0
    pub fn create_fence(&self) -> HoistResult<HoistFence> {
        Ok(match self {
            HoistDeviceContext::Sim(inner) => HoistFence::Sim(inner.create_fence()?),
            #[cfg(feature = "hoist-dx12")]
            HoistDeviceContext::Dx12(inner) => HoistFence::Dx12(inner.create_fence()?),
        })
    }

    pub fn create_buffer(
        &self,
        buffer_def: &HoistBufferDef,
    ) -> HoistResult<HoistBuffer> {
        Ok(match self {
            HoistDeviceContext::Sim(inner) => HoistBuffer::Sim(inner.create_buffer(buffer_def)?),
            #[cfg(feature = "hoist-dx12")]
            HoistDeviceContext::Dx12(inner) => {
                HoistBuffer::Dx12(inner.create_buffer(buffer_def)?)
            }
        })
    }

    pub fn create_texture(
        &self,
        texture_def: &HoistTextureDef,
    ) -> HoistResult<HoistTexture> {
        Ok(match self {
            HoistDeviceContext::Sim(inner) => {
                HoistTexture::Sim(inner.create_texture(texture_def)?)
            }
            #[cfg(feature = "hoist-dx12")]
            HoistDeviceContext::Dx12(inner) => {
                HoistTexture::Dx12(inner.create_texture(texture_def)?)
            }
        })
    }

    /// Where and how a subresource must be laid out in a buffer for a buffer to texture copy.
    /// `base_offset` is rounded up to the device's placement alignment.
    pub fn copyable_footprint(
        &self,
        texture_def: &HoistTextureDef,
        mip_level: u8,
        base_offset: u64,
    ) -> HoistSubresourceFootprint {
        match self {
            HoistDeviceContext::Sim(inner) => {
                inner.copyable_footprint(texture_def, mip_level, base_offset)
            }
            #[cfg(feature = "hoist-dx12")]
            HoistDeviceContext::Dx12(inner) => {
                inner.copyable_footprint(texture_def, mip_level, base_offset)
            }
        }
    }

    pub fn is_sim(&self) -> bool {
        self.sim_device_context().is_some()
    }

    pub fn sim_device_context(&self) -> Option<&HoistDeviceContextSim> {
        match self {
            HoistDeviceContext::Sim(inner) => Some(inner),
            #[cfg(feature = "hoist-dx12")]
            HoistDeviceContext::Dx12(_) => None,
        }
    }

    #[cfg(feature = "hoist-dx12")]
    pub fn dx12_device_context(&self) -> Option<&HoistDeviceContextDx12> {
        match self {
            HoistDeviceContext::Sim(_) => None,
            HoistDeviceContext::Dx12(inner) => Some(inner),
        }
    }
}
