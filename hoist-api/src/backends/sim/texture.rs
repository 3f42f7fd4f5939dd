use super::memory::SimResource;
use super::{HoistDeviceContextSim, HoistSimResourceKind};
use crate::internal_shared::allocate_resource_id;
use crate::{
    subresource_index, HoistResourceId, HoistResourceState, HoistResult, HoistTextureDef,
};
use std::sync::Arc;

/// Where a subresource lives in the sim texture's storage. Rows are tightly packed.
#[derive(Clone, Copy, Debug)]
pub(super) struct SimSubresourceLayout {
    pub(super) offset: u64,
    pub(super) row_size: u64,
    /// Rows across all depth slices
    pub(super) row_count: u64,
}

impl SimSubresourceLayout {
    pub(super) fn size(&self) -> u64 {
        self.row_size * self.row_count
    }
}

#[derive(Clone)]
pub struct HoistTextureSim {
    texture_def: HoistTextureDef,
    resource: Arc<SimResource>,
    subresources: Arc<Vec<SimSubresourceLayout>>,
}

impl std::fmt::Debug for HoistTextureSim {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HoistTextureSim")
            .field("resource_id", &self.resource.id())
            .field("texture_def", &self.texture_def)
            .finish()
    }
}

impl HoistTextureSim {
    pub fn texture_def(&self) -> &HoistTextureDef {
        &self.texture_def
    }

    pub fn resource_id(&self) -> HoistResourceId {
        self.resource.id()
    }

    pub fn state(&self) -> HoistResourceState {
        self.resource.state()
    }

    /// Contents of one subresource with tightly packed rows
    pub fn read_subresource(
        &self,
        mip_level: u8,
        array_layer: u16,
    ) -> HoistResult<Vec<u8>> {
        let layout = self.subresource_layout(mip_level, array_layer)?;
        Ok(self.resource.read(layout.offset, layout.size()))
    }

    pub(super) fn resource(&self) -> &Arc<SimResource> {
        &self.resource
    }

    pub(super) fn subresource_layout(
        &self,
        mip_level: u8,
        array_layer: u16,
    ) -> HoistResult<SimSubresourceLayout> {
        if mip_level as u32 >= self.texture_def.mip_count
            || array_layer as u32 >= self.texture_def.array_length
        {
            return Err(format!(
                "Subresource mip {} layer {} is out of range for texture {:?} with {} mips and {} layers",
                mip_level,
                array_layer,
                self.resource.id(),
                self.texture_def.mip_count,
                self.texture_def.array_length
            ))?;
        }

        let index = subresource_index(
            mip_level,
            array_layer,
            0,
            self.texture_def.mip_count,
            self.texture_def.array_length,
        );
        Ok(self.subresources[index as usize])
    }

    pub(super) fn new(
        device_context: &HoistDeviceContextSim,
        texture_def: &HoistTextureDef,
    ) -> HoistResult<Self> {
        texture_def.verify()?;

        // Subresource index order: all mips of layer 0, then all mips of layer 1, ...
        let mut subresources = Vec::with_capacity(texture_def.subresource_count() as usize);
        let mut total_size = 0;
        for _ in 0..texture_def.array_length {
            for mip_level in 0..texture_def.mip_count {
                let extents = texture_def.extents.mip_extents(mip_level as u8);
                let layout = SimSubresourceLayout {
                    offset: total_size,
                    row_size: extents.width as u64 * texture_def.format.bytes_per_pixel() as u64,
                    row_count: extents.height as u64 * extents.depth as u64,
                };
                total_size += layout.size();
                subresources.push(layout);
            }
        }

        device_context.allocate_memory(total_size)?;

        let resource = SimResource::new(
            device_context,
            allocate_resource_id(),
            HoistSimResourceKind::Texture,
            total_size,
            texture_def.initial_state,
        );

        log::trace!(
            "Created sim texture {:?} ({:?}, {} mips, {} layers)",
            resource.id(),
            texture_def.extents,
            texture_def.mip_count,
            texture_def.array_length
        );

        Ok(HoistTextureSim {
            texture_def: texture_def.clone(),
            resource: Arc::new(resource),
            subresources: Arc::new(subresources),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::HoistApiDefSim;
    use crate::{HoistExtents3D, HoistFormat};

    #[test]
    fn texture_storage_layout() {
        let device_context = HoistDeviceContextSim::new(HoistApiDefSim::default());
        let texture = device_context
            .create_texture(&HoistTextureDef {
                extents: HoistExtents3D {
                    width: 4,
                    height: 4,
                    depth: 1,
                },
                mip_count: 3,
                array_length: 2,
                format: HoistFormat::R8_UNORM,
                ..Default::default()
            })
            .unwrap();

        // (16 + 4 + 1) bytes per layer
        assert_eq!(device_context.allocated_bytes(), 42);
        assert_eq!(texture.subresource_layout(0, 1).unwrap().offset, 21);
        assert_eq!(texture.read_subresource(1, 1).unwrap().len(), 4);
        assert!(texture.read_subresource(3, 0).is_err());
        assert!(texture.read_subresource(0, 2).is_err());
    }

    #[test]
    fn invalid_texture_def_is_rejected() {
        let device_context = HoistDeviceContextSim::new(HoistApiDefSim::default());
        let result = device_context.create_texture(&HoistTextureDef {
            extents: HoistExtents3D {
                width: 4,
                height: 4,
                depth: 1,
            },
            mip_count: 4,
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(device_context.live_resource_count(), 0);
    }
}
