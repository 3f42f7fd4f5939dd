use crate::dx12::HoistDeviceContextDx12;
use crate::internal_shared::allocate_resource_id;
use crate::{HoistError, HoistResourceId, HoistResult, HoistTextureDef};
use std::mem::ManuallyDrop;
use std::sync::Arc;

use super::d3d12;

struct HoistTextureDx12Inner {
    device_context: HoistDeviceContextDx12,
    resource: ManuallyDrop<d3d12::ID3D12Resource>,
    allocation: Option<gpu_allocator::d3d12::Allocation>,
    resource_id: HoistResourceId,
    texture_def: HoistTextureDef,
}

unsafe impl Send for HoistTextureDx12Inner {}
unsafe impl Sync for HoistTextureDx12Inner {}

impl Drop for HoistTextureDx12Inner {
    fn drop(&mut self) {
        log::trace!("Texture {:?} destroying", self.resource_id);
        // The resource must be released before its memory is returned to the allocator
        unsafe { ManuallyDrop::drop(&mut self.resource) };

        if let Some(allocation) = self.allocation.take() {
            let result = self
                .device_context
                .allocator()
                .lock()
                .map_err(|_| "allocator lock poisoned".to_string())
                .and_then(|mut allocator| allocator.free(allocation).map_err(|e| e.to_string()));
            if let Err(e) = result {
                log::error!("Failed to free texture {:?}: {}", self.resource_id, e);
            }
        }
    }
}

#[derive(Clone)]
pub struct HoistTextureDx12 {
    inner: Arc<HoistTextureDx12Inner>,
}

impl std::fmt::Debug for HoistTextureDx12 {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HoistTextureDx12")
            .field("resource_id", &self.inner.resource_id)
            .field("texture_def", &self.inner.texture_def)
            .finish()
    }
}

impl HoistTextureDx12 {
    pub fn dx12_resource(&self) -> &d3d12::ID3D12Resource {
        &self.inner.resource
    }

    pub fn texture_def(&self) -> &HoistTextureDef {
        &self.inner.texture_def
    }

    pub fn resource_id(&self) -> HoistResourceId {
        self.inner.resource_id
    }

    pub fn new(
        device_context: &HoistDeviceContextDx12,
        texture_def: &HoistTextureDef,
    ) -> HoistResult<Self> {
        texture_def.verify()?;

        let desc = super::internal::texture_resource_desc(texture_def);
        let allocation_info = unsafe {
            device_context
                .d3d12_device()
                .GetResourceAllocationInfo(0, &[desc])
        };

        let allocation = device_context.allocator().lock().unwrap().allocate(
            &gpu_allocator::d3d12::AllocationCreateDesc {
                name: "hoist texture",
                location: gpu_allocator::MemoryLocation::GpuOnly,
                size: allocation_info.SizeInBytes,
                alignment: allocation_info.Alignment,
                resource_category: gpu_allocator::d3d12::ResourceCategory::OtherTexture,
            },
        )?;

        let mut resource: Option<d3d12::ID3D12Resource> = None;
        let create_result = unsafe {
            device_context.d3d12_device().CreatePlacedResource(
                allocation.heap(),
                allocation.offset(),
                &desc,
                texture_def.initial_state.into(),
                None,
                &mut resource,
            )
        };

        let resource = match create_result.map_err(Into::into).and_then(|_| {
            resource.ok_or_else(|| HoistError::from("CreatePlacedResource returned no texture"))
        }) {
            Ok(resource) => resource,
            Err(e) => {
                if let Err(free_error) = device_context.allocator().lock().unwrap().free(allocation) {
                    log::error!("Failed to free allocation: {}", free_error);
                }
                return Err(e);
            }
        };

        let resource_id = allocate_resource_id();
        log::trace!(
            "Texture {:?} created {:?} with {} mips and {} layers",
            resource_id,
            texture_def.extents,
            texture_def.mip_count,
            texture_def.array_length
        );

        let inner = HoistTextureDx12Inner {
            device_context: device_context.clone(),
            resource: ManuallyDrop::new(resource),
            allocation: Some(allocation),
            resource_id,
            texture_def: texture_def.clone(),
        };

        Ok(HoistTextureDx12 {
            inner: Arc::new(inner),
        })
    }
}
