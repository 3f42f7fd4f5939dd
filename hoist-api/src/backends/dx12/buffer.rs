use crate::dx12::HoistDeviceContextDx12;
use crate::internal_shared::allocate_resource_id;
use crate::{HoistBufferDef, HoistMemoryUsage, HoistResourceId, HoistResourceState, HoistResult};
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

use super::d3d12;

struct HoistBufferDx12Inner {
    device_context: HoistDeviceContextDx12,
    resource: ManuallyDrop<d3d12::ID3D12Resource>,
    allocation: Option<gpu_allocator::d3d12::Allocation>,
    resource_id: HoistResourceId,
    buffer_def: HoistBufferDef,
    // Serializes Map/Unmap pairs
    map_lock: Mutex<()>,
}

unsafe impl Send for HoistBufferDx12Inner {}
unsafe impl Sync for HoistBufferDx12Inner {}

impl Drop for HoistBufferDx12Inner {
    fn drop(&mut self) {
        log::trace!(
            "Buffer {:?} destroying with size {}",
            self.resource_id,
            self.buffer_def.size
        );

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
                log::error!("Failed to free buffer {:?}: {}", self.resource_id, e);
            }
        }
    }
}

#[derive(Clone)]
pub struct HoistBufferDx12 {
    inner: Arc<HoistBufferDx12Inner>,
}

impl std::fmt::Debug for HoistBufferDx12 {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HoistBufferDx12")
            .field("resource_id", &self.inner.resource_id)
            .field("buffer_def", &self.inner.buffer_def)
            .finish()
    }
}

impl HoistBufferDx12 {
    pub fn dx12_resource(&self) -> &d3d12::ID3D12Resource {
        &self.inner.resource
    }

    pub fn buffer_def(&self) -> &HoistBufferDef {
        &self.inner.buffer_def
    }

    pub fn resource_id(&self) -> HoistResourceId {
        self.inner.resource_id
    }

    pub fn write_mapped<R, F: FnOnce(&mut [u8]) -> R>(
        &self,
        f: F,
    ) -> HoistResult<R> {
        if self.inner.buffer_def.memory_usage != HoistMemoryUsage::CpuToGpu {
            return Err("Cannot map GPU-only buffer")?;
        }

        let _guard = self.inner.map_lock.lock().unwrap();
        let mut mapped_ptr = std::ptr::null_mut::<std::ffi::c_void>();
        unsafe {
            self.inner.resource.Map(0, None, Some(&mut mapped_ptr))?;
        }

        let result = {
            let mapped = unsafe {
                std::slice::from_raw_parts_mut(
                    mapped_ptr as *mut u8,
                    self.inner.buffer_def.size as usize,
                )
            };
            f(mapped)
        };

        unsafe {
            self.inner.resource.Unmap(0, None);
        }

        Ok(result)
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
        if buffer_byte_offset + data_size_in_bytes > self.inner.buffer_def.size {
            return Err(format!(
                "Writing {} bytes at offset {} overflows buffer of size {}",
                data_size_in_bytes, buffer_byte_offset, self.inner.buffer_def.size
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

    pub fn new(
        device_context: &HoistDeviceContextDx12,
        buffer_def: &HoistBufferDef,
    ) -> HoistResult<Self> {
        buffer_def.verify()?;

        let desc = d3d12::D3D12_RESOURCE_DESC {
            Dimension: d3d12::D3D12_RESOURCE_DIMENSION_BUFFER,
            Alignment: d3d12::D3D12_DEFAULT_RESOURCE_PLACEMENT_ALIGNMENT as u64,
            Width: buffer_def.size,
            Height: 1,
            DepthOrArraySize: 1,
            MipLevels: 1,
            Format: super::dxgi::Common::DXGI_FORMAT_UNKNOWN,
            SampleDesc: super::dxgi::Common::DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Layout: d3d12::D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
            Flags: d3d12::D3D12_RESOURCE_FLAG_NONE,
        };

        // Upload heap resources must be created and stay in GENERIC_READ
        let initial_state = match buffer_def.memory_usage {
            HoistMemoryUsage::CpuToGpu => HoistResourceState::GENERIC_READ,
            HoistMemoryUsage::GpuOnly => buffer_def.initial_state,
        };

        let allocation = device_context.allocator().lock().unwrap().allocate(
            &gpu_allocator::d3d12::AllocationCreateDesc {
                name: "hoist buffer",
                location: buffer_def.memory_usage.into(),
                size: buffer_def.size,
                alignment: d3d12::D3D12_DEFAULT_RESOURCE_PLACEMENT_ALIGNMENT as u64,
                resource_category: gpu_allocator::d3d12::ResourceCategory::Buffer,
            },
        )?;

        let mut resource: Option<d3d12::ID3D12Resource> = None;
        let create_result = unsafe {
            device_context.d3d12_device().CreatePlacedResource(
                allocation.heap(),
                allocation.offset(),
                &desc,
                initial_state.into(),
                None,
                &mut resource,
            )
        };

        let resource = match create_result.map_err(Into::into).and_then(|_| {
            resource.ok_or_else(|| crate::HoistError::from("CreatePlacedResource returned no buffer"))
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
            "Buffer {:?} created with size {} ({:?})",
            resource_id,
            buffer_def.size,
            buffer_def.memory_usage
        );

        let inner = HoistBufferDx12Inner {
            device_context: device_context.clone(),
            resource: ManuallyDrop::new(resource),
            allocation: Some(allocation),
            resource_id,
            buffer_def: buffer_def.clone(),
            map_lock: Mutex::new(()),
        };

        Ok(HoistBufferDx12 {
            inner: Arc::new(inner),
        })
    }
}
