use crate::dx12::{
    HoistApiDefDx12, HoistBufferDx12, HoistFenceDx12, HoistQueueDx12, HoistTextureDx12,
};
use crate::internal_shared::align_up;
use crate::{
    subresource_index, HoistBufferDef, HoistDeviceInfo, HoistError, HoistQueueType, HoistResult,
    HoistSubresourceFootprint, HoistTextureDef,
};
use std::mem::ManuallyDrop;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use windows::core::Interface;

use super::d3d;
use super::d3d12;
use super::dxgi;

fn wchar_to_string(s: &[u16]) -> String {
    let end = s.iter().position(|&v| v == 0).unwrap_or(s.len());
    String::from_utf16_lossy(&s[..end])
}

fn get_hardware_adapter(factory: &dxgi::IDXGIFactory4) -> HoistResult<dxgi::IDXGIAdapter1> {
    for i in 0.. {
        // Returns DXGI_ERROR_NOT_FOUND once we run out of adapters
        let adapter = unsafe { factory.EnumAdapters1(i)? };
        let desc = unsafe { adapter.GetDesc1()? };

        log::info!("Found device {:?}", wchar_to_string(&desc.Description));
        log::info!(
            "  Vendor Id:{} Device Id: {} Dedicated VMem: {}",
            desc.VendorId,
            desc.DeviceId,
            desc.DedicatedVideoMemory
        );

        if (desc.Flags & dxgi::DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32) != 0 {
            // Skip the Basic Render Driver. Set use_warp_device to use a software adapter.
            continue;
        }

        // Check the adapter supports Direct3D 12 without creating the device yet
        if unsafe {
            d3d12::D3D12CreateDevice(
                &adapter,
                d3d::D3D_FEATURE_LEVEL_12_0,
                std::ptr::null_mut::<Option<d3d12::ID3D12Device>>(),
            )
        }
        .is_ok()
        {
            return Ok(adapter);
        }
    }

    Err("No adapter supports Direct3D 12".into())
}

fn create_device(
    dx12_api_def: &HoistApiDefDx12
) -> HoistResult<(
    dxgi::IDXGIFactory4,
    dxgi::IDXGIAdapter1,
    d3d12::ID3D12Device,
)> {
    if dx12_api_def.enable_validation {
        unsafe {
            let mut debug: Option<d3d12::ID3D12Debug> = None;
            if let Some(debug) = d3d12::D3D12GetDebugInterface(&mut debug).ok().and(debug) {
                debug.EnableDebugLayer();
                if let Ok(debug1) = debug.cast::<d3d12::ID3D12Debug1>() {
                    debug1.SetEnableGPUBasedValidation(dx12_api_def.enable_gpu_based_validation);
                }
            } else {
                log::warn!("Could not acquire D3D12GetDebugInterface.");
            }
        }
    }

    let dxgi_factory_flags = if dx12_api_def.enable_validation {
        dxgi::DXGI_CREATE_FACTORY_DEBUG
    } else {
        dxgi::DXGI_CREATE_FACTORY_FLAGS(0)
    };

    let dxgi_factory: dxgi::IDXGIFactory4 = unsafe { dxgi::CreateDXGIFactory2(dxgi_factory_flags) }?;

    let dxgi_adapter = if dx12_api_def.use_warp_device {
        log::info!("Creating warp adapter");
        unsafe { dxgi_factory.EnumWarpAdapter::<dxgi::IDXGIAdapter1>() }.map_err(HoistError::from)
    } else {
        get_hardware_adapter(&dxgi_factory)
    }?;

    let mut device: Option<d3d12::ID3D12Device> = None;
    unsafe { d3d12::D3D12CreateDevice(&dxgi_adapter, d3d::D3D_FEATURE_LEVEL_12_0, &mut device) }?;

    let d3d12_device = device.ok_or("Could not create D3D device")?;

    Ok((dxgi_factory, dxgi_adapter, d3d12_device))
}

pub struct HoistDeviceContextDx12Inner {
    pub(crate) device_info: HoistDeviceInfo,
    allocator: ManuallyDrop<Mutex<gpu_allocator::d3d12::Allocator>>,

    d3d12_device: d3d12::ID3D12Device,
    _dxgi_adapter: dxgi::IDXGIAdapter1,
    _dxgi_factory: dxgi::IDXGIFactory4,

    next_queue_id: AtomicU32,
    destroyed: AtomicBool,
}

// COM interfaces are free-threaded, the allocator is behind a lock
unsafe impl Send for HoistDeviceContextDx12Inner {}
unsafe impl Sync for HoistDeviceContextDx12Inner {}

impl Drop for HoistDeviceContextDx12Inner {
    fn drop(&mut self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            log::trace!("destroying device");
            unsafe {
                if let Ok(allocator) = self.allocator.lock() {
                    allocator.report_memory_leaks(log::Level::Warn);
                }
                ManuallyDrop::drop(&mut self.allocator);
            }
        }
    }
}

impl HoistDeviceContextDx12Inner {
    pub fn new(dx12_api_def: &HoistApiDefDx12) -> HoistResult<Self> {
        let (dxgi_factory, dxgi_adapter, d3d12_device) = create_device(dx12_api_def)?;

        let allocator_create_info = gpu_allocator::d3d12::AllocatorCreateDesc {
            device: gpu_allocator::d3d12::ID3D12DeviceVersion::Device(d3d12_device.clone()),
            debug_settings: Default::default(),
            allocation_sizes: Default::default(),
        };

        let allocator = gpu_allocator::d3d12::Allocator::new(&allocator_create_info)?;

        let device_info = HoistDeviceInfo {
            upload_texture_alignment: d3d12::D3D12_TEXTURE_DATA_PLACEMENT_ALIGNMENT,
            upload_texture_row_alignment: d3d12::D3D12_TEXTURE_DATA_PITCH_ALIGNMENT,
        };

        Ok(HoistDeviceContextDx12Inner {
            device_info,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            d3d12_device,
            _dxgi_adapter: dxgi_adapter,
            _dxgi_factory: dxgi_factory,
            next_queue_id: AtomicU32::new(0),
            destroyed: AtomicBool::new(false),
        })
    }
}

#[derive(Clone)]
pub struct HoistDeviceContextDx12 {
    pub(crate) inner: Arc<HoistDeviceContextDx12Inner>,
}

impl std::fmt::Debug for HoistDeviceContextDx12 {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HoistDeviceContextDx12")
            .field("device_info", &self.inner.device_info)
            .finish()
    }
}

impl HoistDeviceContextDx12 {
    pub fn device_info(&self) -> &HoistDeviceInfo {
        &self.inner.device_info
    }

    pub fn d3d12_device(&self) -> &d3d12::ID3D12Device {
        &self.inner.d3d12_device
    }

    pub(crate) fn allocator(&self) -> &Mutex<gpu_allocator::d3d12::Allocator> {
        &self.inner.allocator
    }

    pub(crate) fn new(inner: Arc<HoistDeviceContextDx12Inner>) -> Self {
        HoistDeviceContextDx12 { inner }
    }

    pub fn create_queue(
        &self,
        queue_type: HoistQueueType,
    ) -> HoistResult<HoistQueueDx12> {
        let queue_id = self.inner.next_queue_id.fetch_add(1, Ordering::Relaxed);
        HoistQueueDx12::new(self, queue_type, queue_id)
    }

    pub fn create_fence(&self) -> HoistResult<HoistFenceDx12> {
        HoistFenceDx12::new(self)
    }

    pub fn create_buffer(
        &self,
        buffer_def: &HoistBufferDef,
    ) -> HoistResult<HoistBufferDx12> {
        HoistBufferDx12::new(self, buffer_def)
    }

    pub fn create_texture(
        &self,
        texture_def: &HoistTextureDef,
    ) -> HoistResult<HoistTextureDx12> {
        HoistTextureDx12::new(self, texture_def)
    }

    pub fn copyable_footprint(
        &self,
        texture_def: &HoistTextureDef,
        mip_level: u8,
        base_offset: u64,
    ) -> HoistSubresourceFootprint {
        let desc = super::internal::texture_resource_desc(texture_def);
        let subresource = subresource_index(
            mip_level,
            0,
            0,
            texture_def.mip_count,
            texture_def.array_length,
        );
        let offset = align_up(
            base_offset,
            self.inner.device_info.upload_texture_alignment as u64,
        );

        let mut placed_footprint = d3d12::D3D12_PLACED_SUBRESOURCE_FOOTPRINT::default();
        let mut num_rows: u32 = 0;
        let mut row_size_in_bytes: u64 = 0;
        let mut total_bytes: u64 = 0;
        unsafe {
            self.d3d12_device().GetCopyableFootprints(
                &desc,
                subresource,
                1,
                offset,
                Some(&mut placed_footprint),
                Some(&mut num_rows),
                Some(&mut row_size_in_bytes),
                Some(&mut total_bytes),
            );
        }

        HoistSubresourceFootprint {
            offset: placed_footprint.Offset,
            row_pitch: placed_footprint.Footprint.RowPitch as u64,
            num_rows,
            depth: placed_footprint.Footprint.Depth,
            row_size_in_bytes,
            total_bytes,
        }
    }
}
