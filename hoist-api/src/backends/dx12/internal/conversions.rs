use super::d3d12;
use super::dxgi;
use crate::{HoistFormat, HoistMemoryUsage, HoistQueueType, HoistResourceState};

impl Into<dxgi::Common::DXGI_FORMAT> for HoistFormat {
    fn into(self) -> dxgi::Common::DXGI_FORMAT {
        match self {
            HoistFormat::R8_UNORM => dxgi::Common::DXGI_FORMAT_R8_UNORM,
            HoistFormat::R8G8_UNORM => dxgi::Common::DXGI_FORMAT_R8G8_UNORM,
            HoistFormat::R8G8B8A8_UNORM => dxgi::Common::DXGI_FORMAT_R8G8B8A8_UNORM,
            HoistFormat::R8G8B8A8_SRGB => dxgi::Common::DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
            HoistFormat::B8G8R8A8_UNORM => dxgi::Common::DXGI_FORMAT_B8G8R8A8_UNORM,
            HoistFormat::R16G16B16A16_SFLOAT => dxgi::Common::DXGI_FORMAT_R16G16B16A16_FLOAT,
            HoistFormat::R32_SFLOAT => dxgi::Common::DXGI_FORMAT_R32_FLOAT,
            HoistFormat::R32G32B32A32_SFLOAT => dxgi::Common::DXGI_FORMAT_R32G32B32A32_FLOAT,
        }
    }
}

// The bit layout of HoistResourceState matches D3D12_RESOURCE_STATES
impl Into<d3d12::D3D12_RESOURCE_STATES> for HoistResourceState {
    fn into(self) -> d3d12::D3D12_RESOURCE_STATES {
        d3d12::D3D12_RESOURCE_STATES(self.bits() as i32)
    }
}

impl Into<gpu_allocator::MemoryLocation> for HoistMemoryUsage {
    fn into(self) -> gpu_allocator::MemoryLocation {
        match self {
            HoistMemoryUsage::GpuOnly => gpu_allocator::MemoryLocation::GpuOnly,
            HoistMemoryUsage::CpuToGpu => gpu_allocator::MemoryLocation::CpuToGpu,
        }
    }
}

pub(crate) fn queue_type_to_command_list_type(
    queue_type: HoistQueueType
) -> d3d12::D3D12_COMMAND_LIST_TYPE {
    match queue_type {
        HoistQueueType::Direct => d3d12::D3D12_COMMAND_LIST_TYPE_DIRECT,
        HoistQueueType::Copy => d3d12::D3D12_COMMAND_LIST_TYPE_COPY,
    }
}
