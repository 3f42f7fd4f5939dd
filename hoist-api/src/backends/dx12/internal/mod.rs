mod conversions;
pub(crate) use conversions::*;

use super::d3d12;
use super::dxgi;
use crate::HoistTextureDef;

/// Borrows a resource into a barrier or copy location without touching its reference count.
/// The returned value must not outlive `resource`.
pub(crate) unsafe fn borrow_resource(
    resource: &d3d12::ID3D12Resource
) -> std::mem::ManuallyDrop<Option<d3d12::ID3D12Resource>> {
    std::mem::transmute_copy(resource)
}

pub(crate) fn transition_barrier(
    resource: &d3d12::ID3D12Resource,
    state_before: d3d12::D3D12_RESOURCE_STATES,
    state_after: d3d12::D3D12_RESOURCE_STATES,
) -> d3d12::D3D12_RESOURCE_BARRIER {
    d3d12::D3D12_RESOURCE_BARRIER {
        Type: d3d12::D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: d3d12::D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: d3d12::D3D12_RESOURCE_BARRIER_0 {
            Transition: std::mem::ManuallyDrop::new(d3d12::D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: unsafe { borrow_resource(resource) },
                Subresource: d3d12::D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                StateBefore: state_before,
                StateAfter: state_after,
            }),
        },
    }
}

pub(crate) fn texture_resource_desc(texture_def: &HoistTextureDef) -> d3d12::D3D12_RESOURCE_DESC {
    d3d12::D3D12_RESOURCE_DESC {
        Dimension: d3d12::D3D12_RESOURCE_DIMENSION_TEXTURE2D,
        Alignment: 0,
        Width: texture_def.extents.width as u64,
        Height: texture_def.extents.height,
        DepthOrArraySize: texture_def.array_length as u16,
        MipLevels: texture_def.mip_count as u16,
        Format: texture_def.format.into(),
        SampleDesc: dxgi::Common::DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Layout: d3d12::D3D12_TEXTURE_LAYOUT_UNKNOWN,
        Flags: d3d12::D3D12_RESOURCE_FLAG_NONE,
    }
}
