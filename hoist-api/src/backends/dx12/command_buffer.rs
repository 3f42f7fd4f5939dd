use crate::dx12::{HoistBufferDx12, HoistCommandPoolDx12, HoistQueueDx12, HoistTextureDx12};
use crate::internal_shared::verify_recording;
use crate::{
    HoistBufferBarrier, HoistCmdCopyBufferToBufferParams, HoistCmdCopyBufferToTextureParams,
    HoistCommandBufferDef, HoistQueueType, HoistResourceState, HoistResult, HoistTextureBarrier,
};
use std::sync::Mutex;
use windows::core::Interface;

use super::d3d12;
use super::internal::{borrow_resource, transition_barrier};

struct HoistCommandBufferDx12Inner {
    command_list: d3d12::ID3D12GraphicsCommandList,
    command_allocator: d3d12::ID3D12CommandAllocator,
    is_recording: bool,
}

pub struct HoistCommandBufferDx12 {
    queue: HoistQueueDx12,
    inner: Mutex<HoistCommandBufferDx12Inner>,
}

// COM interfaces are free-threaded, the command list is only touched under the lock
unsafe impl Send for HoistCommandBufferDx12 {}
unsafe impl Sync for HoistCommandBufferDx12 {}

impl HoistCommandBufferDx12 {
    pub fn queue(&self) -> &HoistQueueDx12 {
        &self.queue
    }

    pub fn dx12_graphics_command_list(&self) -> d3d12::ID3D12GraphicsCommandList {
        self.inner.lock().unwrap().command_list.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.inner.lock().unwrap().is_recording
    }

    pub fn new(
        command_pool: &HoistCommandPoolDx12,
        command_buffer_def: &HoistCommandBufferDef,
    ) -> HoistResult<HoistCommandBufferDx12> {
        // Command lists are created open
        let command_list: d3d12::ID3D12GraphicsCommandList = unsafe {
            command_pool.queue().device_context().d3d12_device().CreateCommandList(
                0,
                command_pool.queue().command_list_type(),
                command_pool.command_allocator(),
                None::<&d3d12::ID3D12PipelineState>,
            )?
        };

        if !command_buffer_def.begin_immediately {
            unsafe { command_list.Close()? };
        }

        let inner = HoistCommandBufferDx12Inner {
            command_list,
            command_allocator: command_pool.command_allocator().clone(),
            is_recording: command_buffer_def.begin_immediately,
        };

        Ok(HoistCommandBufferDx12 {
            queue: command_pool.queue().clone(),
            inner: Mutex::new(inner),
        })
    }

    pub fn begin(&self) -> HoistResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.is_recording {
            return Err("Command buffer is already recording")?;
        }

        unsafe {
            inner
                .command_list
                .Reset(&inner.command_allocator, None::<&d3d12::ID3D12PipelineState>)?;
        }

        inner.is_recording = true;
        Ok(())
    }

    pub fn end(&self) -> HoistResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.is_recording {
            return Err("Command buffer is not recording")?;
        }

        unsafe {
            inner.command_list.Close()?;
        }

        inner.is_recording = false;
        Ok(())
    }

    pub(crate) fn closed_command_list(&self) -> HoistResult<d3d12::ID3D12CommandList> {
        let inner = self.inner.lock().unwrap();
        if inner.is_recording {
            return Err("Command buffer must be ended before it is submitted")?;
        }

        Ok(inner.command_list.cast()?)
    }

    pub fn cmd_resource_barrier(
        &self,
        buffer_barriers: &[HoistBufferBarrier],
        texture_barriers: &[HoistTextureBarrier],
    ) -> HoistResult<()> {
        let inner = self.inner.lock().unwrap();
        verify_recording(inner.is_recording)?;

        let is_copy_queue = self.queue.queue_type() == HoistQueueType::Copy;
        let check_states = |src_state: HoistResourceState, dst_state: HoistResourceState| {
            if is_copy_queue
                && !(src_state.is_copy_queue_compatible() && dst_state.is_copy_queue_compatible())
            {
                Err(format!(
                    "Barrier {:?} -> {:?} is not allowed on a copy queue",
                    src_state, dst_state
                ))
            } else {
                Ok(())
            }
        };

        let mut barriers = Vec::with_capacity(buffer_barriers.len() + texture_barriers.len());

        for buffer_barrier in buffer_barriers {
            check_states(buffer_barrier.src_state, buffer_barrier.dst_state)?;
            let buffer = buffer_barrier
                .buffer
                .dx12_buffer()
                .ok_or("Barrier references a buffer from another backend")?;
            barriers.push(transition_barrier(
                buffer.dx12_resource(),
                buffer_barrier.src_state.into(),
                buffer_barrier.dst_state.into(),
            ));
        }

        for texture_barrier in texture_barriers {
            check_states(texture_barrier.src_state, texture_barrier.dst_state)?;
            let texture = texture_barrier
                .texture
                .dx12_texture()
                .ok_or("Barrier references a texture from another backend")?;
            barriers.push(transition_barrier(
                texture.dx12_resource(),
                texture_barrier.src_state.into(),
                texture_barrier.dst_state.into(),
            ));
        }

        if !barriers.is_empty() {
            unsafe {
                inner.command_list.ResourceBarrier(&barriers);
            }
        }

        Ok(())
    }

    pub fn cmd_copy_buffer_to_buffer(
        &self,
        src_buffer: &HoistBufferDx12,
        dst_buffer: &HoistBufferDx12,
        params: &HoistCmdCopyBufferToBufferParams,
    ) -> HoistResult<()> {
        let inner = self.inner.lock().unwrap();
        verify_recording(inner.is_recording)?;

        unsafe {
            inner.command_list.CopyBufferRegion(
                dst_buffer.dx12_resource(),
                params.dst_byte_offset,
                src_buffer.dx12_resource(),
                params.src_byte_offset,
                params.size,
            )
        }

        Ok(())
    }

    pub fn cmd_copy_buffer_to_texture(
        &self,
        src_buffer: &HoistBufferDx12,
        dst_texture: &HoistTextureDx12,
        params: &HoistCmdCopyBufferToTextureParams,
    ) -> HoistResult<()> {
        let inner = self.inner.lock().unwrap();
        verify_recording(inner.is_recording)?;

        let subresource = crate::subresource_index(
            params.mip_level,
            params.array_layer,
            0,
            dst_texture.texture_def().mip_count,
            dst_texture.texture_def().array_length,
        );

        let desc = unsafe { dst_texture.dx12_resource().GetDesc() };

        let mut placed_footprint = d3d12::D3D12_PLACED_SUBRESOURCE_FOOTPRINT::default();
        unsafe {
            self.queue
                .device_context()
                .d3d12_device()
                .GetCopyableFootprints(
                    &desc,
                    subresource,
                    1,
                    params.buffer_offset,
                    Some(&mut placed_footprint),
                    None,
                    None,
                    None,
                );
        }

        placed_footprint.Offset = params.buffer_offset;

        let src = d3d12::D3D12_TEXTURE_COPY_LOCATION {
            pResource: unsafe { borrow_resource(src_buffer.dx12_resource()) },
            Type: d3d12::D3D12_TEXTURE_COPY_TYPE_PLACED_FOOTPRINT,
            Anonymous: d3d12::D3D12_TEXTURE_COPY_LOCATION_0 {
                PlacedFootprint: placed_footprint,
            },
        };

        let dst = d3d12::D3D12_TEXTURE_COPY_LOCATION {
            pResource: unsafe { borrow_resource(dst_texture.dx12_resource()) },
            Type: d3d12::D3D12_TEXTURE_COPY_TYPE_SUBRESOURCE_INDEX,
            Anonymous: d3d12::D3D12_TEXTURE_COPY_LOCATION_0 {
                SubresourceIndex: subresource,
            },
        };

        unsafe {
            inner
                .command_list
                .CopyTextureRegion(&dst, 0, 0, 0, &src, None);
        }

        Ok(())
    }
}
