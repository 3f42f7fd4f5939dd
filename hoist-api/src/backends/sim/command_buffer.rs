use super::memory::SimResource;
use super::{HoistBufferSim, HoistDeviceContextSim, HoistQueueSim, HoistSimEvent, HoistTextureSim};
use crate::{
    HoistBufferBarrier, HoistCmdCopyBufferToBufferParams, HoistCmdCopyBufferToTextureParams,
    HoistCommandBufferDef, HoistQueueType, HoistResourceId, HoistResourceState, HoistResult,
    HoistTextureBarrier,
};
use crate::internal_shared::verify_recording;
use std::sync::{Arc, Mutex, Weak};

/// A recorded command. Resources are referenced weakly, the device does not keep them alive.
#[derive(Clone)]
pub(super) enum SimCommand {
    Barrier {
        resource: Weak<SimResource>,
        resource_id: HoistResourceId,
        src_state: HoistResourceState,
        dst_state: HoistResourceState,
    },
    CopyBufferToBuffer {
        src: Weak<SimResource>,
        src_id: HoistResourceId,
        dst: Weak<SimResource>,
        dst_id: HoistResourceId,
        params: HoistCmdCopyBufferToBufferParams,
    },
    CopyBufferToTexture {
        src: Weak<SimResource>,
        src_id: HoistResourceId,
        dst: Weak<SimResource>,
        dst_id: HoistResourceId,
        subresource: u32,
        src_offset: u64,
        src_row_pitch: u64,
        dst_offset: u64,
        row_size: u64,
        row_count: u64,
    },
}

struct SimCommandList {
    is_recording: bool,
    commands: Vec<SimCommand>,
}

pub struct HoistCommandBufferSim {
    queue: HoistQueueSim,
    command_list: Mutex<SimCommandList>,
}

impl HoistCommandBufferSim {
    pub fn queue(&self) -> &HoistQueueSim {
        &self.queue
    }

    pub fn is_recording(&self) -> bool {
        self.command_list.lock().unwrap().is_recording
    }

    pub fn command_count(&self) -> usize {
        self.command_list.lock().unwrap().commands.len()
    }

    pub fn begin(&self) -> HoistResult<()> {
        let mut command_list = self.command_list.lock().unwrap();
        if command_list.is_recording {
            return Err("Command buffer is already recording")?;
        }

        command_list.commands.clear();
        command_list.is_recording = true;
        Ok(())
    }

    pub fn end(&self) -> HoistResult<()> {
        let mut command_list = self.command_list.lock().unwrap();
        if !command_list.is_recording {
            return Err("Command buffer is not recording")?;
        }

        command_list.is_recording = false;
        Ok(())
    }

    pub fn cmd_resource_barrier(
        &self,
        buffer_barriers: &[HoistBufferBarrier],
        texture_barriers: &[HoistTextureBarrier],
    ) -> HoistResult<()> {
        let mut commands = Vec::with_capacity(buffer_barriers.len() + texture_barriers.len());

        for barrier in buffer_barriers {
            let buffer = barrier
                .buffer
                .sim_buffer()
                .ok_or("Barrier references a buffer from another backend")?;
            commands.push(self.barrier_command(
                buffer.resource(),
                barrier.src_state,
                barrier.dst_state,
            )?);
        }

        for barrier in texture_barriers {
            let texture = barrier
                .texture
                .sim_texture()
                .ok_or("Barrier references a texture from another backend")?;
            commands.push(self.barrier_command(
                texture.resource(),
                barrier.src_state,
                barrier.dst_state,
            )?);
        }

        self.record(commands)
    }

    pub fn cmd_copy_buffer_to_buffer(
        &self,
        src_buffer: &HoistBufferSim,
        dst_buffer: &HoistBufferSim,
        params: &HoistCmdCopyBufferToBufferParams,
    ) -> HoistResult<()> {
        if params.src_byte_offset + params.size > src_buffer.buffer_def().size
            || params.dst_byte_offset + params.size > dst_buffer.buffer_def().size
        {
            return Err(format!(
                "Buffer copy of {} bytes out of range (src offset {} of {}, dst offset {} of {})",
                params.size,
                params.src_byte_offset,
                src_buffer.buffer_def().size,
                params.dst_byte_offset,
                dst_buffer.buffer_def().size
            ))?;
        }

        self.record(vec![SimCommand::CopyBufferToBuffer {
            src: Arc::downgrade(src_buffer.resource()),
            src_id: src_buffer.resource_id(),
            dst: Arc::downgrade(dst_buffer.resource()),
            dst_id: dst_buffer.resource_id(),
            params: *params,
        }])
    }

    pub fn cmd_copy_buffer_to_texture(
        &self,
        src_buffer: &HoistBufferSim,
        dst_texture: &HoistTextureSim,
        params: &HoistCmdCopyBufferToTextureParams,
    ) -> HoistResult<()> {
        let footprint = self.queue.device_context().copyable_footprint(
            dst_texture.texture_def(),
            params.mip_level,
            params.buffer_offset,
        );

        if footprint.offset != params.buffer_offset {
            return Err(format!(
                "Texture copy source offset {} is not aligned to {}",
                params.buffer_offset,
                self.queue.device_context().device_info().upload_texture_alignment
            ))?;
        }

        if footprint.offset + footprint.total_bytes > src_buffer.buffer_def().size {
            return Err(format!(
                "Texture copy needs {} bytes at offset {} but the source buffer is {} bytes",
                footprint.total_bytes,
                footprint.offset,
                src_buffer.buffer_def().size
            ))?;
        }

        let layout = dst_texture.subresource_layout(params.mip_level, params.array_layer)?;
        let texture_def = dst_texture.texture_def();

        self.record(vec![SimCommand::CopyBufferToTexture {
            src: Arc::downgrade(src_buffer.resource()),
            src_id: src_buffer.resource_id(),
            dst: Arc::downgrade(dst_texture.resource()),
            dst_id: dst_texture.resource_id(),
            subresource: crate::subresource_index(
                params.mip_level,
                params.array_layer,
                0,
                texture_def.mip_count,
                texture_def.array_length,
            ),
            src_offset: footprint.offset,
            src_row_pitch: footprint.row_pitch,
            dst_offset: layout.offset,
            row_size: layout.row_size,
            row_count: layout.row_count,
        }])
    }

    pub(super) fn new(
        queue: &HoistQueueSim,
        command_buffer_def: &HoistCommandBufferDef,
    ) -> Self {
        HoistCommandBufferSim {
            queue: queue.clone(),
            command_list: Mutex::new(SimCommandList {
                is_recording: command_buffer_def.begin_immediately,
                commands: Vec::default(),
            }),
        }
    }

    /// The recorded commands, for execution. Command lists may be executed more than once.
    pub(super) fn closed_commands(&self) -> HoistResult<Vec<SimCommand>> {
        let command_list = self.command_list.lock().unwrap();
        if command_list.is_recording {
            return Err("Command buffer must be ended before it is submitted")?;
        }

        Ok(command_list.commands.clone())
    }

    fn barrier_command(
        &self,
        resource: &Arc<SimResource>,
        src_state: HoistResourceState,
        dst_state: HoistResourceState,
    ) -> HoistResult<SimCommand> {
        if self.queue.queue_type() == HoistQueueType::Copy
            && !(src_state.is_copy_queue_compatible() && dst_state.is_copy_queue_compatible())
        {
            return Err(format!(
                "Barrier {:?} -> {:?} on resource {:?} is not allowed on a copy queue",
                src_state,
                dst_state,
                resource.id()
            ))?;
        }

        Ok(SimCommand::Barrier {
            resource: Arc::downgrade(resource),
            resource_id: resource.id(),
            src_state,
            dst_state,
        })
    }

    fn record(
        &self,
        mut commands: Vec<SimCommand>,
    ) -> HoistResult<()> {
        let mut command_list = self.command_list.lock().unwrap();
        verify_recording(command_list.is_recording)?;

        command_list.commands.append(&mut commands);
        Ok(())
    }
}

impl SimCommand {
    /// Runs the command on a queue worker. Misuse is reported as a validation error and the
    /// command is skipped.
    pub(super) fn execute(
        &self,
        device_context: &HoistDeviceContextSim,
        queue_type: HoistQueueType,
    ) {
        let validation_error = |message: String| {
            device_context.trace(HoistSimEvent::ValidationError {
                queue: Some(queue_type),
                message,
            })
        };

        match self {
            SimCommand::Barrier {
                resource,
                resource_id,
                src_state,
                dst_state,
            } => {
                let resource = match resource.upgrade() {
                    Some(resource) => resource,
                    None => {
                        return validation_error(format!(
                            "Barrier references released resource {:?}",
                            resource_id
                        ))
                    }
                };

                let current_state = resource.state();
                if current_state != *src_state {
                    return validation_error(format!(
                        "Barrier on resource {:?} expects state {:?} but it is in {:?}",
                        resource_id, src_state, current_state
                    ));
                }

                resource.set_state(*dst_state);
                device_context.trace(HoistSimEvent::BarrierExecuted {
                    queue: queue_type,
                    resource: *resource_id,
                    src_state: *src_state,
                    dst_state: *dst_state,
                });
            }
            SimCommand::CopyBufferToBuffer {
                src,
                src_id,
                dst,
                dst_id,
                params,
            } => {
                let (src, dst) = match Self::copy_resources(src, *src_id, dst, *dst_id) {
                    Ok(resources) => resources,
                    Err(message) => return validation_error(message),
                };

                let data = src.read(params.src_byte_offset, params.size);
                dst.with_memory(|memory| {
                    let begin = params.dst_byte_offset as usize;
                    memory[begin..begin + data.len()].copy_from_slice(&data);
                });

                device_context.trace(HoistSimEvent::BufferCopied {
                    queue: queue_type,
                    src: *src_id,
                    dst: *dst_id,
                    size: params.size,
                });
            }
            SimCommand::CopyBufferToTexture {
                src,
                src_id,
                dst,
                dst_id,
                subresource,
                src_offset,
                src_row_pitch,
                dst_offset,
                row_size,
                row_count,
            } => {
                let (src, dst) = match Self::copy_resources(src, *src_id, dst, *dst_id) {
                    Ok(resources) => resources,
                    Err(message) => return validation_error(message),
                };

                let mut rows = Vec::with_capacity((row_size * row_count) as usize);
                for row in 0..*row_count {
                    rows.extend(src.read(src_offset + row * src_row_pitch, *row_size));
                }

                dst.with_memory(|memory| {
                    let begin = *dst_offset as usize;
                    memory[begin..begin + rows.len()].copy_from_slice(&rows);
                });

                device_context.trace(HoistSimEvent::TextureCopied {
                    queue: queue_type,
                    src: *src_id,
                    dst: *dst_id,
                    subresource: *subresource,
                    size: rows.len() as u64,
                });
            }
        }
    }

    // Resolves both ends of a copy and checks they are in copy-compatible states. A COMMON
    // destination is implicitly promoted to COPY_DST.
    fn copy_resources(
        src: &Weak<SimResource>,
        src_id: HoistResourceId,
        dst: &Weak<SimResource>,
        dst_id: HoistResourceId,
    ) -> Result<(Arc<SimResource>, Arc<SimResource>), String> {
        let src = src
            .upgrade()
            .ok_or_else(|| format!("Copy source {:?} was released", src_id))?;
        let dst = dst
            .upgrade()
            .ok_or_else(|| format!("Copy destination {:?} was released", dst_id))?;

        let src_state = src.state();
        if !src_state.intersects(HoistResourceState::COPY_SRC | HoistResourceState::COMMON) {
            return Err(format!(
                "Copy source {:?} is in state {:?}",
                src_id, src_state
            ));
        }

        let dst_state = dst.state();
        if dst_state == HoistResourceState::COMMON {
            dst.set_state(HoistResourceState::COPY_DST);
        } else if !dst_state.contains(HoistResourceState::COPY_DST) {
            return Err(format!(
                "Copy destination {:?} is in state {:?}",
                dst_id, dst_state
            ));
        }

        Ok((src, dst))
    }
}
