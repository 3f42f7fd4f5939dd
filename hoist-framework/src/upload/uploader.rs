use super::layout::{self, SubresourceData};
use super::{
    BatchFenceValues, CrossQueueFence, QueuePair, ResourceUploaderDef, StagingPool,
    TransitionBatcher, UploadError, UploadResult,
};
use hoist_api::{
    HoistBuffer, HoistCmdCopyBufferToBufferParams, HoistCmdCopyBufferToTextureParams,
    HoistDeviceContext, HoistQueue, HoistTexture,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UploadBatchState {
    /// Copies may be recorded and the batch may be executed
    Recording,

    /// The batch was executed and has completed on the GPU. `begin_batch()` opens the next one.
    Closed,

    /// A device failure happened during `execute()`. The uploader refuses all further work.
    Faulted,
}

/// What a completed batch did
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadBatchResult {
    /// 0-based index of the batch
    pub batch_index: u64,
    /// Value the copy queue signaled once the copies were done
    pub copy_fence_value: u64,
    /// Value the direct queue signaled once the transitions were done. The fence has reached it.
    pub fence_value: u64,
    pub staging_allocations: usize,
    pub staging_bytes: u64,
    /// Transitions recorded on the direct queue, one per uploaded resource
    pub transitions: usize,
    pub copy_commands: usize,
}

/// Uploads data into GPU buffers and textures.
///
/// Copies are recorded on a dedicated copy queue, from one staging buffer per request. When the
/// batch is executed the direct queue waits on the GPU for the copies to finish and then
/// transitions every destination to the configured final state (GENERIC_READ by default).
/// `execute()` blocks until both queues are done, so the destinations may be used by rendering
/// work as soon as it returns.
///
/// Destinations must be in COPY_DST (or COMMON) when their upload is recorded. The uploader
/// holds a handle to each destination until the batch is flushed, but the caller owns them.
///
/// The uploader is driven from a single thread, it is not `Sync`.
pub struct ResourceUploader {
    device_context: HoistDeviceContext,
    uploader_def: ResourceUploaderDef,
    queues: QueuePair,
    staging: StagingPool,
    transitions: TransitionBatcher,
    fence: CrossQueueFence,
    state: UploadBatchState,
    copy_command_count: usize,
}

impl ResourceUploader {
    /// Creates the copy and direct queues, their command buffers and the cross-queue fence.
    /// The first batch is open for recording immediately.
    pub fn new(
        device_context: &HoistDeviceContext,
        uploader_def: &ResourceUploaderDef,
    ) -> UploadResult<Self> {
        uploader_def.verify()?;

        let queues = QueuePair::new(device_context)?;
        let fence = CrossQueueFence::new(device_context)?;
        let staging = StagingPool::new(device_context, uploader_def.max_staging_bytes_per_batch);

        log::info!(
            "Created resource uploader (copy queue {}, direct queue {}, final state {:?})",
            queues.copy.queue().queue_id(),
            queues.direct.queue().queue_id(),
            uploader_def.final_state
        );

        Ok(ResourceUploader {
            device_context: device_context.clone(),
            uploader_def: uploader_def.clone(),
            queues,
            staging,
            transitions: TransitionBatcher::default(),
            fence,
            state: UploadBatchState::Recording,
            copy_command_count: 0,
        })
    }

    pub fn device_context(&self) -> &HoistDeviceContext {
        &self.device_context
    }

    pub fn uploader_def(&self) -> &ResourceUploaderDef {
        &self.uploader_def
    }

    pub fn copy_queue(&self) -> &HoistQueue {
        self.queues.copy.queue()
    }

    pub fn direct_queue(&self) -> &HoistQueue {
        self.queues.direct.queue()
    }

    pub fn state(&self) -> UploadBatchState {
        self.state
    }

    pub fn pending_transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn staging_allocation_count(&self) -> usize {
        self.staging.allocation_count()
    }

    pub fn staging_bytes(&self) -> u64 {
        self.staging.allocated_bytes()
    }

    /// Current value of the cross-queue fence
    pub fn completed_value(&self) -> u64 {
        self.fence.completed_value()
    }

    /// Last fence value reached by a completed batch. Advances by two per `execute()`.
    pub fn batch_epoch(&self) -> u64 {
        self.fence.epoch()
    }

    /// Uploads all of `data` to the start of `buffer`. The buffer must be in `COPY_DST` or
    /// `COMMON` when the batch executes. After an `execute()` it is left in the final state, so
    /// uploading to it again needs a transition back to `COPY_DST` first.
    #[profiling::function]
    pub fn record_copy_data(
        &mut self,
        buffer: &HoistBuffer,
        data: &[u8],
    ) -> UploadResult<()> {
        self.check_recording()?;

        let size = data.len() as u64;
        if size == 0 {
            return Err(UploadError::InvalidRequest(
                "can't upload an empty buffer range".to_string(),
            ));
        }

        if size > buffer.buffer_def().size {
            return Err(UploadError::InvalidRequest(format!(
                "{} bytes don't fit in buffer {:?} of {} bytes",
                size,
                buffer.resource_id(),
                buffer.buffer_def().size
            )));
        }

        let staging_buffer = self.staging.allocate(size)?;
        staging_buffer
            .copy_to_host_visible_buffer(data)
            .map_err(|source| UploadError::Allocation { size, source })?;

        self.queues
            .copy
            .command_buffer()
            .cmd_copy_buffer_to_buffer(
                &staging_buffer,
                buffer,
                &HoistCmdCopyBufferToBufferParams {
                    src_byte_offset: 0,
                    dst_byte_offset: 0,
                    size,
                },
            )
            .map_err(UploadError::Recording)?;

        self.staging.keep_alive(staging_buffer);
        self.transitions
            .record_buffer(buffer, self.uploader_def.final_state);
        self.copy_command_count += 1;

        log::trace!(
            "Recorded {} byte upload to buffer {:?}",
            size,
            buffer.resource_id()
        );
        Ok(())
    }

    /// Uploads one mip level of the first array slice. `data` holds tightly packed rows.
    pub fn record_copy_texture_data(
        &mut self,
        texture: &HoistTexture,
        mip_slice: u8,
        data: &[u8],
    ) -> UploadResult<()> {
        self.record_copy_texture_subresource(texture, mip_slice, 0, data)
    }

    /// Uploads one subresource. `data` holds tightly packed rows, anything past the size of the
    /// subresource is ignored. The same destination state rules as `record_copy_data()` apply.
    #[profiling::function]
    pub fn record_copy_texture_subresource(
        &mut self,
        texture: &HoistTexture,
        mip_slice: u8,
        array_slice: u16,
        data: &[u8],
    ) -> UploadResult<()> {
        self.check_recording()?;

        let texture_def = texture.texture_def();
        if mip_slice as u32 >= texture_def.mip_count
            || array_slice as u32 >= texture_def.array_length
        {
            return Err(UploadError::InvalidRequest(format!(
                "mip {} array slice {} is out of range for texture {:?} ({} mips, {} slices)",
                mip_slice,
                array_slice,
                texture.resource_id(),
                texture_def.mip_count,
                texture_def.array_length
            )));
        }

        let footprint = self
            .device_context
            .copyable_footprint(texture_def, mip_slice, 0);
        let subresource_data = SubresourceData::for_footprint(data, &footprint)?;

        let size = layout::staging_size(&footprint);
        let staging_buffer = self.staging.allocate(size)?;
        staging_buffer
            .write_mapped(|staging_memory| {
                layout::write_rows(staging_memory, &subresource_data, &footprint)
            })
            .map_err(|source| UploadError::Allocation { size, source })?;

        self.queues
            .copy
            .command_buffer()
            .cmd_copy_buffer_to_texture(
                &staging_buffer,
                texture,
                &HoistCmdCopyBufferToTextureParams {
                    buffer_offset: footprint.offset,
                    array_layer: array_slice,
                    mip_level: mip_slice,
                },
            )
            .map_err(UploadError::Recording)?;

        self.staging.keep_alive(staging_buffer);
        self.transitions
            .record_texture(texture, self.uploader_def.final_state);
        self.copy_command_count += 1;

        log::trace!(
            "Recorded upload of mip {} slice {} to texture {:?} ({} byte staging buffer, row pitch {})",
            mip_slice,
            array_slice,
            texture.resource_id(),
            size,
            footprint.row_pitch
        );
        Ok(())
    }

    /// Submits the batch and blocks until it has completed on both queues.
    ///
    /// The copy queue runs the copies and signals the first fence value of the batch. The direct
    /// queue waits for that value, runs the transitions and signals the second. Once the second
    /// value is reached the staging buffers are released and the batch is closed.
    ///
    /// Any failure here faults the uploader.
    #[profiling::function]
    pub fn execute(&mut self) -> UploadResult<UploadBatchResult> {
        self.check_recording()?;

        match self.execute_batch() {
            Ok(result) => {
                self.state = UploadBatchState::Closed;
                Ok(result)
            }
            Err(error) => {
                log::error!("Upload batch failed, the uploader is now faulted: {}", error);
                self.state = UploadBatchState::Faulted;
                Err(error)
            }
        }
    }

    /// Opens the next batch: resets both command pools and re-opens both command buffers.
    /// Does nothing if the current batch is still recording.
    pub fn begin_batch(&mut self) -> UploadResult<()> {
        match self.state {
            UploadBatchState::Recording => Ok(()),
            UploadBatchState::Faulted => Err(UploadError::Faulted),
            UploadBatchState::Closed => {
                self.queues.reset()?;
                self.state = UploadBatchState::Recording;
                log::trace!("Opened upload batch {}", self.fence.next_batch().batch_index);
                Ok(())
            }
        }
    }

    fn check_recording(&self) -> UploadResult<()> {
        match self.state {
            UploadBatchState::Recording => Ok(()),
            UploadBatchState::Closed => Err(UploadError::BatchClosed),
            UploadBatchState::Faulted => Err(UploadError::Faulted),
        }
    }

    fn execute_batch(&mut self) -> UploadResult<UploadBatchResult> {
        let values = self.fence.next_batch();

        let transitions = self
            .transitions
            .flush(self.queues.direct.command_buffer())
            .map_err(UploadError::Recording)?;

        self.queues.close()?;

        self.queues.copy.submit("copy queue submit")?;
        self.fence.order_direct_after_copy(
            self.queues.copy.queue(),
            self.queues.direct.queue(),
            values.copy_complete,
        )?;

        self.queues.direct.submit("direct queue submit")?;
        self.fence
            .signal(self.queues.direct.queue(), values.batch_complete)?;

        self.fence.wait_for_batch(&values)?;

        let result = self.batch_result(&values, transitions);
        self.staging.release_all();
        self.copy_command_count = 0;

        log::debug!(
            "Upload batch {} complete: {} copies, {} transitions, {} staging bytes, fence at {}",
            result.batch_index,
            result.copy_commands,
            result.transitions,
            result.staging_bytes,
            result.fence_value
        );

        Ok(result)
    }

    fn batch_result(
        &self,
        values: &BatchFenceValues,
        transitions: usize,
    ) -> UploadBatchResult {
        UploadBatchResult {
            batch_index: values.batch_index,
            copy_fence_value: values.copy_complete,
            fence_value: values.batch_complete,
            staging_allocations: self.staging.allocation_count(),
            staging_bytes: self.staging.allocated_bytes(),
            transitions,
            copy_commands: self.copy_command_count,
        }
    }
}

impl Drop for ResourceUploader {
    fn drop(&mut self) {
        log::trace!("destroying ResourceUploader");

        // A faulted batch may still be executing and reading its staging buffers
        if !self.staging.is_empty() && self.state == UploadBatchState::Faulted {
            if let Err(error) = self.queues.wait_for_idle() {
                log::warn!("Failed to wait for upload queues during teardown: {}", error);
            }
        }

        self.staging.release_all();
        self.transitions.clear();

        log::trace!("destroyed ResourceUploader");
    }
}
