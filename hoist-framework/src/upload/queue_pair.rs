use super::{UploadError, UploadResult};
use hoist_api::{
    HoistCommandBuffer, HoistCommandBufferDef, HoistCommandPool, HoistCommandPoolDef,
    HoistDeviceContext, HoistQueue, HoistQueueType,
};

/// A queue plus the one command pool and command buffer the uploader records into for it. The
/// command buffer is reused by every batch.
pub struct QueueContext {
    queue: HoistQueue,
    command_pool: HoistCommandPool,
    command_buffer: HoistCommandBuffer,
}

impl QueueContext {
    /// Creates the queue, pool and command buffer. The command buffer is open for recording.
    pub fn new(
        device_context: &HoistDeviceContext,
        queue_type: HoistQueueType,
    ) -> UploadResult<Self> {
        let queue = device_context
            .create_queue(queue_type)
            .map_err(UploadError::resource_creation("queue"))?;
        let command_pool = queue
            .create_command_pool(&HoistCommandPoolDef { transient: true })
            .map_err(UploadError::resource_creation("command pool"))?;
        let command_buffer = command_pool
            .create_command_buffer(&HoistCommandBufferDef {
                begin_immediately: true,
            })
            .map_err(UploadError::resource_creation("command buffer"))?;

        Ok(QueueContext {
            queue,
            command_pool,
            command_buffer,
        })
    }

    pub fn queue(&self) -> &HoistQueue {
        &self.queue
    }

    pub fn command_buffer(&self) -> &HoistCommandBuffer {
        &self.command_buffer
    }

    /// Finishes recording. Does nothing if the command buffer is already closed.
    pub fn close(&self) -> UploadResult<()> {
        if self.command_buffer.is_recording() {
            self.command_buffer.end().map_err(UploadError::Recording)?;
        }

        Ok(())
    }

    pub fn submit(
        &self,
        operation: &'static str,
    ) -> UploadResult<()> {
        self.queue
            .submit(&[&self.command_buffer])
            .map_err(UploadError::submission(operation))
    }

    /// Resets the pool and re-opens the command buffer. Only valid once the GPU has finished
    /// executing the previous recording.
    pub fn reset(&self) -> UploadResult<()> {
        self.command_pool
            .reset_command_pool()
            .map_err(UploadError::Recording)?;
        self.command_buffer.begin().map_err(UploadError::Recording)
    }
}

/// The copy queue and the direct queue. There are always exactly these two.
pub struct QueuePair {
    /// Runs the staging to destination copies
    pub copy: QueueContext,
    /// Runs the transitions that make the destinations readable
    pub direct: QueueContext,
}

impl QueuePair {
    pub fn new(device_context: &HoistDeviceContext) -> UploadResult<Self> {
        let copy = QueueContext::new(device_context, HoistQueueType::Copy)?;
        let direct = QueueContext::new(device_context, HoistQueueType::Direct)?;
        Ok(QueuePair { copy, direct })
    }

    pub fn close(&self) -> UploadResult<()> {
        self.copy.close()?;
        self.direct.close()
    }

    pub fn reset(&self) -> UploadResult<()> {
        self.copy.reset()?;
        self.direct.reset()
    }

    /// Blocks until both queues have drained
    pub fn wait_for_idle(&self) -> UploadResult<()> {
        self.copy
            .queue
            .wait_for_queue_idle()
            .map_err(UploadError::submission("copy queue idle wait"))?;
        self.direct
            .queue
            .wait_for_queue_idle()
            .map_err(UploadError::submission("direct queue idle wait"))
    }
}
