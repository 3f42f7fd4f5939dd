use super::{UploadError, UploadResult};
use hoist_api::{HoistDeviceContext, HoistFence, HoistQueue};

/// Fence values one batch signals. The copy queue signals `copy_complete` after its copies, the
/// direct queue waits for it, runs the transitions and signals `batch_complete`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchFenceValues {
    pub batch_index: u64,
    pub copy_complete: u64,
    pub batch_complete: u64,
}

impl BatchFenceValues {
    /// Batch `n` (0-based) uses `2n + 1` and `2n + 2`
    pub fn for_batch(batch_index: u64) -> Self {
        BatchFenceValues {
            batch_index,
            copy_complete: 2 * batch_index + 1,
            batch_complete: 2 * batch_index + 2,
        }
    }
}

/// A timeline fence shared by the copy and direct queues. The epoch is the last value a
/// completed batch signaled and only ever moves forward, two steps per batch.
pub struct CrossQueueFence {
    fence: HoistFence,
    epoch: u64,
}

impl CrossQueueFence {
    pub fn new(device_context: &HoistDeviceContext) -> UploadResult<Self> {
        let fence = device_context
            .create_fence()
            .map_err(UploadError::resource_creation("cross-queue fence"))?;

        Ok(CrossQueueFence { fence, epoch: 0 })
    }

    pub fn fence(&self) -> &HoistFence {
        &self.fence
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn completed_value(&self) -> u64 {
        self.fence.completed_value()
    }

    /// Values the next batch will signal
    pub fn next_batch(&self) -> BatchFenceValues {
        BatchFenceValues::for_batch(self.epoch / 2)
    }

    /// Makes the direct queue wait on the GPU until everything submitted to the copy queue so
    /// far has completed
    pub fn order_direct_after_copy(
        &self,
        copy_queue: &HoistQueue,
        direct_queue: &HoistQueue,
        value: u64,
    ) -> UploadResult<()> {
        copy_queue
            .signal(&self.fence, value)
            .map_err(UploadError::submission("copy queue signal"))?;
        direct_queue
            .wait(&self.fence, value)
            .map_err(UploadError::submission("direct queue wait"))
    }

    pub fn signal(
        &self,
        queue: &HoistQueue,
        value: u64,
    ) -> UploadResult<()> {
        queue
            .signal(&self.fence, value)
            .map_err(UploadError::submission("direct queue signal"))
    }

    /// Blocks until the batch's final value is reached and moves the epoch to it. There is no
    /// timeout, a hung device hangs the caller.
    pub fn wait_for_batch(
        &mut self,
        values: &BatchFenceValues,
    ) -> UploadResult<()> {
        profiling::scope!("CrossQueueFence::wait_for_batch");
        if self.fence.completed_value() < values.batch_complete {
            self.fence
                .wait_for_value(values.batch_complete)
                .map_err(UploadError::submission("batch completion wait"))?;
        }

        self.epoch = values.batch_complete;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_values_advance_by_two() {
        let first = BatchFenceValues::for_batch(0);
        assert_eq!(first.copy_complete, 1);
        assert_eq!(first.batch_complete, 2);

        let third = BatchFenceValues::for_batch(2);
        assert_eq!(third.copy_complete, 5);
        assert_eq!(third.batch_complete, 6);
    }

    #[test]
    fn epoch_moves_after_wait() {
        let api = hoist_api::HoistApi::new_sim(&Default::default()).unwrap();
        let device_context = api.device_context();
        let queue = device_context
            .create_queue(hoist_api::HoistQueueType::Direct)
            .unwrap();

        let mut fence = CrossQueueFence::new(&device_context).unwrap();
        assert_eq!(fence.epoch(), 0);

        let values = fence.next_batch();
        assert_eq!(values.batch_index, 0);
        fence.signal(&queue, values.batch_complete).unwrap();
        fence.wait_for_batch(&values).unwrap();

        assert_eq!(fence.epoch(), 2);
        assert!(fence.completed_value() >= 2);
        assert_eq!(fence.next_batch(), BatchFenceValues::for_batch(1));
    }
}
