use super::{UploadError, UploadResult};
use hoist_api::{HoistBuffer, HoistBufferDef, HoistDeviceContext, HoistError};

/// Creates one CPU-writable staging buffer per upload and keeps every buffer of the current
/// batch alive until `release_all()`. Buffers are never reused across batches. Only buffers
/// handed back through `keep_alive()` count towards the batch budget.
pub struct StagingPool {
    device_context: HoistDeviceContext,
    allocations: Vec<HoistBuffer>,
    allocated_bytes: u64,
    max_bytes: Option<u64>,
}

impl StagingPool {
    pub fn new(
        device_context: &HoistDeviceContext,
        max_bytes: Option<u64>,
    ) -> Self {
        StagingPool {
            device_context: device_context.clone(),
            allocations: Vec::default(),
            allocated_bytes: 0,
            max_bytes,
        }
    }

    pub fn allocation_count(&self) -> usize {
        self.allocations.len()
    }

    pub fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    /// Creates a staging buffer of exactly `size` bytes. The pool does not hold it until the
    /// copy reading from it has been recorded and the buffer is passed to `keep_alive()`.
    pub fn allocate(
        &self,
        size: u64,
    ) -> UploadResult<HoistBuffer> {
        if let Some(max_bytes) = self.max_bytes {
            if self.allocated_bytes + size > max_bytes {
                return Err(UploadError::Allocation {
                    size,
                    source: HoistError::OutOfMemory {
                        requested: size,
                        available: max_bytes.saturating_sub(self.allocated_bytes),
                    },
                });
            }
        }

        let buffer = self
            .device_context
            .create_buffer(&HoistBufferDef::for_staging_buffer(size))
            .map_err(|source| UploadError::Allocation { size, source })?;

        log::trace!(
            "Allocated staging buffer {:?} of {} bytes",
            buffer.resource_id(),
            size
        );

        Ok(buffer)
    }

    /// Holds `buffer` until `release_all()`
    pub fn keep_alive(
        &mut self,
        buffer: HoistBuffer,
    ) {
        self.allocated_bytes += buffer.buffer_def().size;
        self.allocations.push(buffer);
    }

    /// Drops every staging buffer. Must only be called once the GPU is done reading them.
    pub fn release_all(&mut self) {
        log::trace!(
            "Releasing {} staging buffers ({} bytes)",
            self.allocations.len(),
            self.allocated_bytes
        );
        self.allocations.clear();
        self.allocated_bytes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_api::sim::HoistApiDefSim;
    use hoist_api::HoistApi;

    #[test]
    fn allocations_live_until_released() {
        let api = HoistApi::new_sim(&HoistApiDefSim::default()).unwrap();
        let device_context = api.device_context();
        let sim_device_context = device_context.sim_device_context().unwrap();

        let mut staging = StagingPool::new(&device_context, None);
        let buffer = staging.allocate(256).unwrap();
        assert_eq!(buffer.buffer_def().size, 256);
        staging.keep_alive(buffer);
        let buffer = staging.allocate(64).unwrap();
        staging.keep_alive(buffer);

        assert_eq!(staging.allocation_count(), 2);
        assert_eq!(staging.allocated_bytes(), 320);
        assert_eq!(sim_device_context.live_resource_count(), 2);

        staging.release_all();
        assert!(staging.is_empty());
        assert_eq!(staging.allocated_bytes(), 0);
        assert_eq!(sim_device_context.live_resource_count(), 0);
    }

    #[test]
    fn budget_is_enforced() {
        let api = HoistApi::new_sim(&HoistApiDefSim::default()).unwrap();
        let mut staging = StagingPool::new(&api.device_context(), Some(1000));

        let buffer = staging.allocate(600).unwrap();
        staging.keep_alive(buffer);
        let result = staging.allocate(600);
        assert!(matches!(
            result,
            Err(UploadError::Allocation {
                size: 600,
                source: HoistError::OutOfMemory {
                    requested: 600,
                    available: 400
                }
            })
        ));

        // A failed allocation doesn't count against the budget
        let buffer = staging.allocate(400).unwrap();
        staging.keep_alive(buffer);
        assert_eq!(staging.allocated_bytes(), 1000);
    }

    #[test]
    fn unkept_allocations_are_not_held() {
        let api = HoistApi::new_sim(&HoistApiDefSim::default()).unwrap();
        let device_context = api.device_context();
        let sim_device_context = device_context.sim_device_context().unwrap();
        let mut staging = StagingPool::new(&device_context, Some(1000));

        let buffer = staging.allocate(1000).unwrap();
        drop(buffer);
        assert!(staging.is_empty());
        assert_eq!(staging.allocated_bytes(), 0);
        assert_eq!(sim_device_context.live_resource_count(), 0);

        // The whole budget is still available
        let buffer = staging.allocate(1000).unwrap();
        staging.keep_alive(buffer);
        assert_eq!(staging.allocation_count(), 1);
    }

    #[test]
    fn zero_sized_allocation_fails() {
        let api = HoistApi::new_sim(&HoistApiDefSim::default()).unwrap();
        let staging = StagingPool::new(&api.device_context(), None);
        assert!(matches!(
            staging.allocate(0),
            Err(UploadError::Allocation { size: 0, .. })
        ));
        assert!(staging.is_empty());
    }
}
