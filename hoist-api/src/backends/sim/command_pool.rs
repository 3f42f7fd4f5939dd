use super::{HoistCommandBufferSim, HoistQueueSim};
use crate::{HoistCommandBufferDef, HoistCommandPoolDef, HoistResult};

pub struct HoistCommandPoolSim {
    queue: HoistQueueSim,
    command_pool_def: HoistCommandPoolDef,
}

impl HoistCommandPoolSim {
    pub fn queue(&self) -> &HoistQueueSim {
        &self.queue
    }

    pub fn command_pool_def(&self) -> &HoistCommandPoolDef {
        &self.command_pool_def
    }

    pub fn create_command_buffer(
        &self,
        command_buffer_def: &HoistCommandBufferDef,
    ) -> HoistResult<HoistCommandBufferSim> {
        Ok(HoistCommandBufferSim::new(&self.queue, command_buffer_def))
    }

    pub fn reset_command_pool(&self) -> HoistResult<()> {
        // Recorded commands are owned by the command buffers, there is no pool memory to reclaim
        Ok(())
    }

    pub(super) fn new(
        queue: &HoistQueueSim,
        command_pool_def: &HoistCommandPoolDef,
    ) -> HoistResult<Self> {
        Ok(HoistCommandPoolSim {
            queue: queue.clone(),
            command_pool_def: command_pool_def.clone(),
        })
    }
}
