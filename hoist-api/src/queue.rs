#[cfg(feature = "hoist-dx12")]
use crate::dx12::HoistQueueDx12;
use crate::sim::HoistQueueSim;
use crate::{
    HoistCommandBuffer, HoistCommandPool, HoistCommandPoolDef, HoistFence, HoistQueueType,
    HoistResult,
};

const MIXED_BACKENDS: &str = "Queue and submitted objects belong to different backends";

/// A queue executes submitted command buffers in order. Work on different queues may run
/// concurrently unless ordered with fences.
///
/// Queues can be cloned, clones refer to the same queue.
#[derive(Clone, Debug)]
pub enum HoistQueue {
    Sim(HoistQueueSim),
    #[cfg(feature = "hoist-dx12")]
    Dx12(HoistQueueDx12),
}

impl HoistQueue {
    pub fn queue_id(&self) -> u32 {
        match self {
            HoistQueue::Sim(inner) => inner.queue_id(),
            #[cfg(feature = "hoist-dx12")]
            HoistQueue::Dx12(inner) => inner.queue_id(),
        }
    }

    pub fn queue_type(&self) -> HoistQueueType {
        match self {
            HoistQueue::Sim(inner) => inner.queue_type(),
            #[cfg(feature = "hoist-dx12")]
            HoistQueue::Dx12(inner) => inner.queue_type(),
        }
    }

    pub fn create_command_pool(
        &self,
        command_pool_def: &HoistCommandPoolDef,
    ) -> HoistResult<HoistCommandPool> {
        Ok(match self {
            HoistQueue::Sim(inner) => {
                HoistCommandPool::Sim(inner.create_command_pool(command_pool_def)?)
            }
            #[cfg(feature = "hoist-dx12")]
            HoistQueue::Dx12(inner) => {
                HoistCommandPool::Dx12(inner.create_command_pool(command_pool_def)?)
            }
        })
    }

    /// Submits closed command buffers for execution in the given order
    pub fn submit(
        &self,
        command_buffers: &[&HoistCommandBuffer],
    ) -> HoistResult<()> {
        match self {
            HoistQueue::Sim(inner) => {
                let command_buffers = command_buffers
                    .iter()
                    .map(|x| x.sim_command_buffer().ok_or(MIXED_BACKENDS))
                    .collect::<Result<Vec<_>, _>>()?;
                inner.submit(&command_buffers)
            }
            #[cfg(feature = "hoist-dx12")]
            HoistQueue::Dx12(inner) => {
                let command_buffers = command_buffers
                    .iter()
                    .map(|x| x.dx12_command_buffer().ok_or(MIXED_BACKENDS))
                    .collect::<Result<Vec<_>, _>>()?;
                inner.submit(&command_buffers)
            }
        }
    }

    /// GPU-side signal: sets the fence to `value` after all previously submitted work on this
    /// queue completes
    pub fn signal(
        &self,
        fence: &HoistFence,
        value: u64,
    ) -> HoistResult<()> {
        match self {
            HoistQueue::Sim(inner) => inner.signal(fence.sim_fence().ok_or(MIXED_BACKENDS)?, value),
            #[cfg(feature = "hoist-dx12")]
            HoistQueue::Dx12(inner) => {
                inner.signal(fence.dx12_fence().ok_or(MIXED_BACKENDS)?, value)
            }
        }
    }

    /// GPU-side wait: work submitted to this queue afterwards does not start until the fence
    /// reaches `value`. The CPU is not blocked.
    pub fn wait(
        &self,
        fence: &HoistFence,
        value: u64,
    ) -> HoistResult<()> {
        match self {
            HoistQueue::Sim(inner) => inner.wait(fence.sim_fence().ok_or(MIXED_BACKENDS)?, value),
            #[cfg(feature = "hoist-dx12")]
            HoistQueue::Dx12(inner) => inner.wait(fence.dx12_fence().ok_or(MIXED_BACKENDS)?, value),
        }
    }

    /// Blocks the CPU until all work submitted to the queue so far has completed
    pub fn wait_for_queue_idle(&self) -> HoistResult<()> {
        match self {
            HoistQueue::Sim(inner) => inner.wait_for_queue_idle(),
            #[cfg(feature = "hoist-dx12")]
            HoistQueue::Dx12(inner) => inner.wait_for_queue_idle(),
        }
    }

    pub fn sim_queue(&self) -> Option<&HoistQueueSim> {
        match self {
            HoistQueue::Sim(inner) => Some(inner),
            #[cfg(feature = "hoist-dx12")]
            HoistQueue::Dx12(_) => None,
        }
    }

    #[cfg(feature = "hoist-dx12")]
    pub fn dx12_queue(&self) -> Option<&HoistQueueDx12> {
        match self {
            HoistQueue::Sim(_) => None,
            HoistQueue::Dx12(inner) => Some(inner),
        }
    }
}
