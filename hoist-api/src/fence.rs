#[cfg(feature = "hoist-dx12")]
use crate::dx12::HoistFenceDx12;
use crate::sim::HoistFenceSim;
use crate::HoistResult;

/// A timeline fence. Queues signal it to a value once prior work completes, and queues or the
/// CPU can wait for it to reach a value.
#[derive(Debug)]
pub enum HoistFence {
    Sim(HoistFenceSim),
    #[cfg(feature = "hoist-dx12")]
    Dx12(HoistFenceDx12),
}

impl HoistFence {
    /// The highest value the GPU has signaled so far
    pub fn completed_value(&self) -> u64 {
        match self {
            HoistFence::Sim(inner) => inner.completed_value(),
            #[cfg(feature = "hoist-dx12")]
            HoistFence::Dx12(inner) => inner.completed_value(),
        }
    }

    /// Blocks the calling thread until the fence reaches `value`. There is no timeout.
    pub fn wait_for_value(
        &self,
        value: u64,
    ) -> HoistResult<()> {
        match self {
            HoistFence::Sim(inner) => inner.wait_for_value(value),
            #[cfg(feature = "hoist-dx12")]
            HoistFence::Dx12(inner) => inner.wait_for_value(value),
        }
    }

    pub fn sim_fence(&self) -> Option<&HoistFenceSim> {
        match self {
            HoistFence::Sim(inner) => Some(inner),
            #[cfg(feature = "hoist-dx12")]
            HoistFence::Dx12(_) => None,
        }
    }

    #[cfg(feature = "hoist-dx12")]
    pub fn dx12_fence(&self) -> Option<&HoistFenceDx12> {
        match self {
            HoistFence::Sim(_) => None,
            HoistFence::Dx12(inner) => Some(inner),
        }
    }
}
