#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::sim::HoistDeviceContextSim;
use crate::{HoistQueueType, HoistResult};
use std::time::Duration;

/// Failures the simulated device can be told to produce, to exercise error paths that real
/// hardware only hits under memory pressure or device removal.
#[derive(Default, Clone, Debug)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct HoistSimFaultInjection {
    /// Creating a queue of this type fails
    pub fail_queue_creation: Option<HoistQueueType>,
    /// Creating any fence fails
    pub fail_fence_creation: bool,
    /// Submitting command buffers to a queue of this type fails
    pub fail_submit: Option<HoistQueueType>,
}

/// Simulated-device-specific configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct HoistApiDefSim {
    /// Total bytes of buffer and texture memory the device may hand out. None is unlimited
    pub memory_budget: Option<u64>,

    /// Artificial latency applied before each command list executes on a queue
    pub execution_delay: Duration,

    /// Record every hardware-visible action into the device's trace
    pub record_trace: bool,

    pub fault_injection: HoistSimFaultInjection,
}

impl Default for HoistApiDefSim {
    fn default() -> Self {
        HoistApiDefSim {
            memory_budget: None,
            execution_delay: Duration::ZERO,
            record_trace: true,
            fault_injection: Default::default(),
        }
    }
}

/// Sim-specific root of the API
pub struct HoistApiSim {
    device_context: Option<HoistDeviceContextSim>,
}

impl HoistApiSim {
    pub fn device_context(&self) -> &HoistDeviceContextSim {
        self.device_context.as_ref().unwrap()
    }

    pub fn new(api_def: &HoistApiDefSim) -> HoistResult<Self> {
        log::info!(
            "Creating simulated device (memory budget: {:?}, execution delay: {:?})",
            api_def.memory_budget,
            api_def.execution_delay
        );

        let device_context = HoistDeviceContextSim::new(api_def.clone());

        Ok(HoistApiSim {
            device_context: Some(device_context),
        })
    }

    pub fn destroy(&mut self) -> HoistResult<()> {
        if let Some(device_context) = self.device_context.take() {
            let live_resources = device_context.live_resource_count();
            if live_resources > 0 {
                log::warn!(
                    "Simulated device destroyed with {} resources still alive",
                    live_resources
                );
            }
        }

        Ok(())
    }
}

impl Drop for HoistApiSim {
    fn drop(&mut self) {
        // Nothing can fail in the sim teardown, the result only carries warnings
        let _ = self.destroy();
    }
}
