use crate::{HoistMemoryUsage, HoistQueueType, HoistResourceId, HoistResourceState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoistSimResourceKind {
    Buffer(HoistMemoryUsage),
    Texture,
}

/// Something the simulated device did. The trace is an ordered record of these and is how tests
/// observe hardware-side ordering.
#[derive(Clone, Debug, PartialEq)]
pub enum HoistSimEvent {
    ResourceCreated {
        resource: HoistResourceId,
        kind: HoistSimResourceKind,
        size: u64,
    },
    ResourceFreed {
        resource: HoistResourceId,
    },
    CommandListSubmitted {
        queue: HoistQueueType,
        command_count: usize,
    },
    CommandListExecuted {
        queue: HoistQueueType,
        command_count: usize,
    },
    BufferCopied {
        queue: HoistQueueType,
        src: HoistResourceId,
        dst: HoistResourceId,
        size: u64,
    },
    TextureCopied {
        queue: HoistQueueType,
        src: HoistResourceId,
        dst: HoistResourceId,
        subresource: u32,
        size: u64,
    },
    BarrierExecuted {
        queue: HoistQueueType,
        resource: HoistResourceId,
        src_state: HoistResourceState,
        dst_state: HoistResourceState,
    },
    FenceSignaled {
        queue: HoistQueueType,
        fence: u32,
        value: u64,
    },
    QueueWaitBegin {
        queue: HoistQueueType,
        fence: u32,
        value: u64,
    },
    QueueWaitEnd {
        queue: HoistQueueType,
        fence: u32,
        value: u64,
    },
    CpuWaitBegin {
        fence: u32,
        value: u64,
    },
    CpuWaitEnd {
        fence: u32,
        value: u64,
    },
    /// Misuse that a debug layer would report. The offending command is skipped.
    ValidationError {
        queue: Option<HoistQueueType>,
        message: String,
    },
}

pub(super) struct HoistSimTrace {
    enabled: bool,
    events: Mutex<Vec<HoistSimEvent>>,
    validation_error_count: AtomicUsize,
}

impl HoistSimTrace {
    pub(super) fn new(enabled: bool) -> Self {
        HoistSimTrace {
            enabled,
            events: Default::default(),
            validation_error_count: AtomicUsize::new(0),
        }
    }

    pub(super) fn record(
        &self,
        event: HoistSimEvent,
    ) {
        if let HoistSimEvent::ValidationError { queue, message } = &event {
            self.validation_error_count.fetch_add(1, Ordering::Relaxed);
            log::error!(
                "Sim validation error on {} queue: {}",
                queue.map(|x| x.name()).unwrap_or("no"),
                message
            );
        } else {
            log::trace!("Sim event: {:?}", event);
        }

        if self.enabled {
            self.events.lock().unwrap().push(event);
        }
    }

    pub(super) fn snapshot(&self) -> Vec<HoistSimEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(super) fn validation_error_count(&self) -> usize {
        self.validation_error_count.load(Ordering::Relaxed)
    }

    pub(super) fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}
